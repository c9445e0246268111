//! The reference-counted value arena.
//!
//! Every heap-allocated Scheme value (pairs, strings, symbols created at
//! runtime, compound procedures, frames, environments) lives in one arena
//! owned by the executing run. Slots hold an explicit reference count;
//! freed slots go onto a free list and are reused by later allocations.
//!
//! The four sentinels (`#t`, `#f`, `nil`, `**unassigned**`) are immediate
//! `Value` variants and never reach the heap, so a fully released heap has
//! zero live objects - the invariant the refcount tests assert.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{
    env::{Env, Frame},
    value::{Closure, Pair, Value},
};

/// Unique identifier for values stored inside the heap arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HeapId(usize);

impl HeapId {
    /// Returns the raw index value.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Data stored in a heap slot.
#[derive(Debug)]
pub(crate) enum HeapData {
    /// A symbol created at runtime (`read`, `symbol`, `symbol-append`).
    /// Symbols from source text stay interned; equality is by text either way.
    Symbol(String),
    /// A string created at runtime.
    Str(String),
    /// A cons cell. Owns both fields.
    Pair(Pair),
    /// A compound procedure: shared lambda spec plus captured environment.
    Closure(Closure),
    /// A single scope's bindings.
    Frame(Frame),
    /// An ordered list of frames, innermost first.
    Env(Env),
}

impl HeapData {
    /// Static name of this variant, used for `HeapStats` breakdowns.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Symbol(_) => "Symbol",
            Self::Str(_) => "Str",
            Self::Pair(_) => "Pair",
            Self::Closure(_) => "Closure",
            Self::Frame(_) => "Frame",
            Self::Env(_) => "Env",
        }
    }

    /// Consumes the data, pushing the heap ids of every owned child reference.
    fn collect_child_refs(self, out: &mut Vec<HeapId>) {
        match self {
            Self::Symbol(_) | Self::Str(_) => {}
            Self::Pair(pair) => {
                pair.car.collect_ref(out);
                pair.cdr.collect_ref(out);
            }
            Self::Closure(closure) => out.push(closure.env),
            Self::Frame(frame) => {
                for value in frame.into_values() {
                    value.collect_ref(out);
                }
            }
            Self::Env(env) => out.extend(env.into_frames()),
        }
    }
}

/// One live arena slot.
///
/// The refcount uses interior mutability so `inc_ref` only needs shared
/// access to the heap; this avoids borrow conflicts during environment
/// lookups which read one slot while cloning values out of another.
#[derive(Debug)]
struct HeapValue {
    refcount: AtomicUsize,
    data: HeapData,
}

/// Snapshot of heap state at a point in time.
///
/// The `objects_by_type` map uses `BTreeMap` for deterministic iteration
/// order, making snapshots suitable for display and comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStats {
    /// Total number of live objects on the heap.
    pub live_objects: usize,
    /// Number of free (recycled) slots available for reuse.
    pub free_slots: usize,
    /// Total heap capacity (live + free).
    pub total_slots: usize,
    /// Breakdown of live objects by variant name (e.g. "Pair", "Closure").
    pub objects_by_type: BTreeMap<&'static str, usize>,
}

/// Difference between two heap snapshots.
///
/// Computed by comparing a "before" and "after" [`HeapStats`] via
/// [`HeapStats::diff`]. Positive deltas mean growth, negative shrinkage.
/// Useful for understanding what a program left behind on the heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapDiff {
    /// Change in live object count (`after - before`).
    pub live_objects_delta: isize,
    /// Change in free slot count.
    pub free_slots_delta: isize,
    /// Change in total slot count.
    pub total_slots_delta: isize,
    /// Per-type deltas. Only includes types present in either snapshot.
    pub objects_by_type_delta: BTreeMap<&'static str, isize>,
}

impl HeapStats {
    /// Computes the difference between `self` ("before") and `other`
    /// ("after").
    #[must_use]
    pub fn diff(&self, other: &Self) -> HeapDiff {
        let mut objects_by_type_delta = BTreeMap::new();
        for (&type_name, &count) in &self.objects_by_type {
            let after = other.objects_by_type.get(type_name).copied().unwrap_or(0);
            objects_by_type_delta.insert(type_name, isize_delta(count, after));
        }
        for (&type_name, &count) in &other.objects_by_type {
            if !self.objects_by_type.contains_key(type_name) {
                objects_by_type_delta.insert(type_name, count as isize);
            }
        }
        HeapDiff {
            live_objects_delta: isize_delta(self.live_objects, other.live_objects),
            free_slots_delta: isize_delta(self.free_slots, other.free_slots),
            total_slots_delta: isize_delta(self.total_slots, other.total_slots),
            objects_by_type_delta,
        }
    }
}

impl HeapDiff {
    /// Returns `true` when all deltas are zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_objects_delta == 0
            && self.free_slots_delta == 0
            && self.total_slots_delta == 0
            && self.objects_by_type_delta.values().all(|&v| v == 0)
    }
}

impl std::fmt::Display for HeapDiff {
    /// Produces a human-readable summary of what changed between two heap
    /// snapshots, e.g. `HeapDiff: +3 live objects, +4 slots`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "HeapDiff: no changes");
        }
        write!(
            f,
            "HeapDiff: {:+} live objects, {:+} slots",
            self.live_objects_delta, self.total_slots_delta
        )?;
        for (&type_name, &delta) in &self.objects_by_type_delta {
            if delta != 0 {
                write!(f, "\n  {type_name}: {delta:+}")?;
            }
        }
        Ok(())
    }
}

/// Computes `after - before` as `isize`.
fn isize_delta(before: usize, after: usize) -> isize {
    (after as isize).wrapping_sub(before as isize)
}

/// The value arena.
#[derive(Debug, Default)]
pub(crate) struct Heap {
    entries: Vec<Option<HeapValue>>,
    /// IDs of freed slots available for reuse. Populated by `dec_ref`,
    /// consumed by `allocate`.
    free_list: Vec<HeapId>,
}

impl Heap {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Allocates a new heap entry with a reference count of one; the
    /// returned id is the owning reference.
    pub fn allocate(&mut self, data: HeapData) -> HeapId {
        let new_entry = HeapValue {
            refcount: AtomicUsize::new(1),
            data,
        };
        if let Some(id) = self.free_list.pop() {
            self.entries[id.index()] = Some(new_entry);
            id
        } else {
            let id = HeapId(self.entries.len());
            self.entries.push(Some(new_entry));
            id
        }
    }

    /// Increments the reference count for an existing heap entry.
    ///
    /// # Panics
    /// Panics if the id is invalid or the value has already been freed.
    pub fn inc_ref(&self, id: HeapId) {
        let value = self
            .entries
            .get(id.index())
            .expect("Heap::inc_ref: slot missing")
            .as_ref()
            .expect("Heap::inc_ref: object already freed");
        value.refcount.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements the reference count and frees the value (plus children)
    /// once it hits zero.
    ///
    /// Child references are released through an explicit worklist rather
    /// than recursion: releasing a long list must not grow the host stack
    /// proportionally to its length.
    ///
    /// # Panics
    /// Panics if an id is invalid or the value has already been freed.
    pub fn dec_ref(&mut self, id: HeapId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let entry = {
                let slot = self.entries.get_mut(id.index()).expect("Heap::dec_ref: slot missing");
                let entry = slot.as_mut().expect("Heap::dec_ref: object already freed");
                let count = entry.refcount.load(Ordering::Relaxed);
                if count > 1 {
                    entry.refcount.store(count - 1, Ordering::Relaxed);
                    continue;
                }
                slot.take().expect("Heap::dec_ref: object already freed")
            };

            // refcount == 1: free the value and recycle the slot
            self.free_list.push(id);
            entry.data.collect_child_refs(&mut pending);
        }
    }

    /// Returns an immutable reference to the heap data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the id is invalid or the value has already been freed.
    #[must_use]
    pub fn get(&self, id: HeapId) -> &HeapData {
        &self
            .entries
            .get(id.index())
            .expect("Heap::get: slot missing")
            .as_ref()
            .expect("Heap::get: object already freed")
            .data
    }

    /// Returns a mutable reference to the heap data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the id is invalid or the value has already been freed.
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self
            .entries
            .get_mut(id.index())
            .expect("Heap::get_mut: slot missing")
            .as_mut()
            .expect("Heap::get_mut: object already freed")
            .data
    }

    /// Takes a snapshot of the current heap state.
    pub fn stats(&self) -> HeapStats {
        let mut objects_by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut live_objects = 0;
        for entry in self.entries.iter().flatten() {
            live_objects += 1;
            *objects_by_type.entry(entry.data.variant_name()).or_insert(0) += 1;
        }
        HeapStats {
            live_objects,
            free_slots: self.free_list.len(),
            total_slots: self.entries.len(),
            objects_by_type,
        }
    }
}

impl Value {
    /// Consumes the value, recording its heap reference (if any) for release.
    ///
    /// With `ref-count-panic` the value must not run its destructor here:
    /// the caller is the one releasing it.
    pub(crate) fn collect_ref(self, out: &mut Vec<HeapId>) {
        if let Self::Ref(id) = &self {
            out.push(*id);
        }
        #[cfg(feature = "ref-count-panic")]
        std::mem::forget(self);
    }

    /// Consumes the value, decrementing the refcount of a heap reference.
    ///
    /// Every owned `Value` must end its life through this method (or
    /// `collect_ref`); a plain drop of a `Ref` leaks the refcount, which the
    /// `ref-count-panic` feature turns into a panic.
    pub(crate) fn drop_with_heap(self, heap: &mut Heap) {
        if let Self::Ref(id) = &self {
            heap.dec_ref(*id);
        }
        #[cfg(feature = "ref-count-panic")]
        std::mem::forget(self);
    }

    /// Clones the value, incrementing the refcount of a heap reference.
    ///
    /// `Clone` is intentionally not derived for `Value`: a derived clone
    /// would alias heap references without counting them.
    pub(crate) fn clone_with_heap(&self, heap: &Heap) -> Self {
        match self {
            Self::Nil => Self::Nil,
            Self::Bool(b) => Self::Bool(*b),
            Self::Int(i) => Self::Int(*i),
            Self::Float(f) => Self::Float(*f),
            Self::Unassigned => Self::Unassigned,
            Self::Builtin(b) => Self::Builtin(*b),
            Self::ModuleFunction(m) => Self::ModuleFunction(*m),
            Self::InternSymbol(id) => Self::InternSymbol(*id),
            Self::InternString(id) => Self::InternString(*id),
            Self::Ref(id) => {
                heap.inc_ref(*id);
                Self::Ref(*id)
            }
            #[cfg(feature = "ref-count-panic")]
            Self::Dereferenced => panic!("cannot clone a dereferenced value"),
        }
    }
}
