//! Frames and environments.
//!
//! A frame is a single scope's ordered name-to-value bindings; an
//! environment is an ordered list of frames, innermost first. Both are
//! reified as heap values so closures can share them by refcounted
//! identity: a `set!` on a captured variable is visible through every
//! environment holding that frame.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::{
    exception_private::{RunError, RunResult, SchemeError},
    heap::{Heap, HeapData, HeapId},
    intern::{Interns, StringId},
    value::Value,
};

/// Upper bound on the number of bindings one frame can hold.
pub(crate) const FRAME_MAX_BINDINGS: usize = 512;

type Bindings = IndexMap<StringId, Value, ahash::RandomState>;

/// A single scope's bindings. Names are unique; insertion order is kept.
///
/// Binding values are never the null reference: a slot without a value
/// holds `Value::Unassigned`.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    bindings: Bindings,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: Bindings::with_capacity_and_hasher(capacity, ahash::RandomState::default()),
        }
    }

    pub fn get(&self, name: StringId) -> Option<&Value> {
        self.bindings.get(&name)
    }

    /// Adds a binding or updates an existing one, returning the replaced
    /// value for the caller to release. `Err` hands the value back when the
    /// frame is full and the name is new.
    pub fn add_or_update(&mut self, name: StringId, value: Value) -> Result<Option<Value>, Value> {
        if self.bindings.len() >= FRAME_MAX_BINDINGS && !self.bindings.contains_key(&name) {
            return Err(value);
        }
        Ok(self.bindings.insert(name, value))
    }

    /// Updates an existing binding, returning the replaced value. `Err`
    /// hands the value back when the name is not bound in this frame.
    pub fn set_existing(&mut self, name: StringId, value: Value) -> Result<Value, Value> {
        match self.bindings.get_mut(&name) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(value),
        }
    }

    /// Consumes the frame, yielding its binding values for release.
    pub(crate) fn into_values(self) -> impl Iterator<Item = Value> {
        self.bindings.into_values()
    }
}

/// An ordered list of frames, index 0 innermost.
#[derive(Debug)]
pub(crate) struct Env {
    frames: SmallVec<[HeapId; 4]>,
}

impl Env {
    pub fn from_frames(frames: SmallVec<[HeapId; 4]>) -> Self {
        debug_assert!(!frames.is_empty(), "an environment has at least one frame");
        Self { frames }
    }

    pub fn frames(&self) -> &[HeapId] {
        &self.frames
    }

    pub(crate) fn into_frames(self) -> impl Iterator<Item = HeapId> {
        self.frames.into_iter()
    }
}

/// Creates an environment holding a single empty frame.
pub(crate) fn create(heap: &mut Heap) -> HeapId {
    let frame_id = heap.allocate(HeapData::Frame(Frame::new()));
    heap.allocate(HeapData::Env(Env::from_frames(SmallVec::from_slice(&[frame_id]))))
}

/// Extends an environment: shallow-copies its frame list (sharing the
/// frames) and prepends `frame` as the new innermost scope.
pub(crate) fn extend(heap: &mut Heap, env_id: HeapId, frame: Frame) -> HeapId {
    let mut frames: SmallVec<[HeapId; 4]> = match heap.get(env_id) {
        HeapData::Env(env) => env.frames().into(),
        _ => unreachable!("extend on non-environment"),
    };
    for &frame_id in &frames {
        heap.inc_ref(frame_id);
    }
    let frame_id = heap.allocate(HeapData::Frame(frame));
    frames.insert(0, frame_id);
    heap.allocate(HeapData::Env(Env::from_frames(frames)))
}

/// Looks a variable up, walking frames innermost-out.
///
/// Finding a slot still holding the unassigned placeholder is an
/// `UnassignedReference` error; not finding the name at all is
/// `UnboundVariable`.
pub(crate) fn lookup(heap: &Heap, env_id: HeapId, name: StringId, interns: &Interns) -> RunResult<Value> {
    let HeapData::Env(env) = heap.get(env_id) else {
        unreachable!("lookup on non-environment");
    };
    for &frame_id in env.frames() {
        let HeapData::Frame(frame) = heap.get(frame_id) else {
            unreachable!("environment frame slot holds non-frame");
        };
        if let Some(value) = frame.get(name) {
            if matches!(value, Value::Unassigned) {
                return Err(SchemeError::unassigned(interns.get_str(name)));
            }
            return Ok(value.clone_with_heap(heap));
        }
    }
    Err(SchemeError::unbound_variable(interns.get_str(name)))
}

/// `set!`: updates the innermost binding of `name`, failing with
/// `UnboundVariable` when no frame binds it.
pub(crate) fn set_existing(
    heap: &mut Heap,
    env_id: HeapId,
    name: StringId,
    mut value: Value,
    interns: &Interns,
) -> RunResult<()> {
    let frame_ids: SmallVec<[HeapId; 4]> = match heap.get(env_id) {
        HeapData::Env(env) => env.frames().into(),
        _ => unreachable!("set! on non-environment"),
    };
    for frame_id in frame_ids {
        let HeapData::Frame(frame) = heap.get_mut(frame_id) else {
            unreachable!("environment frame slot holds non-frame");
        };
        match frame.set_existing(name, value) {
            Ok(old) => {
                old.drop_with_heap(heap);
                return Ok(());
            }
            Err(returned) => value = returned,
        }
    }
    value.drop_with_heap(heap);
    Err(SchemeError::unbound_variable(interns.get_str(name)))
}

/// `define`: binds (or rebinds) `name` in the innermost frame only.
pub(crate) fn define(heap: &mut Heap, env_id: HeapId, name: StringId, value: Value) -> RunResult<()> {
    let first_frame = match heap.get(env_id) {
        HeapData::Env(env) => env.frames()[0],
        _ => unreachable!("define on non-environment"),
    };
    let result = match heap.get_mut(first_frame) {
        HeapData::Frame(frame) => frame.add_or_update(name, value),
        _ => unreachable!("environment frame slot holds non-frame"),
    };
    match result {
        Ok(Some(old)) => {
            old.drop_with_heap(heap);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(rejected) => {
            rejected.drop_with_heap(heap);
            Err(RunError::internal(format!(
                "frame capacity exceeded ({FRAME_MAX_BINDINGS} bindings)"
            )))
        }
    }
}
