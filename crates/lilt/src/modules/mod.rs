//! Standard-library modules loaded on demand by `(include "name")`.
//!
//! Each module's bootstrap binds its procedures into the global
//! environment by name. The module table is compile-time; unknown names
//! error out.

pub(crate) mod seq;
pub(crate) mod symbol;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    args::ArgValues,
    exception_private::{RunResult, SchemeError},
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

/// Enumerates every module-provided procedure.
///
/// The string representation is the exact name the module bootstrap binds
/// (e.g. `ListRef` -> "list-ref").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ModuleFunctions {
    // "seq"
    Sort,
    Length,
    #[strum(serialize = "list-ref")]
    ListRef,
    Range,
    Append,
    Reverse,
    #[strum(serialize = "list-copy")]
    ListCopy,
    Map,
    #[strum(serialize = "for-each")]
    ForEach,
    Filter,
    Accumulate,
    #[strum(serialize = "fold-left")]
    FoldLeft,
    // "symbol"
    Symbol,
    #[strum(serialize = "symbol-append")]
    SymbolAppend,
}

impl ModuleFunctions {
    /// Calls this module procedure; the tail-call flag is already
    /// suspended by the evaluator's `apply`.
    pub fn call(
        self,
        vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
        args: ArgValues,
    ) -> RunResult<Option<Value>> {
        match self {
            Self::Sort => seq::sort(vm, args).map(Some),
            Self::Length => seq::length(vm, args).map(Some),
            Self::ListRef => seq::list_ref(vm, args).map(Some),
            Self::Range => seq::range(vm, args).map(Some),
            Self::Append => seq::append(vm, args).map(Some),
            Self::Reverse => seq::reverse(vm, args).map(Some),
            Self::ListCopy => seq::list_copy(vm, args).map(Some),
            Self::Map => seq::map(vm, args).map(Some),
            Self::ForEach => seq::for_each(vm, args),
            Self::Filter => seq::filter(vm, args).map(Some),
            Self::Accumulate => seq::accumulate(vm, args).map(Some),
            Self::FoldLeft => seq::fold_left(vm, args).map(Some),
            Self::Symbol => symbol::symbol(vm, args).map(Some),
            Self::SymbolAppend => symbol::symbol_append(vm, args).map(Some),
        }
    }
}

/// Runs the named module's bootstrap.
pub(crate) fn include_module(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, name: &str) -> RunResult<()> {
    match name {
        "seq" => seq::bind(vm),
        "symbol" => symbol::bind(vm),
        _ => Err(SchemeError::type_mismatch(format!(
            "include: unknown module \"{name}\""
        ))),
    }
}
