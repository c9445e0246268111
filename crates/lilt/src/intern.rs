//! String interning for identifiers, literals, and the shared function table.
//!
//! The interner stores unique strings in a vector and hands out `StringId`
//! indices, avoiding repeated clones and making frame keys and variable
//! references cheap to compare.
//!
//! StringIds are laid out as follows:
//! * 0 to count(StaticStrings) - names known at compile time (builtins,
//!   special forms, module procedures)
//! * 1000+ - strings interned per executor during parse/analyze
//!
//! The interner is populated during analysis and then frozen into `Interns`,
//! which also owns the compiled lambda table. During execution, lookups are
//! needed for frame keys, symbol text, and error messages.

use std::str::FromStr;

use ahash::AHashMap;
use strum::{EnumString, FromRepr, IntoStaticStr};

use crate::expressions::Lambda;

/// Index into the string interner's storage.
///
/// Uses `u32` to save space. IDs below `DYNAMIC_ID_OFFSET` address the
/// `StaticStrings` table; everything else indexes the per-executor vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

/// First id handed out for dynamically interned strings.
const DYNAMIC_ID_OFFSET: u32 = 1000;

impl StringId {
    #[inline]
    fn dynamic(index: usize) -> Self {
        Self(DYNAMIC_ID_OFFSET + u32::try_from(index).expect("interner overflow"))
    }
}

impl From<StaticStrings> for StringId {
    fn from(s: StaticStrings) -> Self {
        Self(s as u32)
    }
}

/// Names which are known at compile time and don't need to be interned.
///
/// This covers every special-form keyword the analyzer matches on, every
/// name the bootstrap binds into the global environment, and every module
/// procedure `include` can bind mid-run (the interner is frozen by then).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum StaticStrings {
    // special-form keywords
    Quote,
    Quasiquote,
    Unquote,
    #[strum(serialize = "set!")]
    SetBang,
    Define,
    Lambda,
    If,
    Cond,
    Else,
    Begin,
    Let,
    And,
    Or,

    // data bindings and sentinels
    #[strum(serialize = "#t")]
    True,
    #[strum(serialize = "#f")]
    False,
    Nil,
    #[strum(serialize = "**unassigned**")]
    Unassigned,
    Argc,
    Argv,

    // basic primitive procedures
    Print,
    Printn,
    Display,
    Newline,
    Read,
    #[strum(serialize = "set-car!")]
    SetCar,
    #[strum(serialize = "set-cdr!")]
    SetCdr,
    Cons,
    Car,
    Cdr,
    Cadr,
    Cdar,
    Cddr,
    Caar,
    Caaar,
    Cdaar,
    Cadar,
    Caadr,
    Cddar,
    Caddr,
    Cdadr,
    Cdddr,
    List,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    Remainder,
    #[strum(serialize = "=")]
    NumEqual,
    #[strum(serialize = "eq?")]
    TextEqual,
    #[strum(serialize = "equal?")]
    Equal,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = ">=")]
    GreaterEqual,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = "string?")]
    IsString,
    #[strum(serialize = "symbol?")]
    IsSymbol,
    #[strum(serialize = "number?")]
    IsNumber,
    #[strum(serialize = "pair?")]
    IsPair,
    #[strum(serialize = "null?")]
    IsNull,
    Include,
    Max,
    Min,
    Apply,
    Not,
    Error,

    // "seq" module procedures
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

    // "symbol" module procedures
    Symbol,
    #[strum(serialize = "symbol-append")]
    SymbolAppend,
}

impl StaticStrings {
    /// Returns the source text of this name.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Mutable interner used while parsing and analyzing a program.
///
/// Static names resolve to their fixed ids; everything else is appended to
/// the dynamic table. Call [`InternerBuilder::finish`] to freeze the table
/// into [`Interns`] once the function table is complete.
#[derive(Debug, Default)]
pub(crate) struct InternerBuilder {
    lookup: AHashMap<Box<str>, StringId>,
    strings: Vec<String>,
}

impl InternerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `text`, returning its id. Static names never allocate.
    pub fn intern(&mut self, text: &str) -> StringId {
        if let Ok(s) = StaticStrings::from_str(text) {
            return s.into();
        }
        if let Some(&id) = self.lookup.get(text) {
            return id;
        }
        let id = StringId::dynamic(self.strings.len());
        self.strings.push(text.to_owned());
        self.lookup.insert(text.into(), id);
        id
    }

    /// Resolves an id back to its text.
    pub fn get_str(&self, id: StringId) -> &str {
        resolve(&self.strings, id)
    }

    /// Freezes the interner together with the compiled lambda table.
    pub fn finish(self, functions: Vec<Lambda>) -> Interns {
        Interns {
            strings: self.strings,
            functions,
        }
    }
}

/// Immutable string and function storage owned by the executor.
#[derive(Debug)]
pub(crate) struct Interns {
    strings: Vec<String>,
    functions: Vec<Lambda>,
}

impl Interns {
    /// Resolves an id back to its text.
    pub fn get_str(&self, id: StringId) -> &str {
        resolve(&self.strings, id)
    }

    /// Returns the lambda spec for a compiled function.
    pub fn get_function(&self, id: FunctionId) -> &Lambda {
        &self.functions[id.index()]
    }
}

fn resolve(strings: &[String], id: StringId) -> &str {
    if id.0 < DYNAMIC_ID_OFFSET {
        StaticStrings::from_repr(id.0 as u16)
            .expect("invalid static string id")
            .as_str()
    } else {
        &strings[(id.0 - DYNAMIC_ID_OFFSET) as usize]
    }
}

/// Index into the shared lambda table.
///
/// All compound procedures created from one `lambda` expression share the
/// parameter names and body stored at this index; only the captured
/// environment differs per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FunctionId(u32);

impl FunctionId {
    pub fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("function table overflow"))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_names_resolve_without_allocating() {
        let mut builder = InternerBuilder::new();
        let plus = builder.intern("+");
        let set_car = builder.intern("set-car!");
        assert_eq!(plus, StringId::from(StaticStrings::Add));
        assert_eq!(set_car, StringId::from(StaticStrings::SetCar));
        assert_eq!(builder.get_str(plus), "+");
        assert_eq!(builder.get_str(set_car), "set-car!");
    }

    #[test]
    fn dynamic_names_intern_once() {
        let mut builder = InternerBuilder::new();
        let a = builder.intern("make-adder");
        let b = builder.intern("make-adder");
        assert_eq!(a, b);
        assert_eq!(builder.get_str(a), "make-adder");
    }
}
