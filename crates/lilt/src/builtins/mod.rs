//! The basic primitive procedures bound into the global environment at
//! startup.
//!
//! Each area has its own submodule; this module owns the `Builtins` enum,
//! the dispatch, the bootstrap binding table, and the `--docs` text.

mod apply;
mod compare;
mod error;
mod include;
mod num;
mod pair;
mod predicate;
mod print;
mod read;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    args::ArgValues,
    exception_private::RunResult,
    intern::StaticStrings,
    io::{InputPort, PrintWriter},
    value::Value,
    vm::Vm,
};

pub(crate) use pair::Step;

/// Enumerates every basic primitive procedure.
///
/// Uses strum derives for `Display`/`FromStr`; the string representation is
/// the exact name bound in the global environment (e.g. `SetCar` ->
/// "set-car!").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Builtins {
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
}

impl Builtins {
    /// Calls this primitive with the given arguments.
    ///
    /// The caller (the evaluator's `apply`) has already suspended the
    /// tail-call flag. `Ok(None)` means the primitive produced no
    /// meaningful value.
    pub fn call(
        self,
        vm: &mut Vm<'_, impl PrintWriter, impl InputPort>,
        args: ArgValues,
    ) -> RunResult<Option<Value>> {
        match self {
            Self::Print => print::print(vm, args),
            Self::Printn => print::printn(vm, args),
            Self::Display => print::display(vm, args),
            Self::Newline => print::newline(vm, args),
            Self::Read => read::read(vm, args),
            Self::SetCar => pair::set_car(vm, args),
            Self::SetCdr => pair::set_cdr(vm, args),
            Self::Cons => pair::cons(vm, args).map(Some),
            Self::Car => pair::accessor(vm, args, self, &[Step::Car]).map(Some),
            Self::Cdr => pair::accessor(vm, args, self, &[Step::Cdr]).map(Some),
            Self::Cadr => pair::accessor(vm, args, self, &[Step::Cdr, Step::Car]).map(Some),
            Self::Cdar => pair::accessor(vm, args, self, &[Step::Car, Step::Cdr]).map(Some),
            Self::Cddr => pair::accessor(vm, args, self, &[Step::Cdr, Step::Cdr]).map(Some),
            Self::Caar => pair::accessor(vm, args, self, &[Step::Car, Step::Car]).map(Some),
            Self::Caaar => pair::accessor(vm, args, self, &[Step::Car, Step::Car, Step::Car]).map(Some),
            Self::Cdaar => pair::accessor(vm, args, self, &[Step::Car, Step::Car, Step::Cdr]).map(Some),
            Self::Cadar => pair::accessor(vm, args, self, &[Step::Car, Step::Cdr, Step::Car]).map(Some),
            Self::Caadr => pair::accessor(vm, args, self, &[Step::Cdr, Step::Car, Step::Car]).map(Some),
            Self::Cddar => pair::accessor(vm, args, self, &[Step::Car, Step::Cdr, Step::Cdr]).map(Some),
            Self::Caddr => pair::accessor(vm, args, self, &[Step::Cdr, Step::Cdr, Step::Car]).map(Some),
            Self::Cdadr => pair::accessor(vm, args, self, &[Step::Cdr, Step::Car, Step::Cdr]).map(Some),
            Self::Cdddr => pair::accessor(vm, args, self, &[Step::Cdr, Step::Cdr, Step::Cdr]).map(Some),
            Self::List => pair::list(vm, args).map(Some),
            Self::Add => num::add(vm, args).map(Some),
            Self::Subtract => num::subtract(vm, args).map(Some),
            Self::Multiply => num::multiply(vm, args).map(Some),
            Self::Divide => num::divide(vm, args).map(Some),
            Self::Remainder => num::remainder(vm, args).map(Some),
            Self::NumEqual => compare::numeric(vm, args, self).map(Some),
            Self::TextEqual => compare::text_equal(vm, args).map(Some),
            Self::Equal => compare::equal(vm, args).map(Some),
            Self::GreaterThan | Self::GreaterEqual | Self::LessThan | Self::LessEqual => {
                compare::numeric(vm, args, self).map(Some)
            }
            Self::IsString => predicate::is_string(vm, args).map(Some),
            Self::IsSymbol => predicate::is_symbol(vm, args).map(Some),
            Self::IsNumber => predicate::is_number(vm, args).map(Some),
            Self::IsPair => predicate::is_pair(vm, args).map(Some),
            Self::IsNull => predicate::is_null(vm, args).map(Some),
            Self::Include => include::include(vm, args),
            Self::Max => num::max(vm, args).map(Some),
            Self::Min => num::min(vm, args).map(Some),
            Self::Apply => apply::apply(vm, args),
            Self::Not => predicate::not(vm, args).map(Some),
            Self::Error => error::error(vm, args),
        }
    }
}

/// The bootstrap binding table: `#t`, `#f`, `nil`, then every basic
/// primitive under its source name.
pub(crate) fn basic_bindings() -> impl Iterator<Item = (StaticStrings, Value)> {
    use StaticStrings as S;
    let data = [
        (S::True, Value::Bool(true)),
        (S::False, Value::Bool(false)),
        (S::Nil, Value::Nil),
    ];
    let procedures = [
        (S::Print, Builtins::Print),
        (S::Printn, Builtins::Printn),
        (S::Display, Builtins::Display),
        (S::Newline, Builtins::Newline),
        (S::Read, Builtins::Read),
        (S::SetCar, Builtins::SetCar),
        (S::SetCdr, Builtins::SetCdr),
        (S::Cons, Builtins::Cons),
        (S::Car, Builtins::Car),
        (S::Cdr, Builtins::Cdr),
        (S::Cadr, Builtins::Cadr),
        (S::Cdar, Builtins::Cdar),
        (S::Cddr, Builtins::Cddr),
        (S::Caar, Builtins::Caar),
        (S::Caaar, Builtins::Caaar),
        (S::Cdaar, Builtins::Cdaar),
        (S::Cadar, Builtins::Cadar),
        (S::Caadr, Builtins::Caadr),
        (S::Cddar, Builtins::Cddar),
        (S::Caddr, Builtins::Caddr),
        (S::Cdadr, Builtins::Cdadr),
        (S::Cdddr, Builtins::Cdddr),
        (S::List, Builtins::List),
        (S::Add, Builtins::Add),
        (S::Subtract, Builtins::Subtract),
        (S::Multiply, Builtins::Multiply),
        (S::Divide, Builtins::Divide),
        (S::Remainder, Builtins::Remainder),
        (S::NumEqual, Builtins::NumEqual),
        (S::TextEqual, Builtins::TextEqual),
        (S::Equal, Builtins::Equal),
        (S::GreaterThan, Builtins::GreaterThan),
        (S::GreaterEqual, Builtins::GreaterEqual),
        (S::LessThan, Builtins::LessThan),
        (S::LessEqual, Builtins::LessEqual),
        (S::IsString, Builtins::IsString),
        (S::IsSymbol, Builtins::IsSymbol),
        (S::IsNumber, Builtins::IsNumber),
        (S::IsPair, Builtins::IsPair),
        (S::IsNull, Builtins::IsNull),
        (S::Include, Builtins::Include),
        (S::Max, Builtins::Max),
        (S::Min, Builtins::Min),
        (S::Apply, Builtins::Apply),
        (S::Not, Builtins::Not),
        (S::Error, Builtins::Error),
    ];
    data.into_iter()
        .chain(procedures.into_iter().map(|(name, b)| (name, Value::Builtin(b))))
}

/// The complete built-in documentation listing, printed by `--docs`.
#[must_use]
pub fn documentation() -> String {
    let mut out = String::new();
    out.push_str("============ Basic Primitive Procedures ============\n");
    out.push_str(concat!(
        "(print object1 [object2] [object3] ...)\n",
        "(printn [object1] [object2] [object3] ...)\n",
        "(display object)\n",
        "(newline)\n",
        "\n",
        "(read) -> object\n",
        "\n",
        "(set-car! pair new-car)\n",
        "(set-cdr! pair new-cdr)\n",
        "\n",
        "(cons new-car new-cdr) -> pair\n",
        "(car pair) -> object\n",
        "(cdr pair) -> object\n",
        "(cadr pair) -> object\n",
        "(cdar pair) -> object\n",
        "(cddr pair) -> object\n",
        "(caar pair) -> object\n",
        "(caaar pair) -> object\n",
        "(cdaar pair) -> object\n",
        "(cadar pair) -> object\n",
        "(caadr pair) -> object\n",
        "(cddar pair) -> object\n",
        "(caddr pair) -> object\n",
        "(cdadr pair) -> object\n",
        "(cdddr pair) -> object\n",
        "\n",
        "(list [object1] [object2] [object3] ...) -> sequence\n",
        "\n",
        "(+ number1 [number2] [number3] ...) -> integer/float number\n",
        "(- number1 [number2] [number3] ...) -> integer/float number\n",
        "(* number1 [number2] [number3] ...) -> integer/float number\n",
        "(/ number1 [number2] [number3] ...) -> integer/float number\n",
        "\n",
        "(remainder dividend divisor) -> integer number\n",
        "\n",
        "(= number1 number2) -> #t/#f\n",
        "(eq? symbol1 symbol2) -> #t/#f\n",
        "(eq? string1 string2) -> #t/#f\n",
        "(eq? bool1 bool2) -> #t/#f\n",
        "(equal? number1 number2) -> #t/#f\n",
        "(equal? symbol1 symbol2) -> #t/#f\n",
        "(equal? string1 string2) -> #t/#f\n",
        "\n",
        "(> number1 number2) -> #t/#f\n",
        "(>= number1 number2) -> #t/#f\n",
        "(< number1 number2) -> #t/#f\n",
        "(<= number1 number2) -> #t/#f\n",
        "\n",
        "(string? object) -> #t/#f\n",
        "(symbol? object) -> #t/#f\n",
        "(number? object) -> #t/#f\n",
        "(pair? object) -> #t/#f\n",
        "(null? object) -> #t/#f\n",
        "\n",
        "(include \"module-name\")\n",
        "\n",
        "(max number1 [number2] [number3] ...) -> integer/float number\n",
        "(min number1 [number2] [number3] ...) -> integer/float number\n",
        "\n",
        "(apply procedure argument-sequence) -> object\n",
        "(not object) -> #t/#f\n",
        "\n",
        "(error object1 [object2] [object3] ...)\n",
    ));
    out.push_str("\n\n============ Module: seq ============\n");
    out.push_str(concat!(
        "(sort cmp-procedure sequence) -> sequence\n",
        "(length sequence) -> integer number\n",
        "(list-ref sequence index) -> object\n",
        "(range first-number last-number [step-number]) -> sequence\n",
        "(append sequence1 sequence2) -> sequence\n",
        "(reverse sequence) -> sequence\n",
        "(list-copy sequence) -> sequence\n",
        "(map procedure sequence) -> sequence\n",
        "(for-each procedure sequence)\n",
        "(filter predicate-procedure sequence) -> sequence\n",
        "(accumulate procedure initial sequence) -> object\n",
        "(fold-left procedure initial sequence) -> object\n",
    ));
    out.push_str("\n\n============ Module: symbol ============\n");
    out.push_str(concat!(
        "(symbol number/symbol/string) -> symbol\n",
        "(symbol-append symbol1 [symbol2] [symbol3] ...) -> symbol\n",
    ));
    out
}
