//! The `read` primitive: one datum from the input port.

use crate::{
    args::ArgValues,
    ast::Ast,
    exception_private::{ErrorKind, RunResult, SchemeError},
    heap::{Heap, HeapData},
    io::{InputPort, PrintWriter},
    parse::{decode_string_literal, is_float_text, is_integer_text, is_string_text, parse_datum},
    value::{Value, allocate_list},
    vm::Vm,
};

/// `(read)` - pulls lines from the input port until the accumulated text
/// contains one complete datum, then rebuilds it as data: numbers and
/// strings become values, symbols become fresh symbols, expressions
/// become fresh proper lists. Nothing is evaluated.
pub fn read(vm: &mut Vm<'_, impl PrintWriter, impl InputPort>, args: ArgValues) -> RunResult<Option<Value>> {
    args.check_none("read", vm.heap)?;
    let mut text = String::new();
    loop {
        match parse_datum(&text, "-") {
            Ok(ast) => return datum_value(vm.heap, &ast).map(Some),
            Err(err) if err.incomplete => match vm.input.read_line() {
                Ok(Some(line)) => {
                    text.push_str(&line);
                    if !line.ends_with('\n') {
                        text.push('\n');
                    }
                }
                Ok(None) => return Err(SchemeError::io_failure("read: end of input")),
                Err(exception) => return Err(SchemeError::io_failure(exception.message().to_owned())),
            },
            Err(err) => {
                return Err(SchemeError::new(
                    ErrorKind::Syntax,
                    format!("{}:{}: {}", err.filename, err.line, err.message),
                ));
            }
        }
    }
}

/// Converts a parsed datum into a runtime value. Runtime-created symbols
/// and strings live on the heap; interning is reserved for source text.
fn datum_value(heap: &mut Heap, ast: &Ast) -> RunResult<Value> {
    match ast {
        Ast::Symbol { text, line } => {
            if is_integer_text(text) {
                let value: i64 = text.parse().map_err(|_| {
                    SchemeError::new(ErrorKind::Syntax, format!("-:{line}: integer literal out of range"))
                })?;
                Ok(Value::Int(value))
            } else if is_float_text(text) {
                let value: f64 = text
                    .parse()
                    .map_err(|_| SchemeError::new(ErrorKind::Syntax, format!("-:{line}: bad float literal")))?;
                Ok(Value::Float(value))
            } else if is_string_text(text) {
                let decoded = decode_string_literal(text)
                    .map_err(|msg| SchemeError::new(ErrorKind::Syntax, format!("-:{line}: {msg}")))?;
                Ok(Value::Ref(heap.allocate(HeapData::Str(decoded))))
            } else {
                Ok(Value::Ref(heap.allocate(HeapData::Symbol(text.clone()))))
            }
        }
        Ast::Expr { children, .. } => {
            let mut values = Vec::with_capacity(children.len());
            for child in children {
                match datum_value(heap, child) {
                    Ok(value) => values.push(value),
                    Err(err) => {
                        for value in values {
                            value.drop_with_heap(heap);
                        }
                        return Err(err);
                    }
                }
            }
            Ok(allocate_list(heap, values))
        }
    }
}
