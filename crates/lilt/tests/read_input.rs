//! The `read` primitive against the input port.

use lilt::{ErrorKind, NoInput, NoPrint, Object, QueueInput, Runner};
use pretty_assertions::assert_eq;

fn run_with_input(source: &str, lines: &[&str]) -> Option<Object> {
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut NoPrint, &mut QueueInput::new(lines.iter().copied()))
        .expect("program should run")
}

#[test]
fn read_returns_an_atom() {
    assert_eq!(run_with_input("(read)", &["42"]), Some(Object::Int(42)));
    assert_eq!(run_with_input("(read)", &["3.5"]), Some(Object::Float(3.5)));
    assert_eq!(
        run_with_input("(read)", &["hello"]),
        Some(Object::Symbol("hello".to_owned()))
    );
}

#[test]
fn read_accumulates_lines_until_the_datum_closes() {
    let result = run_with_input("(read)", &["(1 2", "3)"]);
    assert_eq!(result.unwrap().to_string(), "(1 2 3)");
}

#[test]
fn read_produces_data_not_code() {
    // the list is data: its head is the symbol +, not an application
    let result = run_with_input("(car (read))", &["(+ 1 2)"]);
    assert_eq!(result, Some(Object::Symbol("+".to_owned())));
}

#[test]
fn read_decodes_string_literals() {
    let result = run_with_input("(read)", &["\"a\\nb\""]);
    assert_eq!(result, Some(Object::String("a\nb".to_owned())));
}

#[test]
fn read_at_end_of_input_is_an_io_failure() {
    let err = Runner::new("(read)", "<test>", vec![])
        .unwrap()
        .run(&mut NoPrint, &mut NoInput)
        .expect_err("read with no input should fail");
    assert_eq!(err.kind(), ErrorKind::IoFailure);
}

#[test]
fn read_feeds_later_computation() {
    let source = "(begin (define x (read)) (define y (read)) (+ x y))";
    assert_eq!(run_with_input(source, &["20", "22"]), Some(Object::Int(42)));
}
