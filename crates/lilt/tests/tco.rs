//! Proper tail call tests.
//!
//! These loops run far past any plausible host stack depth; they only
//! pass if tail calls are trampolined instead of recursed.

use lilt::{NoInput, NoPrint, Object, Runner};

fn run_value(source: &str) -> Object {
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut NoPrint, &mut NoInput)
        .expect("program should run")
        .expect("program should produce a value")
}

#[test]
fn self_recursion_in_tail_position_runs_in_constant_stack() {
    let source = "(begin
                    (define (loop n) (if (= n 0) 'done (loop (- n 1))))
                    (loop 1000000))";
    assert_eq!(run_value(source), Object::Symbol("done".to_owned()));
}

#[test]
fn mutual_recursion_in_tail_position_runs_in_constant_stack() {
    let source = "(begin
                    (define (even? n) (if (= n 0) #t (odd? (- n 1))))
                    (define (odd? n) (if (= n 0) #f (even? (- n 1))))
                    (even? 100001))";
    assert_eq!(run_value(source), Object::Bool(false));
}

#[test]
fn tail_calls_through_cond_clauses() {
    let source = "(begin
                    (define (spin n)
                      (cond ((= n 0) 'out)
                            (else (spin (- n 1)))))
                    (spin 200000))";
    assert_eq!(run_value(source), Object::Symbol("out".to_owned()));
}

/// An accumulating loop: the accumulator flows through the tail call.
#[test]
fn tail_recursive_sum() {
    let source = "(begin
                    (define (sum n acc) (if (= n 0) acc (sum (- n 1) (+ acc n))))
                    (sum 100000 0))";
    assert_eq!(run_value(source), Object::Int(5_000_050_000));
}

/// Non-tail recursion still works for ordinary depths.
#[test]
fn non_tail_recursion_is_unaffected() {
    let source = "(begin
                    (define (depth n) (if (= n 0) 0 (+ 1 (depth (- n 1)))))
                    (depth 500))";
    assert_eq!(run_value(source), Object::Int(500));
}
