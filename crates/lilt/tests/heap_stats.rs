//! Reference-count hygiene tests.
//!
//! After evaluating a program to completion and releasing the result and
//! the global environment, the heap must drain to exactly zero live
//! objects - the sentinels are immediates and never counted.

use lilt::{NoInput, NoPrint, Object, QueueInput, Runner};

fn run_draining(source: &str) -> Option<Object> {
    let runner = Runner::new(source, "<test>", vec![]).expect("program should analyze");
    let (object, stats) = runner
        .run_ref_counts(&mut NoPrint, &mut NoInput)
        .expect("program should run");
    assert_eq!(
        stats.live_objects, 0,
        "heap should drain to zero live objects, got {stats:?}"
    );
    object
}

#[test]
fn arithmetic_leaves_nothing_behind() {
    assert_eq!(run_draining("(+ 1 2 3)"), Some(Object::Int(6)));
}

#[test]
fn list_construction_is_released() {
    run_draining("(begin (define xs (list 1 2 3)) (car xs))");
}

#[test]
fn closures_and_environments_are_released() {
    run_draining(
        "(begin
           (define (make-adder k) (lambda (x) (+ x k)))
           ((make-adder 3) 4))",
    );
}

#[test]
fn recursion_releases_every_call_frame() {
    run_draining("(begin (define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 10))");
}

#[test]
fn tail_recursion_releases_every_environment() {
    run_draining("(begin (define (loop n) (if (= n 0) 'done (loop (- n 1)))) (loop 10000))");
}

#[test]
fn quotation_data_is_released() {
    run_draining("(begin '(1 (2 3) \"four\") `(a ,(+ 1 1)) 'end)");
}

#[test]
fn module_procedures_are_released() {
    run_draining(
        "(begin
           (include \"seq\")
           (map (lambda (x) (* x x)) (list 1 2 3 4))
           (sort (lambda (a b) (- a b)) (list 3 1 2))
           (length (range 1 100)))",
    );
}

#[test]
fn pair_mutation_is_released() {
    run_draining("(begin (define p (cons 1 2)) (set-car! p (list 10 20)) (cdr p))");
}

#[test]
fn read_data_is_released() {
    let runner = Runner::new("(begin (read) 'ok)", "<test>", vec![]).unwrap();
    let (object, stats) = runner
        .run_ref_counts(&mut NoPrint, &mut QueueInput::new(["(1 2 (3 4) five)"]))
        .unwrap();
    assert_eq!(object, Some(Object::Symbol("ok".to_owned())));
    assert_eq!(stats.live_objects, 0, "heap should drain, got {stats:?}");
}

#[test]
fn failed_arity_checks_release_their_arguments() {
    // the error path drops operands; run a follow-up program to completion
    // to show nothing about the runner is poisoned
    let runner = Runner::new("((lambda (x) x) 1 2)", "<test>", vec![]).unwrap();
    assert!(runner.run(&mut NoPrint, &mut NoInput).is_err());
    let runner = Runner::new("(+ 1 2)", "<test>", vec![]).unwrap();
    assert!(runner.run(&mut NoPrint, &mut NoInput).is_ok());
}
