//! End-to-end evaluation tests.
//!
//! Each test parses, analyzes, and runs a complete program through the
//! public `Runner` API and checks the final value, printed output, or
//! error.

use lilt::{CollectStringPrint, ErrorKind, Exception, NoInput, NoPrint, Object, Runner};
use pretty_assertions::assert_eq;

fn run(source: &str) -> Option<Object> {
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut NoPrint, &mut NoInput)
        .expect("program should run")
}

fn run_value(source: &str) -> Object {
    run(source).expect("program should produce a value")
}

fn run_display(source: &str) -> String {
    run_value(source).to_string()
}

fn run_output(source: &str) -> String {
    let mut print = CollectStringPrint::new();
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut print, &mut NoInput)
        .expect("program should run");
    print.into_output()
}

fn run_err(source: &str) -> Exception {
    Runner::new(source, "<test>", vec![])
        .expect("program should analyze")
        .run(&mut NoPrint, &mut NoInput)
        .expect_err("program should fail")
}

// =============================================================================
// 1. Whole-program scenarios
// =============================================================================

#[test]
fn factorial_of_six() {
    let source = "(begin (define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 6))";
    assert_eq!(run_value(source), Object::Int(720));
}

#[test]
fn fibonacci_of_ten() {
    let source = "(begin (define (fib n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2))))) (fib 10))";
    assert_eq!(run_value(source), Object::Int(55));
}

#[test]
fn let_binds_in_parallel() {
    assert_eq!(run_value("(let ((x 3) (y 4)) (+ (* x x) (* y y)))"), Object::Int(25));
}

#[test]
fn pair_mutation() {
    let source = "(begin (define p (cons 1 2)) (set-car! p 10) (set-cdr! p 20) p)";
    assert_eq!(run_display(source), "(10 . 20)");
}

#[test]
fn cond_picks_the_first_true_clause() {
    let source = "(cond ((= 1 2) 'a) ((= 2 2) 'b) (else 'c))";
    assert_eq!(run_value(source), Object::Symbol("b".to_owned()));
}

#[test]
fn cond_falls_through_to_else() {
    let source = "(cond ((= 1 2) 'a) ((= 3 2) 'b) (else 'c))";
    assert_eq!(run_value(source), Object::Symbol("c".to_owned()));
}

// =============================================================================
// 2. Scoping and closures
// =============================================================================

/// `k` is bound by capture; a later global `k` never shadows it.
#[test]
fn closures_capture_their_defining_environment() {
    let source = "(begin
                    (define (make-adder k) (lambda (x) (+ x k)))
                    (define add3 (make-adder 3))
                    (define k 99)
                    (add3 4))";
    assert_eq!(run_value(source), Object::Int(7));
}

#[test]
fn set_bang_mutates_through_the_shared_frame() {
    let source = "(begin
                    (define (make-counter)
                      (define n 0)
                      (lambda () (set! n (+ n 1)) n))
                    (define tick (make-counter))
                    (tick)
                    (tick)
                    (tick))";
    assert_eq!(run_value(source), Object::Int(3));
}

#[test]
fn define_binds_in_the_innermost_frame_only() {
    let source = "(begin
                    (define x 1)
                    (define (shadow) (define x 2) x)
                    (shadow)
                    x)";
    assert_eq!(run_value(source), Object::Int(1));
}

// =============================================================================
// 3. Evaluation order and short-circuiting
// =============================================================================

#[test]
fn operands_evaluate_left_to_right() {
    let source = "(begin
                    (define order nil)
                    (define (note x) (set! order (cons x order)) x)
                    (+ (note 1) (note 2) (note 3))
                    order)";
    assert_eq!(run_display(source), "(3 2 1)");
}

#[test]
fn and_short_circuits_before_the_error() {
    assert_eq!(run_value("(and #f (error \"x\"))"), Object::Bool(false));
}

#[test]
fn or_short_circuits_before_the_error() {
    assert_eq!(run_value("(or 5 (error \"x\"))"), Object::Int(5));
}

#[test]
fn and_returns_the_last_clause() {
    assert_eq!(run_value("(and 1 2 3)"), Object::Int(3));
}

#[test]
fn or_returns_false_when_every_clause_is_false() {
    assert_eq!(run_value("(or #f #f)"), Object::Bool(false));
}

/// Truthiness: only `#f` is false - `nil` and `0` take the true branch.
#[test]
fn nil_and_zero_are_true() {
    assert_eq!(run_value("(if nil 'yes 'no)"), Object::Symbol("yes".to_owned()));
    assert_eq!(run_value("(if 0 'yes 'no)"), Object::Symbol("yes".to_owned()));
}

#[test]
fn if_without_alternative_produces_no_value() {
    assert_eq!(run("(if #f 1)"), None);
}

// =============================================================================
// 4. Numbers
// =============================================================================

#[test]
fn integer_arithmetic_stays_integer() {
    assert_eq!(run_value("(+ 1 2)"), Object::Int(3));
    assert_eq!(run_value("(/ 6 3)"), Object::Int(2));
    assert_eq!(run_value("(/ 12 2 3)"), Object::Int(2));
}

#[test]
fn float_operands_promote_the_result() {
    assert_eq!(run_value("(+ 1 2.0)"), Object::Float(3.0));
    assert_eq!(run_value("(/ 7 2)"), Object::Float(3.5));
    assert_eq!(run_display("(+ 1 2.0)"), "3.0");
}

#[test]
fn unary_minus_and_reciprocal() {
    assert_eq!(run_value("(- 5)"), Object::Int(-5));
    assert_eq!(run_value("(/ 4)"), Object::Float(0.25));
}

#[test]
fn remainder_is_integer_only() {
    assert_eq!(run_value("(remainder 7 2)"), Object::Int(1));
    assert_eq!(run_err("(remainder 7.0 2)").kind(), ErrorKind::TypeMismatch);
}

#[test]
fn comparisons_promote_like_arithmetic() {
    assert_eq!(run_value("(< 1 1.5)"), Object::Bool(true));
    assert_eq!(run_value("(>= 2 2)"), Object::Bool(true));
    assert_eq!(run_value("(= 2 2.0)"), Object::Bool(true));
}

#[test]
fn max_and_min_keep_the_winning_operand_kind() {
    assert_eq!(run_value("(max 1 2.5 2)"), Object::Float(2.5));
    assert_eq!(run_value("(min 3 1 2)"), Object::Int(1));
}

// =============================================================================
// 5. Quotation
// =============================================================================

#[test]
fn quote_never_evaluates_unquote() {
    assert_eq!(run_display("'(1 ,(+ 1 1) 3)"), "(1 (unquote (+ 1 1)) 3)");
}

#[test]
fn quasiquote_splices_unquoted_values() {
    assert_eq!(run_display("`(1 ,(+ 1 1) 3)"), "(1 2 3)");
}

#[test]
fn quasiquote_splices_at_any_depth() {
    assert_eq!(run_display("`(a (b ,(* 2 3)))"), "(a (b 6))");
}

#[test]
fn quoted_symbols_compare_by_text() {
    assert_eq!(run_value("(eq? 'foo 'foo)"), Object::Bool(true));
    assert_eq!(run_value("(eq? 'foo 'bar)"), Object::Bool(false));
}

#[test]
fn quotation_rebuilds_fresh_data_each_time() {
    // mutating one quotation result must not affect the next
    let source = "(begin
                    (define (q) '(1 2 3))
                    (set-car! (q) 99)
                    (q))";
    assert_eq!(run_display(source), "(1 2 3)");
}

// =============================================================================
// 6. Variadic parameters
// =============================================================================

#[test]
fn bare_symbol_collects_every_argument() {
    assert_eq!(run_display("(begin (define (f . xs) xs) (f 1 2 3))"), "(1 2 3)");
}

#[test]
fn dotted_tail_collects_the_rest() {
    assert_eq!(run_display("(begin (define (g a . xs) xs) (g 1 2 3))"), "(2 3)");
}

#[test]
fn dotted_tail_accepts_exactly_the_fixed_arguments() {
    assert_eq!(run_display("(begin (define (g a . xs) xs) (g 1))"), "nil");
}

#[test]
fn lambda_with_bare_parameter_list() {
    assert_eq!(run_display("((lambda r r) 1 2)"), "(1 2)");
}

// =============================================================================
// 7. Printing
// =============================================================================

#[test]
fn print_separates_with_spaces_without_newline() {
    assert_eq!(run_output("(print 1 2 3)"), "1 2 3");
}

#[test]
fn printn_appends_a_newline() {
    assert_eq!(run_output("(begin (printn 1 2) (printn))"), "1 2\n\n");
}

#[test]
fn display_decodes_string_escapes() {
    assert_eq!(run_output("(display \"a\\nb\\t\\\"c\\\"\")"), "a\nb\t\"c\"");
}

#[test]
fn newline_emits_one_character() {
    assert_eq!(run_output("(begin (display 1) (newline) (display 2))"), "1\n2");
}

// =============================================================================
// 8. eq? / equal?
// =============================================================================

#[test]
fn eq_compares_booleans_by_identity() {
    assert_eq!(run_value("(eq? #t #t)"), Object::Bool(true));
    assert_eq!(run_value("(eq? #t #f)"), Object::Bool(false));
}

#[test]
fn eq_compares_strings_by_text() {
    assert_eq!(run_value("(eq? \"x\" \"x\")"), Object::Bool(true));
}

#[test]
fn eq_rejects_numbers() {
    assert_eq!(run_err("(eq? 1 1)").kind(), ErrorKind::TypeMismatch);
}

#[test]
fn equal_compares_numbers_across_kinds() {
    assert_eq!(run_value("(equal? 1 1.0)"), Object::Bool(true));
    assert_eq!(run_value("(equal? 'a 'a)"), Object::Bool(true));
}

// =============================================================================
// 9. argc / argv
// =============================================================================

#[test]
fn program_arguments_are_classified() {
    let args = vec![
        "script.scm".to_owned(),
        "42".to_owned(),
        "3.5".to_owned(),
        "hello".to_owned(),
    ];
    let runner = Runner::new("(begin argc)", "script.scm", args.clone()).unwrap();
    assert_eq!(
        runner.run(&mut NoPrint, &mut NoInput).unwrap(),
        Some(Object::Int(4))
    );

    let runner = Runner::new("(begin (cadr argv))", "script.scm", args.clone()).unwrap();
    assert_eq!(
        runner.run(&mut NoPrint, &mut NoInput).unwrap(),
        Some(Object::Int(42))
    );

    let runner = Runner::new("(begin (caddr argv))", "script.scm", args.clone()).unwrap();
    assert_eq!(
        runner.run(&mut NoPrint, &mut NoInput).unwrap(),
        Some(Object::Float(3.5))
    );

    let runner = Runner::new("(begin (car (cdddr argv)))", "script.scm", args).unwrap();
    assert_eq!(
        runner.run(&mut NoPrint, &mut NoInput).unwrap(),
        Some(Object::Symbol("hello".to_owned()))
    );
}

// =============================================================================
// 10. Errors
// =============================================================================

#[test]
fn unbound_variable_lookup() {
    assert_eq!(run_err("(begin frobnicate)").kind(), ErrorKind::UnboundVariable);
}

#[test]
fn set_bang_requires_an_existing_binding() {
    assert_eq!(run_err("(set! ghost 1)").kind(), ErrorKind::UnboundVariable);
}

#[test]
fn unassigned_placeholder_lookup() {
    assert_eq!(
        run_err("(begin (define x **unassigned**) x)").kind(),
        ErrorKind::UnassignedReference
    );
}

#[test]
fn the_placeholder_name_itself_evaluates() {
    assert_eq!(run_value("**unassigned**"), Object::Unassigned);
}

#[test]
fn arity_mismatch_on_compound_procedures() {
    assert_eq!(run_err("((lambda (x) x) 1 2)").kind(), ErrorKind::ArityMismatch);
    assert_eq!(
        run_err("(begin (define (g a . xs) xs) (g))").kind(),
        ErrorKind::ArityMismatch
    );
}

#[test]
fn car_of_a_non_pair() {
    assert_eq!(run_err("(car 5)").kind(), ErrorKind::TypeMismatch);
}

#[test]
fn applying_a_non_procedure() {
    assert_eq!(run_err("(3 4)").kind(), ErrorKind::TypeMismatch);
}

#[test]
fn user_error_carries_the_rendered_message() {
    let err = run_err("(error \"boom\" 42)");
    assert_eq!(err.kind(), ErrorKind::UserRaised);
    assert_eq!(err.message(), "boom 42");
}

#[test]
fn division_by_zero_is_reported() {
    assert_eq!(run_err("(/ 1 0)").kind(), ErrorKind::TypeMismatch);
}

#[test]
fn backtrace_records_in_flight_expressions_innermost_first() {
    let err = run_err("(begin (define (f) (g)) (define (g) (car 5)) (f))");
    let frames = err.backtrace();
    assert!(!frames.is_empty(), "error should carry a backtrace");
    assert_eq!(frames[0].rendered, "(car 5)");
    assert!(
        err.to_string().contains("BACKTRACE"),
        "display should include the backtrace banner: {err}"
    );
}

#[test]
fn include_rejects_unknown_modules() {
    assert_eq!(run_err("(include \"no-such-module\")").kind(), ErrorKind::TypeMismatch);
}

// =============================================================================
// 11. apply
// =============================================================================

#[test]
fn apply_spreads_a_list_of_arguments() {
    assert_eq!(run_value("(apply + (list 1 2 3))"), Object::Int(6));
}

#[test]
fn apply_works_with_compound_procedures() {
    let source = "(begin (define (add a b) (+ a b)) (apply add (list 20 22)))";
    assert_eq!(run_value(source), Object::Int(42));
}
