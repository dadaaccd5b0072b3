use strand_interpreter::ast::Value;
use strand_interpreter::interpreter::Interpreter;

fn run(source: &str) -> String {
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.run_source(source);
    String::from_utf8(interpreter.into_output()).unwrap()
}

#[test]
fn test_print_digit_variable() {
    assert_eq!(run("x = 5\nprint x"), "5\n");
}

#[test]
fn test_print_quoted_literal() {
    assert_eq!(run("print \"hello\""), "hello\n");
}

#[test]
fn test_print_substitutes_newline_escape() {
    assert_eq!(run(r#"print "a\nb""#), "a\nb\n");
}

#[test]
fn test_print_skips_no_value() {
    // A mixed chain yields no value; print writes nothing for it.
    let output = run("x = 1\ns = \"a\"\nprint x+s");
    assert_eq!(output, "");
}

#[test]
fn test_assignment_keeps_last_value() {
    assert_eq!(run("x = 1\nx = 2\nprint x"), "2\n");
}

#[test]
fn test_assignment_changes_variant() {
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.run_source("x = 1\nx = \"text\"");
    assert_eq!(interpreter.ctx.get("x"), Some(&Value::Text("text".to_string())));
}

#[test]
fn test_del_removes_variable() {
    let output = run("x = 5\ndel(x)\nprint x");
    assert!(output.contains("Error at line 3: Variable 'x' is not defined"));
    assert!(!output.contains("5\n"));
}

#[test]
fn test_del_unknown_variable_is_reported() {
    let output = run("del(x)");
    assert!(output.contains("Error at line 1: Variable 'x' is not defined"));
}

#[test]
fn test_increment_and_decrement() {
    assert_eq!(run("x = 1\nx++\nprint x"), "2\n");
    assert_eq!(run("x = 1\nx--\nprint x"), "0\n");
}

#[test]
fn test_increment_requires_integer() {
    let output = run("s = \"a\"\ns++");
    assert!(output.contains("Cannot increment 's'"));
}

#[test]
fn test_increment_unknown_variable_is_reported() {
    let output = run("x++");
    assert!(output.contains("Variable 'x' is not defined"));
}

#[test]
fn test_cast_hint_int() {
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.run_source("s = \"41\"\nx = int(s) = s");
    assert_eq!(interpreter.ctx.get("x"), Some(&Value::Int(41)));
}

#[test]
fn test_cast_hint_str() {
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.run_source("n = 41\ns = str(n) = n");
    assert_eq!(interpreter.ctx.get("s"), Some(&Value::Text("41".to_string())));
}

#[test]
fn test_errors_do_not_stop_the_run() {
    let output = run("del(x)\nprint \"still here\"");
    assert!(output.contains("Variable 'x' is not defined"));
    assert!(output.contains("still here"));
}
