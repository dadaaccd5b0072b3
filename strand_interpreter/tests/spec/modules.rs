use std::fs;
use std::path::Path;
use strand_interpreter::interpreter::Interpreter;

fn write_program(dir: &Path, name: &str, source: &str) {
    fs::write(dir.join(name), source).unwrap();
}

fn run_main(dir: &Path, source: &str) -> String {
    let main_path = dir.join("main.sd");
    fs::write(&main_path, source).unwrap();
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.run_file(&main_path, &[]).unwrap();
    String::from_utf8(interpreter.into_output()).unwrap()
}

#[test]
fn test_import_makes_functions_callable() {
    let dir = tempfile::tempdir().unwrap();
    write_program(dir.path(), "lib.sd", "/hello{print \"hi\"}\n");
    let output = run_main(dir.path(), "use ./lib.sd\n@hello()");
    assert_eq!(output, "hi\n");
}

#[test]
fn test_import_overwrites_existing_functions() {
    let dir = tempfile::tempdir().unwrap();
    write_program(dir.path(), "lib.sd", "/hello{print \"from module\"}\n");
    let output = run_main(
        dir.path(),
        "/hello{print \"local\"}\nuse ./lib.sd\n@hello()",
    );
    assert_eq!(output, "from module\n");
}

#[test]
fn test_non_definition_lines_are_reported_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    write_program(
        dir.path(),
        "lib.sd",
        "print \"not allowed\"\n/hello{print \"hi\"}\n",
    );
    let output = run_main(dir.path(), "use ./lib.sd\n@hello()");
    assert!(output.contains("Invalid statement in module './lib.sd': print \"not allowed\""));
    assert!(output.ends_with("hi\n"));
}

#[test]
fn test_blank_module_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_program(dir.path(), "lib.sd", "\n\n/hello{print \"hi\"}\n\n");
    let output = run_main(dir.path(), "use ./lib.sd\n@hello()");
    assert_eq!(output, "hi\n");
}

#[test]
fn test_missing_module_is_reported_and_the_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_main(dir.path(), "use ./absent.sd\nprint \"after\"");
    assert!(output.contains("Cannot open module"));
    assert!(output.contains("after"));
}

#[test]
fn test_positional_arguments_bind_as_parg_variables() {
    let dir = tempfile::tempdir().unwrap();
    let main_path = dir.path().join("main.sd");
    fs::write(&main_path, "print parg0\nprint parg1").unwrap();
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter
        .run_file(&main_path, &["alpha".to_string(), "beta".to_string()])
        .unwrap();
    let output = String::from_utf8(interpreter.into_output()).unwrap();
    assert_eq!(output, "alpha\nbeta\n");
}

#[test]
fn test_missing_program_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut interpreter = Interpreter::with_output(Vec::new());
    let result = interpreter.run_file(&dir.path().join("absent.sd"), &[]);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Cannot open program file"));
}
