use std::fs;
use strand_interpreter::interpreter::Interpreter;

fn run(source: &str) -> String {
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.run_source(source);
    String::from_utf8(interpreter.into_output()).unwrap()
}

#[test]
fn test_type_names_each_variant() {
    assert_eq!(run("print type(5)"), "int\n");
    assert_eq!(run("print type(\"abc\")"), "str\n");
    assert_eq!(run("items = split(\"a b\")\nprint type(items)"), "list\n");
}

#[test]
fn test_len_of_text_and_list() {
    assert_eq!(run("s = \"abc\"\nprint len(s)"), "3\n");
    assert_eq!(run("items = split(\"a b c\")\nprint len(items)"), "3\n");
}

#[test]
fn test_len_rejects_integers() {
    let output = run("n = 5\nprint len(n)");
    assert!(output.contains("'len' expects a list or text variable"));
}

#[test]
fn test_splitby_keeps_quoted_separator() {
    assert_eq!(run("parts = splitby(\",\",\"a,b\")\nprint parts"), "[a, b]\n");
}

#[test]
fn test_splitby_separator_can_be_a_variable() {
    assert_eq!(
        run("sep = \"-\"\nparts = splitby(sep,\"a-b-c\")\nprint parts"),
        "[a, b, c]\n"
    );
}

#[test]
fn test_isanumber() {
    assert_eq!(run("print isanumber(\"12\")"), "1\n");
    assert_eq!(run("print isanumber(\"12a\")"), "0\n");
}

#[test]
fn test_all_over_truthiness() {
    assert_eq!(run("items = split(\"a b\")\nprint all(items)"), "1\n");
    assert_eq!(run("items = split(\"a\")\nappend items,0\nprint all(items)"), "0\n");
}

#[test]
fn test_cprint_adds_one_level_of_indirection() {
    assert_eq!(run("x = 5\nref = \"x\"\ncprint ref"), "5\n");
}

#[test]
fn test_cprint_prints_digits_verbatim() {
    assert_eq!(run("cprint 7"), "7\n");
}

#[test]
fn test_read_missing_file_yields_empty_text() {
    let output = run("t = read(\"/no/such/strand-file\")\nprint type(t)");
    assert!(output.contains("Cannot read file"));
    assert!(output.ends_with("str\n"));
}

#[test]
fn test_write_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt").display().to_string();
    let source = format!("write(\"{path}\",\"hello\")\nt = read(\"{path}\")\nprint t");
    assert_eq!(run(&source), "hello\n");
}

#[test]
fn test_write_renders_a_list_one_element_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt").display().to_string();
    let source = format!("items = split(\"a b c\")\nwrite(\"{path}\",items)");
    run(&source);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc");
}

#[test]
fn test_splitlines_over_file_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    fs::write(&path, "l1\nl2\nl3").unwrap();
    let source = format!(
        "t = read(\"{}\")\nls = splitlines(t)\nprint len(ls)\nprint ls",
        path.display()
    );
    assert_eq!(run(&source), "3\n[l1, l2, l3]\n");
}

#[test]
fn test_exec_is_disabled_by_default() {
    let output = run("exec true");
    assert!(output.contains("Shell access is disabled; run with --allow-exec to enable it"));
}

#[cfg(unix)]
#[test]
fn test_exec_runs_when_enabled() {
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.allow_exec(true);
    interpreter.run_source("exec true");
    let output = String::from_utf8(interpreter.into_output()).unwrap();
    assert_eq!(output, "");
}
