use strand_interpreter::interpreter::Interpreter;

fn run(source: &str) -> String {
    let mut interpreter = Interpreter::with_output(Vec::new());
    interpreter.run_source(source);
    String::from_utf8(interpreter.into_output()).unwrap()
}

// --- for loops ---

#[test]
fn test_for_iterates_inclusive_range() {
    assert_eq!(run("for i,1:3,print i"), "1\n2\n3\n");
}

#[test]
fn test_for_bounds_can_be_variables() {
    assert_eq!(run("n = 2\nfor i,1:n,print i"), "1\n2\n");
}

#[test]
fn test_for_empty_range_runs_zero_times() {
    assert_eq!(run("for i,3:1,print i"), "");
}

#[test]
fn test_for_reports_invalid_range() {
    let output = run("for i,1:\"a\",print i");
    assert!(output.contains("Invalid range"));
}

// --- branches ---

#[test]
fn test_if_runs_on_equal() {
    assert_eq!(run("x = 5\nif 5,x,print \"eq\""), "eq\n");
    assert_eq!(run("x = 5\nif 6,x,print \"eq\""), "");
}

#[test]
fn test_ifn_runs_on_not_equal() {
    assert_eq!(run("x = 5\nifn 6,x,print \"ne\""), "ne\n");
    assert_eq!(run("x = 5\nifn 5,x,print \"ne\""), "");
}

#[test]
fn test_ifs_runs_when_value_is_greater() {
    assert_eq!(run("x = 5\nifs 3,x,print \"gt\""), "gt\n");
    assert_eq!(run("x = 5\nifs 9,x,print \"gt\""), "");
}

#[test]
fn test_ifb_runs_when_value_is_less() {
    assert_eq!(run("x = 5\nifb 9,x,print \"lt\""), "lt\n");
    assert_eq!(run("x = 5\nifb 3,x,print \"lt\""), "");
}

#[test]
fn test_branch_compares_text_operands() {
    assert_eq!(run("s = \"go\"\nif \"go\",s,print \"match\""), "match\n");
}

#[test]
fn test_wildcard_forces_the_action() {
    // `*` in either operand position wins over the comparison.
    assert_eq!(run("x = 5\nifn 5,x,print \"no\"\nifn *,x,print \"yes\""), "yes\n");
    assert_eq!(run("x = 5\nif 6,*,print \"yes\""), "yes\n");
}

#[test]
fn test_wildcard_in_the_action_field_is_not_special() {
    // Only the comparison operands honor `*`; an action of `*` is an
    // ordinary fragment and classifies as invalid when it runs. The
    // fragment advances the shared counter before reporting.
    assert_eq!(run("x = 5\nif 6,x,*"), "");
    assert_eq!(run("x = 5\nif 5,x,*"), "Invalid statement at line 3: *\n");
}

#[test]
fn test_branch_action_is_a_fragment() {
    // The action keeps its commas and is dispatched recursively.
    assert_eq!(run("if 1,1,for i,1:2,print i"), "1\n2\n");
}

// --- while loops ---

#[test]
fn test_whilen_loops_until_equal() {
    assert_eq!(run("x = 0\nwhilen 3,x,x++\nprint x"), "3\n");
}

#[test]
fn test_while_loops_while_equal() {
    assert_eq!(run("x = 0\nwhile x,0,x++\nprint x"), "1\n");
}

#[test]
fn test_quoted_loop_operand_stays_literal() {
    // A quoted operand is a fixed literal on every pass; the unquoted
    // side is re-evaluated.
    let source = "s = \"go\"\n/finish{s = \"done\"}\nwhile \"go\",s,@finish()\nprint s";
    assert_eq!(run(source), "done\n");
}

#[test]
fn test_line_counter_is_shared_with_fragments() {
    // Body statements of the call advance the same counter, so the
    // diagnostic for the third physical line lands at line 5.
    let source = "/setup{x = 1|x++}\n@setup()\nfoobar";
    let output = run(source);
    assert!(output.contains("Invalid statement at line 5: foobar"));
}
