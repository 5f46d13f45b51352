//! Edge case tests: degenerate inputs must not panic or abort a batch.

use cyaction::analyzer::{AnalysisEngine, FileOutcome};
use cyaction::TestFile;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_temp(content: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

fn analyze_path(path: &Path) -> FileOutcome {
    AnalysisEngine::new().analyze_file(path)
}

fn analyze_str(content: &str) -> TestFile {
    let file = write_temp(content.as_bytes(), ".spec.ts");
    analyze_path(file.path()).file
}

#[test]
fn empty_file_no_panic() {
    let result = analyze_str("");
    assert!(result.error.is_none());
    assert_eq!(result.total_tests, 0);
}

#[test]
fn only_comments_no_crash() {
    let result = analyze_str("// nothing here\n/* it('commented', () => { cy.click() }) */");
    assert!(result.error.is_none());
    assert_eq!(result.total_tests, 0);
}

#[test]
fn plain_prose_falls_back_without_tests() {
    let result = analyze_str("hello world, this is not code");
    assert!(result.error.is_none());
    assert_eq!(result.total_tests, 0);
}

#[test]
fn invalid_utf8_is_a_read_error() {
    let file = write_temp(&[0xff, 0xfe, 0x00, 0x69, 0x74], ".spec.ts");
    let outcome = analyze_path(file.path());
    assert!(outcome.strategy.is_none());
    let error = outcome.file.error.unwrap();
    assert!(error.starts_with("File read error"), "{}", error);
}

#[test]
fn broken_file_without_tests_counts_whole_file() {
    let result = analyze_str("cy.getBySel('x').click(\ncy.type('a'\n");
    assert_eq!(result.total_tests, 1);
    let test = &result.tests["unknown test"];
    // chained and direct forms both match `cy.type(`
    assert_eq!(test.commands, vec!["click", "type", "type"]);
}

#[test]
fn broken_file_without_any_commands_is_empty() {
    let result = analyze_str("const x = {{{;");
    assert!(result.error.is_none());
    assert_eq!(result.total_tests, 0);
    assert!(result.tests.is_empty());
}

#[test]
fn test_without_callback() {
    let result = analyze_str("it('pending test');\nit.skip('skipped', () => { cy.click(); });");
    // `it.skip` is a member call, not the bare test function
    assert_eq!(result.total_tests, 1);
    assert_eq!(result.tests["pending test"].actionable_commands, 0);
}

#[test]
fn dynamic_test_names_are_skipped() {
    let result = analyze_str(
        "const name = 'dynamic';\n\
         it(name, () => { cy.click(); });\n\
         it(`templated ${name}`, () => { cy.click(); });\n\
         it('literal', () => { cy.click(); });",
    );
    assert_eq!(result.total_tests, 1);
    assert_eq!(result.tests["literal"].actionable_commands, 1);
}

#[test]
fn deeply_nested_describes() {
    let mut source = String::new();
    for i in 0..50 {
        source.push_str(&format!("describe('level {}', () => {{\n", i));
    }
    source.push_str("it('deep', () => { cy.visit('/'); cy.get('a').click(); });\n");
    for _ in 0..50 {
        source.push_str("});\n");
    }
    let result = analyze_str(&source);
    assert_eq!(result.tests["deep"].commands, vec!["visit", "click"]);
}

#[test]
fn very_long_chain() {
    let mut chain = String::from("cy.get('#a')");
    for _ in 0..200 {
        chain.push_str(".should('exist')");
    }
    chain.push_str(".click()");
    let result = analyze_str(&format!("it('long', () => {{ {}; }});", chain));
    assert_eq!(result.tests["long"].commands, vec!["click"]);
}

#[test]
fn unicode_test_names() {
    let result = analyze_str("it('ユーザーがログインできる 🍣', () => { cy.login('a', 'b'); });");
    assert_eq!(
        result.tests["ユーザーがログインできる 🍣"].commands,
        vec!["login"]
    );
}

#[test]
fn escaped_quotes_in_test_name() {
    let result = analyze_str(r#"it("says \"hi\"", () => { cy.type('x'); });"#);
    assert_eq!(result.tests["says \"hi\""].actionable_commands, 1);
}

#[test]
fn crlf_line_endings() {
    let result =
        analyze_str("describe('s', () => {\r\n  it('t', () => {\r\n    cy.visit('/');\r\n  });\r\n});\r\n");
    assert_eq!(result.tests["t"].commands, vec!["visit"]);
}

#[test]
fn jsx_in_ts_file_is_retried_as_tsx() {
    let result = analyze_str(
        "it('renders', () => {\n  mount(<Button label=\"Pay\" />);\n  cy.get('button').click();\n});\n",
    );
    assert!(result.error.is_none());
    assert_eq!(result.tests["renders"].commands, vec!["click"]);
}
