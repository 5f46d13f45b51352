//! Regex fallback counter
//!
//! Used only when the syntax tree cannot be built. Test blocks are cut out
//! of the raw text with a ladder of increasingly loose patterns, then
//! actionable commands are counted inside each block by name alone: there
//! is no check that a `.click(` actually hangs off `cy`.

use super::{CountingStrategy, COMMAND_NAMESPACE};
use crate::commands::CommandSets;
use crate::error::AnalysisError;
use crate::{TestCaseResult, TestFile};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Name given to the whole-file pseudo test when no block is found
pub const UNKNOWN_TEST_NAME: &str = "unknown test";

/// Max characters taken after a bare `it("name"` when nothing else matched
pub const APPROXIMATE_BLOCK_CHARS: usize = 1000;

/// A test declaration and the text believed to be its body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBlock {
    pub name: String,
    pub body: String,
}

/// Where the next search starts after a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    /// After the whole match
    MatchEnd,
    /// After the body capture; the rest of the match is only a terminator
    BodyEnd,
}

/// One rung of the extraction ladder. Group 1 is the test name, group 2
/// the body.
struct BlockPattern {
    label: &'static str,
    regex: Regex,
    resume: Resume,
}

impl BlockPattern {
    fn new(label: &'static str, pattern: &str, resume: Resume) -> Self {
        Self {
            label,
            regex: Regex::new(pattern).expect("block pattern must compile"),
            resume,
        }
    }

    fn matches(&self, content: &str) -> Vec<TestBlock> {
        let mut blocks = Vec::new();
        let mut start = 0;

        while start <= content.len() {
            let Some(caps) = self.regex.captures_at(content, start) else {
                break;
            };
            let (Some(whole), Some(name), Some(body)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };

            if !name.as_str().is_empty() && !body.as_str().is_empty() {
                blocks.push(TestBlock {
                    name: name.as_str().to_string(),
                    body: body.as_str().to_string(),
                });
            }

            let next = match self.resume {
                Resume::MatchEnd => whole.end(),
                Resume::BodyEnd => body.end(),
            };
            start = if next > whole.start() {
                next
            } else {
                whole.start() + 1
            };
        }

        blocks
    }
}

/// The ladder, most specific first
fn block_patterns() -> &'static [BlockPattern] {
    static PATTERNS: OnceLock<Vec<BlockPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            BlockPattern::new(
                "arrow",
                r#"(?m)it\s*\(\s*["'](.*?)["']\s*,\s*\(\s*\)\s*=>\s*\{([\s\S]*?)^\s*\}\s*\)"#,
                Resume::MatchEnd,
            ),
            BlockPattern::new(
                "function",
                r#"(?m)it\s*\(\s*["'](.*?)["']\s*,\s*function\s*\(\s*\)\s*\{([\s\S]*?)^\s*\}\s*\)"#,
                Resume::MatchEnd,
            ),
            BlockPattern::new(
                "async-arrow",
                r#"(?m)it\s*\(\s*["'](.*?)["']\s*,\s*async\s*\(\s*\)\s*=>\s*\{([\s\S]*?)^\s*\}\s*\)"#,
                Resume::MatchEnd,
            ),
            BlockPattern::new(
                "any-body",
                r#"it\s*\(\s*["'](.*?)["']\s*,[\s\S]*?\{([\s\S]*?)\n\s*\}\s*(?:\)|;)"#,
                Resume::BodyEnd,
            ),
        ]
    })
}

fn bare_declaration() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"it\s*\(\s*["'](.*?)["']"#).expect("declaration pattern must compile")
    })
}

/// Cut test blocks out of raw text.
///
/// Every pattern of the ladder is applied over the whole text; a name
/// captured by an earlier pattern is never replaced by a later one. When no
/// pattern yields anything, each bare `it("name"` gets the next
/// [`APPROXIMATE_BLOCK_CHARS`] characters as its body.
pub fn extract_test_blocks(content: &str) -> Vec<TestBlock> {
    let mut blocks: Vec<TestBlock> = Vec::new();

    for pattern in block_patterns() {
        let found = pattern.matches(content);
        let before = blocks.len();
        for block in found {
            if !blocks.iter().any(|b| b.name == block.name) {
                blocks.push(block);
            }
        }
        debug!(pattern = pattern.label, added = blocks.len() - before, "block pattern applied");
    }

    if !blocks.is_empty() {
        return blocks;
    }

    for caps in bare_declaration().captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if name.as_str().is_empty() {
            continue;
        }
        let body: String = content[whole.end()..]
            .chars()
            .take(APPROXIMATE_BLOCK_CHARS)
            .collect();

        // Repeated names keep their first position but take the latest body
        match blocks.iter_mut().find(|b| b.name == name.as_str()) {
            Some(existing) => existing.body = body,
            None => blocks.push(TestBlock {
                name: name.as_str().to_string(),
                body,
            }),
        }
    }

    blocks
}

/// Finds `.command(` and `cy.command(` occurrences for actionable names
pub struct CommandMatcher {
    chained: Regex,
    direct: Regex,
}

impl CommandMatcher {
    /// Build matchers for the actionable set. `None` when the set is empty.
    pub fn new(commands: &CommandSets) -> Result<Option<Self>, AnalysisError> {
        if commands.actionable().is_empty() {
            return Ok(None);
        }

        let alternation = commands
            .actionable()
            .iter()
            .map(|c| regex::escape(c))
            .collect::<Vec<_>>()
            .join("|");

        let chained = Regex::new(&format!(r"\.({})\(", alternation))?;
        let direct = Regex::new(&format!(r"{}\.({})\(", COMMAND_NAMESPACE, alternation))?;
        Ok(Some(Self { chained, direct }))
    }

    /// All matched command names: chained form first, then direct form.
    /// A direct `cy.click(` matches both forms and is reported twice.
    pub fn find_commands(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();
        for regex in [&self.chained, &self.direct] {
            for caps in regex.captures_iter(text) {
                if let Some(name) = caps.get(1) {
                    found.push(name.as_str().to_string());
                }
            }
        }
        found
    }
}

/// Secondary strategy: approximate counts from raw text
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexFallbackCounter;

impl RegexFallbackCounter {
    pub fn new() -> Self {
        Self
    }
}

impl CountingStrategy for RegexFallbackCounter {
    fn name(&self) -> &'static str {
        "regex-fallback"
    }

    fn count(
        &self,
        _path: &Path,
        source: &str,
        commands: &CommandSets,
    ) -> Result<TestFile, AnalysisError> {
        let matcher = CommandMatcher::new(commands)?;
        let find = |text: &str| -> Vec<String> {
            matcher
                .as_ref()
                .map(|m| m.find_commands(text))
                .unwrap_or_default()
        };

        let mut result = TestFile::default();
        let blocks = extract_test_blocks(source);

        if blocks.is_empty() {
            debug!("no test blocks found, scanning whole file");
            let found = find(source);
            if !found.is_empty() {
                let mut test = TestCaseResult::new(1);
                for command in &found {
                    test.record(command);
                }
                result.tests.insert(UNKNOWN_TEST_NAME.to_string(), test);
            }
        } else {
            for (index, block) in blocks.into_iter().enumerate() {
                let mut test = TestCaseResult::new(index + 1);
                for command in find(&block.body) {
                    test.record(&command);
                }
                result.tests.insert(block.name, test);
            }
        }

        result.total_tests = result.tests.len();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(source: &str) -> TestFile {
        RegexFallbackCounter::new()
            .count(Path::new("broken.spec.ts"), source, &CommandSets::default())
            .unwrap()
    }

    #[test]
    fn test_arrow_blocks_extracted() {
        let source = "describe('s', () => {\n  it('one', () => {\n    cy.get('a').click();\n  })\n  it('two', () => {\n    cy.get('b').type('x');\n  })\n})";
        let blocks = extract_test_blocks(source);
        let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
        assert!(blocks[0].body.contains("click"));
        assert!(!blocks[0].body.contains("type"));
    }

    #[test]
    fn test_function_and_async_blocks_extracted() {
        let source = "it(\"sync fn\", function () {\n  cy.click();\n})\nit(\"async\", async () => {\n  cy.submit();\n})\n";
        let names: Vec<String> = extract_test_blocks(source)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert!(names.contains(&"sync fn".to_string()));
        assert!(names.contains(&"async".to_string()));
    }

    #[test]
    fn test_earlier_pattern_wins_for_same_name() {
        let source = "it('t', () => {\n  cy.visit('/');\n})\n";
        let blocks = extract_test_blocks(source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "\n  cy.visit('/');\n");
    }

    #[test]
    fn test_any_body_pattern_resumes_at_body_end() {
        let source = "it('a', (done) => {\n  cy.click();\n  if (x) {\n    cy.type('y');\n  }\n  done();\n});\nit('b', { retries: 2 }, () => {\n  cy.visit('/');\n});\n";
        let blocks = extract_test_blocks(source);
        assert_eq!(
            blocks,
            vec![
                TestBlock {
                    name: "a".into(),
                    body: "\n  cy.click();\n  if (x) {\n    cy.type('y');\n  }\n  done();".into(),
                },
                TestBlock {
                    name: "b".into(),
                    body: " retries: 2 }, () => {\n  cy.visit('/');".into(),
                },
            ]
        );

        let result = count(source);
        // chained matches first, then the direct `cy.` forms
        assert_eq!(result.tests["a"].commands, vec!["click", "type", "click", "type"]);
        assert_eq!(result.tests["b"].order_in_file, 2);
    }

    #[test]
    fn test_bare_declaration_fallback() {
        let source = "it('dangling' cy.get('a').click()";
        let blocks = extract_test_blocks(source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "dangling");
        assert!(blocks[0].body.starts_with(" cy.get"));
    }

    #[test]
    fn test_bare_declaration_body_is_bounded() {
        let source = format!("it('long' {}", "x".repeat(5000));
        let blocks = extract_test_blocks(&source);
        assert_eq!(blocks[0].body.chars().count(), APPROXIMATE_BLOCK_CHARS);
    }

    #[test]
    fn test_direct_calls_match_both_forms() {
        let commands = CommandSets::default();
        let matcher = CommandMatcher::new(&commands).unwrap().unwrap();
        assert_eq!(
            matcher.find_commands("cy.visit('/'); cy.get('a').click();"),
            vec!["visit", "click", "visit"]
        );
    }

    #[test]
    fn test_counts_per_block() {
        let source = "it('one', () => {\n  cy.get('a').click();\n  cy.get('b').click();\n})\nit('two', () => {\n  cy.get('c').should('exist');\n})\n<<<";
        let result = count(source);
        assert_eq!(result.total_tests, 2);
        assert_eq!(result.tests["one"].actionable_commands, 2);
        assert_eq!(result.tests["one"].order_in_file, 1);
        assert_eq!(result.tests["two"].actionable_commands, 0);
        assert_eq!(result.tests["two"].order_in_file, 2);
    }

    #[test]
    fn test_whole_file_scan_when_no_blocks() {
        let result = count("<<< cy.get('a').click() >>>");
        assert_eq!(result.total_tests, 1);
        let test = &result.tests[UNKNOWN_TEST_NAME];
        assert_eq!(test.commands, vec!["click"]);
    }

    #[test]
    fn test_whole_file_without_commands_reports_nothing() {
        let result = count("<<< nothing to see >>>");
        assert_eq!(result.total_tests, 0);
        assert!(result.tests.is_empty());
    }

    #[test]
    fn test_empty_actionable_set_counts_nothing() {
        let commands = CommandSets::new(Vec::<String>::new(), ["get"]);
        let result = RegexFallbackCounter::new()
            .count(
                Path::new("x.spec.ts"),
                "it('t', () => {\n  cy.click();\n})\n",
                &commands,
            )
            .unwrap();
        assert_eq!(result.tests["t"].actionable_commands, 0);
    }

    #[test]
    fn test_commands_are_escaped() {
        let commands = CommandSets::new(["a.b"], Vec::<String>::new());
        let matcher = CommandMatcher::new(&commands).unwrap().unwrap();
        assert!(matcher.find_commands(".axb(").is_empty());
        assert_eq!(matcher.find_commands(".a.b("), vec!["a.b"]);
    }
}
