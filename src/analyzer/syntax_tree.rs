//! Syntax-tree command counter
//!
//! Walks the tree-sitter AST depth-first. A call `it("name", ...)` opens a
//! test case; while a test is open, every call whose callee is a member
//! access rooted at `cy` is counted when its final member is actionable:
//!
//! ```text
//! cy.visit("/")                          -> visit   (direct)
//! cy.get("#el").should("exist").click()  -> click   (chained, root `cy`)
//! page.click()                           -> ignored (root is not `cy`)
//! ```

use super::{CountingStrategy, COMMAND_NAMESPACE, IGNORED_TEST_PREFIXES, TEST_FUNCTION};
use crate::commands::CommandSets;
use crate::error::AnalysisError;
use crate::parser::{
    chain_root_is, is_optional_link, node_text, parse_strict, string_literal_value, unwrap_parens,
};
use crate::{TestCaseResult, TestFile};
use std::path::Path;
use tracing::warn;
use tree_sitter::{Node, Tree};

/// Primary strategy: exact counts from the syntax tree
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxTreeCounter;

impl SyntaxTreeCounter {
    pub fn new() -> Self {
        Self
    }

    /// Count over an already parsed tree
    pub fn count_tree(&self, tree: &Tree, source: &str, commands: &CommandSets) -> TestFile {
        let mut context = VisitorContext::new(source, commands);
        let mut cursor = tree.walk();

        loop {
            context.enter(cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                context.exit(cursor.node());
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return context.finish();
                }
            }
        }
    }
}

impl CountingStrategy for SyntaxTreeCounter {
    fn name(&self) -> &'static str {
        "syntax-tree"
    }

    fn count(
        &self,
        path: &Path,
        source: &str,
        commands: &CommandSets,
    ) -> Result<TestFile, AnalysisError> {
        let tree = parse_strict(path, source)?;
        Ok(self.count_tree(&tree, source, commands))
    }
}

/// Per-file walk state. Holds at most one open test: a nested `it(...)`
/// takes over the slot and clears it on exit, so the rest of the outer
/// test body goes uncounted.
struct VisitorContext<'a> {
    source: &'a str,
    commands: &'a CommandSets,
    current_test: Option<String>,
    tests_seen: usize,
    result: TestFile,
}

impl<'a> VisitorContext<'a> {
    fn new(source: &'a str, commands: &'a CommandSets) -> Self {
        Self {
            source,
            commands,
            current_test: None,
            tests_seen: 0,
            result: TestFile::default(),
        }
    }

    fn enter(&mut self, node: Node) {
        let Some(callee) = plain_callee(node) else {
            return;
        };

        if self.is_test_callee(callee) {
            if let Some(name) = self.test_name(node) {
                self.open_test(name);
            }
            return;
        }

        if self.current_test.is_some()
            && callee.kind() == "member_expression"
            && !is_optional_link(callee)
        {
            if let Some(command) = self.actionable_command(callee) {
                self.record(command);
            }
        }
    }

    fn exit(&mut self, node: Node) {
        if let Some(callee) = plain_callee(node) {
            if self.is_test_callee(callee) {
                self.current_test = None;
            }
        }
    }

    fn is_test_callee(&self, callee: Node) -> bool {
        callee.kind() == "identifier" && node_text(callee, self.source) == TEST_FUNCTION
    }

    /// First argument of a test call, if it is a usable plain string
    fn test_name(&self, call: Node) -> Option<String> {
        let args = call.child_by_field_name("arguments")?;
        if args.kind() != "arguments" {
            return None;
        }
        let mut cursor = args.walk();
        let first = args.named_children(&mut cursor).next()?;
        let name = string_literal_value(unwrap_parens(first), self.source)?;
        if name.starts_with(IGNORED_TEST_PREFIXES) {
            return None;
        }
        Some(name)
    }

    fn open_test(&mut self, name: String) {
        if let Some(ref outer) = self.current_test {
            warn!(outer = %outer, inner = %name, "nested test declaration; outer test stops counting");
        }

        let key = self.unique_name(name);
        self.tests_seen += 1;
        self.result
            .tests
            .insert(key.clone(), TestCaseResult::new(self.tests_seen));
        self.current_test = Some(key);
    }

    fn unique_name(&self, name: String) -> String {
        if !self.result.tests.contains_key(&name) {
            return name;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{} ({})", name, n);
            if !self.result.tests.contains_key(&candidate) {
                warn!(test = %name, renamed = %candidate, "duplicate test name");
                return candidate;
            }
            n += 1;
        }
    }

    /// Final member name of `callee` if it is actionable and the chain is
    /// rooted at the command namespace.
    fn actionable_command(&self, callee: Node) -> Option<&'a str> {
        let property = callee.child_by_field_name("property")?;
        if property.kind() != "property_identifier" {
            return None;
        }
        let name = node_text(property, self.source);
        if !self.commands.is_actionable(name) {
            return None;
        }
        let object = callee.child_by_field_name("object")?;
        chain_root_is(object, COMMAND_NAMESPACE, self.source).then_some(name)
    }

    fn record(&mut self, command: &str) {
        let Some(ref name) = self.current_test else {
            return;
        };
        if let Some(test) = self.result.tests.get_mut(name) {
            test.record(command);
        }
    }

    fn finish(mut self) -> TestFile {
        self.result.total_tests = self.result.tests.len();
        self.result
    }
}

/// Callee of a plain call, parentheses removed.
///
/// `None` for non-calls and for calls that belong to an optional chain
/// (`a?.b()`, `a?.b.c()`, `f?.()`): those are not command invocations.
/// Parentheses end an optional chain, so `(a?.b).c()` is a plain call.
fn plain_callee(node: Node) -> Option<Node> {
    if node.kind() != "call_expression" {
        return None;
    }
    let callee = node.child_by_field_name("function")?;

    let mut link = node;
    loop {
        if is_optional_link(link) {
            return None;
        }
        let next = match link.kind() {
            "call_expression" => link.child_by_field_name("function"),
            "member_expression" => link.child_by_field_name("object"),
            _ => None,
        };
        match next {
            Some(inner) => link = inner,
            None => break,
        }
    }

    Some(unwrap_parens(callee))
}
