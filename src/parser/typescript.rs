//! TypeScript parser using tree-sitter

use crate::error::AnalysisError;
use crate::parser::ast_helpers::first_syntax_error;
use std::path::Path;
use tree_sitter::{Language, Parser, Tree};

/// Grammar flavor understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Grammars to try for a file, most likely first. TypeScript covers
    /// plain JavaScript; TSX adds JSX but loses `<T>expr` casts, so both
    /// are always attempted.
    pub fn attempt_order(path: &Path) -> [Dialect; 2] {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "tsx" | "jsx" => [Dialect::Tsx, Dialect::TypeScript],
            _ => [Dialect::TypeScript, Dialect::Tsx],
        }
    }
}

/// Parser for TypeScript files using tree-sitter
pub struct TypeScriptParser {
    parser: Parser,
    dialect: Dialect,
}

impl TypeScriptParser {
    /// Create a new TypeScript parser
    pub fn new() -> Result<Self, AnalysisError> {
        Self::with_dialect(Dialect::TypeScript)
    }

    /// Create a new TSX parser
    pub fn new_tsx() -> Result<Self, AnalysisError> {
        Self::with_dialect(Dialect::Tsx)
    }

    pub fn with_dialect(dialect: Dialect) -> Result<Self, AnalysisError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| AnalysisError::Language(e.to_string()))?;
        Ok(Self { parser, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse source code into a syntax tree. The tree may contain error
    /// nodes; see [`parse_strict`] for a version that rejects them.
    pub fn parse(&mut self, source: &str) -> Result<Tree, AnalysisError> {
        self.parser.parse(source, None).ok_or_else(|| AnalysisError::Parse {
            message: "Failed to parse TypeScript source".to_string(),
            line: 1,
            column: 1,
        })
    }
}

/// Parse `source` and require a tree free of syntax errors.
///
/// Each dialect from [`Dialect::attempt_order`] is tried in turn. If every
/// grammar rejects the text, the error location reported is the one found
/// by the first grammar.
pub fn parse_strict(path: &Path, source: &str) -> Result<Tree, AnalysisError> {
    let mut first_failure: Option<AnalysisError> = None;

    for dialect in Dialect::attempt_order(path) {
        let mut parser = TypeScriptParser::with_dialect(dialect)?;
        let tree = match parser.parse(source) {
            Ok(tree) => tree,
            Err(e) => {
                first_failure.get_or_insert(e);
                continue;
            }
        };

        if !tree.root_node().has_error() {
            return Ok(tree);
        }

        if first_failure.is_none() {
            let (message, line, column) = match first_syntax_error(tree.root_node(), source) {
                Some(err) => (err.message, err.line, err.column),
                None => ("Syntax error".to_string(), 1, 1),
            };
            first_failure = Some(AnalysisError::Parse {
                message,
                line,
                column,
            });
        }
    }

    Err(first_failure.unwrap_or_else(|| AnalysisError::Parse {
        message: "Syntax error".to_string(),
        line: 1,
        column: 1,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse("const x = 1;").unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_strict_accepts_typescript() {
        let source = r#"
            const user: { name: string } = { name: "a" };
            it("types", () => { cy.visit("/" as string); });
        "#;
        assert!(parse_strict(Path::new("a.spec.ts"), source).is_ok());
    }

    #[test]
    fn test_parse_strict_falls_back_to_tsx_for_jsx() {
        let source = r#"
            it("mounts", () => { cy.mount(<Button label="ok" />); cy.get("button").click(); });
        "#;
        assert!(parse_strict(Path::new("button.cy.ts"), source).is_ok());
    }

    #[test]
    fn test_parse_strict_rejects_broken_source() {
        let err = parse_strict(Path::new("a.spec.ts"), "it('x', () => { cy.visit(; ").unwrap_err();
        let (line, column) = err.location().unwrap();
        assert_eq!(line, 1);
        assert!(column >= 1);
    }

    #[test]
    fn test_attempt_order() {
        assert_eq!(
            Dialect::attempt_order(Path::new("x.cy.tsx")),
            [Dialect::Tsx, Dialect::TypeScript]
        );
        assert_eq!(
            Dialect::attempt_order(Path::new("x.spec.js")),
            [Dialect::TypeScript, Dialect::Tsx]
        );
    }
}
