//! Shared AST helpers for the syntax-tree counter.
//!
//! Small utilities over tree-sitter nodes: text extraction, string literal
//! decoding, call-chain resolution and syntax error lookup.

use tree_sitter::Node;

/// Source text covered by a node
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Decoded value of a plain `'...'` or `"..."` string literal.
///
/// Returns `None` for anything else, including template strings.
pub fn string_literal_value(node: Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let mut value = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_fragment" => value.push_str(node_text(child, source)),
            "escape_sequence" => decode_escape(node_text(child, source), &mut value),
            _ => {}
        }
    }
    Some(value)
}

fn decode_escape(escape: &str, out: &mut String) {
    let body = escape.strip_prefix('\\').unwrap_or(escape);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return;
    };

    match first {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        'b' => out.push('\u{0008}'),
        'f' => out.push('\u{000C}'),
        'v' => out.push('\u{000B}'),
        '0' if body.len() == 1 => out.push('\0'),
        // Line continuation
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => {}
        'x' | 'u' => {
            let hex = body[1..].trim_start_matches('{').trim_end_matches('}');
            match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                Some(c) => out.push(c),
                None => out.push_str(escape),
            }
        }
        _ => out.push_str(body),
    }
}

/// Strip any number of enclosing parentheses: `((expr))` -> `expr`
pub fn unwrap_parens(node: Node) -> Node {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        match current.named_child(0) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Whether a member access or call is an optional link (`a?.b`, `f?.()`)
pub fn is_optional_link(node: Node) -> bool {
    node.child_by_field_name("optional_chain").is_some()
}

/// Whether a call's receiver chain bottoms out at the identifier `root`.
///
/// Starting from `node` (the object of the outermost member access), follow
/// plain member accesses (`a.b`) and calls on member accesses (`a.b()`)
/// inward, looking through parentheses. Optional links and any other node
/// end the walk unrecognized.
pub fn chain_root_is(node: Node, root: &str, source: &str) -> bool {
    let mut current = unwrap_parens(node);
    loop {
        match current.kind() {
            "identifier" => return node_text(current, source) == root,
            "member_expression" if !is_optional_link(current) => {
                match current.child_by_field_name("object") {
                    Some(object) => current = unwrap_parens(object),
                    None => return false,
                }
            }
            "call_expression" if !is_optional_link(current) => {
                let Some(function) = current.child_by_field_name("function") else {
                    return false;
                };
                let function = unwrap_parens(function);
                if function.kind() != "member_expression" || is_optional_link(function) {
                    return false;
                }
                match function.child_by_field_name("object") {
                    Some(object) => current = unwrap_parens(object),
                    None => return false,
                }
            }
            _ => return false,
        }
    }
}

/// Location and description of a syntax error in a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    pub message: String,
    /// 1-indexed
    pub line: usize,
    /// 1-indexed
    pub column: usize,
}

/// First ERROR or MISSING node in document order
pub fn first_syntax_error(node: Node, source: &str) -> Option<SyntaxErrorInfo> {
    if !node.has_error() {
        return None;
    }

    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        let message = if node.is_missing() {
            format!("Missing `{}`", node.kind())
        } else {
            let snippet: String = node_text(node, source)
                .chars()
                .take(20)
                .collect::<String>()
                .trim()
                .to_string();
            if snippet.is_empty() {
                "Unexpected token".to_string()
            } else {
                format!("Unexpected token `{}`", snippet)
            }
        };
        return Some(SyntaxErrorInfo {
            message,
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_syntax_error(child, source) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TypeScriptParser;

    fn first_call<'t>(node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() == "call_expression" {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        children.into_iter().find_map(first_call)
    }

    fn first_string<'t>(node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() == "string" {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        children.into_iter().find_map(first_string)
    }

    fn literal(source: &str) -> Option<String> {
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let node = first_string(tree.root_node()).unwrap();
        string_literal_value(node, source)
    }

    #[test]
    fn test_string_literal_plain() {
        assert_eq!(literal(r#"f("hello world");"#).as_deref(), Some("hello world"));
        assert_eq!(literal("f('single');").as_deref(), Some("single"));
        assert_eq!(literal("f('');").as_deref(), Some(""));
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(literal(r#"f("it\'s \"quoted\"");"#).as_deref(), Some("it's \"quoted\""));
        assert_eq!(literal(r#"f("a\nbA\x42");"#).as_deref(), Some("a\nbAB"));
    }

    #[test]
    fn test_chain_root() {
        let source = "cy.get('#el').should('exist').click();";
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let call = first_call(tree.root_node()).unwrap();
        let callee = call.child_by_field_name("function").unwrap();
        let object = callee.child_by_field_name("object").unwrap();
        assert!(chain_root_is(object, "cy", source));
        assert!(!chain_root_is(object, "page", source));
    }

    #[test]
    fn test_chain_root_rejects_plain_function_call() {
        let source = "getButton().click();";
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let call = first_call(tree.root_node()).unwrap();
        let callee = call.child_by_field_name("function").unwrap();
        let object = callee.child_by_field_name("object").unwrap();
        assert!(!chain_root_is(object, "cy", source));
    }

    #[test]
    fn test_chain_root_through_parentheses() {
        let source = "((cy.get('a'))).click();";
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let call = first_call(tree.root_node()).unwrap();
        let callee = call.child_by_field_name("function").unwrap();
        let object = callee.child_by_field_name("object").unwrap();
        assert_eq!(object.kind(), "parenthesized_expression");
        assert_eq!(unwrap_parens(object).kind(), "call_expression");
        assert!(chain_root_is(object, "cy", source));
    }

    #[test]
    fn test_chain_root_stops_at_optional_link() {
        let source = "cy.get('a')?.first().click();";
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let call = first_call(tree.root_node()).unwrap();
        let callee = call.child_by_field_name("function").unwrap();
        let object = callee.child_by_field_name("object").unwrap();
        assert!(!chain_root_is(object, "cy", source));
    }

    #[test]
    fn test_first_syntax_error() {
        let source = "const x = 1;\nconst = ;\n";
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let err = first_syntax_error(tree.root_node(), source).unwrap();
        assert_eq!(err.line, 2);

        let clean = "const x = 1;";
        let tree = parser.parse(clean).unwrap();
        assert!(first_syntax_error(tree.root_node(), clean).is_none());
    }
}
