//! Parser module for Cypress test files

pub mod ast_helpers;
pub mod typescript;

pub use ast_helpers::{
    chain_root_is, first_syntax_error, is_optional_link, node_text, string_literal_value,
    unwrap_parens, SyntaxErrorInfo,
};
pub use typescript::{parse_strict, Dialect, TypeScriptParser};
