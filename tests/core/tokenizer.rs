use hissp_core::{Token, TokenKind, Tokenizer};
use hissp_foundation::ErrorKind;

fn kinds(source: &str) -> Vec<TokenKind> {
    Tokenizer::tokenize_all(source)
        .unwrap()
        .into_iter()
        .map(|t: Token| t.kind)
        .collect()
}

#[test]
fn a_plain_call_tokenizes_to_parens_and_atoms() {
    let kinds = kinds("(add 1 2)");
    assert_eq!(
        kinds,
        vec![
            TokenKind::OpenParen,
            TokenKind::Atom("add".to_string()),
            TokenKind::Atom("1".to_string()),
            TokenKind::Atom("2".to_string()),
            TokenKind::CloseParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn consecutive_comment_lines_with_equal_leading_semicolons_collapse() {
    let kinds = kinds(";; one\n;; two\n(x)");
    let comment_count = kinds.iter().filter(|k| matches!(k, TokenKind::Comment(_))).count();
    assert_eq!(comment_count, 1);
}

#[test]
fn a_tab_in_indentation_is_a_lex_error() {
    let err = Tokenizer::tokenize_all("\t(x)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Lex(hissp_foundation::LexError::TabInIndentation)));
}

#[test]
fn builtin_tags_are_recognized() {
    let kinds = kinds("`,@,x");
    assert!(kinds.iter().any(|k| matches!(k, TokenKind::Builtin(_))));
}
