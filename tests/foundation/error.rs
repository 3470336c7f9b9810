use hissp_foundation::{Error, ErrorKind, LexError, ParseError, Span};

#[test]
fn error_display_delegates_to_its_kind() {
    let err = Error::new(ErrorKind::Lex(LexError::UnterminatedString));
    assert_eq!(format!("{err}"), "lex error: unterminated string literal");
}

#[test]
fn at_attaches_a_span_without_changing_the_kind() {
    let span = Span::new(2, 5, 1, 3);
    let err = Error::new(ErrorKind::Parse(ParseError::UnexpectedCloseParen)).at(span);
    assert_eq!(err.span, Some(span));
    assert!(matches!(err.kind, ErrorKind::Parse(ParseError::UnexpectedCloseParen)));
}

#[test]
fn expansion_errors_nest_their_cause_in_the_message() {
    let cause = Error::new(ErrorKind::Lex(LexError::TabInIndentation));
    let wrapped = Error::new(ErrorKind::Expansion {
        cause: Box::new(cause),
        site: "(my-macro 1)".to_string(),
    });
    let msg = format!("{wrapped}");
    assert!(msg.contains("my-macro"));
    assert!(msg.contains("TAB"));
}

#[test]
fn a_fresh_error_carries_no_span() {
    let err = Error::new(ErrorKind::Internal("unreachable".to_string()));
    assert!(err.span.is_none());
}
