use hissp_foundation::Span;

#[test]
fn combining_two_spans_keeps_the_first_start_and_the_second_end() {
    let a = Span::new(0, 4, 1, 1);
    let b = Span::new(10, 14, 2, 1);
    let combined = a.to(b);
    assert_eq!(combined.start, 0);
    assert_eq!(combined.end, 14);
    assert_eq!(combined.line, 1);
}

#[test]
fn text_slices_the_source_by_byte_offset() {
    let source = "(print 1)";
    let span = Span::new(1, 6, 1, 2);
    assert_eq!(span.text(source), "print");
}

#[test]
fn empty_span_reports_zero_length() {
    let span = Span::new(5, 5, 1, 6);
    assert!(span.is_empty());
    assert_eq!(span.len(), 0);
}
