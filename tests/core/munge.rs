use hissp_core::{demunge, munge};
use proptest::prelude::*;

#[test]
fn hyphen_and_plus_get_their_mnemonics() {
    assert_eq!(munge("foo-bar"), "fooQzH_bar");
    assert_eq!(munge("+"), "QzPLUS_");
}

#[test]
fn a_leading_digit_is_escaped() {
    assert_eq!(munge("1st"), "QzDIGITx1_st");
}

#[test]
fn ascii_identifiers_pass_through_unchanged() {
    assert_eq!(munge("hello_world"), "hello_world");
}

#[test]
fn demunge_reverses_known_mnemonics() {
    assert_eq!(demunge("fooQzH_bar"), "foo-bar");
    assert_eq!(demunge("QzPLUS_"), "+");
}

proptest! {
    #[test]
    fn munge_round_trips_simple_identifiers(s in "[a-zA-Z][a-zA-Z0-9_-]{0,15}") {
        let munged = munge(&s);
        prop_assert_eq!(demunge(&munged).into_owned(), s);
    }
}
