//! Bidirectional mapping between arbitrary Lissp identifier text and
//! host-legal Python identifier text.
//!
//! `munge` replaces every code point outside Python's identifier grammar
//! with a fixed-mnemonic escape token of the form `Qz<NAME>_`. `demunge`
//! reverses the process. Both functions are total: `munge` never fails to
//! produce a legal identifier, and `demunge` passes unrecognized `Qz…_`
//! sequences through unchanged.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;

/// One entry in the munge table: the source character and its mnemonic.
const MUNGE_TABLE: &[(char, &str)] = &[
    ('-', "QzH_"),
    ('+', "QzPLUS_"),
    ('*', "QzSTAR_"),
    ('/', "QzSOL_"),
    ('.', "QzFULLxSTOP_"),
    ('<', "QzLT_"),
    ('>', "QzGT_"),
    ('=', "QzEQ_"),
    ('!', "QzBANG_"),
    ('?', "QzQUERY_"),
    ('&', "QzAMP_"),
    ('%', "QzPCENT_"),
    ('^', "QzHAT_"),
    ('~', "QzTILDE_"),
    ('@', "QzAT_"),
    ('#', "QzHASH_"),
    ('$', "QzDOLR_"),
    ('|', "QzBAR_"),
    (':', "QzCOLON_"),
    (';', "QzSEMI_"),
    ('\'', "QzAPOS_"),
    ('`', "QzGRAVE_"),
    (',', "QzCOMMA_"),
    ('(', "QzLPAR_"),
    (')', "QzRPAR_"),
    ('[', "QzLSQB_"),
    (']', "QzRSQB_"),
    ('{', "QzLCUB_"),
    ('}', "QzRCUB_"),
    ('"', "QzQUOT_"),
    ('\\', "QzBSOL_"),
    (' ', "QzSPACE_"),
];

const DIGIT_WORDS: [&str; 10] = [
    "ZERO", "ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE",
];

fn mnemonic_for(c: char) -> Option<&'static str> {
    MUNGE_TABLE
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, name)| *name)
}

fn char_for_mnemonic(name: &str) -> Option<char> {
    MUNGE_TABLE
        .iter()
        .find(|(_, mnemonic)| {
            mnemonic
                .strip_prefix("Qz")
                .and_then(|m| m.strip_suffix('_'))
                == Some(name)
        })
        .map(|(ch, _)| *ch)
}

/// Maps arbitrary identifier text to a host-legal Python identifier.
///
/// Applies Unicode NFKC (compatibility composition) first, so visually
/// identical identifiers collide the way Python's own tokenizer collides
/// them, then replaces every non-identifier code point with its
/// `Qz<NAME>_` escape. A leading digit is escaped with `QzDIGITx<WORD>_`
/// so the result never starts with a digit.
#[must_use]
pub fn munge(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    let mut out = String::with_capacity(normalized.len());
    let mut chars = normalized.chars().peekable();

    if let Some(&first) = chars.peek() {
        if first.is_ascii_digit() {
            out.push_str("QzDIGITx");
            out.push_str(DIGIT_WORDS[first.to_digit(10).unwrap() as usize]);
            out.push('_');
            chars.next();
        }
    }

    for c in chars {
        if c == '_' || c.is_alphanumeric() && c.is_ascii() {
            out.push(c);
        } else if let Some(mnemonic) = mnemonic_for(c) {
            out.push_str(mnemonic);
        } else if c.is_alphanumeric() {
            // Non-ASCII but identifier-legal in Python (e.g. accented letters).
            out.push(c);
        } else {
            out.push_str("QzU");
            out.push_str(&format!("{:04X}", c as u32));
            out.push('_');
        }
    }

    out
}

/// Recovers (best-effort) the original text from `munge`'s output.
///
/// Any `Qz<NAME>_` run recognized in the table is replaced by its source
/// character; unrecognized `Qz…_` runs are left untouched, matching the
/// munger's documented total/best-effort asymmetry.
#[must_use]
pub fn demunge(text: &str) -> Cow<'_, str> {
    if !text.contains("Qz") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("Qz") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 2..];

        if let Some(digit_rest) = tail.strip_prefix("DIGITx") {
            if let Some(end) = digit_rest.find('_') {
                let word = &digit_rest[..end];
                if let Some(idx) = DIGIT_WORDS.iter().position(|w| *w == word) {
                    out.push(char::from_digit(idx as u32, 10).unwrap());
                    rest = &digit_rest[end + 1..];
                    continue;
                }
            }
            out.push_str("Qz");
            rest = tail;
            continue;
        }

        if let Some(hex_rest) = tail.strip_prefix('U') {
            if hex_rest.len() >= 5 && hex_rest.as_bytes()[4] == b'_' {
                if let Ok(code) = u32::from_str_radix(&hex_rest[..4], 16) {
                    if let Some(ch) = char::from_u32(code) {
                        out.push(ch);
                        rest = &hex_rest[5..];
                        continue;
                    }
                }
            }
            out.push_str("Qz");
            rest = tail;
            continue;
        }

        if let Some(end) = tail.find('_') {
            let name = &tail[..end];
            if let Some(ch) = char_for_mnemonic(name) {
                out.push(ch);
                rest = &tail[end + 1..];
                continue;
            }
        }

        out.push_str("Qz");
        rest = tail;
    }

    out.push_str(rest);
    Cow::Owned(out)
}
