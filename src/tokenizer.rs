/*!
Lexeme splitting for JSON numbers and strings.

These are pure functions over byte slices: given input positioned at the
start of a candidate lexeme they split off the raw lexeme and return it
along with the remaining tail. They deliberately under-validate. A number
lexeme is any leading run of number-shaped bytes, so `123+456` is one
lexeme; whether that lexeme converts to anything is the value's problem,
and whether a bogus tail follows is the grammar driver's problem. A string
lexeme is everything between the quotes with escapes skipped, not checked.
*/

use memchr::memchr2;

/**
Split a raw number off the front of `input`.

The lexeme must start with `-` or a digit and extends across every
following byte drawn from `0-9 . - + e E`. Returns `None` when the first
byte can't start a number; by convention the whole input is then the tail.
*/
#[inline]
pub(crate) fn raw_number(input: &[u8]) -> Option<(&[u8], &[u8])> {
    match input.first() {
        Some(&(b'-' | b'0'..=b'9')) => (),
        _ => return None,
    }

    let end = input
        .iter()
        .position(|&b| !matches!(b, b'0'..=b'9' | b'.' | b'-' | b'+' | b'e' | b'E'))
        .unwrap_or(input.len());

    Some((&input[..end], &input[end..]))
}

/// How [`raw_string`] failed, encoding the observed tail convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawStringError {
    /// The input doesn't begin with `"`; the whole input is the tail.
    MissingOpenQuote,
    /// The input ended before an unescaped closing `"`; the tail is empty.
    MissingCloseQuote,
}

/**
Split a raw string off the front of `input`.

The input must begin with `"`. The returned lexeme is the bytes between
the quotes, still escaped; the tail is the bytes after the closing quote.
Any byte following a `\` is part of the string, without interpretation, so
an escaped quote never terminates the scan.
*/
pub(crate) fn raw_string(input: &[u8]) -> Result<(&[u8], &[u8]), RawStringError> {
    if input.first() != Some(&b'"') {
        return Err(RawStringError::MissingOpenQuote);
    }

    let body = &input[1..];
    let mut at = 0;

    while let Some(found) = memchr2(b'"', b'\\', &body[at..]) {
        let found = at + found;

        if body[found] == b'"' {
            return Ok((&body[..found], &body[found + 1..]));
        }

        // skip the `\` and whatever byte it escapes
        at = found + 2;

        if at > body.len() {
            // the `\` was the last byte
            break;
        }
    }

    Err(RawStringError::MissingCloseQuote)
}
