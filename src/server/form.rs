//! `application/x-www-form-urlencoded` parsing for dashboard and Slack posts.

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped when a message is put back into a query string.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Decoded form fields in submission order.
pub type FormFields = Vec<(String, String)>;

/// Percent decode a form component. `+` stands for a space.
#[inline]
pub fn form_decode(s: &str) -> Cow<'_, str> {
    if !s.contains('%') && !s.contains('+') {
        return Cow::Borrowed(s);
    }
    let spaced = s.replace('+', " ");
    Cow::Owned(
        percent_encoding::percent_decode_str(&spaced)
            .decode_utf8_lossy()
            .into_owned(),
    )
}

/// Parse a urlencoded body or query string into key-value pairs.
pub fn parse_form(body: &str) -> FormFields {
    let pair_count = body.matches('&').count() + 1;
    let mut fields = Vec::with_capacity(pair_count.min(16));

    for pair in body.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.find('=') {
            Some(pos) => (&pair[..pos], &pair[pos + 1..]),
            None => (pair, ""),
        };

        if !key.is_empty() {
            fields.push((form_decode(key).into_owned(), form_decode(value).into_owned()));
        }
    }

    fields
}

/// First value submitted for `key`.
pub fn field<'a>(fields: &'a FormFields, key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Encode a value for use inside a redirect query string.
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
