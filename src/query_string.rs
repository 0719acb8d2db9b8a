//! Escaping for address query components.
//!
//! Follows `application/x-www-form-urlencoded` (space becomes `+`,
//! unreserved bytes pass through, everything else is `%XX`) except that `,`
//! is left literal so sort values read as `field,dir`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes escaped in a query component. Space is handled separately.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b',')
    .remove(b' ');

pub fn encode_component(s: &str) -> String {
    // `+` itself is in the escape set, so only real spaces become `+`
    utf8_percent_encode(s, COMPONENT).to_string().replace(' ', "+")
}

/// Malformed escapes are kept verbatim rather than rejected.
pub fn decode_component(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Splits `a=1&b=2` into decoded pairs, skipping empty segments.
pub fn parse_pairs(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

pub fn join_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}
