//! Rule codec: one `key=value` token to and from a [`Rule`].
//!
//! Key grammar: `path ("[" name "]")? (":" operator)?`, percent-encoded.

use super::model::{Operator, Rule};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Legacy attribute form `path:name[attr]` leaves this on the path.
const LEGACY_NAME_SUFFIX: &str = ":name";

/// Percent-encode one query-string component.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// Percent-decode one query-string component.
///
/// Never fails: malformed escapes pass through and invalid UTF-8 is
/// replaced with U+FFFD.
pub fn decode_component(input: &str) -> String {
    let bytes = percent_decode_str(input);
    match bytes.clone().decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            tracing::debug!(component = input, "invalid UTF-8 after percent-decoding");
            bytes.decode_utf8_lossy().into_owned()
        }
    }
}

/// Decode a raw key/value pair into a rule.
pub fn decode(key: &str, value: &str) -> Rule {
    let key = decode_component(key);
    let (rest, operator) = split_operator(&key);
    let (path, name) = split_name(rest);

    Rule {
        path: path.to_string(),
        name,
        operator,
        value: decode_component(value),
    }
}

/// Encode a rule as `key=value`, or `""` for an empty rule.
pub fn encode(rule: &Rule) -> String {
    let key = compose_key(rule);
    if key.is_empty() && rule.value.is_empty() {
        return String::new();
    }
    format!(
        "{}={}",
        encode_component(&key),
        encode_component(&rule.value)
    )
}

/// Unencoded key: path, `[name]`, then `:operator`.
pub fn compose_key(rule: &Rule) -> String {
    let mut key = rule.path.clone();
    if let Some(name) = rule.name.as_deref().filter(|n| !n.is_empty()) {
        key.push('[');
        key.push_str(name);
        key.push(']');
    }
    if let Some(op) = rule.operator {
        key.push(':');
        key.push_str(op.as_str());
    }
    key
}

fn split_operator(key: &str) -> (&str, Option<Operator>) {
    for op in Operator::ALL {
        if let Some(rest) = key
            .strip_suffix(op.as_str())
            .and_then(|r| r.strip_suffix(':'))
        {
            return (rest, Some(op));
        }
    }
    (key, None)
}

fn split_name(key: &str) -> (&str, Option<String>) {
    let Some(inner_end) = key.strip_suffix(']') else {
        return (key, None);
    };
    let Some(open) = inner_end.rfind('[') else {
        return (key, None);
    };

    // The key is already decoded; the bracket text is the name verbatim
    let name = inner_end[open + 1..].to_string();
    let path = &inner_end[..open];
    let path = path.strip_suffix(LEGACY_NAME_SUFFIX).unwrap_or(path);
    (path, Some(name))
}
