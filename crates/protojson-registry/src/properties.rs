//! # Properties Parsing
//!
//! Parser for the `key=value` text format of binding sources. Follows the
//! classic `.properties` grammar:
//!
//! - A key ends at the first unescaped `=`, `:` or whitespace; whitespace
//!   around the separator is dropped.
//! - Lines whose first non-blank character is `#` or `!` are comments.
//! - A line ending in an odd number of backslashes continues on the next line,
//!   with the next line's leading whitespace removed.
//! - Escapes: `\t`, `\n`, `\r`, `\f`, `\uXXXX`; any other escaped character
//!   stands for itself.
//!
//! A key declared more than once keeps its last value.

use std::collections::BTreeMap;

use protojson_core::ConfigLoadError;

/// Parsed properties, keyed by property name.
pub type Properties = BTreeMap<String, String>;

/// Parse properties text. `uri` only labels errors.
pub fn parse_properties(text: &str, uri: &str) -> Result<Properties, ConfigLoadError> {
    let mut properties = Properties::new();
    for (line_no, logical) in logical_lines(text) {
        let malformed = |reason: String| ConfigLoadError::MalformedProperties {
            uri: uri.to_string(),
            line: line_no,
            reason,
        };
        let (raw_key, raw_value) = split_key_value(&logical);
        let key = unescape(raw_key).map_err(malformed)?;
        let value = unescape(raw_value).map_err(malformed)?;
        properties.insert(key, value);
    }
    Ok(properties)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Whether `line` ends in an odd run of backslashes.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Join natural lines into logical lines, dropping blanks and comments.
/// Each item carries the 1-based number of its first natural line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, natural) in text.lines().enumerate() {
        let trimmed = natural.trim_start_matches(is_blank);

        let (start, mut logical) = match pending.take() {
            Some((start, mut acc)) => {
                acc.push_str(trimmed);
                (start, acc)
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (index + 1, trimmed.to_string())
            }
        };

        if continues(&logical) {
            logical.pop();
            pending = Some((start, logical));
        } else {
            out.push((start, logical));
        }
    }
    if let Some(last) = pending {
        out.push(last);
    }
    out
}

/// Split a logical line into its raw (still escaped) key and value.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut separator = None;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                separator = Some(c);
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = &line[key_end..];
    if separator.is_some() {
        rest = &rest[1..];
    } else {
        rest = rest.trim_start_matches(is_blank);
        if let Some(after) = rest.strip_prefix(['=', ':']) {
            rest = after;
        }
    }
    (key, rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .ok_or_else(|| format!("malformed \\uXXXX escape: \\u{hex}"))?;
                let decoded = char::from_u32(code)
                    .ok_or_else(|| format!("\\u{hex} is not a valid character"))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
