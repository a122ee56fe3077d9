//! Repair of near-JSON text returned by the model.
//!
//! The model is asked for bare JSON but routinely wraps it in markdown fences,
//! prose, comments or trailing commas. Repairs run in a fixed order on the raw
//! text, then a strict parse is attempted, then a relaxed one. Comments and
//! commas are only removed outside string literals, so a URL or a sentence
//! ending in ", ]" inside a day's details is left alone.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SanitizeError;

/// Text that parsed, together with its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedReply {
    pub text: String,
    pub value: Value,
}

pub fn sanitize(raw: &str) -> Result<SanitizedReply, SanitizeError> {
    let unfenced = strip_fences(raw);
    let object = extract_object(&unfenced)?;

    let text = tokenize(object)
        .into_iter()
        .map(|piece| match piece {
            Piece::Code(code) => strip_trailing_commas(&code),
            Piece::Literal(lit) => escape_line_breaks(&lit),
        })
        .collect::<String>();

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(SanitizedReply { text, value }),
        Err(strict) => {
            debug!(error = %strict, "Strict parse failed, trying relaxed parse");
            let relaxed = relax(&text);
            match serde_json::from_str::<Value>(&relaxed) {
                Ok(value) => Ok(SanitizedReply {
                    text: relaxed,
                    value,
                }),
                Err(e) => {
                    warn!(error = %e, "Model reply is not recoverable JSON");
                    Err(SanitizeError::MalformedReply(e.to_string()))
                }
            }
        }
    }
}

fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
}

/// Slice from the first `{` to the last `}`, dropping surrounding prose.
fn extract_object(text: &str) -> Result<&str, SanitizeError> {
    let start = text.find('{').ok_or(SanitizeError::NoStructureFound)?;
    let end = text.rfind('}').ok_or(SanitizeError::NoStructureFound)?;
    if end < start {
        return Err(SanitizeError::NoStructureFound);
    }
    Ok(&text[start..=end])
}

#[derive(Debug, PartialEq)]
enum Piece {
    Code(String),
    /// A string literal including its delimiters.
    Literal(String),
}

/// Split text into code and string literals, dropping `//` and `/* */` comments.
///
/// Both `"` and `'` open a literal; a literal ends at the next unescaped quote
/// of the same kind, or at end of input.
fn tokenize(text: &str) -> Vec<Piece> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut code = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c == '/' && next == Some('/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && next == Some('*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i += 2;
            continue;
        }

        if c == '"' || c == '\'' {
            if !code.is_empty() {
                pieces.push(Piece::Code(std::mem::take(&mut code)));
            }
            let mut literal = String::from(c);
            i += 1;
            while i < chars.len() {
                let ch = chars[i];
                literal.push(ch);
                i += 1;
                if ch == '\\' {
                    if let Some(&escaped) = chars.get(i) {
                        literal.push(escaped);
                        i += 1;
                    }
                } else if ch == c {
                    break;
                }
            }
            pieces.push(Piece::Literal(literal));
            continue;
        }

        code.push(c);
        i += 1;
    }

    if !code.is_empty() {
        pieces.push(Piece::Code(code));
    }
    pieces
}

/// Drop a comma when only whitespace separates it from `]` or `}`.
fn strip_trailing_commas(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == ',' {
            let closes = chars[i + 1..]
                .iter()
                .find(|ch| !ch.is_whitespace())
                .is_some_and(|&ch| ch == ']' || ch == '}');
            if closes {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Escape raw line breaks inside a string literal.
fn escape_line_breaks(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                match chars.next() {
                    Some('\n') => out.push('n'),
                    Some('\r') => out.push('r'),
                    Some(other) => out.push(other),
                    None => {}
                }
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite relaxed JSON into strict JSON.
///
/// Handles single-quoted strings, bare object keys, Python-style literals,
/// control characters inside strings and unescaped quotes inside strings. A
/// quote inside a string closes it only if the next non-whitespace character
/// is `:`, `,`, `}`, `]` or end of input; otherwise it is escaped as content.
fn relax(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 32);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '"' || c == '\'' {
            i = relax_string(&chars, i, &mut out);
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '_' | '$' | '-')) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let is_key = next_significant(&chars, i) == Some(':');

            if is_key {
                out.push('"');
                out.push_str(&word);
                out.push('"');
            } else {
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" | "undefined" => "null",
                    other => other,
                });
            }
            continue;
        }

        out.push(c);
        i += 1;
    }
    out
}

/// Emit the string starting at `chars[start]` as a strict JSON string and
/// return the index just past it.
fn relax_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                match chars.get(i + 1) {
                    // JSON has no \' escape
                    Some('\'') => out.push('\''),
                    Some(&escaped) => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    None => out.push_str("\\\\"),
                }
                i += 2;
                continue;
            }
            _ if c == quote => {
                let closes = matches!(
                    next_significant(chars, i + 1),
                    None | Some(':' | ',' | '}' | ']')
                );
                i += 1;
                if closes {
                    out.push('"');
                    return i;
                }
                out.push_str(if quote == '"' { "\\\"" } else { "'" });
                continue;
            }
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
        i += 1;
    }

    // Unterminated string: close it so the parser reports the real problem.
    out.push('"');
    i
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars.get(from..)?.iter().copied().find(|c| !c.is_whitespace())
}
