//! Line-oriented parser for `.properties` overlays.
//!
//! Handles the subset of the Java properties format that Android and
//! Flutter tooling write:
//! - `key=value`, `key:value` and `key value` separators
//! - `#` and `!` comment lines
//! - backslash line continuation
//! - `\t \n \r \f \uXXXX` escapes, plus `\` before any other char

/// Whitespace that may surround keys and separators.
const BLANK: &[char] = &[' ', '\t', '\x0c'];

/// A line the parser could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based physical line where the logical line starts.
    pub line: usize,
    pub reason: String,
}

/// Parse overlay text into key/value pairs in file order.
///
/// Duplicate keys are kept; the caller decides precedence.
pub fn parse_properties(text: &str) -> Result<Vec<(String, String)>, MalformedLine> {
    let mut pairs = Vec::new();
    let mut logical = String::new();
    let mut start_line = 0;
    let mut continuing = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        let segment = if continuing {
            line.trim_start_matches(BLANK)
        } else {
            let trimmed = line.trim_start_matches(BLANK);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            start_line = idx + 1;
            trimmed
        };

        if ends_with_continuation(segment) {
            logical.push_str(&segment[..segment.len() - 1]);
            continuing = true;
            continue;
        }

        logical.push_str(segment);
        continuing = false;
        pairs.push(split_logical(&logical, start_line)?);
        logical.clear();
    }

    if continuing && !logical.is_empty() {
        pairs.push(split_logical(&logical, start_line)?);
    }

    Ok(pairs)
}

fn ends_with_continuation(segment: &str) -> bool {
    segment.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_logical(logical: &str, line: usize) -> Result<(String, String), MalformedLine> {
    let mut escaped = false;
    let mut key_end = logical.len();
    for (i, c) in logical.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let mut rest = logical[key_end..].trim_start_matches(BLANK);
    if let Some(stripped) = rest.strip_prefix(&['=', ':'][..]) {
        rest = stripped.trim_start_matches(BLANK);
    }

    let key = unescape(&logical[..key_end], line)?;
    let value = unescape(rest, line)?;
    Ok((key, value))
}

fn unescape(raw: &str, line: usize) -> Result<String, MalformedLine> {
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
                let unit = read_code_unit(&mut chars, line)?;
                out.push(decode_unit(unit, &mut chars, line)?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_code_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u32, MalformedLine> {
    let hex: String = chars.by_ref().take(4).collect();
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MalformedLine {
            line,
            reason: format!("invalid \\u escape '\\u{}'", hex),
        });
    }
    if hex.len() != 4 {
        return Err(MalformedLine {
            line,
            reason: format!("truncated \\u escape '\\u{}'", hex),
        });
    }
    u32::from_str_radix(&hex, 16).map_err(|_| MalformedLine {
        line,
        reason: format!("invalid \\u escape '\\u{}'", hex),
    })
}

fn decode_unit(
    unit: u32,
    chars: &mut std::str::Chars<'_>,
    line: usize,
) -> Result<char, MalformedLine> {
    if let Some(c) = char::from_u32(unit) {
        return Ok(c);
    }

    // High surrogate: the low half must follow as another \u escape.
    if (0xD800..0xDC00).contains(&unit) && chars.as_str().starts_with("\\u") {
        chars.next();
        chars.next();
        let low = read_code_unit(chars, line)?;
        if (0xDC00..0xE000).contains(&low) {
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            if let Some(c) = char::from_u32(combined) {
                return Ok(c);
            }
        }
    }

    Err(MalformedLine {
        line,
        reason: format!("unpaired surrogate \\u{:04X}", unit),
    })
}
