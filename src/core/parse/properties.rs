use std::borrow::Cow;

use crate::common::{ErrorKind, Result};
use crate::core::parse::Properties;

// Whitespace as understood by the properties format.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

// Properties files are utf-8 or, failing that, latin-1.
pub(super) fn decode(content: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(content) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(content.iter().map(|&b| b as char).collect()),
    }
}

pub(super) fn parse(input: &str) -> Result<Properties> {
    let mut properties = Properties::new();
    let mut lines = input.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let line_number = index + 1;
        let line = line.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_owned();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split(&logical);
        let key = unescape(key, line_number)?;
        if key.is_empty() {
            continue;
        }
        let value = unescape(value, line_number)?;
        properties.insert(key, value);
    }

    Ok(properties)
}

// A line continues when it ends with an odd number of backslashes.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

// Split a logical line into its raw key and raw value.
// The key ends at the first unescaped '=', ':' or whitespace.
fn split(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);

    (&line[..key_end], rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str, line: usize) -> Result<String> {
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
            Some('u') => out.push(unicode(&mut chars, line)?),
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

// Decode the code unit after `\u`, pairing surrogates.
fn unicode(chars: &mut std::str::Chars<'_>, line: usize) -> Result<char> {
    let high = code_unit(chars, line)?;
    if !(0xD800..=0xDBFF).contains(&high) {
        return char::from_u32(high).ok_or_else(|| invalid(line, high));
    }

    let mut lookahead = chars.clone();
    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
        let low = code_unit(&mut lookahead, line)?;
        if (0xDC00..=0xDFFF).contains(&low) {
            *chars = lookahead;
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code).ok_or_else(|| invalid(line, code));
        }
    }

    Err(invalid(line, high))
}

fn code_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u32> {
    let hex = chars.by_ref().take(4).collect::<String>();
    if hex.chars().count() != 4 {
        return Err(ErrorKind::Properties {
            line,
            description: format!("malformed \\uxxxx encoding {:?}", hex),
        }
        .into());
    }
    u32::from_str_radix(&hex, 16).map_err(|_| {
        ErrorKind::Properties {
            line,
            description: format!("malformed \\uxxxx encoding {:?}", hex),
        }
        .into()
    })
}

fn invalid(line: usize, code: u32) -> crate::common::Error {
    ErrorKind::Properties {
        line,
        description: format!("invalid code point {:#06x}", code),
    }
    .into()
}
