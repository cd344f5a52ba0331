//! Content-Disposition filename extraction
//!
//! The service does not quote `filename` values that contain spaces, which
//! makes the header invalid per RFC 2183. The value is re-quoted before the
//! header is parsed generically.

use regex::Regex;
use std::collections::BTreeMap;

/// A parsed Content-Disposition header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// Disposition type, lowercased (e.g. `attachment`)
    pub kind: String,

    /// Parameters keyed by lowercased name
    pub params: BTreeMap<String, String>,
}

/// Matches a `filename` parameter with its separator and leading whitespace
const FILENAME_PARAM: &str = r"(?i)(^|;)(\s*)filename=([^;]*)";

/// Wrap an unquoted `filename=` value in double quotes
///
/// Values that are already quoted are left untouched.
///
/// # Errors
///
/// Returns an error if the filename pattern fails to compile.
pub fn requote_filename(header: &str) -> Result<String, String> {
    requote_with(FILENAME_PARAM, header)
}

fn requote_with(pattern: &str, header: &str) -> Result<String, String> {
    let re = Regex::new(pattern).map_err(|e| format!("invalid filename pattern: {e}"))?;

    let requoted = re.replace_all(header, |caps: &regex::Captures<'_>| {
        let value = caps[3].trim();
        if value.starts_with('"') {
            caps[0].to_string()
        } else {
            format!(
                "{}{}filename=\"{}\"",
                &caps[1],
                &caps[2],
                value.replace('\\', "\\\\").replace('"', "\\\"")
            )
        }
    });
    Ok(requoted.into_owned())
}

/// Parse a Content-Disposition value into its type and parameters
///
/// # Errors
///
/// Returns a description of the first syntax error found.
pub fn parse_disposition(header: &str) -> Result<Disposition, String> {
    let (kind, mut rest) = match header.find(';') {
        Some(idx) => (&header[..idx], &header[idx..]),
        None => (header, ""),
    };

    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() || !kind.chars().all(is_token_char) {
        return Err(format!("invalid disposition type '{kind}'"));
    }

    let mut params = BTreeMap::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        rest = rest
            .strip_prefix(';')
            .ok_or_else(|| format!("expected ';' before '{rest}'"))?
            .trim_start();
        if rest.is_empty() {
            break;
        }

        let eq = rest
            .find('=')
            .ok_or_else(|| format!("parameter without value: '{rest}'"))?;
        let name = rest[..eq].trim().to_ascii_lowercase();
        if name.is_empty() || !name.chars().all(is_token_char) {
            return Err(format!("invalid parameter name '{name}'"));
        }

        rest = rest[eq + 1..].trim_start();
        let (value, remaining) = match rest.strip_prefix('"') {
            Some(quoted) => parse_quoted(quoted)?,
            None => {
                let end = rest.find(';').unwrap_or(rest.len());
                let token = rest[..end].trim();
                if token.is_empty() || !token.chars().all(is_token_char) {
                    return Err(format!("invalid value for parameter '{name}'"));
                }
                (token.to_string(), &rest[end..])
            }
        };

        if params.insert(name.clone(), value).is_some() {
            return Err(format!("duplicate parameter '{name}'"));
        }
        rest = remaining;
    }

    Ok(Disposition { kind, params })
}

/// Extract the filename from a Content-Disposition value
///
/// # Errors
///
/// Returns an error if the header is malformed even after re-quoting, or if
/// it carries no non-empty filename.
pub fn extract_filename(header: &str) -> Result<String, String> {
    let quoted = requote_filename(header)?;
    let disposition = parse_disposition(&quoted)?;

    match disposition.params.get("filename") {
        Some(name) if !name.trim().is_empty() => Ok(name.clone()),
        _ => Err(format!("no filename in content disposition '{header}'")),
    }
}

fn parse_quoted(input: &str) -> Result<(String, &str), String> {
    let mut value = String::new();
    let mut chars = input.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            '"' => return Ok((value, &input[idx + 1..])),
            _ => value.push(c),
        }
    }

    Err("unterminated quoted string".to_string())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}
