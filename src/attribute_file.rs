//! Attribute file: flat key/value text merged into every seeded flow file.
//!
//! Accepts the properties-file subset that matters for attribute lists:
//!
//! - `#` and `!` start comment lines; blank lines are skipped
//! - `key=value`, `key:value` and `key value` (first unescaped separator wins)
//! - a trailing odd number of backslashes continues the line
//! - escapes `\t \n \r \f \\ \= \: \#  \!` and `\uXXXX`
//!
//! Later duplicates overwrite earlier ones.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::types::Attributes;

/// Failures loading an attribute file.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AttributeFileError {
  #[error("Attribute file does not exist: {}", path.display())]
  NotFound { path: PathBuf },
  #[error("Could not read attribute file: {}, reason: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Malformed attribute file: {}, line {line}: {message}", path.display())]
  Parse {
    path: PathBuf,
    line: usize,
    message: String,
  },
}

/// Reads and parses the attribute file at `path`.
#[instrument(level = "trace")]
pub fn load_attribute_file(path: &Path) -> Result<Attributes, AttributeFileError> {
  if !path.exists() {
    return Err(AttributeFileError::NotFound {
      path: path.to_path_buf(),
    });
  }
  let bytes = std::fs::read(path).map_err(|source| AttributeFileError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let text = String::from_utf8(bytes).map_err(|e| AttributeFileError::Read {
    path: path.to_path_buf(),
    source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
  })?;
  let attrs = parse_attributes(&text).map_err(|(line, message)| AttributeFileError::Parse {
    path: path.to_path_buf(),
    line,
    message,
  })?;
  debug!(path = %path.display(), count = attrs.len(), "loaded attribute file");
  Ok(attrs)
}

/// Parses attribute text. Errors carry the 1-based line where the offending
/// logical line starts.
pub fn parse_attributes(source: &str) -> Result<Attributes, (usize, String)> {
  let mut attrs = Attributes::new();
  let mut lines = source.lines().enumerate();

  while let Some((idx, raw)) = lines.next() {
    let first = raw.trim_start();
    if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
      continue;
    }

    let mut logical = String::from(first);
    while ends_with_continuation(&logical) {
      logical.pop();
      match lines.next() {
        Some((_, next)) => logical.push_str(next.trim_start()),
        None => break,
      }
    }

    let (key, value) = split_key_value(&logical);
    let key = unescape(key).map_err(|m| (idx + 1, m))?;
    let value = unescape(value).map_err(|m| (idx + 1, m))?;
    attrs.insert(key, value);
  }
  Ok(attrs)
}

/// True when the line ends in an odd run of backslashes.
pub(crate) fn ends_with_continuation(line: &str) -> bool {
  line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Splits a logical line into raw (still escaped) key and value.
pub(crate) fn split_key_value(line: &str) -> (&str, &str) {
  let bytes = line.as_bytes();
  let mut i = 0;
  let mut key_end = bytes.len();
  while i < bytes.len() {
    match bytes[i] {
      b'\\' => {
        i += 2;
        continue;
      }
      b'=' | b':' | b' ' | b'\t' | b'\x0c' => {
        key_end = i;
        break;
      }
      _ => i += 1,
    }
  }
  let key_end = key_end.min(bytes.len());
  let key = &line[..key_end];
  let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
  if let Some(stripped) = rest.strip_prefix(['=', ':']) {
    rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
  }
  (key, rest)
}

/// Resolves backslash escapes.
pub(crate) fn unescape(s: &str) -> Result<String, String> {
  let mut out = String::with_capacity(s.len());
  let mut chars = s.chars();
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
        if hex.len() != 4 {
          return Err(format!("truncated unicode escape '\\u{}'", hex));
        }
        let code =
          u32::from_str_radix(&hex, 16).map_err(|_| format!("bad unicode escape '\\u{}'", hex))?;
        let ch = char::from_u32(code).ok_or_else(|| format!("invalid code point '\\u{}'", hex))?;
        out.push(ch);
      }
      Some(other) => out.push(other),
      None => {}
    }
  }
  Ok(out)
}
