//! Line tokenizer shared by the OBJ and MTL scanners.

use std::path::Path;

use crate::error::ObjError;

/// One classified input line: the leading directive and the trimmed remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub directive: &'a str,
    pub data: &'a str,
}

impl<'a> Line<'a> {
    /// Split a raw line into directive and data. Returns `None` for blank lines.
    pub fn classify(raw: &'a str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let (directive, data) = match trimmed.split_once(char::is_whitespace) {
            Some((directive, rest)) => (directive, rest.trim()),
            None => (trimmed, ""),
        };
        Some(Self { directive, data })
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        self.directive.starts_with('#')
    }
}

/// Position in a file, used to build errors.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    pub path: &'a Path,
    pub line: usize,
}

impl Cursor<'_> {
    pub fn error(&self, message: impl Into<String>) -> ObjError {
        ObjError::Parse {
            path: self.path.to_path_buf(),
            line: self.line,
            message: message.into(),
        }
    }

    pub fn out_of_range(&self, attribute: &'static str, index: i64, len: usize) -> ObjError {
        ObjError::IndexOutOfRange {
            path: self.path.to_path_buf(),
            line: self.line,
            attribute,
            index,
            len,
        }
    }
}

/// Parse whitespace separated floats into a zero-filled vec4.
/// Fewer than `min` or more than four components is an error, as is any
/// token that is not a number.
pub(crate) fn parse_vector(data: &str, min: usize, at: Cursor<'_>) -> Result<[f32; 4], ObjError> {
    let mut out = [0.0f32; 4];
    let mut count = 0;
    for token in data.split_whitespace() {
        if count == out.len() {
            return Err(at.error(format!("too many components in '{data}'")));
        }
        out[count] = token
            .parse::<f32>()
            .map_err(|_| at.error(format!("invalid number '{token}'")))?;
        count += 1;
    }
    if count < min {
        return Err(at.error(format!(
            "expected at least {min} components, found {count} in '{data}'"
        )));
    }
    Ok(out)
}

/// Parse a single float (`Ns`, `Ni`, `d`, `Tr`). Trailing tokens are ignored.
pub(crate) fn parse_scalar(data: &str, at: Cursor<'_>) -> Result<f32, ObjError> {
    let token = data
        .split_whitespace()
        .next()
        .ok_or_else(|| at.error("missing value"))?;
    token
        .parse::<f32>()
        .map_err(|_| at.error(format!("invalid number '{token}'")))
}
