//! Loader errors. Every variant carries the file and 1-based line it came from
//! so a failed load can be reported without re-reading the input.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {} line {line}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("{} line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{} line {line}: {attribute} index {index} out of range (len={len})", path.display())]
    IndexOutOfRange {
        path: PathBuf,
        line: usize,
        attribute: &'static str,
        index: i64,
        len: usize,
    },

    #[error("{} line {line}: mesh exceeds {} vertices", path.display(), u32::MAX)]
    TooManyVertices { path: PathBuf, line: usize },

    #[error("model scale must be finite and positive, got {0}")]
    InvalidScale(f32),
}

pub type ObjResult<T> = Result<T, ObjError>;
