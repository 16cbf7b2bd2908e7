use std::path::PathBuf;

/// Errors raised by this crate.
///
/// Only construction of a sketch can fail with [`Error::InvalidArgument`];
/// once built, inserts, membership tests and estimates are total.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cannot read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read failed at line {line}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

macro_rules! ensure_arg {
    ($cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::InvalidArgument(format!($($fmt)+)));
        }
    };
}

pub(crate) use ensure_arg;
