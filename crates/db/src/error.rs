use core::fmt::{self, Display};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// No poll exists with the given ID.
    NotFound,
    /// A poll with the same ID already exists.
    DuplicateKey,
    /// The record changed since it was last read.
    Conflict,
    /// The backing store could not complete the request. Details are logged at the source.
    Unavailable,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "poll not found",
            Self::DuplicateKey => "poll already exists",
            Self::Conflict => "poll was modified concurrently",
            Self::Unavailable => "store unavailable",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
