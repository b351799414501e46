//! Debug facilities.
use nom::error::{VerboseError, VerboseErrorKind};
use std::{
    fmt::{self, Debug},
    io,
};

use crate::{graph::VertexIndex, parser::ParseError};

// Error types and From<...> implementations

/// Faults in the caller supplied graph or colouring.
/// Detected while decoding or building, always before any timing.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum MalformedInput {
    #[error("Graph needs at least one vertex")]
    EmptyGraph,
    #[error("Colouring has length {found} but the graph has {expected} vertices")]
    ColouringLength { expected: usize, found: usize },
    #[error("Colouring entry {entry} at position {position} references no vertex in [0, {size})")]
    VertexOutOfRange {
        position: usize,
        entry: i64,
        size: usize,
    },
    #[error("Vertex {0} appears twice in the colouring")]
    DuplicateVertex(VertexIndex),
    #[error("Flat arc list has odd length {0}")]
    OddArcList(usize),
    #[error("Arc ({0}, {1}) has an endpoint outside the graph")]
    ArcOutOfRange(i64, i64),
    #[error("Degree sum does not fit the sparse representation")]
    DegreeOverflow,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Malformed input: {0}")]
    MalformedInput(MalformedInput),
    #[error("Could not allocate {what} of {requested} elements")]
    Allocation { what: &'static str, requested: usize },
    #[error("{backend} failed with status {status}")]
    Backend { backend: &'static str, status: i32 },
    #[error("Error while parsing input file with graph description")]
    ParseError(Vec<VerboseErrorKind>),
    #[error("Error while reading input")]
    IoError(io::Error),
    #[error("Unknown backend {0}")]
    UnknownBackend(String),
    #[error("Invalid argument {0}")]
    InvalidArgument(String),
}

impl From<MalformedInput> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(mi: MalformedInput) -> Self {
        Self::MalformedInput(mi)
    }
}

#[cfg(not(tarpaulin_include))]
fn handle_nom_verbose_error<E: Debug>(verbose: VerboseError<E>) -> Vec<VerboseErrorKind> {
    verbose
        .errors
        .into_iter()
        .map(|(msg, kind)| {
            tracing::debug!("parse error at {:?}", msg);
            kind
        })
        .collect()
}

impl<'a> From<nom::Err<ParseError<'a>>> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(pe: nom::Err<ParseError<'a>>) -> Self {
        match pe {
            nom::Err::Error(verbose) | nom::Err::Failure(verbose) => {
                Self::ParseError(handle_nom_verbose_error(verbose))
            }
            nom::Err::Incomplete(_) => unreachable!(),
        }
    }
}

impl From<io::Error> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ie: io::Error) -> Self {
        Self::IoError(ie)
    }
}

// Custom formatter for debug printing

#[allow(clippy::ptr_arg)]
#[cfg(not(tarpaulin_include))]
pub fn bin_fmt(vec: &Vec<u64>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{")?;
    for number in vec {
        write!(f, "{:#066b}", number)?;
    }
    write!(f, "}}")?;

    Ok(())
}

#[allow(clippy::ptr_arg)]
#[cfg(not(tarpaulin_include))]
pub fn len_fmt<T>(vec: &Vec<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{} elements]", vec.len())
}

// Debug macros that allow to time single expressions

#[macro_export]
macro_rules! time {
    ($i:ident, $ret:ident, $exp:expr) => {
        let before = std::time::Instant::now();
        let $ret = $exp;
        let $i = before.elapsed();
    };
}

#[macro_export]
macro_rules! parse_single_line {
    ($ret:ident, $exp:expr) => {
        let (res, $ret) = $exp?;
        eof::<$crate::parser::Input<'_>, $crate::parser::ParseError<'_>>(res)?;
    };
}

#[macro_export]
macro_rules! get_line {
    ($ret:ident, $lines:ident) => {
        let $ret = $lines.next().unwrap_or_else(|| {
            Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Unexpected EOF!",
            ))
        })?;
    };
}
