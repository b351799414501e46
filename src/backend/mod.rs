//! The canonisation backends behind one two phase contract:
//! build the native structure, then compute on it.

use crate::{graph::TrialInput, partition::InsertMode, Error};

mod nauty;
pub use nauty::{CanonOutput, CanonicalGraph, DenseNauty, SparseNauty, Traces};

mod refine;
pub use refine::{refine, Refinement, RefinementInput, Refiner};

/// A canonisation backend.
///
/// `build` does all preparation of the native structure, `compute`
/// consumes it. The native structure is dropped at the end of
/// `compute`, whether the backend succeeds or not.
pub trait Backend {
    type Native;
    type Output;

    fn name(&self) -> &'static str;

    fn build(&self, input: &TrialInput<'_>) -> Result<Self::Native, Error>;

    fn compute(&self, native: Self::Native) -> Result<Self::Output, Error>;
}

/// Per trial replacement of nauty's static option blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonOptions {
    /// Compute the canonical labelling and graph, not only the group.
    pub get_canon: bool,
    /// The input is a digraph. Traces gets the symmetrized graph instead.
    pub digraph: bool,
    /// How the refiner inserts the colouring into its partition nest.
    pub insert_mode: InsertMode,
}

impl Default for CanonOptions {
    fn default() -> Self {
        CanonOptions {
            get_canon: true,
            digraph: false,
            insert_mode: InsertMode::Bulk,
        }
    }
}
