#![warn(rust_2018_idioms)]

//! Benchmark bridge for graph canonisation tools.
//!
//! One coloured graph is expanded into the native structure of each
//! backend (dense nauty, sparse nauty, Traces or the partition nest
//! refiner) and the time for building that structure is reported
//! separately from the time the backend needs to compute on it.

use custom_debug_derive::Debug;
use std::{str::FromStr, time::Instant};

pub mod backend;
pub mod colouring;
pub mod debug;
pub mod graph;
pub mod harness;
pub mod parser;
pub mod partition;

pub use debug::Error;

use backend::{CanonOptions, CanonOutput, DenseNauty, Refinement, Refiner, SparseNauty, Traces};
use graph::TrialInput;
use harness::{run_trial, TrialReport};

/// Runtime selection of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    DenseNauty,
    SparseNauty,
    /// Symmetrizes directed input.
    Traces,
    Refiner,
}

/// Output of any backend.
#[derive(Debug)]
pub enum Outcome {
    Canon(CanonOutput),
    Refinement(Refinement),
}

impl Outcome {
    /// Number of cells the vertices end up in: orbits for
    /// nauty and Traces, cells of the equitable partition otherwise.
    pub fn class_count(&self) -> usize {
        match self {
            Self::Canon(canon) => canon.orbit_count,
            Self::Refinement(refinement) => refinement.nest.cell_count(),
        }
    }
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::DenseNauty,
        Algorithm::SparseNauty,
        Algorithm::Traces,
        Algorithm::Refiner,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DenseNauty => "nauty",
            Self::SparseNauty => "sparsenauty",
            Self::Traces => "traces",
            Self::Refiner => "refiner",
        }
    }

    /// Run a single trial. The reported total also covers
    /// the dispatch and the conversion of the output.
    pub fn run(
        &self,
        input: &TrialInput<'_>,
        options: CanonOptions,
    ) -> Result<TrialReport<Outcome>, Error> {
        let start = Instant::now();
        let report = match self {
            Self::DenseNauty => run_trial(&DenseNauty { options }, input)?.map_output(Outcome::Canon),
            Self::SparseNauty => {
                run_trial(&SparseNauty { options }, input)?.map_output(Outcome::Canon)
            }
            Self::Traces => run_trial(&Traces { options }, input)?.map_output(Outcome::Canon),
            Self::Refiner => {
                let refiner = Refiner {
                    mode: options.insert_mode,
                };
                run_trial(&refiner, input)?.map_output(Outcome::Refinement)
            }
        };

        Ok(TrialReport {
            total: start.elapsed(),
            ..report
        })
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|algorithm| algorithm.name() == s)
            .copied()
            .ok_or_else(|| Error::UnknownBackend(s.to_string()))
    }
}
