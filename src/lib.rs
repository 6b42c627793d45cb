//! remold: a batch codemod runner over a lossless syntax tree.
//!
//! The pipeline is parse → transform → print, per file:
//! - [`remold_cst`] parses source into a format-preserving tree and prints
//!   it back, byte-identical wherever the tree was not touched
//! - [`registry`] names the available transforms
//! - [`executor`] applies one transform to one tree
//! - [`runner`] resolves a file pattern and drives the batch, stopping at
//!   the first failure
//! - [`output`] renders run reports for humans and as JSON
//!
//! The `remold` binary wires these together behind `run` and `list`
//! subcommands.

pub mod error;
pub mod executor;
pub mod output;
pub mod registry;
pub mod runner;
pub mod transforms;

pub use error::{OutputErrorCode, RemoldError, TransformError};
pub use registry::{Transform, TransformRegistry};
pub use runner::{RunOptions, RunResult, DEFAULT_PATTERN};

pub use remold_cst as cst;
