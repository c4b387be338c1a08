//! High level workflows combining the registry client and the container engine

pub mod check;
pub mod mover;

pub use check::{CheckReport, CheckStatus, ImageChecker, parse_reference_list};
pub use mover::{BatchFailure, BatchReport, ImageMover, MoveOutcome, flatten_target};
