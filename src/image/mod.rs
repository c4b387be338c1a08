//! Image naming
//!
//! Normalization of raw image names into registry references, plus the
//! domain log that records registry prefixes stripped along the way.

pub mod reference;

pub use reference::{DomainLog, ImageReference, ReferenceParser, split_tag};
