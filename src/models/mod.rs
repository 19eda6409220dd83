//! Core data structures (Candidate, CodeRule, ExtractionResult, Orientation)

pub mod candidate;
pub mod orientation;
pub mod result;
pub mod rule;

pub use candidate::{Candidate, CandidateSource, is_code_char};
pub use orientation::{Orientation, OrientationResult};
pub use result::ExtractionResult;
pub use rule::CodeRule;
