//! Text matching: raw recognizer tokens in, one code (or nothing) out.
//!
//! - [`normalize`] cleans tokens to `[A-Z0-9]` and generates candidates
//! - [`validate`] checks candidates against a [`CodeRule`](crate::CodeRule)
//! - [`rank`] picks the closest near-miss when nothing validates
//! - [`correction`] optionally substitutes commonly confused characters

pub mod correction;
pub mod normalize;
pub mod rank;
pub mod validate;

pub use correction::{Correction, Gating, SubstitutionTable};
pub use normalize::{NormalizeStrategy, clean, normalize};
pub use rank::rank;
pub use validate::{first_valid, is_valid};
