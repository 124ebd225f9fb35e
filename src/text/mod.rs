//! Text processing: similarity, cleanup, sentence boundaries,
//! hypothesis reconciliation, stability tracking, and emission dedupe.

pub mod boundary;
pub mod dedupe;
pub mod normalize;
pub mod reconcile;
pub mod similarity;
pub mod stability;
