//! State module for tracking a keyword run
//!
//! # Components
//!
//! - `VisitedSet`: deduplicates product identifiers within one keyword run
//! - `ProductOutcome`: final state of each dispatched product
//! - `RunControl`: cancellation and deadline shared by a run's tasks

mod control;
mod outcome;
mod visited;

pub use control::RunControl;
pub use outcome::ProductOutcome;
pub use visited::VisitedSet;
