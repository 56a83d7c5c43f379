pub mod consolidator;

pub use consolidator::{Consolidator, YearOutcome};
