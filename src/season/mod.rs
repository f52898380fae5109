//! Season knowledge: categories, registered plans and date classification.

pub mod category;
pub mod classify;
pub mod registry;

pub use category::Category;
pub use classify::{classify, reclassify_season, ReclassifySummary};
pub use registry::{DayRange, RoundPlan, SeasonPlan, SeasonRegistry};
