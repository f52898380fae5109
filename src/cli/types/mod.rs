//! Type-safe wrappers for seasons, weeks and record identifiers.

pub mod ids;
pub mod time;

pub use ids::{GameUid, StatUid, TeamUid};
pub use time::{Season, Week};
