//! Command implementations for the collector CLI

pub mod collect;
pub mod common;
pub mod progress;
pub mod reclassify;
pub mod report;
pub mod supervise;
pub mod verify;
