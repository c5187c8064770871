// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod csv;
pub mod diff;
pub mod error;
pub mod file;
pub mod log;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod rank;
pub mod record;
pub mod report;
pub mod snapshot;
pub mod store;

pub use error::{Error, NoDataCaptured, Result};
pub use pipeline::Pipeline;
pub use record::{DiffRecord, LeaderboardRecord, RawRow, Strategy, Top20Result};
pub use snapshot::PageSnapshot;
