#![doc = include_str!("../README.md")]

pub mod batch;
pub mod cli;
pub mod clock;
pub mod error;
pub mod log;
pub mod runtime;
pub mod simulate;
pub mod types;

pub use batch::{execute, BatchExecutor, BatchOptions, JoinMode, Operation, Outcome, RunReport};
pub use error::{BatchError, Error, Result};
pub use types::*;
