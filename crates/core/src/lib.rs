pub mod application;
pub mod config;
pub mod diff;
pub mod domain;
pub mod error;
pub mod flatten;
pub mod normalize;
pub mod pagination;
pub mod ports;
pub mod push;
pub mod utils;

pub use error::{Result, SyncError};
