pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod sync;

pub use error::{GlsyncError, IsRetryable};
