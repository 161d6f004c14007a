//! Common utilities and shared types for quill.
//!
//! This crate provides foundational components used across all quill crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Clock**: Injectable wall-clock time via [`Clock`]
//!
//! # Example
//!
//! ```no_run
//! use quill_common::{AppResult, Clock, Config, IdGenerator, SystemClock};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID {} at {}", id, SystemClock.now());
//!     println!("Max comment depth: {}", config.blog.max_comment_depth);
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod id;

pub use clock::{Clock, ClockService, FixedClock, SystemClock};
pub use config::{BlogConfig, Config};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
