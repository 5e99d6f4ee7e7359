//! Common utilities and shared types for foodgram.
//!
//! This crate provides foundational components used across all foodgram crates:
//!
//! - **Configuration**: Application settings via [`Config`] and the frozen
//!   recipe rules in [`RecipeLimits`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers and short codes via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use foodgram_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let limits = config.recipes.limits();
//!     let id = IdGenerator::new().generate();
//!     println!("Generated ID: {id}, max cooking time: {}", limits.cooking_time.1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, PartialUpdatePolicy, RecipeLimits, TogglePolicy};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
