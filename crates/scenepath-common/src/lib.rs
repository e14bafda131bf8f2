//! Scenepath-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across scenepath:
//!
//! - **Typed IDs**: String-backed wrappers for scenes and catalog entities
//! - **Path Tokenizer**: Splits file paths into full and library-relative tokens
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use scenepath_common::paths::tokenize;
//! use scenepath_common::{Error, Result, SceneId};
//!
//! let roots = vec!["/lib".to_string()];
//! let tokens = tokenize("/lib/Studio/Scene.mp4", &roots).unwrap();
//! assert_eq!(tokens.library, vec!["Studio", "Scene"]);
//!
//! let scene = SceneId::from("42");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("scene", "42"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;

pub use error::{Error, Result};
pub use ids::*;
