//! # roomchat-core
//!
//! Core crate for RoomChat. Contains configuration schemas, typed
//! identifiers, the chat message record handed to persistence, the
//! collaborator traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other RoomChat crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
