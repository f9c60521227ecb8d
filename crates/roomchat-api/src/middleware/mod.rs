//! Axum middleware stack.

pub mod cors;
pub mod origin;

pub use origin::OriginPolicy;
