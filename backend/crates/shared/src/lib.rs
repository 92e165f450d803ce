//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest vocabulary shared by every backend crate:
//! - Unified error type ([`error::app_error::AppError`]) and its classification
//! - Typed ID wrappers for entities
//!
//! **Design Principle**: only things whose meaning is identical across
//! the API, web and admin surfaces live here.

pub mod error {
    pub mod app_error;
    pub mod kind;
    #[cfg(feature = "axum")]
    pub mod response;
}
pub mod id;
