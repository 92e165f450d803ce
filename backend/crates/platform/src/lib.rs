//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cookie building and extraction (browser surfaces)
//! - `Authorization: Bearer` header parsing (API surfaces)
//! - Environment and duration parsing for configuration

pub mod bearer;
pub mod config;
pub mod cookie;
