//! Application Layer
//!
//! Use cases and application services.

pub mod account_admin;
pub mod config;
pub mod login;
pub mod register;

// Re-exports
pub use account_admin::{AccountAdminUseCase, AccountPage, CreateAccountInput, UpdateAccountInput};
pub use config::AuthConfig;
pub use login::{LoginInput, LoginUseCase};
pub use register::{AuthOutput, RegisterInput, RegisterUseCase};
