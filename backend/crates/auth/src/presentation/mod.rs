//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod web_handlers;

pub use handlers::AuthAppState;
pub use middleware::{
    AccessGate, AuthContext, BrowserSurface, CurrentAccount, GateRejection, GateState,
    MaybeAccount, optional_auth, require_role,
};
pub use router::{api_router, auth_router, auth_router_generic, web_router};
