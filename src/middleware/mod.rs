pub mod auth;
pub mod response;

pub use auth::{check_access, guard_navigation, session_middleware, GuardDecision, Redirect, RenderContext};
pub use response::ViewResponse;
