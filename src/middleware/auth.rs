use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect as HttpRedirect, Response},
};

use crate::auth::{cookie_value, Session};
use crate::config::SessionConfig;
use crate::routing::{parse_admin_path, AdminPage, Navigator, LOGIN_PATH};

/// Where a page is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// Initial load answered by the admin host
    Server,
    /// Navigation inside an already running client
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub context: RenderContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Redirect),
}

/// Decides whether `page` may render for `session`. Only presence of a token is checked.
pub fn check_access(session: &Session, page: &AdminPage, context: RenderContext) -> GuardDecision {
    if !page.is_guarded() || session.is_authenticated() {
        return GuardDecision::Proceed;
    }
    tracing::info!(page = %page, ?context, "unauthenticated access, redirecting to login");
    GuardDecision::Redirect(Redirect {
        location: LOGIN_PATH.to_string(),
        context,
    })
}

/// Client-side guard: replaces the current history entry with the login page
/// and returns false when the page must not render.
pub fn guard_navigation(session: &Session, page: &AdminPage, navigator: &dyn Navigator) -> bool {
    match check_access(session, page, RenderContext::Client) {
        GuardDecision::Proceed => true,
        GuardDecision::Redirect(redirect) => {
            navigator.replace(&redirect.location);
            false
        }
    }
}

/// Server-side guard: builds the request's session from the token cookie,
/// injects it into the request, and answers `303 See Other` to the login page
/// for guarded admin routes without a token.
pub async fn session_middleware(
    State(config): State<SessionConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = Session::from_token(cookie_value(request.headers(), &config.cookie_name));

    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if let Ok(page) = parse_admin_path(&path) {
        if let GuardDecision::Redirect(redirect) = check_access(&session, &page, RenderContext::Server) {
            return HttpRedirect::to(&redirect.location).into_response();
        }
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}
