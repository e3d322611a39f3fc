//! Admin route surface.
//!
//! `/admin/<resource>`, `/admin/<resource>/new` and `/admin/<resource>/edit/<id>`
//! are the canonical forms. The older query form
//! (`/admin/<resource>?action=edit&id=<id>`) is normalized into path segments
//! first, so both forms go through the same parser.

pub mod navigation;

use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::form_urlencoded;

use crate::types::ItemId;

pub use navigation::{HistoryNavigator, Navigation, NavigationKind, Navigator};

pub const ADMIN_PREFIX: &str = "/admin";
pub const LOGIN_PATH: &str = "/admin/login";
pub const HOME_PATH: &str = "/admin";

const ACTION_NEW: &str = "new";
const ACTION_EDIT: &str = "edit";
const ACTION_LIST: &str = "list";

/// CRUD mode encoded in the route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    List,
    Create,
    /// `None` when the route named no id; the orchestrator reports it as not found
    Edit(Option<ItemId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoute {
    pub resource: String,
    pub action: RouteAction,
}

impl ResourceRoute {
    pub fn list(resource: impl Into<String>) -> Self {
        Self { resource: resource.into(), action: RouteAction::List }
    }

    pub fn create(resource: impl Into<String>) -> Self {
        Self { resource: resource.into(), action: RouteAction::Create }
    }

    pub fn edit(resource: impl Into<String>, id: ItemId) -> Self {
        Self { resource: resource.into(), action: RouteAction::Edit(Some(id)) }
    }

    pub fn path(&self) -> String {
        let base = format!("{ADMIN_PREFIX}/{}", self.resource);
        match &self.action {
            RouteAction::List => base,
            RouteAction::Create => format!("{base}/{ACTION_NEW}"),
            RouteAction::Edit(Some(id)) => format!("{base}/{ACTION_EDIT}/{}", id.path_segment()),
            RouteAction::Edit(None) => format!("{base}/{ACTION_EDIT}"),
        }
    }

    pub fn list_path(&self) -> String {
        ResourceRoute::list(self.resource.clone()).path()
    }
}

/// Every page the admin knows how to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPage {
    Login,
    Home,
    Resource(ResourceRoute),
}

impl AdminPage {
    pub fn path(&self) -> String {
        match self {
            AdminPage::Login => LOGIN_PATH.to_string(),
            AdminPage::Home => HOME_PATH.to_string(),
            AdminPage::Resource(route) => route.path(),
        }
    }

    /// Everything except the login page sits behind the auth guard
    pub fn is_guarded(&self) -> bool {
        !matches!(self, AdminPage::Login)
    }
}

impl fmt::Display for AdminPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("not an admin route: {0}")]
    NotAdmin(String),
}

/// Parses a path (with optional query string) into an admin page. Path
/// segments are percent-decoded; query values are decoded by the form parser.
pub fn parse_admin_path(path_and_query: &str) -> Result<AdminPage, RouteError> {
    let (path, query) = match path_and_query.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_and_query, None),
    };

    let mut segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect();

    if segments.first().map(String::as_str) != Some("admin") {
        return Err(RouteError::NotAdmin(path_and_query.to_string()));
    }
    segments.remove(0);

    // Query form only applies when the path carries no action segment
    if segments.len() == 1 {
        if let Some(query) = query {
            segments.extend(action_segments_from_query(query));
        }
    }

    Ok(page_from_segments(&segments))
}

fn action_segments_from_query(query: &str) -> Vec<String> {
    let mut action = None;
    let mut id = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "action" => action = Some(value.into_owned()),
            "id" => id = Some(value.into_owned()),
            _ => {}
        }
    }
    action.into_iter().chain(id).collect()
}

fn page_from_segments(segments: &[String]) -> AdminPage {
    let Some(resource) = segments.first() else {
        return AdminPage::Home;
    };
    if resource == "login" && segments.len() == 1 {
        return AdminPage::Login;
    }

    let action = match segments.get(1).map(String::as_str) {
        Some(ACTION_NEW) => RouteAction::Create,
        Some(ACTION_EDIT) => RouteAction::Edit(segments.get(2).and_then(|s| ItemId::parse(s))),
        Some(ACTION_LIST) | Some(_) | None => RouteAction::List,
    };

    AdminPage::Resource(ResourceRoute {
        resource: resource.clone(),
        action,
    })
}
