use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Redirect as HttpRedirect, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::api::ListQuery;
use crate::auth::{clear_cookie_header, request_token, set_cookie_header, Credentials, Session};
use crate::config::ListConfig;
use crate::crud::notify::MSG_DELETE_PROMPT;
use crate::crud::{
    CrudHeader, CrudView, DeleteOutcome, FormAdapter, JsonForm, MemoryNotifier, Notice, Notifier, StaticConfirm,
    SubmitOutcome, TracingNotifier, ViewContext,
};
use crate::error::AdminError;
use crate::middleware::ViewResponse;
use crate::routing::{
    parse_admin_path, AdminPage, HistoryNavigator, NavigationKind, RouteAction, HOME_PATH, LOGIN_PATH,
};
use crate::server::views::{DeleteDocument, FormDocument, HomeDocument, ListDocument, LoginDocument, NotFoundDocument};
use crate::server::AppState;
use crate::types::ItemId;

/// `page&limit&filter&orderBy&orderWay` as received on list routes
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub filter: Option<String>,
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
    #[serde(rename = "orderWay")]
    pub order_way: Option<String>,
}

impl ListParams {
    pub fn into_query(self, defaults: &ListConfig) -> ListQuery {
        let mut query = ListQuery::from_config(defaults);
        if let Some(page) = self.page {
            query.page = page.max(1);
        }
        if let Some(limit) = self.limit {
            query.page_size = limit.max(1);
        }
        if let Some(filter) = self.filter {
            query.search = filter;
        }
        if let Some(order_by) = self.order_by.filter(|f| !f.is_empty()) {
            query.sort_field = order_by;
        }
        if let Some(direction) = self.order_way.and_then(|w| w.parse().ok()) {
            query.sort_direction = direction;
        }
        query
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

/// Notices and navigation gathered while one request drives a view
struct ViewScope {
    notifier: Arc<MemoryNotifier>,
    navigator: Arc<HistoryNavigator>,
    clear_cookie: String,
}

impl ViewScope {
    fn new(state: &AppState) -> Self {
        Self {
            notifier: Arc::new(MemoryNotifier::new()),
            navigator: Arc::new(HistoryNavigator::new()),
            clear_cookie: clear_cookie_header(&state.config.session),
        }
    }

    fn ctx(&self) -> ViewContext {
        ViewContext::new(self.notifier.clone(), self.navigator.clone())
    }

    fn redirected_to_login(&self) -> bool {
        self.navigator
            .last()
            .is_some_and(|n| n.kind == NavigationKind::Replace && n.location == LOGIN_PATH)
    }

    fn respond<T: serde::Serialize>(&self, data: T, status: StatusCode) -> Response {
        // backend rejected the token: drop it and send the user to login
        if self.redirected_to_login() {
            return login_redirect(Some(self.clear_cookie.clone()));
        }
        let notices = self.notifier.take();
        for notice in &notices {
            TracingNotifier.notify(notice.clone());
        }
        ViewResponse::success(data)
            .with_status(status)
            .with_notices(notices)
            .with_navigation(self.navigator.last())
            .into_response()
    }

    fn fail(&self, err: AdminError) -> Response {
        self.respond(err.to_json(), status_of(&err))
    }
}

fn status_of(err: &AdminError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn login_redirect(clear_cookie: Option<String>) -> Response {
    match clear_cookie {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], HttpRedirect::to(LOGIN_PATH)).into_response(),
        None => HttpRedirect::to(LOGIN_PATH).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

pub async fn login_page() -> ViewResponse<LoginDocument> {
    ViewResponse::success(LoginDocument::default())
}

/// POST /admin/login - exchanges credentials for a token cookie
pub async fn login_submit(State(state): State<AppState>, Json(credentials): Json<Credentials>) -> Response {
    match request_token(&state.api, &credentials).await {
        Ok(token) => {
            tracing::info!("Admin login for {}", credentials.email);
            let cookie = set_cookie_header(&state.config.session, &token);
            ([(header::SET_COOKIE, cookie)], HttpRedirect::to(&format!("{HOME_PATH}/"))).into_response()
        }
        Err(err) => {
            let status = status_of(&err);
            ViewResponse::success(LoginDocument::default())
                .with_status(status)
                .with_notices(vec![Notice::error(err.to_string())])
                .into_response()
        }
    }
}

/// POST /admin/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    login_redirect(Some(clear_cookie_header(&state.config.session)))
}

pub async fn home(State(state): State<AppState>) -> ViewResponse<HomeDocument> {
    ViewResponse::success(HomeDocument::new(&state.registry))
}

/// GET on every CRUD route; the action comes from the full URI so path and
/// query forms are parsed the same way
pub async fn resource_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Response {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path());
    let route = match parse_admin_path(path) {
        Ok(AdminPage::Resource(route)) => route,
        Ok(AdminPage::Home) => return home(State(state)).await.into_response(),
        Ok(AdminPage::Login) => return login_page().await.into_response(),
        Err(err) => return AdminError::not_found(err.to_string()).into_response(),
    };

    let scope = ViewScope::new(&state);
    let crud = state
        .crud(&route.resource, session, scope.ctx())
        .with_list_query(params.into_query(&state.config.list));
    let header = crud.header();

    match crud.open(&route.action, JsonForm::new()).await {
        Ok(CrudView::List(list)) => scope.respond(ListDocument::new(header, &list), StatusCode::OK),
        Ok(CrudView::Create(adapter)) => scope.respond(FormDocument::new("new", header, &adapter), StatusCode::OK),
        Ok(CrudView::Edit(adapter)) => scope.respond(FormDocument::new("edit", header, &adapter), StatusCode::OK),
        Ok(CrudView::NotFound { list_path }) => {
            scope.respond(NotFoundDocument::new(header, list_path), StatusCode::NOT_FOUND)
        }
        Err(err) => scope.fail(err),
    }
}

/// POST /admin/:resource/new
pub async fn submit_create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(resource): Path<String>,
    Json(values): Json<Map<String, Value>>,
) -> Response {
    let scope = ViewScope::new(&state);
    let crud = state.crud(&resource, session, scope.ctx());
    let header = crud.header();

    match crud.select(&RouteAction::Create, JsonForm::with_values(values)) {
        CrudView::Create(adapter) => submit_form(&scope, "new", header, adapter).await,
        _ => scope.fail(AdminError::not_found(resource)),
    }
}

/// POST /admin/:resource/edit/:id
pub async fn submit_edit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(String, String)>,
    Json(values): Json<Map<String, Value>>,
) -> Response {
    let scope = ViewScope::new(&state);
    let crud = state.crud(&resource, session, scope.ctx());
    let header = crud.header();

    let mut adapter = match crud.select(&RouteAction::Edit(ItemId::parse(&id)), JsonForm::with_values(values)) {
        CrudView::Edit(adapter) => adapter,
        _ => return scope.respond(NotFoundDocument::new(header, crud.list_path()), StatusCode::NOT_FOUND),
    };

    match adapter.mount().await {
        Ok(()) => submit_form(&scope, "edit", header, adapter).await,
        Err(AdminError::NotFound(_)) => {
            scope.respond(NotFoundDocument::new(header, crud.list_path()), StatusCode::NOT_FOUND)
        }
        Err(err) => scope.fail(err),
    }
}

async fn submit_form(
    scope: &ViewScope,
    page: &'static str,
    header: CrudHeader,
    mut adapter: FormAdapter<JsonForm>,
) -> Response {
    let status = match adapter.submit().await {
        SubmitOutcome::Saved(_) => StatusCode::OK,
        SubmitOutcome::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::Failed(err) => status_of(&err),
        SubmitOutcome::Blocked(_) => StatusCode::CONFLICT,
    };
    scope.respond(FormDocument::new(page, header, &adapter), status)
}

/// POST /admin/:resource/delete/:id?confirm=true
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(String, String)>,
    Query(params): Query<DeleteParams>,
) -> Response {
    let scope = ViewScope::new(&state);
    let crud = state.crud(&resource, session, scope.ctx());
    let list_path = crud.list_path();

    let Some(id) = ItemId::parse(&id) else {
        return scope.fail(AdminError::not_found(format!("{resource}/")));
    };
    let CrudView::List(mut list) = crud.select(&RouteAction::List, JsonForm::new()) else {
        return scope.fail(AdminError::not_found(resource));
    };

    match list.delete(&id, &StaticConfirm(params.confirm)).await {
        DeleteOutcome::Declined => scope.respond(
            DeleteDocument { page: "delete", deleted: false, prompt: Some(MSG_DELETE_PROMPT), list_path },
            StatusCode::OK,
        ),
        DeleteOutcome::Deleted => scope.respond(
            DeleteDocument { page: "delete", deleted: true, prompt: None, list_path },
            StatusCode::OK,
        ),
        DeleteOutcome::Failed(err) => scope.fail(err),
    }
}
