//! Generic CRUD orchestration: picks the list view, the create form or the
//! edit form from the route action, all wired to one resource client.

pub mod form;
pub mod list;
pub mod notify;

use std::sync::Arc;

use serde::Serialize;

use crate::api::{ApiClient, ListQuery, ResourceClient};
use crate::config::ResourceDefinition;
use crate::error::AdminError;
use crate::routing::{Navigator, ResourceRoute, RouteAction, LOGIN_PATH};

pub use form::{Form, FormAdapter, FormMode, FormStatus, JsonForm, SubmitOutcome};
pub use list::{Completion, Confirm, DeleteOutcome, FetchTicket, ListView, Row, StaticConfirm};
pub use notify::{MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};

/// Notification and navigation collaborators shared by one view instance
#[derive(Clone)]
pub struct ViewContext {
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl ViewContext {
    pub fn new(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self { notifier, navigator }
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Surfaces a failure: auth problems redirect to login, the rest become an error notice
    pub fn report(&self, err: &AdminError) {
        if err.is_auth() {
            self.navigator.replace(LOGIN_PATH);
            return;
        }
        self.notify(Notice::error(format!("Não foi possível concluir a operação. {err}")));
    }
}

/// Page header shown above every CRUD view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrudHeader {
    pub title: String,
    pub subtitle: String,
    pub icon: String,
    pub new_label: &'static str,
    pub new_path: String,
}

pub enum CrudView<F: Form> {
    List(ListView),
    Create(FormAdapter<F>),
    Edit(FormAdapter<F>),
    /// Edit route without an id, or with an id the backend does not know
    NotFound { list_path: String },
}

impl<F: Form> CrudView<F> {
    pub fn kind(&self) -> &'static str {
        match self {
            CrudView::List(_) => "list",
            CrudView::Create(_) => "new",
            CrudView::Edit(_) => "edit",
            CrudView::NotFound { .. } => "not_found",
        }
    }
}

/// CRUD orchestrator for one resource
pub struct Crud {
    definition: ResourceDefinition,
    client: ResourceClient,
    ctx: ViewContext,
    list_query: ListQuery,
}

impl Crud {
    pub fn new(definition: ResourceDefinition, api: &ApiClient, ctx: ViewContext) -> Self {
        let client = api.resource(&definition.endpoint);
        Self {
            definition,
            client,
            ctx,
            list_query: ListQuery::default(),
        }
    }

    pub fn with_list_query(mut self, query: ListQuery) -> Self {
        self.list_query = query;
        self
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    pub fn list_path(&self) -> String {
        ResourceRoute::list(self.definition.endpoint.clone()).path()
    }

    pub fn header(&self) -> CrudHeader {
        CrudHeader {
            title: self.definition.title.clone(),
            subtitle: self.definition.subtitle.clone(),
            icon: self.definition.icon.clone(),
            new_label: "Adicionar",
            new_path: ResourceRoute::create(self.definition.endpoint.clone()).path(),
        }
    }

    /// Picks the view for `action` without touching the network
    pub fn select<F: Form>(&self, action: &RouteAction, form: F) -> CrudView<F> {
        match action {
            RouteAction::List => CrudView::List(ListView::new(
                self.definition.clone(),
                self.client.clone(),
                self.ctx.clone(),
                self.list_query.clone(),
            )),
            RouteAction::Create => {
                CrudView::Create(FormAdapter::create(self.client.clone(), form, self.ctx.clone(), self.list_path()))
            }
            RouteAction::Edit(Some(id)) => CrudView::Edit(FormAdapter::edit(
                self.client.clone(),
                id.clone(),
                form,
                self.ctx.clone(),
                self.list_path(),
            )),
            RouteAction::Edit(None) => CrudView::NotFound { list_path: self.list_path() },
        }
    }

    /// Selects the view and performs its initial load: the first page for the
    /// list, the record for the edit form.
    pub async fn open<F: Form>(&self, action: &RouteAction, form: F) -> Result<CrudView<F>, AdminError> {
        let view = match self.select(action, form) {
            CrudView::List(mut list) => {
                list.refresh().await?;
                CrudView::List(list)
            }
            CrudView::Edit(mut adapter) => match adapter.mount().await {
                Ok(()) => CrudView::Edit(adapter),
                Err(AdminError::NotFound(_)) => CrudView::NotFound { list_path: self.list_path() },
                Err(err) => return Err(err),
            },
            CrudView::NotFound { list_path } => {
                self.ctx.notify(Notice::error(notify::MSG_NOT_FOUND));
                CrudView::NotFound { list_path }
            }
            other => other,
        };
        Ok(view)
    }
}
