use async_trait::async_trait;
use serde::Serialize;

use crate::api::{ListQuery, ListResult, ResourceClient};
use crate::config::{Column, ResourceDefinition};
use crate::crud::notify::{count_label, Notice, MSG_DELETED, MSG_DELETE_PROMPT};
use crate::crud::ViewContext;
use crate::error::AdminError;
use crate::routing::ResourceRoute;
use crate::types::{Item, ItemId, SortDirection};

/// Asks the user before a destructive action
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Fixed answer, for non-interactive callers (`--yes`, confirmed form posts)
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirm(pub bool);

#[async_trait]
impl Confirm for StaticConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Identifies one issued list fetch. Only the most recently issued ticket may
/// update the view.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    seq: u64,
    query: ListQuery,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// What a fetch completion did to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Unmounted, or a newer fetch was issued since
    Discarded,
    /// The requested page was past the last one; the page was moved back
    /// and the result held back, so the clamped page must be fetched
    Clamped,
}

#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    /// User declined, nothing was sent
    Declined,
    Deleted,
    /// Backend refused or was unreachable; the list is unchanged
    Failed(AdminError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: ItemId,
    pub cells: Vec<String>,
    pub edit_path: String,
}

/// Paginated, sortable, searchable listing of one resource.
pub struct ListView {
    definition: ResourceDefinition,
    client: ResourceClient,
    ctx: ViewContext,
    query: ListQuery,
    result: Option<ListResult>,
    last_issued: u64,
    loading: bool,
    mounted: bool,
}

impl ListView {
    pub fn new(definition: ResourceDefinition, client: ResourceClient, ctx: ViewContext, query: ListQuery) -> Self {
        Self {
            definition,
            client,
            ctx,
            query,
            result: None,
            last_issued: 0,
            loading: false,
            mounted: true,
        }
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn result(&self) -> Option<&ListResult> {
        self.result.as_ref()
    }

    pub fn items(&self) -> &[Item] {
        self.result.as_ref().map(|r| r.items.as_slice()).unwrap_or(&[])
    }

    pub fn total_count(&self) -> u64 {
        self.result.as_ref().map(|r| r.total_count).unwrap_or(0)
    }

    pub fn total_pages(&self) -> u32 {
        self.result.as_ref().map(|r| r.total_pages).unwrap_or(1)
    }

    /// True while the most recent fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn columns(&self) -> Vec<Column> {
        self.definition.effective_columns()
    }

    pub fn count_label(&self) -> String {
        count_label(self.total_count())
    }

    pub fn rows(&self) -> Vec<Row> {
        let columns = self.columns();
        self.items()
            .iter()
            .map(|item| Row {
                id: item.id.clone(),
                cells: columns.iter().map(|c| item.display(&c.field)).collect(),
                edit_path: ResourceRoute::edit(self.definition.endpoint.clone(), item.id.clone()).path(),
            })
            .collect()
    }

    /// Issues a new fetch ticket for the current query
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.last_issued += 1;
        self.loading = true;
        FetchTicket {
            seq: self.last_issued,
            query: self.query.clone(),
        }
    }

    /// Applies a fetch completion from the latest ticket. Older tickets and
    /// completions arriving after `unmount` are discarded.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<ListResult, AdminError>) -> Result<Completion, AdminError> {
        if !self.mounted {
            tracing::debug!(seq = ticket.seq, "list view unmounted, discarding response");
            return Ok(Completion::Discarded);
        }
        if ticket.seq != self.last_issued {
            tracing::debug!(seq = ticket.seq, latest = self.last_issued, "discarding stale list response");
            return Ok(Completion::Discarded);
        }

        self.loading = false;
        let result = result?;

        let last_page = result.total_pages.max(1);
        if self.query.page > last_page {
            tracing::debug!(page = self.query.page, last_page, "requested page out of range, clamping");
            self.query.page = last_page;
            return Ok(Completion::Clamped);
        }
        self.result = Some(result);
        Ok(Completion::Applied)
    }

    /// Fetches the current query; errors are reported and returned. A page
    /// past the end is clamped and fetched once more.
    pub async fn refresh(&mut self) -> Result<(), AdminError> {
        if self.fetch().await? == Completion::Clamped {
            self.fetch().await?;
        }
        Ok(())
    }

    async fn fetch(&mut self) -> Result<Completion, AdminError> {
        let ticket = self.begin_fetch();
        let result = self.client.list(ticket.query()).await;
        let completion = self.complete(ticket, result);
        if let Err(err) = &completion {
            self.ctx.report(err);
        }
        completion
    }

    pub async fn search(&mut self, text: &str) -> Result<(), AdminError> {
        self.query.search = text.trim().to_string();
        self.refresh().await
    }

    pub async fn change_page(&mut self, page: u32) -> Result<(), AdminError> {
        let mut page = page.max(1);
        if self.result.is_some() {
            page = page.min(self.total_pages().max(1));
        }
        self.query.page = page;
        self.refresh().await
    }

    pub async fn change_sort(&mut self, field: &str, direction: SortDirection) -> Result<(), AdminError> {
        self.query.sort_field = field.to_string();
        self.query.sort_direction = direction;
        self.refresh().await
    }

    pub async fn change_page_size(&mut self, page_size: u32) -> Result<(), AdminError> {
        let page_size = page_size.max(1);
        self.query.page_size = page_size;
        if let Some(result) = &self.result {
            let pages = result.total_count.div_ceil(page_size as u64).max(1);
            let pages = u32::try_from(pages).unwrap_or(u32::MAX);
            if self.query.page > pages {
                self.query.page = pages;
            }
        }
        self.refresh().await
    }

    /// Abandons any in-flight fetch's effect on this view
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.loading = false;
    }

    /// Deletes one record after confirmation and drops it from the held page
    pub async fn delete(&mut self, id: &ItemId, confirm: &dyn Confirm) -> DeleteOutcome {
        if !confirm.confirm(MSG_DELETE_PROMPT).await {
            return DeleteOutcome::Declined;
        }

        match self.client.delete(id).await {
            Ok(message) => {
                if let Some(result) = self.result.as_mut() {
                    let before = result.items.len();
                    result.items.retain(|item| &item.id != id);
                    if result.items.len() < before {
                        result.total_count = result.total_count.saturating_sub(1);
                        let pages = result.total_count.div_ceil(self.query.page_size.max(1) as u64).max(1);
                        result.total_pages = u32::try_from(pages).unwrap_or(u32::MAX);
                    }
                }
                if !message.is_empty() {
                    tracing::debug!(%id, "backend said: {}", message);
                }
                self.ctx.notify(Notice::success(MSG_DELETED));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                self.ctx.report(&err);
                DeleteOutcome::Failed(err)
            }
        }
    }
}
