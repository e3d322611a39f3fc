use clap::Args;
use serde_json::{json, Map, Value};
use tokio::io::AsyncReadExt;

use crate::api::ListQuery;
use crate::cli::commands::{crud_for, require_session, CliScope, PromptConfirm};
use crate::cli::config::registry;
use crate::cli::utils::{output_document, output_empty_collection, output_field_errors, output_notices, print_table};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::crud::{
    Confirm, CrudView, DeleteOutcome, FormAdapter, JsonForm, StaticConfirm, SubmitOutcome,
};
use crate::routing::{ResourceRoute, RouteAction};
use crate::server::views::{FormDocument, ListDocument};
use crate::types::{Item, ItemId, SortDirection};

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(help = "Resource endpoint, e.g. product-category")]
    pub resource: String,
    #[arg(long, help = "1-based page number")]
    pub page: Option<u32>,
    #[arg(long, help = "Page size")]
    pub limit: Option<u32>,
    #[arg(long, help = "Free-text search")]
    pub filter: Option<String>,
    #[arg(long = "order-by", help = "Sort field")]
    pub order_by: Option<String>,
    #[arg(long = "order-way", help = "asc or desc")]
    pub order_way: Option<SortDirection>,
}

impl ListArgs {
    fn query(&self) -> ListQuery {
        let mut query = ListQuery::from_config(&config().list);
        if let Some(page) = self.page {
            query.page = page.max(1);
        }
        if let Some(limit) = self.limit {
            query.page_size = limit.max(1);
        }
        if let Some(filter) = &self.filter {
            query.search = filter.trim().to_string();
        }
        if let Some(order_by) = &self.order_by {
            query.sort_field = order_by.clone();
        }
        if let Some(direction) = self.order_way {
            query.sort_direction = direction;
        }
        query
    }
}

pub fn resources(output_format: OutputFormat) -> anyhow::Result<()> {
    let registry = registry()?;
    if registry.resources.is_empty() {
        return output_empty_collection(&output_format, "resources", "No resources registered");
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "resources": registry.resources }))?);
        }
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = registry
                .resources
                .iter()
                .map(|r| vec![r.endpoint.clone(), r.menu_label().to_string(), r.title.clone()])
                .collect();
            print_table(&["ENDPOINT".into(), "MENU".into(), "TITLE".into()], &rows);
        }
    }
    Ok(())
}

pub async fn list(args: ListArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = require_session(&ResourceRoute::list(args.resource.clone()))?;
    let scope = CliScope::new();
    let crud = crud_for(&args.resource, session, &scope)?.with_list_query(args.query());
    let header = crud.header();

    let CrudView::List(mut view) = crud.select(&RouteAction::List, JsonForm::new()) else {
        anyhow::bail!("{} has no list view", args.resource);
    };
    let outcome = view.refresh().await;
    scope.ensure_session()?;
    if let Err(err) = outcome {
        output_notices(&output_format, &scope.notices());
        return Err(err.into());
    }

    output_document(&output_format, &ListDocument::new(header, &view), &scope.notices(), print_list)
}

pub async fn show(resource: &str, id: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let session = require_session(&ResourceRoute::edit(resource, id.clone()))?;
    let scope = CliScope::new();
    let crud = crud_for(resource, session, &scope)?;

    let item = match crud.client().show(&id).await {
        Ok(item) => item,
        Err(err) => {
            scope.ctx().report(&err);
            scope.ensure_session()?;
            output_notices(&output_format, &scope.notices());
            return Err(err.into());
        }
    };

    output_document(&output_format, &item, &[], print_item)
}

pub async fn create(resource: &str, data: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let values = read_values(data).await?;
    let session = require_session(&ResourceRoute::create(resource))?;
    let scope = CliScope::new();
    let crud = crud_for(resource, session, &scope)?;
    let header = crud.header();

    let CrudView::Create(adapter) = crud.select(&RouteAction::Create, JsonForm::with_values(values)) else {
        anyhow::bail!("{} has no create form", resource);
    };
    submit(adapter, &scope, &output_format, |adapter| FormDocument::new("new", header, adapter)).await
}

pub async fn update(resource: &str, id: &str, data: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let values = read_values(data).await?;
    let id = parse_id(id)?;
    let session = require_session(&ResourceRoute::edit(resource, id.clone()))?;
    let scope = CliScope::new();
    let crud = crud_for(resource, session, &scope)?;
    let header = crud.header();

    let CrudView::Edit(mut adapter) = crud.select(&RouteAction::Edit(Some(id)), JsonForm::with_values(values)) else {
        anyhow::bail!("{} has no edit form", resource);
    };
    let mounted = adapter.mount().await;
    scope.ensure_session()?;
    if let Err(err) = mounted {
        output_notices(&output_format, &scope.notices());
        return Err(err.into());
    }

    submit(adapter, &scope, &output_format, |adapter| FormDocument::new("edit", header, adapter)).await
}

pub async fn delete(resource: &str, id: &str, yes: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let id = parse_id(id)?;
    let session = require_session(&ResourceRoute::list(resource))?;
    let scope = CliScope::new();
    let crud = crud_for(resource, session, &scope)?;

    let CrudView::List(mut view) = crud.select(&RouteAction::List, JsonForm::new()) else {
        anyhow::bail!("{} has no list view", resource);
    };
    let confirm: Box<dyn Confirm> = if yes { Box::new(StaticConfirm(true)) } else { Box::new(PromptConfirm) };

    let outcome = view.delete(&id, confirm.as_ref()).await;
    scope.ensure_session()?;

    match outcome {
        DeleteOutcome::Declined => {
            output_document(&output_format, &json!({ "deleted": false, "id": id }), &scope.notices(), |_| {
                println!("Cancelled")
            })
        }
        DeleteOutcome::Deleted => {
            output_document(&output_format, &json!({ "deleted": true, "id": id }), &scope.notices(), |_| {})
        }
        DeleteOutcome::Failed(err) => {
            output_notices(&output_format, &scope.notices());
            Err(err.into())
        }
    }
}

async fn submit<D, F>(
    mut adapter: FormAdapter<JsonForm>,
    scope: &CliScope,
    output_format: &OutputFormat,
    document: F,
) -> anyhow::Result<()>
where
    D: serde::Serialize,
    F: FnOnce(&FormAdapter<JsonForm>) -> D,
{
    let outcome = adapter.submit().await;
    scope.ensure_session()?;

    match outcome {
        SubmitOutcome::Saved(item) => {
            output_document(output_format, &document(&adapter), &scope.notices(), |_| print_item(&item))
        }
        SubmitOutcome::Invalid(field_errors) => {
            output_notices(output_format, &scope.notices());
            output_field_errors(output_format, &field_errors)?;
            anyhow::bail!("Validation failed")
        }
        SubmitOutcome::Failed(err) => {
            output_notices(output_format, &scope.notices());
            Err(err.into())
        }
        SubmitOutcome::Blocked(status) => anyhow::bail!("Form is not ready to submit ({:?})", status),
    }
}

fn parse_id(id: &str) -> anyhow::Result<ItemId> {
    ItemId::parse(id).ok_or_else(|| anyhow::anyhow!("Invalid record id '{}'", id))
}

/// Record fields from `--data`, or stdin when omitted
async fn read_values(data: Option<String>) -> anyhow::Result<Map<String, Value>> {
    let raw = match data {
        Some(data) => data,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(values) => Ok(values),
        other => anyhow::bail!("Expected a JSON object, got {}", other),
    }
}

pub(crate) fn print_list(document: &ListDocument) {
    println!("{}", document.header.title);
    if !document.header.subtitle.is_empty() {
        println!("{}", document.header.subtitle);
    }
    println!();

    let mut headers = vec!["ID".to_string()];
    headers.extend(document.columns.iter().map(|c| c.label.to_uppercase()));
    let rows: Vec<Vec<String>> = document
        .rows
        .iter()
        .map(|row| std::iter::once(row.id.to_string()).chain(row.cells.iter().cloned()).collect())
        .collect();
    print_table(&headers, &rows);

    println!();
    println!(
        "{} · página {}/{}",
        document.count_label, document.query.page, document.total_pages
    );
}

pub(crate) fn print_item(item: &Item) {
    println!("{:<14} {}", "id", item.id);
    for field in item.fields.keys() {
        println!("{:<14} {}", field, item.display(field));
    }
}
