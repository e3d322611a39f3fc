//! `admin open <path>`: resolves an admin URL the way the admin host does,
//! through the guard and then the CRUD orchestrator.

use serde_json::json;

use crate::cli::commands::data::{print_item, print_list};
use crate::cli::commands::{crud_for, CliScope};
use crate::cli::config::{load_session, registry};
use crate::cli::utils::{output_document, output_notices, print_table};
use crate::cli::OutputFormat;
use crate::crud::{CrudView, JsonForm};
use crate::middleware::guard_navigation;
use crate::routing::{parse_admin_path, AdminPage};
use crate::server::views::{FormDocument, HomeDocument, ListDocument, LoginDocument, NotFoundDocument};

pub async fn open(path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let page = parse_admin_path(path)?;
    let session = load_session()?;
    let scope = CliScope::new();

    if !guard_navigation(&session, &page, scope.navigator()) {
        let location = scope.navigator().last().map(|n| n.location).unwrap_or_default();
        return output_document(
            &output_format,
            &json!({ "page": page.path(), "redirect": location }),
            &[],
            |_| println!("{} requires login, redirected to {}", page, location),
        );
    }

    let route = match page {
        AdminPage::Login => {
            return output_document(&output_format, &LoginDocument::default(), &[], |doc| {
                println!("{}", doc.title);
                println!("Use `admin auth login <email>` to sign in");
            });
        }
        AdminPage::Home => {
            let home = HomeDocument::new(&registry()?);
            return output_document(&output_format, &home, &[], |doc| {
                println!("{}", doc.menu_title);
                let rows: Vec<Vec<String>> =
                    doc.modules.iter().map(|m| vec![m.label.clone(), m.path.clone()]).collect();
                print_table(&["MÓDULO".into(), "CAMINHO".into()], &rows);
            });
        }
        AdminPage::Resource(route) => route,
    };

    let crud = crud_for(&route.resource, session, &scope)?;
    let header = crud.header();
    let opened = crud.open(&route.action, JsonForm::new()).await;
    scope.ensure_session()?;
    let notices = scope.notices();
    let view = match opened {
        Ok(view) => view,
        Err(err) => {
            output_notices(&output_format, &notices);
            return Err(err.into());
        }
    };

    match view {
        CrudView::List(view) => output_document(&output_format, &ListDocument::new(header, &view), &notices, print_list),
        CrudView::Create(adapter) => {
            output_document(&output_format, &FormDocument::new("new", header, &adapter), &notices, print_form)
        }
        CrudView::Edit(adapter) => {
            output_document(&output_format, &FormDocument::new("edit", header, &adapter), &notices, |doc| {
                print_form(doc);
                if let Some(record) = adapter.record() {
                    println!();
                    print_item(record);
                }
            })
        }
        CrudView::NotFound { list_path } => output_document(
            &output_format,
            &NotFoundDocument::new(header, list_path),
            &notices,
            |doc| println!("Voltar para {}", doc.list_path),
        ),
    }
}

fn print_form(document: &FormDocument) {
    println!("{} · {}", document.header.title, document.submit_label);
    for (field, value) in &document.values {
        match document.errors.get(field) {
            Some(error) => println!("{:<14} {}  ({})", field, value, error),
            None => println!("{:<14} {}", field, value),
        }
    }
}
