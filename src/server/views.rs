//! JSON view documents served by the admin host

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::ListQuery;
use crate::config::{Column, ResourceRegistry, SortOption};
use crate::crud::{CrudHeader, FormAdapter, FormStatus, JsonForm, ListView, Row};
use crate::routing::{ResourceRoute, LOGIN_PATH};

#[derive(Debug, Serialize)]
pub struct LoginDocument {
    pub page: &'static str,
    pub title: &'static str,
    pub heading: &'static str,
    pub action: &'static str,
    pub submit_label: &'static str,
}

impl Default for LoginDocument {
    fn default() -> Self {
        Self {
            page: "login",
            title: "Admin - Login",
            heading: "Acesso restrito ao administrador",
            action: LOGIN_PATH,
            submit_label: "Fazer login",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MenuEntry {
    pub label: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct HomeDocument {
    pub page: &'static str,
    pub title: &'static str,
    pub menu_title: &'static str,
    pub modules: Vec<MenuEntry>,
}

impl HomeDocument {
    pub fn new(registry: &ResourceRegistry) -> Self {
        Self {
            page: "home",
            title: "Admin Home",
            menu_title: "Módulos",
            modules: registry
                .resources
                .iter()
                .map(|r| MenuEntry {
                    label: r.menu_label().to_string(),
                    path: ResourceRoute::list(r.endpoint.clone()).path(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListDocument {
    pub page: &'static str,
    pub header: CrudHeader,
    pub columns: Vec<Column>,
    pub sort_options: Vec<SortOption>,
    pub rows: Vec<Row>,
    pub count_label: String,
    pub query: ListQuery,
    pub total_pages: u32,
    pub total_count: u64,
}

impl ListDocument {
    pub fn new(header: CrudHeader, view: &ListView) -> Self {
        Self {
            page: "list",
            header,
            columns: view.columns(),
            sort_options: view.definition().order_by_options.clone(),
            rows: view.rows(),
            count_label: view.count_label(),
            query: view.query().clone(),
            total_pages: view.total_pages(),
            total_count: view.total_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormDocument {
    pub page: &'static str,
    pub header: CrudHeader,
    pub status: FormStatus,
    pub submit_label: &'static str,
    pub values: Map<String, Value>,
    pub errors: BTreeMap<String, String>,
    pub list_path: String,
}

impl FormDocument {
    pub fn new(page: &'static str, header: CrudHeader, adapter: &FormAdapter<JsonForm>) -> Self {
        let form = adapter.form();
        Self {
            page,
            header,
            status: adapter.status(),
            submit_label: adapter.submit_label(),
            values: form.values.clone(),
            errors: form.errors.clone(),
            list_path: adapter.list_path().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotFoundDocument {
    pub page: &'static str,
    pub header: CrudHeader,
    pub message: &'static str,
    pub list_path: String,
}

impl NotFoundDocument {
    pub fn new(header: CrudHeader, list_path: String) -> Self {
        Self {
            page: "not_found",
            header,
            message: crate::crud::notify::MSG_NOT_FOUND,
            list_path,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteDocument {
    pub page: &'static str,
    pub deleted: bool,
    pub prompt: Option<&'static str>,
    pub list_path: String,
}
