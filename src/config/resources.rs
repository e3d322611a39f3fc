use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// One table column of a list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub field: String,
    pub label: String,
}

/// A selectable `orderBy` value offered by a list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOption {
    pub field: String,
    pub label: String,
}

/// Everything the admin needs to know about a backend resource: where it lives
/// and how its screens are labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Route segment under `/admin/` and backend endpoint
    pub endpoint: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    /// Sidebar label
    #[serde(default)]
    pub menu_label: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub order_by_options: Vec<SortOption>,
}

fn default_icon() -> String {
    "settings".to_string()
}

impl ResourceDefinition {
    pub fn new(endpoint: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            title: title.into(),
            subtitle: String::new(),
            icon: default_icon(),
            menu_label: None,
            columns: Vec::new(),
            order_by_options: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_menu_label(mut self, label: impl Into<String>) -> Self {
        self.menu_label = Some(label.into());
        self
    }

    pub fn with_column(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.columns.push(Column { field: field.into(), label: label.into() });
        self
    }

    pub fn with_sort_option(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.order_by_options.push(SortOption { field: field.into(), label: label.into() });
        self
    }

    pub fn menu_label(&self) -> &str {
        self.menu_label.as_deref().unwrap_or(&self.title)
    }

    /// Columns to render, falling back to `name`/`description`
    pub fn effective_columns(&self) -> Vec<Column> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        vec![
            Column { field: "name".into(), label: "Nome".into() },
            Column { field: "description".into(), label: "Descrição".into() },
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRegistry {
    pub resources: Vec<ResourceDefinition>,
}

impl ResourceRegistry {
    pub fn builtin() -> Self {
        Self {
            resources: vec![
                ResourceDefinition::new("product-category", "Categorias de produto")
                    .with_subtitle("Gerencie aqui as categorias de produtos")
                    .with_menu_label("Categorias")
                    .with_column("name", "Nome")
                    .with_column("description", "Descrição"),
                ResourceDefinition::new("product-catalog", "Catálogo de produtos")
                    .with_subtitle("Gerencie catálogos de produtos")
                    .with_icon("list alternate outline")
                    .with_menu_label("Catálogos")
                    .with_column("name", "Nome")
                    .with_column("description", "Descrição")
                    .with_sort_option("name", "Nome")
                    .with_sort_option("description", "Descrição"),
            ],
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, AdminError> {
        let registry: ResourceRegistry = serde_yaml::from_str(content)
            .map_err(|e| AdminError::Config(format!("invalid resource registry: {e}")))?;

        for (index, resource) in registry.resources.iter().enumerate() {
            if resource.endpoint.trim().is_empty() || resource.endpoint.contains('/') {
                return Err(AdminError::Config(format!(
                    "resource #{index} has an invalid endpoint '{}'",
                    resource.endpoint
                )));
            }
        }

        Ok(registry)
    }

    pub fn load(path: &Path) -> Result<Self, AdminError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AdminError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    /// Registry from `ADMIN_RESOURCES_FILE` when configured, built-ins otherwise
    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self, AdminError> {
        match &config.server.resources_file {
            Some(path) => {
                let registry = Self::load(path)?;
                tracing::info!("Loaded {} resources from {}", registry.resources.len(), path.display());
                Ok(registry)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn get(&self, endpoint: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.endpoint == endpoint)
    }

    /// Unknown resources get a bare definition so any backend collection can be browsed
    pub fn resolve(&self, endpoint: &str) -> ResourceDefinition {
        self.get(endpoint)
            .cloned()
            .unwrap_or_else(|| ResourceDefinition::new(endpoint, endpoint))
    }
}
