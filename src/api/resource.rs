use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::format::{DataEnvelope, MessageEnvelope, PageEnvelope};
use crate::api::ApiClient;
use crate::config::ListConfig;
use crate::error::AdminError;
use crate::types::{Item, ItemId, Operation, SortDirection};

/// List query state: pagination, search and sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// 1-based
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub sort_field: String,
    pub sort_direction: SortDirection,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::from_config(&ListConfig::default())
    }
}

impl ListQuery {
    pub fn from_config(config: &ListConfig) -> Self {
        Self {
            page: 1,
            page_size: config.default_page_size.max(1),
            search: String::new(),
            sort_field: config.default_order_by.clone(),
            sort_direction: config.default_order_way,
        }
    }

    /// `page&limit&filter&orderBy&orderWay`; `filter` only when searching
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.page_size.max(1).to_string()),
        ];
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("filter", search.to_string()));
        }
        if !self.sort_field.is_empty() {
            params.push(("orderBy", self.sort_field.clone()));
            params.push(("orderWay", self.sort_direction.as_str().to_string()));
        }
        params
    }
}

/// One fetched page. Replaces the held page wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    pub items: Vec<Item>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

/// `list/show/store/update/delete` against one backend collection.
#[derive(Clone, Debug)]
pub struct ResourceClient {
    api: ApiClient,
    endpoint: String,
}

impl ResourceClient {
    pub fn new(api: ApiClient, endpoint: &str) -> Self {
        Self {
            api,
            endpoint: endpoint.trim_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn member_path(&self, id: &ItemId) -> String {
        format!("{}/{}", self.endpoint, id.path_segment())
    }

    pub async fn list(&self, query: &ListQuery) -> Result<ListResult, AdminError> {
        let page: PageEnvelope<Item> = self.api.get_json(&self.endpoint, &query.to_params()).await?;
        tracing::debug!(
            resource = %self.endpoint,
            op = Operation::List.as_str(),
            items = page.data.len(),
            total = page.total,
            "list fetched"
        );
        Ok(ListResult {
            current_page: page.current_page.unwrap_or(query.page),
            total_pages: page.last_page,
            total_count: page.total,
            items: page.data,
        })
    }

    pub async fn show(&self, id: &ItemId) -> Result<Item, AdminError> {
        let envelope: DataEnvelope<Item> = self.api.get_json(&self.member_path(id), &[]).await?;
        tracing::debug!(resource = %self.endpoint, op = Operation::Show.as_str(), %id, "record fetched");
        Ok(envelope.data)
    }

    pub async fn store(&self, fields: &Map<String, Value>) -> Result<Item, AdminError> {
        let envelope: DataEnvelope<Item> = self.api.post_json(&self.endpoint, fields).await?;
        tracing::info!(resource = %self.endpoint, op = Operation::Store.as_str(), id = %envelope.data.id, "record created");
        Ok(envelope.data)
    }

    pub async fn update(&self, id: &ItemId, fields: &Map<String, Value>) -> Result<Item, AdminError> {
        let envelope: DataEnvelope<Item> = self.api.put_json(&self.member_path(id), fields).await?;
        tracing::info!(resource = %self.endpoint, op = Operation::Update.as_str(), %id, "record updated");
        Ok(envelope.data)
    }

    /// Returns the backend's confirmation message
    pub async fn delete(&self, id: &ItemId) -> Result<String, AdminError> {
        let envelope: MessageEnvelope = self.api.delete_json(&self.member_path(id)).await?;
        tracing::info!(resource = %self.endpoint, op = Operation::Delete.as_str(), %id, "record deleted");
        Ok(envelope.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_matches_list_defaults() {
        let params = ListQuery::default().to_params();
        assert_eq!(
            params,
            vec![
                ("page", "1".to_string()),
                ("limit", "30".to_string()),
                ("orderBy", "updated_at".to_string()),
                ("orderWay", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn search_text_becomes_filter_param() {
        let query = ListQuery {
            search: "  doce ".into(),
            ..ListQuery::default()
        };
        assert!(query.to_params().contains(&("filter", "doce".to_string())));
    }

    #[test]
    fn endpoint_is_trimmed() {
        let api = ApiClient::new("http://localhost", crate::auth::Session::anonymous()).unwrap();
        let client = api.resource("/product-category/");
        assert_eq!(client.endpoint(), "product-category");
        assert_eq!(client.member_path(&ItemId::Number(4)), "product-category/4");
    }
}
