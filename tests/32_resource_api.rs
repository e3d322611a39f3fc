mod common;

use anyhow::Result;
use serde_json::{json, Map, Value};

use crud_admin::api::{ApiClient, ListQuery};
use crud_admin::auth::Session;
use crud_admin::error::AdminError;
use crud_admin::types::{ItemId, SortDirection};

use common::{unreachable_base_url, MockBackend};

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn list_sends_pagination_and_sort_params() -> Result<()> {
    let backend = MockBackend::start().await?;
    let client = backend.authed_api().resource("product-category");

    let result = client.list(&ListQuery::default()).await?;

    assert_eq!(result.items.len(), 2);
    assert_eq!(result.total_count, 2);
    assert_eq!(result.total_pages, 1);
    // updated_at desc puts the most recent first
    assert_eq!(result.items[0].display("name"), "Doces");

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/api/product-category");
    assert_eq!(request.query["page"], "1");
    assert_eq!(request.query["limit"], "30");
    assert_eq!(request.query["orderBy"], "updated_at");
    assert_eq!(request.query["orderWay"], "desc");
    assert!(!request.query.contains_key("filter"));
    Ok(())
}

#[tokio::test]
async fn search_goes_out_as_filter() -> Result<()> {
    let backend = MockBackend::start().await?;
    let client = backend.authed_api().resource("product-category");

    let query = ListQuery {
        search: "sal".into(),
        sort_field: "name".into(),
        sort_direction: SortDirection::Asc,
        ..ListQuery::default()
    };
    let result = client.list(&query).await?;

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].display("name"), "Salgados");
    assert_eq!(backend.requests()[0].query["filter"], "sal");
    Ok(())
}

#[tokio::test]
async fn show_store_update_delete_round() -> Result<()> {
    let backend = MockBackend::start().await?;
    let client = backend.authed_api().resource("product-category");

    let created = client.store(&fields(json!({"name": "Bebidas", "description": "Sucos"}))).await?;
    let &ItemId::Number(id) = &created.id else {
        anyhow::bail!("expected numeric id, got {:?}", created.id);
    };

    let shown = client.show(&created.id).await?;
    assert_eq!(shown.display("description"), "Sucos");

    let updated = client.update(&created.id, &fields(json!({"name": "Bebidas geladas"}))).await?;
    assert_eq!(updated.display("name"), "Bebidas geladas");
    assert_eq!(backend.record("product-category", id).unwrap()["name"], "Bebidas geladas");

    let message = client.delete(&created.id).await?;
    assert_eq!(message, "Registro removido");
    assert!(backend.record("product-category", id).is_none());

    let methods: Vec<String> = backend.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["POST", "GET", "PUT", "DELETE"]);
    Ok(())
}

#[tokio::test]
async fn validation_errors_keep_field_messages() -> Result<()> {
    let backend = MockBackend::start().await?;
    let client = backend.authed_api().resource("product-category");

    let err = client.store(&fields(json!({"name": ""}))).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.status_code(), 422);
    let field_errors = err.field_errors().expect("field errors");
    assert_eq!(field_errors["name"], vec!["required".to_string()]);
    Ok(())
}

#[tokio::test]
async fn missing_record_is_not_found() -> Result<()> {
    let backend = MockBackend::start().await?;
    let client = backend.authed_api().resource("product-category");

    let err = client.show(&ItemId::Number(999)).await.unwrap_err();
    assert!(matches!(err, AdminError::NotFound(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn missing_token_is_auth_error() -> Result<()> {
    let backend = MockBackend::start().await?;
    let client = backend.api(Session::anonymous()).resource("product-category");

    let err = client.list(&ListQuery::default()).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(backend.requests()[0].authorization, None);
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_network_error() -> Result<()> {
    let api = ApiClient::new(&unreachable_base_url(), Session::new("t"))?;
    let err = api.resource("product-category").list(&ListQuery::default()).await.unwrap_err();

    assert!(matches!(err, AdminError::Network(_)), "{err:?}");
    assert_eq!(err.status_code(), 502);
    Ok(())
}

#[tokio::test]
async fn every_request_is_single_shot() -> Result<()> {
    let backend = MockBackend::start().await?;
    let client = backend.authed_api().resource("product-category");

    let (qa, qb) = (ListQuery::default(), ListQuery::default());
    let (a, b) = futures::join!(client.list(&qa), client.list(&qb));
    a?;
    b?;

    assert_eq!(backend.requests().len(), 2, "identical concurrent lists are not deduplicated");
    Ok(())
}
