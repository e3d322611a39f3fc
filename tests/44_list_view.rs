mod common;

use anyhow::Result;

use crud_admin::api::ListQuery;
use crud_admin::config::ResourceRegistry;
use crud_admin::crud::notify::MSG_DELETED;
use crud_admin::crud::{DeleteOutcome, ListView, Notice, NoticeLevel, StaticConfirm};
use crud_admin::types::{ItemId, SortDirection};

use common::{Harness, MockBackend};

fn category_view(backend: &MockBackend, harness: &Harness, query: ListQuery) -> ListView {
    let definition = ResourceRegistry::builtin().resolve("product-category");
    ListView::new(definition, backend.authed_api().resource("product-category"), harness.ctx(), query)
}

#[tokio::test]
async fn two_categories_render_two_rows() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let mut view = category_view(&backend, &harness, ListQuery::default());

    view.refresh().await?;

    assert_eq!(view.rows().len(), 2);
    assert_eq!(view.count_label(), "2 registros encontrados");
    assert_eq!(view.total_pages(), 1);
    assert!(!view.is_loading());
    Ok(())
}

#[tokio::test]
async fn sort_change_issues_one_fetch_with_new_order() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let mut view = category_view(&backend, &harness, ListQuery::default());
    view.refresh().await?;
    backend.clear_requests();

    view.change_sort("name", SortDirection::Asc).await?;

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query["orderBy"], "name");
    assert_eq!(requests[0].query["orderWay"], "asc");
    assert_eq!(view.items()[0].display("name"), "Doces");
    Ok(())
}

#[tokio::test]
async fn page_size_change_issues_one_fetch_with_new_limit() -> Result<()> {
    let backend = MockBackend::start().await?;
    backend.seed_many("product-category", 48);
    let harness = Harness::new();
    let mut view = category_view(&backend, &harness, ListQuery::default());
    view.refresh().await?;
    assert_eq!(view.total_count(), 50);
    backend.clear_requests();

    view.change_page_size(10).await?;

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query["limit"], "10");
    assert_eq!(view.items().len(), 10);
    assert_eq!(view.total_pages(), 5);
    Ok(())
}

#[tokio::test]
async fn growing_page_size_clamps_current_page_before_fetching() -> Result<()> {
    let backend = MockBackend::start().await?;
    backend.seed_many("product-category", 48);
    let harness = Harness::new();
    let query = ListQuery { page_size: 10, ..ListQuery::default() };
    let mut view = category_view(&backend, &harness, query);
    view.refresh().await?;
    view.change_page(5).await?;
    backend.clear_requests();

    view.change_page_size(25).await?;

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query["page"], "2");
    assert_eq!(view.query().page, 2);
    assert!(!view.items().is_empty());
    Ok(())
}

#[tokio::test]
async fn out_of_range_page_is_clamped_and_shown() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let query = ListQuery { page: 9, ..ListQuery::default() };
    let mut view = category_view(&backend, &harness, query);

    view.refresh().await?;

    assert_eq!(view.query().page, 1);
    assert_eq!(view.rows().len(), 2);
    let pages: Vec<String> = backend.requests().iter().map(|r| r.query["page"].clone()).collect();
    assert_eq!(pages, vec!["9", "1"]);
    Ok(())
}

#[tokio::test]
async fn narrowing_search_from_a_later_page_shows_matching_rows() -> Result<()> {
    let backend = MockBackend::start().await?;
    backend.seed_many("product-category", 28);
    let harness = Harness::new();
    let query = ListQuery { page_size: 10, ..ListQuery::default() };
    let mut view = category_view(&backend, &harness, query);
    view.change_page(3).await?;
    assert_eq!(view.rows().len(), 10);

    view.search("item 00").await?;

    assert_eq!(view.query().page, 1);
    assert_eq!(view.total_pages(), 1);
    assert_eq!(view.rows().len(), 10);
    assert_eq!(view.count_label(), "10 registros encontrados");
    Ok(())
}

#[tokio::test]
async fn change_page_clamps_and_fetches_once() -> Result<()> {
    let backend = MockBackend::start().await?;
    backend.seed_many("product-category", 48);
    let harness = Harness::new();
    let query = ListQuery { page_size: 10, ..ListQuery::default() };
    let mut view = category_view(&backend, &harness, query);
    view.refresh().await?;
    backend.clear_requests();

    view.change_page(9).await?;

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query["page"], "5");
    assert_eq!(view.query().page, 5);
    assert_eq!(view.rows().len(), 10);

    backend.clear_requests();
    view.change_page(0).await?;

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query["page"], "1");
    assert_eq!(view.query().page, 1);
    Ok(())
}

#[tokio::test]
async fn search_sends_filter_and_narrows_rows() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let mut view = category_view(&backend, &harness, ListQuery::default());

    view.search("  doce ").await?;

    assert_eq!(backend.requests()[0].query["filter"], "doce");
    assert_eq!(view.rows().len(), 1);
    assert_eq!(view.count_label(), "1 registro encontrado");
    Ok(())
}

#[tokio::test]
async fn confirmed_delete_sends_one_request_and_drops_row() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let mut view = category_view(&backend, &harness, ListQuery::default());
    view.refresh().await?;
    backend.clear_requests();

    let outcome = view.delete(&ItemId::Number(1), &StaticConfirm(true)).await;

    assert!(matches!(outcome, DeleteOutcome::Deleted));
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path, "/api/product-category/1");
    assert_eq!(view.rows().len(), 1);
    assert_eq!(view.total_count(), 1);
    assert_eq!(harness.notifier.notices(), vec![Notice::success(MSG_DELETED)]);
    Ok(())
}

#[tokio::test]
async fn deleting_last_row_of_last_page_shrinks_page_count() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let query = ListQuery { page_size: 1, ..ListQuery::default() };
    let mut view = category_view(&backend, &harness, query);
    view.refresh().await?;
    view.change_page(2).await?;
    assert_eq!(view.total_pages(), 2);
    assert_eq!(view.items()[0].id, ItemId::Number(2));

    let outcome = view.delete(&ItemId::Number(2), &StaticConfirm(true)).await;

    assert!(matches!(outcome, DeleteOutcome::Deleted));
    assert_eq!(view.total_count(), 1);
    assert_eq!(view.total_pages(), 1);
    Ok(())
}

#[tokio::test]
async fn declined_delete_sends_nothing() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let mut view = category_view(&backend, &harness, ListQuery::default());
    view.refresh().await?;
    backend.clear_requests();

    let outcome = view.delete(&ItemId::Number(1), &StaticConfirm(false)).await;

    assert!(matches!(outcome, DeleteOutcome::Declined));
    assert!(backend.requests().is_empty());
    assert_eq!(view.rows().len(), 2);
    assert_eq!(backend.count("product-category"), 2);
    Ok(())
}

#[tokio::test]
async fn failed_delete_keeps_rows_and_notifies() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let mut view = category_view(&backend, &harness, ListQuery::default());
    view.refresh().await?;

    let outcome = view.delete(&ItemId::Number(404), &StaticConfirm(true)).await;

    assert!(matches!(outcome, DeleteOutcome::Failed(_)));
    assert_eq!(view.rows().len(), 2);
    let notices = harness.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    Ok(())
}

#[tokio::test]
async fn rejected_token_redirects_to_login_without_notice() -> Result<()> {
    let backend = MockBackend::start().await?;
    let harness = Harness::new();
    let definition = ResourceRegistry::builtin().resolve("product-category");
    let api = backend.api(crud_admin::auth::Session::new("stale"));
    let mut view = ListView::new(definition, api.resource("product-category"), harness.ctx(), ListQuery::default());

    let err = view.refresh().await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(harness.navigator.last().map(|n| n.location).as_deref(), Some("/admin/login"));
    assert!(harness.notifier.notices().is_empty());
    Ok(())
}
