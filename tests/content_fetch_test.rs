use anyhow::Result;
use httpmock::prelude::*;
use strapi_loader::core::query::build_content_url;
use strapi_loader::{fetch_content, ContentQuery, LoaderError, ServiceConfig};

fn decoded_pairs(url: &url::Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[test]
fn test_built_url_for_full_query() {
    let query = ContentQuery::new("article")
        .with_filter("store=3")
        .with_populate("seo.image,author");
    let url = build_content_url("https://cms.example.com", &query).unwrap();

    assert_eq!(url.path(), "/api/articles");
    assert_eq!(
        decoded_pairs(&url),
        vec![
            ("populate".to_string(), "seo".to_string()),
            ("populate[1]".to_string(), "seo.image".to_string()),
            ("populate".to_string(), "author".to_string()),
            ("store".to_string(), "3".to_string()),
            ("pagination[limit]".to_string(), "25".to_string()),
            ("sort".to_string(), "updatedAt:desc".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_fetch_content_returns_data_records() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/posts")
            .query_param("store", "3")
            .query_param("populate", "SEO")
            .query_param("populate[1]", "SEO.socialImage")
            .query_param("pagination[limit]", "25")
            .query_param("sort", "updatedAt:desc");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "data": [
                    {"id": 1, "documentId": "a", "title": "First"},
                    {"id": 2, "documentId": "b", "title": "Second"}
                ],
                "meta": {"pagination": {"total": 2}}
            }));
    });

    let config = ServiceConfig::new(server.base_url());
    let query = ContentQuery::new("post").with_filter("store=3");
    let records = fetch_content(&query, &config).await?;

    api_mock.assert();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "First");
    assert_eq!(records[1]["documentId"], "b");
    Ok(())
}

#[tokio::test]
async fn test_fetch_content_sends_custom_paging_and_sort() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/products")
            .query_param("populate", "images")
            .query_param("pagination[limit]", "100")
            .query_param("sort", "price:asc");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"data": []}));
    });

    let query = ContentQuery::new("product")
        .with_populate("images")
        .with_sort("price:asc")
        .with_limit(100);
    let records = fetch_content(&query, &ServiceConfig::new(server.base_url()))
        .await
        .unwrap();

    api_mock.assert();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_data_that_is_not_a_sequence_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/posts");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"data": "not-an-array"}));
    });

    let result = fetch_content(
        &ContentQuery::new("post"),
        &ServiceConfig::new(server.base_url()),
    )
    .await;

    assert!(matches!(
        result,
        Err(LoaderError::InvalidResponseShape { .. })
    ));
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/posts");
        then.status(403);
    });

    let err = fetch_content(
        &ContentQuery::new("post"),
        &ServiceConfig::new(server.base_url()),
    )
    .await
    .unwrap_err();

    api_mock.assert_hits(1);
    assert_eq!(err.to_string(), "Failed to fetch: Forbidden");
}
