//! Transport-level behaviour against a mock SharePoint tenant

mod common;

use common::{ACCESS_TOKEN, DIGEST, SharePointMock, TENANT};
use reqwest::StatusCode;
use serde_json::json;
use simple_sharepoint::{RequestFailure, RetryConfig, SharePointClient, SharePointError};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, Request, ResponseTemplate};

/// Connecting discovers the tenant from the realm challenge
#[tokio::test]
async fn test_connect_discovers_tenant() {
    let mock = SharePointMock::start().await;
    let client = mock.client().await;

    assert_eq!(client.tenant_id(), TENANT);
    assert_eq!(client.site_url(), mock.site_url());
}

/// GET requests carry the bearer token and the nometadata defaults, but no digest
#[tokio::test]
async fn test_get_uses_default_headers() {
    let mock = SharePointMock::start().await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/web")))
        .and(header("Authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .and(header("Accept", "application/json;odata=nometadata"))
        .and(header("Content-Type", "application/json"))
        .and(header_exists("client-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Title": "Team"})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let web = client.get_json("_api/web").await.unwrap();

    assert_eq!(web["Title"], "Team");
    let requests = mock.server.received_requests().await.unwrap();
    let get = requests
        .iter()
        .find(|request| request.url.path().ends_with("/_api/web"))
        .unwrap();
    assert!(!get.headers.contains_key("x-requestdigest"));
}

/// POST switches to verbose OData and carries the form digest
#[tokio::test]
async fn test_post_carries_verbose_headers_and_digest() {
    let mock = SharePointMock::start().await;
    Mock::given(method("POST"))
        .and(path(mock.site_path("_api/web/lists/GetByTitle('Tasks')/items")))
        .and(header("Content-Type", "application/json;odata=verbose"))
        .and(header("Accept", "application/json;odata=verbose"))
        .and(header("X-RequestDigest", DIGEST))
        .and(body_json(json!({"Title": "Write tests"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"d": {"Id": 7}})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let body = json!({"Title": "Write tests"});
    let response = client
        .post("_api/web/lists/GetByTitle('Tasks')/items", Some(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

/// PATCH is sent as a MERGE with an unconditional match and no digest
#[tokio::test]
async fn test_patch_carries_merge_override() {
    let mock = SharePointMock::start().await;
    Mock::given(method("PATCH"))
        .and(path(mock.site_path("_api/web/lists/GetByTitle('Tasks')/items(3)")))
        .and(header("X-HTTP-Method", "MERGE"))
        .and(header("IF-MATCH", "*"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let body = json!({"Title": "Renamed"});
    client
        .patch("_api/web/lists/GetByTitle('Tasks')/items(3)", Some(&body))
        .await
        .unwrap();

    let requests = mock.server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|request| request.method.as_str() == "PATCH")
        .unwrap();
    assert!(!patch.headers.contains_key("x-requestdigest"));
    assert!(
        !requests
            .iter()
            .any(|request| request.url.path().ends_with("/_api/contextinfo")),
        "PATCH should not fetch a form digest"
    );
}

/// DELETE carries the override, an unconditional match and the digest
#[tokio::test]
async fn test_delete_carries_override_and_digest() {
    let mock = SharePointMock::start().await;
    Mock::given(method("DELETE"))
        .and(path(mock.site_path("_api/web/lists/GetByTitle('Tasks')/items(3)")))
        .and(header("X-HTTP-Method", "DELETE"))
        .and(header("IF-MATCH", "*"))
        .and(header("X-RequestDigest", DIGEST))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    client
        .delete("_api/web/lists/GetByTitle('Tasks')/items(3)")
        .await
        .unwrap();
}

/// Two consecutive requests reuse the same token
#[tokio::test]
async fn test_token_is_reused_across_requests() {
    let mock = SharePointMock::start().await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/site")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Id": "site-id"})))
        .expect(2)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    client.get("_api/site").await.unwrap();
    client.get("_api/site").await.unwrap();

    let requests = mock.server.received_requests().await.unwrap();
    let token_requests = requests
        .iter()
        .filter(|request| request.url.path().ends_with("/tokens/OAuth/2"))
        .count();
    assert_eq!(token_requests, 1);

    let bearers: Vec<&str> = requests
        .iter()
        .filter(|request| request.url.path().ends_with("/_api/site"))
        .filter_map(|request| request.headers.get("authorization"))
        .filter_map(|value| value.to_str().ok())
        .collect();
    assert_eq!(bearers.len(), 2);
    assert_eq!(bearers[0], bearers[1]);
}

/// 503, 503, 200 succeeds on the third attempt
#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mock = SharePointMock::start().await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/web")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock.server)
        .await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/web")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Title": "Team"})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let web = client.get_json("_api/web").await.unwrap();

    assert_eq!(web["Title"], "Team");
}

/// 404 is not retried and surfaces as a request error
#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock = SharePointMock::start().await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/web/lists/GetByTitle('Missing')")))
        .respond_with(ResponseTemplate::new(404).set_body_string("List does not exist"))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let err = client
        .get("_api/web/lists/GetByTitle('Missing')")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    match err {
        SharePointError::Request {
            method,
            source: RequestFailure::Status { body, .. },
        } => {
            assert_eq!(method, reqwest::Method::GET);
            assert_eq!(body, "List does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Persistent 500s give up after three attempts
#[tokio::test]
async fn test_retries_are_bounded() {
    let mock = SharePointMock::start().await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/web")))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let err = client.get("_api/web").await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.to_string().starts_with("SharePoint GET request failed"));
}

/// Retries also apply to mutating verbs
#[tokio::test]
async fn test_retry_applies_to_post() {
    let mock = SharePointMock::start().await;
    Mock::given(method("POST"))
        .and(path(mock.site_path("_api/web/lists/GetByTitle('Tasks')/items")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock.server)
        .await;
    Mock::given(method("POST"))
        .and(path(mock.site_path("_api/web/lists/GetByTitle('Tasks')/items")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Id": 1})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let created = client
        .send_json(
            reqwest::Method::POST,
            "_api/web/lists/GetByTitle('Tasks')/items",
            Some(&json!({"Title": "x"})),
        )
        .await
        .unwrap();

    assert_eq!(created["Id"], 1);
}

/// Every attempt of a request shares one correlation id
#[tokio::test]
async fn test_correlation_id_is_stable_across_retries() {
    let mock = SharePointMock::start().await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/site")))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock.server)
        .await;
    Mock::given(method("GET"))
        .and(path(mock.site_path("_api/site")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    client.get("_api/site").await.unwrap();

    let requests = mock.server.received_requests().await.unwrap();
    let ids: Vec<String> = requests
        .iter()
        .filter(|request: &&Request| request.url.path().ends_with("/_api/site"))
        .filter_map(|request| request.headers.get("client-request-id"))
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect();

    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], ids[1]);
}

/// A 204 body parses as null
#[tokio::test]
async fn test_empty_body_is_null() {
    let mock = SharePointMock::start().await;
    Mock::given(method("PATCH"))
        .and(path(mock.site_path("_api/web/lists/GetByTitle('Tasks')/items(1)")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock.server)
        .await;

    let client = mock.client().await;
    let body = client
        .send_json(
            reqwest::Method::PATCH,
            "_api/web/lists/GetByTitle('Tasks')/items(1)",
            Some(&json!({"Title": "x"})),
        )
        .await
        .unwrap();

    assert!(body.is_null());
}

/// A rejected token request fails the first authenticated call
#[tokio::test]
async fn test_token_rejection_is_a_request_error() {
    let mock = SharePointMock::start().await;
    let config = simple_sharepoint::SharePointConfig::new(mock.site_url(), "app", "secret")
        .with_accounts_url(format!("{}/nowhere", mock.uri()))
        .with_retry(RetryConfig::disabled());

    let client = SharePointClient::connect(config).await.unwrap();
    let err = client.get("_api/web").await.unwrap_err();

    assert!(matches!(err, SharePointError::Request { .. }));
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

/// Context info exposes the form digest
#[tokio::test]
async fn test_form_digest() {
    let mock = SharePointMock::start().await;
    let client = mock.client().await;

    assert_eq!(client.form_digest().await.unwrap(), DIGEST);
}
