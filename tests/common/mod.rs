//! Mock SharePoint tenant shared by the integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use simple_sharepoint::{RetryConfig, SharePointClient, SharePointConfig, Site};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "45ko8f6a-4g9e-4b0d-b164-d954lo574232";
pub const ACCESS_TOKEN: &str = "test-access-token";
pub const DIGEST: &str = "0x1234ABCD5678EF";
pub const SITE_PATH: &str = "/sites/team";

/// Wiremock server answering the realm probe, the token service and context info
pub struct SharePointMock {
    pub server: MockServer,
}

impl SharePointMock {
    pub async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/_vti_bin/client.svc"))
            .respond_with(ResponseTemplate::new(401).insert_header(
                "WWW-Authenticate",
                format!(
                    r#"Bearer realm="{}",client_id="00000003-0000-0ff1-ce00-000000000000""#,
                    TENANT
                ),
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("/{}/tokens/OAuth/2", TENANT)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "access_token": ACCESS_TOKEN,
                "expires_in": "3599",
                "expires_on": "4000000000",
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("{}/_api/contextinfo", SITE_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "FormDigestValue": DIGEST,
                "FormDigestTimeoutSeconds": 1800,
                "WebFullUrl": "https://contoso.sharepoint.com/sites/team",
            })))
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn site_url(&self) -> String {
        format!("{}{}", self.server.uri(), SITE_PATH)
    }

    /// Path of a site-relative endpoint on the mock server
    pub fn site_path(&self, endpoint: &str) -> String {
        format!("{}/{}", SITE_PATH, endpoint)
    }

    pub fn config(&self) -> SharePointConfig {
        SharePointConfig::new(self.site_url(), "app", "secret")
            .with_accounts_url(self.uri())
            .with_retry(RetryConfig::immediate(3))
    }

    pub async fn client(&self) -> SharePointClient {
        SharePointClient::connect(self.config())
            .await
            .expect("client should connect to the mock tenant")
    }

    pub async fn site(&self) -> Site {
        Site::new(Arc::new(self.client().await))
    }

    /// Mount the list details endpoint for `title`
    pub async fn mount_list(&self, title: &str, item_type: &str) {
        Mock::given(method("GET"))
            .and(path(self.site_path(&format!("_api/web/lists/GetByTitle('{}')", title))))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": title,
                "ItemCount": 2,
                "ListItemEntityTypeFullName": item_type,
            })))
            .mount(&self.server)
            .await;
    }
}

/// Wrap rows the way nometadata collection endpoints do
pub fn collection(rows: Value) -> Value {
    json!({ "value": rows })
}
