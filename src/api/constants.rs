//! API constants for the SharePoint REST API and the ACS token service

/// Default ACS (Azure Access Control) token service
pub const ACCOUNTS_URL: &str = "https://accounts.accesscontrol.windows.net";

/// Well-known principal id of SharePoint Online, used to build the token resource
pub const SHAREPOINT_PRINCIPAL: &str = "00000003-0000-0ff1-ce00-000000000000";

/// Legacy client service endpoint probed for the tenant realm
pub const REALM_PROBE_PATH: &str = "/_vti_bin/client.svc";

pub const CONTEXT_INFO_PATH: &str = "_api/contextinfo";

pub const USER_AGENT: &str = "sharepoint-cli/1.0";

/// Default page size for list item queries
pub const DEFAULT_ROW_LIMIT: u32 = 5000;

/// Title assigned to new records that do not carry one
pub const DEFAULT_TITLE: &str = "New Record";

/// Standard headers for SharePoint requests
pub mod headers {
    pub const ACCEPT_NOMETADATA: &str = "application/json;odata=nometadata";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const ODATA_VERBOSE: &str = "application/json;odata=verbose";

    // Header names are kept lowercase so they can build `HeaderName`s statically
    pub const X_REQUEST_DIGEST: &str = "x-requestdigest";
    pub const X_HTTP_METHOD: &str = "x-http-method";
    pub const IF_MATCH_ANY: &str = "*";
    pub const METHOD_MERGE: &str = "MERGE";
    pub const METHOD_DELETE: &str = "DELETE";

    /// Correlation id SharePoint echoes back in its logs
    pub const CLIENT_REQUEST_ID: &str = "client-request-id";
}

/// Relative endpoints under the site URL
pub mod endpoints {
    pub const SITE: &str = "_api/site";
    pub const WEB: &str = "_api/web";
    pub const CONTENT_TYPES: &str = "_api/web/contenttypes";
    pub const EVENT_RECEIVERS: &str = "_api/web/eventreceivers";
    pub const FEATURES: &str = "_api/web/features";
    pub const FIELDS: &str = "_api/web/fields";
    pub const LISTS: &str = "_api/web/lists";
    pub const SITE_USERS: &str = "_api/web/siteusers";
    pub const SITE_GROUPS: &str = "_api/web/sitegroups";
    pub const ROLE_ASSIGNMENTS: &str = "_api/web/roleassignments";
}

/// Quote a title for use inside an OData string literal in a URL path
pub fn odata_literal(title: &str) -> String {
    urlencoding::encode(&title.replace('\'', "''")).into_owned()
}

/// Build the base endpoint of a list addressed by title
pub fn list_endpoint(title: &str) -> String {
    format!("_api/web/lists/GetByTitle('{}')", odata_literal(title))
}

/// Build the item endpoint of a list item
pub fn list_item_endpoint(list_base: &str, id: i64) -> String {
    format!("{}/items({})", list_base, id)
}

/// Build the ACS token endpoint for a tenant
pub fn token_endpoint(accounts_url: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/tokens/OAuth/2",
        accounts_url.trim_end_matches('/'),
        tenant_id
    )
}
