mod apis;
mod pager;
mod request;

pub use apis::{ApiResource, Links, Page};
pub use pager::{PageRequest, Pager};
pub use request::{
    build_create_payload, build_headers, build_proxy_payload, build_update_payload, ApiDefinition,
    ProxyApiSpec, CREATE_DEFAULT_PATH, DEFAULT_TARGET, UPDATE_DEFAULT_PATH,
};

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::ConfigStore;
use crate::error::{ClientError, Result};

/// Environment used when the caller does not name one.
pub const DEFAULT_ENV_ID: &str = "DEFAULT";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the APIs collection of the management API (`/management/v2`).
///
/// Credentials are re-read from the [`ConfigStore`] at the start of every
/// operation, so a token updated by another process takes effect on the next call.
pub struct ApiClient {
    client: Client,
    store: ConfigStore,
    extra_headers: HeaderMap,
}

impl ApiClient {
    pub fn new(store: ConfigStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            client,
            store,
            extra_headers: HeaderMap::new(),
        })
    }

    /// Headers added to every request, overriding the defaults on collision.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers = headers;
        self
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Validate the stored configuration and resolve the collection URL for `env_id`.
    fn prepare(&self, env_id: &str) -> Result<(Url, HeaderMap)> {
        let (api_url, token) = self.store.credentials()?;
        let headers = build_headers(&token, Some(&self.extra_headers))?;

        let mut url = Url::parse(api_url.trim_end_matches('/')).map_err(|e| {
            ClientError::Configuration(format!("configured API URL {:?} is invalid: {}", api_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Configuration(format!("configured API URL {:?} cannot be a base", api_url))
            })?
            .pop_if_empty()
            .extend(["management", "v2", "environments", env_id, "apis"]);

        Ok((url, headers))
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        payload: Option<&T>,
    ) -> Result<Response> {
        debug!(%method, %url, "sending request");
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        debug!(status = response.status().as_u16(), "received response");
        Ok(response)
    }

    /// Create a proxy API in `env_id` (POST `.../apis`).
    pub async fn create(&self, env_id: &str, spec: &ProxyApiSpec) -> Result<ApiResource> {
        let (url, headers) = self.prepare(env_id)?;
        let payload = build_create_payload(spec);
        let response = self.send(Method::POST, url, headers, Some(&payload)).await?;
        parse_resource(response).await
    }

    /// Start walking every API in `env_id`. No request is sent until the pager is polled.
    pub fn list_all(&self, env_id: &str, page: PageRequest) -> Result<Pager> {
        let (mut url, headers) = self.prepare(env_id)?;
        if let Ok(mut segments) = url.path_segments_mut() {
            // The collection is listed with a trailing slash: `.../apis/?page=1&size=10`
            segments.push("");
        }
        page.apply(&mut url);
        Ok(Pager::new(self.client.clone(), headers, url))
    }

    /// Replace the definition of `api_id` (PUT `.../apis/{api_id}`).
    pub async fn update(&self, env_id: &str, api_id: &str, spec: &ProxyApiSpec) -> Result<ApiResource> {
        let (url, headers) = self.resource_url(env_id, api_id)?;
        let payload = build_update_payload(spec);
        let response = self.send(Method::PUT, url, headers, Some(&payload)).await?;
        parse_resource(response).await
    }

    /// Delete `api_id`. Only `204 No Content` counts as success.
    pub async fn delete(&self, env_id: &str, api_id: &str) -> Result<()> {
        let (url, headers) = self.resource_url(env_id, api_id)?;
        let response = self.send::<()>(Method::DELETE, url, headers, None).await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            body: error_body(response).await,
        })
    }

    fn resource_url(&self, env_id: &str, api_id: &str) -> Result<(Url, HeaderMap)> {
        let (mut url, headers) = self.prepare(env_id)?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(api_id);
        }
        Ok((url, headers))
    }
}

async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}

async fn parse_resource(response: Response) -> Result<ApiResource> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            body: error_body(response).await,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
}
