//! Header and payload construction shared by every management API call.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use crate::error::{ClientError, Result};

/// Listener path used by `create` when the caller gives none.
pub const CREATE_DEFAULT_PATH: &str = "/demo/http-proxy1";
/// Listener path used by `update` when the caller gives none.
pub const UPDATE_DEFAULT_PATH: &str = "/demo/http-proxy";
/// Backend target used by both operations when the caller gives none.
pub const DEFAULT_TARGET: &str = "https://api.gravitee.io/echo";

const DEFINITION_VERSION: &str = "V4";
const API_TYPE: &str = "PROXY";
const LISTENER_TYPE: &str = "HTTP";
const HTTP_PROXY: &str = "http-proxy";
const ENDPOINT_GROUP_NAME: &str = "default-group";
const ENDPOINT_NAME: &str = "default";

/// Build the `Authorization`/`Content-Type` header set.
///
/// Entries in `extra` replace the defaults when they share a name.
pub fn build_headers(token: &str, extra: Option<&HeaderMap>) -> Result<HeaderMap> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| ClientError::Validation("bearer token contains invalid characters".into()))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(extra) = extra {
        for (name, value) in extra {
            headers.insert(name.clone(), value.clone());
        }
    }

    Ok(headers)
}

/// Caller-supplied fields of a V4 HTTP proxy API.
///
/// `path` and `target` fall back to the per-operation defaults when `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyApiSpec {
    pub name: String,
    pub api_version: String,
    pub description: String,
    pub path: Option<String>,
    pub target: Option<String>,
}

impl ProxyApiSpec {
    pub fn new(name: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_version: api_version.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Wire shape of the API document accepted by the management API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition<'a> {
    name: &'a str,
    api_version: &'a str,
    description: &'a str,
    definition_version: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    listeners: Vec<Listener<'a>>,
    endpoint_groups: Vec<EndpointGroup<'a>>,
}

#[derive(Debug, Serialize)]
struct Listener<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    paths: Vec<ListenerPath<'a>>,
    entrypoints: Vec<Entrypoint>,
}

#[derive(Debug, Serialize)]
struct ListenerPath<'a> {
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct Entrypoint {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct EndpointGroup<'a> {
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    endpoints: Vec<Endpoint<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Endpoint<'a> {
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    weight: u32,
    inherit_configuration: bool,
    configuration: EndpointConfiguration<'a>,
}

#[derive(Debug, Serialize)]
struct EndpointConfiguration<'a> {
    target: &'a str,
}

/// Build the proxy API document, falling back to `default_path` when `spec.path` is unset.
pub fn build_proxy_payload<'a>(spec: &'a ProxyApiSpec, default_path: &'a str) -> ApiDefinition<'a> {
    let path = spec.path.as_deref().unwrap_or(default_path);
    let target = spec.target.as_deref().unwrap_or(DEFAULT_TARGET);

    ApiDefinition {
        name: &spec.name,
        api_version: &spec.api_version,
        description: &spec.description,
        definition_version: DEFINITION_VERSION,
        kind: API_TYPE,
        listeners: vec![Listener {
            kind: LISTENER_TYPE,
            paths: vec![ListenerPath { path }],
            entrypoints: vec![Entrypoint { kind: HTTP_PROXY }],
        }],
        endpoint_groups: vec![EndpointGroup {
            name: ENDPOINT_GROUP_NAME,
            kind: HTTP_PROXY,
            endpoints: vec![Endpoint {
                name: ENDPOINT_NAME,
                kind: HTTP_PROXY,
                weight: 1,
                inherit_configuration: false,
                configuration: EndpointConfiguration { target },
            }],
        }],
    }
}

pub fn build_create_payload(spec: &ProxyApiSpec) -> ApiDefinition<'_> {
    build_proxy_payload(spec, CREATE_DEFAULT_PATH)
}

pub fn build_update_payload(spec: &ProxyApiSpec) -> ApiDefinition<'_> {
    build_proxy_payload(spec, UPDATE_DEFAULT_PATH)
}
