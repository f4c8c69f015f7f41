//! Client core for the Gravitee APIM management API.
//!
//! [`config::ConfigStore`] persists the API URL and bearer token,
//! [`client::ApiClient`] issues create/list/update/delete calls against the
//! `/management/v2/environments/{env}/apis` collection.

pub mod client;
pub mod config;
pub mod error;

pub use client::{ApiClient, ApiResource, PageRequest, Pager, ProxyApiSpec, DEFAULT_ENV_ID};
pub use config::{ConfigStore, Configuration};
pub use error::ClientError;
