use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An API as returned by the management API.
///
/// Only `id` and `name` are required. Every other field the server sends is
/// kept in `extra` exactly as received and serialised back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResource {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiResource {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn api_version(&self) -> Option<&str> {
        self.str_field("apiVersion")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }
}

/// One page of a collection response.
#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<ApiResource>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

impl Page {
    /// Link to the following page; absent, null and empty all mean this is the last page.
    pub fn next_link(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}
