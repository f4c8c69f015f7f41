//! Presence and syntax checks for connection settings.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Configuration;
use crate::error::{ClientError, Result};

/// Scheme, one or more dot-terminated host labels, then a TLD of two or more letters.
static API_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://)([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}$").unwrap());

/// Return the URL and token if both are present and non-empty.
///
/// Every authenticated operation goes through here before a request is built.
pub fn validate_for_use(config: &Configuration) -> Result<(String, String)> {
    let api_url = config.api_url.as_deref().filter(|s| !s.is_empty());
    let token = config.bearer_token.as_deref().filter(|s| !s.is_empty());

    match (api_url, token) {
        (Some(api_url), Some(token)) => Ok((api_url.to_string(), token.to_string())),
        _ => Err(ClientError::Configuration(
            "API URL or Bearer Token is not configured. Use 'configure-url' and 'configure-token' to set them."
                .to_string(),
        )),
    }
}

/// Check a candidate API base URL.
pub fn validate_url(candidate: &str) -> Result<()> {
    if API_URL_PATTERN.is_match(candidate) {
        Ok(())
    } else {
        Err(ClientError::Validation(format!("Invalid URL: {}", candidate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: Option<&str>, token: Option<&str>) -> Configuration {
        Configuration {
            api_url: api_url.map(String::from),
            bearer_token: token.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_for_use_missing_fields() {
        for c in [
            config(None, None),
            config(Some("https://apim.example.com"), None),
            config(None, Some("tok")),
            config(Some(""), Some("tok")),
            config(Some("https://apim.example.com"), Some("")),
        ] {
            let err = validate_for_use(&c).unwrap_err();
            assert!(matches!(err, ClientError::Configuration(_)), "{:?}", c);
        }
    }

    #[test]
    fn test_validate_for_use_returns_values_unchanged() {
        let (url, token) = validate_for_use(&config(Some("http://localhost:8083"), Some("t"))).unwrap();
        assert_eq!(url, "http://localhost:8083");
        assert_eq!(token, "t");
    }

    #[test]
    fn test_validate_url_accepts() {
        for url in [
            "http://example.com",
            "https://apim.example.com",
            "https://my-gateway.eu.example.io",
            "http://a1.b2.co",
        ] {
            assert!(validate_url(url).is_ok(), "{}", url);
        }
    }

    #[test]
    fn test_validate_url_rejects() {
        for url in [
            "",
            "ftp://x.com",
            "http://bad",
            "example.com",
            "https://example.c",
            "https://example.com/",
            "https://example.com/management",
            "https://example.com:8083",
            " https://example.com",
            "https://exa_mple.com",
        ] {
            assert!(
                matches!(validate_url(url), Err(ClientError::Validation(_))),
                "{}",
                url
            );
        }
    }
}
