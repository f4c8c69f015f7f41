use anyhow::{Context, Result};
use inquire::{validator::Validation, Password, PasswordDisplayMode, Text};
use std::error::Error;

use gio::config::validate_url;

/// Prompt for the management API base URL with validation
pub fn prompt_api_url() -> Result<String> {
    let url_validator = |input: &str| -> Result<Validation, Box<dyn Error + Send + Sync>> {
        if input.trim().is_empty() {
            return Ok(Validation::Invalid("URL cannot be empty".into()));
        }

        match validate_url(input.trim()) {
            Ok(()) => Ok(Validation::Valid),
            Err(_) => Ok(Validation::Invalid(
                "Please enter a URL like https://apim.example.com".into(),
            )),
        }
    };

    let url = Text::new("APIM management API URL:")
        .with_validator(url_validator)
        .prompt()
        .context("Failed to read URL input")?;

    Ok(url.trim().to_string())
}

/// Prompt for the bearer token without echoing it
pub fn prompt_token() -> Result<String> {
    let token_validator = |input: &str| -> Result<Validation, Box<dyn Error + Send + Sync>> {
        if input.trim().is_empty() {
            Ok(Validation::Invalid("Token cannot be empty".into()))
        } else {
            Ok(Validation::Valid)
        }
    };

    let token = Password::new("Bearer token:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(token_validator)
        .prompt()
        .context("Failed to read token input")?;

    Ok(token.trim().to_string())
}
