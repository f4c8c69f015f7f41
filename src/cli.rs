use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use gio::client::{CREATE_DEFAULT_PATH, DEFAULT_TARGET, UPDATE_DEFAULT_PATH};
use gio::config::DEFAULT_CONFIG_FILE;
use gio::{ApiClient, ApiResource, ConfigStore, PageRequest, ProxyApiSpec, DEFAULT_ENV_ID};

use crate::prompts;

#[derive(Parser)]
#[command(name = "gio")]
#[command(about = "A CLI client for the Gravitee APIM management API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path of the configuration file
    #[arg(long, global = true, env = "GIO_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the Gravitee APIM API URL
    ConfigureUrl {
        /// Base URL, e.g. https://apim.example.com (prompted for when omitted)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Set the API bearer token
    ConfigureToken {
        /// Bearer token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Show current configuration
    ConfigureShow,

    /// List all APIs, following pagination
    ListApis {
        /// Environment ID
        #[arg(long, default_value = DEFAULT_ENV_ID)]
        env_id: String,

        /// Number of APIs requested per page
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },

    /// Create a new HTTP proxy API
    CreateApi {
        /// Name of the API
        #[arg(long)]
        name: String,

        /// Version of the API
        #[arg(long, default_value = "1.0")]
        api_version: String,

        /// Description of the API
        #[arg(long, default_value = "")]
        description: String,

        /// API path
        #[arg(long, default_value = CREATE_DEFAULT_PATH)]
        path: String,

        /// Target URL for the proxy endpoint
        #[arg(long, default_value = DEFAULT_TARGET)]
        target: String,

        /// Environment ID
        #[arg(long, default_value = DEFAULT_ENV_ID)]
        env_id: String,
    },

    /// Update an existing API's information
    UpdateApi {
        /// Environment ID
        #[arg(long)]
        env_id: String,

        /// API ID
        #[arg(long)]
        api_id: String,

        /// API name
        #[arg(long)]
        name: String,

        /// API version
        #[arg(long)]
        api_version: String,

        /// API description
        #[arg(long)]
        description: Option<String>,

        /// API path
        #[arg(long, default_value = UPDATE_DEFAULT_PATH)]
        path: String,

        /// Target URL for the proxy endpoint
        #[arg(long, default_value = DEFAULT_TARGET)]
        target: String,
    },

    /// Delete an API by its ID
    DeleteApi {
        /// Environment ID
        #[arg(long)]
        env_id: String,

        /// API ID to delete
        #[arg(long)]
        api_id: String,
    },
}

fn mask_token(token: &str) -> String {
    if !token.is_ascii() || token.len() <= 12 {
        return "*".repeat(token.chars().count().min(12));
    }
    format!("{}...{}", &token[..8], &token[token.len() - 4..])
}

fn print_resource(api: &ApiResource) -> Result<()> {
    let json = serde_json::to_string_pretty(api).context("Failed to format API")?;
    println!("{}", json);
    Ok(())
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let store = ConfigStore::new(&self.config);

        match self.command {
            Commands::ConfigureUrl { api_url } => {
                let api_url = match api_url {
                    Some(url) => url,
                    None => prompts::prompt_api_url()?,
                };
                store
                    .set_api_url(&api_url)
                    .context("Failed to configure API URL")?;
                println!("{} Gravitee APIM API URL set to: {}", "✓".green(), api_url);
            }
            Commands::ConfigureToken { token } => {
                let token = match token {
                    Some(token) => token,
                    None => prompts::prompt_token()?,
                };
                store
                    .set_bearer_token(&token)
                    .context("Failed to configure bearer token")?;
                println!("{} Bearer Token configured successfully!", "✓".green());
            }
            Commands::ConfigureShow => {
                let config = store.load().context("Failed to load configuration")?;
                if config.is_empty() {
                    println!("No configuration found.");
                } else {
                    println!("Current Configuration ({}):", store.path().display());
                    println!(
                        "  api_url: {}",
                        config.api_url.as_deref().unwrap_or("<not set>")
                    );
                    match config.bearer_token.as_deref() {
                        Some(token) => println!("  bearer_token: {}", mask_token(token)),
                        None => println!("  bearer_token: <not set>"),
                    }
                    for (key, value) in &config.extra {
                        println!("  {}: {}", key, value);
                    }
                }
            }
            Commands::ListApis { env_id, page_size } => {
                let client = ApiClient::new(store)?;
                let page = PageRequest {
                    size: page_size,
                    ..Default::default()
                };
                let mut pager = client
                    .list_all(&env_id, page)
                    .context("Failed to list APIs")?;

                let mut count = 0;
                while let Some(api) = pager.next_item().await {
                    let api = api.context("Failed to list APIs")?;
                    println!("ID: {}, Name: {}", api.id, api.name);
                    count += 1;
                }
                println!("\nFound {} API(s)", count);
            }
            Commands::CreateApi {
                name,
                api_version,
                description,
                path,
                target,
                env_id,
            } => {
                let client = ApiClient::new(store)?;
                let spec = ProxyApiSpec::new(name, api_version)
                    .description(description)
                    .path(path)
                    .target(target);
                let api = client
                    .create(&env_id, &spec)
                    .await
                    .context("Failed to create API")?;
                println!("{} API created successfully!", "✓".green());
                print_resource(&api)?;
            }
            Commands::UpdateApi {
                env_id,
                api_id,
                name,
                api_version,
                description,
                path,
                target,
            } => {
                let client = ApiClient::new(store)?;
                let spec = ProxyApiSpec::new(name, api_version)
                    .description(description.unwrap_or_default())
                    .path(path)
                    .target(target);
                let api = client
                    .update(&env_id, &api_id, &spec)
                    .await
                    .context("Failed to update API")?;
                println!("{} API updated successfully!", "✓".green());
                print_resource(&api)?;
            }
            Commands::DeleteApi { env_id, api_id } => {
                let client = ApiClient::new(store)?;
                client
                    .delete(&env_id, &api_id)
                    .await
                    .with_context(|| format!("Failed to delete API {}", api_id))?;
                println!("{} API successfully deleted.", "✓".green());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcdefgh12345678wxyz"), "abcdefgh...wxyz");
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_parse_create_defaults() {
        let cli = Cli::try_parse_from(["gio", "create-api", "--name", "demo"]).unwrap();
        match cli.command {
            Commands::CreateApi {
                name,
                api_version,
                description,
                path,
                target,
                env_id,
            } => {
                assert_eq!(name, "demo");
                assert_eq!(api_version, "1.0");
                assert_eq!(description, "");
                assert_eq!(path, "/demo/http-proxy1");
                assert_eq!(target, "https://api.gravitee.io/echo");
                assert_eq!(env_id, "DEFAULT");
            }
            _ => panic!("expected create-api"),
        }
    }

    #[test]
    fn test_parse_update_requires_ids() {
        assert!(Cli::try_parse_from(["gio", "update-api", "--name", "n", "--api-version", "1"]).is_err());
        let cli = Cli::try_parse_from([
            "gio",
            "update-api",
            "--env-id",
            "DEFAULT",
            "--api-id",
            "abc",
            "--name",
            "n",
            "--api-version",
            "2.0",
            "--config",
            "/tmp/gio.json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/gio.json"));
        assert!(matches!(cli.command, Commands::UpdateApi { ref path, .. } if path == "/demo/http-proxy"));
    }
}
