//! SharePoint configuration

use serde::{Deserialize, Serialize};
use spchat_core::{Error, Result};
use std::env;
use url::Url;

/// Credentials and addressing for one SharePoint site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointConfig {
    pub site_url: String,
    pub site_name: String,
    pub username: String,
    pub password: String,
}

impl SharePointConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let site_url = env::var("SHAREPOINT_URL").map_err(|_| {
            Error::Configuration("SHAREPOINT_URL environment variable not found".to_string())
        })?;

        let site_name = env::var("SHAREPOINT_SITE_NAME").map_err(|_| {
            Error::Configuration("SHAREPOINT_SITE_NAME environment variable not found".to_string())
        })?;

        let username = env::var("SHAREPOINT_USERNAME").map_err(|_| {
            Error::Configuration("SHAREPOINT_USERNAME environment variable not found".to_string())
        })?;

        let password = env::var("SHAREPOINT_PASSWORD").map_err(|_| {
            Error::Configuration("SHAREPOINT_PASSWORD environment variable not found".to_string())
        })?;

        Self::new(site_url, site_name, username, password)
    }

    /// Create configuration with explicit values
    pub fn new(
        site_url: impl Into<String>,
        site_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            site_name: site_name.into(),
            username: username.into(),
            password: password.into(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.site_url)
            .map_err(|e| Error::Configuration(format!("Invalid SharePoint URL: {}", e)))?;

        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(Error::Configuration(format!(
                "SharePoint URL must be http(s), got '{}'",
                parsed.scheme()
            )));
        }

        if self.site_name.is_empty() {
            return Err(Error::Configuration("Site name must not be empty".to_string()));
        }

        Ok(())
    }

    /// Base URL of the target site, e.g. `https://host/sites/hr`
    pub fn site_base(&self) -> String {
        format!("{}/sites/{}", self.site_url, self.site_name)
    }
}
