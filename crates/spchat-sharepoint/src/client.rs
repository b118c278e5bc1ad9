//! SharePoint Online client implementation
//!
//! Authentication follows the legacy SharePoint Online flow: request a
//! binary security token from the Microsoft STS, then trade it for the
//! `rtFa`/`FedAuth` session cookies at the site's sign-in endpoint. Document
//! listing and download go through the site's REST API with those cookies.

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use spchat_core::{Document, DocumentConnector, Error, Result};

use crate::config::SharePointConfig;
use crate::content::extract_text;

const STS_URL: &str = "https://login.microsoftonline.com/extSTS.srf";

const SAML_ENVELOPE: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"
    xmlns:a="http://www.w3.org/2005/08/addressing"
    xmlns:u="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Issue</a:Action>
    <a:ReplyTo><a:Address>http://www.w3.org/2005/08/addressing/anonymous</a:Address></a:ReplyTo>
    <a:To s:mustUnderstand="1">https://login.microsoftonline.com/extSTS.srf</a:To>
    <o:Security s:mustUnderstand="1" xmlns:o="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd">
      <o:UsernameToken>
        <o:Username>{username}</o:Username>
        <o:Password>{password}</o:Password>
      </o:UsernameToken>
    </o:Security>
  </s:Header>
  <s:Body>
    <t:RequestSecurityToken xmlns:t="http://schemas.xmlsoap.org/ws/2005/02/trust">
      <wsp:AppliesTo xmlns:wsp="http://schemas.xmlsoap.org/ws/2004/09/policy">
        <a:EndpointReference><a:Address>{endpoint}</a:Address></a:EndpointReference>
      </wsp:AppliesTo>
      <t:KeyType>http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey</t:KeyType>
      <t:RequestType>http://schemas.xmlsoap.org/ws/2005/02/trust/Issue</t:RequestType>
      <t:TokenType>urn:oasis:names:tc:SAML:1.0:assertion</t:TokenType>
    </t:RequestSecurityToken>
  </s:Body>
</s:Envelope>"#;

#[derive(Debug, Deserialize)]
struct FileEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ServerRelativeUrl")]
    server_relative_url: String,
    #[serde(rename = "TimeLastModified")]
    time_last_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileListing {
    value: Vec<FileEntry>,
    #[serde(rename = "odata.nextLink")]
    next_link: Option<String>,
}

/// SharePoint Online connector
pub struct SharePointClient {
    config: SharePointConfig,
    client: Client,
    session_cookies: Option<String>,
}

impl SharePointClient {
    /// Document library fetched by default
    pub const DOCUMENT_LIBRARY: &'static str = "Shared Documents";

    /// Create a new SharePoint client from configuration
    pub fn new(config: SharePointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            session_cookies: None,
        })
    }

    /// Create a new SharePoint client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = SharePointConfig::from_env()?;
        Self::new(config)
    }

    /// Request a binary security token for the site from the Microsoft STS
    async fn request_security_token(&self) -> Result<String> {
        let envelope = SAML_ENVELOPE
            .replace("{username}", &xml_escape(&self.config.username))
            .replace("{password}", &xml_escape(&self.config.password))
            .replace("{endpoint}", &xml_escape(&self.config.site_url));

        let response = self
            .client
            .post(STS_URL)
            .header(CONTENT_TYPE, "application/soap+xml; charset=utf-8")
            .body(envelope)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let token_re = Regex::new(r"<wsse:BinarySecurityToken[^>]*>([^<]+)</wsse:BinarySecurityToken>")
            .map_err(|e| Error::Other(e.to_string()))?;

        if let Some(captures) = token_re.captures(&body) {
            return Ok(captures[1].to_string());
        }

        // No token: pull the STS fault reason if one is present.
        let fault_re = Regex::new(r"<psf:text>([^<]+)</psf:text>")
            .map_err(|e| Error::Other(e.to_string()))?;
        let reason = fault_re
            .captures(&body)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| "Security token request rejected".to_string());

        Err(Error::Authentication(reason))
    }

    /// Trade the security token for rtFa/FedAuth session cookies
    async fn sign_in(&self, token: &str) -> Result<String> {
        let url = format!("{}/_forms/default.aspx?wa=wsignin1.0", self.config.site_url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(token.to_string())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let mut rt_fa = None;
        let mut fed_auth = None;

        for value in response.headers().get_all(SET_COOKIE) {
            let cookie = value.to_str().unwrap_or_default();
            let pair = cookie.split(';').next().unwrap_or_default();
            if pair.starts_with("rtFa=") {
                rt_fa = Some(pair.to_string());
            } else if pair.starts_with("FedAuth=") {
                fed_auth = Some(pair.to_string());
            }
        }

        match (rt_fa, fed_auth) {
            (Some(rt_fa), Some(fed_auth)) => Ok(format!("{}; {}", rt_fa, fed_auth)),
            _ => Err(Error::Authentication(
                "Sign-in did not yield session cookies".to_string(),
            )),
        }
    }

    fn cookies(&self) -> Result<&str> {
        self.session_cookies
            .as_deref()
            .ok_or_else(|| Error::Authentication("Not authenticated. Call connect() first.".to_string()))
    }

    /// GET a REST endpoint and return the response body as text
    async fn rest_get(&self, url: &str, accept: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .header(COOKIE, self.cookies()?.to_string())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::Authentication(format!(
                "SharePoint rejected the session: {}",
                status
            )));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Network(format!(
                "SharePoint request failed with status {}: {}",
                status, body
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    /// Listing endpoint for the document library, rooted at the site web
    fn files_endpoint(&self) -> String {
        format!(
            "{}/_api/web/GetFolderByServerRelativeUrl('{}')/Files",
            self.config.site_base(),
            Self::DOCUMENT_LIBRARY.replace(' ', "%20"),
        )
    }

    /// Download endpoint for one file, rooted at the same site web as the
    /// listing so the server-relative paths it returned resolve
    fn file_endpoint(&self, server_relative_url: &str) -> String {
        format!(
            "{}/_api/web/GetFileByServerRelativeUrl('{}')/$value",
            self.config.site_base(),
            server_relative_url.replace('\'', "''").replace(' ', "%20"),
        )
    }

    /// List every file of the document library, following pagination
    async fn list_files(&self) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        let mut url = self.files_endpoint();

        loop {
            let body = self.rest_get(&url, "application/json;odata=nometadata").await?;
            let listing: FileListing = serde_json::from_str(&body)
                .map_err(|e| Error::Serialization(format!("Unexpected file listing: {}", e)))?;

            entries.extend(listing.value);

            match listing.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(entries)
    }

    /// Download a file body as text
    async fn download_file(&self, server_relative_url: &str) -> Result<String> {
        let url = self.file_endpoint(server_relative_url);
        self.rest_get(&url, "*/*").await
    }
}

#[async_trait]
impl DocumentConnector for SharePointClient {
    async fn connect(&mut self) -> Result<()> {
        let token = self.request_security_token().await?;
        let cookies = self.sign_in(&token).await?;
        self.session_cookies = Some(cookies);
        Ok(())
    }

    async fn fetch_documents(&self) -> Result<Vec<Document>> {
        let entries = self.list_files().await?;
        let mut documents = Vec::with_capacity(entries.len());

        // All-or-nothing: any failed download or unreadable body aborts
        // the whole fetch.
        for entry in entries {
            let raw = self.download_file(&entry.server_relative_url).await?;
            let content = extract_text(&raw).map_err(|_| {
                Error::Indexing(format!(
                    "Document '{}' has an unsupported format",
                    entry.name
                ))
            })?;

            let document = Document::new(
                &entry.server_relative_url,
                &entry.name,
                content,
                &entry.server_relative_url,
            )
            .with_metadata(json!({
                "library": Self::DOCUMENT_LIBRARY,
                "modified": entry.time_last_modified,
            }));

            documents.push(document);
        }

        Ok(documents)
    }

    fn site(&self) -> &str {
        &self.config.site_name
    }

    fn is_authenticated(&self) -> bool {
        self.session_cookies.is_some()
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
