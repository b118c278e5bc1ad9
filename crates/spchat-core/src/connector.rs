//! Document connector trait

use async_trait::async_trait;

use crate::{Document, Result};

/// Trait for document store connectors (e.g., SharePoint)
///
/// A connector authenticates against a remote document store and produces
/// the complete set of accessible documents for one site. Fetching is
/// all-or-nothing per call: a failure mid-fetch yields `Err` and no partial
/// document set.
#[async_trait]
pub trait DocumentConnector: Send + Sync {
    /// Authenticate with the document store
    ///
    /// Returns `Error::Authentication` for rejected credentials and
    /// `Error::Network` when the service is unreachable.
    async fn connect(&mut self) -> Result<()>;

    /// Fetch every accessible document of the configured site
    async fn fetch_documents(&self) -> Result<Vec<Document>>;

    /// Display name of the site this connector targets
    fn site(&self) -> &str;

    /// Whether `connect` has succeeded
    fn is_authenticated(&self) -> bool;
}
