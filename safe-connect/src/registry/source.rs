//! Remote chain registry access.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::RegistryError;
use crate::chain::ChainPage;

/// Path of the chain listing relative to the registry base URL.
pub const CHAINS_PATH: &str = "v1/chains";

/// Source of registry pages.
///
/// `cursor` is `None` for the first page and the previous page's `next` URL
/// afterwards.
#[async_trait]
pub trait RegistrySource: Send + Sync + std::fmt::Debug {
    /// Fetches a single page.
    async fn fetch_page(&self, cursor: Option<&Url>) -> Result<ChainPage, RegistryError>;
}

/// [`RegistrySource`] backed by the registry HTTP service.
#[derive(Debug, Clone)]
pub struct HttpRegistrySource {
    client: Client,
    first_page: Url,
}

impl HttpRegistrySource {
    /// Creates a source for `{base_url}/v1/chains`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain listing URL cannot be derived from
    /// `base_url`.
    pub fn new(base_url: &Url) -> Result<Self, RegistryError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Same as [`HttpRegistrySource::new`] with a caller-supplied client.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain listing URL cannot be derived from
    /// `base_url`.
    pub fn with_client(client: Client, base_url: &Url) -> Result<Self, RegistryError> {
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let first_page = base
            .join(CHAINS_PATH)
            .map_err(|e| RegistryError::unavailable("invalid registry URL", e))?;
        Ok(Self { client, first_page })
    }

    /// URL of the first page.
    #[must_use]
    pub const fn first_page(&self) -> &Url {
        &self.first_page
    }
}

#[async_trait]
impl RegistrySource for HttpRegistrySource {
    async fn fetch_page(&self, cursor: Option<&Url>) -> Result<ChainPage, RegistryError> {
        let url = cursor.unwrap_or(&self.first_page);
        tracing::debug!(%url, "fetching chain registry page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RegistryError::unavailable("request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Http {
                status: status.as_u16(),
                url: url.clone(),
            });
        }

        response
            .json::<ChainPage>()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_is_relative_to_base_path() {
        let base = Url::parse("https://gateway.example/api").unwrap();
        let source = HttpRegistrySource::new(&base).unwrap();
        assert_eq!(
            source.first_page().as_str(),
            "https://gateway.example/api/v1/chains"
        );

        let base = Url::parse("http://localhost:3001/").unwrap();
        let source = HttpRegistrySource::new(&base).unwrap();
        assert_eq!(source.first_page().as_str(), "http://localhost:3001/v1/chains");
    }
}
