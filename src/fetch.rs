//! Document retrieval for both pipeline phases.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::debug;

use crate::browser;
use crate::encoding;
use crate::error::{Error, Result};
use crate::options::Options;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANG: &str = "en-US,en;q=0.9";

/// A source of share-page documents, one method per pipeline phase.
///
/// The pipeline talks to this seam instead of a concrete HTTP client and
/// browser so tests can script both phases. [`HttpSource`] is the
/// production implementation.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the raw document behind `url` without executing scripts,
    /// decoded to a string.
    async fn fetch_static(&self, url: &str) -> Result<String>;

    /// Captures the document behind `url` after JavaScript has run.
    /// `options` carries the navigation and settle budgets.
    async fn fetch_rendered(&self, url: &str, options: &Options) -> Result<String>;
}

/// HTTP retrieval with a desktop-browser request profile.
///
/// Share pages serve a challenge page to obvious non-browser clients, so
/// the client sends the configured user agent plus browser-typical accept
/// headers on every request.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Builds a client honoring the configured user agent, fetch timeout,
    /// and redirect cap.
    pub fn new(options: &Options) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANG));

        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .default_headers(headers)
            .timeout(options.fetch_timeout)
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .build()
            .map_err(|err| Error::Fetch(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch_static(&self, url: &str) -> Result<String> {
        debug!(url, "fetching static document");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| Error::Fetch(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("status {status} for {url}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| Error::Fetch(err.to_string()))?;
        debug!(bytes = body.len(), "static document received");
        Ok(encoding::decode(&body))
    }

    async fn fetch_rendered(&self, url: &str, options: &Options) -> Result<String> {
        browser::render(url, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_default_options() {
        assert!(HttpSource::new(&Options::default()).is_ok());
    }

    #[test]
    fn test_source_is_object_safe() {
        fn assert_usable(_source: &dyn DocumentSource) {}
        let Ok(source) = HttpSource::new(&Options::default()) else {
            panic!("client should build");
        };
        assert_usable(&source);
    }
}
