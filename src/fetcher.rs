use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use log::{info, warn};
use crate::error::{DigestError, Result};

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Single-shot page retrieval. No retries, client defaults for timeouts and redirects.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(DigestError::Client)?;

        Ok(Fetcher { client })
    }

    /// GETs `url` and returns the body. Anything but `200 OK` is a `Retrieval` error.
    pub fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching listing: {}", url);

        let resp = self.client.get(url)
            .send()
            .map_err(|source| DigestError::Transport { url: url.to_string(), source })?;

        let status = resp.status();
        check_status(status.as_u16(), url)?;

        let text = resp.text()
            .map_err(|source| DigestError::Transport { url: url.to_string(), source })?;
        info!("Received {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

fn check_status(status: u16, url: &str) -> Result<()> {
    if status == 200 {
        return Ok(());
    }
    warn!("Listing request to {} returned {}", url, status);
    Err(DigestError::Retrieval { status, url: url.to_string() })
}
