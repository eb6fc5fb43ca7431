//! HTTP capabilities injected into the archiver: page fetching and image
//! downloads. Both are traits so the orchestration core can be exercised
//! against in-memory fakes.

use crate::error::Result;
use select::document::Document;
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;

pub(crate) const FAKE_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:79.0) Gecko/20100101 Firefox/79.0";

/// Fetches a URL and parses the response body into a document.
pub trait PageFetcher {
    fn fetch_document(&self, url: &str) -> Result<Document>;
}

/// Downloads a URL to a local file, creating parent directories and
/// overwriting any existing file at that path.
pub trait BinaryDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// ureq-backed implementation of both capabilities.
///
/// One agent per configured proxy; requests rotate over them round-robin.
/// Without proxies a single direct agent is used.
pub struct WebClient {
    agents: Vec<ureq::Agent>,
    next_agent: Cell<usize>,
    headers: Vec<(String, String)>,
}

impl WebClient {
    pub fn new(headers: Vec<(String, String)>, proxies: &[String]) -> Result<Self> {
        let mut agents = Vec::with_capacity(proxies.len().max(1));
        if proxies.is_empty() {
            agents.push(ureq::AgentBuilder::new().user_agent(FAKE_UA).build());
        } else {
            for proxy in proxies {
                agents.push(
                    ureq::AgentBuilder::new()
                        .user_agent(FAKE_UA)
                        .proxy(ureq::Proxy::new(proxy)?)
                        .build(),
                );
            }
        }

        Ok(Self {
            agents,
            next_agent: Cell::new(0),
            headers,
        })
    }

    fn get(&self, url: &str) -> Result<ureq::Response> {
        let idx = self.next_agent.get();
        self.next_agent.set((idx + 1) % self.agents.len());

        let mut req = self.agents[idx].get(url);
        for (name, value) in &self.headers {
            req = req.set(name, value);
        }
        Ok(req.call()?)
    }
}

impl PageFetcher for WebClient {
    fn fetch_document(&self, url: &str) -> Result<Document> {
        log::debug!("GET {}", url);
        let body = self.get(url)?.into_string()?;
        Ok(Document::from(body.as_ref()))
    }
}

impl BinaryDownloader for WebClient {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        log::debug!("GET {} -> {:?}", url, dest);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let resp = self.get(url)?;
        let mut reader = resp.into_reader();
        let mut file = fs::File::create(dest)?;
        io::copy(&mut reader, &mut file)?;
        Ok(())
    }
}

/// Parses a `Name: value` header override as given on the command line.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let mut it = raw.splitn(2, ':');
    let name = it.next().unwrap_or("").trim();
    let value = it.next().ok_or("Header must look like `Name: value`")?.trim();
    if name.is_empty() {
        Err("Header name must not be empty")?;
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_overrides() {
        assert_eq!(
            parse_header("Accept: text/html").unwrap(),
            ("Accept".to_string(), "text/html".to_string())
        );
        // Values may themselves contain colons.
        assert_eq!(
            parse_header("Referer: http://example.com/a").unwrap().1,
            "http://example.com/a"
        );
        assert!(parse_header("no-colon-here").is_err());
        assert!(parse_header(": empty-name").is_err());
    }
}
