//! Sitemap retrieval and parsing.
//!
//! Only the flat `urlset` form is understood:
//!
//! ```xml
//! <urlset>
//!   <url><loc>https://example.com/</loc></url>
//! </urlset>
//! ```
//!
//! Any other document shape is rejected with a [`ParseError`].

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;
use tracing::debug;

use crate::site::Site;

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to build sitemap client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch sitemap: {0}")]
    Fetch(#[source] reqwest::Error),
    #[error("sitemap request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid sitemap: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {source}")]
    Xml { position: u64, source: quick_xml::Error },
    #[error("expected a single <urlset> root element, found <{0}>")]
    UnexpectedRoot(String),
    #[error("document has no root element")]
    MissingRoot,
    #[error("document ended before all elements were closed")]
    Truncated,
    #[error("<url> entry {0} has no <loc> element")]
    MissingLoc(usize),
    #[error("<url> entry {0} has an empty <loc> element")]
    EmptyLoc(usize),
    #[error("<url> entry {0} has more than one <loc> element")]
    DuplicateLoc(usize),
}

/// Fetches the configured sitemap and turns it into unprobed sites
#[derive(Debug, Clone)]
pub struct SitemapFetcher {
    client: reqwest::Client,
    url: String,
}

impl SitemapFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SitemapError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(SitemapError::Client)?;

        Ok(Self { client, url: url.into() })
    }

    /// Location of the sitemap this fetcher reads
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download and parse the sitemap
    ///
    /// Every returned site is marked down; probing is a separate step.
    pub async fn fetch(&self) -> Result<Vec<Site>, SitemapError> {
        let response = self.client.get(&self.url).send().await.map_err(SitemapError::Fetch)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitemapError::Status { url: self.url.clone(), status: status.as_u16() });
        }

        let body = response.text().await.map_err(SitemapError::Fetch)?;
        let sites = parse_sitemap(&body)?;

        debug!(url = %self.url, count = sites.len(), "Fetched sitemap");
        Ok(sites)
    }
}

/// Parse a `urlset` document into sites, keeping document order
pub fn parse_sitemap(xml: &str) -> Result<Vec<Site>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut sites = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut in_url = false;
    let mut in_loc = false;
    let mut loc: Option<String> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|source| ParseError::Xml {
            position: reader.buffer_position() as u64,
            source,
        })?;

        match event {
            Event::Start(ref element) | Event::Empty(ref element) => {
                let is_empty = matches!(event, Event::Empty(_));
                depth += 1;

                match depth {
                    1 => {
                        if seen_root || element.local_name().as_ref() != b"urlset" {
                            let qname = element.name();
                            let name = String::from_utf8_lossy(qname.as_ref());
                            return Err(ParseError::UnexpectedRoot(name.into_owned()));
                        }
                        seen_root = true;
                    }
                    2 if element.local_name().as_ref() == b"url" => {
                        in_url = true;
                        loc = None;
                    }
                    3 if in_url && element.local_name().as_ref() == b"loc" => {
                        if loc.is_some() {
                            return Err(ParseError::DuplicateLoc(sites.len()));
                        }
                        in_loc = true;
                        text.clear();
                    }
                    _ => {}
                }

                if is_empty {
                    close_element(depth, &mut in_url, &mut in_loc, &mut loc, &text, &mut sites)?;
                    depth -= 1;
                }
            }
            Event::End(_) => {
                close_element(depth, &mut in_url, &mut in_loc, &mut loc, &text, &mut sites)?;
                depth = depth.saturating_sub(1);
            }
            Event::Text(content) if in_loc => {
                let unescaped = content.unescape().map_err(|source| ParseError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                text.push_str(&unescaped);
            }
            Event::CData(content) if in_loc => {
                text.push_str(&String::from_utf8_lossy(&content));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::Truncated);
    }
    if !seen_root {
        return Err(ParseError::MissingRoot);
    }

    Ok(sites)
}

/// Finish the element at `depth`, emitting a site when a `<url>` closes
fn close_element(
    depth: usize,
    in_url: &mut bool,
    in_loc: &mut bool,
    loc: &mut Option<String>,
    text: &str,
    sites: &mut Vec<Site>,
) -> Result<(), ParseError> {
    match depth {
        3 if *in_loc => {
            *in_loc = false;
            let url = text.trim();
            if url.is_empty() {
                return Err(ParseError::EmptyLoc(sites.len()));
            }
            *loc = Some(url.to_owned());
        }
        2 if *in_url => {
            *in_url = false;
            let url = loc.take().ok_or(ParseError::MissingLoc(sites.len()))?;
            sites.push(Site::new(url));
        }
        _ => {}
    }

    Ok(())
}
