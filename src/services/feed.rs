// src/services/feed.rs

//! Feed client.
//!
//! Reads the publisher's XML feed and turns it into [`FeedArticle`]s. The
//! expected shape is:
//!
//! ```xml
//! <News>
//!   <Article ID="1234">
//!     <Heading>Title</Heading>
//!     <Contents>&lt;p&gt;Body&lt;/p&gt;</Contents>
//!     <Extract>Summary</Extract>
//!     <Categories><Category ID="5"/></Categories>
//!   </Article>
//! </News>
//! ```
//!
//! The root element name is not checked. Only `Article` elements directly
//! under the root are read, and only the first category reference of an
//! article is used.

use async_trait::async_trait;
use quick_xml::{DeError, Reader};
use quick_xml::errors::IllFormedError;
use quick_xml::events::Event;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{FeedArticle, FeedBatch, FeedConfig, MalformedArticle};
use crate::utils::http::{create_client, is_remote};
use crate::utils::local_path;

/// Anything the engine can pull articles from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable location used in logs and errors.
    fn location(&self) -> &str;

    /// Retrieve and parse the feed.
    ///
    /// Fails with [`AppError::Fetch`] when the payload cannot be obtained or
    /// is not a well-formed feed document.
    async fn fetch(&self) -> Result<FeedBatch>;
}

/// Client for the configured feed location.
pub struct FeedClient {
    client: Client,
    location: String,
}

impl FeedClient {
    /// Create a feed client with the given configuration.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            location: config.url.trim().to_string(),
        })
    }

    async fn fetch_text(&self) -> Result<String> {
        if is_remote(&self.location) {
            let response = self
                .client
                .get(&self.location)
                .send()
                .await?
                .error_for_status()?;
            Ok(response.text().await?)
        } else {
            let path = local_path(&self.location)?;
            Ok(tokio::fs::read_to_string(path).await?)
        }
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    fn location(&self) -> &str {
        &self.location
    }

    async fn fetch(&self) -> Result<FeedBatch> {
        let text = self
            .fetch_text()
            .await
            .map_err(|e| AppError::fetch(&self.location, e))?;
        let batch = parse_feed(&text).map_err(|e| AppError::fetch(&self.location, e))?;

        log::info!(
            "Fetched {} article(s) from {} ({} malformed)",
            batch.articles.len(),
            self.location,
            batch.malformed.len()
        );
        Ok(batch)
    }
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(rename = "@ID", alias = "@id", default)]
    id: Option<String>,
    #[serde(rename = "Heading", default)]
    heading: Option<String>,
    #[serde(rename = "Contents", default)]
    contents: Option<String>,
    #[serde(rename = "Extract", alias = "extract", default)]
    extract: Option<String>,
    #[serde(rename = "Categories", default)]
    categories: Option<RawCategories>,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    #[serde(rename = "Category", default)]
    category: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(rename = "@ID", alias = "@id", default)]
    id: Option<String>,
}

impl RawArticle {
    fn into_article(self, position: usize) -> std::result::Result<FeedArticle, MalformedArticle> {
        let external_id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MalformedArticle {
                position,
                reason: "missing ID attribute".to_string(),
            })?;

        let external_category_id = self
            .categories
            .and_then(|c| c.category.into_iter().next())
            .and_then(|c| c.id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(FeedArticle {
            external_id,
            title: self.heading.unwrap_or_default(),
            body: self.contents.unwrap_or_default(),
            excerpt: self.extract.unwrap_or_default(),
            external_category_id,
        })
    }
}

/// Parse a feed document.
///
/// Each `Article` is decoded on its own. One that cannot be decoded (no `ID`,
/// markup inside a text field, a repeated field) is reported in
/// [`FeedBatch::malformed`] and left out. A document that is not well-formed
/// XML is an error.
pub fn parse_feed(xml: &str) -> Result<FeedBatch> {
    let mut batch = FeedBatch::default();
    let mut position = 0;

    for fragment in article_fragments(xml)? {
        let decoded = quick_xml::de::from_str::<RawArticle>(fragment)
            .map_err(|e| MalformedArticle {
                position,
                reason: e.to_string(),
            })
            .and_then(|raw| raw.into_article(position));

        match decoded {
            Ok(article) => batch.articles.push(article),
            Err(malformed) => {
                log::warn!(
                    "Skipping article #{}: {}",
                    malformed.position,
                    malformed.reason
                );
                batch.malformed.push(malformed);
            }
        }
        position += 1;
    }

    Ok(batch)
}

/// Split a feed document into the source text of its top-level `Article`
/// elements, checking the whole document for well-formedness on the way.
fn article_fragments(xml: &str) -> Result<Vec<&str>> {
    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if open.len() == 1 && e.local_name().as_ref() == b"Article" => {
                let end = e.to_end().into_owned();
                reader.read_to_end(end.name())?;
                fragments.push(slice(xml, start, reader.buffer_position() as usize)?);
            }
            Event::Empty(e) if open.len() == 1 && e.local_name().as_ref() == b"Article" => {
                fragments.push(slice(xml, start, reader.buffer_position() as usize)?);
            }
            Event::Start(e) => {
                seen_root = true;
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Event::Empty(_) => seen_root = true,
            Event::End(_) => {
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(name) = open.pop() {
        return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name)).into());
    }
    if !seen_root {
        return Err(DeError::Custom("feed document has no root element".into()).into());
    }
    Ok(fragments)
}

fn slice(xml: &str, start: usize, end: usize) -> Result<&str> {
    xml.get(start..end)
        .ok_or_else(|| DeError::Custom("article boundaries fall inside a character".into()).into())
}
