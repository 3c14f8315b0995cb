// Google Custom Search, image mode.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ServicesClient, endpoint};
use crate::error::{Error, Service};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    link: String,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    image: Option<SearchImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchImage {
    #[serde(default)]
    thumbnail_link: Option<String>,
    #[serde(default)]
    context_link: Option<String>,
}

/// One image hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResult {
    pub url: String,
    pub mime: String,
    pub thumbnail: String,
    /// Page the image appears on (falls back to the image URL).
    pub context: String,
    pub title: String,
}

impl From<SearchItem> for ImageResult {
    fn from(item: SearchItem) -> Self {
        let (thumbnail, context) = match item.image {
            Some(img) => (img.thumbnail_link, img.context_link),
            None => (None, None),
        };
        Self {
            context: context.unwrap_or_else(|| item.link.clone()),
            url: item.link,
            mime: item.mime.unwrap_or_default(),
            thumbnail: thumbnail.unwrap_or_default(),
            title: item.title.unwrap_or_default(),
        }
    }
}

/// Requested result count, clamped to the API's 1..=10 range.
pub fn clamp_count(num: u32) -> u32 {
    num.clamp(1, 10)
}

impl ServicesClient {
    /// Image search with SafeSearch on. `num` is clamped to 1..=10.
    pub async fn search_images(
        &self,
        api_key: &SecretString,
        cx: &str,
        query: &str,
        num: u32,
    ) -> Result<Vec<ImageResult>, Error> {
        let url = endpoint(&self.endpoints().custom_search, "")?;
        let builder = self.http().get(url).query(&[
            ("key", api_key.expose_secret()),
            ("cx", cx),
            ("q", query),
            ("searchType", "image"),
            ("num", &clamp_count(num).to_string()),
            ("safe", "active"),
        ]);
        let resp: SearchResponse = self.send_json(Service::ImageSearch, builder).await?;
        Ok(resp.items.into_iter().map(ImageResult::from).collect())
    }
}
