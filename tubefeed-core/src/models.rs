use serde::Deserialize;

/// Generic paged response shape shared by the listing, detail and
/// search calls.
///
/// `items` being absent is distinct from `items` being empty: absent
/// means the response shape was unusable, empty is a valid terminal
/// page. `next_page_token` absence means no further pages exist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub etag: String,
    pub items: Option<Vec<CatalogItem>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl Envelope {
    /// A well-formed envelope with zero items, used when a batched call
    /// has nothing to ask for.
    pub fn empty() -> Self {
        Self {
            kind: String::new(),
            etag: String::new(),
            items: Some(Vec::new()),
            next_page_token: None,
            page_info: None,
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        self.items.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub results_per_page: u64,
}

/// One entry of an envelope. The three shapes are tried in order:
/// a detail item carries statistics and is the most constrained, a
/// playlist entry has a plain string id, a search hit nests its id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CatalogItem {
    Detail(VideoDetail),
    Playlist(PlaylistEntry),
    Search(SearchHit),
}

impl CatalogItem {
    /// The underlying content id, wherever this shape keeps it.
    /// Empty ids count as missing.
    pub fn content_id(&self) -> Option<&str> {
        let id = match self {
            CatalogItem::Detail(detail) => Some(detail.id.as_str()),
            CatalogItem::Playlist(entry) => entry
                .snippet
                .resource_id
                .as_ref()
                .and_then(|resource| resource.video_id.as_deref()),
            CatalogItem::Search(hit) => hit.id.video_id.as_deref(),
        };
        id.filter(|id| !id.is_empty())
    }

    pub fn snippet(&self) -> Option<&Snippet> {
        match self {
            CatalogItem::Detail(_) => None,
            CatalogItem::Playlist(entry) => Some(&entry.snippet),
            CatalogItem::Search(hit) => Some(&hit.snippet),
        }
    }

    pub fn as_detail(&self) -> Option<&VideoDetail> {
        match self {
            CatalogItem::Detail(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Statistics/content-details item from the batched detail call.
/// Its id is the content id itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub id: String,
    pub content_details: ContentDetails,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub caption: String,
}

/// Counters arrive as decimal strings and are kept that way; nothing in
/// this crate does arithmetic on them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub view_count: String,
    #[serde(default)]
    pub like_count: String,
}

/// Playlist-style listing item. The top-level id is a composite
/// playlist-entry id, not the content id; the real one is nested in the
/// snippet's resource id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub id: String,
    pub snippet: Snippet,
}

/// Search-result item: structurally a listing item whose id is itself
/// the nested content-id wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: ResourceId,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: ThumbnailSet,
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThumbnailSet {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
    #[serde(default)]
    pub standard: Option<Thumbnail>,
    #[serde(default)]
    pub maxres: Option<Thumbnail>,
}

impl ThumbnailSet {
    /// Highest available resolution wins; the empty string stands in
    /// when no variant is present so consumers never see an optional.
    pub fn best_url(&self) -> &str {
        [
            &self.maxres,
            &self.high,
            &self.standard,
            &self.medium,
            &self.default,
        ]
        .into_iter()
        .flatten()
        .map(|thumb| thumb.url.as_str())
        .next()
        .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}
