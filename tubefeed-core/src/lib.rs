mod client;
mod credentials;
mod duration;
mod models;

pub use client::{CatalogClient, CatalogError, CatalogPage};
pub use credentials::{CredentialProvider, RotatingKeys};
pub use duration::VideoDuration;
pub use models::{
    CatalogItem, ContentDetails, Envelope, PageInfo, PlaylistEntry, ResourceId, SearchHit, Snippet,
    Statistics, Thumbnail, ThumbnailSet, VideoDetail,
};
