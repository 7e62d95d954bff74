use tracing::debug;
use tubefeed_core::{CatalogItem, Envelope, VideoDuration};

use crate::store::VideoRecord;

/// Pair every listing item with its detail entry and build candidate
/// records. Both halves are required: a listing item without a
/// resolvable content id, without a matching detail entry, or whose
/// duration fails validity is skipped, never fatal for the page.
/// User-owned fields come out at their defaults; the store decides
/// whether an existing row keeps its own.
pub(crate) fn merge_envelopes(listing: &Envelope, detail: &Envelope) -> Vec<VideoRecord> {
    let details = detail.items();
    let mut records = Vec::new();
    for item in listing.items() {
        let Some(video_id) = item.content_id() else {
            debug!("listing item without content id, skipping");
            continue;
        };
        let Some(snippet) = item.snippet() else {
            debug!(video_id, "listing item without snippet, skipping");
            continue;
        };
        let Some(detail_item) = details
            .iter()
            .filter_map(CatalogItem::as_detail)
            .find(|candidate| candidate.id == video_id)
        else {
            debug!(video_id, "no detail entry for listing item, skipping");
            continue;
        };
        let duration = VideoDuration::parse(&detail_item.content_details.duration);
        if !duration.is_valid() {
            debug!(
                video_id,
                raw = %detail_item.content_details.duration,
                "unusable duration, dropping"
            );
            continue;
        }
        records.push(VideoRecord {
            video_id: video_id.to_string(),
            title: decode_entities(&snippet.title),
            published_at: snippet.published_at.clone(),
            thumbnail_url: snippet.thumbnails.best_url().to_string(),
            view_count: detail_item.statistics.view_count.clone(),
            like_count: detail_item.statistics.like_count.clone(),
            duration: duration.format(),
            favorite: false,
            playback_position: 0.0,
        });
    }
    records
}

/// Titles arrive with their HTML entities still encoded.
pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(value: serde_json::Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    fn listing_with_ids(ids: &[&str]) -> Envelope {
        let items: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": format!("entry-{id}"),
                    "snippet": {
                        "title": format!("Title {id}"),
                        "publishedAt": "2024-01-01T00:00:00Z",
                        "thumbnails": { "high": { "url": "https://img.example/h.jpg" } },
                        "resourceId": { "kind": "youtube#video", "videoId": id }
                    }
                })
            })
            .collect();
        envelope(serde_json::json!({ "items": items }))
    }

    fn detail_with_ids(ids: &[&str]) -> Envelope {
        let items: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "contentDetails": { "duration": "PT4M46S" },
                    "statistics": { "viewCount": "7", "likeCount": "3" }
                })
            })
            .collect();
        envelope(serde_json::json!({ "items": items }))
    }

    #[test]
    fn both_halves_required_per_record() {
        let listing = listing_with_ids(&["a", "b", "c", "d", "e"]);
        let detail = detail_with_ids(&["a", "c", "e"]);

        let records = merge_envelopes(&listing, &detail);

        assert_eq!(records.len(), 3);
        let ids: Vec<&str> = records.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "e"]);
    }

    #[test]
    fn invalid_duration_drops_the_candidate() {
        let listing = listing_with_ids(&["a"]);
        let detail = envelope(serde_json::json!({
            "items": [
                {
                    "id": "a",
                    "contentDetails": { "duration": "garbage" },
                    "statistics": { "viewCount": "7", "likeCount": "3" }
                }
            ]
        }));

        assert!(merge_envelopes(&listing, &detail).is_empty());
    }

    #[test]
    fn candidates_carry_decoded_title_and_formatted_duration() {
        let listing = envelope(serde_json::json!({
            "items": [
                {
                    "id": "entry-a",
                    "snippet": {
                        "title": "Tips &amp; tricks &#39;24",
                        "publishedAt": "2024-02-02T00:00:00Z",
                        "thumbnails": {},
                        "resourceId": { "videoId": "a" }
                    }
                }
            ]
        }));
        let detail = detail_with_ids(&["a"]);

        let records = merge_envelopes(&listing, &detail);

        assert_eq!(records[0].title, "Tips & tricks '24");
        assert_eq!(records[0].duration, "04:46");
        assert_eq!(records[0].thumbnail_url, "");
        assert_eq!(records[0].view_count, "7");
        assert!(!records[0].favorite);
        assert_eq!(records[0].playback_position, 0.0);
    }

    #[test]
    fn search_hits_merge_like_listing_items() {
        let listing = envelope(serde_json::json!({
            "items": [
                {
                    "id": { "kind": "youtube#video", "videoId": "s1" },
                    "snippet": {
                        "title": "Search hit",
                        "publishedAt": "2024-03-03T00:00:00Z",
                        "thumbnails": { "default": { "url": "https://img.example/d.jpg" } }
                    }
                }
            ]
        }));
        let detail = detail_with_ids(&["s1"]);

        let records = merge_envelopes(&listing, &detail);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].video_id, "s1");
        assert_eq!(records[0].thumbnail_url, "https://img.example/d.jpg");
    }
}
