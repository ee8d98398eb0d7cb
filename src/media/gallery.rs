//! Gallery post expansion.

use serde_json::{Map, Value};

use crate::media::item::{MediaTarget, MediaTargetSet};

/// Status of a gallery item that has finished processing.
const COMPLETED_STATUS: &str = "completed";

/// Expand a gallery's media metadata into one target per processed item.
///
/// Items are numbered by their 1-based position among all items, so an
/// unprocessed item leaves a gap in the naming (`id_1`, `id_3`).
pub fn expand_gallery(post_id: &str, metadata: &Map<String, Value>) -> MediaTargetSet {
    let mut targets = MediaTargetSet::new();

    for (position, item) in metadata.values().enumerate() {
        let index = position + 1;

        let status = item.get("status").and_then(Value::as_str);
        if status != Some(COMPLETED_STATUS) {
            tracing::debug!("Skipping unprocessed gallery item {}_{}", post_id, index);
            continue;
        }

        let Some(url) = item_source_url(item) else {
            tracing::debug!("Gallery item {}_{} has no source url", post_id, index);
            continue;
        };

        targets.insert(MediaTarget::new(
            format!("{}_{}", post_id, index),
            normalize_url(url),
        ));
    }

    targets
}

/// Source url of a gallery item: the still image, or the gif rendition for
/// animated items.
fn item_source_url(item: &Value) -> Option<&str> {
    let source = item.get("s")?;
    source
        .get("u")
        .and_then(Value::as_str)
        .or_else(|| source.get("gif").and_then(Value::as_str))
}

/// Undo the HTML entity encoding the API applies to query separators.
/// Repeated until stable so doubly encoded urls come out clean as well.
pub fn normalize_url(url: &str) -> String {
    let mut url = url.to_string();
    while url.contains("&amp;") {
        url = url.replace("&amp;", "&");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_expand_all_completed() {
        let meta = metadata(json!({
            "x1": {"status": "completed", "s": {"u": "https://preview.redd.it/a.jpg"}},
            "x2": {"status": "completed", "s": {"u": "https://preview.redd.it/b.png"}},
        }));

        let targets = expand_gallery("abc", &meta);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets.get("abc_1"), Some("https://preview.redd.it/a.jpg"));
        assert_eq!(targets.get("abc_2"), Some("https://preview.redd.it/b.png"));
    }

    #[test]
    fn test_skipped_items_keep_their_position() {
        let meta = metadata(json!({
            "x1": {"status": "completed", "s": {"u": "https://preview.redd.it/a.jpg"}},
            "x2": {"status": "failed"},
            "x3": {"status": "completed", "s": {"u": "https://preview.redd.it/c.jpg"}},
            "x4": {"status": "unprocessed", "s": {"u": "https://preview.redd.it/d.jpg"}},
        }));

        let targets = expand_gallery("abc", &meta);
        let names: Vec<&str> = targets.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["abc_1", "abc_3"]);
    }

    #[test]
    fn test_source_order_follows_metadata() {
        let meta = metadata(json!({
            "zz": {"status": "completed", "s": {"u": "https://preview.redd.it/first.jpg"}},
            "aa": {"status": "completed", "s": {"u": "https://preview.redd.it/second.jpg"}},
        }));

        let targets = expand_gallery("p", &meta);
        assert_eq!(targets.get("p_1"), Some("https://preview.redd.it/first.jpg"));
        assert_eq!(targets.get("p_2"), Some("https://preview.redd.it/second.jpg"));
    }

    #[test]
    fn test_animated_item_uses_gif_rendition() {
        let meta = metadata(json!({
            "x1": {"status": "completed", "e": "AnimatedImage", "s": {
                "gif": "https://i.redd.it/anim.gif",
                "mp4": "https://preview.redd.it/anim.gif?format=mp4"
            }},
        }));

        let targets = expand_gallery("g", &meta);
        assert_eq!(targets.get("g_1"), Some("https://i.redd.it/anim.gif"));
    }

    #[test]
    fn test_urls_are_normalized() {
        let meta = metadata(json!({
            "x1": {"status": "completed", "s": {
                "u": "https://preview.redd.it/a.jpg?width=640&amp;format=pjpg&amp;s=abc"
            }},
        }));

        let targets = expand_gallery("n", &meta);
        assert_eq!(
            targets.get("n_1"),
            Some("https://preview.redd.it/a.jpg?width=640&format=pjpg&s=abc")
        );
    }

    #[test]
    fn test_empty_or_malformed_metadata() {
        assert!(expand_gallery("e", &Map::new()).is_empty());

        let meta = metadata(json!({
            "x1": "not an object",
            "x2": {"status": 5},
            "x3": {"status": "completed"},
            "x4": {"status": "completed", "s": {"u": 12}},
        }));
        assert!(expand_gallery("e", &meta).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "https://preview.redd.it/a.jpg?a=1&amp;b=2&amp;amp;c=3";
        let once = normalize_url(raw);
        assert_eq!(once, "https://preview.redd.it/a.jpg?a=1&b=2&c=3");
        assert_eq!(normalize_url(&once), once);

        let clean = "https://i.redd.it/plain.jpg?a=1&b=2";
        assert_eq!(normalize_url(clean), clean);
    }
}
