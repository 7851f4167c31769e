use serde_json::Value;

use crate::error::{FetchError, FetchResult};

/// Metadata document printed by the downloader after it finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    info: Value,
}

impl ExtractionResult {
    pub fn new(info: Value) -> Self {
        Self { info }
    }

    pub fn from_json(bytes: &[u8]) -> FetchResult<Self> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn info(&self) -> &Value {
        &self.info
    }

    /// Playlist when the basename says so or the downloader counted entries.
    pub fn is_playlist(&self) -> bool {
        let has_playlist_basename =
            self.info.get("webpage_url_basename").and_then(Value::as_str) == Some("playlist");
        let has_playlist_count = self
            .info
            .get("playlist_count")
            .and_then(Value::as_f64)
            .is_some_and(|count| count > 0.0);
        has_playlist_basename || has_playlist_count
    }

    pub fn title(&self) -> FetchResult<&str> {
        self.info
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::MalformedResult("single item has no 'title' field".into()))
    }

    pub fn entry_titles(&self) -> FetchResult<Vec<&str>> {
        let entries = self
            .info
            .get("entries")
            .ok_or_else(|| FetchError::MalformedPlaylist(self.info.to_string()))?;
        let entries = entries
            .as_array()
            .ok_or_else(|| FetchError::MalformedResult("'entries' is not a list".into()))?;

        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry.get("title").and_then(Value::as_str).ok_or_else(|| {
                    FetchError::MalformedResult(format!("playlist entry {} has no 'title'", i))
                })
            })
            .collect()
    }

    /// Titles to resolve on disk, in result order.
    pub fn titles(&self) -> FetchResult<Vec<&str>> {
        if self.is_playlist() {
            self.entry_titles()
        } else {
            Ok(vec![self.title()?])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basename_alone_marks_playlist() {
        let res = ExtractionResult::new(json!({
            "webpage_url_basename": "playlist",
            "entries": [{"title": "a"}, {"title": "b"}],
        }));
        assert!(res.is_playlist());
        assert_eq!(res.titles().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_count_marks_playlist() {
        let res = ExtractionResult::new(json!({
            "webpage_url_basename": "videos",
            "playlist_count": 2,
            "entries": [{"title": "a"}, {"title": "b"}],
        }));
        assert!(res.is_playlist());
    }

    #[test]
    fn test_zero_count_is_single() {
        let res = ExtractionResult::new(json!({
            "webpage_url_basename": "watch",
            "playlist_count": 0,
            "title": "Song",
        }));
        assert!(!res.is_playlist());
        assert_eq!(res.titles().unwrap(), vec!["Song"]);
    }

    #[test]
    fn test_playlist_without_entries() {
        let res = ExtractionResult::new(json!({"webpage_url_basename": "playlist"}));
        let err = res.titles().unwrap_err();
        assert!(matches!(err, FetchError::MalformedPlaylist(_)));
        assert!(err.to_string().contains("webpage_url_basename"));
    }

    #[test]
    fn test_unclassified_entries_fail_as_single() {
        let res = ExtractionResult::new(json!({"entries": [{"title": "a"}]}));
        assert!(!res.is_playlist());
        assert!(matches!(res.titles(), Err(FetchError::MalformedResult(_))));
    }

    #[test]
    fn test_empty_result_is_lookup_error() {
        let res = ExtractionResult::new(json!({}));
        assert!(!res.is_playlist());
        let err = res.titles().unwrap_err();
        assert!(matches!(err, FetchError::MalformedResult(_)));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_entry_without_title() {
        let res = ExtractionResult::new(json!({
            "playlist_count": 1,
            "entries": [{"id": "x"}],
        }));
        assert!(matches!(res.titles(), Err(FetchError::MalformedResult(_))));
    }

    #[test]
    fn test_from_json() {
        let res = ExtractionResult::from_json(br#"{"title": "t"}"#).unwrap();
        assert_eq!(res.title().unwrap(), "t");
        assert!(ExtractionResult::from_json(b"not json").is_err());
    }
}
