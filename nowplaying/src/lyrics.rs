use std::collections::HashMap;

use crate::models::TrackId;

/// Decode HTML entities left over from scraping and trim surrounding whitespace.
pub fn clean_lyrics(raw: &str) -> String {
    html_escape::decode_html_entities(raw).trim().to_string()
}

/// Lyrics already fetched this session, keyed by track identity.
///
/// Only successful lookups are stored; misses are retried the next time the
/// track comes around.
#[derive(Debug, Default)]
pub struct LyricsCache {
    entries: HashMap<TrackId, String>,
}

impl LyricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &TrackId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn insert(&mut self, id: TrackId, lyrics: String) {
        self.entries.insert(id, lyrics);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lyrics() {
        assert_eq!(clean_lyrics("\n  I&#39;m here &amp; there \n"), "I'm here & there");
        assert_eq!(clean_lyrics("   "), "");
    }

    #[test]
    fn test_cache_by_identity() {
        let mut cache = LyricsCache::new();
        assert!(cache.is_empty());

        cache.insert(TrackId::new("Song", "Band"), "words".to_string());

        assert_eq!(cache.get(&TrackId::new("Song", "Band")), Some("words"));
        assert_eq!(cache.get(&TrackId::new("Song", "Other Band")), None);
        assert_eq!(cache.len(), 1);
    }
}
