//! Mapping raw source items into canonical records

use crate::error::{Error, Result};
use crate::model::{CanonicalRecord, SourceKind};
use crate::sources::RawItem;

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Normalize one raw item from `source`.
///
/// Fails with `MalformedRecord` naming the first field that is missing or
/// not a string. Empty strings are kept as they are.
pub fn normalize(source: SourceKind, raw: &RawItem) -> Result<CanonicalRecord> {
    let record = match source {
        SourceKind::NewYorkTimes => CanonicalRecord {
            source,
            headline: field(source, raw, "headline.main")?,
            url: field(source, raw, "web_url")?,
            published_date: field(source, raw, "pub_date")?,
        },
        SourceKind::WallStreetJournal | SourceKind::BbcNews => CanonicalRecord {
            source,
            headline: field(source, raw, "title")?,
            url: field(source, raw, "url")?,
            published_date: field(source, raw, "publishedAt")?,
        },
        SourceKind::YouTube => {
            let video_id = field(source, raw, "id.videoId")?;
            CanonicalRecord {
                source,
                headline: field(source, raw, "snippet.title")?,
                url: format!("{}{}", YOUTUBE_WATCH_URL, video_id),
                published_date: field(source, raw, "snippet.publishedAt")?,
            }
        }
    };

    Ok(record)
}

/// Look up a dotted path and require a string value (possibly empty)
fn field(source: SourceKind, raw: &RawItem, path: &str) -> Result<String> {
    let pointer = format!("/{}", path.replace('.', "/"));
    raw.pointer(&pointer)
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::malformed(source, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_nyt() {
        let raw = json!({
            "headline": {"main": "Leaders Meet", "kicker": null},
            "web_url": "https://www.nytimes.com/2018/11/30/world/g20.html",
            "pub_date": "2018-11-30T15:02:11+0000"
        });
        let record = normalize(SourceKind::NewYorkTimes, &raw).unwrap();
        assert_eq!(record.headline, "Leaders Meet");
        assert_eq!(record.url, "https://www.nytimes.com/2018/11/30/world/g20.html");
        assert_eq!(record.published_date, "2018-11-30T15:02:11+0000");
        assert_eq!(record.source, SourceKind::NewYorkTimes);
    }

    #[test]
    fn test_normalize_newsapi_outlets() {
        let raw = json!({
            "source": {"id": "bbc-news", "name": "BBC News"},
            "title": "Summit ends",
            "url": "https://www.bbc.co.uk/news/world-1",
            "publishedAt": "2018-12-01T09:00:00Z"
        });
        let bbc = normalize(SourceKind::BbcNews, &raw).unwrap();
        assert_eq!(bbc.headline, "Summit ends");
        assert_eq!(bbc.source, SourceKind::BbcNews);

        let wsj = normalize(SourceKind::WallStreetJournal, &raw).unwrap();
        assert_eq!(wsj.source, SourceKind::WallStreetJournal);
        assert_eq!(wsj.url, bbc.url);
    }

    #[test]
    fn test_normalize_youtube_builds_watch_url() {
        let raw = json!({
            "id": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"},
            "snippet": {"title": "Press conference", "publishedAt": "2018-11-27T18:30:00Z"}
        });
        let record = normalize(SourceKind::YouTube, &raw).unwrap();
        assert_eq!(record.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(record.published_date, "2018-11-27T18:30:00Z");
    }

    #[test]
    fn test_missing_field_names_source_and_path() {
        let raw = json!({"snippet": {"title": "No id"}, "id": {"kind": "youtube#channel"}});
        match normalize(SourceKind::YouTube, &raw).unwrap_err() {
            Error::MalformedRecord { provider, field } => {
                assert_eq!(provider, SourceKind::YouTube);
                assert_eq!(field, "id.videoId");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let raw = json!({"headline": {"main": 42}, "web_url": "u", "pub_date": "d"});
        let err = normalize(SourceKind::NewYorkTimes, &raw).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref field, .. } if field == "headline.main"));
    }

    #[test]
    fn test_url_is_kept_verbatim() {
        let raw = json!({"title": "t", "url": "https://example.com/a/?x=1", "publishedAt": "p"});
        let record = normalize(SourceKind::BbcNews, &raw).unwrap();
        assert_eq!(record.url, "https://example.com/a/?x=1");
    }

    #[test]
    fn test_empty_fields_are_kept() {
        let raw = json!({"title": "", "url": "https://example.com/b", "publishedAt": " "});
        let record = normalize(SourceKind::WallStreetJournal, &raw).unwrap();
        assert_eq!(record.headline, "");
        assert_eq!(record.published_date, " ");

        let null_title = json!({"title": null, "url": "u", "publishedAt": "p"});
        assert!(normalize(SourceKind::WallStreetJournal, &null_title).is_err());
    }
}
