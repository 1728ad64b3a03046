//! Mapping between plain data records and graph rows.
//!
//! Domain types in `librarian_common` carry no persistence logic; every
//! conversion to and from the driver's representation lives here.

use chrono::{DateTime, NaiveDateTime, Utc};
use neo4rs::Row;

use librarian_common::{CategoryNode, KeywordNode, PageNode, SearchHit, SearchLeg};

/// Properties rendered first, in this order, when a node is flattened for
/// the query tool. Anything else follows alphabetically.
const LEADING_PROPERTIES: &[&str] = &["url", "name", "title", "summary", "description"];

/// Property never shown to the model.
pub(crate) const EMBEDDING_PROPERTY: &str = "embedding";

/// Format a DateTime<Utc> for Cypher's `datetime()`, which takes a local
/// datetime string without timezone offset and assumes UTC.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Parse a datetime returned via `toString(datetime)` (RFC 3339 with `Z`),
/// or the naive writer format.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .ok()
}

pub(crate) fn embedding_to_f64(embedding: &[f32]) -> Vec<f64> {
    embedding.iter().map(|&v| v as f64).collect()
}

fn row_datetime(row: &Row, key: &str) -> DateTime<Utc> {
    row.get::<String>(key)
        .ok()
        .and_then(|s| parse_datetime(&s))
        .unwrap_or_else(Utc::now)
}

/// Expects columns `url, title, summary, created_at, last_updated`.
pub fn page_from_row(row: &Row) -> Option<PageNode> {
    let url: String = row.get("url").ok()?;
    Some(PageNode {
        url,
        title: row.get("title").unwrap_or_default(),
        summary: row.get("summary").unwrap_or_default(),
        created_at: row_datetime(row, "created_at"),
        last_updated: row_datetime(row, "last_updated"),
    })
}

/// Expects columns `key, name, description, created_at, last_updated`.
pub fn category_from_row(row: &Row) -> Option<CategoryNode> {
    let key: String = row.get("key").ok()?;
    Some(CategoryNode {
        name: row.get("name").unwrap_or_else(|_| key.clone()),
        key,
        description: row.get("description").unwrap_or_default(),
        created_at: row_datetime(row, "created_at"),
        last_updated: row_datetime(row, "last_updated"),
    })
}

/// Expects columns `key, name, created_at, last_updated`.
pub fn keyword_from_row(row: &Row) -> Option<KeywordNode> {
    let key: String = row.get("key").ok()?;
    Some(KeywordNode {
        name: row.get("name").unwrap_or_else(|_| key.clone()),
        key,
        created_at: row_datetime(row, "created_at"),
        last_updated: row_datetime(row, "last_updated"),
    })
}

/// Expects columns `labels` (list of strings), `pairs` (list of
/// `[property, value]` string pairs) and, for vector hits, `score`.
pub fn hit_from_row(row: &Row, leg: SearchLeg) -> Option<SearchHit> {
    let labels: Vec<String> = row.get("labels").unwrap_or_default();
    let pairs: Vec<Vec<String>> = row.get("pairs").ok()?;
    let properties = order_properties(
        pairs
            .into_iter()
            .filter_map(|pair| {
                let mut it = pair.into_iter();
                Some((it.next()?, it.next()?))
            })
            .filter(|(k, _)| k != EMBEDDING_PROPERTY)
            .collect(),
    );
    let score = match leg {
        SearchLeg::Vector => row.get::<f64>("score").ok(),
        SearchLeg::TextMatch => None,
    };
    Some(SearchHit {
        leg,
        labels,
        properties,
        score,
    })
}

/// Stable property order: well-known properties first, the rest by name.
pub fn order_properties(mut pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let rank = |k: &str| {
        LEADING_PROPERTIES
            .iter()
            .position(|p| *p == k)
            .unwrap_or(LEADING_PROPERTIES.len())
    };
    pairs.sort_by(|(a, _), (b, _)| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
    pairs
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn datetime_round_trips_through_writer_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(parse_datetime(&format_datetime(&dt)), Some(dt));
    }

    #[test]
    fn parses_neo4j_to_string_output() {
        let parsed = parse_datetime("2024-03-05T10:30:00.123456Z").unwrap();
        assert_eq!(parsed.timestamp(), 1709634600);
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn well_known_properties_lead() {
        let ordered = order_properties(vec![
            ("last_updated".into(), "t".into()),
            ("summary".into(), "s".into()),
            ("created_at".into(), "t".into()),
            ("url".into(), "u".into()),
        ]);
        let keys: Vec<&str> = ordered.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["url", "summary", "created_at", "last_updated"]);
    }
}
