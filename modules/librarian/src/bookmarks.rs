//! Bookmark list parsing: browser HTML exports, plain URL lists, Markdown
//! link lists and a small JSON format.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

use librarian_common::{Bookmark, LibrarianError, Outcome};

use crate::source::collapse_whitespace;

static RE_MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(\s*(https?://(?:[^()\s]|\([^()\s]*\))+)(?:\s+"[^"]*")?\s*\)"#)
        .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkFormat {
    Html,
    Text,
    Markdown,
    Json,
}

impl BookmarkFormat {
    /// Map an upload's declared MIME type. Parameters such as `charset` are
    /// ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "text/plain" => Some(Self::Text),
            "text/markdown" | "text/x-markdown" => Some(Self::Markdown),
            "application/json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Guess from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(Self::Html),
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for BookmarkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkFormat::Html => write!(f, "html"),
            BookmarkFormat::Text => write!(f, "text"),
            BookmarkFormat::Markdown => write!(f, "markdown"),
            BookmarkFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for BookmarkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown bookmark format: {other}")),
        }
    }
}

/// Parse an uploaded bookmark list.
///
/// Only malformed JSON is `Failed`; the other formats are best-effort and
/// yield `Empty` when nothing usable was found.
pub fn read_bookmarks(bytes: &[u8], format: BookmarkFormat) -> Outcome<Vec<Bookmark>> {
    let content = String::from_utf8_lossy(bytes);

    let bookmarks = match format {
        BookmarkFormat::Html => parse_html(&content),
        BookmarkFormat::Text => parse_text(&content),
        BookmarkFormat::Markdown => parse_markdown(&content),
        BookmarkFormat::Json => match parse_json(&content) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Malformed JSON bookmark file");
                return Outcome::failed(format!("invalid JSON bookmark file: {e}"));
            }
        },
    };

    debug!(%format, count = bookmarks.len(), "Parsed bookmarks");
    if bookmarks.is_empty() {
        return Outcome::empty(format!("no bookmarks found in {format} input"));
    }
    Outcome::Success(bookmarks)
}

/// One bookmark per `<a>` with a non-empty `href`. Anchors without text
/// are titled with their URL.
pub fn parse_html(html: &str) -> Vec<Bookmark> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let text = collapse_whitespace(&el.text().collect::<String>());
            let title = if text.is_empty() { href.to_string() } else { text };
            Some(Bookmark::new(href, title))
        })
        .collect()
}

/// One http(s) URL per line. Blank lines and `#` comments are skipped.
pub fn parse_text(text: &str) -> Vec<Bookmark> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| is_http_url(line))
        .map(|line| Bookmark::new(line, line))
        .collect()
}

/// `[title](url)` links with an http(s) target. Image links are skipped.
pub fn parse_markdown(markdown: &str) -> Vec<Bookmark> {
    RE_MARKDOWN_LINK
        .captures_iter(markdown)
        .filter(|caps| &caps[1] != "!")
        .map(|caps| {
            let url = caps[3].to_string();
            let title = collapse_whitespace(&caps[2]);
            let title = if title.is_empty() { url.clone() } else { title };
            Bookmark::new(url, title)
        })
        .collect()
}

#[derive(Deserialize)]
struct JsonBookmarkFile {
    bookmarks: Vec<serde_json::Value>,
}

/// `{"bookmarks": [{"url": "...", "title": "..."}]}`. Entries that are not
/// objects or lack a non-empty string `url` are skipped; a missing title
/// falls back to the URL. Only invalid JSON or a missing `bookmarks` array
/// is an error.
pub fn parse_json(json: &str) -> Result<Vec<Bookmark>, LibrarianError> {
    let file: JsonBookmarkFile =
        serde_json::from_str(json).map_err(|e| LibrarianError::Parse(e.to_string()))?;

    let total = file.bookmarks.len();
    let bookmarks: Vec<Bookmark> = file.bookmarks.iter().filter_map(json_entry).collect();
    if bookmarks.len() < total {
        debug!(skipped = total - bookmarks.len(), "Skipped malformed JSON bookmark entries");
    }
    Ok(bookmarks)
}

fn json_entry(entry: &serde_json::Value) -> Option<Bookmark> {
    let url = entry.get("url")?.as_str()?.trim();
    if url.is_empty() {
        return None;
    }
    let title = entry
        .get("title")
        .and_then(|t| t.as_str())
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string());
    Some(Bookmark::new(url, title))
}

fn is_http_url(s: &str) -> bool {
    url::Url::parse(s)
        .map(|u| u.scheme() == "http" || u.scheme() == "https")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_yields_one_pair_per_anchor_with_href() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
            <DL><p>
              <DT><A HREF="https://example.com/a" ADD_DATE="1">Cats</A>
              <DT><A HREF="https://example.com/b"></A>
              <DT><A NAME="anchor">No href</A>
              <DT><A HREF="">Empty href</A>
              <DT><A HREF="https://example.com/c">  Dogs
                 and wolves </A>
            </DL>"#;

        let bookmarks = parse_html(html);
        assert_eq!(
            bookmarks,
            vec![
                Bookmark::new("https://example.com/a", "Cats"),
                Bookmark::new("https://example.com/b", "https://example.com/b"),
                Bookmark::new("https://example.com/c", "Dogs and wolves"),
            ]
        );
    }

    #[test]
    fn text_keeps_only_http_lines() {
        let text = "# reading list\n\nhttps://example.com/a\nftp://example.com/f\n  http://example.com/b  \nnot a url\n";
        let bookmarks = parse_text(text);
        assert_eq!(
            bookmarks,
            vec![
                Bookmark::new("https://example.com/a", "https://example.com/a"),
                Bookmark::new("http://example.com/b", "http://example.com/b"),
            ]
        );
    }

    #[test]
    fn markdown_links_skip_images() {
        let md = "- [Cats](https://example.com/a)\n- ![logo](https://example.com/logo.png)\n- [](https://example.com/b \"tip\")\n- [local](./notes.md)";
        let bookmarks = parse_markdown(md);
        assert_eq!(
            bookmarks,
            vec![
                Bookmark::new("https://example.com/a", "Cats"),
                Bookmark::new("https://example.com/b", "https://example.com/b"),
            ]
        );
    }

    #[test]
    fn markdown_urls_keep_balanced_parentheses() {
        let md = "See [Rust](https://en.wikipedia.org/wiki/Rust_(programming_language)) and \
                  [Cats](https://example.com/a).";
        let bookmarks = parse_markdown(md);
        assert_eq!(
            bookmarks,
            vec![
                Bookmark::new(
                    "https://en.wikipedia.org/wiki/Rust_(programming_language)",
                    "Rust"
                ),
                Bookmark::new("https://example.com/a", "Cats"),
            ]
        );
    }

    #[test]
    fn json_bookmarks_parse() {
        let json = r#"{"bookmarks": [
            {"url": "https://example.com/a", "title": "Cats"},
            {"url": "https://example.com/b"},
            {"url": "  "}
        ]}"#;
        let bookmarks = parse_json(json).unwrap();
        assert_eq!(
            bookmarks,
            vec![
                Bookmark::new("https://example.com/a", "Cats"),
                Bookmark::new("https://example.com/b", "https://example.com/b"),
            ]
        );
    }

    #[test]
    fn json_entries_without_a_string_url_are_skipped() {
        let json = br#"{"bookmarks": [
            {"url": "https://example.com/a", "title": "Cats"},
            {"title": "no url here"},
            {"url": null},
            {"url": 42},
            "https://example.com/not-an-object"
        ]}"#;
        let outcome = read_bookmarks(json, BookmarkFormat::Json);
        assert_eq!(
            outcome.success(),
            Some(vec![Bookmark::new("https://example.com/a", "Cats")])
        );
    }

    #[test]
    fn json_without_bookmarks_array_is_failed() {
        let outcome = read_bookmarks(br#"{"links": []}"#, BookmarkFormat::Json);
        assert!(matches!(outcome, Outcome::Failed(_)));
    }

    #[test]
    fn malformed_json_is_failed() {
        let outcome = read_bookmarks(b"{\"bookmarks\": [", BookmarkFormat::Json);
        assert!(matches!(outcome, Outcome::Failed(_)));
    }

    #[test]
    fn nothing_found_is_empty() {
        let outcome = read_bookmarks(b"# just a comment\n", BookmarkFormat::Text);
        assert!(matches!(outcome, Outcome::Empty(_)));
    }

    #[test]
    fn formats_from_mime_and_path() {
        assert_eq!(
            BookmarkFormat::from_mime("text/html; charset=utf-8"),
            Some(BookmarkFormat::Html)
        );
        assert_eq!(BookmarkFormat::from_mime("application/json"), Some(BookmarkFormat::Json));
        assert_eq!(BookmarkFormat::from_mime("image/png"), None);
        assert_eq!(
            BookmarkFormat::from_path(Path::new("export/bookmarks.MD")),
            Some(BookmarkFormat::Markdown)
        );
        assert_eq!(BookmarkFormat::from_path(Path::new("list")), None);
        assert_eq!("txt".parse::<BookmarkFormat>(), Ok(BookmarkFormat::Text));
    }
}
