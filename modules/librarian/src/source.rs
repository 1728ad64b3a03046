//! Turning a URL into readable text.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use librarian_common::Outcome;

use crate::traits::PageFetcher;

/// Text pulled out of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Contents of `<title>`, if the page has a non-empty one.
    pub title: Option<String>,
    /// Every `<p>` element's text, in document order, joined by single spaces.
    pub text: String,
}

/// Fetch `url` and extract its paragraph text.
///
/// Network and HTTP errors become `Failed`; a page without any paragraph
/// text is `Empty`.
pub async fn read_url(fetcher: &dyn PageFetcher, url: &str) -> Outcome<FetchedPage> {
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(url, error = %e, "Fetch failed");
            return Outcome::failed(format!("fetch failed: {e:#}"));
        }
    };

    let page = extract_page(&html);
    if page.text.is_empty() {
        debug!(url, "No paragraph text");
        return Outcome::empty("page has no paragraph text");
    }
    Outcome::Success(page)
}

/// Extract the title and paragraph text from raw HTML.
pub fn extract_page(html: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    });

    let mut paragraphs = Vec::new();
    if let Ok(sel) = Selector::parse("p") {
        for el in document.select(&sel) {
            let text = collapse_whitespace(&el.text().collect::<String>());
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }

    FetchedPage {
        title,
        text: paragraphs.join(" "),
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
