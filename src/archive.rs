//! Archive listing resolution.
//!
//! The archive page is the single source for comic titles and for the newest
//! comic id. Entries read `Comic <id> : <title>`; the listing is ordered
//! newest-first and ends at comic 1, the oldest one, which doubles as the
//! completeness check: a parse that never reaches it must not be trusted.

use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use regex::Regex;
use select::document::Document;
use select::predicate::Name;
use std::collections::BTreeMap;

pub const BASE_URL: &str = "http://www.questionablecontent.net";
pub const ARCHIVE_URL: &str = "http://www.questionablecontent.net/archive.php";

/// The oldest comic; seeing it means the whole listing was parsed.
const TERMINAL_ID: u32 = 1;

/// Comic 2310 has two archive entries, one with a wrong title.
const COMIC_2310_TITLE: &str = "The Experiment";

/// Resolved id -> title mapping from the archive listing.
#[derive(Debug)]
pub struct ArchiveIndex {
    entries: BTreeMap<u32, String>,
}

impl ArchiveIndex {
    /// Newest comic id present in the listing.
    pub fn latest(&self) -> u32 {
        *self.entries.keys().next_back().unwrap_or(&0)
    }

    pub fn title(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetches and parses the archive listing. Exactly one page is fetched; a
/// fetch failure is fatal to the run and surfaces as `IndexUnavailable`.
pub fn resolve(fetcher: &dyn PageFetcher) -> Result<ArchiveIndex> {
    let doc = fetcher
        .fetch_document(ARCHIVE_URL)
        .map_err(|e| Error::IndexUnavailable(Box::new(e)))?;
    parse_archive(&doc)
}

fn parse_archive(doc: &Document) -> Result<ArchiveIndex> {
    // Tolerates missing spaces and any single separator character between
    // the id and the title.
    let pattern = Regex::new(r"Comic\s?(?P<id>\d+)\s?.\s?(?P<title>.*)")
        .expect("archive entry pattern must compile");

    let mut entries = BTreeMap::new();
    let mut reached_oldest = false;

    for node in doc.find(Name("a")) {
        let text = node.text();
        let caps = match pattern.captures(text.trim()) {
            Some(caps) => caps,
            None => continue,
        };

        let id = caps["id"].parse::<u32>()?;

        // Comic 0 is linked from the listing but never existed.
        if id == 0 {
            continue;
        }

        let title = if id == 2310 {
            COMIC_2310_TITLE.to_string()
        } else {
            caps["title"].trim().to_string()
        };
        entries.insert(id, title);

        if id == TERMINAL_ID {
            reached_oldest = true;
            break;
        }
    }

    if !reached_oldest {
        return Err(Error::IndexIncomplete {
            entries: entries.len(),
        });
    }

    log::info!("Newest upload: {}", *entries.keys().next_back().unwrap_or(&0));
    Ok(ArchiveIndex { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(entries: &[(u32, &str)]) -> Document {
        let links = entries
            .iter()
            .map(|(id, title)| {
                format!("<a href=\"view.php?comic={}\">Comic {}: {}</a>", id, id, title)
            })
            .collect::<Vec<_>>()
            .join("<br>\n");
        Document::from(format!("<html><body><div id=\"archive\">{}</div></body></html>", links).as_ref())
    }

    #[test]
    fn parses_listing_down_to_comic_one() {
        let doc = listing(&[(4, "Newest"), (3, "Third"), (2, "Second"), (1, "Employment Sucks")]);
        let index = parse_archive(&doc).unwrap();
        assert_eq!(index.latest(), 4);
        assert_eq!(index.len(), 4);
        assert_eq!(index.title(1), Some("Employment Sucks"));
        assert_eq!(index.title(4), Some("Newest"));
    }

    #[test]
    fn comic_zero_is_excluded() {
        let doc = listing(&[(2, "Second"), (0, "Phantom"), (1, "First")]);
        let index = parse_archive(&doc).unwrap();
        assert_eq!(index.title(0), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn comic_2310_title_is_corrected() {
        let doc = listing(&[(2311, "Fine"), (2310, "Some Wrong Title"), (1, "First")]);
        let index = parse_archive(&doc).unwrap();
        assert_eq!(index.title(2310), Some("The Experiment"));
    }

    #[test]
    fn incomplete_listing_is_rejected() {
        // Listing cut off before reaching comic 1: unreliable, fail loud.
        let doc = listing(&[(5, "Newest"), (4, "Older")]);
        match parse_archive(&doc) {
            Err(Error::IndexIncomplete { entries }) => assert_eq!(entries, 2),
            other => panic!("expected IndexIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn non_entry_links_are_ignored() {
        let doc = Document::from(
            "<a href=\"/\">Home</a>\
             <a>Comic 2: Second</a>\
             <a>Comic 1: First</a>",
        );
        let index = parse_archive(&doc).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.latest(), 2);
    }
}
