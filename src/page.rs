//! Per-comic page extraction: the strip image URL and the news blurb.

use crate::archive::BASE_URL;
use crate::error::{Error, Result};
use select::document::Document;
use select::predicate::{And, Attr, Name};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use url::Url;

/// Extracted contents of a single comic page.
#[derive(Debug)]
pub struct ComicPage {
    pub image: Url,
    pub news: String,
}

pub fn comic_url(id: u32) -> String {
    format!("{}/view.php?comic={}", BASE_URL, id)
}

pub fn parse_comic_page(doc: &Document) -> Result<ComicPage> {
    let src = doc
        .find(And(Name("img"), Attr("id", "strip")))
        .next()
        .ok_or(Error::MissingElement("img#strip"))?
        .attr("src")
        .ok_or(Error::MissingElement("img#strip[src]"))?;

    // The src is usually site-relative; join against the site base either way.
    let base = Url::parse(BASE_URL).expect("site base URL must be valid");
    let image = base.join(src)?;

    let news = doc
        .find(And(Name("div"), Attr("id", "news")))
        .next()
        .map(|node| node.text().trim().to_string())
        .unwrap_or_default();

    Ok(ComicPage { image, news })
}

/// Relative storage path for a comic image: sharded by the id's last decimal
/// digit to bound directory fan-out, extension taken from the image URL.
pub fn image_rel_path(id: u32, image: &Url) -> PathBuf {
    let ext = Path::new(image.path())
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or("png");
    PathBuf::from(format!("{}", id % 10)).join(format!("{}.{}", id, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_image_and_news() {
        let doc = Document::from(
            "<html><body>\
             <img id=\"strip\" src=\"/comics/123.png\">\
             <div id=\"news\"> Fresh news here. </div>\
             </body></html>",
        );
        let page = parse_comic_page(&doc).unwrap();
        assert_eq!(
            page.image.as_str(),
            "http://www.questionablecontent.net/comics/123.png"
        );
        assert_eq!(page.news, "Fresh news here.");
    }

    #[test]
    fn missing_strip_is_reported() {
        let doc = Document::from("<html><body><div id=\"news\">only news</div></body></html>");
        match parse_comic_page(&doc) {
            Err(Error::MissingElement(which)) => assert_eq!(which, "img#strip"),
            other => panic!("expected MissingElement, got {:?}", other),
        }
    }

    #[test]
    fn news_is_optional() {
        let doc = Document::from("<img id=\"strip\" src=\"/comics/9.gif\">");
        let page = parse_comic_page(&doc).unwrap();
        assert_eq!(page.news, "");
    }

    #[test]
    fn shards_by_last_digit() {
        let png = Url::parse("http://www.questionablecontent.net/comics/123.png").unwrap();
        assert_eq!(image_rel_path(123, &png), PathBuf::from("3/123.png"));

        let gif = Url::parse("http://www.questionablecontent.net/comics/40.gif").unwrap();
        assert_eq!(image_rel_path(40, &gif), PathBuf::from("0/40.gif"));

        // No recognizable extension falls back to png.
        let bare = Url::parse("http://www.questionablecontent.net/comics/77").unwrap();
        assert_eq!(image_rel_path(77, &bare), PathBuf::from("7/77.png"));
    }
}
