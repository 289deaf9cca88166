//! Minimal parser collaborator: finds nested frames and inline images in a
//! document as its bytes stream in.

use std::collections::HashMap;

use frameload_core::FrameId;
use scraper::{Html, Selector};
use url::Url;

const DEFAULT_MAX_ELEMENTS: usize = 1_000;

/// Something the scanner found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// A `<frame>` or `<iframe>`. `url` is absolute, or `None` when the
    /// element has no usable `src`.
    ChildFrame {
        name: Option<String>,
        url: Option<String>,
    },
    /// An `<img>`; `src` is passed on as written.
    Image { src: String },
}

struct Document {
    base_url: Option<Url>,
    buffer: Vec<u8>,
    seen: usize,
}

/// Tracks the document of every parsing frame.
///
/// Each write rescans the complete markup received so far and reports only
/// elements beyond those already reported.
pub struct DocumentScanner {
    selector: Option<Selector>,
    max_elements: usize,
    documents: HashMap<FrameId, Document>,
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentScanner {
    pub fn new() -> Self {
        Self::with_max_elements(DEFAULT_MAX_ELEMENTS)
    }

    pub fn with_max_elements(max_elements: usize) -> Self {
        Self {
            selector: Selector::parse("frame, iframe, img").ok(),
            max_elements,
            documents: HashMap::new(),
        }
    }

    pub fn begin(&mut self, frame: FrameId, base_url: &str) {
        self.documents.insert(
            frame,
            Document {
                base_url: Url::parse(base_url).ok(),
                buffer: Vec::new(),
                seen: 0,
            },
        );
    }

    pub fn write(&mut self, frame: FrameId, bytes: &[u8]) -> Vec<Discovery> {
        let Some(selector) = self.selector.as_ref() else {
            return Vec::new();
        };
        let Some(document) = self.documents.get_mut(&frame) else {
            return Vec::new();
        };
        document.buffer.extend_from_slice(bytes);

        // Only complete tags: an element cut by a chunk boundary waits for the next write.
        let Some(end) = document.buffer.iter().rposition(|byte| *byte == b'>') else {
            return Vec::new();
        };
        let markup = String::from_utf8_lossy(&document.buffer[..=end]);
        let html = Html::parse_document(&markup);

        let limit = self.max_elements;
        let found: Vec<Discovery> = html
            .select(selector)
            .take(limit)
            .skip(document.seen)
            .filter_map(|element| {
                let value = element.value();
                let src = value.attr("src").map(str::trim);
                match value.name() {
                    "img" => Some(Discovery::Image {
                        src: src.filter(|src| !src.is_empty())?.to_string(),
                    }),
                    _ => Some(Discovery::ChildFrame {
                        name: value.attr("name").map(ToOwned::to_owned),
                        url: src.and_then(|src| resolve_src(src, document.base_url.as_ref())),
                    }),
                }
            })
            .collect();
        document.seen = html.select(selector).take(limit).count();
        found
    }

    pub fn end(&mut self, frame: FrameId) {
        self.documents.remove(&frame);
    }

    pub fn is_scanning(&self, frame: FrameId) -> bool {
        self.documents.contains_key(&frame)
    }
}

fn resolve_src(src: &str, base: Option<&Url>) -> Option<String> {
    if src.is_empty() || src.starts_with('#') {
        return None;
    }
    match Url::parse(src) {
        Ok(url) => Some(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.and_then(|base| base.join(src).ok()).map(String::from)
        }
        Err(_) => None,
    }
}
