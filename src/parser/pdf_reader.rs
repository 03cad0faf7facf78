use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::core::geometry::BBox;
use crate::core::model::{PageInfo, TextFragment};
use crate::error::{ExtractionError, Result};
use crate::parser::text_normalize::normalize_text;
use crate::parser::{LayoutIngestor, RawLayout, RawPage};

/// Poppler word boxes are a little taller than the nominal font size.
const BOX_TO_FONT_SIZE: f32 = 0.85;

/// Reads positioned words through poppler's `pdftotext -bbox`.
///
/// Poppler reports no font metadata here, so sizes are estimated from the
/// word box height and every fragment is non-bold.
#[derive(Debug, Clone)]
pub struct PopplerReader {
    default_font_size: f32,
}

struct OpenWord {
    bbox: Option<BBox>,
    text: String,
}

fn attribute(element: &BytesStart, name: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn number(element: &BytesStart, name: &[u8]) -> Option<f32> {
    attribute(element, name)?
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

fn word_box(element: &BytesStart) -> Option<BBox> {
    Some(BBox::new(
        number(element, b"xMin")?,
        number(element, b"yMin")?,
        number(element, b"xMax")?,
        number(element, b"yMax")?,
    ))
}

impl PopplerReader {
    pub fn new(default_font_size: f32) -> Self {
        Self { default_font_size }
    }

    fn fragment(&self, page_idx: usize, word: OpenWord) -> Option<TextFragment> {
        let text = normalize_text(&word.text);
        if text.is_empty() {
            return None;
        }
        let Some(bbox) = word.bbox else {
            debug!("skipping word with unreadable box on page {}", page_idx + 1);
            return None;
        };
        let estimated = bbox.height() * BOX_TO_FONT_SIZE;
        let font_size = if estimated > 0.0 {
            estimated
        } else {
            self.default_font_size
        };
        Some(TextFragment {
            text,
            page_idx,
            bbox,
            font_size,
            bold: false,
            font_name: String::new(),
        })
    }

    pub fn parse_bbox_html(&self, html: &str) -> Result<RawLayout> {
        let mut reader = Reader::from_str(html);
        reader.trim_text(true);

        let mut pages: Vec<RawPage> = Vec::new();
        let mut word: Option<OpenWord> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"page" => {
                    pages.push(RawPage {
                        info: PageInfo {
                            page_idx: pages.len(),
                            width: number(&e, b"width").unwrap_or(0.0),
                            height: number(&e, b"height").unwrap_or(0.0),
                        },
                        fragments: Vec::new(),
                        tables: Vec::new(),
                    });
                }
                Event::Start(e) if e.local_name().as_ref() == b"word" => {
                    word = Some(OpenWord {
                        bbox: word_box(&e),
                        text: String::new(),
                    });
                }
                Event::Text(e) => {
                    if let Some(open) = word.as_mut() {
                        let text = e
                            .unescape()
                            .map(|t| t.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                        open.text.push_str(&text);
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"word" => {
                    // Words belong to the page opened before them.
                    if let (Some(open), Some(page)) = (word.take(), pages.last_mut()) {
                        if let Some(fragment) = self.fragment(page.info.page_idx, open) {
                            page.fragments.push(fragment);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(RawLayout { pages })
    }
}

impl LayoutIngestor for PopplerReader {
    fn ingest(&self, source: &Path) -> Result<RawLayout> {
        std::fs::metadata(source).map_err(|e| ExtractionError::io(source, e))?;
        let html = run_tool(
            "pdftotext",
            &[OsStr::new("-bbox"), source.as_os_str(), OsStr::new("-")],
        )?;
        let layout = self.parse_bbox_html(&html)?;
        if layout.pages.is_empty() {
            return Err(ExtractionError::malformed(
                source,
                "pdftotext reported no pages",
            ));
        }
        debug!(
            pages = layout.pages.len(),
            fragments = layout.fragment_count(),
            "read {} through pdftotext",
            source.display()
        );
        Ok(layout)
    }
}

fn run_tool(tool: &str, args: &[&OsStr]) -> Result<String> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|e| ExtractionError::Ingestor(format!("failed to invoke {tool}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Ingestor(format!(
            "{tool} failed with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
