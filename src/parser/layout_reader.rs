use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::geometry::BBox;
use crate::core::model::{PageInfo, TextFragment};
use crate::error::{ExtractionError, Result};
use crate::parser::text_normalize::{is_bold_font_name, normalize_text};
use crate::parser::{LayoutIngestor, RawLayout, RawPage, RawTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDump {
    pub pages: Vec<DumpPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpPage {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub fragments: Vec<DumpFragment>,
    #[serde(default)]
    pub tables: Vec<DumpTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpFragment {
    pub text: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub font_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpTable {
    pub cells: Vec<Vec<Option<String>>>,
    #[serde(default)]
    pub y0: f32,
    #[serde(default)]
    pub y1: f32,
}

#[derive(Debug, Clone)]
pub struct JsonLayoutReader {
    default_font_size: f32,
}

impl JsonLayoutReader {
    pub fn new(default_font_size: f32) -> Self {
        Self { default_font_size }
    }

    pub fn parse(&self, data: &str, origin: &Path) -> Result<RawLayout> {
        let dump: LayoutDump = serde_json::from_str(data)
            .map_err(|e| ExtractionError::malformed(origin, e.to_string()))?;
        self.convert(dump, origin)
    }

    fn convert(&self, dump: LayoutDump, origin: &Path) -> Result<RawLayout> {
        let mut pages = Vec::with_capacity(dump.pages.len());
        for (page_idx, page) in dump.pages.into_iter().enumerate() {
            if !(page.width > 0.0 && page.height > 0.0) {
                return Err(ExtractionError::malformed(
                    origin,
                    format!("page {} has non-positive size", page_idx + 1),
                ));
            }

            let mut fragments = Vec::with_capacity(page.fragments.len());
            for raw in page.fragments {
                if let Some(fragment) = self.fragment(raw, page_idx, origin)? {
                    fragments.push(fragment);
                }
            }

            let tables = page
                .tables
                .into_iter()
                .map(|table| RawTable {
                    cells: table
                        .cells
                        .into_iter()
                        .map(|row| {
                            row.into_iter()
                                .map(|cell| normalize_text(cell.as_deref().unwrap_or("")))
                                .collect()
                        })
                        .collect(),
                    y0: table.y0,
                    y1: table.y1,
                })
                .collect();

            pages.push(RawPage {
                info: PageInfo {
                    page_idx,
                    width: page.width,
                    height: page.height,
                },
                fragments,
                tables,
            });
        }
        Ok(RawLayout { pages })
    }

    fn fragment(
        &self,
        raw: DumpFragment,
        page_idx: usize,
        origin: &Path,
    ) -> Result<Option<TextFragment>> {
        let coords = [raw.x0, raw.y0, raw.x1, raw.y1];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(ExtractionError::malformed(
                origin,
                format!("non-finite coordinates on page {}", page_idx + 1),
            ));
        }

        let text = normalize_text(&raw.text);
        if text.is_empty() {
            return Ok(None);
        }

        let font_name = raw.font_name.unwrap_or_default();
        let font_size = match raw.font_size {
            Some(size) if size > 0.0 => size,
            _ => self.default_font_size,
        };
        let bold = raw.bold.unwrap_or_else(|| is_bold_font_name(&font_name));

        Ok(Some(TextFragment {
            text,
            page_idx,
            bbox: BBox::new(raw.x0, raw.y0, raw.x1, raw.y1),
            font_size,
            bold,
            font_name,
        }))
    }
}

impl LayoutIngestor for JsonLayoutReader {
    fn ingest(&self, source: &Path) -> Result<RawLayout> {
        let mut data = String::new();
        {
            let file = File::open(source).map_err(|e| ExtractionError::io(source, e))?;
            BufReader::new(file)
                .read_to_string(&mut data)
                .map_err(|e| ExtractionError::io(source, e))?;
        }
        let layout = self.parse(&data, source)?;
        debug!(
            pages = layout.pages.len(),
            fragments = layout.fragment_count(),
            "read layout dump {}",
            source.display()
        );
        Ok(layout)
    }
}
