pub mod layout_reader;
pub mod line_builder;
pub mod pdf_reader;
pub mod table_builder;
pub mod text_normalize;

pub use layout_reader::JsonLayoutReader;
pub use pdf_reader::PopplerReader;

use std::path::Path;

use crate::core::model::{PageInfo, TextFragment};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub cells: Vec<Vec<String>>,
    pub y0: f32,
    pub y1: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub info: PageInfo,
    pub fragments: Vec<TextFragment>,
    pub tables: Vec<RawTable>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLayout {
    pub pages: Vec<RawPage>,
}

impl RawLayout {
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(|p| p.fragments.len()).sum()
    }
}

pub trait LayoutIngestor {
    fn ingest(&self, source: &Path) -> Result<RawLayout>;
}

pub fn ingestor_for(source: &Path, default_font_size: f32) -> Box<dyn LayoutIngestor> {
    let is_pdf = source
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        Box::new(PopplerReader::new(default_font_size))
    } else {
        Box::new(JsonLayoutReader::new(default_font_size))
    }
}
