//! PowerPoint (`.pptx`) output for slide decks.
//!
//! The package holds one slide master with two layouts, a title layout for
//! the cover and a title+body layout for diagnosis slides. Each record of the
//! deck becomes one slide part pointing at the layout its [`SlideFormat`]
//! selects.
//!
//! [`SlideFormat`]: crate::style::SlideFormat

mod parts;
mod slide;

use std::io::{Cursor, Write};

use tracing::{debug, error};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    deck::SlideDeck,
    error::Result,
    serializer::DeckSerializer,
    style::{ReportStyle, SlideLayout},
};

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, Clone)]
pub struct PptxSerializer {
    creator: String,
    compression: CompressionMethod,
}

impl Default for PptxSerializer {
    fn default() -> Self {
        Self {
            creator: "Dr. AI".to_string(),
            compression: CompressionMethod::Deflated,
        }
    }
}

impl PptxSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Stores parts without compression.
    pub fn stored(mut self) -> Self {
        self.compression = CompressionMethod::Stored;
        self
    }

    fn file_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(self.compression)
    }

    /// Every part of the package as (path, xml), in write order.
    fn package_parts(&self, deck: &SlideDeck, style: &ReportStyle) -> Vec<(String, String)> {
        let count = deck.len();
        let mut entries = vec![
            ("[Content_Types].xml".to_string(), parts::content_types(count)),
            ("_rels/.rels".to_string(), parts::package_relationships()),
            (
                "docProps/core.xml".to_string(),
                parts::core_properties(
                    &slide::escape_xml(&deck.cover().title),
                    &slide::escape_xml(&self.creator),
                ),
            ),
            (
                "docProps/app.xml".to_string(),
                parts::app_properties("report-builder", count),
            ),
            ("ppt/presentation.xml".to_string(), parts::presentation(count)),
            (
                "ppt/_rels/presentation.xml.rels".to_string(),
                parts::presentation_relationships(count),
            ),
            ("ppt/slideMasters/slideMaster1.xml".to_string(), parts::slide_master()),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
                parts::slide_master_relationships(),
            ),
            ("ppt/theme/theme1.xml".to_string(), parts::theme()),
        ];

        for layout in [SlideLayout::Title, SlideLayout::TitleAndBody] {
            let index = parts::layout_index(layout);
            entries.push((
                format!("ppt/slideLayouts/slideLayout{}.xml", index),
                parts::slide_layout(layout),
            ));
            entries.push((
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", index),
                parts::slide_layout_relationships(),
            ));
        }

        for (index, record) in deck.slides().iter().enumerate() {
            let format = style.format_for(index);
            let number = index + 1;
            entries.push((
                format!("ppt/slides/slide{}.xml", number),
                slide::slide_xml(record, format),
            ));
            entries.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", number),
                parts::slide_relationships(format.layout),
            ));
        }

        entries
    }

    fn write_package(&self, deck: &SlideDeck, style: &ReportStyle) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (path, xml) in self.package_parts(deck, style) {
            zip.start_file(path, self.file_options())?;
            zip.write_all(xml.as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl DeckSerializer for PptxSerializer {
    fn serialize(&self, deck: &SlideDeck, style: &ReportStyle) -> Result<Vec<u8>> {
        match self.write_package(deck, style) {
            Ok(bytes) => {
                debug!(slides = deck.len(), bytes = bytes.len(), "Serialized deck to pptx");
                Ok(bytes)
            }
            Err(e) => {
                error!("Failed to serialize deck to pptx: {}", e);
                Err(e)
            }
        }
    }

    fn content_type(&self) -> &'static str {
        PPTX_CONTENT_TYPE
    }

    fn file_extension(&self) -> &'static str {
        "pptx"
    }
}
