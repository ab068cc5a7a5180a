pub mod deck;
pub mod error;
pub mod pptx;
pub mod serializer;
pub mod style;

// Re-export commonly used types
pub use deck::{
    DEFAULT_CHAR_BUDGET, REPORT_TITLE, ReportConfig, Slide, SlideDeck, build_deck,
    build_deck_with, require_text, split_paragraphs,
};
pub use error::{ReportError, Result};
pub use pptx::{PPTX_CONTENT_TYPE, PptxSerializer};
pub use serializer::DeckSerializer;
pub use style::{ReportStyle, SlideFormat, SlideLayout, TextAlignment};
