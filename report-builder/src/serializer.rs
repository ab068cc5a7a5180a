use crate::{deck::SlideDeck, error::Result, style::ReportStyle};

/// Turns a finished deck into a downloadable document.
///
/// Implementations receive the formatting for each record through
/// [`ReportStyle`]; the deck itself carries content only.
pub trait DeckSerializer: Send + Sync {
    fn serialize(&self, deck: &SlideDeck, style: &ReportStyle) -> Result<Vec<u8>>;

    /// MIME type of the produced bytes
    fn content_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;
}
