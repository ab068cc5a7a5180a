use std::sync::Arc;

use chrono::Local;
use report_builder::{DeckSerializer, ReportConfig, ReportStyle, Result, build_deck_with};
use tracing::info;

pub const REPORT_FILE_STEM: &str = "Medical_Report";

/// Bytes of a generated report plus how to deliver them
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Builds a deck from a reply and hands it to the serializer
#[derive(Clone)]
pub struct ReportGenerator {
    config: ReportConfig,
    style: ReportStyle,
    serializer: Arc<dyn DeckSerializer>,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig, style: ReportStyle, serializer: Arc<dyn DeckSerializer>) -> Self {
        Self {
            config,
            style,
            serializer,
        }
    }

    /// Report stamped with the current local time
    pub fn generate(&self, diagnosis_text: &str) -> Result<ReportFile> {
        let generated_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
        self.generate_at(diagnosis_text, &generated_at)
    }

    pub fn generate_at(&self, diagnosis_text: &str, generated_at: &str) -> Result<ReportFile> {
        let deck = build_deck_with(diagnosis_text, &self.config, generated_at)?;
        let bytes = self.serializer.serialize(&deck, &self.style)?;

        info!(
            slides = deck.len(),
            bytes = bytes.len(),
            "Generated report"
        );

        Ok(ReportFile {
            bytes,
            content_type: self.serializer.content_type(),
            file_name: format!("{}.{}", REPORT_FILE_STEM, self.serializer.file_extension()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_builder::{PptxSerializer, ReportError, SlideDeck};

    struct FailingSerializer;

    impl DeckSerializer for FailingSerializer {
        fn serialize(&self, _deck: &SlideDeck, _style: &ReportStyle) -> Result<Vec<u8>> {
            Err(ReportError::Io(std::io::Error::other("disk full")))
        }

        fn content_type(&self) -> &'static str {
            "application/octet-stream"
        }

        fn file_extension(&self) -> &'static str {
            "bin"
        }
    }

    #[test]
    fn generates_named_pptx() {
        let generator = ReportGenerator::new(
            ReportConfig::default(),
            ReportStyle::default(),
            Arc::new(PptxSerializer::new()),
        );
        let file = generator.generate_at("Rest and fluids.", "2024-05-01 09:30").unwrap();
        assert_eq!(file.file_name, "Medical_Report.pptx");
        assert_eq!(file.content_type, report_builder::PPTX_CONTENT_TYPE);
        assert!(!file.bytes.is_empty());
    }

    #[test]
    fn serializer_failure_is_surfaced_unchanged() {
        let generator = ReportGenerator::new(
            ReportConfig::default(),
            ReportStyle::default(),
            Arc::new(FailingSerializer),
        );
        let err = generator.generate("text").unwrap_err();
        assert!(matches!(err, ReportError::Io(e) if e.to_string() == "disk full"));
    }

    #[test]
    fn invalid_budget_fails_before_serializing() {
        let generator = ReportGenerator::new(
            ReportConfig::with_budget(0),
            ReportStyle::default(),
            Arc::new(FailingSerializer),
        );
        assert!(matches!(
            generator.generate("text").unwrap_err(),
            ReportError::InvalidConfiguration(_)
        ));
    }
}
