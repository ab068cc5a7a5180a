use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReportError, Result};

/// Default maximum number of characters in a content slide body.
pub const DEFAULT_CHAR_BUDGET: usize = 800;

/// Title of the cover slide.
pub const REPORT_TITLE: &str = "Medical Report (Dr. AI)";

/// A titled unit of slide content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub body: String,
}

impl Slide {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Body length in characters, the unit the budget is expressed in.
    pub fn body_len(&self) -> usize {
        self.body.chars().count()
    }
}

/// Ordered slides of one report. The first slide is always the cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideDeck {
    slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn cover(&self) -> &Slide {
        &self.slides[0]
    }

    /// Diagnosis slides following the cover
    pub fn content(&self) -> &[Slide] {
        &self.slides[1..]
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Never true: a deck always carries its cover.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Settings for one report build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub char_budget: usize,
    pub title: String,
    pub subtitle: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            char_budget: DEFAULT_CHAR_BUDGET,
            title: REPORT_TITLE.to_string(),
            subtitle: None,
        }
    }
}

impl ReportConfig {
    pub fn with_budget(char_budget: usize) -> Self {
        Self {
            char_budget,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.char_budget == 0 {
            return Err(ReportError::InvalidConfiguration(
                "character budget must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejects an absent diagnosis text.
pub fn require_text(text: Option<&str>) -> Result<&str> {
    text.ok_or_else(|| ReportError::InvalidInput("diagnosis text is missing".to_string()))
}

/// Splits a diagnosis text into its newline-delimited paragraphs.
///
/// Empty paragraphs are kept. An empty text has no paragraphs at all.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').collect()
}

/// Builds a deck with the default cover title.
pub fn build_deck(diagnosis_text: &str, char_budget: usize, generated_at: &str) -> Result<SlideDeck> {
    build_deck_with(diagnosis_text, &ReportConfig::with_budget(char_budget), generated_at)
}

/// Packs paragraphs greedily into content slides of at most `char_budget`
/// characters, in order, and prepends the cover slide.
///
/// A paragraph is never split. When it does not fit next to what is already
/// accumulated it starts a new slide; a paragraph that is longer than the
/// budget on its own gets a slide to itself and overflows it.
pub fn build_deck_with(
    diagnosis_text: &str,
    config: &ReportConfig,
    generated_at: &str,
) -> Result<SlideDeck> {
    config.validate()?;

    let mut slides = vec![cover_slide(config, generated_at)];
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut slide_count = 1usize;

    for paragraph in split_paragraphs(diagnosis_text) {
        let paragraph_len = paragraph.chars().count();

        if !current.is_empty() && current_len + paragraph_len > config.char_budget {
            slides.push(content_slide(slide_count, std::mem::take(&mut current)));
            slide_count += 1;
            current_len = 0;
        }

        current.push_str(paragraph);
        current.push('\n');
        current_len += paragraph_len + 1;
    }

    if !current.is_empty() {
        slides.push(content_slide(slide_count, current));
    }

    debug!(
        content_slides = slides.len() - 1,
        char_budget = config.char_budget,
        "Built report deck"
    );

    Ok(SlideDeck { slides })
}

fn cover_slide(config: &ReportConfig, generated_at: &str) -> Slide {
    let mut body = format!("Date: {}", generated_at);
    if let Some(subtitle) = &config.subtitle {
        body.push('\n');
        body.push_str(subtitle);
    }
    Slide::new(config.title.clone(), body)
}

fn content_slide(number: usize, body: String) -> Slide {
    Slide::new(format!("Diagnosis Result ({})", number), body)
}
