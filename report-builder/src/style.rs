use serde::{Deserialize, Serialize};

/// Slide layout a record is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayout {
    /// Centered title with a subtitle placeholder
    Title,
    /// Title bar above a body text box
    TitleAndBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Formatting applied by a serializer to a single slide record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideFormat {
    pub layout: SlideLayout,
    /// Body font size in points; `None` keeps the layout's size.
    pub font_size_pt: Option<u32>,
    pub alignment: TextAlignment,
    pub right_to_left: bool,
}

impl SlideFormat {
    pub fn cover() -> Self {
        Self {
            layout: SlideLayout::Title,
            font_size_pt: None,
            alignment: TextAlignment::Center,
            right_to_left: false,
        }
    }

    pub fn diagnosis() -> Self {
        Self {
            layout: SlideLayout::TitleAndBody,
            font_size_pt: Some(18),
            alignment: TextAlignment::Right,
            right_to_left: true,
        }
    }
}

/// Per-record formatting for a whole deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStyle {
    pub cover: SlideFormat,
    pub content: SlideFormat,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            cover: SlideFormat::cover(),
            content: SlideFormat::diagnosis(),
        }
    }
}

impl ReportStyle {
    /// Left-to-right variant of the default style.
    pub fn left_to_right() -> Self {
        let mut style = Self::default();
        style.content.alignment = TextAlignment::Left;
        style.content.right_to_left = false;
        style
    }

    /// Format of the slide at `index` in a deck; index 0 is the cover.
    pub fn format_for(&self, index: usize) -> &SlideFormat {
        if index == 0 { &self.cover } else { &self.content }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_and_content_formats_are_picked_by_position() {
        let style = ReportStyle::default();
        assert_eq!(style.format_for(0).layout, SlideLayout::Title);
        assert_eq!(style.format_for(1).layout, SlideLayout::TitleAndBody);
        assert_eq!(style.format_for(7).font_size_pt, Some(18));
        assert!(style.format_for(3).right_to_left);
    }

    #[test]
    fn left_to_right_only_changes_content_direction() {
        let style = ReportStyle::left_to_right();
        assert_eq!(style.content.alignment, TextAlignment::Left);
        assert!(!style.content.right_to_left);
        assert_eq!(style.cover, SlideFormat::cover());
    }
}
