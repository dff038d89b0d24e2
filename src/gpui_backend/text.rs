use gpui::{TextRun, Window, font, px};

use crate::axis::TextMeasurer;

pub(crate) struct GpuiTextMeasurer<'a> {
    window: &'a Window,
}

impl<'a> GpuiTextMeasurer<'a> {
    pub(crate) fn new(window: &'a Window) -> Self {
        Self { window }
    }
}

impl TextMeasurer for GpuiTextMeasurer<'_> {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let run = TextRun {
            len: text.len(),
            font: font(".SystemUIFont"),
            color: gpui::black(),
            background_color: None,
            underline: None,
            strikethrough: None,
        };
        let shaped =
            self.window
                .text_system()
                .shape_line(text.to_string().into(), px(size), &[run], None);
        let width = f32::from(shaped.width);
        let height = f32::from(shaped.ascent + shaped.descent);
        (width, height.max(size * 1.2))
    }
}

/// Font metrics sampled from the window, kept on the figure so layout between
/// frames measures with the real font instead of the glyph-count estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FontMetrics {
    /// Average tick-label glyph width per pixel of font size.
    char_width: f32,
    /// Line height per pixel of font size.
    line_height: f32,
}

impl FontMetrics {
    const SAMPLE: &'static str = "0123456789.-e";
    const SAMPLE_SIZE: f32 = 100.0;

    pub(crate) fn sample(measurer: &GpuiTextMeasurer<'_>) -> Self {
        let (width, height) = measurer.measure(Self::SAMPLE, Self::SAMPLE_SIZE);
        let glyphs = Self::SAMPLE.chars().count() as f32;
        Self {
            char_width: width / glyphs / Self::SAMPLE_SIZE,
            line_height: height / Self::SAMPLE_SIZE,
        }
    }
}

impl TextMeasurer for FontMetrics {
    fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let widest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let lines = text.lines().count().max(1);
        (
            widest as f32 * size * self.char_width,
            lines as f32 * size * self.line_height,
        )
    }
}
