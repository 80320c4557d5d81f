use serde::Serialize;

use crate::config::TextFlowConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFlow {
    pub lines: Vec<String>,
    pub line_height: f32,
    pub total_height: f32,
}

impl TextFlow {
    pub fn canvas_height(&self, min_height: f32, margin: f32) -> f32 {
        (self.total_height + margin).max(min_height)
    }
}

pub fn layout_text(text: &str, pixel_width: f32, font_size: f32) -> TextFlow {
    layout_text_with(text, pixel_width, font_size, &TextFlowConfig::default())
}

/// Greedy character packing. The width estimate assumes CJK glyphs, so
/// Latin text wraps early rather than overflowing.
pub fn layout_text_with(
    text: &str,
    pixel_width: f32,
    font_size: f32,
    config: &TextFlowConfig,
) -> TextFlow {
    let budget = chars_per_line(pixel_width, font_size, config);
    let lines: Vec<String> = text
        .split('\n')
        .map(|paragraph| paragraph.trim_end_matches('\r'))
        .filter(|paragraph| !paragraph.is_empty())
        .flat_map(|paragraph| wrap_paragraph(paragraph, budget))
        .collect();
    let line_height = font_size * config.line_height;
    TextFlow {
        total_height: lines.len() as f32 * line_height,
        lines,
        line_height,
    }
}

pub fn chars_per_line(pixel_width: f32, font_size: f32, config: &TextFlowConfig) -> usize {
    let effective = pixel_width * config.width_ratio;
    let glyph = font_size * config.char_width_factor;
    let budget = (effective / glyph).floor();
    if budget.is_finite() && budget >= 1.0 {
        budget as usize
    } else {
        1
    }
}

pub fn wrap_paragraph(paragraph: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(budget)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
