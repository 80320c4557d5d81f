use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFlowConfig {
    /// Share of the canvas width available to text.
    pub width_ratio: f32,
    /// Approximate advance of one glyph in ems (CJK glyphs are ~1em plus tracking).
    pub char_width_factor: f32,
    pub line_height: f32,
}

impl Default for TextFlowConfig {
    fn default() -> Self {
        Self {
            width_ratio: 0.8,
            char_width_factor: 1.2,
            line_height: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub width: f32,
    pub min_height: f32,
    /// Top/bottom padding, glyph row and attribution line together.
    pub vertical_margin: f32,
    pub text_x: f32,
    pub text_y: f32,
    pub letter_spacing_em: f32,
    pub pattern_limit: usize,
    pub pattern_opacity: f32,
    pub overlay_opacity: f32,
    pub glyph_x: f32,
    pub glyph_y: f32,
    pub glyph_size: f32,
    pub attribution_offset: f32,
    pub attribution_inset: f32,
    pub attribution_scale: f32,
    pub fixed_font_size: f32,
    pub text: TextFlowConfig,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 672.0,
            min_height: 300.0,
            vertical_margin: 200.0,
            text_x: 100.0,
            text_y: 100.0,
            letter_spacing_em: 0.15,
            pattern_limit: 6,
            pattern_opacity: 0.4,
            overlay_opacity: 0.5,
            glyph_x: 40.0,
            glyph_y: 40.0,
            glyph_size: 18.0,
            attribution_offset: 40.0,
            attribution_inset: 50.0,
            attribution_scale: 0.9,
            fixed_font_size: 22.0,
            text: TextFlowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPlanConfig {
    /// A series goes to the secondary axis only if its range is below
    /// `largest_range / secondary_range_ratio`.
    pub secondary_range_ratio: f64,
    /// Primary axis turns logarithmic when `max / min` exceeds this.
    pub log_ratio_threshold: f64,
    pub tension: f32,
    pub point_radius: f32,
    pub border_width: f32,
}

impl Default for ChartPlanConfig {
    fn default() -> Self {
        Self {
            secondary_range_ratio: 5.0,
            log_ratio_threshold: 50.0,
            tension: 0.4,
            point_radius: 4.0,
            border_width: 1.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub card: CardConfig,
    pub chart: ChartPlanConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TextFlowConfigFile {
    width_ratio: Option<f32>,
    char_width_factor: Option<f32>,
    line_height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CardConfigFile {
    width: Option<f32>,
    min_height: Option<f32>,
    vertical_margin: Option<f32>,
    text_x: Option<f32>,
    text_y: Option<f32>,
    letter_spacing_em: Option<f32>,
    pattern_limit: Option<usize>,
    pattern_opacity: Option<f32>,
    overlay_opacity: Option<f32>,
    glyph_x: Option<f32>,
    glyph_y: Option<f32>,
    glyph_size: Option<f32>,
    attribution_offset: Option<f32>,
    attribution_inset: Option<f32>,
    attribution_scale: Option<f32>,
    fixed_font_size: Option<f32>,
    text: Option<TextFlowConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChartConfigFile {
    secondary_range_ratio: Option<f64>,
    log_ratio_threshold: Option<f64>,
    tension: Option<f32>,
    point_radius: Option<f32>,
    border_width: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    card: Option<CardConfigFile>,
    chart: Option<ChartConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(card) = parsed.card {
        let target = &mut config.card;
        if let Some(v) = card.width {
            target.width = v.max(1.0);
        }
        if let Some(v) = card.min_height {
            target.min_height = v.max(0.0);
        }
        if let Some(v) = card.vertical_margin {
            target.vertical_margin = v.max(0.0);
        }
        if let Some(v) = card.text_x {
            target.text_x = v;
        }
        if let Some(v) = card.text_y {
            target.text_y = v;
        }
        if let Some(v) = card.letter_spacing_em {
            target.letter_spacing_em = v;
        }
        if let Some(v) = card.pattern_limit {
            target.pattern_limit = v;
        }
        if let Some(v) = card.pattern_opacity {
            target.pattern_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = card.overlay_opacity {
            target.overlay_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = card.glyph_x {
            target.glyph_x = v;
        }
        if let Some(v) = card.glyph_y {
            target.glyph_y = v;
        }
        if let Some(v) = card.glyph_size {
            target.glyph_size = v.max(0.0);
        }
        if let Some(v) = card.attribution_offset {
            target.attribution_offset = v;
        }
        if let Some(v) = card.attribution_inset {
            target.attribution_inset = v;
        }
        if let Some(v) = card.attribution_scale {
            target.attribution_scale = v;
        }
        if let Some(v) = card.fixed_font_size {
            target.fixed_font_size = v;
        }
        if let Some(text) = card.text {
            if let Some(v) = text.width_ratio {
                target.text.width_ratio = v.clamp(0.05, 1.0);
            }
            if let Some(v) = text.char_width_factor {
                target.text.char_width_factor = v;
            }
            if let Some(v) = text.line_height {
                target.text.line_height = v;
            }
        }
    }

    if let Some(chart) = parsed.chart {
        let target = &mut config.chart;
        if let Some(v) = chart.secondary_range_ratio {
            target.secondary_range_ratio = v;
        }
        if let Some(v) = chart.log_ratio_threshold {
            target.log_ratio_threshold = v;
        }
        if let Some(v) = chart.tension {
            target.tension = v;
        }
        if let Some(v) = chart.point_radius {
            target.point_radius = v;
        }
        if let Some(v) = chart.border_width {
            target.border_width = v;
        }
    }

    Ok(config)
}
