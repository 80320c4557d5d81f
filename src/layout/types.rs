use serde::Serialize;

use crate::color::{Color, Gradient};
use crate::ir::Typography;
use crate::pattern::RenderablePattern;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Background {
    Solid { color: Color },
    Gradient { base: Color, gradient: Gradient },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternLayer {
    pub opacity: f32,
    pub patterns: Vec<RenderablePattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteGlyph {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub rotation_deg: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub runs: Vec<TextRun>,
    pub line_height: f32,
    pub total_height: f32,
    pub letter_spacing_em: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconPlacement {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
}

/// A fully resolved card, ready for the SVG writer. Layers are listed
/// bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: Background,
    pub patterns: PatternLayer,
    pub overlay: Option<Overlay>,
    pub glyph: QuoteGlyph,
    pub text: TextLayer,
    pub attribution: Option<Attribution>,
    pub icon: Option<IconPlacement>,
    pub accent: Option<Color>,
    pub typography: Typography,
}
