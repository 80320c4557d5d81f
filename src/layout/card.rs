use rand::Rng;
use tracing::debug;

use super::text::{TextFlow, layout_text_with};
use super::types::{
    Attribution, Background, IconPlacement, Overlay, PatternLayer, QuoteGlyph, Scene, TextLayer,
    TextRun,
};
use crate::color::{Color, background_gradient, darken, is_near_white, normalize};
use crate::config::{CardConfig, TextFlowConfig};
use crate::ir::{CardDocument, SceneStyle, Typography};
use crate::pattern::{RenderablePattern, repair};
use crate::theme::{FontFamily, choose_icon};

const LEGACY_TEXT_COLOR: &str = "#374151";
const ATTRIBUTION_DASH: &str = "——";
const ICON_GAP: f32 = 8.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Quote<'a> {
    pub text: &'a str,
    pub author: Option<&'a str>,
    pub source: Option<&'a str>,
}

impl<'a> Quote<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            author: None,
            source: None,
        }
    }

    pub fn with_author(mut self, author: &'a str) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// `—— author《source》` built from the parts present. The dash belongs to
    /// the author, so a source alone reads `《source》`.
    pub fn attribution(&self) -> Option<String> {
        let author = self.author.map(str::trim).filter(|s| !s.is_empty());
        let source = self.source.map(str::trim).filter(|s| !s.is_empty());
        let mut line = String::new();
        if let Some(author) = author {
            line.push_str(&format!("{ATTRIBUTION_DASH} {author}"));
        }
        if let Some(source) = source {
            line.push_str(&format!("《{source}》"));
        }
        (!line.is_empty()).then_some(line)
    }
}

/// Returns the typography actually used for a card. The input is left untouched.
pub fn resolve_typography(
    typography: &Typography,
    fixed_format: bool,
    config: &CardConfig,
) -> Typography {
    let mut resolved = typography.clone();
    if fixed_format {
        resolved.font_family = FontFamily::SerifCn;
        resolved.font_size = config.fixed_font_size;
    }
    resolved.line_height = config.text.line_height;
    resolved
}

/// Everything that differs between the geometric and the legacy card.
struct Layers {
    background: Background,
    background_color: Color,
    patterns: Vec<RenderablePattern>,
    overlay: Option<Overlay>,
    glyph_color: Color,
    attribution_size: f32,
    accent: Option<Color>,
}

pub fn assemble(
    quote: &Quote<'_>,
    style: &SceneStyle,
    typography: &Typography,
    fixed_format: bool,
    config: &CardConfig,
) -> Scene {
    let resolved = resolve_typography(typography, fixed_format, config);
    let background_color = style.background_color.clone();
    let patterns = style
        .patterns
        .iter()
        .take(config.pattern_limit)
        .map(|pattern| repair(pattern, &background_color, style.primary_color.as_ref()))
        .collect();
    let layers = Layers {
        background: Background::Solid {
            color: background_color.clone(),
        },
        background_color,
        patterns,
        overlay: Some(Overlay {
            color: Color::white(),
            opacity: config.overlay_opacity,
        }),
        glyph_color: style.primary_color.clone().unwrap_or_else(Color::mid_gray),
        attribution_size: resolved.font_size * config.attribution_scale,
        accent: None,
    };
    compose(quote, resolved, layers, config)
}

/// Assembles whichever card style the document describes and picks the
/// theme icon from `rng`.
pub fn assemble_document<R: Rng + ?Sized>(
    document: &CardDocument,
    quote: &Quote<'_>,
    fixed_format: bool,
    config: &CardConfig,
    rng: &mut R,
) -> Scene {
    // Only documents with neither block are in the older gradient format.
    let mut scene = if document.svg_style.is_none() && document.typography.is_none() {
        assemble_legacy(document, quote, fixed_format, config)
    } else {
        assemble(
            quote,
            &document.scene_style_or_default(),
            &document.typography_or_default(),
            fixed_format,
            config,
        )
    };

    let icon_color = scene.accent.clone().unwrap_or_else(|| scene.glyph.color.clone());
    if let Some(attribution) = &scene.attribution {
        let name = choose_icon(document.theme, rng);
        debug!(icon = name, theme = ?document.theme, "placing theme icon");
        scene.icon = Some(IconPlacement {
            name: name.to_string(),
            x: attribution.x + ICON_GAP,
            y: attribution.y - attribution.font_size,
            size: attribution.font_size,
            color: icon_color,
        });
    }
    scene
}

fn assemble_legacy(
    document: &CardDocument,
    quote: &Quote<'_>,
    fixed_format: bool,
    config: &CardConfig,
) -> Scene {
    let primary = document.color_scheme.primary.clone();
    let accent = darken(&primary);
    let typography = Typography {
        font_family: document.font_family,
        font_size: document.font_size.px(),
        line_height: config.text.line_height,
        text_color: normalize(LEGACY_TEXT_COLOR),
    };
    let resolved = resolve_typography(&typography, fixed_format, config);
    let attribution_size = if fixed_format {
        resolved.font_size * config.attribution_scale
    } else {
        document.font_size.smaller().px()
    };
    let layers = Layers {
        background: Background::Gradient {
            base: primary.clone(),
            gradient: background_gradient(primary.as_str()),
        },
        // The wash is only a few percent opaque over white.
        background_color: Color::white(),
        patterns: Vec::new(),
        overlay: None,
        glyph_color: accent.clone(),
        attribution_size,
        accent: Some(accent),
    };
    compose(quote, resolved, layers, config)
}

fn compose(
    quote: &Quote<'_>,
    mut typography: Typography,
    layers: Layers,
    config: &CardConfig,
) -> Scene {
    if is_near_white(&layers.background_color) && is_near_white(&typography.text_color) {
        debug!(
            background = %layers.background_color,
            text = %typography.text_color,
            "text would vanish against the background, forcing dark text"
        );
        typography.text_color = Color::dark_gray();
    }

    let flow_config = TextFlowConfig {
        line_height: typography.line_height,
        ..config.text.clone()
    };
    let flow = layout_text_with(quote.text, config.width, typography.font_size, &flow_config);
    let height = flow.canvas_height(config.min_height, config.vertical_margin);

    let attribution = quote.attribution().map(|text| Attribution {
        text,
        x: config.width - config.attribution_inset,
        y: config.text_y + flow.total_height + config.attribution_offset,
        font_size: layers.attribution_size,
    });

    Scene {
        width: config.width,
        height,
        background: layers.background,
        patterns: PatternLayer {
            opacity: config.pattern_opacity,
            patterns: layers.patterns,
        },
        overlay: layers.overlay,
        glyph: QuoteGlyph {
            x: config.glyph_x,
            y: config.glyph_y,
            size: config.glyph_size,
            color: layers.glyph_color,
            rotation_deg: 180.0,
        },
        text: text_layer(&flow, config),
        attribution,
        icon: None,
        accent: layers.accent,
        typography,
    }
}

fn text_layer(flow: &TextFlow, config: &CardConfig) -> TextLayer {
    let runs = flow
        .lines
        .iter()
        .enumerate()
        .map(|(idx, line)| TextRun {
            text: line.clone(),
            x: config.text_x,
            y: config.text_y + idx as f32 * flow.line_height,
        })
        .collect();
    TextLayer {
        runs,
        line_height: flow.line_height,
        total_height: flow.total_height,
        letter_spacing_em: config.letter_spacing_em,
    }
}
