//! Repairs one generator-emitted pattern into something the SVG writer can
//! emit verbatim: every required attribute present, colors canonical and
//! visible against the card, flags encoded as `1`/`0`.

use serde::Serialize;
use tracing::debug;

use crate::color::{Color, normalize};
use crate::geometry::{self, ArcSpec};
use crate::ir::{Pattern, PatternKind};

const DEFAULT_RECT_SIDE: f32 = 50.0;
const DEFAULT_CIRCLE_RADIUS: f32 = 10.0;
const DEFAULT_ELLIPSE_RX: f32 = 20.0;
const DEFAULT_LINE_LENGTH: f32 = 50.0;
const DEFAULT_SPIRAL_TURNS: f32 = 3.0;
const DEFAULT_SPIRAL_SPACING: f32 = 10.0;
const DEFAULT_WAVE_AMPLITUDE: f32 = 20.0;
const DEFAULT_WAVE_FREQUENCY: f32 = 0.02;
const DEFAULT_WAVE_WIDTH: f32 = 100.0;
const DEFAULT_FILTER: &str = "blur(1px)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SvgElement {
    Circle,
    Rect,
    Line,
    Polygon,
    Polyline,
    Path,
    Ellipse,
}

impl SvgElement {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rect => "rect",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
            Self::Path => "path",
            Self::Ellipse => "ellipse",
        }
    }
}

/// A pattern reduced to an SVG element name plus ordered attribute pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderablePattern {
    pub kind: PatternKind,
    pub element: SvgElement,
    pub attributes: Vec<(String, String)>,
}

impl RenderablePattern {
    fn new(kind: PatternKind, element: SvgElement) -> Self {
        Self {
            kind,
            element,
            attributes: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    fn set_number(&mut self, name: &str, value: f32) {
        self.set(name, format_number(value));
    }
}

/// Formats with at most two decimals and no trailing zeros.
pub fn format_number(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

pub fn repair(pattern: &Pattern, background: &Color, primary: Option<&Color>) -> RenderablePattern {
    debug!(kind = ?pattern.kind, x = pattern.x, y = pattern.y, "repairing pattern");
    let mut out = match pattern.kind {
        PatternKind::Circle => repair_circle(pattern),
        PatternKind::Rect => repair_rect(pattern),
        PatternKind::Line => repair_line(pattern),
        PatternKind::Polygon => repair_points(pattern, SvgElement::Polygon),
        PatternKind::Polyline => repair_points(pattern, SvgElement::Polyline),
        PatternKind::Path => {
            let mut out = RenderablePattern::new(pattern.kind, SvgElement::Path);
            out.set("d", pattern.text("d").unwrap_or_default());
            out
        }
        PatternKind::Ellipse => repair_ellipse(pattern),
        PatternKind::Arc => repair_arc(pattern),
        PatternKind::Spiral => {
            let turns = pattern.nonzero("turns").unwrap_or(DEFAULT_SPIRAL_TURNS);
            let spacing = pattern.nonzero("spacing").unwrap_or(DEFAULT_SPIRAL_SPACING);
            let mut out = RenderablePattern::new(pattern.kind, SvgElement::Path);
            out.set("d", geometry::spiral_path(pattern.x, pattern.y, turns, spacing));
            out
        }
        PatternKind::Wave => {
            let amplitude = pattern.nonzero("amplitude").unwrap_or(DEFAULT_WAVE_AMPLITUDE);
            let frequency = pattern.nonzero("frequency").unwrap_or(DEFAULT_WAVE_FREQUENCY);
            let width = pattern.nonzero("wavewidth").unwrap_or(DEFAULT_WAVE_WIDTH);
            let mut out = RenderablePattern::new(pattern.kind, SvgElement::Path);
            out.set(
                "d",
                geometry::wave_path(pattern.x, pattern.y, amplitude, frequency, width),
            );
            out
        }
    };
    apply_paint(pattern, &mut out, background, primary);
    apply_presentation(pattern, &mut out);
    out
}

fn repair_circle(pattern: &Pattern) -> RenderablePattern {
    let mut out = RenderablePattern::new(pattern.kind, SvgElement::Circle);
    out.set_number("cx", pattern.number("cx").unwrap_or(pattern.x));
    out.set_number("cy", pattern.number("cy").unwrap_or(pattern.y));
    let r = pattern
        .number("r")
        .filter(|r| *r > 0.0)
        .unwrap_or(DEFAULT_CIRCLE_RADIUS);
    out.set_number("r", r);
    out
}

fn repair_rect(pattern: &Pattern) -> RenderablePattern {
    let width = pattern.number("width").filter(|v| *v > 0.0);
    let height = pattern.number("height").filter(|v| *v > 0.0);
    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w),
        (None, Some(h)) => (h, h),
        (None, None) => (DEFAULT_RECT_SIDE, DEFAULT_RECT_SIDE),
    };
    let mut out = RenderablePattern::new(pattern.kind, SvgElement::Rect);
    out.set_number("x", pattern.x);
    out.set_number("y", pattern.y);
    out.set_number("width", width);
    out.set_number("height", height);
    out
}

fn repair_line(pattern: &Pattern) -> RenderablePattern {
    let mut out = RenderablePattern::new(pattern.kind, SvgElement::Line);
    out.set_number("x1", pattern.x);
    out.set_number("y1", pattern.y);
    out.set_number(
        "x2",
        pattern.number("x2").unwrap_or(pattern.x + DEFAULT_LINE_LENGTH),
    );
    out.set_number(
        "y2",
        pattern.number("y2").unwrap_or(pattern.y + DEFAULT_LINE_LENGTH),
    );
    out
}

fn repair_ellipse(pattern: &Pattern) -> RenderablePattern {
    let rx = pattern.number("rx").filter(|v| *v > 0.0);
    let ry = pattern.number("ry").filter(|v| *v > 0.0);
    let (rx, ry) = match (rx, ry) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (DEFAULT_ELLIPSE_RX, DEFAULT_ELLIPSE_RX / 2.0),
    };
    let mut out = RenderablePattern::new(pattern.kind, SvgElement::Ellipse);
    out.set_number("cx", pattern.number("cx").unwrap_or(pattern.x));
    out.set_number("cy", pattern.number("cy").unwrap_or(pattern.y));
    out.set_number("rx", rx);
    out.set_number("ry", ry);
    out
}

fn repair_points(pattern: &Pattern, element: SvgElement) -> RenderablePattern {
    let points = match (pattern.text("points"), pattern.text("d")) {
        (Some(points), _) => points.trim().to_string(),
        (None, Some(d)) if element == SvgElement::Polygon => path_data_to_points(d),
        _ => String::new(),
    };
    let mut out = RenderablePattern::new(pattern.kind, element);
    out.set("points", points);
    out
}

/// `M 10 20 L 30 40 Z` becomes `10,20,30,40`.
pub fn path_data_to_points(d: &str) -> String {
    let stripped: String = d
        .chars()
        .map(|c| if matches!(c, 'M' | 'L' | 'Z' | ',') { ' ' } else { c })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(",")
}

fn repair_arc(pattern: &Pattern) -> RenderablePattern {
    let arc = ArcSpec {
        start: (pattern.x, pattern.y),
        end: (
            pattern.number("endx").unwrap_or(pattern.x),
            pattern.number("endy").unwrap_or(pattern.y),
        ),
        rx: pattern.number("rx").unwrap_or(0.0),
        ry: pattern.number("ry").unwrap_or(0.0),
        large_arc: pattern.flag("largearc"),
        sweep: pattern.flag("sweep"),
    };
    let mut out = RenderablePattern::new(pattern.kind, SvgElement::Path);
    out.set("d", geometry::arc_path(&arc));
    out
}

fn apply_paint(
    pattern: &Pattern,
    out: &mut RenderablePattern,
    background: &Color,
    primary: Option<&Color>,
) {
    let replacement = safe_replacement(background, primary);
    let fallback_fill = if pattern.kind.is_open() {
        "none".to_string()
    } else {
        replacement.to_string()
    };
    let fallback_stroke = if pattern.kind.is_open() {
        replacement.to_string()
    } else {
        "none".to_string()
    };

    let fill = pattern
        .text("fill")
        .map(|raw| repair_paint(raw, background, &replacement))
        .unwrap_or(fallback_fill);
    let stroke = pattern
        .text("stroke")
        .map(|raw| repair_paint(raw, background, &replacement))
        .unwrap_or(fallback_stroke);
    out.set("fill", fill);
    out.set("stroke", stroke);
}

/// First candidate that is neither pure white nor the background itself.
fn safe_replacement(background: &Color, primary: Option<&Color>) -> Color {
    primary
        .cloned()
        .into_iter()
        .chain([Color::mid_gray(), Color::dark_gray()])
        .find(|candidate| !candidate.is_white() && candidate != background)
        .unwrap_or_else(Color::black)
}

fn repair_paint(raw: &str, background: &Color, replacement: &Color) -> String {
    if raw.trim().eq_ignore_ascii_case("none") {
        return "none".to_string();
    }
    let color = normalize(raw);
    if color.is_white() || &color == background {
        replacement.to_string()
    } else {
        color.to_string()
    }
}

fn apply_presentation(pattern: &Pattern, out: &mut RenderablePattern) {
    let stroke_width = pattern
        .number("strokeWidth")
        .or_else(|| pattern.number("stroke-width"))
        .filter(|v| *v >= 0.0)
        .unwrap_or(1.0);
    out.set_number("stroke-width", stroke_width);
    let opacity = pattern.number("opacity").unwrap_or(1.0).clamp(0.0, 1.0);
    out.set_number("opacity", opacity);
    if let Some(transform) = pattern.text("transform") {
        out.set("transform", transform.trim());
    }
    out.set("filter", pattern.text("filter").map_or(DEFAULT_FILTER, str::trim));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::AttrValue;

    fn num(v: f32) -> AttrValue {
        AttrValue::Number(v)
    }

    fn text(v: &str) -> AttrValue {
        AttrValue::Text(v.to_string())
    }

    fn white() -> Color {
        Color::white()
    }

    #[test]
    fn rect_copies_the_single_dimension() {
        let pattern = Pattern::new(PatternKind::Rect, 10.0, 20.0).with_attr("width", num(50.0));
        let out = repair(&pattern, &white(), None);
        assert_eq!(out.element, SvgElement::Rect);
        assert_eq!(out.get("width"), Some("50"));
        assert_eq!(out.get("height"), Some("50"));

        let pattern = Pattern::new(PatternKind::Rect, 0.0, 0.0).with_attr("height", num(32.5));
        let out = repair(&pattern, &white(), None);
        assert_eq!(out.get("width"), Some("32.5"));
    }

    #[test]
    fn rect_without_dimensions_is_a_50_square() {
        let out = repair(&Pattern::new(PatternKind::Rect, 0.0, 0.0), &white(), None);
        assert_eq!(out.get("width"), Some("50"));
        assert_eq!(out.get("height"), Some("50"));
    }

    #[test]
    fn white_fill_takes_the_primary_color() {
        let primary = normalize("#123456");
        let pattern = Pattern::new(PatternKind::Circle, 5.0, 5.0)
            .with_attr("fill", text("#FFFFFF"))
            .with_attr("stroke", text("white"));
        let out = repair(&pattern, &white(), Some(&primary));
        assert_eq!(out.get("fill"), Some("#123456"));
        assert_eq!(out.get("stroke"), Some("#123456"));
    }

    #[test]
    fn white_fill_without_primary_is_mid_gray() {
        let pattern = Pattern::new(PatternKind::Rect, 0.0, 0.0).with_attr("fill", text("#fff"));
        let out = repair(&pattern, &white(), None);
        assert_eq!(out.get("fill"), Some("#666666"));
        // A white primary is no better than the white fill it would replace.
        let out = repair(&pattern, &white(), Some(&white()));
        assert_eq!(out.get("fill"), Some("#666666"));
    }

    #[test]
    fn paint_matching_the_background_is_replaced() {
        let background = normalize("#223344");
        let primary = normalize("#aa0000");
        let pattern = Pattern::new(PatternKind::Ellipse, 0.0, 0.0)
            .with_attr("fill", text("rgb(34, 51, 68)"))
            .with_attr("stroke", text("none"));
        let out = repair(&pattern, &background, Some(&primary));
        assert_eq!(out.get("fill"), Some("#aa0000"));
        assert_eq!(out.get("stroke"), Some("none"));
    }

    #[test]
    fn colors_are_canonicalized() {
        let pattern = Pattern::new(PatternKind::Circle, 0.0, 0.0)
            .with_attr("fill", text("##ABC"))
            .with_attr("stroke", text("rgba(74,144,226,0.3)"));
        let out = repair(&pattern, &white(), None);
        assert_eq!(out.get("fill"), Some("#aabbcc"));
        assert_eq!(out.get("stroke"), Some("#4a90e2"));
    }

    #[test]
    fn polygon_path_data_becomes_points() {
        let pattern = Pattern::new(PatternKind::Polygon, 0.0, 0.0)
            .with_attr("d", text("M 10 20 L 30 40 L 50,60 Z"));
        let out = repair(&pattern, &white(), None);
        assert_eq!(out.element, SvgElement::Polygon);
        assert_eq!(out.get("points"), Some("10,20,30,40,50,60"));
        assert_eq!(out.get("d"), None);
    }

    #[test]
    fn arc_defaults_and_flag_encoding() {
        let pattern = Pattern::new(PatternKind::Arc, 10.0, 20.0)
            .with_attr("largearc", AttrValue::Flag(true))
            .with_attr("sweep", AttrValue::Flag(false));
        let out = repair(&pattern, &white(), None);
        assert_eq!(out.element, SvgElement::Path);
        assert_eq!(
            out.get("d"),
            Some("M 10.00 20.00 A 0.00 0.00 0 1 0 10.00 20.00")
        );
        assert_eq!(out.get("fill"), Some("none"));
    }

    #[test]
    fn arc_uses_endpoint_and_radii() {
        let pattern = Pattern::new(PatternKind::Arc, 0.0, 0.0)
            .with_attr("rx", num(30.0))
            .with_attr("ry", num(15.0))
            .with_attr("endx", num(60.0))
            .with_attr("endy", num(0.0))
            .with_attr("sweep", text("true"));
        let out = repair(&pattern, &white(), None);
        assert_eq!(
            out.get("d"),
            Some("M 0.00 0.00 A 30.00 15.00 0 0 1 60.00 0.00")
        );
    }

    #[test]
    fn spiral_and_wave_defaults_match_geometry() {
        let spiral = repair(&Pattern::new(PatternKind::Spiral, 50.0, 60.0), &white(), None);
        assert_eq!(
            spiral.get("d").map(str::to_string),
            Some(geometry::spiral_path(50.0, 60.0, 3.0, 10.0))
        );
        let wave = Pattern::new(PatternKind::Wave, 0.0, 100.0).with_attr("amplitude", num(0.0));
        let wave = repair(&wave, &white(), None);
        assert_eq!(
            wave.get("d").map(str::to_string),
            Some(geometry::wave_path(0.0, 100.0, 20.0, 0.02, 100.0))
        );
    }

    #[test]
    fn common_attributes_are_always_present() {
        for kind in [
            PatternKind::Circle,
            PatternKind::Rect,
            PatternKind::Line,
            PatternKind::Polygon,
            PatternKind::Path,
            PatternKind::Ellipse,
            PatternKind::Polyline,
            PatternKind::Arc,
            PatternKind::Spiral,
            PatternKind::Wave,
        ] {
            let out = repair(&Pattern::new(kind, 1.0, 1.0), &white(), None);
            for key in ["fill", "stroke", "stroke-width", "opacity", "filter"] {
                assert!(out.get(key).is_some(), "{kind:?} missing {key}");
            }
            assert_ne!(out.get("fill"), Some("#ffffff"));
            assert_ne!(out.get("stroke"), Some("#ffffff"));
        }
    }

    #[test]
    fn line_defaults_extend_from_the_anchor() {
        let out = repair(&Pattern::new(PatternKind::Line, 10.0, 20.0), &white(), None);
        assert_eq!(out.get("x2"), Some("60"));
        assert_eq!(out.get("y2"), Some("70"));
        assert_eq!(out.get("fill"), Some("none"));
        assert_eq!(out.get("stroke"), Some("#666666"));
    }

    #[test]
    fn explicit_filter_is_kept() {
        let pattern =
            Pattern::new(PatternKind::Circle, 0.0, 0.0).with_attr("filter", text("blur(3px)"));
        assert_eq!(repair(&pattern, &white(), None).get("filter"), Some("blur(3px)"));
        let plain = repair(&Pattern::new(PatternKind::Circle, 0.0, 0.0), &white(), None);
        assert_eq!(plain.get("filter"), Some("blur(1px)"));
    }

    #[test]
    fn opacity_is_clamped() {
        let pattern = Pattern::new(PatternKind::Circle, 0.0, 0.0).with_attr("opacity", num(4.0));
        assert_eq!(repair(&pattern, &white(), None).get("opacity"), Some("1"));
    }

    #[test]
    fn format_number_trims_zeros() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.333), "0.33");
        assert_eq!(format_number(-0.001), "0");
    }
}
