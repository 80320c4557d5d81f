//! Boundary between generator output and the typed document model.
//!
//! Generators emit relaxed JSON often wrapped in markdown fences, so text is
//! parsed strictly first and through json5 second. Everything after that is a
//! walk over `serde_json::Value` that defaults what is missing and only fails
//! when a structural field is absent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::color::{Color, normalize};
use crate::error::{Error, Result};
use crate::ir::{
    AttrValue, CardDocument, ChartData, ChartDocument, ChartStyle, ChartType, ColorScheme,
    DataPoint, Pattern, PatternKind, SceneStyle, Series, Typography,
};
use crate::theme::{CardTheme, FontFamily, FontSizeToken};

/// Upper bound for document font sizes.
const MAX_FONT_SIZE: f32 = 200.0;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$").unwrap());

/// Parses generator text into a JSON value.
pub fn parse_json(input: &str) -> Result<Value> {
    let body = strip_code_fence(input);
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(value),
        Err(strict) => json5::from_str::<Value>(body).map_err(|relaxed| {
            debug!(%strict, %relaxed, "document rejected by both json parsers");
            Error::parse(strict.to_string())
        }),
    }
}

pub fn strip_code_fence(input: &str) -> &str {
    match FENCE_RE.captures(input).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str(),
        None => input.trim(),
    }
}

pub fn parse_card_document(input: &str) -> Result<CardDocument> {
    card_document_from_value(&parse_json(input)?)
}

pub fn parse_chart_document(input: &str, fallback_type: ChartType) -> Result<ChartDocument> {
    chart_document_from_value(&parse_json(input)?, fallback_type)
}

pub fn card_document_from_value(value: &Value) -> Result<CardDocument> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::config("card document must be a JSON object"))?;
    let fallback = CardDocument::fallback();

    let color_scheme = obj
        .get("colorScheme")
        .and_then(Value::as_object)
        .map(|scheme| ColorScheme {
            primary: color_field(scheme, "primary")
                .unwrap_or_else(|| fallback.color_scheme.primary.clone()),
            secondary: color_field(scheme, "secondary")
                .unwrap_or_else(|| fallback.color_scheme.secondary.clone()),
            text_color: color_field(scheme, "textColor")
                .unwrap_or_else(|| fallback.color_scheme.text_color.clone()),
        })
        .unwrap_or_else(|| fallback.color_scheme.clone());

    let font_family = str_field(obj, "fontFamily")
        .map(FontFamily::from_label)
        .unwrap_or(fallback.font_family);

    Ok(CardDocument {
        theme: str_field(obj, "theme").and_then(CardTheme::from_token),
        color_scheme,
        icon_style: str_field(obj, "iconStyle")
            .map(str::to_string)
            .unwrap_or(fallback.icon_style),
        font_size: str_field(obj, "fontSize")
            .and_then(FontSizeToken::from_token)
            .unwrap_or(fallback.font_size),
        mood: str_field(obj, "mood")
            .map(str::to_string)
            .unwrap_or(fallback.mood),
        emphasis: string_list(obj.get("emphasis")),
        font_family,
        svg_style: obj
            .get("svgStyle")
            .and_then(Value::as_object)
            .map(scene_style_from_map),
        typography: obj
            .get("typography")
            .and_then(Value::as_object)
            .map(typography_from_map),
        explanation: str_field(obj, "explanation").map(str::to_string),
    })
}

fn scene_style_from_map(obj: &Map<String, Value>) -> SceneStyle {
    let defaults = SceneStyle::default();
    let patterns = match obj.get("patterns") {
        Some(Value::Array(items)) => items.iter().filter_map(pattern_from_value).collect(),
        _ => Vec::new(),
    };
    SceneStyle {
        background_color: color_field(obj, "backgroundColor")
            .unwrap_or(defaults.background_color),
        primary_color: color_field(obj, "primaryColor"),
        secondary_color: color_field(obj, "secondaryColor").unwrap_or(defaults.secondary_color),
        patterns,
    }
}

fn typography_from_map(obj: &Map<String, Value>) -> Typography {
    let defaults = Typography::default();
    Typography {
        font_family: str_field(obj, "fontFamily")
            .map(FontFamily::from_label)
            .unwrap_or(defaults.font_family),
        font_size: f32_field(obj, "fontSize")
            .filter(|v| *v > 0.0)
            .map(|v| v.min(MAX_FONT_SIZE))
            .unwrap_or(defaults.font_size),
        line_height: f32_field(obj, "lineHeight")
            .filter(|v| *v > 0.0)
            .unwrap_or(defaults.line_height),
        text_color: color_field(obj, "textColor").unwrap_or(defaults.text_color),
    }
}

/// Patterns with an unknown or missing `type` are skipped, never an error.
fn pattern_from_value(value: &Value) -> Option<Pattern> {
    let obj = value.as_object()?;
    let raw_kind = str_field(obj, "type").unwrap_or_default();
    let Some(kind) = PatternKind::from_token(raw_kind) else {
        debug!(kind = raw_kind, "skipping pattern with unknown type");
        return None;
    };
    let x = f32_field(obj, "x").unwrap_or(0.0);
    let y = f32_field(obj, "y").unwrap_or(0.0);
    let mut pattern = Pattern::new(kind, x, y);
    if let Some(Value::Object(attrs)) = obj.get("attributes") {
        for (key, raw) in attrs {
            if let Some(attr) = attr_value(raw) {
                pattern.attributes.insert(key.clone(), attr);
            }
        }
    }
    Some(pattern)
}

fn attr_value(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|v| v as f32)
            .filter(|v| v.is_finite())
            .map(AttrValue::Number),
        Value::String(s) => Some(AttrValue::Text(s.clone())),
        Value::Bool(b) => Some(AttrValue::Flag(*b)),
        _ => None,
    }
}

pub fn chart_document_from_value(value: &Value, fallback_type: ChartType) -> Result<ChartDocument> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::config("chart document must be a JSON object"))?;
    let data = obj
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::config("chart document has no `data` object"))?;
    let raw_series = data
        .get("series")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::config("chart data has no `series` array"))?;

    let series = raw_series
        .iter()
        .enumerate()
        .map(|(idx, raw)| series_from_value(idx, raw))
        .collect();

    let chart_type = str_field(obj, "chartType")
        .and_then(ChartType::from_token)
        .unwrap_or(fallback_type);

    Ok(ChartDocument {
        chart_type,
        data: ChartData {
            series,
            title: str_field(data, "title").map(str::to_string),
            x_axis_label: str_field(data, "xAxisLabel").map(str::to_string),
            y_axis_label: str_field(data, "yAxisLabel").map(str::to_string),
        },
        style: obj
            .get("style")
            .and_then(Value::as_object)
            .map(chart_style_from_map)
            .unwrap_or_default(),
        insights: string_list(obj.get("insights")),
    })
}

fn series_from_value(idx: usize, value: &Value) -> Series {
    let default_name = format!("Series {}", idx + 1);
    let Some(obj) = value.as_object() else {
        return Series::new(default_name, Vec::new());
    };
    let data = match obj.get("data") {
        Some(Value::Array(points)) => points.iter().filter_map(data_point_from_value).collect(),
        _ => Vec::new(),
    };
    let name = str_field(obj, "name")
        .map(str::to_string)
        .unwrap_or(default_name);
    Series::new(name, data)
}

/// Missing `y` reads as 0; a point without any usable `x` is dropped.
fn data_point_from_value(value: &Value) -> Option<DataPoint> {
    let obj = value.as_object()?;
    let x = match obj.get("x")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    let y = number_field(obj, "y").unwrap_or(0.0);
    Some(DataPoint::new(x, y))
}

fn chart_style_from_map(obj: &Map<String, Value>) -> ChartStyle {
    let defaults = ChartStyle::default();
    let secondary_colors = match obj.get("secondaryColors") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(normalize)
            .collect(),
        _ => defaults.secondary_colors,
    };
    ChartStyle {
        theme: str_field(obj, "theme")
            .map(str::to_string)
            .unwrap_or(defaults.theme),
        background_color: color_field(obj, "backgroundColor").unwrap_or(defaults.background_color),
        primary_color: color_field(obj, "primaryColor").unwrap_or(defaults.primary_color),
        secondary_colors,
        font_family: str_field(obj, "fontFamily")
            .map(str::to_string)
            .unwrap_or(defaults.font_family),
        font_size: f32_field(obj, "fontSize")
            .filter(|v| *v > 0.0)
            .map(|v| v.min(MAX_FONT_SIZE))
            .unwrap_or(defaults.font_size),
        show_legend: bool_field(obj, "showLegend").unwrap_or(defaults.show_legend),
        show_grid: bool_field(obj, "showGrid").unwrap_or(defaults.show_grid),
        animation: bool_field(obj, "animation").unwrap_or(defaults.animation),
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn color_field(obj: &Map<String, Value>, key: &str) -> Option<Color> {
    str_field(obj, key).map(normalize)
}

/// Numbers, or strings that parse as numbers.
fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match obj.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// `number_field` narrowed to f32; values beyond f32 range read as missing.
fn f32_field(obj: &Map<String, Value>, key: &str) -> Option<f32> {
    number_field(obj, key)
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        let input = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(input), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn relaxed_json_is_accepted() {
        let value = parse_json("{theme: 'poetic', emphasis: ['a',], // note\n}").unwrap();
        assert_eq!(value["theme"], "poetic");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_json("not json at all {").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn card_document_defaults_missing_fields() {
        let doc = parse_card_document("{}").unwrap();
        let fallback = CardDocument::fallback();
        assert_eq!(doc.color_scheme, fallback.color_scheme);
        assert_eq!(doc.font_size, FontSizeToken::Base);
        assert!(doc.svg_style.is_none());
        assert!(doc.theme.is_none());
    }

    #[test]
    fn card_document_reads_scene_style() {
        let doc = parse_card_document(
            r##"{
                "theme": "geometric",
                "svgStyle": {
                    "backgroundColor": "WHITE",
                    "primaryColor": "rgb(74, 144, 226)",
                    "patterns": [
                        {"type": "rect", "x": "10", "y": 20, "attributes": {"width": 30, "fill": "#fff"}},
                        {"type": "hexagon", "x": 0, "y": 0},
                        {"type": "arc", "x": 0, "y": 0, "attributes": {"largearc": true}}
                    ]
                },
                "typography": {"fontFamily": "kai-cn", "fontSize": "28", "textColor": "#FFF"}
            }"##,
        )
        .unwrap();
        let style = doc.svg_style.unwrap();
        assert_eq!(style.background_color.as_str(), "#ffffff");
        assert_eq!(style.primary_color.unwrap().as_str(), "#4a90e2");
        assert_eq!(style.patterns.len(), 2);
        assert_eq!(style.patterns[0].kind, PatternKind::Rect);
        assert_eq!(style.patterns[0].x, 10.0);
        assert_eq!(style.patterns[1].attributes["largearc"], AttrValue::Flag(true));

        let typography = doc.typography.unwrap();
        assert_eq!(typography.font_family, FontFamily::KaiCn);
        assert_eq!(typography.font_size, 28.0);
        assert_eq!(typography.line_height, 1.5);
        assert_eq!(typography.text_color.as_str(), "#ffffff");
    }

    #[test]
    fn out_of_range_numbers_never_become_infinite() {
        let doc = parse_card_document(
            r#"{
                "svgStyle": {"patterns": [
                    {"type": "circle", "x": 1e300, "y": -1e300, "attributes": {"r": 1e300, "cx": 5}}
                ]},
                "typography": {"fontSize": 1e300, "lineHeight": "1e300"}
            }"#,
        )
        .unwrap();
        let typography = doc.typography.unwrap();
        assert_eq!(typography.font_size, Typography::default().font_size);
        assert_eq!(typography.line_height, Typography::default().line_height);

        let pattern = &doc.svg_style.unwrap().patterns[0];
        assert_eq!((pattern.x, pattern.y), (0.0, 0.0));
        assert!(!pattern.attributes.contains_key("r"));
        assert_eq!(pattern.number("cx"), Some(5.0));
    }

    #[test]
    fn oversized_font_is_clamped() {
        let doc = parse_card_document(r#"{"typography": {"fontSize": 5000}}"#).unwrap();
        assert_eq!(doc.typography.unwrap().font_size, MAX_FONT_SIZE);
    }

    #[test]
    fn missing_primary_color_stays_absent() {
        let doc = parse_card_document(r#"{"svgStyle": {"primaryColor": "  "}}"#).unwrap();
        assert!(doc.svg_style.unwrap().primary_color.is_none());
    }

    #[test]
    fn card_document_must_be_an_object() {
        let err = parse_card_document("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn chart_document_requires_series() {
        let err = parse_chart_document(r#"{"data": {}}"#, ChartType::Line).unwrap_err();
        assert!(err.to_string().starts_with("configuration error:"));
        let err = parse_chart_document(r#"{"chartType": "bar"}"#, ChartType::Line).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn chart_points_accept_numeric_x_and_missing_y() {
        let doc = parse_chart_document(
            r#"{"chartType": "scatter", "data": {"series": [
                {"name": "A", "data": [{"x": 2020, "y": "5"}, {"x": "2021"}, {"y": 3}]},
                {"data": []}
            ]}}"#,
            ChartType::Line,
        )
        .unwrap();
        assert_eq!(doc.chart_type, ChartType::Scatter);
        let first = &doc.data.series[0];
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.data[0], DataPoint::new("2020", 5.0));
        assert_eq!(first.data[1], DataPoint::new("2021", 0.0));
        assert_eq!(doc.data.series[1].name, "Series 2");
        assert_eq!(doc.style, ChartStyle::default());
    }

    #[test]
    fn unknown_chart_type_uses_the_fallback() {
        let doc = parse_chart_document(
            r#"{"chartType": "radar", "data": {"series": []}, "style": {"secondaryColors": ["red"]}}"#,
            ChartType::Bar,
        )
        .unwrap();
        assert_eq!(doc.chart_type, ChartType::Bar);
        assert_eq!(doc.style.secondary_colors, vec![normalize("#ff0000")]);
    }
}
