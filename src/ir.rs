//! Validated document model. Everything here has already passed through the
//! boundary in `parser`; downstream code never touches raw JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::color::{Color, normalize};
use crate::theme::{CardTheme, FontFamily, FontSizeToken};

/// Body size for documents that carry no typography block.
const DOCUMENT_FONT_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Circle,
    Rect,
    Line,
    Polygon,
    Path,
    Ellipse,
    Polyline,
    Arc,
    Spiral,
    Wave,
}

impl PatternKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "circle" => Some(Self::Circle),
            "rect" => Some(Self::Rect),
            "line" => Some(Self::Line),
            "polygon" => Some(Self::Polygon),
            "path" => Some(Self::Path),
            "ellipse" => Some(Self::Ellipse),
            "polyline" => Some(Self::Polyline),
            "arc" => Some(Self::Arc),
            "spiral" => Some(Self::Spiral),
            "wave" => Some(Self::Wave),
            _ => None,
        }
    }

    /// Kinds drawn as an open stroke rather than a filled area.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            Self::Line | Self::Polyline | Self::Path | Self::Arc | Self::Spiral | Self::Wave
        )
    }
}

/// A scalar attribute as the generator sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f32),
    Text(String),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub x: f32,
    pub y: f32,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Pattern {
    pub fn new(kind: PatternKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: AttrValue) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    /// Numeric attribute; numeric strings count, non-finite values do not.
    pub fn number(&self, key: &str) -> Option<f32> {
        let value = match self.attributes.get(key)? {
            AttrValue::Number(n) => *n,
            AttrValue::Text(s) => s.trim().parse::<f32>().ok()?,
            AttrValue::Flag(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Numeric attribute where zero means "not provided".
    pub fn nonzero(&self, key: &str) -> Option<f32> {
        self.number(key).filter(|v| *v != 0.0)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key)? {
            AttrValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean-ish attribute: `true`, non-zero numbers, `"1"`, `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        match self.attributes.get(key) {
            Some(AttrValue::Flag(b)) => *b,
            Some(AttrValue::Number(n)) => *n != 0.0,
            Some(AttrValue::Text(s)) => matches!(s.trim(), "1" | "true"),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: FontFamily,
    pub font_size: f32,
    pub line_height: f32,
    pub text_color: Color,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: FontFamily::ElegantCn,
            font_size: 24.0,
            line_height: 1.5,
            text_color: Color::dark_gray(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneStyle {
    pub background_color: Color,
    /// `None` when the generator left it out; decorations then use mid gray.
    pub primary_color: Option<Color>,
    pub secondary_color: Color,
    pub patterns: Vec<Pattern>,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            background_color: Color::white(),
            primary_color: Some(normalize("#4a90e2")),
            secondary_color: normalize("#f5a623"),
            patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub primary: Color,
    pub secondary: Color,
    pub text_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDocument {
    pub theme: Option<CardTheme>,
    pub color_scheme: ColorScheme,
    pub icon_style: String,
    pub font_size: FontSizeToken,
    pub mood: String,
    pub emphasis: Vec<String>,
    pub font_family: FontFamily,
    pub svg_style: Option<SceneStyle>,
    pub typography: Option<Typography>,
    pub explanation: Option<String>,
}

impl CardDocument {
    /// Hand-authored document used when the generator call fails.
    pub fn fallback() -> Self {
        Self {
            theme: Some(CardTheme::Literary),
            color_scheme: ColorScheme {
                primary: normalize("#4a90e2"),
                secondary: normalize("#f5a623"),
                text_color: Color::dark_gray(),
            },
            icon_style: "feather".to_string(),
            font_size: FontSizeToken::Base,
            mood: "neutral".to_string(),
            emphasis: Vec::new(),
            font_family: FontFamily::SerifCn,
            svg_style: None,
            typography: None,
            explanation: None,
        }
    }

    /// Geometric-style fallback, the shape returned when the SVG analysis fails.
    pub fn geometric_fallback() -> Self {
        Self {
            theme: Some(CardTheme::Geometric),
            svg_style: Some(SceneStyle::default()),
            typography: Some(Typography::default()),
            explanation: Some("default geometric design".to_string()),
            ..Self::fallback()
        }
    }

    /// Explicit typography, or one built from the top-level font family and
    /// the color scheme's text color at 16px.
    pub fn typography_or_default(&self) -> Typography {
        self.typography.clone().unwrap_or_else(|| Typography {
            font_family: self.font_family,
            font_size: DOCUMENT_FONT_SIZE,
            text_color: self.color_scheme.text_color.clone(),
            ..Typography::default()
        })
    }

    /// The scene style to draw with. Documents without `svgStyle` get a
    /// plain white card tinted by their color scheme.
    pub fn scene_style_or_default(&self) -> SceneStyle {
        self.svg_style.clone().unwrap_or_else(|| SceneStyle {
            background_color: Color::white(),
            primary_color: Some(self.color_scheme.primary.clone()),
            secondary_color: self.color_scheme.secondary.clone(),
            patterns: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Pie,
    Scatter,
}

impl ChartType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "line" => Some(Self::Line),
            "bar" => Some(Self::Bar),
            "pie" => Some(Self::Pie),
            "scatter" => Some(Self::Scatter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: String,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: impl Into<String>, y: f64) -> Self {
        Self { x: x.into(), y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<DataPoint>,
}

impl Series {
    pub fn new(name: impl Into<String>, data: Vec<DataPoint>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().map(|p| p.y).filter(|y| y.is_finite())
    }

    /// `max - min` over finite values; 0 for an empty series.
    pub fn range(&self) -> f64 {
        let mut values = self.values();
        let Some(first) = values.next() else {
            return 0.0;
        };
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        max - min
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub series: Vec<Series>,
    pub title: Option<String>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStyle {
    pub theme: String,
    pub background_color: Color,
    pub primary_color: Color,
    pub secondary_colors: Vec<Color>,
    pub font_family: String,
    pub font_size: f32,
    pub show_legend: bool,
    pub show_grid: bool,
    pub animation: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            background_color: Color::white(),
            primary_color: normalize("#4a90e2"),
            secondary_colors: ["#f5a623", "#50e3c2", "#ff5a5f"]
                .iter()
                .map(|c| normalize(c))
                .collect(),
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            show_legend: true,
            show_grid: true,
            animation: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDocument {
    pub chart_type: ChartType,
    pub data: ChartData,
    pub style: ChartStyle,
    pub insights: Vec<String>,
}

impl ChartDocument {
    /// Hand-authored document used when the generator call fails.
    pub fn fallback(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            data: ChartData {
                series: Vec::new(),
                title: Some("Data chart".to_string()),
                x_axis_label: Some("X axis".to_string()),
                y_axis_label: Some("Y axis".to_string()),
            },
            style: ChartStyle::default(),
            insights: vec!["Data analysis failed".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AxisId {
    #[serde(rename = "y")]
    Primary,
    #[serde(rename = "y1")]
    Secondary,
}

/// Axis per series index. At most one entry is `Secondary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AxisAssignment(Vec<AxisId>);

impl AxisAssignment {
    pub fn all_primary(len: usize) -> Self {
        Self(vec![AxisId::Primary; len])
    }

    pub fn with_secondary(len: usize, index: usize) -> Self {
        let mut axes = vec![AxisId::Primary; len];
        if let Some(slot) = axes.get_mut(index) {
            *slot = AxisId::Secondary;
        }
        Self(axes)
    }

    pub fn axis(&self, index: usize) -> AxisId {
        self.0.get(index).copied().unwrap_or(AxisId::Primary)
    }

    pub fn secondary_index(&self) -> Option<usize> {
        self.0.iter().position(|axis| *axis == AxisId::Secondary)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AxisId> + '_ {
        self.0.iter().copied()
    }
}
