use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*(?:,\s*[\d.]+\s*)?\)$").unwrap()
});
static NEAR_WHITE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#f[a-f]f[a-f]{3}$").unwrap());

const NAMED_COLORS: [(&str, &str); 21] = [
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("gray", "#808080"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("purple", "#800080"),
    ("orange", "#ffa500"),
    ("brown", "#a52a2a"),
    ("pink", "#ffc0cb"),
    ("gold", "#ffd700"),
    ("goldenrod", "#daa520"),
    ("silver", "#c0c0c0"),
    ("navy", "#000080"),
    ("darkblue", "#00008b"),
    ("darkred", "#8b0000"),
    ("darkgreen", "#006400"),
    ("darkgray", "#a9a9a9"),
    ("lightgray", "#d3d3d3"),
    ("transparent", "#ffffff"),
];

/// Palette for pie slices and charts without explicit series colors.
pub const CHART_COLORS: [&str; 15] = [
    "#4a90e2", "#50e3c2", "#f5a623", "#ffd93d", "#ff5a5f", "#bd10e0", "#7ed321", "#417505",
    "#4a4a4a", "#b8e986", "#9013fe", "#4a154b", "#ff6b6b", "#54c6eb", "#2e5bff",
];

/// A color in canonical `#rrggbb` form.
///
/// The only ways to obtain one are [`normalize`] and [`Color::from_rgb`], so
/// every `Color` in the pipeline is already safe to emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    pub fn black() -> Self {
        Self::from_rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::from_rgb(0xff, 0xff, 0xff)
    }

    /// Fallback for decorations when no usable primary color exists.
    pub fn mid_gray() -> Self {
        Self::from_rgb(0x66, 0x66, 0x66)
    }

    /// Forced text color when text and background are both near white.
    pub fn dark_gray() -> Self {
        Self::from_rgb(0x33, 0x33, 0x33)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or(0)
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }

    pub fn is_white(&self) -> bool {
        self.0 == "#ffffff"
    }

    /// Appends a two-digit hex alpha, e.g. `#4a90e215`.
    pub fn with_alpha_hex(&self, alpha: u8) -> String {
        format!("{}{alpha:02x}", self.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalizes any color string. Unparseable input becomes `#000000`.
pub fn normalize(input: &str) -> Color {
    let lowered = input.trim().to_ascii_lowercase();
    let hex = lowered.trim_start_matches('#');
    let had_hash = hex.len() != lowered.len();

    if is_hex_digits(hex, 3) {
        let bytes = hex.as_bytes();
        let expanded: String = bytes.iter().flat_map(|b| [*b as char, *b as char]).collect();
        return Color(format!("#{expanded}"));
    }
    if is_hex_digits(hex, 6) {
        return Color(format!("#{hex}"));
    }
    if had_hash {
        return Color::black();
    }

    if let Some((_, value)) = NAMED_COLORS.iter().find(|(name, _)| *name == lowered) {
        return Color((*value).to_string());
    }

    if let Some(caps) = RGB_RE.captures(&lowered) {
        let channel = |idx: usize| {
            caps.get(idx)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .map(|v| v.min(255) as u8)
                .unwrap_or(255)
        };
        return Color::from_rgb(channel(1), channel(2), channel(3));
    }

    Color::black()
}

fn is_hex_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// YIQ luminance test; exactly 128 counts as dark.
pub fn is_light(color: &Color) -> bool {
    let (r, g, b) = color.rgb();
    let weighted = r as u32 * 299 + g as u32 * 587 + b as u32 * 114;
    weighted > 128 * 1000
}

/// Darkens light colors by 100 per channel for icon and accent contrast.
pub fn darken(color: &Color) -> Color {
    if !is_light(color) {
        return color.clone();
    }
    let (r, g, b) = color.rgb();
    Color::from_rgb(r.saturating_sub(100), g.saturating_sub(100), b.saturating_sub(100))
}

/// `#ffffff` or anything shaped like `#fXfXXX` with high nibbles.
pub fn is_near_white(color: &Color) -> bool {
    color.is_white() || NEAR_WHITE_RE.is_match(color.as_str())
}

/// `"r, g, b"` for a 6-digit hex (with or without `#`), `"0, 0, 0"` otherwise.
pub fn rgb_triplet(hex: &str) -> String {
    let digits = hex.strip_prefix('#').unwrap_or(hex).to_ascii_lowercase();
    if !is_hex_digits(&digits, 6) {
        return "0, 0, 0".to_string();
    }
    let (r, g, b) = Color(format!("#{digits}")).rgb();
    format!("{r}, {g}, {b}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    /// Position along the gradient, 0.0..=1.0.
    pub offset: f32,
    pub color: Color,
    pub alpha: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gradient {
    pub angle_deg: f32,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn to_css(&self) -> String {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|stop| {
                format!(
                    "{} {}%",
                    stop.color.with_alpha_hex(stop.alpha),
                    (stop.offset * 100.0).round()
                )
            })
            .collect();
        format!("linear-gradient({}deg, {})", self.angle_deg, stops.join(", "))
    }
}

/// Diagonal wash of one hue at roughly 2%, 8% and 14% opacity.
pub fn background_gradient(color: &str) -> Gradient {
    let base = normalize(color);
    let stops = [(0.0, 0x05), (0.5, 0x15), (1.0, 0x25)]
        .into_iter()
        .map(|(offset, alpha)| GradientStop {
            offset,
            color: base.clone(),
            alpha,
        })
        .collect();
    Gradient {
        angle_deg: 135.0,
        stops,
    }
}
