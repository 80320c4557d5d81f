use rand::Rng;
use serde::{Deserialize, Serialize};

/// Font labels the generator is allowed to pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    SerifCn,
    KaiCn,
    ElegantCn,
    SansSerif,
}

impl FontFamily {
    /// Unknown labels (including retired ones such as `modern-cn`) map to `serif-cn`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "kai-cn" => Self::KaiCn,
            "elegant-cn" => Self::ElegantCn,
            "sans-serif" | "sans-cn" => Self::SansSerif,
            _ => Self::SerifCn,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SerifCn => "serif-cn",
            Self::KaiCn => "kai-cn",
            Self::ElegantCn => "elegant-cn",
            Self::SansSerif => "sans-serif",
        }
    }

    pub fn css_stack(self) -> &'static str {
        match self {
            Self::SerifCn => "\"Noto Serif SC\", serif",
            Self::KaiCn => "\"LXGW WenKai\", cursive",
            Self::ElegantCn => "\"Source Han Serif CN\", \"Noto Serif SC\", serif",
            Self::SansSerif => "\"Noto Sans SC\", sans-serif",
        }
    }
}

/// Tailwind-style size tokens used by the legacy card document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontSizeToken {
    #[serde(rename = "sm")]
    Sm,
    #[default]
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "lg")]
    Lg,
    #[serde(rename = "xl")]
    Xl,
    #[serde(rename = "2xl")]
    Xxl,
}

impl FontSizeToken {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "sm" => Some(Self::Sm),
            "base" => Some(Self::Base),
            "lg" => Some(Self::Lg),
            "xl" => Some(Self::Xl),
            "2xl" => Some(Self::Xxl),
            _ => None,
        }
    }

    pub fn px(self) -> f32 {
        match self {
            Self::Sm => 14.0,
            Self::Base => 16.0,
            Self::Lg => 18.0,
            Self::Xl => 20.0,
            Self::Xxl => 24.0,
        }
    }

    /// One step down, bottoming out at `sm`.
    pub fn smaller(self) -> Self {
        match self {
            Self::Xxl => Self::Xl,
            Self::Xl => Self::Lg,
            Self::Lg => Self::Base,
            Self::Base | Self::Sm => Self::Sm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTheme {
    Scientific,
    Literary,
    Philosophical,
    Inspirational,
    Poetic,
    Artistic,
    Geometric,
    Minimalist,
    Constructivist,
    Bauhaus,
    Abstract,
}

impl CardTheme {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "scientific" => Some(Self::Scientific),
            "literary" => Some(Self::Literary),
            "philosophical" => Some(Self::Philosophical),
            "inspirational" => Some(Self::Inspirational),
            "poetic" => Some(Self::Poetic),
            "artistic" => Some(Self::Artistic),
            "geometric" => Some(Self::Geometric),
            "minimalist" => Some(Self::Minimalist),
            "constructivist" => Some(Self::Constructivist),
            "bauhaus" => Some(Self::Bauhaus),
            "abstract" => Some(Self::Abstract),
            _ => None,
        }
    }
}

const LITERARY_ICONS: &[&str] = &["book-open", "library", "scroll-text", "book", "feather", "pen"];
const PHILOSOPHICAL_ICONS: &[&str] = &["brain", "lightbulb", "infinity", "compass", "graduation-cap"];
const POETIC_ICONS: &[&str] = &["sparkles", "heart", "music", "flower", "wind", "cloud", "leaf"];
const SCIENTIFIC_ICONS: &[&str] = &["flask-conical", "atom", "microscope", "telescope"];
const INSPIRATIONAL_ICONS: &[&str] = &["star", "sun", "mountain", "trophy"];
const ARTISTIC_ICONS: &[&str] = &["palette", "brush", "pen-tool", "frame"];
const DEFAULT_ICONS: &[&str] = &["quote"];

pub fn icon_set(theme: Option<CardTheme>) -> &'static [&'static str] {
    match theme {
        Some(CardTheme::Literary) => LITERARY_ICONS,
        Some(CardTheme::Philosophical) => PHILOSOPHICAL_ICONS,
        Some(CardTheme::Poetic) => POETIC_ICONS,
        Some(CardTheme::Scientific) => SCIENTIFIC_ICONS,
        Some(CardTheme::Inspirational) => INSPIRATIONAL_ICONS,
        Some(CardTheme::Artistic) => ARTISTIC_ICONS,
        _ => DEFAULT_ICONS,
    }
}

/// Picks a decorative icon for the theme from the caller's random source.
pub fn choose_icon<R: Rng + ?Sized>(theme: Option<CardTheme>, rng: &mut R) -> &'static str {
    let set = icon_set(theme);
    set[rng.random_range(0..set.len())]
}
