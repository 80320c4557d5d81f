pub mod card;
pub mod chart;
pub mod text;
pub mod types;

pub use card::{Quote, assemble, assemble_document, resolve_typography};
pub use chart::{ChartConfig, ChartOptions, plan_chart};
pub use text::{TextFlow, layout_text};
pub use types::*;
