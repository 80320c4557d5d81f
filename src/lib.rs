#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod pattern;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use error::{Error, Result};
pub use layout::{ChartConfig, ChartOptions, Quote, Scene};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ir::{CardDocument, ChartType};

#[derive(Debug, Clone, Default)]
pub struct CardOptions {
    /// Uniform serif 22px text regardless of the document's typography.
    pub fixed_format: bool,
    /// Seed for the theme icon pick; `None` draws from the thread RNG.
    pub seed: Option<u64>,
    pub config: Config,
}

pub fn build_scene(document: &CardDocument, quote: &Quote<'_>, options: &CardOptions) -> Scene {
    let card = &options.config.card;
    match options.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            layout::assemble_document(document, quote, options.fixed_format, card, &mut rng)
        }
        None => {
            let mut rng = rand::rng();
            layout::assemble_document(document, quote, options.fixed_format, card, &mut rng)
        }
    }
}

pub fn render_card(document: &CardDocument, quote: &Quote<'_>, options: &CardOptions) -> String {
    render::render_scene_svg(&build_scene(document, quote, options))
}

/// Parses a card document and renders it to SVG in one step.
pub fn render_card_svg(
    document_json: &str,
    quote: &Quote<'_>,
    options: &CardOptions,
) -> Result<String> {
    let document = parser::parse_card_document(document_json)?;
    Ok(render_card(&document, quote, options))
}

/// Parses a chart document and returns its planned configuration as JSON.
pub fn plan_chart_json(
    document_json: &str,
    options: &ChartOptions,
    config: &Config,
) -> Result<String> {
    let fallback_type = options.chart_type.unwrap_or(ChartType::Line);
    let document = parser::parse_chart_document(document_json, fallback_type)?;
    let plan = layout::plan_chart(&document, options, &config.chart);
    render::chart_config_json(&plan)
}
