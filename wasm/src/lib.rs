use quotecard_renderer::config::Config;
use quotecard_renderer::ir::ChartType;
use quotecard_renderer::{CardOptions, ChartOptions, Quote};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardRenderOptions {
    author: Option<String>,
    source: Option<String>,
    fixed_format: Option<bool>,
    seed: Option<u64>,
    width: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartPlanOptions {
    chart_type: Option<String>,
    begin_at_zero: Option<bool>,
    fill: Option<bool>,
}

fn parse_options<T>(raw: Option<String>) -> Result<T, JsValue>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match raw {
        Some(raw) => serde_json::from_str::<T>(&raw)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(T::default()),
    }
}

fn build_card_options(options: &CardRenderOptions) -> CardOptions {
    let mut config = Config::default();
    if let Some(width) = options.width {
        config.card.width = width.max(1.0);
    }
    CardOptions {
        fixed_format: options.fixed_format.unwrap_or(false),
        seed: options.seed,
        config,
    }
}

fn build_chart_options(options: &ChartPlanOptions) -> ChartOptions {
    ChartOptions {
        begin_at_zero: options.begin_at_zero.unwrap_or(false),
        fill: options.fill.unwrap_or(true),
        chart_type: options.chart_type.as_deref().and_then(ChartType::from_token),
    }
}

#[wasm_bindgen]
pub fn render_card_svg(
    text: &str,
    document_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options: CardRenderOptions = parse_options(options_json)?;
    let mut quote = Quote::new(text);
    if let Some(author) = options.author.as_deref() {
        quote = quote.with_author(author);
    }
    if let Some(source) = options.source.as_deref() {
        quote = quote.with_source(source);
    }
    quotecard_renderer::render_card_svg(document_json, &quote, &build_card_options(&options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn plan_chart_json(
    document_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options: ChartPlanOptions = parse_options(options_json)?;
    quotecard_renderer::plan_chart_json(
        document_json,
        &build_chart_options(&options),
        &Config::default(),
    )
    .map_err(|error| JsValue::from_str(&error.to_string()))
}
