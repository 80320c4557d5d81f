use crate::error::Result;
use crate::layout::chart::ChartConfig;
use crate::layout::{Background, IconPlacement, QuoteGlyph, Scene};
use crate::pattern::{RenderablePattern, format_number};
use std::path::Path;

const BACKGROUND_GRADIENT_ID: &str = "card-background";

// Lucide "quote" outline, drawn in a 24x24 box.
const QUOTE_GLYPH_PATHS: [&str; 2] = [
    "M3 21c3 0 7-1 7-8V5c0-1.25-.756-2.017-2-2H4c-1.25 0-2 .75-2 1.972V11c0 1.25.75 2 2 2 1 0 1 0 1 1v1c0 1-1 2-2 2s-1 .008-1 1.031V20c0 1 0 1 1 1z",
    "M15 21c3 0 7-1 7-8V5c0-1.25-.757-2.017-2-2h-4c-1.25 0-2 .75-2 1.972V11c0 1.25.75 2 2 2h.75c0 2.25.25 4-2.75 4v3c0 1 0 1 1 1z",
];

pub fn render_scene_svg(scene: &Scene) -> String {
    let mut svg = String::new();
    let width = scene.width;
    let height = scene.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    match &scene.background {
        Background::Solid { color } => {
            svg.push_str(&format!(
                "<rect width=\"100%\" height=\"100%\" fill=\"{color}\"/>"
            ));
        }
        Background::Gradient { gradient, .. } => {
            svg.push_str("<defs>");
            svg.push_str(&format!(
                "<linearGradient id=\"{BACKGROUND_GRADIENT_ID}\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\">"
            ));
            for stop in &gradient.stops {
                svg.push_str(&format!(
                    "<stop offset=\"{}%\" stop-color=\"{}\" stop-opacity=\"{:.3}\"/>",
                    (stop.offset * 100.0).round(),
                    stop.color,
                    stop.alpha as f32 / 255.0
                ));
            }
            svg.push_str("</linearGradient></defs>");
            svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>");
            svg.push_str(&format!(
                "<rect width=\"100%\" height=\"100%\" fill=\"url(#{BACKGROUND_GRADIENT_ID})\"/>"
            ));
        }
    }

    if !scene.patterns.patterns.is_empty() {
        svg.push_str(&format!(
            "<g class=\"patterns\" opacity=\"{}\">",
            format_number(scene.patterns.opacity)
        ));
        for pattern in &scene.patterns.patterns {
            svg.push_str(&pattern_svg(pattern));
        }
        svg.push_str("</g>");
    }

    if let Some(overlay) = &scene.overlay {
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\" opacity=\"{}\"/>",
            overlay.color,
            format_number(overlay.opacity)
        ));
    }

    svg.push_str(&glyph_svg(&scene.glyph));

    let typography = &scene.typography;
    svg.push_str(&format!(
        "<text font-family=\"{}\" font-size=\"{}\" fill=\"{}\" letter-spacing=\"{}em\">",
        escape_xml(typography.font_family.css_stack()),
        format_number(typography.font_size),
        typography.text_color,
        format_number(scene.text.letter_spacing_em)
    ));
    for run in &scene.text.runs {
        svg.push_str(&format!(
            "<tspan x=\"{:.2}\" y=\"{:.2}\">{}</tspan>",
            run.x,
            run.y,
            escape_xml(&run.text)
        ));
    }
    svg.push_str("</text>");

    if let Some(attribution) = &scene.attribution {
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            attribution.x,
            attribution.y,
            escape_xml(typography.font_family.css_stack()),
            format_number(attribution.font_size),
            typography.text_color,
            escape_xml(&attribution.text)
        ));
    }

    if let Some(icon) = &scene.icon {
        svg.push_str(&icon_svg(icon));
    }

    svg.push_str("</svg>");
    svg
}

fn pattern_svg(pattern: &RenderablePattern) -> String {
    let mut element = format!("<{}", pattern.element.tag());
    for (name, value) in &pattern.attributes {
        element.push_str(&format!(" {name}=\"{}\"", escape_xml(value)));
    }
    element.push_str("/>");
    element
}

fn glyph_svg(glyph: &QuoteGlyph) -> String {
    let scale = glyph.size / 24.0;
    let half = glyph.size / 2.0;
    let mut out = format!(
        "<g class=\"quote-glyph\" transform=\"translate({:.2} {:.2}) rotate({} {:.2} {:.2}) scale({:.4})\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-linecap=\"round\" stroke-linejoin=\"round\">",
        glyph.x,
        glyph.y,
        format_number(glyph.rotation_deg),
        half,
        half,
        scale,
        glyph.color
    );
    for d in QUOTE_GLYPH_PATHS {
        out.push_str(&format!("<path d=\"{d}\"/>"));
    }
    out.push_str("</g>");
    out
}

/// Placeholder mark tagged with the icon name; the host swaps in the real glyph.
fn icon_svg(icon: &IconPlacement) -> String {
    let half = icon.size / 2.0;
    format!(
        "<g class=\"theme-icon\" data-icon=\"{}\" transform=\"translate({:.2} {:.2})\"><rect width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/></g>",
        escape_xml(&icon.name),
        icon.x,
        icon.y,
        icon.size,
        icon.size,
        half / 2.0,
        icon.color
    )
}

pub fn chart_config_json(config: &ChartConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
