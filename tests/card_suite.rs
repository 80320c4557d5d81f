use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use quotecard_renderer::layout::Background;
use quotecard_renderer::layout_dump::write_scene_dump;
use quotecard_renderer::parser::parse_card_document;
use quotecard_renderer::pattern::SvgElement;
use quotecard_renderer::render::render_scene_svg;
use quotecard_renderer::theme::{FontFamily, icon_set};
use quotecard_renderer::{CardOptions, Quote, build_scene};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture read failed")
}

fn seeded(seed: u64) -> CardOptions {
    CardOptions {
        seed: Some(seed),
        ..CardOptions::default()
    }
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{fixture}: missing </svg tag");
}

#[test]
fn geometric_card_end_to_end() {
    let document = parse_card_document(&fixture("card_geometric.json")).expect("parse failed");
    let text = fixture("quote_long.txt");
    let quote = Quote::new(&text).with_author("老子").with_source("道德经");
    let scene = build_scene(&document, &quote, &seeded(1));

    // 26px glyphs leave 17 per line: paragraphs of 20 and 28 chars become 2 + 2 lines.
    assert_eq!(scene.text.runs.len(), 4);
    assert_eq!(scene.text.line_height, 39.0);
    assert_eq!(scene.height, 356.0);
    assert_eq!(scene.typography.font_family, FontFamily::ElegantCn);

    let patterns = &scene.patterns.patterns;
    assert_eq!(patterns.len(), 6, "ellipse beyond the limit is dropped");
    let elements: Vec<SvgElement> = patterns.iter().map(|p| p.element).collect();
    assert_eq!(
        elements,
        vec![
            SvgElement::Circle,
            SvgElement::Rect,
            SvgElement::Polygon,
            SvgElement::Path,
            SvgElement::Path,
            SvgElement::Path,
        ]
    );
    assert_eq!(patterns[0].get("fill"), Some("#1e3a8a"));
    assert_eq!(patterns[0].get("stroke-width"), Some("2"));
    assert_eq!(patterns[1].get("height"), Some("60"));
    assert_eq!(patterns[1].get("fill"), Some("#1e3a8a"));
    assert_eq!(patterns[2].get("points"), Some("600,300,640,360,560,360"));
    assert_eq!(
        patterns[3].get("d"),
        Some("M 40.00 300.00 A 50.00 50.00 0 0 1 140.00 300.00")
    );
    assert!(patterns[4].get("d").unwrap().starts_with("M 520.00 260.00 L 520.00 260.00"));
    for pattern in patterns {
        assert_eq!(pattern.get("filter"), Some("blur(1px)"));
        assert_ne!(pattern.get("fill"), Some("#ffffff"));
    }

    let attribution = scene.attribution.as_ref().unwrap();
    assert_eq!(attribution.text, "—— 老子《道德经》");
    assert_eq!(attribution.y, 100.0 + 156.0 + 40.0);

    let svg = render_scene_svg(&scene);
    assert_valid_svg(&svg, "card_geometric.json");
    assert!(svg.contains("天下难事"));
}

#[test]
fn white_on_white_card_forces_dark_text() {
    let document = parse_card_document(&fixture("card_white_on_white.json")).unwrap();
    let style = document.svg_style.as_ref().unwrap();
    assert_eq!(style.patterns.len(), 1, "unknown pattern type is skipped");

    let scene = build_scene(&document, &Quote::new("留白"), &seeded(2));
    assert_eq!(scene.typography.text_color.as_str(), "#333333");
    // The white primary cannot stand in for a white fill on a white card.
    assert_eq!(scene.patterns.patterns[0].get("fill"), Some("#666666"));
    assert!(scene.attribution.is_none());
    assert!(scene.icon.is_none());

    let svg = render_scene_svg(&scene);
    assert!(svg.contains("fill=\"#333333\""));
}

#[test]
fn color_scheme_card_without_scene_style_forces_dark_text() {
    let document = parse_card_document(&fixture("card_scheme_only.json")).unwrap();
    assert!(document.svg_style.is_none());

    let scene = build_scene(&document, &Quote::new("道可道，非常道"), &seeded(1));
    assert_eq!(scene.typography.text_color.as_str(), "#333333");
    assert!(matches!(scene.background, Background::Solid { .. }));
    assert!(scene.patterns.patterns.is_empty());
    assert_eq!(scene.text.runs.len(), 1);
    assert_eq!(scene.height, 300.0);

    let svg = render_scene_svg(&scene);
    assert_valid_svg(&svg, "card_scheme_only.json");
    assert!(svg.contains("道可道，非常道"));
}

#[test]
fn source_only_attribution_has_no_dash() {
    let document = parse_card_document(&fixture("card_geometric.json")).unwrap();
    let scene = build_scene(&document, &Quote::new("学而时习之").with_source("论语"), &seeded(6));
    assert_eq!(scene.attribution.as_ref().map(|a| a.text.as_str()), Some("《论语》"));
}

#[test]
fn huge_numbers_still_render_a_finite_card() {
    let document = parse_card_document(
        r#"{
            "svgStyle": {"patterns": [{"type": "wave", "x": 1e300, "y": 1e300}]},
            "typography": {"fontSize": 1e300}
        }"#,
    )
    .unwrap();
    let scene = build_scene(&document, &Quote::new("一二三"), &seeded(8));
    assert!(scene.height.is_finite());
    assert!(scene.text.line_height.is_finite());

    let svg = render_scene_svg(&scene);
    assert_valid_svg(&svg, "inline huge numbers");
    assert!(!svg.contains("inf"), "non-finite value leaked into the SVG");
    assert!(!svg.contains("NaN"));
}

#[test]
fn legacy_card_from_fenced_relaxed_json() {
    let document = parse_card_document(&fixture("card_legacy.md")).expect("json5 fallback");
    assert!(document.svg_style.is_none());
    assert_eq!(document.emphasis, vec!["moon", "home"]);

    let quote = Quote::new("举头望明月，低头思故乡。").with_author("李白");
    let scene = build_scene(&document, &quote, &seeded(9));
    let Background::Gradient { base, gradient } = &scene.background else {
        panic!("legacy cards use the gradient wash");
    };
    assert_eq!(base.as_str(), "#f5f5dc");
    let alphas: Vec<u8> = gradient.stops.iter().map(|s| s.alpha).collect();
    assert_eq!(alphas, vec![0x05, 0x15, 0x25]);

    assert_eq!(scene.typography.font_family, FontFamily::KaiCn);
    assert_eq!(scene.typography.font_size, 24.0);
    assert_eq!(scene.attribution.as_ref().map(|a| a.font_size), Some(20.0));
    assert_eq!(scene.glyph.color.as_str(), "#919178");

    let icon = scene.icon.as_ref().unwrap();
    assert!(icon_set(document.theme).contains(&icon.name.as_str()));

    let svg = render_scene_svg(&scene);
    assert_valid_svg(&svg, "card_legacy.md");
    assert!(svg.contains("<linearGradient"));
    assert!(svg.contains(&format!("data-icon=\"{}\"", icon.name)));
}

#[test]
fn fixed_format_overrides_document_typography() {
    let document = parse_card_document(&fixture("card_geometric.json")).unwrap();
    let options = CardOptions {
        fixed_format: true,
        ..seeded(4)
    };
    let scene = build_scene(&document, &Quote::new("知行合一"), &options);
    assert_eq!(scene.typography.font_family, FontFamily::SerifCn);
    assert_eq!(scene.typography.font_size, 22.0);
    assert_eq!(scene.typography.line_height, 1.5);
    assert_eq!(scene.height, 300.0);
    assert_eq!(document.typography.as_ref().map(|t| t.font_size), Some(26.0));
}

#[test]
fn same_seed_same_svg() {
    let document = parse_card_document(&fixture("card_legacy.md")).unwrap();
    let quote = Quote::new("海内存知己").with_author("王勃");
    let first = render_scene_svg(&build_scene(&document, &quote, &seeded(77)));
    let second = render_scene_svg(&build_scene(&document, &quote, &seeded(77)));
    assert_eq!(first, second);
}

#[test]
fn scene_dump_is_written_as_json() {
    let document = parse_card_document(&fixture("card_geometric.json")).unwrap();
    let scene = build_scene(&document, &Quote::new("一").with_author("某"), &seeded(3));
    let dir = std::env::temp_dir().join(format!("qcr-dump-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scene.json");
    write_scene_dump(&path, &scene).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["width"], 672.0);
    assert_eq!(value["patterns"].as_array().map(Vec::len), Some(6));
    assert_eq!(value["lines"][0]["text"], "一");
    std::fs::remove_dir_all(&dir).ok();
}
