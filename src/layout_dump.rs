use crate::error::Result;
use crate::layout::{Background, Scene};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub text_color: String,
    pub lines: Vec<LineDump>,
    pub patterns: Vec<PatternDump>,
    pub attribution: Option<LineDump>,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LineDump {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct PatternDump {
    pub kind: String,
    pub element: String,
    pub attributes: BTreeMap<String, String>,
}

impl SceneDump {
    pub fn from_scene(scene: &Scene) -> Self {
        let background = match &scene.background {
            Background::Solid { color } => color.to_string(),
            Background::Gradient { gradient, .. } => gradient.to_css(),
        };

        let lines = scene
            .text
            .runs
            .iter()
            .map(|run| LineDump {
                text: run.text.clone(),
                x: run.x,
                y: run.y,
            })
            .collect();

        let patterns = scene
            .patterns
            .patterns
            .iter()
            .map(|pattern| PatternDump {
                kind: format!("{:?}", pattern.kind).to_lowercase(),
                element: pattern.element.tag().to_string(),
                attributes: pattern.attributes.iter().cloned().collect(),
            })
            .collect();

        SceneDump {
            width: scene.width,
            height: scene.height,
            background,
            font_family: scene.typography.font_family.label().to_string(),
            font_size: scene.typography.font_size,
            line_height: scene.text.line_height,
            text_color: scene.typography.text_color.to_string(),
            lines,
            patterns,
            attribution: scene.attribution.as_ref().map(|a| LineDump {
                text: a.text.clone(),
                x: a.x,
                y: a.y,
            }),
            icon: scene.icon.as_ref().map(|icon| icon.name.clone()),
        }
    }
}

pub fn write_scene_dump(path: &Path, scene: &Scene) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
