//! Turns a chart document into a render-ready chart configuration: series
//! clean-up, axis assignment, scale type and rounded axis bounds.

use serde::Serialize;
use tracing::{debug, warn};

use crate::color::{CHART_COLORS, Color, rgb_triplet};
use crate::config::ChartPlanConfig;
use crate::ir::{AxisAssignment, AxisId, ChartData, ChartDocument, ChartType, DataPoint, Series};

const HEADROOM: f64 = 1.1;
const PIE_BORDER: &str = "#ffffff";
const PIE_BORDER_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub begin_at_zero: bool,
    /// Fill the area under line series.
    pub fill: bool,
    pub chart_type: Option<ChartType>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            begin_at_zero: false,
            fill: true,
            chart_type: None,
        }
    }
}

/// Drops series that repeat an earlier name with the same number of points.
pub fn dedupe_series(series: Vec<Series>) -> Vec<Series> {
    let mut kept: Vec<Series> = Vec::with_capacity(series.len());
    for candidate in series {
        let duplicate = kept
            .iter()
            .any(|s| s.name == candidate.name && s.data.len() == candidate.data.len());
        if duplicate {
            debug!(name = %candidate.name, "dropping duplicate series");
        } else {
            kept.push(candidate);
        }
    }
    kept
}

/// Rebuilds the series when there are at least twice as many series as
/// points per series, which usually means rows and columns were swapped.
pub fn transpose_if_swapped(data: &mut ChartData) -> bool {
    let Some(first) = data.series.first() else {
        return false;
    };
    if first.data.is_empty() || data.series.len() < first.data.len() * 2 {
        return false;
    }
    warn!(
        series = data.series.len(),
        points = first.data.len(),
        "series look transposed, swapping rows and columns"
    );
    let transposed = first
        .data
        .iter()
        .enumerate()
        .map(|(idx, point)| {
            let column = data
                .series
                .iter()
                .map(|s| DataPoint::new(s.name.clone(), s.data.get(idx).map_or(0.0, |p| p.y)))
                .collect();
            Series::new(point.x.clone(), column)
        })
        .collect();
    data.series = transposed;
    std::mem::swap(&mut data.x_axis_label, &mut data.y_axis_label);
    true
}

pub fn assign_axes(
    series: &[Series],
    chart_type: ChartType,
    config: &ChartPlanConfig,
) -> AxisAssignment {
    if chart_type != ChartType::Line || series.len() < 2 {
        return AxisAssignment::all_primary(series.len());
    }
    let ranges: Vec<f64> = series.iter().map(Series::range).collect();
    let base = ranges.iter().copied().fold(0.0_f64, f64::max);
    let threshold = base / config.secondary_range_ratio;

    let mut pick: Option<(usize, f64)> = None;
    for (idx, range) in ranges.iter().copied().enumerate() {
        if range >= threshold {
            continue;
        }
        // Ties keep the earlier series.
        if pick.is_none_or(|(_, best)| range > best) {
            pick = Some((idx, range));
        }
    }

    match pick {
        Some((idx, range)) => {
            debug!(series = idx, range, base, "assigning secondary axis");
            AxisAssignment::with_secondary(series.len(), idx)
        }
        None => AxisAssignment::all_primary(series.len()),
    }
}

pub fn should_use_log(
    series: &[Series],
    assignment: &AxisAssignment,
    config: &ChartPlanConfig,
) -> bool {
    let positives = series
        .iter()
        .enumerate()
        .filter(|(idx, _)| assignment.axis(*idx) == AxisId::Primary)
        .flat_map(|(_, s)| s.values())
        .filter(|v| *v > 0.0);
    let mut bounds: Option<(f64, f64)> = None;
    for value in positives {
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        });
    }
    match bounds {
        Some((min, max)) => max / min > config.log_ratio_threshold,
        None => false,
    }
}

/// Rounded axis maximum with roughly 10% headroom. Empty input gives 0.
pub fn nice_max(values: &[f64]) -> f64 {
    let Some(max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .reduce(f64::max)
    else {
        return 0.0;
    };
    let padded = max * HEADROOM;
    let step = if padded >= 100_000.0 {
        5000.0
    } else if padded >= 10_000.0 {
        1000.0
    } else if padded >= 1000.0 {
        100.0
    } else if padded >= 100.0 {
        10.0
    } else if padded >= 10.0 {
        5.0
    } else {
        return max.ceil();
    };
    (padded / step).ceil() * step
}

/// Log axes label only exact powers of ten; every other tick is blank.
pub fn format_tick(value: f64, scale: ScaleType) -> String {
    if !value.is_finite() {
        return String::new();
    }
    match scale {
        ScaleType::Linear => value.to_string(),
        ScaleType::Logarithmic => {
            if value <= 0.0 {
                return String::new();
            }
            let exponent = value.log10().round();
            if (10f64.powf(exponent) - value).abs() <= value * 1e-12 {
                group_thousands(value)
            } else {
                String::new()
            }
        }
    }
}

fn group_thousands(value: f64) -> String {
    if value < 1.0 {
        return value.to_string();
    }
    let digits = format!("{:.0}", value);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// `12 (34.5%)` for pie slices.
pub fn pie_label(value: f64, total: f64) -> String {
    let percentage = if total > 0.0 {
        format!("{:.1}", value / total * 100.0)
    } else {
        "0.0".to_string()
    };
    format!("{value} ({percentage}%)")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Paint {
    Solid { color: String },
    /// One color per data point.
    Palette { colors: Vec<String> },
    /// Vertical wash under a line, top to bottom.
    AreaGradient { top: String, bottom: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "yAxisID", skip_serializing_if = "Option::is_none")]
    pub y_axis_id: Option<AxisId>,
    pub background: Paint,
    pub border_color: String,
    pub border_width: f32,
    pub fill: bool,
    pub tension: f32,
    pub point_radius: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTitle {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(rename = "type")]
    pub scale_type: ScaleType,
    pub position: &'static str,
    pub begin_at_zero: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub show_grid: bool,
    pub title: AxisTitle,
}

impl Scale {
    pub fn tick_label(&self, value: f64) -> String {
        format_tick(value, self.scale_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Scale,
    pub y: Scale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y1: Option<Scale>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
    pub axes: AxisAssignment,
    pub background_color: Color,
    pub font_family: String,
    pub font_size: f32,
    pub show_legend: bool,
    pub animation: bool,
    pub insights: Vec<String>,
}

pub fn plan_chart(
    document: &ChartDocument,
    options: &ChartOptions,
    config: &ChartPlanConfig,
) -> ChartConfig {
    let chart_type = options.chart_type.unwrap_or(document.chart_type);
    let mut data = document.data.clone();
    data.series = dedupe_series(data.series);
    transpose_if_swapped(&mut data);

    let style = &document.style;
    let series_color = |idx: usize| -> String {
        style
            .secondary_colors
            .get(idx)
            .unwrap_or(&style.primary_color)
            .to_string()
    };

    let axes = assign_axes(&data.series, chart_type, config);
    let labels = data
        .series
        .first()
        .map(|s| s.data.iter().map(|p| p.x.clone()).collect())
        .unwrap_or_default();

    let datasets = if chart_type == ChartType::Pie {
        data.series
            .first()
            .map(|first| vec![pie_dataset(first)])
            .unwrap_or_default()
    } else {
        data.series
            .iter()
            .enumerate()
            .map(|(idx, series)| {
                let color = series_color(idx);
                let values: Vec<f64> = series.data.iter().map(|p| p.y).collect();
                let is_line = chart_type == ChartType::Line;
                let background = if is_line {
                    let rgb = rgb_triplet(&color);
                    Paint::AreaGradient {
                        top: format!("rgba({rgb}, 0.2)"),
                        bottom: format!("rgba({rgb}, 0.0)"),
                    }
                } else {
                    Paint::Solid {
                        color: color.clone(),
                    }
                };
                Dataset {
                    label: series.name.clone(),
                    data_labels: if is_line {
                        values.iter().map(|v| v.to_string()).collect()
                    } else {
                        Vec::new()
                    },
                    data: values,
                    y_axis_id: Some(axes.axis(idx)),
                    background,
                    border_color: color,
                    border_width: config.border_width,
                    fill: is_line && options.fill,
                    tension: config.tension,
                    point_radius: config.point_radius,
                }
            })
            .collect()
    };

    let scales = (chart_type != ChartType::Pie)
        .then(|| plan_scales(&data, &axes, &datasets, document, options, config));

    ChartConfig {
        chart_type,
        title: data.title.clone(),
        labels,
        datasets,
        scales,
        axes,
        background_color: style.background_color.clone(),
        font_family: style.font_family.clone(),
        font_size: style.font_size,
        show_legend: style.show_legend,
        animation: style.animation,
        insights: document.insights.clone(),
    }
}

fn pie_dataset(series: &Series) -> Dataset {
    let values: Vec<f64> = series.data.iter().map(|p| p.y).collect();
    let total: f64 = values.iter().filter(|v| v.is_finite()).sum();
    let colors = (0..values.len())
        .map(|idx| CHART_COLORS[idx % CHART_COLORS.len()].to_string())
        .collect();
    Dataset {
        label: series.name.clone(),
        data_labels: values.iter().map(|v| pie_label(*v, total)).collect(),
        data: values,
        y_axis_id: None,
        background: Paint::Palette { colors },
        border_color: PIE_BORDER.to_string(),
        border_width: PIE_BORDER_WIDTH,
        fill: false,
        tension: 0.0,
        point_radius: 0.0,
    }
}

fn plan_scales(
    data: &ChartData,
    axes: &AxisAssignment,
    datasets: &[Dataset],
    document: &ChartDocument,
    options: &ChartOptions,
    config: &ChartPlanConfig,
) -> Scales {
    let style = &document.style;
    let values_on = |axis: AxisId| -> Vec<f64> {
        datasets
            .iter()
            .filter(|d| d.y_axis_id == Some(axis))
            .flat_map(|d| d.data.iter().copied())
            .collect()
    };
    let primary_values = values_on(AxisId::Primary);
    let secondary_values = values_on(AxisId::Secondary);
    let primary_max = nice_max(&primary_values);
    let secondary_max = nice_max(&secondary_values);

    let scale_type = if should_use_log(&data.series, axes, config) {
        ScaleType::Logarithmic
    } else {
        ScaleType::Linear
    };
    let min = options.begin_at_zero.then_some(0.0);
    let secondary_index = axes.secondary_index();

    let primary_title = match secondary_index {
        Some(_) => data
            .series
            .iter()
            .enumerate()
            .find(|(idx, _)| axes.axis(*idx) == AxisId::Primary)
            .map(|(_, s)| s.name.clone())
            .unwrap_or_else(|| "Y axis".to_string()),
        None => data
            .y_axis_label
            .clone()
            .or_else(|| data.series.first().map(|s| s.name.clone()))
            .unwrap_or_default(),
    };

    let y1 = (secondary_max > 0.0).then(|| Scale {
        scale_type: ScaleType::Linear,
        position: "right",
        begin_at_zero: options.begin_at_zero,
        min,
        max: Some(secondary_max),
        show_grid: false,
        title: AxisTitle {
            text: secondary_index
                .and_then(|idx| data.series.get(idx))
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Y1 axis".to_string()),
            color: style.secondary_colors.get(2).map(Color::to_string),
        },
    });

    Scales {
        x: Scale {
            scale_type: ScaleType::Linear,
            position: "bottom",
            begin_at_zero: false,
            min: None,
            max: None,
            show_grid: style.show_grid,
            title: AxisTitle {
                text: data.x_axis_label.clone().unwrap_or_default(),
                color: None,
            },
        },
        y: Scale {
            scale_type,
            position: "left",
            begin_at_zero: options.begin_at_zero,
            min,
            max: Some(primary_max),
            show_grid: style.show_grid,
            title: AxisTitle {
                text: primary_title,
                color: None,
            },
        },
        y1,
    }
}
