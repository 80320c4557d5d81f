//! Parametric path generation for the decorative pattern kinds that have no
//! direct SVG element.

use std::f32::consts::TAU;

pub type Point = (f32, f32);

/// Angle increment, in radians, between spiral samples.
pub const SPIRAL_STEP: f32 = 0.1;
/// Upper bound on samples per generated path; generator output is untrusted.
pub const MAX_PATH_POINTS: usize = 20_000;

/// Samples an Archimedean spiral. The first point is the center.
pub fn spiral_points(center_x: f32, center_y: f32, turns: f32, spacing: f32) -> Vec<Point> {
    let mut points = vec![(center_x, center_y)];
    let limit = turns * TAU;
    if !limit.is_finite() || limit < 0.0 || !spacing.is_finite() {
        return points;
    }
    let steps = ((limit / SPIRAL_STEP).floor() as usize).min(MAX_PATH_POINTS);
    for step in 0..=steps {
        let angle = step as f32 * SPIRAL_STEP;
        let r = spacing * angle;
        points.push((center_x + r * angle.cos(), center_y + r * angle.sin()));
    }
    points
}

pub fn spiral_path(center_x: f32, center_y: f32, turns: f32, spacing: f32) -> String {
    points_to_path(&spiral_points(center_x, center_y, turns, spacing))
}

/// Samples a sine wave at unit x steps. The first point is the start.
pub fn wave_points(
    start_x: f32,
    start_y: f32,
    amplitude: f32,
    frequency: f32,
    width: f32,
) -> Vec<Point> {
    let mut points = vec![(start_x, start_y)];
    if !width.is_finite() || width < 0.0 || !amplitude.is_finite() || !frequency.is_finite() {
        return points;
    }
    let steps = (width.floor() as usize).min(MAX_PATH_POINTS);
    for step in 0..=steps {
        let x = step as f32;
        points.push((start_x + x, start_y + amplitude * (x * frequency).sin()));
    }
    points
}

pub fn wave_path(start_x: f32, start_y: f32, amplitude: f32, frequency: f32, width: f32) -> String {
    points_to_path(&wave_points(start_x, start_y, amplitude, frequency, width))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpec {
    pub start: Point,
    pub end: Point,
    pub rx: f32,
    pub ry: f32,
    pub large_arc: bool,
    pub sweep: bool,
}

/// Single elliptical-arc path with flags written as `1`/`0`.
pub fn arc_path(arc: &ArcSpec) -> String {
    format!(
        "M {:.2} {:.2} A {:.2} {:.2} 0 {} {} {:.2} {:.2}",
        arc.start.0,
        arc.start.1,
        arc.rx,
        arc.ry,
        encode_flag(arc.large_arc),
        encode_flag(arc.sweep),
        arc.end.0,
        arc.end.1
    )
}

pub fn encode_flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

pub fn points_to_path(points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: Point, b: Point) -> f32 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn spiral_starts_at_center_and_grows_outward() {
        let points = spiral_points(100.0, 80.0, 3.0, 10.0);
        assert_eq!(points[0], (100.0, 80.0));
        // 3 turns at 0.1 rad per step: floor(18.849.. / 0.1) + 1 samples plus the center.
        assert_eq!(points.len(), 190);
        let radii: Vec<f32> = points.iter().map(|p| distance(*p, (100.0, 80.0))).collect();
        for pair in radii.windows(2) {
            assert!(pair[1] + 1e-3 >= pair[0], "radius shrank: {pair:?}");
        }
        let last = *points.last().unwrap();
        assert!((distance(last, (100.0, 80.0)) - 10.0 * 188.0 * SPIRAL_STEP).abs() < 0.05);
    }

    #[test]
    fn spiral_with_negative_turns_is_just_the_center() {
        assert_eq!(spiral_points(5.0, 5.0, -1.0, 10.0), vec![(5.0, 5.0)]);
        assert_eq!(spiral_path(5.0, 5.0, f32::NAN, 10.0), "M 5.00 5.00");
    }

    #[test]
    fn wave_samples_unit_steps() {
        let points = wave_points(10.0, 50.0, 20.0, 0.02, 100.0);
        assert_eq!(points.len(), 102);
        assert_eq!(points[0], (10.0, 50.0));
        assert_eq!(points[1], (10.0, 50.0));
        let (x, y) = points[51];
        assert_eq!(x, 60.0);
        assert!((y - (50.0 + 20.0 * (50.0f32 * 0.02).sin())).abs() < 1e-4);
    }

    #[test]
    fn oversized_inputs_are_capped() {
        assert!(spiral_points(0.0, 0.0, 1.0e9, 1.0).len() <= MAX_PATH_POINTS + 2);
        assert!(wave_points(0.0, 0.0, 1.0, 1.0, 1.0e12).len() <= MAX_PATH_POINTS + 2);
    }

    #[test]
    fn arc_path_encodes_flags() {
        let arc = ArcSpec {
            start: (10.0, 20.0),
            end: (60.0, 20.0),
            rx: 25.0,
            ry: 25.0,
            large_arc: true,
            sweep: false,
        };
        assert_eq!(
            arc_path(&arc),
            "M 10.00 20.00 A 25.00 25.00 0 1 0 60.00 20.00"
        );
    }

    #[test]
    fn points_to_path_empty() {
        assert_eq!(points_to_path(&[]), "");
        assert_eq!(points_to_path(&[(1.0, 2.0), (3.5, 4.0)]), "M 1.00 2.00 L 3.50 4.00");
    }
}
