//! Geometry for the dashboard's SVG bar and line charts.
//!
//! Both charts draw into a 300×200 viewBox and scale linearly against the
//! largest value, with the denominator floored at 1.

pub const VIEW_WIDTH: f64 = 300.0;
pub const VIEW_HEIGHT: f64 = 200.0;

const BAR_AREA_WIDTH: f64 = 280.0;
const BAR_GAP: f64 = 5.0;
const BAR_MAX_HEIGHT: f64 = 160.0;
const BAR_BASELINE: f64 = 180.0;
const BAR_LEFT: f64 = 10.0;
const LABEL_CHARS: usize = 6;

const LINE_LEFT: f64 = 20.0;
const LINE_SPAN: f64 = 260.0;
const LINE_BASELINE: f64 = 160.0;
const LINE_MAX_HEIGHT: f64 = 140.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bar {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

pub fn bar_layout(data: &[(String, usize)]) -> Vec<Bar> {
    if data.is_empty() {
        return Vec::new();
    }
    let max = data.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1) as f64;
    let width = BAR_AREA_WIDTH / data.len() as f64 - BAR_GAP;

    data.iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let height = *value as f64 / max * BAR_MAX_HEIGHT;
            let x = i as f64 * (width + BAR_GAP) + BAR_LEFT;
            Bar {
                label: label.chars().take(LABEL_CHARS).collect(),
                value: *value,
                x,
                y: BAR_BASELINE - height,
                width,
                height,
            }
        })
        .collect()
}

pub fn line_points(data: &[usize]) -> Vec<(f64, f64)> {
    let max = data.iter().copied().max().unwrap_or(0).max(1) as f64;
    let steps = data.len().saturating_sub(1).max(1) as f64;

    data.iter()
        .enumerate()
        .map(|(i, value)| {
            let x = LINE_LEFT + i as f64 * LINE_SPAN / steps;
            let y = LINE_BASELINE - *value as f64 / max * LINE_MAX_HEIGHT;
            (x, y)
        })
        .collect()
}

/// SVG path `d` attribute joining `points`
pub fn line_path(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| format!("{} {} {}", if i == 0 { "M" } else { "L" }, x, y))
        .collect::<Vec<_>>()
        .join(" ")
}
