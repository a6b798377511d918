pub mod calibration;
pub mod history;
pub mod scale;
pub mod svg;

pub use calibration::{calibration_chart, CalibrationFrame};
pub use history::probability_history_chart;
pub use scale::{LinearScale, Margin};

use crate::data::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Bottom,
    Right,
}

/// Drawable output handed to the rendering layer. Coordinates are relative
/// to the inner drawing area (already offset by the chart margins).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Path {
        d: String,
        stroke: String,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        fill: String,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: String,
        stroke_width: f64,
        dash: Option<(f64, f64)>,
    },
    Tick {
        axis: Axis,
        position: f64,
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub primitives: Vec<Primitive>,
}

impl Chart {
    pub fn inner_size(&self) -> (f64, f64) {
        self.margin.inner(self.width, self.height)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Path { d, .. } => Some(d.as_str()),
            _ => None,
        })
    }

    pub fn polygons(&self) -> impl Iterator<Item = &[(f64, f64)]> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Polygon { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }
}

/// Pixel coordinate as text: at most two decimals, no trailing zeros.
pub fn format_coord(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Straight-segment path through the points (`M x,y L x,y ...`); `None` when
/// there is nothing to draw.
pub fn line_path<X, Y>(points: &[Point], px: X, py: Y) -> Option<String>
where
    X: Fn(&Point) -> f64,
    Y: Fn(&Point) -> f64,
{
    let mut d = String::new();
    for (i, point) in points.iter().enumerate() {
        d.push(if i == 0 { 'M' } else { 'L' });
        d.push_str(&format_coord(px(point)));
        d.push(',');
        d.push_str(&format_coord(py(point)));
    }
    (!d.is_empty()).then_some(d)
}
