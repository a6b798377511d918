use crate::calibration::{Buckets, CalibrationSeries};
use crate::chart::scale::{LinearScale, Margin};
use crate::chart::{line_path, Axis, Chart, Primitive};
use crate::data::types::{Point, Side};
use crate::display::format::format_pct;

pub const CALIBRATION_MARGIN: Margin = Margin {
    top: 5.0,
    bottom: 30.0,
    left: 5.0,
    right: 30.0,
};

/// Inset of the data area from the edges of the inner drawing area.
const PADDING: f64 = 5.0;

const YES_COLOR: &str = "green";
const NO_COLOR: &str = "red";
const DIAGONAL_COLOR: &str = "rgb(99 102 241)";

/// Scales of the square calibration chart for a given width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationFrame {
    pub width: f64,
    pub height: f64,
    pub x: LinearScale,
    pub y: LinearScale,
}

impl CalibrationFrame {
    pub fn new(width: f64) -> Self {
        let height = width;
        let (inner_w, inner_h) = CALIBRATION_MARGIN.inner(width, height);
        Self {
            width,
            height,
            x: LinearScale::new((0.0, 1.0), (PADDING, inner_w - PADDING)),
            y: LinearScale::new((0.0, 1.0), (inner_h - PADDING, PADDING)),
        }
    }

    pub fn project(&self, point: &Point) -> (f64, f64) {
        (self.x.apply(point.x), self.y.apply(point.y))
    }
}

/// Triangle glyph centred on `(x, y)`: pointing up for YES, down for NO.
pub fn triangle_marker(x: f64, y: f64, side: Side) -> Vec<(f64, f64)> {
    let half_base = 3.0 * 3f64.sqrt();
    match side {
        Side::Yes => vec![(x, y - 6.0), (x - half_base, y + 3.0), (x + half_base, y + 3.0)],
        Side::No => vec![(x, y + 6.0), (x - half_base, y - 3.0), (x + half_base, y - 3.0)],
    }
}

/// Calibration curve for the YES and NO cohorts against the y = x line of
/// perfect calibration. Ticks sit at the bucket midpoints.
pub fn calibration_chart(series: &CalibrationSeries, buckets: &Buckets, width: f64) -> Chart {
    let frame = CalibrationFrame::new(width);
    let px = |p: &Point| frame.x.apply(p.x);
    let py = |p: &Point| frame.y.apply(p.y);

    let mut primitives = Vec::new();

    for &value in buckets.midpoints() {
        primitives.push(Primitive::Tick {
            axis: Axis::Bottom,
            position: frame.x.apply(value),
            label: format_pct(value),
        });
        primitives.push(Primitive::Tick {
            axis: Axis::Right,
            position: frame.y.apply(value),
            label: format_pct(value),
        });
    }

    for (points, color) in [(&series.yes, YES_COLOR), (&series.no, NO_COLOR)] {
        if let Some(d) = line_path(points, px, py) {
            primitives.push(Primitive::Path {
                d,
                stroke: color.to_string(),
            });
        }
    }

    for (points, side, color) in [
        (&series.yes, Side::Yes, YES_COLOR),
        (&series.no, Side::No, NO_COLOR),
    ] {
        for point in points.iter() {
            let (x, y) = frame.project(point);
            primitives.push(Primitive::Polygon {
                points: triangle_marker(x, y, side),
                fill: color.to_string(),
            });
        }
    }

    primitives.push(Primitive::Line {
        from: frame.project(&Point::new(0.0, 0.0)),
        to: frame.project(&Point::new(1.0, 1.0)),
        stroke: DIAGONAL_COLOR.to_string(),
        stroke_width: 1.0,
        dash: Some((4.0, 8.0)),
    });

    Chart {
        width: frame.width,
        height: frame.height,
        margin: CALIBRATION_MARGIN,
        primitives,
    }
}
