use std::fmt::Write;

use crate::chart::{format_coord, Axis, Chart, Primitive};
use crate::display::format::escape_html;

const TICK_SIZE: f64 = 6.0;

/// Serializes a chart into a standalone SVG document.
pub fn to_svg(chart: &Chart) -> String {
    let (inner_w, inner_h) = chart.inner_size();
    let w = format_coord(chart.width);
    let h = format_coord(chart.height);

    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = writeln!(
        out,
        r#"<g transform="translate({},{})">"#,
        format_coord(chart.margin.left),
        format_coord(chart.margin.top)
    );

    for primitive in &chart.primitives {
        let _ = writeln!(out, "{}", render(primitive, inner_w, inner_h));
    }

    out.push_str("</g>\n</svg>\n");
    out
}

fn render(primitive: &Primitive, inner_w: f64, inner_h: f64) -> String {
    match primitive {
        Primitive::Path { d, stroke } => format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
            d,
            escape_html(stroke)
        ),
        Primitive::Polygon { points, fill } => {
            let points: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{},{}", format_coord(*x), format_coord(*y)))
                .collect();
            format!(
                r#"<polygon points="{}" fill="{}"/>"#,
                points.join(" "),
                escape_html(fill)
            )
        }
        Primitive::Line {
            from,
            to,
            stroke,
            stroke_width,
            dash,
        } => {
            let dash = dash
                .map(|(on, off)| {
                    format!(r#" stroke-dasharray="{} {}""#, format_coord(on), format_coord(off))
                })
                .unwrap_or_default();
            format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"{}/>"#,
                format_coord(from.0),
                format_coord(from.1),
                format_coord(to.0),
                format_coord(to.1),
                escape_html(stroke),
                format_coord(*stroke_width),
                dash
            )
        }
        Primitive::Tick { axis, position, label } => {
            let position = format_coord(*position);
            let label = escape_html(label);
            match axis {
                Axis::Bottom => format!(
                    r#"<g class="tick" transform="translate({},{})"><line y2="{}" stroke="currentColor"/><text y="9" dy="0.71em" text-anchor="middle">{}</text></g>"#,
                    position,
                    format_coord(inner_h),
                    TICK_SIZE,
                    label
                ),
                Axis::Right => format!(
                    r#"<g class="tick" transform="translate({},{})"><line x2="{}" stroke="currentColor"/><text x="9" dy="0.32em">{}</text></g>"#,
                    format_coord(inner_w),
                    position,
                    TICK_SIZE,
                    label
                ),
            }
        }
    }
}
