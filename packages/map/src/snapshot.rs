//! SVG snapshot of the current view.
//!
//! Vector layers are drawn in resolved styles, bottom to top. The base
//! layer is represented by a plain background and its attribution line;
//! tiles themselves are not embedded.

use geo::{Coord, Geometry, LineString, Polygon};

use crate::{LayerKind, MapSurface, Style, View, Viewport};

const BACKGROUND: &str = "#f2efe9";
const POINT_RADIUS: f64 = 4.0;

/// Renders the surface's visible layers as a standalone SVG document.
#[must_use]
pub fn render_svg(surface: &MapSurface) -> String {
    let viewport = surface.viewport();
    let view = surface.view();
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = viewport.width,
        h = viewport.height
    );

    if surface.is_layer_visible(LayerKind::Base) {
        svg.push_str(&format!(
            "  <rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND}\"/>\n"
        ));
    }

    for kind in LayerKind::FEATURE_LAYERS {
        let Some(layer) = surface.layer(kind).filter(|l| l.is_visible()) else {
            continue;
        };
        svg.push_str(&format!("  <g id=\"{kind}\">\n"));
        for (key, rendered) in layer.iter() {
            if let Some(element) =
                geometry_element(&rendered.feature.geometry, &rendered.style, view, viewport)
            {
                svg.push_str(&format!(
                    "    <g data-id=\"{}\" data-tag=\"{}\">{element}</g>\n",
                    escape(key.id.as_str()),
                    key.tag
                ));
            }
        }
        svg.push_str("  </g>\n");
    }

    if surface.is_layer_visible(LayerKind::Measurement) {
        let sketch = surface
            .measurement_preview()
            .and_then(|g| geometry_element(&g, &Style::measurement(), view, viewport));
        if let Some(element) = sketch {
            svg.push_str(&format!("  <g id=\"measurement\">{element}</g>\n"));
        }
    }

    if surface.is_layer_visible(LayerKind::Base) {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"10\" text-anchor=\"end\" font-family=\"sans-serif\">{}</text>\n",
            viewport.width.saturating_sub(4),
            viewport.height.saturating_sub(4),
            escape(&surface.base_map().attribution)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn geometry_element(
    geometry: &Geometry<f64>,
    style: &Style,
    view: &View,
    viewport: Viewport,
) -> Option<String> {
    let to_px = |c: Coord<f64>| view.pixel_of(c, viewport);

    match geometry {
        Geometry::Point(p) => Some(circle(to_px(p.0), style)),
        Geometry::MultiPoint(mp) => {
            let circles: String = mp.iter().map(|p| circle(to_px(p.0), style)).collect();
            (!circles.is_empty()).then_some(circles)
        }
        Geometry::GeometryCollection(gc) => {
            let parts: String = gc
                .iter()
                .filter_map(|g| geometry_element(g, style, view, viewport))
                .collect();
            (!parts.is_empty()).then_some(parts)
        }
        _ => {
            let (data, closed) = path_data(geometry, &to_px);
            if data.is_empty() {
                return None;
            }
            let fill = style
                .fill_color
                .filter(|_| closed)
                .map_or_else(|| "none".to_string(), |c| c.to_string());
            Some(format!(
                "<path d=\"{data}\" fill=\"{fill}\" fill-rule=\"evenodd\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\" stroke-linecap=\"round\"/>",
                style.stroke_color, style.stroke_width
            ))
        }
    }
}

/// Path data for line and polygon kinds, plus whether it is areal.
fn path_data(geometry: &Geometry<f64>, to_px: &impl Fn(Coord<f64>) -> Coord<f64>) -> (String, bool) {
    let mut data = String::new();
    let closed = match geometry {
        Geometry::Line(line) => {
            push_ring(&mut data, &LineString::from(vec![line.start, line.end]), false, to_px);
            false
        }
        Geometry::LineString(ls) => {
            push_ring(&mut data, ls, false, to_px);
            false
        }
        Geometry::MultiLineString(mls) => {
            for ls in mls {
                push_ring(&mut data, ls, false, to_px);
            }
            false
        }
        Geometry::Polygon(polygon) => {
            push_polygon(&mut data, polygon, to_px);
            true
        }
        Geometry::MultiPolygon(mp) => {
            for polygon in mp {
                push_polygon(&mut data, polygon, to_px);
            }
            true
        }
        Geometry::Rect(rect) => {
            push_polygon(&mut data, &rect.to_polygon(), to_px);
            true
        }
        Geometry::Triangle(triangle) => {
            push_polygon(&mut data, &triangle.to_polygon(), to_px);
            true
        }
        Geometry::Point(_) | Geometry::MultiPoint(_) | Geometry::GeometryCollection(_) => false,
    };
    (data, closed)
}

fn push_polygon(
    data: &mut String,
    polygon: &Polygon<f64>,
    to_px: &impl Fn(Coord<f64>) -> Coord<f64>,
) {
    push_ring(data, polygon.exterior(), true, to_px);
    for interior in polygon.interiors() {
        push_ring(data, interior, true, to_px);
    }
}

fn push_ring(
    data: &mut String,
    ring: &LineString<f64>,
    close: bool,
    to_px: &impl Fn(Coord<f64>) -> Coord<f64>,
) {
    for (i, coord) in ring.coords().enumerate() {
        let px = to_px(*coord);
        if !data.is_empty() {
            data.push(' ');
        }
        let op = if i == 0 { 'M' } else { 'L' };
        data.push_str(&format!("{op}{:.1},{:.1}", px.x, px.y));
    }
    if close && !ring.0.is_empty() {
        data.push_str(" Z");
    }
}

fn circle(center: Coord<f64>, style: &Style) -> String {
    let fill = style
        .fill_color
        .unwrap_or(style.stroke_color)
        .to_string();
    format!(
        "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{POINT_RADIUS}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        center.x, center.y, style.stroke_color, style.stroke_width
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
