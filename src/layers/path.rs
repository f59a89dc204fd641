//! SVG path data for projected GeoJSON geometry.
//!
//! Points become circles drawn with two arcs, the same path shape browsers
//! receive from d3-geo; lines and rings become `M…L…` runs, rings closed
//! with `Z`.

use std::fmt::Write as _;

use crate::core::geo::Point;
use crate::core::projection::Projection;
use crate::data::geojson::{position_lng_lat, GeoJsonGeometry, Position};

/// Path data for `geometry` under `projection`, point radius `radius`
pub fn geometry_path(geometry: &GeoJsonGeometry, projection: &Projection, radius: f64) -> String {
    let mut out = String::new();
    write_geometry(&mut out, geometry, projection, radius);
    out
}

fn write_geometry(out: &mut String, geometry: &GeoJsonGeometry, projection: &Projection, radius: f64) {
    match geometry {
        GeoJsonGeometry::Point { coordinates } => write_point(out, coordinates, projection, radius),
        GeoJsonGeometry::MultiPoint { coordinates } => {
            for position in coordinates {
                write_point(out, position, projection, radius);
            }
        }
        GeoJsonGeometry::LineString { coordinates } => write_line(out, coordinates, projection, false),
        GeoJsonGeometry::MultiLineString { coordinates } => {
            for line in coordinates {
                write_line(out, line, projection, false);
            }
        }
        GeoJsonGeometry::Polygon { coordinates } => {
            for ring in coordinates {
                write_line(out, ring, projection, true);
            }
        }
        GeoJsonGeometry::MultiPolygon { coordinates } => {
            for ring in coordinates.iter().flatten() {
                write_line(out, ring, projection, true);
            }
        }
        GeoJsonGeometry::GeometryCollection { geometries } => {
            for geometry in geometries {
                write_geometry(out, geometry, projection, radius);
            }
        }
    }
}

fn write_point(out: &mut String, position: &Position, projection: &Projection, radius: f64) {
    if let Some(coord) = position_lng_lat(position) {
        let p = projection.project(&coord);
        let _ = write!(out, "M{},{}", p.x, p.y);
        out.push_str(&circle(radius));
    }
}

fn write_line(out: &mut String, positions: &[Position], projection: &Projection, closed: bool) {
    let points: Vec<Point> = positions
        .iter()
        .filter_map(|p| position_lng_lat(p))
        .map(|c| projection.project(&c))
        .collect();
    let Some((first, rest)) = points.split_first() else {
        return;
    };

    let _ = write!(out, "M{},{}", first.x, first.y);
    for p in rest {
        let _ = write!(out, "L{},{}", p.x, p.y);
    }
    if closed {
        out.push('Z');
    }
}

/// Relative circle of radius `r` starting at the current point's centre
fn circle(r: f64) -> String {
    format!(
        "m0,{r}a{r},{r} 0 1,1 0,{}a{r},{r} 0 1,1 0,{}z",
        -2.0 * r,
        2.0 * r,
        r = r
    )
}
