//! Turn angle geometry
//!
//! Coordinates are degrees (x = lon, y = lat). Around the turn vertex the
//! longitude axis is shrunk by `|cos(lat)|` so that a degree of longitude and
//! a degree of latitude span roughly the same ground distance. Within a single
//! intersection the result is Euclidean-correct in either hemisphere.
//!
//! The angle is measured counterclockwise from the reversed incoming heading
//! to the outgoing heading, in `[0, 2π)`:
//!
//! | Manoeuvre         | Angle        |
//! |-------------------|--------------|
//! | reversal (U-turn) | `0`          |
//! | right turn        | `(0, π)`     |
//! | straight on       | `π`          |
//! | left turn         | `(π, 2π)`    |

use std::f64::consts::TAU;

use geo::{Coord, LineString};

/// Which side of the turn has a zero-length segment at the vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateSide {
    Incoming,
    Outgoing,
}

/// Computes the turn angle between the end of `incoming` and the start of
/// `outgoing`. The turn vertex is the last coordinate of `incoming`.
///
/// Fails when either line has no coordinate distinct from the vertex, i.e.
/// the segment next to the vertex has zero length.
pub fn turn_angle(
    incoming: &LineString<f64>,
    outgoing: &LineString<f64>,
) -> Result<f64, DegenerateSide> {
    let vertex = *incoming.0.last().ok_or(DegenerateSide::Incoming)?;
    let previous = *incoming
        .0
        .iter()
        .rev()
        .find(|c| **c != vertex)
        .ok_or(DegenerateSide::Incoming)?;
    let next = *outgoing
        .0
        .iter()
        .find(|c| **c != vertex)
        .ok_or(DegenerateSide::Outgoing)?;

    let cos_lat = vertex.y.to_radians().cos().abs();
    let back = local_offset(vertex, previous, cos_lat);
    let ahead = local_offset(vertex, next, cos_lat);
    if is_zero(back) {
        return Err(DegenerateSide::Incoming);
    }
    if is_zero(ahead) {
        return Err(DegenerateSide::Outgoing);
    }

    Ok(normalize(ahead.y.atan2(ahead.x) - back.y.atan2(back.x)))
}

/// Offset of `point` from `origin` on the locally scaled plane
fn local_offset(origin: Coord<f64>, point: Coord<f64>, cos_lat: f64) -> Coord<f64> {
    let mut dx = point.x - origin.x;
    // Shortest way around the antimeridian
    if dx > 180.0 {
        dx -= 360.0;
    } else if dx < -180.0 {
        dx += 360.0;
    }
    Coord {
        x: dx * cos_lat,
        y: point.y - origin.y,
    }
}

fn is_zero(c: Coord<f64>) -> bool {
    c.x == 0.0 && c.y == 0.0
}

/// Wraps an angle into `[0, 2π)`
fn normalize(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}
