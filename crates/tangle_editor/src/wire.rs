// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire geometry: polyline generation for connection paths.
//!
//! Everything here is a pure function of the input points, so the host can
//! call it every frame from both its layout and paint passes.

use egui::{pos2, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use tangle_graph::{PortDirection, WireStroke};

/// Width reserved for the arrow head where a wire meets a node edge.
pub const ARROW_WIDTH: f32 = 16.0;

/// Routing style for a connection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WirePath {
    /// Per-segment cubic beziers with smoothed joints.
    #[default]
    Curvy,
    /// Plain linear interpolation between points.
    Straight,
    /// Right-angle routing with horizontal/vertical jogs.
    Angled,
    /// Fixed stubs out of each endpoint, then straight routing.
    ShaderLab,
}

/// One vertex of a generated wire polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireVertex {
    /// Canvas-space position.
    pub pos: Pos2,
    /// Gradient parameter along the total path length, in `0..=1`.
    pub t: f32,
    /// Whether the segment leading into this vertex is drawn; `false`
    /// marks a dash gap. The first vertex has no leading segment.
    pub visible: bool,
}

fn vertex(pos: Pos2, visible: bool) -> WireVertex {
    WireVertex {
        pos,
        t: 0.0,
        visible,
    }
}

/// Generate the polyline for a wire through `points` (start, zero or more
/// reroute waypoints, end).
///
/// `zoom` drives subdivision density and the screen-fixed jog/stub
/// lengths; the path shape itself is canvas-space. Returns an empty vector
/// for fewer than two points.
pub fn wire_polyline(
    points: &[Pos2],
    path: WirePath,
    stroke: WireStroke,
    zoom: f32,
) -> Vec<WireVertex> {
    if points.len() < 2 {
        return Vec::new();
    }
    let mut vertices = match path {
        WirePath::Straight => straight(points, stroke, zoom),
        WirePath::Curvy => curvy(points, stroke, zoom),
        WirePath::Angled => angled(points, zoom),
        WirePath::ShaderLab => shader_lab(points, stroke, zoom),
    };
    assign_arc_length_t(&mut vertices);
    vertices
}

/// Canvas-space bounding box of a point run, for culling queries.
pub fn wire_bounds(points: &[Pos2]) -> Rect {
    let mut bounds = Rect::NOTHING;
    for point in points {
        bounds.extend_with(*point);
    }
    bounds
}

/// Where a wire attaches to a target node: at the node edge offset by the
/// arrow width, vertically clamped into the node's extent.
///
/// `direction` is the direction of the port the wire starts from; an input
/// port's wire attaches to the target's right edge, an output port's to
/// the left.
pub fn wire_endpoint(from: Pos2, target: Rect, direction: PortDirection) -> Pos2 {
    let y = if target.height() > 20.0 {
        from.y.clamp(target.min.y + 10.0, target.max.y - 10.0)
    } else {
        target.center().y
    };
    let x = if direction.is_input() {
        target.max.x + ARROW_WIDTH
    } else {
        target.min.x - ARROW_WIDTH
    };
    pos2(x, y)
}

/// Approximately one segment per five screen pixels, at least one.
fn segment_count(a: Pos2, b: Pos2, zoom: f32) -> usize {
    ((a.distance(b) * zoom / 5.0) as usize).max(1)
}

fn straight(points: &[Pos2], stroke: WireStroke, zoom: f32) -> Vec<WireVertex> {
    let mut vertices = vec![vertex(points[0], true)];
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let segments = segment_count(a, b, zoom);
        let mut draw = 0_i32;
        for j in 0..=segments {
            draw += 1;
            if j > 0 {
                let t = j as f32 / segments as f32;
                vertices.push(vertex(a.lerp(b, t), draw > 0));
            }
            if stroke == WireStroke::Dashed && draw >= 2 {
                draw = -2;
            }
        }
    }
    vertices
}

fn cubic_bezier(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let u = 1.0 - t;
    let (tt, uu) = (t * t, u * u);
    let (ttt, uuu) = (tt * t, uu * u);
    pos2(
        uuu * p0.x + 3.0 * uu * t * p1.x + 3.0 * u * tt * p2.x + ttt * p3.x,
        uuu * p0.y + 3.0 * uu * t * p1.y + 3.0 * u * tt * p2.y + ttt * p3.y,
    )
}

fn curvy(points: &[Pos2], stroke: WireStroke, zoom: f32) -> Vec<WireVertex> {
    let count = points.len();
    let mut vertices = vec![vertex(points[0], true)];
    let mut out_tangent = Vec2::RIGHT;
    for i in 0..count - 1 {
        let a = points[i];
        let b = points[i + 1];
        let dist_ab = a.distance(b);
        if i == 0 {
            out_tangent = Vec2::RIGHT * (0.5 * dist_ab);
        }
        // Joint tangents bisect the adjacent edge directions, scaled by the
        // local segment lengths; the run-in and run-out stay horizontal.
        let in_tangent = if i + 2 < count {
            let c = points[i + 2];
            let ab = (b - a).normalized();
            let cb = (b - c).normalized();
            let ac = (c - a).normalized();
            let bisector = (ab + cb) * 0.5;
            let tangent_len = (dist_ab + b.distance(c)) * 0.25;
            let side = ac.x * (b.y - a.y) - ac.y * (b.x - a.x);
            tangent_len * side.signum() * Vec2::new(-bisector.y, bisector.x)
        } else {
            Vec2::LEFT * (0.5 * dist_ab)
        };

        let tangent_a = a + out_tangent;
        let tangent_b = b + in_tangent;
        let division = ((0.2 * dist_ab * zoom).round() as usize) + 3;
        let mut draw = 0_i32;
        for j in 1..=division {
            let mut visible = true;
            if stroke == WireStroke::Dashed {
                draw += 1;
                if draw >= 2 {
                    draw = -2;
                }
                if draw == 0 {
                    visible = false;
                }
            }
            let t = j as f32 / division as f32;
            vertices.push(vertex(cubic_bezier(a, tangent_a, tangent_b, b, t), visible));
        }
        out_tangent = -in_tangent;
    }
    vertices
}

fn angled(points: &[Pos2], zoom: f32) -> Vec<WireVertex> {
    let count = points.len();
    let mut vertices = vec![vertex(points[0], true)];
    for i in 0..count - 1 {
        let a = points[i];
        let b = points[i + 1];
        if a.x <= b.x - 50.0 / zoom {
            // Far enough apart: one vertical jog at the horizontal midpoint.
            let midpoint = (a.x + b.x) * 0.5;
            vertices.push(vertex(pos2(midpoint, a.y), true));
            vertices.push(vertex(pos2(midpoint, b.y), true));
            vertices.push(vertex(b, true));
        } else {
            // Close or overlapping: the S-shaped jog through stubs.
            let midpoint = (a.y + b.y) * 0.5;
            let start = a + Vec2::RIGHT * (25.0 / zoom);
            let end = b + Vec2::LEFT * (25.0 / zoom);
            vertices.push(vertex(start, true));
            vertices.push(vertex(pos2(start.x, midpoint), true));
            vertices.push(vertex(pos2(end.x, midpoint), true));
            vertices.push(vertex(end, true));
            vertices.push(vertex(b, true));
        }
    }
    vertices
}

fn shader_lab(points: &[Pos2], stroke: WireStroke, zoom: f32) -> Vec<WireVertex> {
    let start = points[0];
    let end = points[points.len() - 1];
    let mut inner = points.to_vec();
    inner[0] = start + Vec2::RIGHT * (20.0 / zoom);
    let last = inner.len() - 1;
    inner[last] = end + Vec2::LEFT * (20.0 / zoom);

    let mut vertices = vec![vertex(start, true)];
    vertices.extend(straight(&inner, stroke, zoom));
    vertices.push(vertex(end, true));
    vertices
}

/// Distribute `t` over the vertices by cumulative arc length.
fn assign_arc_length_t(vertices: &mut [WireVertex]) {
    let total: f32 = vertices
        .windows(2)
        .map(|pair| pair[0].pos.distance(pair[1].pos))
        .sum();
    if total <= f32::EPSILON {
        let last = vertices.len().saturating_sub(1).max(1) as f32;
        for (i, v) in vertices.iter_mut().enumerate() {
            v.t = i as f32 / last;
        }
        return;
    }
    let mut walked = 0.0;
    let mut previous = vertices[0].pos;
    for v in vertices.iter_mut() {
        walked += previous.distance(v.pos);
        previous = v.pos;
        v.t = walked / total;
    }
}
