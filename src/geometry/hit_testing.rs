use egui::{Pos2, pos2};

/// Squared distance from `touch` to an icon anchor if the touch lands on the icon.
///
/// The hit target is a circle of radius `2 * icon_radius`.
pub fn icon_hit_distance_sq(anchor: Pos2, touch: Pos2, icon_radius: f32) -> Option<f32> {
    let dx = anchor.x - touch.x;
    let dy = anchor.y - touch.y;
    let distance_sq = dx * dx + dy * dy;
    let reach = icon_radius + icon_radius;
    (distance_sq <= reach * reach).then_some(distance_sq)
}

/// Point containment for a transformed rectangle.
///
/// `corners` are in construction order: top-left, top-right, bottom-left,
/// bottom-right. Points on an edge count as inside.
pub fn quad_contains(corners: &[Pos2; 4], point: Pos2) -> bool {
    let [tl, tr, bl, br] = *corners;
    let ring = [tl, tr, br, bl];

    let mut has_positive = false;
    let mut has_negative = false;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        let cross = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
        if cross > 0.0 {
            has_positive = true;
        } else if cross < 0.0 {
            has_negative = true;
        }
        if has_positive && has_negative {
            return false;
        }
    }
    // a collapsed quad has every cross product at zero
    has_positive || has_negative
}

pub fn distance(a: Pos2, b: Pos2) -> f32 {
    let x = (a.x - b.x) as f64;
    let y = (a.y - b.y) as f64;
    (x * x + y * y).sqrt() as f32
}

/// Angle in degrees of the line from `b` to `a`, measured against the x axis.
pub fn rotation_degrees(a: Pos2, b: Pos2) -> f32 {
    let x = (a.x - b.x) as f64;
    let y = (a.y - b.y) as f64;
    y.atan2(x).to_degrees() as f32
}

pub fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    pos2((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
