use egui::{Pos2, Rect, Vec2, pos2};
use serde::{Deserialize, Serialize};

/// Determinants smaller than this are treated as a collapsed transform.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// How [`Matrix::set_rect_to_rect`] fits the source rectangle into the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleToFit {
    /// Scale each axis independently so the source fills the destination exactly.
    Fill,
    /// Uniform scale, aligned to the destination's left/top edge.
    Start,
    /// Uniform scale, centered in the destination.
    Center,
    /// Uniform scale, aligned to the destination's right/bottom edge.
    End,
}

/// A 2D affine transform.
///
/// Points map as `x' = sx·x + kx·y + tx`, `y' = ky·x + sy·y + ty`.
///
/// `post_*` operations apply *after* the current transform (`M' = T·M`),
/// `pre_*` operations apply *before* it (`M' = M·T`). Gesture deltas are always
/// composed with `post_*` in the order scale, rotate, translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    sx: f32,
    kx: f32,
    tx: f32,
    ky: f32,
    sy: f32,
    ty: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        sx: 1.0,
        kx: 0.0,
        tx: 0.0,
        ky: 0.0,
        sy: 1.0,
        ty: 0.0,
    };

    pub fn from_translation(delta: Vec2) -> Self {
        Self {
            tx: delta.x,
            ty: delta.y,
            ..Self::IDENTITY
        }
    }

    pub fn from_scale(sx: f32, sy: f32, pivot: Pos2) -> Self {
        Self {
            sx,
            kx: 0.0,
            tx: pivot.x - sx * pivot.x,
            ky: 0.0,
            sy,
            ty: pivot.y - sy * pivot.y,
        }
    }

    /// Rotation by `degrees` (clockwise on a y-down surface) about `pivot`.
    pub fn from_rotation(degrees: f32, pivot: Pos2) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            sx: cos,
            kx: -sin,
            tx: pivot.x - cos * pivot.x + sin * pivot.y,
            ky: sin,
            sy: cos,
            ty: pivot.y - sin * pivot.x - cos * pivot.y,
        }
    }

    /// Raw values in `[sx, kx, tx, ky, sy, ty]` order.
    pub fn values(&self) -> [f32; 6] {
        [self.sx, self.kx, self.tx, self.ky, self.sy, self.ty]
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    pub fn set(&mut self, other: &Matrix) {
        *self = *other;
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `a · b`: the transform that applies `b` first, then `a`.
    pub fn concat(a: &Matrix, b: &Matrix) -> Matrix {
        Matrix {
            sx: a.sx * b.sx + a.kx * b.ky,
            kx: a.sx * b.kx + a.kx * b.sy,
            tx: a.sx * b.tx + a.kx * b.ty + a.tx,
            ky: a.ky * b.sx + a.sy * b.ky,
            sy: a.ky * b.kx + a.sy * b.sy,
            ty: a.ky * b.tx + a.sy * b.ty + a.ty,
        }
    }

    pub fn post_concat(&mut self, other: &Matrix) {
        *self = Self::concat(other, self);
    }

    pub fn pre_concat(&mut self, other: &Matrix) {
        *self = Self::concat(self, other);
    }

    pub fn post_translate(&mut self, dx: f32, dy: f32) {
        self.tx += dx;
        self.ty += dy;
    }

    pub fn post_scale(&mut self, sx: f32, sy: f32, pivot: Pos2) {
        self.post_concat(&Self::from_scale(sx, sy, pivot));
    }

    pub fn pre_scale(&mut self, sx: f32, sy: f32, pivot: Pos2) {
        self.pre_concat(&Self::from_scale(sx, sy, pivot));
    }

    pub fn post_rotate(&mut self, degrees: f32, pivot: Pos2) {
        self.post_concat(&Self::from_rotation(degrees, pivot));
    }

    /// Replaces this matrix with one mapping `src` onto `dst`.
    ///
    /// Returns `false` (and resets to identity) when `src` has no area.
    pub fn set_rect_to_rect(&mut self, src: Rect, dst: Rect, fit: ScaleToFit) -> bool {
        if src.width() <= 0.0 || src.height() <= 0.0 {
            self.reset();
            return false;
        }

        let mut sx = dst.width() / src.width();
        let mut sy = dst.height() / src.height();
        let mut tx = dst.min.x - src.min.x * sx;
        let mut ty = dst.min.y - src.min.y * sy;

        if fit != ScaleToFit::Fill {
            let scale = sx.min(sy);
            sx = scale;
            sy = scale;
            tx = dst.min.x - src.min.x * scale;
            ty = dst.min.y - src.min.y * scale;

            let diff_x = dst.width() - src.width() * scale;
            let diff_y = dst.height() - src.height() * scale;
            match fit {
                ScaleToFit::Center => {
                    tx += diff_x / 2.0;
                    ty += diff_y / 2.0;
                }
                ScaleToFit::End => {
                    tx += diff_x;
                    ty += diff_y;
                }
                ScaleToFit::Start | ScaleToFit::Fill => {}
            }
        }

        *self = Matrix {
            sx,
            kx: 0.0,
            tx,
            ky: 0.0,
            sy,
            ty,
        };
        true
    }

    pub fn map_point(&self, point: Pos2) -> Pos2 {
        pos2(
            self.sx * point.x + self.kx * point.y + self.tx,
            self.ky * point.x + self.sy * point.y + self.ty,
        )
    }

    /// Maps every point, preserving order.
    pub fn map_points<const N: usize>(&self, points: [Pos2; N]) -> [Pos2; N] {
        points.map(|p| self.map_point(p))
    }

    /// Axis-aligned bounds of the mapped rectangle.
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let corners = self.map_points([
            rect.left_top(),
            rect.right_top(),
            rect.left_bottom(),
            rect.right_bottom(),
        ]);
        let mut bounds = Rect::NOTHING;
        for corner in corners {
            bounds.extend_with(corner);
        }
        bounds
    }

    pub fn determinant(&self) -> f32 {
        self.sx * self.sy - self.kx * self.ky
    }

    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > DEGENERATE_EPSILON
    }

    pub fn invert(&self) -> Option<Matrix> {
        if !self.is_invertible() {
            return None;
        }
        let det = self.determinant();
        Some(Matrix {
            sx: self.sy / det,
            kx: -self.kx / det,
            tx: (self.kx * self.ty - self.sy * self.tx) / det,
            ky: -self.ky / det,
            sy: self.sx / det,
            ty: (self.ky * self.tx - self.sx * self.ty) / det,
        })
    }

    /// Uniform scale factor encoded in the matrix.
    pub fn scale(&self) -> f32 {
        (self.sx * self.sx + self.ky * self.ky).sqrt()
    }

    /// Rotation in degrees encoded in the matrix.
    pub fn rotation(&self) -> f32 {
        -self.kx.atan2(self.sx).to_degrees()
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    fn approx(a: Pos2, b: Pos2) -> bool {
        (a.x - b.x).abs() < 0.001 && (a.y - b.y).abs() < 0.001
    }

    #[test]
    fn post_operations_apply_after_existing_transform() {
        let mut m = Matrix::from_translation(vec2(10.0, 0.0));
        m.post_scale(2.0, 2.0, Pos2::ZERO);
        // translate first, then scale about the origin
        assert!(approx(m.map_point(pos2(1.0, 1.0)), pos2(22.0, 2.0)));
    }

    #[test]
    fn pre_operations_apply_before_existing_transform() {
        let mut m = Matrix::from_translation(vec2(10.0, 0.0));
        m.pre_scale(2.0, 2.0, Pos2::ZERO);
        assert!(approx(m.map_point(pos2(1.0, 1.0)), pos2(12.0, 2.0)));
    }

    #[test]
    fn rotation_about_pivot_keeps_pivot_fixed() {
        let pivot = pos2(50.0, 50.0);
        let m = Matrix::from_rotation(90.0, pivot);
        assert!(approx(m.map_point(pivot), pivot));
        assert!(approx(m.map_point(pos2(60.0, 50.0)), pos2(50.0, 60.0)));
        assert!((m.rotation() - 90.0).abs() < 0.001);
    }

    #[test]
    fn scale_and_rotation_are_recoverable() {
        let mut m = Matrix::IDENTITY;
        m.post_scale(1.5, 1.5, pos2(10.0, 10.0));
        m.post_rotate(30.0, pos2(10.0, 10.0));
        assert!((m.scale() - 1.5).abs() < 0.001);
        assert!((m.rotation() - 30.0).abs() < 0.001);
    }

    #[test]
    fn invert_round_trips_points() {
        let mut m = Matrix::IDENTITY;
        m.post_scale(3.0, 2.0, pos2(5.0, 5.0));
        m.post_rotate(45.0, pos2(0.0, 0.0));
        m.post_translate(7.0, -3.0);
        let inverse = m.invert().unwrap();
        let p = pos2(12.5, -4.0);
        assert!(approx(inverse.map_point(m.map_point(p)), p));
    }

    #[test]
    fn zero_scale_is_not_invertible() {
        let mut m = Matrix::IDENTITY;
        m.post_scale(0.0, 1.0, Pos2::ZERO);
        assert!(!m.is_invertible());
        assert!(m.invert().is_none());
    }

    #[test]
    fn rect_to_rect_center_letterboxes() {
        let src = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 50.0));
        let dst = Rect::from_min_size(Pos2::ZERO, vec2(200.0, 200.0));
        let mut m = Matrix::IDENTITY;
        assert!(m.set_rect_to_rect(src, dst, ScaleToFit::Center));
        let mapped = m.map_rect(src);
        assert!(approx(mapped.min, pos2(0.0, 50.0)));
        assert!(approx(mapped.max, pos2(200.0, 150.0)));
    }

    #[test]
    fn rect_to_rect_rejects_empty_source() {
        let mut m = Matrix::from_translation(vec2(3.0, 3.0));
        let empty = Rect::from_min_size(Pos2::ZERO, Vec2::ZERO);
        assert!(!m.set_rect_to_rect(empty, empty, ScaleToFit::Fill));
        assert!(m.is_identity());
    }
}
