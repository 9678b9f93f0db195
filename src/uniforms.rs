//! Per-frame uniforms and orthographic bounds shared by every demo.

use glam::{Mat4, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::GpuRecord;

/// Model, view and projection matrices for one frame.
///
/// Three column-major 4x4 matrices, 192 bytes, no padding.
#[derive(GpuRecord, Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Uniforms {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self { model, view, projection }
    }

    /// Identity model and view with the orthographic projection for `bounds`.
    ///
    /// This is what the 2D demos upload every frame.
    pub fn orthographic(bounds: &ProjectionParameters) -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, bounds.to_matrix())
    }

    /// Combined `projection * view * model`.
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}

impl Default for Uniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// Clip-plane bounds of an orthographic projection.
///
/// Field order is left, right, top, bottom, near, far; compute kernels use
/// these to wrap or bounce particles at the visible edges.
#[derive(GpuRecord, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self::new(-1.0, 1.0, 1.0, -1.0, -1.0, 1.0)
    }
}

impl ProjectionParameters {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Map a point to `[0, 1]²`, with (0, 0) at left/bottom.
    pub fn normalize(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            (point.x - self.left) / self.width(),
            (point.y - self.bottom) / self.height(),
        )
    }

    /// Check whether a point lies inside the bounds (edges included).
    pub fn contains(&self, point: Vec2) -> bool {
        let n = self.normalize(point);
        (0.0..=1.0).contains(&n.x) && (0.0..=1.0).contains(&n.y)
    }

    /// Right-handed orthographic projection with depth in `[0, 1]`.
    ///
    /// `left`/`bottom` map to -1, `right`/`top` to +1, the plane at view
    /// depth `-near` to 0 and the one at `-far` to 1.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }

    /// Recover the bounds from a matrix built by [`Self::to_matrix`].
    ///
    /// Returns `None` if the matrix is not an axis-aligned orthographic
    /// projection.
    pub fn from_orthographic(matrix: &Mat4) -> Option<Self> {
        let [c0, c1, c2, c3] = matrix.to_cols_array_2d();
        let off_diagonal = [c0[1], c0[2], c0[3], c1[0], c1[2], c1[3], c2[0], c2[1], c2[3]];
        if off_diagonal.iter().any(|v| *v != 0.0) || c3[3] != 1.0 {
            return None;
        }

        let (xs, ys, zs) = (c0[0], c1[1], c2[2]);
        if xs == 0.0 || ys == 0.0 || zs == 0.0 {
            return None;
        }
        let (tx, ty, tz) = (c3[0], c3[1], c3[2]);

        Some(Self {
            left: (-1.0 - tx) / xs,
            right: (1.0 - tx) / xs,
            top: (1.0 - ty) / ys,
            bottom: (-1.0 - ty) / ys,
            near: tz / zs,
            far: (tz - 1.0) / zs,
        })
    }

    /// Reject bounds that would produce a degenerate projection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [self.left, self.right, self.top, self.bottom, self.near, self.far];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("projection bounds must be finite".into()));
        }
        if self.left == self.right || self.top == self.bottom || self.near == self.far {
            return Err(ConfigError::Invalid(format!(
                "projection bounds are degenerate: {:?}",
                self
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    fn sample() -> ProjectionParameters {
        ProjectionParameters::new(-1.0, 1.0, 1.0, -1.0, 0.1, 100.0)
    }

    fn project(matrix: &Mat4, point: Vec3) -> Vec3 {
        let clip = *matrix * point.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_boundary_planes_map_to_clip_volume() {
        let params = sample();
        let m = params.to_matrix();

        let low = project(&m, Vec3::new(params.left, params.bottom, -params.near));
        let high = project(&m, Vec3::new(params.right, params.top, -params.far));

        assert!(low.abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), 1e-5), "{:?}", low);
        assert!(high.abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), 1e-5), "{:?}", high);
    }

    #[test]
    fn test_bounds_recovered_from_matrix() {
        let params = sample();
        let recovered = ProjectionParameters::from_orthographic(&params.to_matrix()).unwrap();

        let a = [params.left, params.right, params.top, params.bottom, params.near, params.far];
        let b = [
            recovered.left,
            recovered.right,
            recovered.top,
            recovered.bottom,
            recovered.near,
            recovered.far,
        ];
        for (expected, actual) in a.iter().zip(b.iter()) {
            assert!((expected - actual).abs() < 1e-3, "{} vs {}", expected, actual);
        }
    }

    #[test]
    fn test_perspective_is_not_orthographic() {
        let m = Mat4::perspective_rh(1.0, 1.5, 0.1, 10.0);
        assert!(ProjectionParameters::from_orthographic(&m).is_none());
    }

    #[test]
    fn test_default_bounds_match_unit_square() {
        let m = ProjectionParameters::default().to_matrix();
        let corner = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_and_contains() {
        let params = ProjectionParameters::new(0.0, 1.92, 1.08, 0.0, -1.0, 1.0);
        let n = params.normalize(Vec2::new(0.96, 0.27));
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 0.25).abs() < 1e-6);
        assert!(params.contains(Vec2::new(1.92, 1.08)));
        assert!(!params.contains(Vec2::new(-0.01, 0.5)));
    }

    #[test]
    fn test_validate_rejects_degenerate_bounds() {
        assert!(sample().validate().is_ok());
        let flat = ProjectionParameters::new(1.0, 1.0, 1.0, -1.0, 0.1, 10.0);
        assert!(flat.validate().is_err());
        let nan = ProjectionParameters::new(f32::NAN, 1.0, 1.0, -1.0, 0.1, 10.0);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_orthographic_uniforms_use_identity_model_view() {
        let u = Uniforms::orthographic(&sample());
        assert_eq!(u.model, Mat4::IDENTITY);
        assert_eq!(u.view, Mat4::IDENTITY);
        assert_eq!(u.model_view_projection(), sample().to_matrix());
    }
}
