//! Matrix builders used to fill [`Uniforms`](crate::Uniforms).
//!
//! All matrices are right-handed and column major. Orthographic bounds live
//! on [`ProjectionParameters`](crate::ProjectionParameters).

use glam::{Mat4, Vec3};

/// Perspective projection with depth in `[0, 1]`.
pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_radians, aspect, near, far)
}

/// Perspective projection with depth in `[-1, 1]`.
///
/// The 3D automaton's camera was built with this convention.
pub fn perspective_gl(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y_radians, aspect, near, far)
}

/// Rotation of `angle_radians` about `axis` (normalized here).
pub fn rotation_about(axis: Vec3, angle_radians: f32) -> Mat4 {
    Mat4::from_axis_angle(axis.normalize_or_zero(), angle_radians)
}

pub fn translation(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

/// Scale x, y and z by `factors`, leaving w alone.
pub fn scale(factors: Vec3) -> Mat4 {
    Mat4::from_scale(factors)
}

/// View matrix looking from `eye` towards `target`.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_perspective_depth_ranges() {
        let near = 0.1;
        let far = 5.0;
        let fov = 60.0_f32.to_radians();

        let metal = perspective(fov, 1.0, near, far);
        let gl = perspective_gl(fov, 1.0, near, far);

        let ndc_z = |m: Mat4, z: f32| {
            let clip = m * Vec4::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };
        assert!(ndc_z(metal, -near).abs() < 1e-5);
        assert!((ndc_z(metal, -far) - 1.0).abs() < 1e-5);
        assert!((ndc_z(gl, -near) + 1.0).abs() < 1e-5);
        assert!((ndc_z(gl, -far) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let m = rotation_about(Vec3::new(0.0, 2.0, 0.0), std::f32::consts::FRAC_PI_2);
        let v = m.transform_vector3(Vec3::X);
        assert!(v.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6), "{:?}", v);
    }

    #[test]
    fn test_translation_and_scale() {
        let m = translation(Vec3::new(0.0, 0.0, -2.5)) * scale(Vec3::splat(2.0));
        let p = m.transform_point3(Vec3::new(0.5, 0.5, 0.5));
        assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, -1.5), 1e-6));
    }

    #[test]
    fn test_look_at_puts_target_on_negative_z() {
        let view = look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let p = view.transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-6));
    }
}
