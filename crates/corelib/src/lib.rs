//! Shared math types: glam re-exports and the world `Transform` placed on models.

pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4, vec3, vec4};

pub mod transform;

pub use transform::Transform;

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-6
    }

    #[test]
    fn default_placement_leaves_model_in_place() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
        assert_eq!(Transform::identity(), Transform::IDENTITY);
    }

    #[test]
    fn translation_moves_positions_not_normals() {
        let m = Transform::from_translation(vec3(0.0, 5.0, 0.0)).matrix();
        assert_eq!(m * vec4(1.0, 0.0, 0.0, 1.0), vec4(1.0, 5.0, 0.0, 1.0));
        assert_eq!(m * vec4(0.0, 0.0, 1.0, 0.0), vec4(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn scale_applies_before_translation() {
        let t = Transform::from_trs(vec3(1.0, 0.0, 0.0), Vec3::ZERO, vec3(3.0, 3.0, 3.0));
        assert!(close(t.matrix() * vec4(1.0, 1.0, 0.0, 1.0), vec4(4.0, 3.0, 0.0, 1.0)));
    }

    #[test]
    fn quarter_turn_about_y_rotates_face_normal() {
        let t = Transform::from_trs(Vec3::ZERO, vec3(0.0, FRAC_PI_2, 0.0), Vec3::ONE);
        // +Z facing quad ends up facing +X
        assert!(close(t.matrix() * vec4(0.0, 0.0, 1.0, 0.0), vec4(1.0, 0.0, 0.0, 0.0)));
    }
}
