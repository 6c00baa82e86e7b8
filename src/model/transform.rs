//! Affine transformations used to materialize symmetry and assembly copies.
//!
//! A [`Transformation`] wraps a homogeneous 4×4 matrix. Composition follows the matrix
//! product: `a.compose(&b)` yields a transformation that applies `b` first and `a` second,
//! which is the order mmCIF operator expressions such as `(1-60)(61-88)` prescribe.

use super::types::Point;
use nalgebra::{Matrix3, Matrix4, Vector3};
use std::fmt;

/// Immutable rotation + translation expressed as a homogeneous matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    matrix: Matrix4<f64>,
}

impl Transformation {
    /// The neutral element of composition.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Builds a transformation from a 3×3 linear part and a translation vector.
    ///
    /// The linear part is taken verbatim; crystallographic operators are not guaranteed to
    /// be orthonormal in Cartesian space and are therefore not re-orthogonalized.
    pub fn from_parts(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        let mut matrix = Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Returns `self ∘ other`: the result applies `other` first, then `self`.
    pub fn compose(&self, other: &Transformation) -> Transformation {
        Transformation {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Applies the transformation to a single point.
    pub fn apply(&self, point: &Point) -> Point {
        self.matrix.transform_point(point)
    }

    /// Whether the matrix equals the identity within `1e-9` per element.
    pub fn is_identity(&self) -> bool {
        (self.matrix - Matrix4::identity()).abs().max() < 1e-9
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.matrix;
        write!(f, "Transformation [")?;
        for row in 0..3 {
            if row > 0 {
                write!(f, "; ")?;
            }
            write!(
                f,
                "{:.3} {:.3} {:.3} | {:.3}",
                m[(row, 0)],
                m[(row, 1)],
                m[(row, 2)],
                m[(row, 3)]
            )?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;
    use std::f64::consts::FRAC_PI_2;

    fn assert_point_close(actual: Point, expected: Point) {
        assert!(
            nalgebra::distance(&actual, &expected) < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn translation(x: f64, y: f64, z: f64) -> Transformation {
        Transformation::from_parts(Matrix3::identity(), Vector3::new(x, y, z))
    }

    fn rotation_z_90() -> Transformation {
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        Transformation::from_parts(*rot.matrix(), Vector3::zeros())
    }

    #[test]
    fn identity_leaves_points_untouched() {
        let p = Point::new(1.5, -2.0, 3.25);
        assert_point_close(Transformation::identity().apply(&p), p);
        assert!(Transformation::identity().is_identity());
        assert!(Transformation::default().is_identity());
    }

    #[test]
    fn apply_performs_rotation_then_translation() {
        let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let t = Transformation::from_parts(*rot.matrix(), Vector3::new(10.0, 0.0, 0.0));

        let moved = t.apply(&Point::new(1.0, 0.0, 0.0));
        assert_point_close(moved, Point::new(10.0, 1.0, 0.0));
        assert!(!t.is_identity());
    }

    #[test]
    fn compose_applies_right_hand_operand_first() {
        let rotate = rotation_z_90();
        let shift = translation(5.0, 0.0, 0.0);
        let p = Point::new(1.0, 0.0, 0.0);

        // rotate ∘ shift: shift to (6,0,0), then rotate to (0,6,0)
        let composed = rotate.compose(&shift);
        assert_point_close(composed.apply(&p), rotate.apply(&shift.apply(&p)));
        assert_point_close(composed.apply(&p), Point::new(0.0, 6.0, 0.0));

        // shift ∘ rotate: rotate to (0,1,0), then shift to (5,1,0)
        let reversed = shift.compose(&rotate);
        assert_point_close(reversed.apply(&p), Point::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn compose_with_identity_is_neutral() {
        let t = translation(1.0, 2.0, 3.0);
        assert_eq!(t.compose(&Transformation::identity()), t);
        assert_eq!(Transformation::identity().compose(&t), t);
    }

    #[test]
    fn display_lists_rows_with_translation() {
        let display = translation(1.0, 2.0, 3.0).to_string();
        assert!(display.starts_with("Transformation ["));
        assert!(display.contains("1.000 0.000 0.000 | 1.000"));
    }
}
