use crate::error::Result;
use crate::matrix::Matrix;
use crate::vector::Vector3D;

/// An affine transform paired with its cached inverse.
///
/// The matrix and inverse are kept mutually consistent: every mutator
/// left-multiplies a new elementary matrix onto the current one and
/// recomputes the inverse immediately. A failed recomputation surfaces a
/// numeric-degeneracy error right at the mutation site, never later during
/// an unrelated render call.
///
/// # Examples
///
/// ```
/// # use gridtrace::transform::Transform;
/// # use gridtrace::vector::Vector3D;
/// let mut t = Transform::new();
/// t.translate(0.0, 5.0, 0.0).unwrap();
/// let p = t.apply_to_point(&Vector3D::new(1.0, 0.0, 0.0));
/// assert_eq!(p, Vector3D::new(1.0, 5.0, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix,
    inverse: Matrix,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::new()
    }
}

impl Transform {
    /// Creates an identity transform.
    pub fn new() -> Transform {
        Transform {
            matrix: Matrix::identity(),
            inverse: Matrix::identity(),
        }
    }

    /// Wraps an arbitrary matrix, computing its inverse immediately.
    pub fn from_matrix(matrix: Matrix) -> Result<Transform> {
        let inverse = matrix.inverse()?;
        Ok(Transform { matrix, inverse })
    }

    /// Wraps a matrix with an identity inverse.
    ///
    /// Fallback constructor for primitives whose requested transform turned
    /// out to be non-invertible; the primitive renders incorrectly but the
    /// renderer keeps going.
    pub(crate) fn with_identity_inverse(matrix: Matrix) -> Transform {
        Transform { matrix, inverse: Matrix::identity() }
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix {
        &self.inverse
    }

    /// Left-multiplies an arbitrary matrix onto the current transform.
    pub fn combine(&mut self, m: &Matrix) -> Result<()> {
        self.matrix = *m * self.matrix;
        self.refresh()
    }

    pub fn translate(&mut self, x: f64, y: f64, z: f64) -> Result<()> {
        self.combine(&Matrix::translation(x, y, z))
    }

    pub fn scale(&mut self, x: f64, y: f64, z: f64) -> Result<()> {
        self.combine(&Matrix::scaling(x, y, z))
    }

    /// Rotates about the X axis. `r` is in radians.
    pub fn rotate_x(&mut self, r: f64) -> Result<()> {
        self.combine(&Matrix::rotation_x(r))
    }

    /// Rotates about the Y axis. `r` is in radians.
    pub fn rotate_y(&mut self, r: f64) -> Result<()> {
        self.combine(&Matrix::rotation_y(r))
    }

    /// Rotates about the Z axis. `r` is in radians.
    pub fn rotate_z(&mut self, r: f64) -> Result<()> {
        self.combine(&Matrix::rotation_z(r))
    }

    fn refresh(&mut self) -> Result<()> {
        self.inverse = self.matrix.inverse()?;
        Ok(())
    }

    /// Transforms a point, including translation and the homogeneous divide.
    pub fn apply_to_point(&self, p: &Vector3D) -> Vector3D {
        self.matrix.mul_point(p)
    }

    /// Transforms a free vector; translation is ignored.
    pub fn apply_to_vector(&self, v: &Vector3D) -> Vector3D {
        self.matrix.mul_direction(v)
    }

    /// Transforms a point through the cached inverse.
    pub fn apply_inverse_to_point(&self, p: &Vector3D) -> Vector3D {
        self.inverse.mul_point(p)
    }

    /// Transforms a free vector through the cached inverse.
    pub fn apply_inverse_to_vector(&self, v: &Vector3D) -> Vector3D {
        self.inverse.mul_direction(v)
    }

    /// Transforms a surface normal into world space and normalizes it.
    ///
    /// Normals transform by the transposed inverse of the linear block,
    /// not by the matrix itself; this keeps them perpendicular under
    /// non-uniform scaling.
    pub fn apply_to_normal(&self, n: &Vector3D) -> Result<Vector3D> {
        self.inverse.transposition().mul_direction(n).normalized()
    }
}

/* Tests */

#[test]
fn identity_transform_is_a_no_op() {
    let t = Transform::new();
    let p = Vector3D::new(1.0, 2.0, 3.0);

    assert_eq!(t.apply_to_point(&p), p);
    assert_eq!(t.apply_to_vector(&p), p);
}

#[test]
fn mutators_left_multiply() {
    // Rotation is applied to incoming points before translation because
    // translate() was the most recent (outermost) mutation.
    let mut t = Transform::new();
    t.rotate_z(std::f64::consts::PI / 2.0).unwrap();
    t.translate(10.0, 0.0, 0.0).unwrap();

    let p = Vector3D::new(0.0, 1.0, 0.0);
    assert_eq!(t.apply_to_point(&p), Vector3D::new(9.0, 0.0, 0.0));
}

#[test]
fn inverse_round_trip() {
    let mut t = Transform::new();
    t.scale(2.0, 3.0, 4.0).unwrap();
    t.rotate_y(0.5).unwrap();
    t.translate(-1.0, 6.0, 0.25).unwrap();

    for p in [
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(1.0, -1.0, 1.0),
        Vector3D::new(123.0, 0.5, -42.0),
    ] {
        let forward = t.apply_to_point(&p);
        assert_eq!(t.apply_inverse_to_point(&forward), p);
    }
}

#[test]
fn degenerate_scale_fails_at_mutation_site() {
    use crate::error::TracerError;

    let mut t = Transform::new();
    let res = t.scale(0.0, 1.0, 1.0);

    assert!(matches!(res, Err(TracerError::NonInvertibleMatrix(_))));
}

#[test]
fn vectors_ignore_translation() {
    let mut t = Transform::new();
    t.translate(5.0, 5.0, 5.0).unwrap();

    let v = Vector3D::new(0.0, 0.0, 1.0);
    assert_eq!(t.apply_to_vector(&v), v);
}

#[test]
fn normals_use_the_inverse_transpose() {
    // Scaling a sphere by (1, 0.5, 1) tilts surface normals more than the
    // naive forward transform would.
    let mut t = Transform::new();
    t.scale(1.0, 0.5, 1.0).unwrap();

    let local = Vector3D::new(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt()) / 2.0);
    let world = t.apply_to_normal(&local).unwrap();

    assert_eq!(world, Vector3D::new(0.0, 0.89443, -0.44721));
}
