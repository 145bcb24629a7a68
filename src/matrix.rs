use std::fmt;
use std::ops::{ Index, IndexMut, Mul };
use std::convert::From;

use crate::feq;
use crate::consts::DEGENERACY_EPSILON;
use crate::error::{ Result, TracerError };
use crate::vector::Vector3D;

/// A 2x2 matrix. Only used as the base case of cofactor expansion.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
struct Matrix2D {
    data: [f64; 4],
}

impl From<[f64; 4]> for Matrix2D {
    fn from(data: [f64; 4]) -> Matrix2D {
        Matrix2D { data }
    }
}

impl Index<(usize, usize)> for Matrix2D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 2) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix2D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 2) + index.1]
    }
}

/// A 3x3 matrix, used for the minors of a 4x4 matrix.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
struct Matrix3D {
    data: [f64; 9],
}

impl From<[f64; 9]> for Matrix3D {
    fn from(data: [f64; 9]) -> Matrix3D {
        Matrix3D { data }
    }
}

impl Index<(usize, usize)> for Matrix3D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 3) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix3D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 3) + index.1]
    }
}

impl Matrix2D {
    fn determinant(&self) -> f64 {
        self[(0, 0)] * self[(1, 1)] - self[(0, 1)] * self[(1, 0)]
    }
}

impl Matrix3D {
    /// Returns the submatrix which eliminates `row` and `col`.
    fn submatrix(&self, row: usize, col: usize) -> Matrix2D {
        let mut buf: [f64; 4] = [0.0; 4];
        let mut count = 0;

        for r in 0..3 {
            for c in 0..3 {
                if !(r == row || c == col) {
                    buf[count] = self[(r, c)];
                    count += 1;
                }
            }
        }

        Matrix2D { data: buf }
    }

    fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        m * if (row + col) % 2 == 0 { 1.0 } else { -1.0 }
    }

    fn determinant(&self) -> f64 {
        let mut sum = 0.0;
        for c in 0..3 {
            sum += self[(0, c)] * self.cofactor(0, c);
        }

        sum
    }
}

/// A 4x4 affine transformation matrix, stored row-major.
///
/// These matrices place primitives and the camera in world space. Points
/// and free vectors are multiplied on the right as column vectors; points
/// carry an implicit homogeneous coordinate of `1.0`, vectors of `0.0`.
///
/// The default value is the identity matrix.
///
/// # Examples
///
/// ```
/// # use gridtrace::matrix::Matrix;
/// let mat = Matrix::identity();
/// assert_eq!(mat.determinant(), 1.0);
/// assert_eq!(mat, Default::default());
/// ```
#[derive(Copy, Clone, Debug, PartialOrd)]
pub struct Matrix {
    data: [f64; 16],
}

impl Default for Matrix {
    fn default() -> Matrix {
        Matrix::identity()
    }
}

/// Matrices are compared element-wise; equality is approximate.
impl PartialEq for Matrix {
    fn eq(&self, other: &Matrix) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Matrix {
    /// Creates a zero-filled matrix.
    pub fn zeroed() -> Matrix {
        Matrix { data: [0.0; 16] }
    }

    /// Instantiates a 4x4 identity matrix.
    pub fn identity() -> Matrix {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix { data: buf }
    }

    /// Instantiates a translation matrix offsetting points by `x`, `y`, `z`.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    /// Instantiates a scaling matrix along the X, Y and Z axes.
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix {
        let mut scale = Self::identity();
        scale[(0, 0)] = x;
        scale[(1, 1)] = y;
        scale[(2, 2)] = z;

        scale
    }

    /// Instantiates a rotation about the X axis. `r` is in radians.
    pub fn rotation_x(r: f64) -> Matrix {
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] = -r.sin();
        rotate[(2, 1)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation about the Y axis. `r` is in radians.
    pub fn rotation_y(r: f64) -> Matrix {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Instantiates a rotation about the Z axis. `r` is in radians.
    pub fn rotation_z(r: f64) -> Matrix {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] = -r.sin();
        rotate[(1, 0)] =  r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Produces the transpose of a matrix, returning a new matrix.
    pub fn transposition(&self) -> Matrix {
        let mut buf = *self;

        for r in 0..4 {
            for c in (r + 1)..4 {
                let tmp = buf[(r, c)];
                buf[(r, c)] = buf[(c, r)];
                buf[(c, r)] = tmp;
            }
        }

        buf
    }

    /// Returns the submatrix which eliminates `row` and `col`.
    fn submatrix(&self, row: usize, col: usize) -> Matrix3D {
        let mut buf: [f64; 9] = [0.0; 9];
        let mut count = 0;

        for r in 0..4 {
            for c in 0..4 {
                if !(r == row || c == col) {
                    buf[count] = self[(r, c)];
                    count += 1;
                }
            }
        }

        Matrix3D { data: buf }
    }

    /// The minor at `row`, `col`: the determinant of the 3x3 submatrix.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    /// The cofactor at `row`, `col`: the minor with its sign corrected.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        m * if (row + col) % 2 == 0 { 1.0 } else { -1.0 }
    }

    /// Calculates the determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> f64 {
        let mut sum = 0.0;
        for c in 0..4 {
            sum += self[(0, c)] * self.cofactor(0, c);
        }

        sum
    }

    /// Calculates the inverse through the classical adjugate method.
    ///
    /// Fails with a numeric-degeneracy error when the determinant is within
    /// the degeneracy threshold of zero.
    pub fn inverse(&self) -> Result<Matrix> {
        let det = self.determinant();
        if det.abs() < DEGENERACY_EPSILON {
            return Err(TracerError::NonInvertibleMatrix(det));
        }

        let mut inv = Matrix::zeroed();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        Ok(inv)
    }

    /// Applies the matrix to a point (homogeneous coordinate `1.0`).
    ///
    /// The result is divided by the homogeneous `w` only when `w` deviates
    /// from `1.0` by more than the degeneracy threshold, keeping pure
    /// affine transforms free of needless floating noise.
    pub fn mul_point(&self, p: &Vector3D) -> Vector3D {
        let x = self[(0, 0)] * p.x + self[(0, 1)] * p.y
              + self[(0, 2)] * p.z + self[(0, 3)];
        let y = self[(1, 0)] * p.x + self[(1, 1)] * p.y
              + self[(1, 2)] * p.z + self[(1, 3)];
        let z = self[(2, 0)] * p.x + self[(2, 1)] * p.y
              + self[(2, 2)] * p.z + self[(2, 3)];
        let w = self[(3, 0)] * p.x + self[(3, 1)] * p.y
              + self[(3, 2)] * p.z + self[(3, 3)];

        if (w - 1.0).abs() > DEGENERACY_EPSILON && w.abs() > DEGENERACY_EPSILON {
            Vector3D::new(x / w, y / w, z / w)
        } else {
            Vector3D::new(x, y, z)
        }
    }

    /// Applies the 3x3 linear block to a free vector, ignoring translation.
    pub fn mul_direction(&self, v: &Vector3D) -> Vector3D {
        Vector3D {
            x: self[(0, 0)] * v.x + self[(0, 1)] * v.y + self[(0, 2)] * v.z,
            y: self[(1, 0)] * v.x + self[(1, 1)] * v.y + self[(1, 2)] * v.z,
            z: self[(2, 0)] * v.x + self[(2, 1)] * v.y + self[(2, 2)] * v.z,
        }
    }
}

impl From<[f64; 16]> for Matrix {
    fn from(data: [f64; 16]) -> Matrix {
        Matrix { data }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Multiplication between two matrices. Not commutative.
impl Mul<Matrix> for Matrix {
    type Output = Matrix;

    fn mul(self, other: Matrix) -> Matrix {
        let mut res = Matrix::zeroed();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = self[(r, 0)] * other[(0, c)]
                    + self[(r, 1)] * other[(1, c)]
                    + self[(r, 2)] * other[(2, c)]
                    + self[(r, 3)] * other[(3, c)]
            }
        }

        res
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

/* Tests */

#[test]
fn identity() {
    let i = Matrix::identity();
    let a: Matrix = [ 0.0, 1.0,  2.0,  4.0,
                      1.0, 2.0,  4.0,  8.0,
                      2.0, 4.0,  8.0, 16.0,
                      4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
}

#[test]
fn default_is_identity() {
    let m: Matrix = Default::default();

    assert_eq!(m, Matrix::identity());
}

#[test]
fn transpose() {
    let a: Matrix = [ 0.0, 9.0, 3.0, 0.0,
                      9.0, 8.0, 0.0, 8.0,
                      1.0, 8.0, 5.0, 3.0,
                      0.0, 0.0, 5.0, 8.0, ].into();

    let t: Matrix = [ 0.0, 9.0, 1.0, 0.0,
                      9.0, 8.0, 8.0, 0.0,
                      3.0, 0.0, 5.0, 5.0,
                      0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(t, a.transposition());
    assert_eq!(t.transposition(), a);
}

#[test]
fn mat4_determinant() {
    let a: Matrix = [ -2.0, -8.0,  3.0,  5.0,
                      -3.0,  1.0,  7.0,  3.0,
                       1.0,  2.0, -9.0,  6.0,
                      -6.0,  7.0,  7.0, -9.0, ].into();

    assert_eq!(a.cofactor(0, 0), 690.0);
    assert_eq!(a.cofactor(0, 1), 447.0);
    assert_eq!(a.cofactor(0, 2), 210.0);
    assert_eq!(a.cofactor(0, 3), 51.0);
    assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn mat4_inverse_mult() {
    let a: Matrix = [  3.0, -9.0,  7.0,  3.0,
                       3.0,  8.0,  2.0, -9.0,
                      -4.0,  4.0,  4.0,  1.0,
                      -6.0,  5.0, -1.0,  1.0, ].into();

    let b: Matrix = [ 8.0,  2.0, 2.0, 2.0,
                      3.0, -1.0, 7.0, 0.0,
                      7.0,  0.0, 5.0, 4.0,
                      6.0, -2.0, 0.0, 5.0  ].into();

    let c = a * b;

    assert_eq!(a, c * b.inverse().unwrap());
}

#[test]
fn singular_matrix_has_no_inverse() {
    let a = Matrix::scaling(0.0, 1.0, 1.0);

    assert!(matches!(a.inverse(),
        Err(TracerError::NonInvertibleMatrix(_))));
}

#[test]
fn translate_point() {
    let transform = Matrix::translation(5.0, -3.0, 2.0);
    let point = Vector3D::new(-3.0, 4.0, 5.0);

    assert_eq!(transform.mul_point(&point), Vector3D::new(2.0, 1.0, 7.0));
}

#[test]
fn translate_ignores_vectors() {
    let transform = Matrix::translation(5.0, -3.0, 2.0);
    let vector = Vector3D::new(-3.0, 4.0, 5.0);

    assert_eq!(transform.mul_direction(&vector), vector);
}

#[test]
fn scale_vector() {
    let transform = Matrix::scaling(2.0, 3.0, 4.0);
    let vector = Vector3D::new(-4.0, 6.0, 8.0);

    assert_eq!(transform.mul_direction(&vector),
        Vector3D::new(-8.0, 18.0, 32.0));
}

#[test]
fn rotate_x() {
    let half_quarter = Matrix::rotation_x(std::f64::consts::PI / 4.0);
    let full_quarter = Matrix::rotation_x(std::f64::consts::PI / 2.0);
    let point = Vector3D::new(0.0, 1.0, 0.0);

    assert_eq!(full_quarter.mul_point(&point), Vector3D::new(0.0, 0.0, 1.0));
    assert_eq!(half_quarter.mul_point(&point),
        Vector3D::new(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0));
}

#[test]
fn rotate_y() {
    let full_quarter = Matrix::rotation_y(std::f64::consts::PI / 2.0);
    let point = Vector3D::new(0.0, 0.0, 1.0);

    assert_eq!(full_quarter.mul_point(&point), Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn rotate_z() {
    let full_quarter = Matrix::rotation_z(std::f64::consts::PI / 2.0);
    let point = Vector3D::new(0.0, 1.0, 0.0);

    assert_eq!(full_quarter.mul_point(&point), Vector3D::new(-1.0, 0.0, 0.0));
}

#[test]
fn chained_transforms() {
    let a = Matrix::rotation_x(std::f64::consts::PI / 2.0);
    let b = Matrix::scaling(5.0, 5.0, 5.0);
    let c = Matrix::translation(10.0, 5.0, 7.0);

    let t = c * b * a;
    let p = Vector3D::new(1.0, 0.0, 1.0);

    assert_eq!(t.mul_point(&p), Vector3D::new(15.0, 0.0, 7.0));
}

#[test]
fn inverse_round_trips_points() {
    let t = Matrix::translation(1.0, -2.0, 3.0)
        * Matrix::rotation_y(0.7)
        * Matrix::scaling(2.0, 0.5, 4.0);
    let inv = t.inverse().unwrap();

    for p in [
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(1.5, -2.25, 8.0),
        Vector3D::new(-13.0, 4.0, 0.0001),
    ] {
        assert_eq!(inv.mul_point(&t.mul_point(&p)), p);
    }
}
