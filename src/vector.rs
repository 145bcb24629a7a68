use std::ops::{ Add, Sub, Neg, Mul };

use crate::feq;
use crate::consts::DEGENERACY_EPSILON;
use crate::error::{ Result, TracerError };

/// A 3D vector (or point, depending on context).
///
/// All operations are pure and return new values. The only fallible
/// operation is `normalized`, which rejects near-zero-magnitude vectors.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Vector3D {
    fn eq(&self, other: &Vector3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Vector3D {
    pub fn new(x: f64, y: f64, z: f64) -> Vector3D {
        Vector3D { x, y, z }
    }

    pub fn zero() -> Vector3D {
        Vector3D { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        f64::sqrt(self.x.powi(2) + self.y.powi(2) + self.z.powi(2))
    }

    /// Returns the unit-length vector pointing in the same direction.
    ///
    /// Fails with a numeric-degeneracy error if the magnitude is below
    /// the crate's degeneracy threshold.
    pub fn normalized(&self) -> Result<Vector3D> {
        let mag = self.magnitude();
        if mag < DEGENERACY_EPSILON {
            return Err(TracerError::DegenerateVector(mag));
        }

        Ok(Vector3D {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
        })
    }

    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
}

impl Add for Vector3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vector3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vector3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

impl Mul<f64> for Vector3D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
        }
    }
}

impl Mul<Vector3D> for f64 {
    type Output = Vector3D;

    fn mul(self, other: Vector3D) -> Vector3D {
        other * self
    }
}

/* Tests */

#[test]
fn add_vectors() {
    let a = Vector3D::new(3.0, -2.0, 5.0);
    let b = Vector3D::new(-2.0, 3.0, 1.0);

    assert_eq!(a + b, Vector3D::new(1.0, 1.0, 6.0));
}

#[test]
fn sub_vectors() {
    let a = Vector3D::new(3.0, 2.0, 1.0);
    let b = Vector3D::new(5.0, 6.0, 7.0);

    assert_eq!(a - b, Vector3D::new(-2.0, -4.0, -6.0));
}

#[test]
fn neg_vector() {
    let a = Vector3D::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Vector3D::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_scalar() {
    let a = Vector3D::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Vector3D::new(3.5, -7.0, 10.5));
    assert_eq!(3.5 * a, Vector3D::new(3.5, -7.0, 10.5));
}

#[test]
fn magnitude_pos() {
    let v = Vector3D::new(1.0, 2.0, 3.0);

    assert_eq!(v.magnitude(), f64::sqrt(14.0));
}

#[test]
fn magnitude_neg() {
    let v = Vector3D::new(-1.0, -2.0, -3.0);

    assert_eq!(v.magnitude(), f64::sqrt(14.0));
}

#[test]
fn normalize_clean() {
    let v = Vector3D::new(4.0, 0.0, 0.0);

    assert_eq!(v.normalized().unwrap(), Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn normalize_dirty() {
    let v = Vector3D::new(1.0, 2.0, 3.0);
    let n = v.normalized().unwrap();

    assert!(feq(n.magnitude(), 1.0));
    assert_eq!(n, Vector3D::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0),
    ));
}

#[test]
fn normalize_near_zero_fails() {
    let v = Vector3D::new(0.0, 1e-11, 0.0);

    assert!(matches!(v.normalized(),
        Err(TracerError::DegenerateVector(_))));
}

#[test]
fn dot_vectors() {
    let a = Vector3D::new(1.0, 2.0, 3.0);
    let b = Vector3D::new(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector3D::new(1.0, 2.0, 3.0);
    let b = Vector3D::new(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Vector3D::new(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Vector3D::new(1.0, -2.0, 1.0));
}
