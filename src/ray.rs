use crate::error::Result;
use crate::transform::Transform;
use crate::vector::Vector3D;

/// A ray: an origin and a direction.
///
/// World-space rays built through `Ray::new` always carry a unit direction.
/// Rays produced by `to_local` intentionally keep the scaled direction so
/// that parametric distances stay measured in world units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3D,
    pub direction: Vector3D,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    pub fn new(origin: Vector3D, direction: Vector3D) -> Result<Ray> {
        Ok(Ray { origin, direction: direction.normalized()? })
    }

    /// The point at parametric distance `t` along the ray.
    pub fn position(&self, t: f64) -> Vector3D {
        self.origin + (self.direction * t)
    }

    /// Re-expresses the ray in a primitive's local frame via the cached
    /// inverse transform. The direction is not re-normalized.
    pub fn to_local(&self, transform: &Transform) -> Ray {
        Ray {
            origin: transform.apply_inverse_to_point(&self.origin),
            direction: transform.apply_inverse_to_vector(&self.direction),
        }
    }
}

/* Tests */

#[test]
fn ray_position() {
    let r = Ray::new(
        Vector3D::new(2.0, 3.0, 4.0),
        Vector3D::new(1.0, 0.0, 0.0),
    ).unwrap();

    assert_eq!(r.position(0.0), Vector3D::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3D::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3D::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3D::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray::new(
        Vector3D::zero(),
        Vector3D::new(0.0, 5.0, 0.0),
    ).unwrap();

    assert_eq!(r.direction, Vector3D::new(0.0, 1.0, 0.0));
}

#[test]
fn zero_direction_is_rejected() {
    use crate::error::TracerError;

    let r = Ray::new(Vector3D::zero(), Vector3D::zero());
    assert!(matches!(r, Err(TracerError::DegenerateVector(_))));
}

#[test]
fn ray_into_translated_frame() {
    let r = Ray::new(
        Vector3D::new(1.0, 2.0, 3.0),
        Vector3D::new(0.0, 1.0, 0.0),
    ).unwrap();

    let mut t = Transform::new();
    t.translate(3.0, 4.0, 5.0).unwrap();

    let local = r.to_local(&t);
    assert_eq!(local.origin, Vector3D::new(-2.0, -2.0, -2.0));
    assert_eq!(local.direction, Vector3D::new(0.0, 1.0, 0.0));
}

#[test]
fn ray_into_scaled_frame_keeps_world_distances() {
    let r = Ray::new(
        Vector3D::new(1.0, 2.0, 3.0),
        Vector3D::new(0.0, 1.0, 0.0),
    ).unwrap();

    let mut t = Transform::new();
    t.scale(2.0, 3.0, 4.0).unwrap();

    let local = r.to_local(&t);
    assert_eq!(local.origin, Vector3D::new(0.5, 2.0 / 3.0, 0.75));
    assert_eq!(local.direction, Vector3D::new(0.0, 1.0 / 3.0, 0.0));
}
