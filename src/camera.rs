use crate::error::{ Result, TracerError };
use crate::ray::Ray;
use crate::transform::Transform;
use crate::vector::Vector3D;

/// A pinhole camera.
///
/// The camera looks along its local +Y axis. `rotation` holds Euler angles
/// in radians applied about the world X, Y and Z axes; `fov` is the
/// vertical field of view. The view transform is derived once at
/// construction time and carries the camera's orientation into primary
/// ray directions.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vector3D,
    rotation: Vector3D,
    fov: f64,
    width: usize,
    height: usize,
    view: Transform,
}

impl Camera {
    pub fn new(position: Vector3D, rotation: Vector3D, fov: f64,
        width: usize, height: usize) -> Result<Camera> {
        if fov <= 0.0 || fov >= std::f64::consts::PI {
            return Err(TracerError::AngleOutOfRange(fov));
        }
        if width == 0 {
            return Err(TracerError::NonPositiveParameter {
                name: "image width", value: width as f64,
            });
        }
        if height == 0 {
            return Err(TracerError::NonPositiveParameter {
                name: "image height", value: height as f64,
            });
        }

        let mut view = Transform::new();
        view.rotate_x(-rotation.x)?;
        view.rotate_y(-rotation.y)?;
        view.rotate_z(-rotation.z)?;
        view.translate(-position.x, -position.y, -position.z)?;

        Ok(Camera { position, rotation, fov, width, height, view })
    }

    pub fn position(&self) -> Vector3D {
        self.position
    }

    pub fn rotation(&self) -> Vector3D {
        self.rotation
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Builds the primary ray through the center of pixel `(x, y)`.
    ///
    /// Pixel coordinates map to normalized device coordinates in [-1, 1],
    /// with `y` flipped so the top image row is +1. The horizontal extent
    /// is stretched by the aspect ratio so pixels stay square.
    pub fn generate_ray(&self, x: usize, y: usize) -> Result<Ray> {
        if x >= self.width || y >= self.height {
            return Err(TracerError::PixelOutOfRange {
                x, y,
                width: self.width,
                height: self.height,
            });
        }

        let aspect = self.width as f64 / self.height as f64;
        let half_extent = (self.fov / 2.0).tan();

        let ndc_x = 2.0 * (x as f64 + 0.5) / self.width as f64 - 1.0;
        let ndc_y = 1.0 - 2.0 * (y as f64 + 0.5) / self.height as f64;

        let local = Vector3D::new(
            ndc_x * aspect * half_extent,
            1.0,
            ndc_y * half_extent,
        );

        Ray::new(self.position, self.view.apply_to_vector(&local))
    }
}

/* Tests */

#[test]
fn center_pixel_looks_forward() {
    let camera = Camera::new(Vector3D::zero(), Vector3D::zero(),
        std::f64::consts::FRAC_PI_2, 3, 3).unwrap();

    let ray = camera.generate_ray(1, 1).unwrap();
    assert_eq!(ray.origin, Vector3D::zero());
    assert_eq!(ray.direction, Vector3D::new(0.0, 1.0, 0.0));
}

#[test]
fn corner_pixel_direction() {
    use crate::feq;

    let camera = Camera::new(Vector3D::zero(), Vector3D::zero(),
        std::f64::consts::FRAC_PI_2, 2, 2).unwrap();

    // Top-left pixel of a 2x2 image with a 90 degree fov.
    let ray = camera.generate_ray(0, 0).unwrap();
    let expected = Vector3D::new(-0.5, 1.0, 0.5).normalized().unwrap();

    assert!(feq(ray.direction.x, expected.x));
    assert!(feq(ray.direction.y, expected.y));
    assert!(feq(ray.direction.z, expected.z));
}

#[test]
fn translation_moves_the_origin_only() {
    let home = Camera::new(Vector3D::zero(), Vector3D::zero(),
        std::f64::consts::FRAC_PI_2, 3, 3).unwrap();
    let moved = Camera::new(Vector3D::new(1.0, -2.0, 4.0), Vector3D::zero(),
        std::f64::consts::FRAC_PI_2, 3, 3).unwrap();

    let a = home.generate_ray(1, 1).unwrap();
    let b = moved.generate_ray(1, 1).unwrap();

    assert_eq!(b.origin, Vector3D::new(1.0, -2.0, 4.0));
    assert_eq!(a.direction, b.direction);
}

#[test]
fn rotation_turns_the_view() {
    let camera = Camera::new(Vector3D::zero(),
        Vector3D::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        std::f64::consts::FRAC_PI_2, 3, 3).unwrap();

    let ray = camera.generate_ray(1, 1).unwrap();
    assert_eq!(ray.direction, Vector3D::new(1.0, 0.0, 0.0));
}

#[test]
fn out_of_range_pixel_is_rejected() {
    let camera = Camera::new(Vector3D::zero(), Vector3D::zero(),
        std::f64::consts::FRAC_PI_2, 4, 4).unwrap();

    assert!(matches!(camera.generate_ray(4, 0),
        Err(TracerError::PixelOutOfRange { .. })));
    assert!(matches!(camera.generate_ray(0, 7),
        Err(TracerError::PixelOutOfRange { .. })));
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(Camera::new(Vector3D::zero(), Vector3D::zero(), 0.0, 4, 4)
        .is_err());
    assert!(Camera::new(Vector3D::zero(), Vector3D::zero(),
        std::f64::consts::PI, 4, 4).is_err());
    assert!(Camera::new(Vector3D::zero(), Vector3D::zero(), 1.0, 0, 4)
        .is_err());
}
