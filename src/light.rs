use crate::color::Color;
use crate::error::Result;
use crate::ray::Ray;
use crate::vector::Vector3D;

/// A light source. Ambient light fills the scene uniformly; point and
/// directional lights contribute diffuse shading and may cast shadows.
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f64,
    },
    Point {
        position: Vector3D,
        color: Color,
        intensity: f64,
        shadows: bool,
    },
    Directional {
        direction: Vector3D,
        color: Color,
        intensity: f64,
        shadows: bool,
    },
}

fn clamp_intensity(intensity: f64) -> f64 {
    intensity.clamp(0.0, 1.0)
}

impl Light {
    pub fn ambient(color: Color, intensity: f64) -> Light {
        Light::Ambient { color, intensity: clamp_intensity(intensity) }
    }

    pub fn point(position: Vector3D, color: Color, intensity: f64,
        shadows: bool) -> Light {
        Light::Point {
            position, color,
            intensity: clamp_intensity(intensity),
            shadows,
        }
    }

    /// Creates a directional light. `direction` is the direction the light
    /// travels and must not be degenerate.
    pub fn directional(direction: Vector3D, color: Color, intensity: f64,
        shadows: bool) -> Result<Light> {
        Ok(Light::Directional {
            direction: direction.normalized()?,
            color,
            intensity: clamp_intensity(intensity),
            shadows,
        })
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Ambient { color, .. } => *color,
            Light::Point { color, .. } => *color,
            Light::Directional { color, .. } => *color,
        }
    }

    pub fn intensity(&self) -> f64 {
        match self {
            Light::Ambient { intensity, .. } => *intensity,
            Light::Point { intensity, .. } => *intensity,
            Light::Directional { intensity, .. } => *intensity,
        }
    }

    /// The light's intensity as perceived at `point`. None of the variants
    /// attenuate with distance, so this is the configured intensity.
    pub fn intensity_at(&self, _point: &Vector3D) -> f64 {
        self.intensity()
    }

    /// The light's location, for lights that have one.
    pub fn position(&self) -> Option<Vector3D> {
        match self {
            Light::Point { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self, Light::Ambient { .. })
    }

    /// Whether this light can put a surface in shadow at all.
    pub fn casts_shadows(&self) -> bool {
        match self {
            Light::Ambient { .. } => false,
            Light::Point { shadows, .. } => *shadows,
            Light::Directional { shadows, .. } => *shadows,
        }
    }

    /// The unit vector from `point` toward the light, or `None` for
    /// ambient light, which comes from everywhere.
    pub fn direction_from(&self, point: &Vector3D) -> Option<Vector3D> {
        match self {
            Light::Ambient { .. } => None,
            Light::Point { position, .. } =>
                (*position - *point).normalized().ok(),
            Light::Directional { direction, .. } => Some(-*direction),
        }
    }

    /// Distance from `point` to the light. Directional and ambient lights
    /// are infinitely far away.
    pub fn distance_from(&self, point: &Vector3D) -> f64 {
        match self {
            Light::Point { position, .. } => (*position - *point).magnitude(),
            _ => f64::INFINITY,
        }
    }

    /// A ray from `point` toward the light, for occlusion testing. `None`
    /// when the light cannot be occluded or the point coincides with it.
    pub fn shadow_ray(&self, point: &Vector3D) -> Option<Ray> {
        if !self.casts_shadows() {
            return None;
        }

        let direction = self.direction_from(point)?;
        Ray::new(*point, direction).ok()
    }
}

/* Tests */

#[test]
fn intensity_is_clamped() {
    use crate::color;

    let hot = Light::ambient(color::WHITE, 3.0);
    assert_eq!(hot.intensity(), 1.0);

    let cold = Light::point(Vector3D::zero(), color::WHITE, -0.5, true);
    assert_eq!(cold.intensity(), 0.0);
}

#[test]
fn point_light_direction_and_distance() {
    use crate::color;

    let light = Light::point(Vector3D::new(0.0, 10.0, 0.0), color::WHITE,
        1.0, true);
    let surface = Vector3D::new(0.0, 4.0, 0.0);

    assert_eq!(light.direction_from(&surface),
        Some(Vector3D::new(0.0, 1.0, 0.0)));
    assert_eq!(light.distance_from(&surface), 6.0);
    assert_eq!(light.position(), Some(Vector3D::new(0.0, 10.0, 0.0)));
    assert_eq!(light.intensity_at(&surface), 1.0);
}

#[test]
fn directional_light_is_normalized_and_infinite() {
    use crate::color;

    let light = Light::directional(Vector3D::new(0.0, -5.0, 0.0),
        color::WHITE, 1.0, true).unwrap();

    let anywhere = Vector3D::new(3.0, 1.0, -2.0);
    assert_eq!(light.direction_from(&anywhere),
        Some(Vector3D::new(0.0, 1.0, 0.0)));
    assert_eq!(light.distance_from(&anywhere), f64::INFINITY);

    assert!(Light::directional(Vector3D::zero(), color::WHITE, 1.0, true)
        .is_err());
}

#[test]
fn ambient_light_casts_no_shadows() {
    use crate::color;

    let light = Light::ambient(color::WHITE, 0.2);
    assert!(!light.casts_shadows());
    assert!(light.shadow_ray(&Vector3D::zero()).is_none());
    assert!(light.direction_from(&Vector3D::zero()).is_none());
}

#[test]
fn shadow_ray_respects_the_shadows_flag() {
    use crate::color;

    let caster = Light::point(Vector3D::new(0.0, 10.0, 0.0), color::WHITE,
        1.0, true);
    let passive = Light::point(Vector3D::new(0.0, 10.0, 0.0), color::WHITE,
        1.0, false);
    let surface = Vector3D::zero();

    assert!(caster.shadow_ray(&surface).is_some());
    assert!(passive.shadow_ray(&surface).is_none());
}
