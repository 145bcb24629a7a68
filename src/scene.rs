use crate::camera::Camera;
use crate::color::{ self, Color };
use crate::consts::SHADOW_EPSILON;
use crate::light::Light;
use crate::ray::Ray;
use crate::shape::{ Intersection, Primitive, PrimitiveId };
use crate::vector::Vector3D;

/// A renderable scene: the camera, every primitive and light, and the
/// global shading knobs.
///
/// Scenes are plain values; cloning one yields a fully independent copy,
/// which is what lets render workers share a scene behind an `Arc`
/// without interior locking.
#[derive(Clone, Debug)]
pub struct Scene {
    camera: Camera,
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    ambient_intensity: f64,
    diffuse_multiplier: f64,
}

impl Scene {
    pub fn new(camera: Camera) -> Scene {
        Scene {
            camera,
            primitives: Vec::new(),
            lights: Vec::new(),
            ambient_intensity: 0.1,
            diffuse_multiplier: 1.0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn ambient_intensity(&self) -> f64 {
        self.ambient_intensity
    }

    pub fn set_ambient_intensity(&mut self, intensity: f64) {
        self.ambient_intensity = intensity.clamp(0.0, 1.0);
    }

    pub fn diffuse_multiplier(&self) -> f64 {
        self.diffuse_multiplier
    }

    pub fn set_diffuse_multiplier(&mut self, multiplier: f64) {
        self.diffuse_multiplier = multiplier.clamp(0.0, 1.0);
    }

    /// Adds a primitive and assigns it a scene-unique id.
    pub fn add_primitive(&mut self, mut primitive: Primitive) -> PrimitiveId {
        let id = PrimitiveId(self.primitives.len());
        primitive.set_id(id);
        self.primitives.push(primitive);
        id
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Finds the nearest intersection along `ray` by scanning every
    /// primitive in the scene.
    pub fn trace_ray(&self, ray: &Ray) -> Option<Intersection> {
        let mut nearest: Option<Intersection> = None;

        for primitive in &self.primitives {
            if let Some(hit) = primitive.intersect(ray) {
                if nearest.map_or(true, |n| hit.distance < n.distance) {
                    nearest = Some(hit);
                }
            }
        }

        nearest
    }

    /// Whether anything blocks `light` as seen from `point`.
    ///
    /// Occluders count only when they sit strictly between the surface
    /// (offset by a small epsilon to dodge self-shadowing) and the light.
    pub fn is_in_shadow(&self, point: &Vector3D, light: &Light) -> bool {
        let ray = match light.shadow_ray(point) {
            Some(ray) => ray,
            None => return false,
        };
        let light_distance = light.distance_from(point);

        self.primitives.iter().any(|primitive| {
            primitive.intersect(&ray).map_or(false, |hit| {
                hit.distance > SHADOW_EPSILON && hit.distance < light_distance
            })
        })
    }

    /// Shades an intersection with ambient fill plus Lambertian diffuse
    /// from every unoccluded light. Channel sums saturate.
    pub fn shade(&self, hit: &Intersection) -> Color {
        let mut out = hit.color.scaled(self.ambient_intensity);

        for light in &self.lights {
            if light.is_ambient() {
                out = out + hit.color.blend(&light.color())
                    .scaled(light.intensity());
                continue;
            }

            let toward_light = match light.direction_from(&hit.point) {
                Some(direction) => direction,
                None => continue,
            };

            let lambert = hit.normal.dot(&toward_light);
            if lambert <= 0.0 {
                continue;
            }

            if self.is_in_shadow(&hit.point, light) {
                continue;
            }

            out = out + hit.color.blend(&light.color())
                .scaled(self.diffuse_multiplier
                    * light.intensity_at(&hit.point) * lambert);
        }

        out
    }

    /// The color seen along `ray`: shaded nearest hit, or black on a miss.
    pub fn color_at(&self, ray: &Ray) -> Color {
        match self.trace_ray(ray) {
            Some(hit) => self.shade(&hit),
            None => color::BLACK,
        }
    }
}

/* Tests */

#[cfg(test)]
fn test_camera() -> Camera {
    Camera::new(Vector3D::new(0.0, -5.0, 0.0), Vector3D::zero(),
        std::f64::consts::FRAC_PI_2, 4, 4).unwrap()
}

#[cfg(test)]
fn forward_ray() -> Ray {
    Ray::new(Vector3D::new(0.0, -5.0, 0.0), Vector3D::new(0.0, 1.0, 0.0))
        .unwrap()
}

#[test]
fn trace_ray_picks_the_nearest_hit() {
    use crate::feq;

    let mut scene = Scene::new(test_camera());

    let near = scene.add_primitive(Primitive::sphere(1.0).unwrap());
    let mut far_sphere = Primitive::sphere(1.0).unwrap();
    far_sphere.set_transform(crate::matrix::Matrix::translation(0.0, 10.0, 0.0));
    scene.add_primitive(far_sphere);

    let hit = scene.trace_ray(&forward_ray()).unwrap();
    assert_eq!(hit.primitive, near);
    assert!(feq(hit.distance, 4.0));
}

#[test]
fn trace_ray_miss_returns_none() {
    let scene = Scene::new(test_camera());
    assert!(scene.trace_ray(&forward_ray()).is_none());
}

#[test]
fn occluder_between_point_and_light_casts_shadow() {
    let mut scene = Scene::new(test_camera());

    let mut occluder = Primitive::sphere(1.0).unwrap();
    occluder.set_transform(crate::matrix::Matrix::translation(0.0, 0.0, 5.0));
    scene.add_primitive(occluder);

    let light = Light::point(Vector3D::new(0.0, 0.0, 10.0), color::WHITE,
        1.0, true);

    assert!(scene.is_in_shadow(&Vector3D::zero(), &light));
}

#[test]
fn occluder_beyond_the_light_does_not_shadow() {
    let mut scene = Scene::new(test_camera());

    let mut occluder = Primitive::sphere(1.0).unwrap();
    occluder.set_transform(crate::matrix::Matrix::translation(0.0, 0.0, 20.0));
    scene.add_primitive(occluder);

    let light = Light::point(Vector3D::new(0.0, 0.0, 10.0), color::WHITE,
        1.0, true);

    assert!(!scene.is_in_shadow(&Vector3D::zero(), &light));
}

#[test]
fn lights_without_shadows_never_shadow() {
    let mut scene = Scene::new(test_camera());

    let mut occluder = Primitive::sphere(1.0).unwrap();
    occluder.set_transform(crate::matrix::Matrix::translation(0.0, 0.0, 5.0));
    scene.add_primitive(occluder);

    let light = Light::point(Vector3D::new(0.0, 0.0, 10.0), color::WHITE,
        1.0, false);

    assert!(!scene.is_in_shadow(&Vector3D::zero(), &light));
}

#[test]
fn shading_with_no_lights_is_ambient_fill() {
    let mut scene = Scene::new(test_camera());
    scene.set_ambient_intensity(0.5);
    scene.add_primitive(Primitive::sphere(1.0).unwrap());

    let hit = scene.trace_ray(&forward_ray()).unwrap();
    assert_eq!(scene.shade(&hit), color::WHITE.scaled(0.5));
}

#[test]
fn head_on_light_gives_full_diffuse() {
    let mut scene = Scene::new(test_camera());
    scene.set_ambient_intensity(0.0);
    scene.add_primitive(Primitive::sphere(1.0).unwrap());
    scene.add_light(Light::point(Vector3D::new(0.0, -10.0, 0.0),
        color::WHITE, 1.0, true));

    // The hit faces the light directly, so lambert is 1.
    let hit = scene.trace_ray(&forward_ray()).unwrap();
    assert_eq!(scene.shade(&hit), color::WHITE);
}

#[test]
fn light_behind_the_surface_adds_nothing() {
    let mut scene = Scene::new(test_camera());
    scene.set_ambient_intensity(0.0);
    scene.add_primitive(Primitive::sphere(1.0).unwrap());
    scene.add_light(Light::point(Vector3D::new(0.0, 10.0, 0.0),
        color::WHITE, 1.0, true));

    let hit = scene.trace_ray(&forward_ray()).unwrap();
    assert_eq!(scene.shade(&hit), color::BLACK);
}

#[test]
fn shadowed_point_keeps_only_ambient() {
    let mut scene = Scene::new(test_camera());
    scene.set_ambient_intensity(0.2);
    scene.add_primitive(Primitive::sphere(1.0).unwrap());

    let mut blocker = Primitive::sphere(0.5).unwrap();
    blocker.set_transform(crate::matrix::Matrix::translation(0.0, -3.0, 0.0));
    scene.add_primitive(blocker);

    scene.add_light(Light::point(Vector3D::new(0.0, -10.0, 0.0),
        color::WHITE, 1.0, true));

    let ray = forward_ray();
    let hit = scene.primitives()[0].intersect(&ray).unwrap();
    assert_eq!(scene.shade(&hit), color::WHITE.scaled(0.2));
}

#[test]
fn miss_renders_the_background() {
    let scene = Scene::new(test_camera());
    assert_eq!(scene.color_at(&forward_ray()), color::BLACK);
}

#[test]
fn shading_knobs_are_clamped() {
    let mut scene = Scene::new(test_camera());

    scene.set_ambient_intensity(2.0);
    assert_eq!(scene.ambient_intensity(), 1.0);

    scene.set_ambient_intensity(-0.5);
    assert_eq!(scene.ambient_intensity(), 0.0);

    scene.set_diffuse_multiplier(2.0);
    assert_eq!(scene.diffuse_multiplier(), 1.0);

    scene.set_diffuse_multiplier(-1.0);
    assert_eq!(scene.diffuse_multiplier(), 0.0);
}
