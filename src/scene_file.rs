//! JSON scene descriptions.
//!
//! A scene file names a camera, global shading knobs, and lists of lights
//! and primitives. Angles are given in degrees and converted on load;
//! vectors are `[x, y, z]` arrays and colors are `[r, g, b]` byte arrays.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::camera::Camera;
use crate::color::{ self, Color };
use crate::consts::MIN_CHECKER_SIZE;
use crate::error::Result;
use crate::light::Light;
use crate::matrix::Matrix;
use crate::scene::Scene;
use crate::shape::{ Axis, Primitive };
use crate::transform::Transform;
use crate::vector::Vector3D;

fn vec3(v: [f64; 3]) -> Vector3D {
    Vector3D::new(v[0], v[1], v[2])
}

fn rgb(c: [u8; 3]) -> Color {
    Color::rgb(c[0], c[1], c[2])
}

fn default_intensity() -> f64 {
    1.0
}

fn default_shadows() -> bool {
    true
}

fn default_color() -> [u8; 3] {
    [color::WHITE.r, color::WHITE.g, color::WHITE.b]
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub width: usize,
    pub height: usize,
}

/// Elementary transform steps, applied as scale, then rotation about the
/// X, Y and Z axes, then translation.
#[derive(Debug, Default, Deserialize)]
pub struct TransformConfig {
    pub scale: Option<[f64; 3]>,
    /// Euler angles in degrees.
    pub rotation: Option<[f64; 3]>,
    pub translation: Option<[f64; 3]>,
}

impl TransformConfig {
    fn build(&self) -> Result<Matrix> {
        let mut transform = Transform::new();

        if let Some([x, y, z]) = self.scale {
            transform.scale(x, y, z)?;
        }
        if let Some([x, y, z]) = self.rotation {
            transform.rotate_x(x.to_radians())?;
            transform.rotate_y(y.to_radians())?;
            transform.rotate_z(z.to_radians())?;
        }
        if let Some([x, y, z]) = self.translation {
            transform.translate(x, y, z)?;
        }

        Ok(*transform.matrix())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisConfig {
    X,
    Y,
    Z,
}

impl From<&AxisConfig> for Axis {
    fn from(axis: &AxisConfig) -> Axis {
        match axis {
            AxisConfig::X => Axis::X,
            AxisConfig::Y => Axis::Y,
            AxisConfig::Z => Axis::Z,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckerConfig {
    pub size: f64,
    pub color: [u8; 3],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightConfig {
    Ambient {
        #[serde(default = "default_color")]
        color: [u8; 3],
        #[serde(default = "default_intensity")]
        intensity: f64,
    },
    Point {
        position: [f64; 3],
        #[serde(default = "default_color")]
        color: [u8; 3],
        #[serde(default = "default_intensity")]
        intensity: f64,
        #[serde(default = "default_shadows")]
        shadows: bool,
    },
    Directional {
        direction: [f64; 3],
        #[serde(default = "default_color")]
        color: [u8; 3],
        #[serde(default = "default_intensity")]
        intensity: f64,
        #[serde(default = "default_shadows")]
        shadows: bool,
    },
}

impl LightConfig {
    fn build(&self) -> Result<Light> {
        match self {
            LightConfig::Ambient { color, intensity } =>
                Ok(Light::ambient(rgb(*color), *intensity)),
            LightConfig::Point { position, color, intensity, shadows } =>
                Ok(Light::point(vec3(*position), rgb(*color), *intensity,
                    *shadows)),
            LightConfig::Directional { direction, color, intensity,
                shadows } =>
                Light::directional(vec3(*direction), rgb(*color), *intensity,
                    *shadows),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    Sphere {
        radius: f64,
    },
    Plane {
        axis: AxisConfig,
        #[serde(default)]
        position: f64,
        checker: Option<CheckerConfig>,
    },
    /// A cone; with `height` set it becomes a capped, height-limited cone.
    Cone {
        apex: [f64; 3],
        axis: [f64; 3],
        /// Half-angle in degrees.
        angle: f64,
        height: Option<f64>,
    },
    /// A cylinder; with `height` set it becomes a capped cylinder.
    Cylinder {
        radius: f64,
        height: Option<f64>,
    },
    Torus {
        major: f64,
        minor: f64,
    },
    Triangle {
        p1: [f64; 3],
        p2: [f64; 3],
        p3: [f64; 3],
    },
}

#[derive(Debug, Deserialize)]
pub struct PrimitiveConfig {
    #[serde(flatten)]
    pub shape: ShapeConfig,
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    pub transform: Option<TransformConfig>,
}

impl PrimitiveConfig {
    fn build(&self) -> Result<Primitive> {
        let mut primitive = match &self.shape {
            ShapeConfig::Sphere { radius } =>
                Primitive::sphere(*radius)?,

            ShapeConfig::Plane { axis, position, checker } => {
                match checker {
                    Some(checker) => Primitive::checkerboard(
                        axis.into(), *position,
                        checker.size.max(MIN_CHECKER_SIZE),
                        rgb(checker.color))?,
                    None => Primitive::plane(axis.into(), *position)?,
                }
            },

            ShapeConfig::Cone { apex, axis, angle, height } => {
                let angle = angle.to_radians();
                match height {
                    Some(height) => Primitive::limited_cone(vec3(*apex),
                        vec3(*axis), angle, *height)?,
                    None => Primitive::cone(vec3(*apex), vec3(*axis),
                        angle)?,
                }
            },

            ShapeConfig::Cylinder { radius, height } => match height {
                Some(height) => Primitive::limited_cylinder(*radius,
                    *height)?,
                None => Primitive::cylinder(*radius)?,
            },

            ShapeConfig::Torus { major, minor } =>
                Primitive::torus(*major, *minor)?,

            ShapeConfig::Triangle { p1, p2, p3 } =>
                Primitive::triangle(vec3(*p1), vec3(*p2), vec3(*p3))?,
        };

        primitive.set_color(rgb(self.color));
        if let Some(config) = &self.transform {
            primitive.set_transform(config.build()?);
        }

        Ok(primitive)
    }
}

#[derive(Debug, Deserialize)]
pub struct SceneFile {
    pub camera: CameraConfig,
    #[serde(default)]
    pub ambient_intensity: Option<f64>,
    #[serde(default)]
    pub diffuse_multiplier: Option<f64>,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
    #[serde(default)]
    pub primitives: Vec<PrimitiveConfig>,
}

impl TryFrom<SceneFile> for Scene {
    type Error = crate::error::TracerError;

    fn try_from(file: SceneFile) -> Result<Scene> {
        let camera = Camera::new(
            vec3(file.camera.position),
            vec3(file.camera.rotation.map(f64::to_radians)),
            file.camera.fov.to_radians(),
            file.camera.width,
            file.camera.height,
        )?;

        let mut scene = Scene::new(camera);
        if let Some(intensity) = file.ambient_intensity {
            scene.set_ambient_intensity(intensity);
        }
        if let Some(multiplier) = file.diffuse_multiplier {
            scene.set_diffuse_multiplier(multiplier);
        }

        for light in &file.lights {
            scene.add_light(light.build()?);
        }
        for primitive in &file.primitives {
            scene.add_primitive(primitive.build()?);
        }

        Ok(scene)
    }
}

/// Reads and builds a scene from a JSON file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let text = fs::read_to_string(path)?;
    let file: SceneFile = serde_json::from_str(&text)?;
    file.try_into()
}

/* Tests */

#[cfg(test)]
fn parse(text: &str) -> Result<Scene> {
    let file: SceneFile = serde_json::from_str(text).unwrap();
    file.try_into()
}

#[test]
fn full_scene_round_trip() {
    use crate::feq;

    let scene = parse(r#"{
        "camera": {
            "position": [0, -10, 2],
            "rotation": [0, 0, 45],
            "fov": 90,
            "width": 320,
            "height": 240
        },
        "ambient_intensity": 0.25,
        "diffuse_multiplier": 0.8,
        "lights": [
            { "type": "ambient", "intensity": 0.1 },
            { "type": "point", "position": [0, 0, 10] },
            { "type": "directional", "direction": [0, 0, -1],
              "color": [255, 240, 220], "shadows": false }
        ],
        "primitives": [
            { "type": "sphere", "radius": 1.5, "color": [200, 30, 30],
              "transform": { "translation": [0, 5, 0] } },
            { "type": "plane", "axis": "z", "position": -2,
              "checker": { "size": 1.0, "color": [40, 40, 40] } },
            { "type": "cone", "apex": [0, 0, 5], "axis": [0, 0, -1],
              "angle": 30, "height": 2.0 },
            { "type": "cylinder", "radius": 0.5, "height": 3.0 },
            { "type": "torus", "major": 2.0, "minor": 0.25 },
            { "type": "triangle", "p1": [0, 5, 0], "p2": [1, 5, 0],
              "p3": [0, 5, 1] }
        ]
    }"#).unwrap();

    assert_eq!(scene.camera().width(), 320);
    assert_eq!(scene.camera().height(), 240);
    assert!(feq(scene.camera().fov(), std::f64::consts::FRAC_PI_2));
    assert!(feq(scene.camera().rotation().z, std::f64::consts::FRAC_PI_4));

    assert!(feq(scene.ambient_intensity(), 0.25));
    assert!(feq(scene.diffuse_multiplier(), 0.8));
    assert_eq!(scene.lights().len(), 3);
    assert_eq!(scene.primitives().len(), 6);

    assert_eq!(scene.primitives()[0].color(), Color::rgb(200, 30, 30));
}

#[test]
fn defaults_fill_missing_fields() {
    let scene = parse(r#"{
        "camera": { "position": [0, 0, 0], "fov": 60,
                    "width": 10, "height": 10 },
        "primitives": [ { "type": "sphere", "radius": 1.0 } ]
    }"#).unwrap();

    assert_eq!(scene.lights().len(), 0);
    assert_eq!(scene.primitives()[0].color(), color::WHITE);
    assert_eq!(scene.camera().rotation(), Vector3D::zero());
}

#[test]
fn transform_steps_compose_scale_rotate_translate() {
    let scene = parse(r#"{
        "camera": { "position": [0, 0, 0], "fov": 60,
                    "width": 10, "height": 10 },
        "primitives": [
            { "type": "sphere", "radius": 1.0,
              "transform": { "scale": [2, 2, 2],
                             "translation": [0, 5, 0] } }
        ]
    }"#).unwrap();

    let transform = scene.primitives()[0].transform();
    assert_eq!(transform.apply_to_point(&Vector3D::new(1.0, 0.0, 0.0)),
        Vector3D::new(2.0, 5.0, 0.0));
}

#[test]
fn tiny_checker_sizes_are_clamped() {
    let scene = parse(r#"{
        "camera": { "position": [0, 0, 0], "fov": 60,
                    "width": 10, "height": 10 },
        "primitives": [
            { "type": "plane", "axis": "y",
              "checker": { "size": 0.0, "color": [0, 0, 0] } }
        ]
    }"#).unwrap();

    assert_eq!(scene.primitives().len(), 1);
}

#[test]
fn invalid_geometry_is_reported() {
    let result = parse(r#"{
        "camera": { "position": [0, 0, 0], "fov": 60,
                    "width": 10, "height": 10 },
        "primitives": [ { "type": "sphere", "radius": -1.0 } ]
    }"#);

    assert!(result.is_err());
}

#[test]
fn unknown_light_type_fails_to_parse() {
    let text = r#"{
        "camera": { "position": [0, 0, 0], "fov": 60,
                    "width": 10, "height": 10 },
        "lights": [ { "type": "spot", "position": [0, 0, 0] } ]
    }"#;

    assert!(serde_json::from_str::<SceneFile>(text).is_err());
}
