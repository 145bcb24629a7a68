use log::warn;

use crate::consts::{
    DEGENERACY_EPSILON, HIT_EPSILON,
    PLANE_PARALLEL_EPSILON, CONE_DISCRIMINANT_EPSILON, CONE_NAPPE_EPSILON,
    TRIANGLE_PARALLEL_EPSILON,
    TORUS_SAMPLE_STEP, TORUS_MAX_DISTANCE, TORUS_ROOT_TOLERANCE,
    TORUS_NEWTON_ITERATIONS,
};
use crate::color::{ self, Color };
use crate::error::{ Result, TracerError };
use crate::matrix::Matrix;
use crate::ray::Ray;
use crate::transform::Transform;
use crate::vector::Vector3D;

/// Identifies a primitive within its scene. Purely referential; it never
/// controls the primitive's lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveId(pub usize);

/// The result of a successful ray/primitive intersection.
///
/// The normal is a world-space unit vector oriented against the incoming
/// ray. `color` starts as the surface color at the hit point; the shading
/// step layers lighting on top of it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub distance: f64,
    pub point: Vector3D,
    pub normal: Vector3D,
    pub color: Color,
    pub primitive: PrimitiveId,
}

/// A world axis. Planes are perpendicular to one of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The two in-plane coordinates of a point for a plane on this axis.
    fn planar_coords(&self, p: &Vector3D) -> (f64, f64) {
        match self {
            Axis::X => (p.y, p.z),
            Axis::Y => (p.x, p.z),
            Axis::Z => (p.x, p.y),
        }
    }

    fn component(&self, p: &Vector3D) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }

    fn unit(&self) -> Vector3D {
        match self {
            Axis::X => Vector3D::new(1.0, 0.0, 0.0),
            Axis::Y => Vector3D::new(0.0, 1.0, 0.0),
            Axis::Z => Vector3D::new(0.0, 0.0, 1.0),
        }
    }
}

/// Checkerboard coloring for planes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Checker {
    pub size: f64,
    pub secondary: Color,
}

/// The closed set of shape variants and their local-space parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveKind {
    /// A sphere centered at the local origin.
    Sphere { radius: f64 },

    /// An infinite plane perpendicular to `axis` at `position` along it,
    /// optionally checkered.
    Plane { axis: Axis, position: f64, checker: Option<Checker> },

    /// An infinite single-nappe cone.
    Cone { apex: Vector3D, axis: Vector3D, angle: f64 },

    /// A cone truncated at `height` along its axis, with a base cap disk.
    LimitedCone { apex: Vector3D, axis: Vector3D, angle: f64, height: f64 },

    /// An infinite cylinder around the local Y axis.
    Cylinder { radius: f64 },

    /// A cylinder of `height` centered on the local origin, capped at
    /// `y = +-height/2`.
    LimitedCylinder { radius: f64, height: f64 },

    /// A torus in the local XZ plane around the Y axis.
    Torus { major: f64, minor: f64 },

    /// A triangle; edges and plane normal are precomputed.
    Triangle {
        p1: Vector3D,
        p2: Vector3D,
        p3: Vector3D,
        e1: Vector3D,
        e2: Vector3D,
        normal: Vector3D,
    },
}

/// A geometric primitive: a shape variant, a base color and a transform
/// (with its cached inverse) placing it in world space.
///
/// Plain value semantics: cloning yields a fully independent copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    kind: PrimitiveKind,
    color: Color,
    transform: Transform,
    id: PrimitiveId,
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value <= 0.0 {
        return Err(TracerError::NonPositiveParameter { name, value });
    }
    Ok(())
}

impl Primitive {
    fn with_kind(kind: PrimitiveKind) -> Primitive {
        Primitive {
            kind,
            color: color::WHITE,
            transform: Transform::new(),
            id: PrimitiveId::default(),
        }
    }

    /// Creates a sphere centered at the local origin.
    pub fn sphere(radius: f64) -> Result<Primitive> {
        require_positive("sphere radius", radius)?;
        Ok(Self::with_kind(PrimitiveKind::Sphere { radius }))
    }

    /// Creates an infinite plane perpendicular to `axis`.
    pub fn plane(axis: Axis, position: f64) -> Result<Primitive> {
        Ok(Self::with_kind(PrimitiveKind::Plane {
            axis, position, checker: None,
        }))
    }

    /// Creates an infinite checkerboard plane. The primary color is the
    /// primitive's base color; `secondary` fills the alternate squares.
    pub fn checkerboard(axis: Axis, position: f64, size: f64,
        secondary: Color) -> Result<Primitive> {
        require_positive("checker size", size)?;
        Ok(Self::with_kind(PrimitiveKind::Plane {
            axis, position,
            checker: Some(Checker { size, secondary }),
        }))
    }

    /// Creates an infinite cone. `angle` is the half-angle in radians and
    /// must lie strictly between 0 and PI/2.
    pub fn cone(apex: Vector3D, axis: Vector3D, angle: f64)
        -> Result<Primitive> {
        let axis = axis.normalized()
            .map_err(|_| TracerError::DegenerateAxis)?;
        if angle <= 0.0 || angle >= std::f64::consts::FRAC_PI_2 {
            return Err(TracerError::AngleOutOfRange(angle));
        }

        Ok(Self::with_kind(PrimitiveKind::Cone { apex, axis, angle }))
    }

    /// Creates a height-limited cone with a base cap disk.
    pub fn limited_cone(apex: Vector3D, axis: Vector3D, angle: f64,
        height: f64) -> Result<Primitive> {
        require_positive("cone height", height)?;
        let base = Self::cone(apex, axis, angle)?;
        let (apex, axis, angle) = match base.kind {
            PrimitiveKind::Cone { apex, axis, angle } => (apex, axis, angle),
            _ => unreachable!(),
        };

        Ok(Self::with_kind(PrimitiveKind::LimitedCone {
            apex, axis, angle, height,
        }))
    }

    /// Creates an infinite cylinder around the local Y axis.
    pub fn cylinder(radius: f64) -> Result<Primitive> {
        require_positive("cylinder radius", radius)?;
        Ok(Self::with_kind(PrimitiveKind::Cylinder { radius }))
    }

    /// Creates a capped cylinder of `height` centered on the local origin.
    pub fn limited_cylinder(radius: f64, height: f64) -> Result<Primitive> {
        require_positive("cylinder radius", radius)?;
        require_positive("cylinder height", height)?;
        Ok(Self::with_kind(PrimitiveKind::LimitedCylinder { radius, height }))
    }

    /// Creates a torus in the local XZ plane around the Y axis.
    pub fn torus(major: f64, minor: f64) -> Result<Primitive> {
        require_positive("torus major radius", major)?;
        require_positive("torus minor radius", minor)?;
        Ok(Self::with_kind(PrimitiveKind::Torus { major, minor }))
    }

    /// Creates a triangle from three vertices.
    pub fn triangle(p1: Vector3D, p2: Vector3D, p3: Vector3D)
        -> Result<Primitive> {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e1.cross(&e2).normalized()
            .map_err(|_| TracerError::DegenerateTriangle)?;

        Ok(Self::with_kind(PrimitiveKind::Triangle {
            p1, p2, p3, e1, e2, normal,
        }))
    }

    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: PrimitiveId) {
        self.id = id;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replaces the primitive's transform, refreshing the cached inverse.
    ///
    /// A non-invertible matrix is substituted with an identity inverse and
    /// the fallback color; the primitive renders wrong but the frame still
    /// completes.
    pub fn set_transform(&mut self, matrix: Matrix) {
        match Transform::from_matrix(matrix) {
            Ok(t) => self.transform = t,
            Err(err) => {
                warn!("primitive transform not invertible ({}), \
                       falling back to identity inverse", err);
                self.transform = Transform::with_identity_inverse(matrix);
                self.color = color::FALLBACK;
            }
        }
    }

    /// Intersects a world-space ray with this primitive.
    ///
    /// The ray is taken into local space through the cached inverse
    /// transform, the variant's local equation is solved, and the nearest
    /// root above the hit epsilon is converted back to world space. A miss
    /// is the expected empty outcome, never an error.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let local = ray.to_local(&self.transform);
        let t = self.local_intersect(&local)?;

        let local_point = local.position(t);
        let local_normal = self.local_normal_at(&local_point);
        let mut normal = match self.transform.apply_to_normal(&local_normal) {
            Ok(n) => n,
            Err(_) => return None,
        };

        // Orient the normal against the incoming ray.
        if normal.dot(&ray.direction) > 0.0 {
            normal = -normal;
        }

        Some(Intersection {
            distance: t,
            point: ray.position(t),
            normal,
            color: self.surface_color(&local_point),
            primitive: self.id,
        })
    }

    /// Computes the world-space unit normal at a world-space point.
    pub fn normal_at(&self, world_point: &Vector3D) -> Result<Vector3D> {
        let local = self.transform.apply_inverse_to_point(world_point);
        self.transform.apply_to_normal(&self.local_normal_at(&local))
    }

    /// The surface color at a local-space point. Only checkered planes
    /// vary across their surface.
    fn surface_color(&self, local_point: &Vector3D) -> Color {
        if let PrimitiveKind::Plane { axis, checker: Some(checker), .. }
            = &self.kind {
            let (u, v) = axis.planar_coords(local_point);
            let parity = (u / checker.size).floor()
                + (v / checker.size).floor();

            if parity.rem_euclid(2.0) < 1.0 {
                self.color
            } else {
                checker.secondary
            }
        } else {
            self.color
        }
    }

    fn local_intersect(&self, ray: &Ray) -> Option<f64> {
        match &self.kind {
            PrimitiveKind::Sphere { radius } =>
                intersect_sphere(ray, *radius),
            PrimitiveKind::Plane { axis, position, .. } =>
                intersect_plane(ray, *axis, *position),
            PrimitiveKind::Cone { apex, axis, angle } =>
                intersect_cone(ray, apex, axis, *angle, None),
            PrimitiveKind::LimitedCone { apex, axis, angle, height } =>
                intersect_limited_cone(ray, apex, axis, *angle, *height),
            PrimitiveKind::Cylinder { radius } =>
                intersect_cylinder(ray, *radius),
            PrimitiveKind::LimitedCylinder { radius, height } =>
                intersect_limited_cylinder(ray, *radius, *height),
            PrimitiveKind::Torus { major, minor } =>
                intersect_torus(ray, *major, *minor),
            PrimitiveKind::Triangle { p1, e1, e2, .. } =>
                intersect_triangle(ray, p1, e1, e2),
        }
    }

    fn local_normal_at(&self, p: &Vector3D) -> Vector3D {
        match &self.kind {
            PrimitiveKind::Sphere { .. } => *p,

            PrimitiveKind::Plane { axis, .. } => axis.unit(),

            PrimitiveKind::Cone { apex, axis, angle } =>
                cone_normal(p, apex, axis, *angle),

            PrimitiveKind::LimitedCone { apex, axis, angle, height } => {
                let v = *p - *apex;
                let m = v.dot(axis);
                let radial = v - *axis * m;
                let cap_radius = *height * angle.tan();

                // Points on the base cap take the axis as their normal.
                if m >= *height - HIT_EPSILON
                    && radial.dot(&radial) <= cap_radius.powi(2) {
                    *axis
                } else {
                    cone_normal(p, apex, axis, *angle)
                }
            },

            PrimitiveKind::Cylinder { .. } =>
                Vector3D::new(p.x, 0.0, p.z),

            PrimitiveKind::LimitedCylinder { radius, height } => {
                let half = height / 2.0;
                let dist = p.x.powi(2) + p.z.powi(2);

                if dist <= radius.powi(2) && p.y >= half - HIT_EPSILON {
                    Vector3D::new(0.0, 1.0, 0.0)
                } else if dist <= radius.powi(2) && p.y <= -half + HIT_EPSILON {
                    Vector3D::new(0.0, -1.0, 0.0)
                } else {
                    Vector3D::new(p.x, 0.0, p.z)
                }
            },

            PrimitiveKind::Torus { major, minor } => {
                let sum = p.dot(p) + major.powi(2) - minor.powi(2);
                Vector3D::new(
                    p.x * (sum - 2.0 * major.powi(2)),
                    p.y * sum,
                    p.z * (sum - 2.0 * major.powi(2)),
                )
            },

            PrimitiveKind::Triangle { normal, .. } => *normal,
        }
    }
}

/// Quadratic sphere intersection; the smaller positive root wins.
fn intersect_sphere(ray: &Ray, radius: f64) -> Option<f64> {
    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&ray.origin);
    let c = ray.origin.dot(&ray.origin) - radius.powi(2);

    let discriminant = b.powi(2) - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

    if t1 > HIT_EPSILON {
        Some(t1)
    } else if t2 > HIT_EPSILON {
        Some(t2)
    } else {
        None
    }
}

fn intersect_plane(ray: &Ray, axis: Axis, position: f64) -> Option<f64> {
    let denom = axis.component(&ray.direction);
    if denom.abs() < PLANE_PARALLEL_EPSILON {
        return None;
    }

    let t = (position - axis.component(&ray.origin)) / denom;
    if t > HIT_EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Apex-relative cone quadratic. Roots are filtered to the correct nappe
/// and, when `height` is given, to the `[0, height]` band along the axis.
fn intersect_cone(ray: &Ray, apex: &Vector3D, axis: &Vector3D, angle: f64,
    height: Option<f64>) -> Option<f64> {
    let co = ray.origin - *apex;
    let cos2 = angle.cos().powi(2);

    let dv = ray.direction.dot(axis);
    let cv = co.dot(axis);

    let a = dv.powi(2) - cos2 * ray.direction.dot(&ray.direction);
    let b = 2.0 * (dv * cv - cos2 * ray.direction.dot(&co));
    let c = cv.powi(2) - cos2 * co.dot(&co);

    let mut candidates = [None, None];
    if a.abs() < DEGENERACY_EPSILON {
        // The quadratic degenerates; a single lateral hit may remain.
        if b.abs() >= DEGENERACY_EPSILON {
            candidates[0] = Some(-c / b);
        }
    } else {
        let mut disc = b.powi(2) - 4.0 * a * c;
        if disc < -CONE_DISCRIMINANT_EPSILON {
            return None;
        }
        disc = disc.max(0.0);

        let mut t0 = (-b - disc.sqrt()) / (2.0 * a);
        let mut t1 = (-b + disc.sqrt()) / (2.0 * a);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        candidates[0] = Some(t0);
        candidates[1] = Some(t1);
    }

    let mut best: Option<f64> = None;
    for t in candidates.into_iter().flatten() {
        if t <= HIT_EPSILON {
            continue;
        }

        // Reject hits on the wrong nappe (or outside the height band).
        let m = (ray.position(t) - *apex).dot(axis);
        if m < -CONE_NAPPE_EPSILON {
            continue;
        }
        if let Some(h) = height {
            if m > h {
                continue;
            }
        }

        if best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    }

    best
}

fn intersect_limited_cone(ray: &Ray, apex: &Vector3D, axis: &Vector3D,
    angle: f64, height: f64) -> Option<f64> {
    let lateral = intersect_cone(ray, apex, axis, angle, Some(height));

    // Analytic disk test for the base cap.
    let cap_center = *apex + *axis * height;
    let cap_radius = height * angle.tan();
    let denom = ray.direction.dot(axis);

    let cap = if denom.abs() >= PLANE_PARALLEL_EPSILON {
        let t = (cap_center - ray.origin).dot(axis) / denom;
        let offset = ray.position(t) - cap_center;
        if t > HIT_EPSILON && offset.dot(&offset) <= cap_radius.powi(2) {
            Some(t)
        } else {
            None
        }
    } else {
        None
    };

    match (lateral, cap) {
        (Some(l), Some(c)) => Some(l.min(c)),
        (Some(l), None) => Some(l),
        (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}

/// Lateral cylinder quadratic over the two non-axis coordinates.
fn intersect_cylinder(ray: &Ray, radius: f64) -> Option<f64> {
    let a = ray.direction.x.powi(2) + ray.direction.z.powi(2);

    // Parallel to the axis: no lateral hit is possible.
    if a < DEGENERACY_EPSILON {
        return None;
    }

    let b = 2.0 * (ray.origin.x * ray.direction.x
            + ray.origin.z * ray.direction.z);
    let c = ray.origin.x.powi(2) + ray.origin.z.powi(2) - radius.powi(2);

    let disc = b.powi(2) - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let t0 = (-b - disc.sqrt()) / (2.0 * a);
    let t1 = (-b + disc.sqrt()) / (2.0 * a);

    if t0 > HIT_EPSILON {
        Some(t0)
    } else if t1 > HIT_EPSILON {
        Some(t1)
    } else {
        None
    }
}

/// Body plus both cap disks, merged through a shared closest-so-far.
fn intersect_limited_cylinder(ray: &Ray, radius: f64, height: f64)
    -> Option<f64> {
    let half = height / 2.0;
    let mut closest: Option<f64> = None;

    let mut consider = |t: f64| {
        if t > HIT_EPSILON && closest.map_or(true, |c| t < c) {
            closest = Some(t);
        }
    };

    let a = ray.direction.x.powi(2) + ray.direction.z.powi(2);
    if a >= DEGENERACY_EPSILON {
        let b = 2.0 * (ray.origin.x * ray.direction.x
                + ray.origin.z * ray.direction.z);
        let c = ray.origin.x.powi(2) + ray.origin.z.powi(2) - radius.powi(2);

        let disc = b.powi(2) - 4.0 * a * c;
        if disc >= 0.0 {
            for t in [(-b - disc.sqrt()) / (2.0 * a),
                      (-b + disc.sqrt()) / (2.0 * a)] {
                let y = ray.origin.y + t * ray.direction.y;
                if y.abs() <= half {
                    consider(t);
                }
            }
        }
    }

    if ray.direction.y.abs() >= PLANE_PARALLEL_EPSILON {
        for plane_y in [-half, half] {
            let t = (plane_y - ray.origin.y) / ray.direction.y;
            let x = ray.origin.x + t * ray.direction.x;
            let z = ray.origin.z + t * ray.direction.z;
            if x.powi(2) + z.powi(2) <= radius.powi(2) {
                consider(t);
            }
        }
    }

    closest
}

/// Quartic torus intersection by fixed-step sign-change bracketing plus
/// Newton refinement. Best-effort numerics: the sampling step and range
/// bound the smallest feature this can resolve.
fn intersect_torus(ray: &Ray, major: f64, minor: f64) -> Option<f64> {
    let k = major.powi(2) - minor.powi(2);

    let f = |t: f64| -> f64 {
        let p = ray.position(t);
        let sum = p.dot(&p) + k;
        sum.powi(2) - 4.0 * major.powi(2) * (p.x.powi(2) + p.z.powi(2))
    };

    let f_prime = |t: f64| -> f64 {
        let p = ray.position(t);
        let sum = p.dot(&p) + k;
        4.0 * sum * p.dot(&ray.direction)
            - 8.0 * major.powi(2)
                * (p.x * ray.direction.x + p.z * ray.direction.z)
    };

    let mut prev_t = HIT_EPSILON;
    let mut prev_f = f(prev_t);
    let mut t = prev_t + TORUS_SAMPLE_STEP;

    while t <= TORUS_MAX_DISTANCE {
        let ft = f(t);

        if prev_f * ft <= 0.0 {
            // Polish the bracketed root with Newton iterations.
            let mut root = (prev_t + t) / 2.0;
            for _ in 0..TORUS_NEWTON_ITERATIONS {
                let d = f_prime(root);
                if d.abs() < DEGENERACY_EPSILON {
                    break;
                }
                root -= f(root) / d;
            }

            if root > HIT_EPSILON && f(root).abs() <= TORUS_ROOT_TOLERANCE {
                return Some(root);
            }
        }

        prev_t = t;
        prev_f = ft;
        t += TORUS_SAMPLE_STEP;
    }

    None
}

/// Moeller-Trumbore triangle intersection.
fn intersect_triangle(ray: &Ray, p1: &Vector3D, e1: &Vector3D, e2: &Vector3D)
    -> Option<f64> {
    let h = ray.direction.cross(e2);
    let det = e1.dot(&h);

    if det.abs() < TRIANGLE_PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / det;
    let s = ray.origin - *p1;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(e1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * e2.dot(&q);
    if t < HIT_EPSILON {
        return None;
    }

    Some(t)
}

/// Lateral cone normal from the surface gradient, oriented outward.
fn cone_normal(p: &Vector3D, apex: &Vector3D, axis: &Vector3D, angle: f64)
    -> Vector3D {
    let v = *p - *apex;
    if v.dot(&v) < DEGENERACY_EPSILON {
        return *axis;
    }

    let cos2 = angle.cos().powi(2);
    v * cos2 - *axis * v.dot(axis)
}

/* Tests */

#[cfg(test)]
fn axis_ray(origin: Vector3D, direction: Vector3D) -> Ray {
    Ray::new(origin, direction).unwrap()
}

#[test]
fn sphere_hit_along_axis() {
    use crate::feq;

    let s = Primitive::sphere(1.5).unwrap();
    let r = axis_ray(Vector3D::new(0.0, 0.0, -5.0), Vector3D::new(0.0, 0.0, 1.0));

    let hit = s.intersect(&r).unwrap();
    assert!(feq(hit.distance, 3.5));
    assert_eq!(hit.point, Vector3D::new(0.0, 0.0, -1.5));
    assert_eq!(hit.normal, Vector3D::new(0.0, 0.0, -1.0));
}

#[test]
fn sphere_behind_ray_misses() {
    let s = Primitive::sphere(1.0).unwrap();
    let r = axis_ray(Vector3D::new(0.0, 0.0, 5.0), Vector3D::new(0.0, 0.0, 1.0));

    assert!(s.intersect(&r).is_none());
}

#[test]
fn ray_inside_sphere_hits_far_wall() {
    use crate::feq;

    let s = Primitive::sphere(1.0).unwrap();
    let r = axis_ray(Vector3D::zero(), Vector3D::new(0.0, 0.0, 1.0));

    let hit = s.intersect(&r).unwrap();
    assert!(feq(hit.distance, 1.0));
    // The normal opposes the ray even from the inside.
    assert_eq!(hit.normal, Vector3D::new(0.0, 0.0, -1.0));
}

#[test]
fn translated_sphere_hit() {
    use crate::feq;

    let mut s = Primitive::sphere(1.0).unwrap();
    s.set_transform(Matrix::translation(0.0, 0.0, 5.0));

    let r = axis_ray(Vector3D::new(0.0, 0.0, -5.0), Vector3D::new(0.0, 0.0, 1.0));
    let hit = s.intersect(&r).unwrap();

    assert!(feq(hit.distance, 9.0));
}

#[test]
fn scaled_sphere_hit() {
    use crate::feq;

    let mut s = Primitive::sphere(1.0).unwrap();
    s.set_transform(Matrix::scaling(2.0, 2.0, 2.0));

    let r = axis_ray(Vector3D::new(0.0, 0.0, -5.0), Vector3D::new(0.0, 0.0, 1.0));
    let hit = s.intersect(&r).unwrap();

    assert!(feq(hit.distance, 3.0));
}

#[test]
fn sphere_rejects_bad_radius() {
    assert!(matches!(Primitive::sphere(0.0),
        Err(TracerError::NonPositiveParameter { .. })));
    assert!(matches!(Primitive::sphere(-2.0),
        Err(TracerError::NonPositiveParameter { .. })));
}

#[test]
fn plane_hit_and_parallel_miss() {
    use crate::feq;

    let p = Primitive::plane(Axis::Y, 0.0).unwrap();

    let down = axis_ray(Vector3D::new(0.0, 3.0, 0.0),
        Vector3D::new(0.0, -1.0, 0.0));
    let hit = p.intersect(&down).unwrap();
    assert!(feq(hit.distance, 3.0));
    assert_eq!(hit.normal, Vector3D::new(0.0, 1.0, 0.0));

    let sideways = axis_ray(Vector3D::new(0.0, 3.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    assert!(p.intersect(&sideways).is_none());
}

#[test]
fn checkerboard_parity() {
    let mut p = Primitive::checkerboard(Axis::Z, 0.0, 10.0, color::BLACK)
        .unwrap();
    p.set_color(color::WHITE);

    let shoot = |x: f64, y: f64| {
        let r = axis_ray(Vector3D::new(x, y, -5.0),
            Vector3D::new(0.0, 0.0, 1.0));
        p.intersect(&r).unwrap().color
    };

    assert_eq!(shoot(5.0, 5.0), color::WHITE);
    assert_eq!(shoot(25.0, 5.0), color::WHITE);
    assert_eq!(shoot(15.0, 5.0), color::BLACK);
    assert_eq!(shoot(-5.0, 5.0), color::BLACK);
}

#[test]
fn checker_size_must_be_positive() {
    assert!(matches!(
        Primitive::checkerboard(Axis::Y, 0.0, 0.0, color::BLACK),
        Err(TracerError::NonPositiveParameter { .. })));
}

#[test]
fn cone_hit_on_correct_nappe() {
    use crate::feq;

    // Apex at origin, opening along +Y at 45 degrees.
    let c = Primitive::cone(Vector3D::zero(), Vector3D::new(0.0, 1.0, 0.0),
        std::f64::consts::FRAC_PI_4).unwrap();

    let r = axis_ray(Vector3D::new(-5.0, 1.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    let hit = c.intersect(&r).unwrap();

    // At height y=1 the 45-degree cone has radius 1.
    assert!(feq(hit.distance, 4.0));

    // A mirror-image hit below the apex is on the wrong nappe.
    let below = axis_ray(Vector3D::new(-5.0, -1.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    assert!(c.intersect(&below).is_none());
}

#[test]
fn cone_normal_is_perpendicular_to_slant() {
    let c = Primitive::cone(Vector3D::zero(), Vector3D::new(0.0, 1.0, 0.0),
        std::f64::consts::FRAC_PI_4).unwrap();

    let n = c.normal_at(&Vector3D::new(1.0, 1.0, 0.0)).unwrap();
    let inv_sqrt2 = 1.0 / 2.0f64.sqrt();

    assert_eq!(n, Vector3D::new(inv_sqrt2, -inv_sqrt2, 0.0));
}

#[test]
fn cone_rejects_invalid_angle() {
    let apex = Vector3D::zero();
    let axis = Vector3D::new(0.0, 1.0, 0.0);

    assert!(matches!(Primitive::cone(apex, axis, 0.0),
        Err(TracerError::AngleOutOfRange(_))));
    assert!(matches!(Primitive::cone(apex, axis, std::f64::consts::FRAC_PI_2),
        Err(TracerError::AngleOutOfRange(_))));
    assert!(matches!(Primitive::cone(apex, Vector3D::zero(), 0.5),
        Err(TracerError::DegenerateAxis)));
}

#[test]
fn limited_cone_height_band_and_cap() {
    use crate::feq;

    let c = Primitive::limited_cone(Vector3D::zero(),
        Vector3D::new(0.0, 1.0, 0.0), std::f64::consts::FRAC_PI_4, 2.0)
        .unwrap();

    // Lateral hit inside the band.
    let body = axis_ray(Vector3D::new(-5.0, 1.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    assert!(feq(c.intersect(&body).unwrap().distance, 4.0));

    // Above the band the lateral surface no longer exists.
    let above = axis_ray(Vector3D::new(-5.0, 3.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    assert!(c.intersect(&above).is_none());

    // A ray descending onto the base cap hits the disk at y=2.
    let onto_cap = axis_ray(Vector3D::new(0.5, 5.0, 0.0),
        Vector3D::new(0.0, -1.0, 0.0));
    let hit = c.intersect(&onto_cap).unwrap();
    assert!(feq(hit.distance, 3.0));
    assert_eq!(hit.normal, Vector3D::new(0.0, 1.0, 0.0));
}

#[test]
fn cylinder_hit_and_parallel_miss() {
    use crate::feq;

    let c = Primitive::cylinder(1.0).unwrap();

    let r = axis_ray(Vector3D::new(-5.0, 2.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    let hit = c.intersect(&r).unwrap();
    assert!(feq(hit.distance, 4.0));
    assert_eq!(hit.normal, Vector3D::new(-1.0, 0.0, 0.0));

    let parallel = axis_ray(Vector3D::new(0.5, 0.0, 0.0),
        Vector3D::new(0.0, 1.0, 0.0));
    assert!(c.intersect(&parallel).is_none());
}

#[test]
fn limited_cylinder_body_and_caps() {
    use crate::feq;

    let c = Primitive::limited_cylinder(1.0, 2.0).unwrap();

    // Body hit within the height band.
    let body = axis_ray(Vector3D::new(-5.0, 0.5, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    assert!(feq(c.intersect(&body).unwrap().distance, 4.0));

    // Outside the band the body does not exist.
    let outside = axis_ray(Vector3D::new(-5.0, 1.5, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));
    assert!(c.intersect(&outside).is_none());

    // A descending ray hits the top cap first.
    let down = axis_ray(Vector3D::new(0.0, 5.0, 0.0),
        Vector3D::new(0.0, -1.0, 0.0));
    let hit = c.intersect(&down).unwrap();
    assert!(feq(hit.distance, 4.0));
    assert_eq!(hit.normal, Vector3D::new(0.0, 1.0, 0.0));

    // An ascending ray from below hits the bottom cap.
    let up = axis_ray(Vector3D::new(0.0, -5.0, 0.0),
        Vector3D::new(0.0, 1.0, 0.0));
    let hit = c.intersect(&up).unwrap();
    assert!(feq(hit.distance, 4.0));
    assert_eq!(hit.normal, Vector3D::new(0.0, -1.0, 0.0));
}

#[test]
fn torus_hit_from_outside() {
    let t = Primitive::torus(2.0, 0.5).unwrap();
    let r = axis_ray(Vector3D::new(-5.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0));

    let hit = t.intersect(&r).unwrap();
    assert!((hit.distance - 2.5).abs() < 1e-3);
    assert_eq!(hit.normal, Vector3D::new(-1.0, 0.0, 0.0));
}

#[test]
fn torus_miss_through_hole() {
    let t = Primitive::torus(2.0, 0.5).unwrap();
    let r = axis_ray(Vector3D::new(0.0, -5.0, 0.0),
        Vector3D::new(0.0, 1.0, 0.0));

    assert!(t.intersect(&r).is_none());
}

#[test]
fn triangle_hit_and_rejections() {
    use crate::feq;

    let t = Primitive::triangle(
        Vector3D::new(0.0, 1.0, 0.0),
        Vector3D::new(-1.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0),
    ).unwrap();

    // Straight through the middle.
    let inside = axis_ray(Vector3D::new(0.0, 0.5, -2.0),
        Vector3D::new(0.0, 0.0, 1.0));
    assert!(feq(t.intersect(&inside).unwrap().distance, 2.0));

    // Past the p1-p3 edge.
    let beside = axis_ray(Vector3D::new(1.0, 1.0, -2.0),
        Vector3D::new(0.0, 0.0, 1.0));
    assert!(t.intersect(&beside).is_none());

    // Parallel to the triangle's plane.
    let parallel = axis_ray(Vector3D::new(0.0, -1.0, -2.0),
        Vector3D::new(0.0, 1.0, 0.0));
    assert!(t.intersect(&parallel).is_none());
}

#[test]
fn degenerate_triangle_is_rejected() {
    let r = Primitive::triangle(
        Vector3D::new(0.0, 0.0, 0.0),
        Vector3D::new(1.0, 0.0, 0.0),
        Vector3D::new(2.0, 0.0, 0.0),
    );

    assert!(matches!(r, Err(TracerError::DegenerateTriangle)));
}

#[test]
fn non_invertible_transform_falls_back() {
    let mut s = Primitive::sphere(1.0).unwrap();
    s.set_transform(Matrix::scaling(0.0, 1.0, 1.0));

    assert_eq!(s.color(), color::FALLBACK);
    assert_eq!(*s.transform().inverse(), Matrix::identity());

    // The primitive still participates in rendering without panicking.
    let r = axis_ray(Vector3D::new(0.0, 0.0, -5.0),
        Vector3D::new(0.0, 0.0, 1.0));
    let _ = s.intersect(&r);
}

#[test]
fn clone_is_independent() {
    let mut original = Primitive::sphere(1.0).unwrap();
    let copy = original.clone();

    original.set_transform(Matrix::translation(10.0, 0.0, 0.0));
    original.set_color(color::RED);

    assert_eq!(*copy.transform(), Transform::new());
    assert_eq!(copy.color(), color::WHITE);
}

#[test]
fn transform_round_trip() {
    let mut s = Primitive::sphere(1.0).unwrap();
    let m = Matrix::translation(1.0, 2.0, 3.0) * Matrix::scaling(2.0, 2.0, 2.0);
    s.set_transform(m);

    for p in [
        Vector3D::zero(),
        Vector3D::new(1.0, -1.0, 0.5),
        Vector3D::new(-3.0, 7.0, 0.125),
    ] {
        assert_eq!(s.transform().apply_to_point(&p), m.mul_point(&p));
        assert_eq!(s.transform().apply_to_vector(&p), m.mul_direction(&p));
    }
}
