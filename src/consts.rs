// Runtime parameters
pub const DEFAULT_TILE_SIZE: usize = 64;
pub const DEFAULT_OUT_FILE: &str = "./out.ppm";

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Threshold under which a magnitude or determinant is treated as zero.
pub const DEGENERACY_EPSILON: f64 = 1e-10;

// Minimum distance along a ray for a root to count as a hit. Rejecting
// roots below this avoids self-intersection acne on secondary rays.
pub const HIT_EPSILON: f64 = 1e-4;

// Per-shape numeric tolerances
pub const PLANE_PARALLEL_EPSILON: f64 = 1e-6;
pub const CONE_DISCRIMINANT_EPSILON: f64 = 1e-6;
pub const CONE_NAPPE_EPSILON: f64 = 1e-6;
pub const TRIANGLE_PARALLEL_EPSILON: f64 = 1e-8;

// Torus root bracketing: the quartic is sampled at fixed increments and
// sign changes are polished with Newton iterations.
pub const TORUS_SAMPLE_STEP: f64 = 0.01;
pub const TORUS_MAX_DISTANCE: f64 = 100.0;
pub const TORUS_ROOT_TOLERANCE: f64 = 1e-3;
pub const TORUS_NEWTON_ITERATIONS: usize = 16;

// Offset applied to shadow-ray tests so a surface never occludes itself.
pub const SHADOW_EPSILON: f64 = 0.001;

// Checker sizes below this are clamped by the scene factory layer.
pub const MIN_CHECKER_SIZE: f64 = 0.001;
