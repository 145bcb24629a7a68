pub mod consts;
pub mod error;

pub mod vector;
pub mod matrix;
pub mod transform;
pub mod ray;

pub mod color;
pub mod shape;
pub mod light;

pub mod camera;
pub mod scene;

pub mod canvas;
pub mod tile;
pub mod parallel;

pub mod scene_file;

use consts::FEQ_EPSILON;

/// Approximate floating point equality, used pervasively in tests and in
/// component-wise comparisons of vectors, matrices and colors.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
