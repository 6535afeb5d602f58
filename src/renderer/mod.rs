pub mod camera;
pub mod gpu;
pub mod instances;

pub use camera::Camera;
pub use gpu::{GpuState, RenderError};
