pub mod heart;
pub mod mesh;

pub use heart::{HeartParams, generate_heart};
pub use mesh::{MeshError, TriangleMesh, generate_torus};
