pub mod cache;
pub mod error;
pub mod fbx;
pub mod loader;
pub mod obj;

pub use cache::CachedModelLoader;
pub use error::{AssetError, AssetResult};
pub use fbx::parse_fbx;
pub use loader::{FileModelLoader, LoadedModel, ModelBatch, ModelLoader};
pub use obj::parse_obj;
