//! Asset loading: Wavefront OBJ models with their MTL material libraries,
//! texture decoding and a reference-counted texture cache.

pub mod error;
mod line;
pub mod material;
pub mod mesh;
pub mod model;
mod mtl;
pub mod obj;
pub mod texture;
pub mod texture_manager;

pub use error::{ObjError, ObjResult};
pub use material::{MaterialId, ObjMaterial, TextureKind};
pub use mesh::{ObjMesh, ObjVertex};
pub use model::{DEFAULT_SCALE, ObjModel};
pub use obj::FaceTriplet;
pub use texture::{TextureData, TextureFormat};
pub use texture_manager::{TextureHandle, TextureManager};
