//! Materials read from MTL libraries.

use std::path::{Path, PathBuf};

/// Index of a material inside its owning [`crate::ObjModel`].
pub type MaterialId = usize;

/// Texture slots a material can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse = 0,
    Specular = 1,
    Normal = 2,
}

impl TextureKind {
    pub const COUNT: usize = 3;
    pub const ALL: [TextureKind; Self::COUNT] =
        [TextureKind::Diffuse, TextureKind::Specular, TextureKind::Normal];
}

/// Surface description. The alpha channel of each colour carries an extra
/// scalar: ambient.a = optical density (`Ni`), diffuse.a = dissolve (`d`),
/// specular.a = specular exponent (`Ns`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    pub textures: [Option<PathBuf>; TextureKind::COUNT],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl ObjMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn texture(&self, kind: TextureKind) -> Option<&Path> {
        self.textures[kind as usize].as_deref()
    }

    #[inline]
    pub fn set_texture(&mut self, kind: TextureKind, path: PathBuf) {
        self.textures[kind as usize] = Some(path);
    }

    #[inline]
    pub fn refraction_index(&self) -> f32 {
        self.ambient[3]
    }

    /// Opacity in `0..=1`.
    #[inline]
    pub fn dissolve(&self) -> f32 {
        self.diffuse[3]
    }

    #[inline]
    pub fn specular_exponent(&self) -> f32 {
        self.specular[3]
    }
}
