//! A loaded OBJ model: owned meshes and materials plus a world matrix.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use corelib::{Mat4, Transform, Vec3};

use crate::{
    error::{ObjError, ObjResult},
    material::{MaterialId, ObjMaterial},
    mesh::ObjMesh,
    obj::parse_obj,
};

/// Scale applied to positions when none is given.
pub const DEFAULT_SCALE: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct ObjModel {
    file_path: PathBuf,
    meshes: Vec<ObjMesh>,
    materials: Vec<ObjMaterial>,
    scale: f32,
    world: Mat4,
}

impl Default for ObjModel {
    fn default() -> Self {
        Self::with_scale(DEFAULT_SCALE)
    }
}

impl ObjModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty model whose loads multiply every position by `scale`.
    pub fn with_scale(scale: f32) -> Self {
        Self {
            file_path: PathBuf::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            scale,
            world: Mat4::IDENTITY,
        }
    }

    /// Load an OBJ file and every material library it references.
    ///
    /// Replaces any previously loaded content. On error the model is left
    /// with no meshes and no materials.
    pub fn load(&mut self, path: impl AsRef<Path>) -> ObjResult<()> {
        let path = path.as_ref();
        self.unload();
        self.check_scale()?;

        log::info!("Attempting to open file: {}", path.display());
        let file = File::open(path).map_err(|source| ObjError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        if let Ok(meta) = file.metadata() {
            log::info!("File size: {} KB", meta.len() / 1024);
        }

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.load_parsed(BufReader::new(file), path, directory)
    }

    /// Load OBJ text from any reader. `directory` resolves `mtllib` and texture paths.
    pub fn load_from_reader<R: BufRead>(
        &mut self,
        reader: R,
        directory: impl Into<PathBuf>,
    ) -> ObjResult<()> {
        self.unload();
        self.check_scale()?;
        self.load_parsed(reader, Path::new("<reader>"), directory.into())
    }

    /// Convenience helper to parse an OBJ string literal.
    pub fn load_from_str(&mut self, contents: &str, directory: impl Into<PathBuf>) -> ObjResult<()> {
        self.load_from_reader(io::Cursor::new(contents), directory)
    }

    fn check_scale(&self) -> ObjResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ObjError::InvalidScale(self.scale));
        }
        Ok(())
    }

    fn load_parsed<R: BufRead>(&mut self, reader: R, label: &Path, directory: PathBuf) -> ObjResult<()> {
        let data = parse_obj(reader, label, &directory, self.scale)?;
        log::info!(
            "Loaded {}: {} meshes, {} materials",
            label.display(),
            data.meshes.len(),
            data.materials.len()
        );
        self.file_path = directory;
        self.meshes = data.meshes;
        self.materials = data.materials;
        Ok(())
    }

    /// Drop all meshes and materials and forget the source directory.
    pub fn unload(&mut self) {
        self.file_path = PathBuf::new();
        self.meshes.clear();
        self.materials.clear();
    }

    /// Directory of the last loaded file, used as prefix for sub-resources.
    #[inline]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn meshes(&self) -> &[ObjMesh] {
        &self.meshes
    }

    #[inline]
    pub fn materials(&self) -> &[ObjMaterial] {
        &self.materials
    }

    pub fn mesh(&self, index: usize) -> Option<&ObjMesh> {
        self.meshes.get(index)
    }

    /// First mesh with the given group name.
    pub fn mesh_by_name(&self, name: &str) -> Option<&ObjMesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    pub fn material(&self, id: MaterialId) -> Option<&ObjMaterial> {
        self.materials.get(id)
    }

    /// First material with the given name.
    pub fn material_by_name(&self, name: &str) -> Option<&ObjMaterial> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Material attached to `mesh`, if any.
    pub fn material_of(&self, mesh: &ObjMesh) -> Option<&ObjMaterial> {
        mesh.material.and_then(|id| self.material(id))
    }

    #[inline]
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    #[inline]
    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.world = world;
    }

    pub fn set_transform(&mut self, transform: &Transform) {
        self.world = transform.matrix();
    }

    /// Object-space bounding box over every mesh, `None` for an empty model.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds_with(&Mat4::IDENTITY)
    }

    /// Bounding box of the vertices placed by the world matrix.
    pub fn world_bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds_with(&self.world)
    }

    fn bounds_with(&self, m: &Mat4) -> Option<(Vec3, Vec3)> {
        self.meshes
            .iter()
            .flat_map(|mesh| mesh.vertices.iter())
            .map(|v| (*m * v.position()).truncate())
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }
}
