//! Reference-counted texture cache keyed by file path.
//!
//! One manager is created per render context and passed to whoever needs
//! textures. Loading a path that is already cached bumps its count and hands
//! back the same handle; the texture is dropped when the last reference is
//! released.

use std::{
    collections::HashMap,
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{
    material::{ObjMaterial, TextureKind},
    texture::TextureData,
};

/// Opaque id of a cached texture. Ids are never reused by a manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(NonZeroU32);

impl TextureHandle {
    #[inline]
    pub fn id(self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    texture: TextureData,
    ref_count: u32,
}

#[derive(Debug, Default)]
pub struct TextureManager {
    entries: HashMap<TextureHandle, Entry>,
    by_path: HashMap<PathBuf, TextureHandle>,
    last_id: u32,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path` or reuse the cached copy.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle> {
        let path = path.as_ref();
        if let Some(handle) = self.get(path) {
            return Ok(handle);
        }
        let texture = TextureData::load(path)?;
        self.insert(path.to_path_buf(), texture)
    }

    /// Register already decoded pixels under `path`. A path that is already
    /// cached keeps its pixels and gains a reference instead.
    pub fn insert(&mut self, path: PathBuf, texture: TextureData) -> Result<TextureHandle> {
        if let Some(handle) = self.get(&path) {
            return Ok(handle);
        }
        let id = self
            .last_id
            .checked_add(1)
            .and_then(NonZeroU32::new)
            .context("texture handle space exhausted")?;
        self.last_id = id.get();
        let handle = TextureHandle(id);
        log::debug!("Caching texture {:?} as #{}", path, handle.id());
        self.by_path.insert(path.clone(), handle);
        self.entries.insert(
            handle,
            Entry {
                path,
                texture,
                ref_count: 1,
            },
        );
        Ok(handle)
    }

    /// Handle of a cached texture; takes a reference like [`Self::load`].
    pub fn get(&mut self, path: impl AsRef<Path>) -> Option<TextureHandle> {
        let handle = *self.by_path.get(path.as_ref())?;
        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.ref_count += 1;
        }
        Some(handle)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.by_path.contains_key(path.as_ref())
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureData> {
        self.entries.get(&handle).map(|e| &e.texture)
    }

    pub fn ref_count(&self, handle: TextureHandle) -> u32 {
        self.entries.get(&handle).map_or(0, |e| e.ref_count)
    }

    /// Drop one reference; the texture is evicted when none remain.
    /// Unknown handles are ignored.
    pub fn release(&mut self, handle: TextureHandle) {
        let Some(entry) = self.entries.get_mut(&handle) else {
            return;
        };
        entry.ref_count -= 1;
        if entry.ref_count == 0 {
            if let Some(entry) = self.entries.remove(&handle) {
                log::debug!("Evicting texture {:?}", entry.path);
                self.by_path.remove(&entry.path);
            }
        }
    }

    /// Load every texture a material names. Slots whose file cannot be
    /// decoded are left empty and logged.
    pub fn load_material(&mut self, material: &ObjMaterial) -> [Option<TextureHandle>; TextureKind::COUNT] {
        let mut handles = [None; TextureKind::COUNT];
        for kind in TextureKind::ALL {
            let Some(path) = material.texture(kind) else {
                continue;
            };
            match self.load(path) {
                Ok(handle) => handles[kind as usize] = Some(handle),
                Err(err) => log::warn!(
                    "Material '{}' {:?} texture unavailable: {:#}",
                    material.name,
                    kind,
                    err
                ),
            }
        }
        handles
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
