//! Material library (`.mtl`) scanner.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::{
    error::{ObjError, ObjResult},
    line::{Cursor, Line, parse_scalar, parse_vector},
    material::{ObjMaterial, TextureKind},
};

/// Open and parse a material library. Texture paths are joined to `directory`.
pub(crate) fn load_mtl_from_path(path: &Path, directory: &Path) -> ObjResult<Vec<ObjMaterial>> {
    log::debug!("Loading material library {}", path.display());
    let file = File::open(path).map_err(|source| ObjError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if let Ok(meta) = file.metadata() {
        log::info!("Material library size: {} KB", meta.len() / 1024);
    }
    parse_mtl(BufReader::new(file), path, directory)
}

pub(crate) fn parse_mtl<R: BufRead>(
    reader: R,
    path: &Path,
    directory: &Path,
) -> ObjResult<Vec<ObjMaterial>> {
    let mut materials = Vec::new();
    let mut current: Option<ObjMaterial> = None;

    for (line_no, raw) in reader.lines().enumerate() {
        let at = Cursor {
            path,
            line: line_no + 1,
        };
        let raw = raw.map_err(|source| ObjError::Read {
            path: path.to_path_buf(),
            line: at.line,
            source,
        })?;
        let Some(line) = Line::classify(&raw) else {
            continue;
        };
        if line.is_comment() {
            log::trace!("{}", line.data);
            continue;
        }

        match line.directive {
            "newmtl" => {
                log::debug!("New material found: {}", line.data);
                if let Some(done) = current.take() {
                    materials.push(done);
                }
                current = Some(ObjMaterial::new(line.data));
            }
            "Ka" => set_rgb(&mut editing(&mut current, &line, at)?.ambient, line.data, at)?,
            "Kd" => set_rgb(&mut editing(&mut current, &line, at)?.diffuse, line.data, at)?,
            "Ks" => set_rgb(&mut editing(&mut current, &line, at)?.specular, line.data, at)?,
            "Ni" => editing(&mut current, &line, at)?.ambient[3] = parse_scalar(line.data, at)?,
            "Ns" => editing(&mut current, &line, at)?.specular[3] = parse_scalar(line.data, at)?,
            "d" => editing(&mut current, &line, at)?.diffuse[3] = parse_scalar(line.data, at)?,
            // Tr is transparency, the complement of dissolve.
            "Tr" => {
                editing(&mut current, &line, at)?.diffuse[3] = 1.0 - parse_scalar(line.data, at)?
            }
            "map_Kd" => set_map(&mut current, &line, TextureKind::Diffuse, directory, at)?,
            "map_Ks" => set_map(&mut current, &line, TextureKind::Specular, directory, at)?,
            "map_bump" | "bump" => set_map(&mut current, &line, TextureKind::Normal, directory, at)?,
            "Ke" | "illum" => {}
            other => log::trace!("Ignoring MTL directive '{other}'"),
        }
    }

    if let Some(done) = current {
        materials.push(done);
    }
    Ok(materials)
}

fn editing<'m>(
    current: &'m mut Option<ObjMaterial>,
    line: &Line<'_>,
    at: Cursor<'_>,
) -> ObjResult<&'m mut ObjMaterial> {
    current
        .as_mut()
        .ok_or_else(|| at.error(format!("'{}' before any newmtl", line.directive)))
}

/// Overwrite rgb, keep the packed scalar in alpha.
fn set_rgb(color: &mut [f32; 4], data: &str, at: Cursor<'_>) -> ObjResult<()> {
    let v = parse_vector(data, 3, at)?;
    color[..3].copy_from_slice(&v[..3]);
    Ok(())
}

/// Map statements may carry options (`-bm 1.0 file.png`); the file is the last token.
fn set_map(
    current: &mut Option<ObjMaterial>,
    line: &Line<'_>,
    kind: TextureKind,
    directory: &Path,
    at: Cursor<'_>,
) -> ObjResult<()> {
    let file = line
        .data
        .split_whitespace()
        .last()
        .ok_or_else(|| at.error(format!("'{}' without a file name", line.directive)))?;
    let path: PathBuf = directory.join(file);
    editing(current, line, at)?.set_texture(kind, path);
    Ok(())
}
