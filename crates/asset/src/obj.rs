//! OBJ scanner: positions, normals, texture coordinates, groups, faces and
//! material assignments. Produces per-group meshes with their own vertex
//! buffers; the position/normal/uv tables only live for the duration of a parse.

use std::{io::BufRead, path::Path};

use glam::{Vec2, Vec4};

use crate::{
    error::{ObjError, ObjResult},
    line::{Cursor, Line, parse_vector},
    material::{MaterialId, ObjMaterial},
    mesh::{ObjMesh, ObjVertex},
    mtl,
};

/// Everything a successful parse yields, ready to move into a model.
#[derive(Debug, Default)]
pub(crate) struct ObjData {
    pub meshes: Vec<ObjMesh>,
    pub materials: Vec<ObjMaterial>,
}

/// Raw corner reference `v/vt/vn`, 1-based (negative = relative to the end).
/// `None` marks an empty or `0` uv/normal field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceTriplet {
    pub vertex: i32,
    pub uv: Option<i32>,
    pub normal: Option<i32>,
}

impl FaceTriplet {
    /// Parse a single face corner such as `5`, `5/3`, `5//2` or `5/3/2`.
    pub fn parse(token: &str) -> Result<Self, String> {
        let mut fields = token.split('/');
        let vertex = match fields.next() {
            Some(v) if !v.is_empty() => parse_index(v)?,
            _ => return Err(format!("face corner '{token}' has no vertex index")),
        };
        let uv = parse_optional(fields.next())?;
        let normal = parse_optional(fields.next())?;
        if fields.next().is_some() {
            return Err(format!("face corner '{token}' has too many fields"));
        }
        Ok(Self { vertex, uv, normal })
    }
}

fn parse_index(field: &str) -> Result<i32, String> {
    field
        .parse::<i32>()
        .map_err(|_| format!("invalid index '{field}'"))
}

fn parse_optional(field: Option<&str>) -> Result<Option<i32>, String> {
    match field {
        Some(f) if !f.is_empty() => Ok(Some(parse_index(f)?).filter(|&i| i != 0)),
        _ => Ok(None),
    }
}

/// Turn a 1-based (or negative relative) OBJ index into a table offset.
fn resolve_index(raw: i32, len: usize, attribute: &'static str, at: Cursor<'_>) -> ObjResult<usize> {
    let idx = if raw > 0 {
        raw as i64 - 1
    } else {
        len as i64 + raw as i64
    };
    if raw == 0 || idx < 0 || idx as usize >= len {
        return Err(at.out_of_range(attribute, raw as i64, len));
    }
    Ok(idx as usize)
}

/// Parse state for one OBJ file.
struct ObjParser<'p> {
    directory: &'p Path,
    scale: f32,
    positions: Vec<Vec4>,
    normals: Vec<Vec4>,
    uvs: Vec<Vec2>,
    meshes: Vec<ObjMesh>,
    materials: Vec<ObjMaterial>,
    current: Option<ObjMesh>,
    // usemtl seen before any mesh was open
    pending: Option<MaterialId>,
}

impl<'p> ObjParser<'p> {
    fn new(directory: &'p Path, scale: f32) -> Self {
        Self {
            directory,
            scale,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            current: None,
            pending: None,
        }
    }

    fn line(&mut self, line: Line<'_>, at: Cursor<'_>) -> ObjResult<()> {
        match line.directive {
            "mtllib" => {
                log::debug!("Material file: {}", line.data);
                if line.data.is_empty() {
                    return Err(at.error("mtllib without a file name"));
                }
                let path = self.directory.join(line.data);
                let loaded = mtl::load_mtl_from_path(&path, self.directory)?;
                self.materials.extend(loaded);
            }
            "g" | "o" => {
                log::debug!("OBJ group found: {}", line.data);
                if let Some(done) = self.current.take() {
                    self.meshes.push(done);
                }
                let mut mesh = ObjMesh::new(line.data);
                mesh.material = self.pending.take();
                self.current = Some(mesh);
            }
            "v" => {
                let v = Vec4::from_array(parse_vector(line.data, 3, at)?) * self.scale;
                self.positions.push(v.with_w(1.0));
            }
            "vt" => {
                let uv = parse_vector(line.data, 1, at)?;
                self.uvs.push(Vec2::new(uv[0], uv[1]));
            }
            "vn" => {
                let n = Vec4::from_array(parse_vector(line.data, 3, at)?);
                self.normals.push(n.with_w(0.0));
            }
            "f" => self.face(line.data, at)?,
            "usemtl" => self.use_material(line.data),
            _ => {}
        }
        Ok(())
    }

    fn use_material(&mut self, name: &str) {
        let Some(id) = self.materials.iter().position(|m| m.name == name) else {
            log::warn!("usemtl references unknown material '{name}'");
            return;
        };
        match self.current.as_mut() {
            Some(mesh) => mesh.material = Some(id),
            None => self.pending = Some(id),
        }
    }

    fn face(&mut self, data: &str, at: Cursor<'_>) -> ObjResult<()> {
        let corners = data
            .split_whitespace()
            .map(|token| FaceTriplet::parse(token).map_err(|msg| at.error(msg)))
            .collect::<ObjResult<Vec<_>>>()?;
        if corners.len() < 3 {
            return Err(at.error(format!(
                "face needs at least 3 corners, found {}",
                corners.len()
            )));
        }

        let mut vertices = Vec::with_capacity(corners.len());
        for corner in &corners {
            let mut vertex = ObjVertex::default();
            let p = resolve_index(corner.vertex, self.positions.len(), "vertex", at)?;
            vertex.position = self.positions[p].to_array();
            if let Some(raw) = corner.normal {
                let n = resolve_index(raw, self.normals.len(), "normal", at)?;
                vertex.normal = self.normals[n].to_array();
            }
            if let Some(raw) = corner.uv {
                let t = resolve_index(raw, self.uvs.len(), "uv", at)?;
                vertex.uv = self.uvs[t].to_array();
            }
            vertices.push(vertex);
        }

        // Flat normals for faces read while no `vn` has been seen yet.
        let compute_normals = self.normals.is_empty();
        let pending = &mut self.pending;
        let mesh = self.current.get_or_insert_with(|| {
            let mut mesh = ObjMesh::new("");
            mesh.material = pending.take();
            mesh
        });

        let too_many = || ObjError::TooManyVertices {
            path: at.path.to_path_buf(),
            line: at.line,
        };
        let ci = u32::try_from(mesh.vertices.len()).map_err(|_| too_many())?;
        u32::try_from(mesh.vertices.len() + vertices.len() - 1).map_err(|_| too_many())?;

        // Fan around the first corner; only correct for convex planar polygons.
        let first_triangle = mesh.triangle_count();
        for k in 1..(vertices.len() as u32 - 1) {
            mesh.indices.extend_from_slice(&[ci, ci + k, ci + k + 1]);
        }
        mesh.vertices.extend(vertices);
        if compute_normals {
            mesh.calculate_face_normals_from(first_triangle);
        }
        Ok(())
    }

    fn finish(mut self) -> ObjData {
        if let Some(done) = self.current.take() {
            self.meshes.push(done);
        }
        ObjData {
            meshes: self.meshes,
            materials: self.materials,
        }
    }
}

/// Parse OBJ text. `path` labels errors; `directory` resolves `mtllib` and
/// texture paths; every position is multiplied by `scale`.
pub(crate) fn parse_obj<R: BufRead>(
    reader: R,
    path: &Path,
    directory: &Path,
    scale: f32,
) -> ObjResult<ObjData> {
    let mut parser = ObjParser::new(directory, scale);
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
        parser.line(line, at)?;
    }
    Ok(parser.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec4;
    use std::io::Cursor as IoCursor;

    fn parse(src: &str) -> ObjResult<ObjData> {
        parse_obj(IoCursor::new(src), Path::new("test.obj"), Path::new(""), 1.0)
    }

    const QUAD: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n";

    #[test]
    fn triplet_forms() {
        let full = FaceTriplet::parse("5/3/2").unwrap();
        assert_eq!(full, FaceTriplet { vertex: 5, uv: Some(3), normal: Some(2) });

        let no_uv = FaceTriplet::parse("5//2").unwrap();
        assert_eq!(no_uv, FaceTriplet { vertex: 5, uv: None, normal: Some(2) });

        let bare = FaceTriplet::parse("5").unwrap();
        assert_eq!(bare, FaceTriplet { vertex: 5, uv: None, normal: None });

        let uv_only = FaceTriplet::parse("5/3").unwrap();
        assert_eq!(uv_only, FaceTriplet { vertex: 5, uv: Some(3), normal: None });
    }

    #[test]
    fn zero_and_trailing_empty_fields_are_absent() {
        let t = FaceTriplet::parse("4/0/").unwrap();
        assert_eq!(t, FaceTriplet { vertex: 4, uv: None, normal: None });
    }

    #[test]
    fn malformed_triplets_are_rejected() {
        assert!(FaceTriplet::parse("/1/1").is_err());
        assert!(FaceTriplet::parse("a/1/1").is_err());
        assert!(FaceTriplet::parse("1/2/3/4").is_err());
    }

    #[test]
    fn single_triangle_gets_computed_normal() {
        let data = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(data.meshes.len(), 1);
        let mesh = &data.meshes[0];
        assert_eq!(mesh.name, "");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        for v in &mesh.vertices {
            assert_eq!(v.normal(), vec4(0.0, 0.0, 1.0, 0.0));
        }
    }

    #[test]
    fn ngon_is_fan_triangulated() {
        let src = format!("{QUAD}v 0.5 1.5 0\nf 1 2 3 4 5\n");
        let data = parse(&src).unwrap();
        let mesh = &data.meshes[0];
        assert_eq!(mesh.vertices.len(), 5);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn faces_never_share_vertices() {
        let src = format!("{QUAD}f 1 2 3\nf 1 3 4\n");
        let data = parse(&src).unwrap();
        let mesh = &data.meshes[0];
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn one_mesh_per_group_tag() {
        let src = format!("{QUAD}o first\nf 1 2 3\ng second\nf 1 3 4\ng empty\n");
        let data = parse(&src).unwrap();
        let names: Vec<_> = data.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "empty"]);
        assert_eq!(data.meshes[0].indices, vec![0, 1, 2]);
        assert_eq!(data.meshes[1].indices, vec![0, 1, 2]);
        assert!(!data.meshes[2].is_valid());
    }

    #[test]
    fn explicit_normals_and_uvs_are_copied() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25 0.75\nvn 0 1 0\nf 1/1/1 2//1 3/1\n";
        let data = parse(src).unwrap();
        let v = &data.meshes[0].vertices;
        assert_eq!(v[0].uv, [0.25, 0.75]);
        assert_eq!(v[0].normal(), vec4(0.0, 1.0, 0.0, 0.0));
        assert_eq!(v[1].uv, [0.0, 0.0]);
        assert_eq!(v[1].normal(), vec4(0.0, 1.0, 0.0, 0.0));
        // file declared normals, so corners without one keep the default
        assert_eq!(v[2].normal(), Vec4::ZERO);
    }

    #[test]
    fn faces_before_first_normal_still_get_flat_normals() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nvn 0 1 0\nf 1//1 2//1 3//1\nf 1 3 2\n";
        let data = parse(src).unwrap();
        let v = &data.meshes[0].vertices;
        assert_eq!(v.len(), 9);
        for corner in &v[..3] {
            assert_eq!(corner.normal(), vec4(0.0, 0.0, 1.0, 0.0));
        }
        for corner in &v[3..6] {
            assert_eq!(corner.normal(), vec4(0.0, 1.0, 0.0, 0.0));
        }
        // once a `vn` has been read, faces without normals keep the default
        assert!(v[6..].iter().all(|c| c.normal() == Vec4::ZERO));
    }

    #[test]
    fn computed_normals_follow_each_face_winding() {
        let src = format!("{QUAD}f 1 2 3 4\nf 4 3 2 1\n");
        let data = parse(&src).unwrap();
        let v = &data.meshes[0].vertices;
        assert!(v[..4].iter().all(|c| c.normal() == vec4(0.0, 0.0, 1.0, 0.0)));
        assert!(v[4..].iter().all(|c| c.normal() == vec4(0.0, 0.0, -1.0, 0.0)));
    }

    #[test]
    fn position_w_is_forced_and_scale_applied() {
        let src = "v 1 2 3 7\nv 2 0 0\nv 0 2 0\nf 1 2 3\n";
        let one = parse_obj(IoCursor::new(src), Path::new("a"), Path::new(""), 1.0).unwrap();
        let two = parse_obj(IoCursor::new(src), Path::new("a"), Path::new(""), 2.0).unwrap();
        for (a, b) in one.meshes[0].vertices.iter().zip(&two.meshes[0].vertices) {
            assert_eq!(a.position[3], 1.0);
            assert_eq!(b.position[3], 1.0);
            for i in 0..3 {
                assert_eq!(b.position[i], a.position[i] * 2.0);
            }
        }
        assert_eq!(one.meshes[0].vertices[0].position, [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn negative_indices_count_from_end() {
        let src = format!("{QUAD}f -4 -3 -2\n");
        let data = parse(&src).unwrap();
        let v = &data.meshes[0].vertices;
        assert_eq!(v[0].position, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(v[2].position, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn out_of_range_vertex_is_an_error() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        match err {
            ObjError::IndexOutOfRange { line, attribute, index, len, .. } => {
                assert_eq!((line, attribute, index, len), (3, "vertex", 3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn vertex_index_zero_is_an_error() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn out_of_range_normal_is_an_error() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//2 3//1\n").unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { attribute: "normal", .. }));
    }

    #[test]
    fn degenerate_face_is_an_error() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 3, .. }));
    }

    #[test]
    fn malformed_position_is_an_error() {
        let err = parse("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 1, .. }));
    }

    #[test]
    fn comments_and_unknown_directives_are_ignored() {
        let src = "# header\ns off\nl 1 2\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let data = parse(src).unwrap();
        assert_eq!(data.meshes.len(), 1);
        assert_eq!(data.meshes[0].triangle_count(), 1);
    }

    #[test]
    fn unknown_material_is_ignored() {
        let data = parse("usemtl nothing\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(data.meshes[0].material, None);
    }

    #[test]
    fn crlf_input_parses() {
        let data = parse("v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\ng tri\r\nf 1 2 3\r\n").unwrap();
        assert_eq!(data.meshes[0].name, "tri");
        assert_eq!(data.meshes[0].indices.len(), 3);
    }
}
