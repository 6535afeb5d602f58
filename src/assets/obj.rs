//! Wavefront OBJ geometry reader.
//!
//! Only geometry is read: `v`, `vt`, `vn` and `f`. Faces with more than three
//! corners are fan triangulated. Grouping, smoothing and material statements are
//! skipped; materials are assigned by the scene instead.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::assets::error::{AssetError, AssetResult};
use crate::math::TriangleMesh;

type CornerKey = (usize, Option<usize>, Option<usize>);

pub fn parse_obj(source: &str) -> AssetResult<TriangleMesh> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut mesh = TriangleMesh::default();
    let mut corners: HashMap<CornerKey, u32> = HashMap::new();
    let mut missing_normals = false;

    for (n, raw) in source.lines().enumerate() {
        let line_no = n + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => positions.push(Vec3::from(parse_floats::<3>(parts, 3, line_no)?)),
            "vt" => {
                // `v` is optional and defaults to 0
                let [u, v] = parse_floats::<2>(parts, 1, line_no)?;
                texcoords.push(Vec2::new(u, v));
            }
            "vn" => normals.push(Vec3::from(parse_floats::<3>(parts, 3, line_no)?)),
            "f" => {
                let mut face = Vec::with_capacity(4);
                for token in parts {
                    let key = parse_corner(
                        token,
                        line_no,
                        positions.len(),
                        texcoords.len(),
                        normals.len(),
                    )?;

                    let index = match corners.get(&key) {
                        Some(&index) => index,
                        None => {
                            let index = mesh.vertex_count() as u32;
                            let (p, t, nrm) = key;

                            mesh.vertices.extend_from_slice(&positions[p].to_array());
                            let uv = t.map(|t| texcoords[t]).unwrap_or(Vec2::ZERO);
                            mesh.uvs.extend_from_slice(&uv.to_array());
                            match nrm {
                                Some(i) => mesh.normals.extend_from_slice(&normals[i].to_array()),
                                None => {
                                    missing_normals = true;
                                    mesh.normals.extend_from_slice(&[0.0, 0.0, 0.0]);
                                }
                            }

                            corners.insert(key, index);
                            index
                        }
                    };
                    face.push(index);
                }

                if face.len() < 3 {
                    return Err(AssetError::Parse {
                        line: line_no,
                        message: format!("face has {} corners", face.len()),
                    });
                }

                for k in 1..face.len() - 1 {
                    mesh.indices.extend_from_slice(&[face[0], face[k], face[k + 1]]);
                }
            }
            "o" | "g" | "s" | "mtllib" | "usemtl" | "l" | "p" => {}
            other => {
                log::debug!("obj line {line_no}: skipping '{other}'");
            }
        }
    }

    if mesh.is_empty() {
        return Err(AssetError::Empty);
    }

    if missing_normals {
        mesh.compute_normals();
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Reads up to `N` numbers, of which the first `required` must be present.
/// Missing optional numbers are 0.
fn parse_floats<'a, const N: usize>(
    mut parts: impl Iterator<Item = &'a str>,
    required: usize,
    line: usize,
) -> AssetResult<[f32; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let Some(token) = parts.next() else {
            if i < required {
                return Err(AssetError::Parse {
                    line,
                    message: format!("expected {required} numbers"),
                });
            }
            break;
        };
        *slot = token.parse().map_err(|_| AssetError::Parse {
            line,
            message: format!("invalid number '{token}'"),
        })?;
    }
    Ok(out)
}

fn parse_corner(
    token: &str,
    line: usize,
    positions: usize,
    texcoords: usize,
    normals: usize,
) -> AssetResult<CornerKey> {
    let mut fields = token.split('/');

    let p = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AssetError::Parse {
            line,
            message: format!("face corner '{token}' has no position"),
        })?;
    let p = resolve_index(p, positions, line)?;

    let t = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, texcoords, line)?),
        _ => None,
    };
    let n = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, normals, line)?),
        _ => None,
    };

    Ok((p, t, n))
}

/// OBJ indices are 1-based; negative values count back from the latest element.
fn resolve_index(token: &str, len: usize, line: usize) -> AssetResult<usize> {
    let raw: i64 = token.parse().map_err(|_| AssetError::Parse {
        line,
        message: format!("invalid index '{token}'"),
    })?;

    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        len as i64 + raw
    } else {
        -1
    };

    if resolved < 0 || resolved as usize >= len {
        return Err(AssetError::Parse {
            line,
            message: format!("index {raw} out of range ({len} elements)"),
        });
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
o Quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.uvs[4..6], &[1.0, 1.0]);
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_corner_forms_and_negative_indices() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f -3//1 -2//1 -1//1
f 1 2 3
f 1/ 2/ 3/
";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.triangle_count(), 3);
        // v//vn corners differ from bare v corners
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\n\nf 1 2 7\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 4, .. }), "{err}");
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = parse_obj("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 1, .. }), "{err}");
    }

    #[test]
    fn test_degenerate_face_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_single_component_texcoord_defaults_v() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25\nvt 0.5 0.75 0\nf 1/1 2/2 3/1\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(&mesh.uvs[0..2], &[0.25, 0.0]);
        assert_eq!(&mesh.uvs[2..4], &[0.5, 0.75]);
    }

    #[test]
    fn test_texcoord_without_numbers_is_rejected() {
        let err = parse_obj("vt\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 1, .. }), "{err}");
    }

    #[test]
    fn test_no_faces_is_empty() {
        assert!(matches!(parse_obj("v 0 0 0\n"), Err(AssetError::Empty)));
    }
}
