//! Binary FBX geometry reader.
//!
//! Walks the node tree of a binary FBX 7.x file (32-bit and 64-bit node headers,
//! raw or zlib-compressed arrays) and merges every `Geometry` under `Objects`
//! into one mesh: control points, polygon vertex indices, and the first normal
//! and UV layers when present. Polygons are fan triangulated. `Model` transforms
//! are not applied; scenes normalize loaded meshes anyway. ASCII FBX is rejected.

use std::collections::HashMap;
use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::assets::error::{AssetError, AssetResult};
use crate::math::TriangleMesh;

const MAGIC: &[u8] = b"Kaydara FBX Binary  \0";
/// First version whose node headers use 64-bit fields.
const WIDE_HEADER_VERSION: u32 = 7500;
const MAX_DEPTH: usize = 64;

type CornerKey = (usize, Option<usize>, Option<usize>);

pub fn parse_fbx(bytes: &[u8]) -> AssetResult<TriangleMesh> {
    let nodes = read_document(bytes)?;
    let objects = nodes
        .iter()
        .find(|n| n.name == "Objects")
        .ok_or_else(|| AssetError::Fbx("no Objects section".to_string()))?;

    let mut mesh = TriangleMesh::default();
    let mut missing_normals = false;
    for geometry in objects.children.iter().filter(|n| n.name == "Geometry") {
        missing_normals |= append_geometry(&mut mesh, geometry)?;
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

enum Property {
    Text(String),
    Floats(Vec<f64>),
    Ints(Vec<i64>),
    /// Scalars and raw blobs; parsed past but not kept.
    Other,
}

struct Node {
    name: String,
    properties: Vec<Property>,
    children: Vec<Node>,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn floats(&self) -> Option<&[f64]> {
        match self.properties.first()? {
            Property::Floats(values) => Some(values),
            _ => None,
        }
    }

    fn ints(&self) -> Option<&[i64]> {
        match self.properties.first()? {
            Property::Ints(values) => Some(values),
            _ => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self.properties.first()? {
            Property::Text(text) => Some(text),
            _ => None,
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn error(&self, message: impl std::fmt::Display) -> AssetError {
        AssetError::Fbx(format!("{message} at byte {}", self.pos))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> AssetResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.error(format_args!("unexpected end of file reading {len} bytes")))?;
        let data = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn bytes<const N: usize>(&mut self) -> AssetResult<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> AssetResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> AssetResult<u32> {
        Ok(u32::from_le_bytes(self.bytes()?))
    }

    fn header_field(&mut self, wide: bool) -> AssetResult<u64> {
        if wide {
            Ok(u64::from_le_bytes(self.bytes()?))
        } else {
            Ok(u64::from(self.u32()?))
        }
    }
}

fn read_document(bytes: &[u8]) -> AssetResult<Vec<Node>> {
    if !bytes.starts_with(MAGIC) {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
        if head.contains("FBX") {
            return Err(AssetError::UnsupportedFormat(
                "ascii fbx (export as binary)".to_string(),
            ));
        }
        return Err(AssetError::Fbx("missing binary FBX signature".to_string()));
    }

    // Signature, then two reserved bytes, then the version.
    let mut reader = Reader {
        data: bytes,
        pos: MAGIC.len() + 2,
    };
    let version = reader.u32()?;
    let wide = version >= WIDE_HEADER_VERSION;
    log::debug!("fbx version {version}");

    let header_len = if wide { 25 } else { 13 };
    let mut nodes = Vec::new();
    while reader.remaining() >= header_len {
        match read_node(&mut reader, wide, 0)? {
            Some(node) => nodes.push(node),
            None => break,
        }
    }
    Ok(nodes)
}

/// Reads one node record. `None` marks the null record closing a node list.
fn read_node(reader: &mut Reader, wide: bool, depth: usize) -> AssetResult<Option<Node>> {
    if depth > MAX_DEPTH {
        return Err(reader.error("nodes nested too deeply"));
    }

    let start = reader.pos;
    let raw_end = reader.header_field(wide)?;
    let property_count = reader.header_field(wide)?;
    let _property_bytes = reader.header_field(wide)?;
    let name_len = reader.u8()? as usize;
    if raw_end == 0 {
        return Ok(None);
    }

    let end = usize::try_from(raw_end)
        .ok()
        .filter(|&end| end > start && end <= reader.data.len())
        .ok_or_else(|| AssetError::Fbx(format!("node at byte {start} ends out of range ({raw_end})")))?;
    let name = String::from_utf8_lossy(reader.take(name_len)?).into_owned();

    let mut properties = Vec::new();
    for _ in 0..property_count {
        properties.push(read_property(reader)?);
    }

    let mut children = Vec::new();
    while reader.pos < end {
        match read_node(reader, wide, depth + 1)? {
            Some(child) => children.push(child),
            None => break,
        }
    }
    if reader.pos > end {
        return Err(AssetError::Fbx(format!(
            "node '{name}' at byte {start} overruns its end"
        )));
    }
    reader.pos = end;

    Ok(Some(Node {
        name,
        properties,
        children,
    }))
}

fn read_property(reader: &mut Reader) -> AssetResult<Property> {
    let code = reader.u8()?;
    let property = match code {
        b'C' => skip(reader, 1)?,
        b'Y' => skip(reader, 2)?,
        b'I' | b'F' => skip(reader, 4)?,
        b'L' | b'D' => skip(reader, 8)?,
        b'S' => {
            let len = reader.u32()? as usize;
            Property::Text(String::from_utf8_lossy(reader.take(len)?).into_owned())
        }
        b'R' => {
            let len = reader.u32()? as usize;
            skip(reader, len)?
        }
        b'f' => Property::Floats(
            read_array(reader, 4)?
                .chunks_exact(4)
                .map(|c| f64::from(f32::from_le_bytes(le(c))))
                .collect(),
        ),
        b'd' => Property::Floats(
            read_array(reader, 8)?
                .chunks_exact(8)
                .map(|c| f64::from_le_bytes(le(c)))
                .collect(),
        ),
        b'i' => Property::Ints(
            read_array(reader, 4)?
                .chunks_exact(4)
                .map(|c| i64::from(i32::from_le_bytes(le(c))))
                .collect(),
        ),
        b'l' => Property::Ints(
            read_array(reader, 8)?
                .chunks_exact(8)
                .map(|c| i64::from_le_bytes(le(c)))
                .collect(),
        ),
        b'b' => {
            read_array(reader, 1)?;
            Property::Other
        }
        other => return Err(reader.error(format_args!("unknown property type {other:#04x}"))),
    };
    Ok(property)
}

fn skip(reader: &mut Reader, len: usize) -> AssetResult<Property> {
    reader.take(len)?;
    Ok(Property::Other)
}

fn le<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut out = [0; N];
    out.copy_from_slice(chunk);
    out
}

/// Array payload as little-endian element bytes, inflated when compressed.
fn read_array(reader: &mut Reader, element_size: usize) -> AssetResult<Vec<u8>> {
    let start = reader.pos;
    let count = reader.u32()? as usize;
    let encoding = reader.u32()?;
    let stored = reader.u32()? as usize;
    let payload = reader.take(stored)?;
    let expected = count * element_size;

    let raw = match encoding {
        0 => payload.to_vec(),
        1 => {
            let mut raw = Vec::new();
            ZlibDecoder::new(payload)
                .take(expected as u64 + 1)
                .read_to_end(&mut raw)?;
            raw
        }
        other => {
            return Err(AssetError::Fbx(format!(
                "array at byte {start} has unknown encoding {other}"
            )));
        }
    };

    if raw.len() != expected {
        return Err(AssetError::Fbx(format!(
            "array at byte {start} holds {} bytes, expected {expected}",
            raw.len()
        )));
    }
    Ok(raw)
}

enum Mapping {
    PolygonVertex,
    ControlPoint,
    Polygon,
    AllSame,
}

/// A `LayerElement*` node: per-corner values such as normals or UVs.
struct Layer<'a> {
    mapping: Mapping,
    values: &'a [f64],
    indices: Option<&'a [i64]>,
    width: usize,
}

impl<'a> Layer<'a> {
    fn find(
        geometry: &'a Node,
        element: &str,
        values: &str,
        indices: &str,
        width: usize,
    ) -> Option<Self> {
        let node = geometry.child(element)?;
        let mapping = match node.child("MappingInformationType").and_then(Node::text) {
            Some("ByPolygonVertex") | None => Mapping::PolygonVertex,
            Some("ByVertice" | "ByVertex" | "ByControlPoint") => Mapping::ControlPoint,
            Some("ByPolygon") => Mapping::Polygon,
            Some("AllSame") => Mapping::AllSame,
            Some(other) => {
                log::warn!("fbx: ignoring {element} mapped {other}");
                return None;
            }
        };
        let indexed = matches!(
            node.child("ReferenceInformationType").and_then(Node::text),
            Some("IndexToDirect" | "Index")
        );

        Some(Self {
            mapping,
            values: node.child(values)?.floats()?,
            indices: if indexed {
                Some(node.child(indices)?.ints()?)
            } else {
                None
            },
            width,
        })
    }

    /// Value index for one polygon corner, if the layer covers it.
    fn lookup(&self, corner: usize, control_point: usize, polygon: usize) -> Option<usize> {
        let slot = match self.mapping {
            Mapping::PolygonVertex => corner,
            Mapping::ControlPoint => control_point,
            Mapping::Polygon => polygon,
            Mapping::AllSame => 0,
        };
        let index = match self.indices {
            Some(indices) => usize::try_from(*indices.get(slot)?).ok()?,
            None => slot,
        };
        (index < self.values.len() / self.width).then_some(index)
    }

    fn value(&self, index: usize) -> &'a [f64] {
        &self.values[index * self.width..(index + 1) * self.width]
    }
}

/// Appends one geometry's polygons. Returns true when some corner had no normal.
fn append_geometry(mesh: &mut TriangleMesh, geometry: &Node) -> AssetResult<bool> {
    let (Some(points), Some(polygon_vertices)) = (
        geometry.child("Vertices").and_then(Node::floats),
        geometry.child("PolygonVertexIndex").and_then(Node::ints),
    ) else {
        return Ok(false);
    };

    let normals = Layer::find(geometry, "LayerElementNormal", "Normals", "NormalsIndex", 3);
    let uvs = Layer::find(geometry, "LayerElementUV", "UV", "UVIndex", 2);
    let control_points = points.len() / 3;

    let mut corners: HashMap<CornerKey, u32> = HashMap::new();
    let mut face: Vec<u32> = Vec::with_capacity(4);
    let mut polygon = 0;
    let mut missing_normals = false;

    for (corner, &raw) in polygon_vertices.iter().enumerate() {
        // The closing corner of each polygon is stored bitwise negated.
        let closes = raw < 0;
        let point = (if closes { !raw } else { raw }) as usize;
        if point >= control_points {
            return Err(AssetError::Fbx(format!(
                "polygon corner {corner} references control point {point} of {control_points}"
            )));
        }

        let normal = normals.as_ref().and_then(|l| l.lookup(corner, point, polygon));
        let uv = uvs.as_ref().and_then(|l| l.lookup(corner, point, polygon));
        missing_normals |= normal.is_none();

        let key = (point, normal, uv);
        let index = match corners.get(&key) {
            Some(&index) => index,
            None => {
                let index = mesh.vertex_count() as u32;
                mesh.vertices
                    .extend(points[point * 3..point * 3 + 3].iter().map(|&v| v as f32));

                match normal.zip(normals.as_ref()) {
                    Some((i, layer)) => mesh.normals.extend(layer.value(i).iter().map(|&v| v as f32)),
                    None => mesh.normals.extend_from_slice(&[0.0; 3]),
                }
                match uv.zip(uvs.as_ref()) {
                    Some((i, layer)) => mesh.uvs.extend(layer.value(i).iter().map(|&v| v as f32)),
                    None => mesh.uvs.extend_from_slice(&[0.0; 2]),
                }

                corners.insert(key, index);
                index
            }
        };
        face.push(index);

        if closes {
            if face.len() >= 3 {
                for k in 1..face.len() - 1 {
                    mesh.indices.extend_from_slice(&[face[0], face[k], face[k + 1]]);
                }
            } else {
                log::debug!("fbx: skipping polygon {polygon} with {} corners", face.len());
            }
            face.clear();
            polygon += 1;
        }
    }

    if !face.is_empty() {
        log::debug!("fbx: dropping unterminated polygon {polygon}");
    }
    Ok(missing_normals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{FileModelLoader, ModelLoader};
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    const QUAD_POINTS: [f64; 12] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
    const QUAD_POLYGON: [i32; 4] = [0, 1, 2, -4];

    /// Builds binary FBX files node by node.
    struct FbxWriter {
        buf: Vec<u8>,
        wide: bool,
    }

    impl FbxWriter {
        fn new(version: u32) -> Self {
            let mut buf = MAGIC.to_vec();
            buf.extend_from_slice(&[0x1a, 0x00]);
            buf.extend_from_slice(&version.to_le_bytes());
            Self {
                buf,
                wide: version >= WIDE_HEADER_VERSION,
            }
        }

        fn field(&mut self, value: usize) {
            if self.wide {
                self.buf.extend_from_slice(&(value as u64).to_le_bytes());
            } else {
                self.buf.extend_from_slice(&(value as u32).to_le_bytes());
            }
        }

        fn null_record(&mut self) {
            let len = if self.wide { 25 } else { 13 };
            self.buf.extend(std::iter::repeat(0u8).take(len));
        }

        fn node(&mut self, name: &str, props: &[Vec<u8>], children: impl FnOnce(&mut Self)) {
            let start = self.buf.len();
            self.field(0);
            self.field(props.len());
            self.field(props.iter().map(Vec::len).sum());
            self.buf.push(name.len() as u8);
            self.buf.extend_from_slice(name.as_bytes());
            for prop in props {
                self.buf.extend_from_slice(prop);
            }

            let body = self.buf.len();
            children(&mut *self);
            if self.buf.len() > body {
                self.null_record();
            }

            let end = self.buf.len();
            if self.wide {
                self.buf[start..start + 8].copy_from_slice(&(end as u64).to_le_bytes());
            } else {
                self.buf[start..start + 4].copy_from_slice(&(end as u32).to_le_bytes());
            }
        }

        fn finish(mut self) -> Vec<u8> {
            self.null_record();
            self.buf
        }
    }

    fn int(value: i32) -> Vec<u8> {
        let mut out = vec![b'I'];
        out.extend_from_slice(&value.to_le_bytes());
        out
    }

    fn long(value: i64) -> Vec<u8> {
        let mut out = vec![b'L'];
        out.extend_from_slice(&value.to_le_bytes());
        out
    }

    fn string(value: &str) -> Vec<u8> {
        let mut out = vec![b'S'];
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
        out
    }

    fn array(code: u8, count: usize, raw: Vec<u8>, compress: bool) -> Vec<u8> {
        let (encoding, payload) = if compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&raw).unwrap();
            (1u32, encoder.finish().unwrap())
        } else {
            (0u32, raw)
        };

        let mut out = vec![code];
        out.extend_from_slice(&(count as u32).to_le_bytes());
        out.extend_from_slice(&encoding.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
        out
    }

    fn f64_array(values: &[f64], compress: bool) -> Vec<u8> {
        let raw = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        array(b'd', values.len(), raw, compress)
    }

    fn i32_array(values: &[i32], compress: bool) -> Vec<u8> {
        let raw = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        array(b'i', values.len(), raw, compress)
    }

    fn quad_file(
        version: u32,
        compress: bool,
        polygon: &[i32],
        layers: impl FnOnce(&mut FbxWriter),
    ) -> Vec<u8> {
        let mut w = FbxWriter::new(version);
        w.node("FBXHeaderExtension", &[], |w| {
            w.node("FBXVersion", &[int(version as i32)], |_| {});
        });
        w.node("Objects", &[], |w| {
            let props = [long(1), string("Geometry::Quad\0\x01Geometry"), string("Mesh")];
            w.node("Geometry", &props, |w| {
                w.node("Vertices", &[f64_array(&QUAD_POINTS, compress)], |_| {});
                w.node("PolygonVertexIndex", &[i32_array(polygon, compress)], |_| {});
                layers(w);
            });
            w.node("Model", &[long(2), string("Model::Quad\0\x01Model")], |_| {});
        });
        w.finish()
    }

    #[test]
    fn test_quad_is_fan_triangulated_with_computed_normals() {
        let mesh = parse_fbx(&quad_file(7400, false, &QUAD_POLYGON, |_| {})).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.vertices[6..9], &[1.0, 1.0, 0.0]);
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn test_compressed_arrays_with_wide_headers() {
        let plain = parse_fbx(&quad_file(7400, false, &QUAD_POLYGON, |_| {})).unwrap();
        let packed = parse_fbx(&quad_file(7500, true, &QUAD_POLYGON, |_| {})).unwrap();
        assert_eq!(plain, packed);
    }

    #[test]
    fn test_normal_and_indexed_uv_layers_are_used() {
        let bytes = quad_file(7400, false, &QUAD_POLYGON, |w| {
            w.node("LayerElementNormal", &[int(0)], |w| {
                w.node("MappingInformationType", &[string("ByPolygonVertex")], |_| {});
                w.node("ReferenceInformationType", &[string("Direct")], |_| {});
                w.node("Normals", &[f64_array(&[0.0, 0.0, -1.0].repeat(4), false)], |_| {});
            });
            w.node("LayerElementUV", &[int(0)], |w| {
                w.node("MappingInformationType", &[string("ByPolygonVertex")], |_| {});
                w.node("ReferenceInformationType", &[string("IndexToDirect")], |_| {});
                let uv = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
                w.node("UV", &[f64_array(&uv, false)], |_| {});
                w.node("UVIndex", &[i32_array(&[3, 2, 1, 0], false)], |_| {});
            });
        });

        let mesh = parse_fbx(&bytes).unwrap();
        // normals come from the file, not from the winding
        for normal in mesh.normals.chunks_exact(3) {
            assert_eq!(normal, &[0.0, 0.0, -1.0]);
        }
        assert_eq!(&mesh.uvs[0..2], &[0.0, 1.0]);
        assert_eq!(&mesh.uvs[6..8], &[0.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_control_point_is_rejected() {
        let err = parse_fbx(&quad_file(7400, false, &[0, 1, -9], |_| {})).unwrap_err();
        assert!(matches!(err, AssetError::Fbx(_)), "{err}");
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let bytes = quad_file(7400, false, &QUAD_POLYGON, |_| {});
        let err = parse_fbx(&bytes[..40]).unwrap_err();
        assert!(matches!(err, AssetError::Fbx(_)), "{err}");
    }

    #[test]
    fn test_file_without_objects_is_rejected() {
        let mut w = FbxWriter::new(7400);
        w.node("FBXHeaderExtension", &[], |_| {});
        let err = parse_fbx(&w.finish()).unwrap_err();
        assert!(matches!(err, AssetError::Fbx(_)), "{err}");
    }

    #[test]
    fn test_ascii_fbx_is_unsupported() {
        let err = parse_fbx(b"; FBX 7.4.0 project file\nFBXHeaderExtension:  {\n").unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedFormat(_)), "{err}");
    }

    #[test]
    fn test_file_loader_reads_fbx_from_disk() {
        let path = std::env::temp_dir().join(format!("heart3d-quad-{}.fbx", std::process::id()));
        std::fs::write(&path, quad_file(7400, true, &QUAD_POLYGON, |_| {})).unwrap();

        let result = FileModelLoader.load(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(result.unwrap().triangle_count(), 2);
    }
}
