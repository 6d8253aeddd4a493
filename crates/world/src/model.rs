// Model decoder - mesh assets (`.ob3`)
//
// Layout, big-endian and unpadded:
//   vertex_count:u16 face_count:u16
//   x[vertex_count]:i16 y[vertex_count]:i16 z[vertex_count]:i16
//   face_vertex_count[face_count]:u8
//   fill_back[face_count]:i16 fill_front[face_count]:i16
//   gouraud[face_count]:u8
//   per face: face_vertex_count[i] indices, u8 when vertex_count <= 255, u16 otherwise

use std::path::{Path, PathBuf};

use mapview_shared::ByteBuffer;
use serde::Serialize;
use thiserror::Error;

/// Stored fill value meaning "shade from the vertices"
pub const RAW_GOURAUD_FILL: i16 = 0x7FFF;

/// Value a gouraud-shaded fill or shading flag resolves to
pub const GOURAUD_SENTINEL: i32 = 12_345_678;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model data ends inside {section}: {source}")]
    Truncated {
        section: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("face {face} references vertex {index}, model has {vertex_count}")]
    VertexIndexOutOfRange {
        face: usize,
        index: u16,
        vertex_count: u16,
    },

    #[error("cannot open file: {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model file {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: Box<ModelError>,
    },
}

/// How face vertex indices are stored, fixed per asset by its vertex count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndexWidth {
    U8,
    U16,
}

impl IndexWidth {
    pub fn for_vertex_count(vertex_count: u16) -> Self {
        if vertex_count <= 0xFF {
            IndexWidth::U8
        } else {
            IndexWidth::U16
        }
    }

    fn read(self, buf: &mut ByteBuffer) -> Result<u16, std::io::Error> {
        match self {
            IndexWidth::U8 => buf.read_u8().map(u16::from),
            IndexWidth::U16 => buf.read_u16(),
        }
    }
}

/// Front or back fill of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FaceFill {
    /// Interpolated per-vertex shading
    Gouraud,
    /// Packed 15-bit colour, stored negated
    Color(i16),
    /// Model texture slot
    Texture(i16),
}

impl FaceFill {
    pub fn from_raw(raw: i16) -> Self {
        if raw == RAW_GOURAUD_FILL {
            FaceFill::Gouraud
        } else if raw < 0 {
            FaceFill::Color(raw)
        } else {
            FaceFill::Texture(raw)
        }
    }

    /// Resolved fill value, with gouraud fills replaced by the sentinel
    pub fn value(self) -> i32 {
        match self {
            FaceFill::Gouraud => GOURAUD_SENTINEL,
            FaceFill::Color(raw) | FaceFill::Texture(raw) => i32::from(raw),
        }
    }

    /// 8-bit RGB of a packed colour. The channels are read from the bitwise
    /// complement, five bits each.
    pub fn rgb(self) -> Option<[u8; 3]> {
        match self {
            FaceFill::Color(raw) => {
                let packed = !i32::from(raw);
                Some([
                    ((packed >> 10 & 31) * 8) as u8,
                    ((packed >> 5 & 31) * 8) as u8,
                    ((packed & 31) * 8) as u8,
                ])
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDefinition {
    pub vertices_x: Vec<i16>,
    pub vertices_y: Vec<i16>,
    pub vertices_z: Vec<i16>,
    pub face_vertices: Vec<Vec<u16>>,
    pub face_fill_back: Vec<FaceFill>,
    pub face_fill_front: Vec<FaceFill>,
    pub face_gouraud: Vec<bool>,
}

fn truncated(section: &'static str) -> impl FnOnce(std::io::Error) -> ModelError {
    move |source| ModelError::Truncated { section, source }
}

fn read_i16s(buf: &mut ByteBuffer, count: usize, section: &'static str) -> Result<Vec<i16>, ModelError> {
    (0..count)
        .map(|_| buf.read_i16().map_err(truncated(section)))
        .collect()
}

impl ModelDefinition {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let mut buf = ByteBuffer::from(bytes);

        let vertex_count = buf.read_u16().map_err(truncated("header"))?;
        let face_count = buf.read_u16().map_err(truncated("header"))?;
        let vertices = usize::from(vertex_count);
        let faces = usize::from(face_count);

        let vertices_x = read_i16s(&mut buf, vertices, "vertex x")?;
        let vertices_y = read_i16s(&mut buf, vertices, "vertex y")?;
        let vertices_z = read_i16s(&mut buf, vertices, "vertex z")?;

        let face_vertex_count = buf.read_bytes(faces).map_err(truncated("face sizes"))?;

        let face_fill_back = read_i16s(&mut buf, faces, "back fills")?
            .into_iter()
            .map(FaceFill::from_raw)
            .collect();
        let face_fill_front = read_i16s(&mut buf, faces, "front fills")?
            .into_iter()
            .map(FaceFill::from_raw)
            .collect();

        let face_gouraud = buf
            .read_bytes(faces)
            .map_err(truncated("shading flags"))?
            .into_iter()
            .map(|flag| flag != 0)
            .collect();

        let width = IndexWidth::for_vertex_count(vertex_count);
        let mut face_vertices = Vec::with_capacity(faces);
        for (face, &count) in face_vertex_count.iter().enumerate() {
            let mut indices = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                let index = width.read(&mut buf).map_err(truncated("face indices"))?;
                if index >= vertex_count {
                    return Err(ModelError::VertexIndexOutOfRange {
                        face,
                        index,
                        vertex_count,
                    });
                }
                indices.push(index);
            }
            face_vertices.push(indices);
        }

        if buf.remaining() > 0 {
            tracing::warn!("Model data has {} trailing bytes", buf.remaining());
        }

        Ok(ModelDefinition {
            vertices_x,
            vertices_y,
            vertices_z,
            face_vertices,
            face_fill_back,
            face_fill_front,
            face_gouraud,
        })
    }

    /// Read and decode a model file; nothing is kept on failure
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes).map_err(|err| ModelError::Invalid {
            path: path.to_path_buf(),
            source: Box::new(err),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices_x.len()
    }

    pub fn face_count(&self) -> usize {
        self.face_vertices.len()
    }

    pub fn face_vertex_count(&self, face: usize) -> usize {
        self.face_vertices.get(face).map_or(0, Vec::len)
    }

    pub fn index_width(&self) -> IndexWidth {
        IndexWidth::for_vertex_count(self.vertex_count() as u16)
    }

    pub fn vertex(&self, index: usize) -> Option<[i16; 3]> {
        Some([
            *self.vertices_x.get(index)?,
            *self.vertices_y.get(index)?,
            *self.vertices_z.get(index)?,
        ])
    }

    /// Shading attribute of a face: the sentinel when gouraud, 0 otherwise
    pub fn face_shading(&self, face: usize) -> i32 {
        match self.face_gouraud.get(face) {
            Some(true) => GOURAUD_SENTINEL,
            _ => 0,
        }
    }

    /// Flat colour of a face. The front fill wins when both sides are colours;
    /// textured and gouraud faces have none.
    pub fn face_color(&self, face: usize) -> Option<[u8; 3]> {
        let front = self.face_fill_front.get(face)?;
        let back = self.face_fill_back.get(face)?;
        front.rgb().or_else(|| back.rgb())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct RawFace {
        pub indices: Vec<u16>,
        pub back: i16,
        pub front: i16,
        pub gouraud: u8,
    }

    /// Encode a model in the on-disk layout
    pub(crate) fn encode(vertices: &[[i16; 3]], faces: &[RawFace]) -> Vec<u8> {
        let mut buf = ByteBuffer::new();
        buf.write_u16(vertices.len() as u16);
        buf.write_u16(faces.len() as u16);
        for axis in 0..3 {
            for v in vertices {
                buf.write_i16(v[axis]);
            }
        }
        for face in faces {
            buf.write_u8(face.indices.len() as u8);
        }
        for face in faces {
            buf.write_i16(face.back);
        }
        for face in faces {
            buf.write_i16(face.front);
        }
        for face in faces {
            buf.write_u8(face.gouraud);
        }
        let wide = vertices.len() > 0xFF;
        for face in faces {
            for &index in &face.indices {
                if wide {
                    buf.write_u16(index);
                } else {
                    buf.write_u8(index as u8);
                }
            }
        }
        buf.into_inner()
    }

    pub(crate) fn triangle() -> Vec<u8> {
        encode(
            &[[0, 0, 0], [100, -20, 5], [-7, 300, -1]],
            &[RawFace {
                indices: vec![0, 1, 2],
                back: RAW_GOURAUD_FILL,
                front: -1,
                gouraud: 1,
            }],
        )
    }

    #[test]
    fn test_decode_triangle() {
        let model = ModelDefinition::from_bytes(&triangle()).unwrap();
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.vertices_x, vec![0, 100, -7]);
        assert_eq!(model.vertices_y, vec![0, -20, 300]);
        assert_eq!(model.vertices_z, vec![0, 5, -1]);
        assert_eq!(model.face_vertices, vec![vec![0, 1, 2]]);
        assert_eq!(model.face_fill_back, vec![FaceFill::Gouraud]);
        assert_eq!(model.face_fill_back[0].value(), GOURAUD_SENTINEL);
        assert_eq!(model.face_fill_front, vec![FaceFill::Color(-1)]);
        assert_eq!(model.face_shading(0), GOURAUD_SENTINEL);
        assert_eq!(model.index_width(), IndexWidth::U8);
    }

    #[test]
    fn test_index_width_switches_above_255() {
        for (count, width) in [(255usize, IndexWidth::U8), (256, IndexWidth::U16)] {
            let vertices: Vec<[i16; 3]> =
                (0..count).map(|i| [i as i16, -(i as i16), 1]).collect();
            let last = (count - 1) as u16;
            let bytes = encode(
                &vertices,
                &[
                    RawFace { indices: vec![0, last, 1], back: 3, front: -200, gouraud: 0 },
                    RawFace { indices: vec![last, 2, 3, 4], back: 0x7FFF, front: 0x7FFF, gouraud: 9 },
                ],
            );
            let model = ModelDefinition::from_bytes(&bytes).unwrap();
            assert_eq!(model.index_width(), width);
            assert_eq!(model.vertex_count(), count);
            assert_eq!(model.vertex(count - 1), Some([last as i16, -(last as i16), 1]));
            assert_eq!(model.face_vertices[0], vec![0, last, 1]);
            assert_eq!(model.face_vertices[1], vec![last, 2, 3, 4]);
            assert_eq!(model.face_vertex_count(1), 4);
            assert_eq!(model.face_fill_back[0], FaceFill::Texture(3));
            assert_eq!(model.face_fill_front[0], FaceFill::Color(-200));
            assert_eq!(model.face_fill_front[1], FaceFill::Gouraud);
            assert_eq!(model.face_gouraud, vec![false, true]);
            assert_eq!(model.face_shading(0), 0);
        }
    }

    #[test]
    fn test_truncated_rejected() {
        let bytes = triangle();
        for len in [0, 3, 10, bytes.len() - 1] {
            let err = ModelDefinition::from_bytes(&bytes[..len]).unwrap_err();
            assert!(matches!(err, ModelError::Truncated { .. }), "len {len}: {err}");
        }
    }

    #[test]
    fn test_index_out_of_range_rejected() {
        let bytes = encode(
            &[[0, 0, 0], [1, 1, 1]],
            &[RawFace { indices: vec![0, 1, 2], back: -1, front: -1, gouraud: 0 }],
        );
        assert!(matches!(
            ModelDefinition::from_bytes(&bytes),
            Err(ModelError::VertexIndexOutOfRange { face: 0, index: 2, vertex_count: 2 })
        ));
    }

    #[test]
    fn test_face_color_prefers_front() {
        // !(-1) == 0 -> black, !(-32768) == 0x7FFF -> white
        let bytes = encode(
            &[[0, 0, 0], [1, 0, 0], [0, 1, 0]],
            &[
                RawFace { indices: vec![0, 1, 2], back: i16::MIN, front: -1, gouraud: 0 },
                RawFace { indices: vec![0, 1, 2], back: i16::MIN, front: 5, gouraud: 0 },
                RawFace { indices: vec![0, 1, 2], back: 5, front: 0x7FFF, gouraud: 0 },
            ],
        );
        let model = ModelDefinition::from_bytes(&bytes).unwrap();
        assert_eq!(model.face_color(0), Some([0, 0, 0]));
        assert_eq!(model.face_color(1), Some([248, 248, 248]));
        assert_eq!(model.face_color(2), None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.ob3");
        assert!(matches!(ModelDefinition::load(&path), Err(ModelError::Read { .. })));

        std::fs::write(&path, triangle()).unwrap();
        assert_eq!(ModelDefinition::load(&path).unwrap().face_count(), 1);
    }
}
