//! Minimal binary glTF (`.glb`) reader for the hero emblem.
//!
//! Reads the primitives of the first mesh (positions, optional normals and
//! indices) and the base PBR factors of the first primitive's material.
//! Textures, node transforms, skins and sparse accessors are not supported.

use std::collections::HashMap;

use serde::Deserialize;

use crate::config::Rgb;
use crate::emblem::{EmblemMesh, Material};
use crate::error::GlbError;

const MAGIC: u32 = 0x4654_6c67; // "glTF"
const CHUNK_JSON: u32 = 0x4e4f_534a;
const CHUNK_BIN: u32 = 0x004e_4942;
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

const FLOAT: u32 = 5126;
const UNSIGNED_BYTE: u32 = 5121;
const UNSIGNED_SHORT: u32 = 5123;
const UNSIGNED_INT: u32 = 5125;
const MODE_TRIANGLES: u32 = 4;
const MAX_BYTE_STRIDE: usize = 252;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Document {
    meshes: Vec<MeshDef>,
    accessors: Vec<AccessorDef>,
    buffer_views: Vec<BufferViewDef>,
    materials: Vec<MaterialDef>,
}

#[derive(Debug, Deserialize)]
struct MeshDef {
    primitives: Vec<PrimitiveDef>,
}

#[derive(Debug, Deserialize)]
struct PrimitiveDef {
    attributes: HashMap<String, usize>,
    indices: Option<usize>,
    material: Option<usize>,
    mode: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessorDef {
    buffer_view: Option<usize>,
    #[serde(default)]
    byte_offset: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferViewDef {
    buffer: usize,
    #[serde(default)]
    byte_offset: usize,
    byte_length: usize,
    byte_stride: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MaterialDef {
    pbr_metallic_roughness: Option<PbrDef>,
    emissive_factor: Option<[f32; 3]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PbrDef {
    base_color_factor: Option<[f32; 4]>,
    metallic_factor: Option<f32>,
    roughness_factor: Option<f32>,
}

pub fn parse_glb(bytes: &[u8]) -> Result<EmblemMesh, GlbError> {
    let magic = read_u32(bytes, 0)?;
    if magic != MAGIC {
        return Err(GlbError::Magic(magic));
    }
    let version = read_u32(bytes, 4)?;
    if version != 2 {
        return Err(GlbError::Version(version));
    }
    let total = read_u32(bytes, 8)? as usize;
    let bytes = slice(bytes, 0, total)?;

    let json_len = read_u32(bytes, HEADER_LEN)? as usize;
    let json_kind = read_u32(bytes, HEADER_LEN + 4)?;
    if json_kind != CHUNK_JSON {
        return Err(GlbError::Chunk {
            expected: "JSON",
            found: json_kind,
        });
    }
    let json_start = HEADER_LEN + CHUNK_HEADER_LEN;
    let json = slice(bytes, json_start, json_len)?;
    let document: Document = serde_json::from_slice(json).map_err(|e| GlbError::Json(e.to_string()))?;

    let bin_header = json_start + json_len;
    let bin = if bytes.len() >= bin_header + CHUNK_HEADER_LEN {
        let bin_len = read_u32(bytes, bin_header)? as usize;
        let bin_kind = read_u32(bytes, bin_header + 4)?;
        if bin_kind != CHUNK_BIN {
            return Err(GlbError::Chunk {
                expected: "BIN",
                found: bin_kind,
            });
        }
        slice(bytes, bin_header + CHUNK_HEADER_LEN, bin_len)?
    } else {
        &[]
    };

    build_mesh(&document, bin)
}

fn build_mesh(doc: &Document, bin: &[u8]) -> Result<EmblemMesh, GlbError> {
    let mesh = doc.meshes.first().ok_or(GlbError::NoGeometry)?;

    let mut positions = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut indices = Vec::new();
    let mut every_primitive_has_normals = true;
    let mut material_index = None;

    for primitive in &mesh.primitives {
        if primitive.mode.unwrap_or(MODE_TRIANGLES) != MODE_TRIANGLES {
            log::debug!("skipping non-triangle primitive");
            continue;
        }
        let Some(&position_index) = primitive.attributes.get("POSITION") else {
            continue;
        };
        let base = positions.len() as u32;
        let prim_positions = read_vec3(doc, bin, position_index)?;
        let count = prim_positions.len();

        match primitive.attributes.get("NORMAL") {
            Some(&normal_index) => normals.extend(read_vec3(doc, bin, normal_index)?),
            None => every_primitive_has_normals = false,
        }

        match primitive.indices {
            Some(index) => {
                for i in read_indices(doc, bin, index)? {
                    if i as usize >= count {
                        return Err(GlbError::Accessor {
                            index,
                            reason: format!("vertex index {i} out of range ({count} vertices)"),
                        });
                    }
                    indices.push(base + i);
                }
            }
            None => indices.extend(base..base + count as u32),
        }
        positions.extend(prim_positions);
        material_index = material_index.or(primitive.material);
    }

    if positions.is_empty() || indices.len() < 3 {
        return Err(GlbError::NoGeometry);
    }
    indices.truncate(indices.len() - indices.len() % 3);

    let material = material_index
        .and_then(|i| doc.materials.get(i))
        .map(material_from)
        .unwrap_or_else(Material::model_default);

    let mesh = if every_primitive_has_normals && normals.len() == positions.len() {
        EmblemMesh {
            positions,
            normals,
            indices,
            material,
        }
    } else {
        EmblemMesh::flat_shaded(&positions, &indices, material)
    };
    Ok(mesh)
}

fn material_from(def: &MaterialDef) -> Material {
    let mut material = Material::model_default();
    if let Some(pbr) = &def.pbr_metallic_roughness {
        if let Some([r, g, b, _]) = pbr.base_color_factor {
            material.base_color = Rgb { r, g, b };
        }
        if let Some(metallic) = pbr.metallic_factor {
            material.metalness = metallic.clamp(0.0, 1.0);
        }
        if let Some(roughness) = pbr.roughness_factor {
            material.roughness = roughness.clamp(0.0, 1.0);
        }
    }
    if let Some([r, g, b]) = def.emissive_factor {
        material.emissive = Rgb { r, g, b };
        material.emissive_intensity = 1.0;
    }
    material
}

/// Resolves an accessor to (bytes of its view, first element offset, stride).
/// A stride of zero means tightly packed.
fn view_of<'a>(doc: &Document, bin: &'a [u8], index: usize) -> Result<(&'a [u8], usize, usize), GlbError> {
    let accessor = accessor(doc, index)?;
    let view_index = accessor.buffer_view.ok_or_else(|| GlbError::Accessor {
        index,
        reason: "accessor has no buffer view".into(),
    })?;
    let view = doc.buffer_views.get(view_index).ok_or_else(|| GlbError::Accessor {
        index,
        reason: format!("buffer view {view_index} missing"),
    })?;
    if view.buffer != 0 {
        return Err(GlbError::Accessor {
            index,
            reason: "only the embedded binary buffer is supported".into(),
        });
    }
    let stride = view.byte_stride.unwrap_or(0);
    if stride > MAX_BYTE_STRIDE {
        return Err(GlbError::Accessor {
            index,
            reason: format!("byteStride {stride} exceeds {MAX_BYTE_STRIDE}"),
        });
    }
    let data = slice(bin, view.byte_offset, view.byte_length)?;
    Ok((data, accessor.byte_offset, stride))
}

/// Byte offset of element `i`, or an accessor error if it does not fit in
/// `usize`.
fn element_at(index: usize, offset: usize, i: usize, stride: usize) -> Result<usize, GlbError> {
    i.checked_mul(stride)
        .and_then(|o| o.checked_add(offset))
        .ok_or_else(|| GlbError::Accessor {
            index,
            reason: format!("element {i} lies beyond addressable memory"),
        })
}

fn read_vec3(doc: &Document, bin: &[u8], index: usize) -> Result<Vec<[f32; 3]>, GlbError> {
    let accessor = accessor(doc, index)?;
    if accessor.component_type != FLOAT || accessor.kind != "VEC3" {
        return Err(GlbError::Accessor {
            index,
            reason: format!("expected FLOAT VEC3, got {} {}", accessor.component_type, accessor.kind),
        });
    }
    let (data, offset, stride) = view_of(doc, bin, index)?;
    let stride = if stride == 0 { 12 } else { stride };

    (0..accessor.count)
        .map(|i| {
            let at = element_at(index, offset, i, stride)?;
            let raw = slice(data, at, 12)?;
            let component = |k: usize| f32::from_le_bytes([raw[k], raw[k + 1], raw[k + 2], raw[k + 3]]);
            Ok([component(0), component(4), component(8)])
        })
        .collect()
}

fn read_indices(doc: &Document, bin: &[u8], index: usize) -> Result<Vec<u32>, GlbError> {
    let accessor = accessor(doc, index)?;
    let size = match accessor.component_type {
        UNSIGNED_BYTE => 1,
        UNSIGNED_SHORT => 2,
        UNSIGNED_INT => 4,
        other => {
            return Err(GlbError::Accessor {
                index,
                reason: format!("unsupported index component type {other}"),
            })
        }
    };
    if accessor.kind != "SCALAR" {
        return Err(GlbError::Accessor {
            index,
            reason: format!("indices must be SCALAR, got {}", accessor.kind),
        });
    }
    let (data, offset, stride) = view_of(doc, bin, index)?;
    let stride = if stride == 0 { size } else { stride };

    (0..accessor.count)
        .map(|i| {
            let at = element_at(index, offset, i, stride)?;
            let raw = slice(data, at, size)?;
            Ok(match size {
                1 => u32::from(raw[0]),
                2 => u32::from(u16::from_le_bytes([raw[0], raw[1]])),
                _ => u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            })
        })
        .collect()
}

fn accessor(doc: &Document, index: usize) -> Result<&AccessorDef, GlbError> {
    doc.accessors.get(index).ok_or_else(|| GlbError::Accessor {
        index,
        reason: "no such accessor".into(),
    })
}

fn slice(bytes: &[u8], start: usize, len: usize) -> Result<&[u8], GlbError> {
    let end = start.checked_add(len).unwrap_or(usize::MAX);
    bytes.get(start..end).ok_or(GlbError::Truncated {
        needed: end,
        actual: bytes.len(),
    })
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, GlbError> {
    let raw = slice(bytes, at, 4)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
