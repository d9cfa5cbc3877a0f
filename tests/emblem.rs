use glam::{Mat4, Vec3, Vec4Swizzles};
use grand_kaiser_fx::config::ComponentConfig;
use grand_kaiser_fx::emblem::{
    Emblem, EmblemConfig, EmblemLoad, EmblemMesh, Lighting, Material, MAX_FRAME_DELTA, PLACEHOLDER_SPIN_X, SPIN_Y,
};
use grand_kaiser_fx::error::GlbError;
use grand_kaiser_fx::glb::parse_glb;

const TRIANGLE_JSON: &str = r#"{
  "asset": {"version": "2.0"},
  "buffers": [{"byteLength": 44}],
  "bufferViews": [
    {"buffer": 0, "byteOffset": 0, "byteLength": 36},
    {"buffer": 0, "byteOffset": 36, "byteLength": 6}
  ],
  "accessors": [
    {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
    {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
  ],
  "materials": [{
    "pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.8, 0.0, 1.0], "metallicFactor": 1.0, "roughnessFactor": 0.2}
  }],
  "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1, "material": 0}]}]
}"#;

fn triangle_bin(indices: [u16; 3]) -> Vec<u8> {
    let mut bin = Vec::new();
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin
}

/// Assembles a GLB container, padding both chunks to four bytes.
fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

#[test]
fn parses_indexed_triangle() {
    let mesh = parse_glb(&glb(TRIANGLE_JSON, &triangle_bin([0, 1, 2]))).unwrap();
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    // No NORMAL attribute: face normal of a counter-clockwise XY triangle.
    assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    assert_eq!(mesh.material.metalness, 1.0);
    assert!((mesh.material.roughness - 0.2).abs() < 1e-6);
    assert!((mesh.material.base_color.g - 0.8).abs() < 1e-6);
}

#[test]
fn rejects_out_of_range_index() {
    let err = parse_glb(&glb(TRIANGLE_JSON, &triangle_bin([0, 1, 7]))).unwrap_err();
    assert!(matches!(err, GlbError::Accessor { index: 1, .. }));
}

#[test]
fn rejects_bad_containers() {
    let good = glb(TRIANGLE_JSON, &triangle_bin([0, 1, 2]));

    let mut bad_magic = good.clone();
    bad_magic[0] = b'x';
    assert!(matches!(parse_glb(&bad_magic), Err(GlbError::Magic(_))));

    let mut v1 = good.clone();
    v1[4] = 1;
    assert_eq!(parse_glb(&v1), Err(GlbError::Version(1)));

    assert!(matches!(parse_glb(&good[..good.len() - 10]), Err(GlbError::Truncated { .. })));
    assert!(matches!(parse_glb(&[]), Err(GlbError::Truncated { .. })));
}

#[test]
fn oversized_stride_and_offset_are_errors() {
    let huge_stride = TRIANGLE_JSON.replace(
        r#"{"buffer": 0, "byteOffset": 0, "byteLength": 36}"#,
        r#"{"buffer": 0, "byteOffset": 0, "byteLength": 36, "byteStride": 18446744073709551615}"#,
    );
    assert!(matches!(
        parse_glb(&glb(&huge_stride, &triangle_bin([0, 1, 2]))),
        Err(GlbError::Accessor { index: 0, .. })
    ));

    let wide_stride = TRIANGLE_JSON.replace(
        r#"{"buffer": 0, "byteOffset": 0, "byteLength": 36}"#,
        r#"{"buffer": 0, "byteOffset": 0, "byteLength": 36, "byteStride": 256}"#,
    );
    assert!(matches!(
        parse_glb(&glb(&wide_stride, &triangle_bin([0, 1, 2]))),
        Err(GlbError::Accessor { index: 0, .. })
    ));

    let huge_offset = TRIANGLE_JSON.replace(
        r#"{"bufferView": 0, "componentType": 5126"#,
        r#"{"bufferView": 0, "byteOffset": 18446744073709551611, "componentType": 5126"#,
    );
    assert!(parse_glb(&glb(&huge_offset, &triangle_bin([0, 1, 2]))).is_err());
}

#[test]
fn document_without_meshes_has_no_geometry() {
    let bytes = glb(r#"{"asset": {"version": "2.0"}}"#, &[]);
    assert_eq!(parse_glb(&bytes), Err(GlbError::NoGeometry));
}

#[test]
fn invalid_json_is_reported() {
    let bytes = glb("{not json", &[]);
    assert!(matches!(parse_glb(&bytes), Err(GlbError::Json(_))));
}

#[test]
fn placeholder_cube_geometry() {
    let cube = EmblemMesh::placeholder();
    assert_eq!(cube.positions.len(), 24);
    assert_eq!(cube.indices.len(), 36);
    assert_eq!(cube.material, Material::placeholder());
    for n in &cube.normals {
        assert!((Vec3::from_array(*n).length() - 1.0).abs() < 1e-6);
    }
    for p in &cube.positions {
        assert!(p.iter().all(|c| c.abs() == 1.0));
    }
}

#[test]
fn placeholder_spins_on_two_axes() {
    let mut emblem = Emblem::new(EmblemConfig::default()).unwrap();
    assert!(emblem.showing_placeholder());
    emblem.tick(0.05);
    let r = emblem.rotation();
    assert!((r.y - SPIN_Y * 0.05).abs() < 1e-6);
    assert!((r.x - PLACEHOLDER_SPIN_X * 0.05).abs() < 1e-6);
}

#[test]
fn large_frame_delta_is_clamped() {
    let mut emblem = Emblem::new(EmblemConfig::default()).unwrap();
    emblem.tick(3.0);
    assert!((emblem.rotation().y - SPIN_Y * MAX_FRAME_DELTA).abs() < 1e-6);
    emblem.tick(-1.0);
    assert!((emblem.rotation().y - SPIN_Y * MAX_FRAME_DELTA).abs() < 1e-6);
}

#[test]
fn loaded_model_spins_about_y_only() {
    let mut emblem = Emblem::new(EmblemConfig::default()).unwrap();
    let ticket = emblem.begin_load();
    emblem.tick(0.1);
    let mesh = parse_glb(&glb(TRIANGLE_JSON, &triangle_bin([0, 1, 2])));
    assert!(emblem.finish_load(ticket, mesh));
    assert!(!emblem.showing_placeholder());
    assert_eq!(emblem.rotation(), Vec3::ZERO);

    emblem.tick(0.1);
    let r = emblem.rotation();
    assert_eq!(r.x, 0.0);
    assert!((r.y - SPIN_Y * 0.1).abs() < 1e-6);
}

#[test]
fn failed_load_keeps_placeholder() {
    let mut emblem = Emblem::new(EmblemConfig::default()).unwrap();
    let ticket = emblem.begin_load();
    assert!(emblem.finish_load(ticket, Err(GlbError::NoGeometry)));
    assert!(emblem.showing_placeholder());
    assert!(matches!(emblem.load_state(), EmblemLoad::Failed(_)));

    let retry = emblem.begin_load();
    assert!(emblem.fail_load(retry, "HTTP 404"));
    assert_eq!(emblem.load_state(), &EmblemLoad::Failed("HTTP 404".into()));
}

#[test]
fn stale_and_post_teardown_results_are_discarded() {
    let mut emblem = Emblem::new(EmblemConfig::default()).unwrap();
    let first = emblem.begin_load();
    let second = emblem.begin_load();
    assert!(!emblem.finish_load(first, Ok(EmblemMesh::placeholder())));
    assert_eq!(emblem.load_state(), &EmblemLoad::Loading);

    emblem.teardown();
    assert!(!emblem.finish_load(second, Ok(EmblemMesh::placeholder())));
    assert!(!emblem.fail_load(second, "late"));
    assert_eq!(emblem.load_state(), &EmblemLoad::Loading);

    emblem.tick(0.05);
    assert_eq!(emblem.rotation(), Vec3::ZERO);
}

#[test]
fn auto_rotate_off_holds_pose() {
    let config = EmblemConfig {
        auto_rotate: false,
        rotation: [0.1, 0.2, 0.3],
        ..EmblemConfig::default()
    };
    let mut emblem = Emblem::new(config).unwrap();
    emblem.tick(0.1);
    assert_eq!(emblem.rotation(), Vec3::new(0.1, 0.2, 0.3));
}

#[test]
fn default_pose_is_identity_and_centred() {
    let emblem = Emblem::new(EmblemConfig::default()).unwrap();
    assert!(emblem.model_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));

    let clip = Emblem::view_projection(16.0 / 9.0) * Vec3::ZERO.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
    assert!((-1.0..1.0).contains(&ndc.z));
}

#[test]
fn hero_preset_points_at_asset() {
    let config = EmblemConfig::resolve(Some("hero"), None).unwrap();
    assert!(config.model_path.ends_with(".glb"));
    assert_eq!(config.scale, [2.2; 3]);
    assert!(EmblemConfig::resolve(None, Some(r#"{"scale": [1, 0, 1]}"#)).is_err());
}

#[test]
fn emblem_rejects_non_positive_scale() {
    let config = EmblemConfig {
        scale: [1.0, 0.0, 1.0],
        ..EmblemConfig::default()
    };
    assert!(Emblem::new(config).is_err());
}

#[test]
fn spot_light_cone_softens_at_edge() {
    let lighting = Lighting::default();
    assert_eq!(lighting.spot_attenuation(Vec3::ZERO), 1.0);
    assert_eq!(lighting.spot_attenuation(Vec3::new(1.0, 0.0, 0.0)), 1.0);
    assert!(lighting.spot_attenuation(Vec3::new(5.0, 0.0, 0.0)) < 1e-4);
    assert_eq!(lighting.spot_attenuation(Vec3::new(0.0, 6.0, 0.0)), 0.0);

    let edge = lighting.spot_attenuation(Vec3::new(3.3, 0.0, 0.0));
    assert!(edge > 0.0 && edge < 1.0, "edge={edge}");
}
