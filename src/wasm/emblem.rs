//! WebGL2 renderer for the hero emblem, plus the asset fetch.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::{Mat3, Mat4};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    HtmlCanvasElement, Response, WebGl2RenderingContext as GL, WebGlBuffer, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use super::events::Listener;
use super::raf::RafScheduler;
use super::render::{fit_canvas, webgl2, Program};
use crate::anim::AnimationLoop;
use crate::emblem::{Emblem, EmblemConfig, EmblemLoad, EmblemMesh, Lighting, LoadTicket, Material};
use crate::error::FxError;
use crate::glb::parse_glb;

const VERTEX: &str = r#"#version 300 es
in vec3 position;
in vec3 normal;
uniform mat4 uModel;
uniform mat4 uViewProjection;
uniform mat3 uNormalMatrix;
out vec3 vWorld;
out vec3 vNormal;
void main() {
    vec4 world = uModel * vec4(position, 1.0);
    vWorld = world.xyz;
    vNormal = normalize(uNormalMatrix * normal);
    gl_Position = uViewProjection * world;
}
"#;

const FRAGMENT: &str = r#"#version 300 es
precision highp float;
in vec3 vWorld;
in vec3 vNormal;
out vec4 fragColor;

uniform vec3 uEye;
uniform vec3 uBaseColor;
uniform float uMetalness;
uniform float uRoughness;
uniform vec3 uEmissive;
uniform float uEmissiveIntensity;
uniform float uAmbient;
uniform vec3 uDirectionalDir;
uniform float uDirectional;
uniform vec3 uPointPosition;
uniform vec3 uPointColor;
uniform float uPoint;
uniform vec3 uSpotPosition;
uniform vec3 uSpotColor;
uniform float uSpot;
uniform vec2 uSpotCone;

float specular(vec3 n, vec3 l, vec3 v) {
    vec3 h = normalize(l + v);
    float shininess = mix(256.0, 4.0, uRoughness);
    return pow(max(dot(n, h), 0.0), shininess) * (1.0 - uRoughness);
}

void main() {
    vec3 n = normalize(vNormal);
    vec3 v = normalize(uEye - vWorld);
    vec3 diffuseColor = uBaseColor * (1.0 - uMetalness);
    vec3 specColor = mix(vec3(0.04), uBaseColor, uMetalness);

    vec3 light = uBaseColor * uAmbient * 0.1;

    vec3 ld = normalize(uDirectionalDir);
    float nd = max(dot(n, ld), 0.0);
    light += uDirectional * (diffuseColor * nd + specColor * specular(n, ld, v)) * 0.3;

    vec3 toPoint = uPointPosition - vWorld;
    float falloff = 1.0 / (1.0 + dot(toPoint, toPoint) * 0.1);
    vec3 lp = normalize(toPoint);
    float np = max(dot(n, lp), 0.0);
    light += uPoint * falloff * uPointColor * (diffuseColor * np + specColor * specular(n, lp, v)) * 0.5;

    vec3 toSpot = uSpotPosition - vWorld;
    vec3 ls = normalize(toSpot);
    float cone = smoothstep(uSpotCone.x, uSpotCone.y, dot(-ls, normalize(-uSpotPosition)));
    float ns = max(dot(n, ls), 0.0);
    light += uSpot * cone * uSpotColor * (diffuseColor * ns + specColor * specular(n, ls, v)) * 0.3;

    light += uEmissive * uEmissiveIntensity;
    fragColor = vec4(light / (light + vec3(1.0)) * 1.6, 1.0);
}
"#;

/// One uploaded mesh; buffers are released on drop.
struct GpuMesh {
    gl: GL,
    vao: WebGlVertexArrayObject,
    buffers: [WebGlBuffer; 3],
    count: i32,
    material: Material,
}

impl GpuMesh {
    fn upload(gl: &GL, program: &Program, mesh: &EmblemMesh) -> Result<Self, FxError> {
        let make = || {
            gl.create_buffer()
                .ok_or_else(|| FxError::Surface("unable to create buffer".into()))
        };
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| FxError::Surface("unable to create vertex array".into()))?;
        let buffers = [make()?, make()?, make()?];
        gl.bind_vertex_array(Some(&vao));

        for (buffer, name, data) in [
            (&buffers[0], "position", mesh.positions.as_flattened()),
            (&buffers[1], "normal", mesh.normals.as_flattened()),
        ] {
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
            let array = js_sys::Float32Array::from(data);
            gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
            let location = program.attribute(name)?;
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, 3, GL::FLOAT, false, 0, 0);
        }

        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&buffers[2]));
        let indices = js_sys::Uint32Array::from(mesh.indices.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &indices, GL::STATIC_DRAW);
        gl.bind_vertex_array(None);

        Ok(Self {
            gl: gl.clone(),
            vao,
            buffers,
            count: mesh.indices.len() as i32,
            material: mesh.material,
        })
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(Some(&self.vao));
        for buffer in &self.buffers {
            self.gl.delete_buffer(Some(buffer));
        }
    }
}

struct Locations {
    model: Option<WebGlUniformLocation>,
    view_projection: Option<WebGlUniformLocation>,
    normal_matrix: Option<WebGlUniformLocation>,
    base_color: Option<WebGlUniformLocation>,
    metalness: Option<WebGlUniformLocation>,
    roughness: Option<WebGlUniformLocation>,
    emissive: Option<WebGlUniformLocation>,
    emissive_intensity: Option<WebGlUniformLocation>,
}

struct EmblemGpu {
    gl: GL,
    program: Program,
    locations: Locations,
    mesh: GpuMesh,
    showing_asset: bool,
}

impl EmblemGpu {
    fn new(gl: GL) -> Result<Self, FxError> {
        let program = Program::new(&gl, VERTEX, FRAGMENT)?;
        program.bind();

        let lighting = Lighting::default();
        let eye = crate::emblem::CAMERA_EYE;
        gl.uniform3f(program.uniform("uEye").as_ref(), eye.x, eye.y, eye.z);
        gl.uniform1f(program.uniform("uAmbient").as_ref(), lighting.ambient);
        let d = lighting.directional_dir;
        gl.uniform3f(program.uniform("uDirectionalDir").as_ref(), d.x, d.y, d.z);
        gl.uniform1f(program.uniform("uDirectional").as_ref(), lighting.directional);
        let p = lighting.point_position;
        gl.uniform3f(program.uniform("uPointPosition").as_ref(), p.x, p.y, p.z);
        gl.uniform3fv_with_f32_array(
            program.uniform("uPointColor").as_ref(),
            &lighting.point_color.to_array(),
        );
        gl.uniform1f(program.uniform("uPoint").as_ref(), lighting.point);
        let s = lighting.spot_position;
        gl.uniform3f(program.uniform("uSpotPosition").as_ref(), s.x, s.y, s.z);
        gl.uniform3fv_with_f32_array(
            program.uniform("uSpotColor").as_ref(),
            &lighting.spot_color.to_array(),
        );
        gl.uniform1f(program.uniform("uSpot").as_ref(), lighting.spot);
        let (outer, inner) = lighting.spot_cone();
        gl.uniform2f(program.uniform("uSpotCone").as_ref(), outer, inner);

        let locations = Locations {
            model: program.uniform("uModel"),
            view_projection: program.uniform("uViewProjection"),
            normal_matrix: program.uniform("uNormalMatrix"),
            base_color: program.uniform("uBaseColor"),
            metalness: program.uniform("uMetalness"),
            roughness: program.uniform("uRoughness"),
            emissive: program.uniform("uEmissive"),
            emissive_intensity: program.uniform("uEmissiveIntensity"),
        };
        let mesh = GpuMesh::upload(&gl, &program, &EmblemMesh::placeholder())?;

        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::CULL_FACE);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self {
            gl,
            program,
            locations,
            mesh,
            showing_asset: false,
        })
    }

    /// Swaps in the loaded asset the first frame after it arrives.
    fn sync(&mut self, emblem: &Emblem) {
        if self.showing_asset {
            return;
        }
        if let EmblemLoad::Loaded(mesh) = emblem.load_state() {
            match GpuMesh::upload(&self.gl, &self.program, mesh) {
                Ok(uploaded) => self.mesh = uploaded,
                Err(err) => log::warn!("emblem upload failed: {err}"),
            }
            self.showing_asset = true;
        }
    }

    fn draw(&self, model: Mat4, view_projection: Mat4) {
        let gl = &self.gl;
        let l = &self.locations;
        let m = &self.mesh.material;
        self.program.bind();
        gl.uniform_matrix4fv_with_f32_array(l.model.as_ref(), false, &model.to_cols_array());
        gl.uniform_matrix4fv_with_f32_array(
            l.view_projection.as_ref(),
            false,
            &view_projection.to_cols_array(),
        );
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
        gl.uniform_matrix3fv_with_f32_array(l.normal_matrix.as_ref(), false, &normal_matrix.to_cols_array());
        gl.uniform3fv_with_f32_array(l.base_color.as_ref(), &m.base_color.to_array());
        gl.uniform1f(l.metalness.as_ref(), m.metalness);
        gl.uniform1f(l.roughness.as_ref(), m.roughness);
        gl.uniform3fv_with_f32_array(l.emissive.as_ref(), &m.emissive.to_array());
        gl.uniform1f(l.emissive_intensity.as_ref(), m.emissive_intensity);

        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.bind_vertex_array(Some(&self.mesh.vao));
        gl.draw_elements_with_i32(GL::TRIANGLES, self.mesh.count, GL::UNSIGNED_INT, 0);
        gl.bind_vertex_array(None);
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FxError> {
    let window = web_sys::window().ok_or_else(|| FxError::Dom("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await?
        .dyn_into()
        .map_err(|_| FxError::Dom("fetch did not return a Response".into()))?;
    if !response.ok() {
        return Err(FxError::Dom(format!("{url}: HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn spawn_load(emblem: Weak<RefCell<Emblem>>, ticket: LoadTicket, url: String) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_bytes(&url).await;
        // The surface may have been unmounted while the request was in flight.
        let Some(emblem) = emblem.upgrade() else {
            log::debug!("emblem unmounted before {url} arrived");
            return;
        };
        let mut emblem = emblem.borrow_mut();
        let applied = match result {
            Ok(bytes) => emblem.finish_load(ticket, parse_glb(&bytes)),
            Err(err) => emblem.fail_load(ticket, err.to_string()),
        };
        if applied {
            log::info!("emblem asset {url} settled");
        }
    });
}

/// A mounted emblem canvas.
pub struct EmblemSurface {
    emblem: Rc<RefCell<Emblem>>,
    _listeners: Vec<Listener>,
    _frames: AnimationLoop<RafScheduler>,
}

impl EmblemSurface {
    pub fn mount(canvas: HtmlCanvasElement, config: EmblemConfig, dpr: f64) -> Result<Self, FxError> {
        let model_path = config.model_path.clone();
        let emblem = Rc::new(RefCell::new(Emblem::new(config)?));
        let gl = webgl2(&canvas)?;
        fit_canvas(&canvas, &gl, dpr);
        let mut gpu = EmblemGpu::new(gl.clone())?;
        if !model_path.is_empty() {
            let ticket = emblem.borrow_mut().begin_load();
            spawn_load(Rc::downgrade(&emblem), ticket, model_path);
        }

        let window = web_sys::window().ok_or_else(|| FxError::Dom("no window".into()))?;
        let (c, g) = (canvas.clone(), gl.clone());
        let listeners = vec![Listener::new(window.as_ref(), "resize", move |_| {
            fit_canvas(&c, &g, dpr);
        })?];

        let state = Rc::clone(&emblem);
        let mut last: Option<f64> = None;
        let frames = AnimationLoop::new(RafScheduler::new()?, move |timestamp| {
            let dt = last.map_or(0.0, |prev| ((timestamp - prev) / 1000.0) as f32);
            last = Some(timestamp);

            let mut emblem = state.borrow_mut();
            emblem.tick(dt);
            gpu.sync(&emblem);
            let aspect = canvas.width() as f32 / canvas.height().max(1) as f32;
            gpu.draw(emblem.model_matrix(), Emblem::view_projection(aspect));
        });
        frames.start()?;

        Ok(Self {
            emblem,
            _listeners: listeners,
            _frames: frames,
        })
    }
}

impl Drop for EmblemSurface {
    fn drop(&mut self) {
        self.emblem.borrow_mut().teardown();
    }
}
