//! WebGL2 renderer for the ripple grid. The fragment shader mirrors
//! `crate::ripple::RippleField::shade`; keep the two in step.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, PointerEvent, WebGl2RenderingContext as GL, WebGlBuffer, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use super::events::Listener;
use super::raf::RafScheduler;
use super::render::{fit_canvas, webgl2, Program};
use crate::anim::AnimationLoop;
use crate::error::FxError;
use crate::ripple::{RippleGrid, RippleGridConfig, RippleUniforms};

const VERTEX: &str = r#"#version 300 es
in vec2 position;
out vec2 vUv;
void main() {
    vUv = position * 0.5 + 0.5;
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

const FRAGMENT: &str = r#"#version 300 es
precision highp float;
in vec2 vUv;
out vec4 fragColor;

uniform float iTime;
uniform vec2 iResolution;
uniform bool enableRainbow;
uniform vec3 gridColor;
uniform float rippleIntensity;
uniform float gridSize;
uniform float gridThickness;
uniform float fadeDistance;
uniform float vignetteStrength;
uniform float glowIntensity;
uniform float opacity;
uniform mat2 gridRotation;
uniform bool mouseInteraction;
uniform vec2 mousePosition;
uniform float mouseInfluence;
uniform float mouseInteractionRadius;

const float pi = 3.141592;

void main() {
    vec2 uv = vUv * 2.0 - 1.0;
    uv.x *= iResolution.x / max(iResolution.y, 1.0);
    uv = gridRotation * uv;

    float dist = length(uv);
    float func = sin(pi * (iTime - dist));
    vec2 rippleUv = uv + uv * func * rippleIntensity;

    if (mouseInteraction && mouseInfluence > 0.0) {
        vec2 mouseUv = mousePosition * 2.0 - 1.0;
        mouseUv.x *= iResolution.x / max(iResolution.y, 1.0);
        vec2 offset = uv - mouseUv;
        float mouseDist = length(offset);
        float r = mouseInteractionRadius;
        float influence = mouseInfluence * exp(-mouseDist * mouseDist / (r * r));
        float mouseWave = sin(pi * (iTime * 2.0 - mouseDist * 3.0)) * influence;
        if (mouseDist > 1e-5) {
            rippleUv += offset / mouseDist * mouseWave * rippleIntensity * 0.3;
        }
    }

    vec2 a = sin(gridSize * 0.5 * pi * rippleUv - pi / 2.0);
    vec2 b = abs(a);
    vec2 smoothB = vec2(smoothstep(0.0, 0.5, b.x), smoothstep(0.0, 0.5, b.y));

    float t = gridThickness;
    float c = exp(-t * smoothB.x * (0.8 + 0.5 * sin(pi * iTime)));
    c += exp(-t * smoothB.y);
    c += 0.5 * exp(-(t / 4.0) * sin(smoothB.x));
    c += 0.5 * exp(-(t / 3.0) * smoothB.y);
    if (glowIntensity > 0.0) {
        c += glowIntensity * exp(-t * 0.5 * smoothB.x);
        c += glowIntensity * exp(-t * 0.5 * smoothB.y);
    }
    vec3 color = vec3(c);

    float fade = exp(-2.0 * clamp(pow(dist, fadeDistance), 0.0, 1.0));
    float vignette = 1.0;
    if (vignetteStrength > 0.0) {
        vignette = clamp(1.0 - pow(length(vUv - 0.5) * 2.0, vignetteStrength), 0.0, 1.0);
    }

    vec3 tint = enableRainbow
        ? vec3(uv.x * 0.5 + 0.5 * sin(iTime), uv.y * 0.5 + 0.5 * cos(iTime), pow(cos(iTime), 4.0)) + 0.5
        : gridColor;

    float finalFade = fade * vignette * opacity;
    fragColor = vec4(color * tint * finalFade, min(length(color) * finalFade, 1.0));
}
"#;

struct Uniforms {
    time: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    mouse_position: Option<WebGlUniformLocation>,
    mouse_influence: Option<WebGlUniformLocation>,
}

/// GL objects for one ripple canvas; released on drop.
struct RippleGpu {
    gl: GL,
    program: Program,
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    uniforms: Uniforms,
}

impl RippleGpu {
    fn new(gl: GL, config: &RippleGridConfig) -> Result<Self, FxError> {
        let program = Program::new(&gl, VERTEX, FRAGMENT)?;
        program.bind();

        // One oversized triangle covers the viewport.
        let vertices: [f32; 6] = [-1.0, -1.0, 3.0, -1.0, -1.0, 3.0];
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| FxError::Surface("unable to create vertex array".into()))?;
        let buffer = gl
            .create_buffer()
            .ok_or_else(|| FxError::Surface("unable to create buffer".into()))?;
        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let data = js_sys::Float32Array::from(&vertices[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &data, GL::STATIC_DRAW);
        let position = program.attribute("position")?;
        gl.enable_vertex_attrib_array(position);
        gl.vertex_attrib_pointer_with_i32(position, 2, GL::FLOAT, false, 0, 0);
        gl.bind_vertex_array(None);

        // Static uniforms are written once.
        let set_f = |name: &str, v: f32| gl.uniform1f(program.uniform(name).as_ref(), v);
        let set_b = |name: &str, v: bool| gl.uniform1i(program.uniform(name).as_ref(), i32::from(v));
        set_b("enableRainbow", config.enable_rainbow);
        gl.uniform3fv_with_f32_array(program.uniform("gridColor").as_ref(), &config.grid_color.to_array());
        set_f("rippleIntensity", config.ripple_intensity);
        set_f("gridSize", config.grid_size);
        set_f("gridThickness", config.grid_thickness);
        set_f("fadeDistance", config.fade_distance);
        set_f("vignetteStrength", config.vignette_strength);
        set_f("glowIntensity", config.glow_intensity);
        set_f("opacity", config.opacity);
        set_b("mouseInteraction", config.mouse_interaction);
        set_f("mouseInteractionRadius", config.mouse_interaction_radius);
        let rotation = glam::Mat2::from_angle(config.grid_rotation.to_radians());
        gl.uniform_matrix2fv_with_f32_array(
            program.uniform("gridRotation").as_ref(),
            false,
            &rotation.to_cols_array(),
        );

        let uniforms = Uniforms {
            time: program.uniform("iTime"),
            resolution: program.uniform("iResolution"),
            mouse_position: program.uniform("mousePosition"),
            mouse_influence: program.uniform("mouseInfluence"),
        };

        gl.enable(GL::BLEND);
        gl.blend_func(GL::ONE, GL::ONE_MINUS_SRC_ALPHA);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self {
            gl,
            program,
            vao,
            buffer,
            uniforms,
        })
    }

    fn draw(&self, u: &RippleUniforms) {
        let gl = &self.gl;
        self.program.bind();
        gl.uniform1f(self.uniforms.time.as_ref(), u.time);
        gl.uniform2f(self.uniforms.resolution.as_ref(), u.resolution.x, u.resolution.y);
        gl.uniform2f(
            self.uniforms.mouse_position.as_ref(),
            u.pointer.position.x,
            u.pointer.position.y,
        );
        gl.uniform1f(self.uniforms.mouse_influence.as_ref(), u.pointer.influence);

        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_arrays(GL::TRIANGLES, 0, 3);
        gl.bind_vertex_array(None);
    }
}

impl Drop for RippleGpu {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(Some(&self.vao));
        self.gl.delete_buffer(Some(&self.buffer));
    }
}

/// A mounted ripple grid. Dropping it stops the loop, removes the listeners
/// and releases the GL objects.
pub struct RippleGridSurface {
    _listeners: Vec<Listener>,
    _frames: AnimationLoop<RafScheduler>,
}

impl RippleGridSurface {
    pub fn mount(canvas: HtmlCanvasElement, config: RippleGridConfig, dpr: f64) -> Result<Self, FxError> {
        let mouse_interaction = config.mouse_interaction;
        let grid = RippleGrid::new(config)?;
        let gl = webgl2(&canvas)?;
        fit_canvas(&canvas, &gl, dpr);
        let gpu = RippleGpu::new(gl.clone(), grid.field().config())?;
        let grid = Rc::new(RefCell::new(grid));

        let mut listeners = Vec::new();
        if mouse_interaction {
            let target: &web_sys::EventTarget = canvas.as_ref();
            let (g, c) = (Rc::clone(&grid), canvas.clone());
            listeners.push(Listener::new(target, "pointermove", move |event| {
                if let Some(e) = event.dyn_ref::<PointerEvent>() {
                    let rect = c.get_bounding_client_rect();
                    let x = (f64::from(e.client_x()) - rect.left()) as f32;
                    let y = (f64::from(e.client_y()) - rect.top()) as f32;
                    g.borrow_mut()
                        .pointer_mut()
                        .moved(x, y, rect.width() as f32, rect.height() as f32);
                }
            })?);
            let g = Rc::clone(&grid);
            listeners.push(Listener::new(target, "pointerenter", move |_| {
                g.borrow_mut().pointer_mut().entered();
            })?);
            let g = Rc::clone(&grid);
            listeners.push(Listener::new(target, "pointerleave", move |_| {
                g.borrow_mut().pointer_mut().left();
            })?);
        }

        let window = web_sys::window().ok_or_else(|| FxError::Dom("no window".into()))?;
        {
            let (c, gl) = (canvas.clone(), gl.clone());
            listeners.push(Listener::new(window.as_ref(), "resize", move |_| {
                fit_canvas(&c, &gl, dpr);
            })?);
        }

        let frames = AnimationLoop::new(RafScheduler::new()?, move |timestamp| {
            let resolution = Vec2::new(canvas.width() as f32, canvas.height() as f32);
            let uniforms = grid.borrow_mut().frame(timestamp, resolution);
            gpu.draw(&uniforms);
        });
        frames.start()?;
        log::debug!("ripple grid mounted");

        Ok(Self {
            _listeners: listeners,
            _frames: frames,
        })
    }
}
