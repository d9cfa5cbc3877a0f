use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlProgram, WebGlShader, WebGlUniformLocation};

use crate::error::FxError;

/// Acquire a WebGL2 context on `canvas`, transparent so the section colour
/// shows through.
pub fn webgl2(canvas: &HtmlCanvasElement) -> Result<GL, FxError> {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"alpha".into(), &true.into())?;
    js_sys::Reflect::set(&options, &"antialias".into(), &true.into())?;
    js_sys::Reflect::set(&options, &"premultipliedAlpha".into(), &true.into())?;

    let gl: GL = canvas
        .get_context_with_context_options("webgl2", &options)?
        .ok_or_else(|| FxError::Surface("WebGL2 not supported".into()))?
        .dyn_into()
        .map_err(|_| FxError::Surface("context is not WebGL2".into()))?;
    Ok(gl)
}

/// Size the backing store to the canvas' CSS box times `dpr`. Returns the
/// new size in device pixels.
pub fn fit_canvas(canvas: &HtmlCanvasElement, gl: &GL, dpr: f64) -> (u32, u32) {
    let w = (f64::from(canvas.client_width()) * dpr).round().max(1.0) as u32;
    let h = (f64::from(canvas.client_height()) * dpr).round().max(1.0) as u32;
    if canvas.width() != w || canvas.height() != h {
        canvas.set_width(w);
        canvas.set_height(h);
    }
    gl.viewport(0, 0, w as i32, h as i32);
    (w, h)
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, FxError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| FxError::Surface("unable to create shader".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(FxError::Surface(format!("shader compile failed: {log}")))
    }
}

/// A linked shader program, deleted on drop.
pub struct Program {
    gl: GL,
    program: WebGlProgram,
}

impl Program {
    pub fn new(gl: &GL, vertex: &str, fragment: &str) -> Result<Self, FxError> {
        let vs = compile(gl, GL::VERTEX_SHADER, vertex)?;
        let fs = match compile(gl, GL::FRAGMENT_SHADER, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                gl.delete_shader(Some(&vs));
                return Err(e);
            }
        };

        let program = gl
            .create_program()
            .ok_or_else(|| FxError::Surface("unable to create program".into()))?;
        gl.attach_shader(&program, &vs);
        gl.attach_shader(&program, &fs);
        gl.link_program(&program);
        // Shaders are owned by the program once linked.
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));

        let ok = gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if !ok {
            let log = gl.get_program_info_log(&program).unwrap_or_default();
            gl.delete_program(Some(&program));
            return Err(FxError::Surface(format!("program link failed: {log}")));
        }
        Ok(Self {
            gl: gl.clone(),
            program,
        })
    }

    pub fn bind(&self) {
        self.gl.use_program(Some(&self.program));
    }

    pub fn uniform(&self, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(&self.program, name)
    }

    pub fn attribute(&self, name: &str) -> Result<u32, FxError> {
        let location = self.gl.get_attrib_location(&self.program, name);
        u32::try_from(location).map_err(|_| FxError::Surface(format!("attribute {name} not found")))
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.gl.delete_program(Some(&self.program));
    }
}
