//! Thin WebGL2 wrappers: context setup, shader programs with a uniform
//! location cache, GPU meshes and the lazily loaded image texture.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as GL};
use web_sys::{WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation};

use crate::error::HiveError;
use crate::mesh::{MeshData, Topology};

/// Obtain a WebGL2 context from the render canvas and set the fixed state:
/// teal clear color, depth test on.
pub fn init_context(canvas: &HtmlCanvasElement) -> Result<GL, HiveError> {
    let gl: GL = canvas
        .get_context("webgl2")
        .map_err(|e| HiveError::ContextInit(format!("{e:?}")))?
        .ok_or_else(|| HiveError::ContextInit("WebGL2 not supported".into()))?
        .dyn_into()
        .map_err(|_| HiveError::ContextInit("unexpected context type".into()))?;

    gl.clear_color(70.0 / 255.0, 131.0 / 255.0, 138.0 / 255.0, 1.0);
    gl.enable(GL::DEPTH_TEST);
    Ok(gl)
}

/// Clear the frame and set the viewport for a new draw pass.
pub fn start_frame(gl: &GL, width: i32, height: i32) {
    gl.viewport(0, 0, width, height);
    gl.clear_color(0.0, 0.0, 0.0, 0.0);
    gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
}

fn compile_stage(gl: &GL, kind: u32, stage: &'static str, src: &str) -> Result<WebGlShader, HiveError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| HiveError::ShaderCompile {
            stage,
            log: "createShader returned null".into(),
        })?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(HiveError::ShaderCompile { stage, log })
    }
}

/// A linked vertex+fragment pair with resolved attribute locations and a
/// name-to-location uniform cache. Created once per effect and shared by
/// reference across drawables.
pub struct ShaderProgram {
    gl: GL,
    program: WebGlProgram,
    position_attrib: u32,
    color_attrib: i32,
    uniforms: RefCell<HashMap<String, Option<WebGlUniformLocation>>>,
}

impl ShaderProgram {
    /// Compile and link. A broken program is reported, never registered; the
    /// caller must not fall back to a different effect.
    pub fn compile(gl: &GL, vertex_src: &str, fragment_src: &str) -> Result<Rc<Self>, HiveError> {
        let vertex = compile_stage(gl, GL::VERTEX_SHADER, "vertex", vertex_src)?;
        let fragment = compile_stage(gl, GL::FRAGMENT_SHADER, "fragment", fragment_src)?;

        let program = gl.create_program().ok_or_else(|| HiveError::ShaderLink {
            log: "createProgram returned null".into(),
        })?;
        gl.attach_shader(&program, &vertex);
        gl.attach_shader(&program, &fragment);
        gl.link_program(&program);

        if !gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            let log = gl.get_program_info_log(&program).unwrap_or_default();
            gl.delete_program(Some(&program));
            return Err(HiveError::ShaderLink { log });
        }

        gl.use_program(Some(&program));
        let position_attrib = gl.get_attrib_location(&program, "aVertexPosition") as u32;
        gl.enable_vertex_attrib_array(position_attrib);

        // the basic vertex shader has no color attribute; -1 means unused
        let color_attrib = gl.get_attrib_location(&program, "aVertexColor");
        if color_attrib >= 0 {
            gl.enable_vertex_attrib_array(color_attrib as u32);
        }

        Ok(Rc::new(Self {
            gl: gl.clone(),
            program,
            position_attrib,
            color_attrib,
            uniforms: RefCell::new(HashMap::new()),
        }))
    }

    pub fn use_program(&self) {
        self.gl.use_program(Some(&self.program));
    }

    /// Cached uniform lookup. An unknown name caches as `None` and every
    /// setter on it becomes a no-op.
    fn uniform(&self, name: &str) -> Option<WebGlUniformLocation> {
        self.uniforms
            .borrow_mut()
            .entry(name.to_owned())
            .or_insert_with(|| self.gl.get_uniform_location(&self.program, name))
            .clone()
    }

    pub fn set_matrices(&self, projection: &[f32; 16], model_view: &[f32; 16]) {
        self.gl.uniform_matrix4fv_with_f32_array(
            self.uniform("uPMatrix").as_ref(),
            false,
            projection,
        );
        self.gl.uniform_matrix4fv_with_f32_array(
            self.uniform("uMVMatrix").as_ref(),
            false,
            model_view,
        );
    }

    pub fn set_vec2(&self, name: &str, value: [f32; 2]) {
        self.use_program();
        self.gl
            .uniform2fv_with_f32_array(self.uniform(name).as_ref(), &value);
    }

    /// Bind `texture` on unit 0 and point the sampler uniform at it.
    pub fn set_texture(&self, texture: &WebGlTexture) {
        self.gl.active_texture(GL::TEXTURE0);
        self.gl.bind_texture(GL::TEXTURE_2D, Some(texture));
        self.gl.uniform1i(self.uniform("uSampler").as_ref(), 0);
    }

    fn bind_attribs(&self, positions: &WebGlBuffer, colors: &WebGlBuffer) {
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(positions));
        self.gl
            .vertex_attrib_pointer_with_i32(self.position_attrib, 3, GL::FLOAT, false, 0, 0);

        if self.color_attrib >= 0 {
            self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(colors));
            self.gl.vertex_attrib_pointer_with_i32(
                self.color_attrib as u32,
                4,
                GL::FLOAT,
                false,
                0,
                0,
            );
        }
    }
}

/// GPU-resident mesh: static position and color buffers plus topology.
/// Effect-agnostic; the one hexagon is drawn with four different programs.
pub struct GlMesh {
    gl: GL,
    positions: WebGlBuffer,
    colors: WebGlBuffer,
    mode: u32,
    vertex_count: i32,
}

impl GlMesh {
    pub fn upload(gl: &GL, data: &MeshData) -> Result<Rc<Self>, HiveError> {
        let positions = upload_buffer(gl, &data.position_floats())?;
        let colors = upload_buffer(gl, &data.color_floats())?;
        let mode = match data.topology() {
            Topology::Triangles => GL::TRIANGLES,
            Topology::TriangleFan => GL::TRIANGLE_FAN,
        };
        Ok(Rc::new(Self {
            gl: gl.clone(),
            positions,
            colors,
            mode,
            vertex_count: data.vertex_count() as i32,
        }))
    }

    /// Bind attributes against the active program and draw every vertex.
    pub fn draw(&self, program: &ShaderProgram) {
        program.bind_attribs(&self.positions, &self.colors);
        self.gl.draw_arrays(self.mode, 0, self.vertex_count);
    }
}

fn upload_buffer(gl: &GL, data: &[f32]) -> Result<WebGlBuffer, HiveError> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| HiveError::ContextInit("createBuffer returned null".into()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    // view into wasm memory; valid because no allocation happens before the
    // buffer_data call consumes it
    unsafe {
        let view = js_sys::Float32Array::view(data);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &view, GL::STATIC_DRAW);
    }
    Ok(buffer)
}

fn is_power_of_two(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Create the shared image texture: a 1x1 blue placeholder immediately, the
/// decoded image swapped in whenever it finishes loading. Drawables only ever
/// see the placeholder or the complete image.
pub fn load_texture(gl: &GL, url: &str) -> Result<Rc<WebGlTexture>, JsValue> {
    let texture = Rc::new(
        gl.create_texture()
            .ok_or_else(|| JsValue::from_str("createTexture returned null"))?,
    );
    gl.bind_texture(GL::TEXTURE_2D, Some(&texture));

    let pixel: [u8; 4] = [0, 0, 255, 255];
    gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
        GL::TEXTURE_2D,
        0,
        GL::RGBA as i32,
        1,
        1,
        0,
        GL::RGBA,
        GL::UNSIGNED_BYTE,
        Some(&pixel),
    )?;

    let image = web_sys::HtmlImageElement::new()?;
    let onload = {
        let gl = gl.clone();
        let texture = texture.clone();
        let image = image.clone();
        Closure::wrap(Box::new(move || {
            gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
            if gl
                .tex_image_2d_with_u32_and_u32_and_image(
                    GL::TEXTURE_2D,
                    0,
                    GL::RGBA as i32,
                    GL::RGBA,
                    GL::UNSIGNED_BYTE,
                    &image,
                )
                .is_err()
            {
                web_sys::console::error_1(&"texture upload failed".into());
                return;
            }

            if is_power_of_two(image.width()) && is_power_of_two(image.height()) {
                gl.generate_mipmap(GL::TEXTURE_2D);
            } else {
                gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
                gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
                gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
            }
        }) as Box<dyn FnMut()>)
    };
    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();
    image.set_src(url);

    Ok(texture)
}
