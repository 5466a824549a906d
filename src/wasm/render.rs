//! Scene setup and the frame loop: build the shader catalog, the meshes and
//! the drawable nodes, then drive update-then-draw once per animation frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use nalgebra::Matrix4;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Document, WebGl2RenderingContext as GL, WebGlTexture};

use super::gl::{self, GlMesh, ShaderProgram};
use super::page::Page;
use crate::anim::{Button, SceneState, ROOT_OFFSET};
use crate::color::Histogram;
use crate::effects::Effect;
use crate::error::HiveError;
use crate::mesh::MeshData;
use crate::scene::{Node, Painter};
use crate::transform::TransformStack;

/// Histogram sampling budget, samples per second.
const SAMPLES_PER_SEC: f64 = 500.0;
/// Uniform jitter box around the picker, in pixels.
const JITTER: f64 = 100.0;

thread_local! {
    static RUNNING: Cell<bool> = Cell::new(true);
}

/// Stop scheduling animation frames. The loop otherwise runs for the lifetime
/// of the page; this hook exists for deterministic teardown in tests.
#[wasm_bindgen]
pub fn stop_render_loop() {
    RUNNING.with(|r| r.set(false));
}

/// Binds one effect program, the mesh and the shared texture for a node.
struct GlPainter {
    program: Rc<ShaderProgram>,
    mesh: Rc<GlMesh>,
    texture: Option<Rc<WebGlTexture>>,
}

impl Painter for GlPainter {
    fn paint(
        &mut self,
        projection: &Matrix4<f32>,
        model_view: &Matrix4<f32>,
    ) -> Result<(), HiveError> {
        self.program.use_program();
        self.program
            .set_matrices(&mat_array(projection), &mat_array(model_view));
        if let Some(texture) = &self.texture {
            self.program.set_texture(texture);
        }
        self.mesh.draw(&self.program);
        Ok(())
    }
}

fn mat_array(m: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

struct App {
    gl: GL,
    document: Document,
    page: Page,
    state: SceneState,
    stack: TransformStack,
    arrow: Node<GlPainter>,
    tiles: Vec<Node<GlPainter>>,
    /// Every registered program, for texture-size broadcasts on resize.
    shaders: Vec<Rc<ShaderProgram>>,
    histogram: Histogram,
    picked: [u8; 4],
}

impl App {
    fn build(document: Document, page: Page) -> Result<Self, JsValue> {
        let gl = gl::init_context(&page.render_canvas)?;

        // one program per effect; a compile/link failure aborts setup rather
        // than silently drawing with a different effect
        let arrow_shader = compile_effect(&gl, Effect::Textured)?;
        let mut shaders = vec![arrow_shader.clone()];
        let mut ring_shaders = Vec::new();
        for effect in Effect::hive_ring() {
            let shader = compile_effect(&gl, effect)?;
            shaders.push(shader.clone());
            ring_shaders.push(shader);
        }

        let mut state = SceneState::new(ring_shaders.len());

        // size the canvases to the image before the mirror is read back
        let (w, h) = (page.background_image.width(), page.background_image.height());
        state.viewport = [w as f32, h as f32];
        page.resize(w, h)?;
        for shader in &shaders {
            shader.set_vec2("uTextureSize", state.viewport);
        }

        let texture = gl::load_texture(&gl, &page.mirror_url()?)?;

        let arrow = Node::new(GlPainter {
            program: arrow_shader,
            mesh: GlMesh::upload(&gl, &MeshData::arrow())?,
            texture: Some(texture.clone()),
        });

        // all four tiles share one hexagon mesh
        let hexagon = GlMesh::upload(&gl, &MeshData::hexagon())?;
        let mut tiles = Vec::new();
        for shader in ring_shaders {
            tiles.push(Node::new(GlPainter {
                program: shader,
                mesh: hexagon.clone(),
                texture: Some(texture.clone()),
            }));
        }

        page.init_info(&document)?;

        Ok(Self {
            gl,
            document,
            page,
            state,
            stack: TransformStack::new(),
            arrow,
            tiles,
            shaders,
            histogram: Histogram::new(),
            picked: [0, 0, 0, 0],
        })
    }

    /// Resync canvas sizes and the texture-size uniforms whenever the backing
    /// image's reported height disagrees with the last known viewport.
    fn sync_viewport(&mut self) -> Result<(), JsValue> {
        let image = &self.page.background_image;
        if image.height() == self.state.viewport[1] as u32 {
            return Ok(());
        }

        let (w, h) = (image.width(), image.height());
        self.state.viewport = [w as f32, h as f32];
        self.page.resize(w, h)?;

        // neighborhood-sampling effects misalign unless uTextureSize tracks
        // the live image resolution
        for shader in &self.shaders {
            shader.set_vec2("uTextureSize", self.state.viewport);
        }
        Ok(())
    }

    fn on_mouse_down(&mut self, button: i16) {
        match button {
            0 => self.state.pointer_down(Button::Primary),
            2 => self.state.pointer_down(Button::Secondary),
            _ => {}
        }
    }

    fn on_mouse_move(&mut self, x: f32, y: f32) {
        let panel_height = self.page.panel_height();
        self.state.pointer_move(x, y, panel_height);
        // a read against a not-yet-drawn mirror fails harmlessly; the next
        // move picks it up
        if let Ok(pixel) = self.page.pixel_at(x as f64, y as f64) {
            self.picked = pixel;
        }
    }

    /// Jittered pixel sampling feeding the rolling histogram.
    fn sample_histogram(&mut self, dt: f64) {
        let n = (SAMPLES_PER_SEC * dt).ceil() as usize;
        let [px, py] = self.state.picker_pos;
        for _ in 0..n {
            let x = px as f64 + js_sys::Math::random() * JITTER - JITTER / 2.0;
            let y = py as f64 + js_sys::Math::random() * JITTER - JITTER / 2.0;
            if let Ok(pixel) = self.page.pixel_at(x, y) {
                self.histogram.push(pixel[0]);
            }
        }
    }

    fn frame(&mut self, dt: f64) -> Result<(), JsValue> {
        self.sync_viewport()?;

        self.state.update(dt as f32);
        self.sample_histogram(dt);

        self.page
            .place_panel(self.state.panel.x, self.state.panel.y)?;
        self.page
            .update_info(&self.document, self.picked, &self.histogram)?;

        self.draw()?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), HiveError> {
        let [w, h] = self.state.viewport;
        gl::start_frame(&self.gl, w as i32, h as i32);
        self.stack.start_frame(w / h);

        // eye view
        self.stack.translate(ROOT_OFFSET);

        self.arrow.set_layout(&self.state.arrow_layout());
        self.arrow.draw(&mut self.stack)?;

        for i in 0..self.tiles.len() {
            let layout = self.state.tile_layout(i);
            self.tiles[i].set_layout(&layout);
            self.tiles[i].draw(&mut self.stack)?;
        }
        Ok(())
    }
}

fn compile_effect(gl: &GL, effect: Effect) -> Result<Rc<ShaderProgram>, HiveError> {
    ShaderProgram::compile(gl, effect.vertex_source(), effect.fragment_source())
}

/// Wire mouse events and start the requestAnimationFrame loop.
pub fn start(document: Document) -> Result<(), JsValue> {
    let page = Page::lookup(&document)?;
    let app = Rc::new(RefCell::new(App::build(document, page)?));

    {
        let surface = app.borrow().page.mouse_surface.clone();

        // right-click advances the selection, so the context menu must go
        let contextmenu = Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            e.prevent_default();
        }) as Box<dyn FnMut(web_sys::MouseEvent)>);
        surface.add_event_listener_with_callback(
            "contextmenu",
            contextmenu.as_ref().unchecked_ref(),
        )?;
        contextmenu.forget();

        let down_app = app.clone();
        let mousedown = Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            down_app.borrow_mut().on_mouse_down(e.button());
        }) as Box<dyn FnMut(web_sys::MouseEvent)>);
        surface.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();

        let move_app = app.clone();
        let mousemove = Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            move_app
                .borrow_mut()
                .on_mouse_move(e.client_x() as f32, e.client_y() as f32);
        }) as Box<dyn FnMut(web_sys::MouseEvent)>);
        surface.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }

    // Animation loop. `f` holds the animation-frame closure so it can keep
    // rescheduling itself; the Option lets the closure obtain a reference to
    // itself after construction.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let mut last_time = 0.0f64;
    RUNNING.with(|r| r.set(true));
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !RUNNING.with(|r| r.get()) {
            return;
        }

        let now = window()
            .and_then(|w| w.performance())
            .map(|p| p.now() / 1000.0)
            .unwrap_or(0.0);
        if last_time != 0.0 {
            let dt = now - last_time;
            // a failed frame is skipped, not retried; the next frame is the
            // recovery path
            if let Err(err) = app.borrow_mut().frame(dt) {
                web_sys::console::error_1(&err);
            }
        }
        last_time = now;

        // schedule next
        window()
            .unwrap()
            .request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref())
            .unwrap();
    }) as Box<dyn FnMut()>));

    window()
        .unwrap()
        .request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref())?;

    Ok(())
}
