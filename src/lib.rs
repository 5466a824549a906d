//! hivelens: a browser color-inspection and shader-preview demo. A WebGL
//! scene (arrow gizmo plus a ring of hexagon tiles, each running a different
//! fragment effect) floats over a loaded image, while a 2D mirror of the
//! image drives per-pixel picking and a rolling histogram.
//!
//! The animation/layout/effect math lives in host-testable modules; only the
//! WebGL and DOM glue is wasm-gated.

pub mod anim;
pub mod color;
pub mod effects;
pub mod error;
pub mod mesh;
pub mod scene;
pub mod transform;

// Only compile the browser glue when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod gl;
    mod page;
    mod render;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        render::start(document)?;
        Ok(())
    }
}

// When compiling for non-wasm targets (e.g., `cargo test` on host),
// provide an empty stub so the crate still builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
