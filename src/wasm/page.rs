//! DOM glue: element lookup, the 2D mirror canvas used for pixel picking,
//! and the info panel (color readout + histogram bars).

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement,
};

use crate::color::{self, Histogram, HISTOGRAM_BUCKETS};

const HISTO_BAR_FULL_WIDTH: f64 = 150.0;

/// Handles to every page element the demo touches. The mirror canvas holds a
/// 2D copy of the background image so single pixels can be read back without
/// touching the WebGL canvas.
pub struct Page {
    pub background_image: HtmlImageElement,
    pub render_canvas: HtmlCanvasElement,
    pub mouse_surface: HtmlCanvasElement,
    pub info_panel: HtmlElement,
    mirror_canvas: HtmlCanvasElement,
    mirror_ctx: CanvasRenderingContext2d,
    picker_swatch: HtmlElement,
    pixel_values: HtmlElement,
}

fn element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("element #{id} not found")))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an HtmlElement")))
}

impl Page {
    pub fn lookup(document: &Document) -> Result<Self, JsValue> {
        let background_image = element(document, "image")?.dyn_into::<HtmlImageElement>()?;
        let render_canvas = element(document, "render-canvas")?.dyn_into::<HtmlCanvasElement>()?;
        let mouse_surface = element(document, "mouse-surface")?.dyn_into::<HtmlCanvasElement>()?;
        let info_panel = element(document, "info-panel")?;
        let picker_swatch = element(document, "picker-color")?;
        let pixel_values = element(document, "pixel-values")?;

        let mirror_canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        let mirror_ctx = mirror_canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            background_image,
            render_canvas,
            mouse_surface,
            info_panel,
            mirror_canvas,
            mirror_ctx,
            picker_swatch,
            pixel_values,
        })
    }

    /// Resize every canvas to the image and redraw the 2D mirror.
    pub fn resize(&self, width: u32, height: u32) -> Result<(), JsValue> {
        self.mirror_canvas.set_width(width);
        self.mirror_canvas.set_height(height);
        self.render_canvas.set_width(width);
        self.render_canvas.set_height(height);
        self.mouse_surface.set_width(width);
        self.mouse_surface.set_height(height);

        self.mirror_ctx.draw_image_with_html_image_element_and_dw_and_dh(
            &self.background_image,
            0.0,
            0.0,
            width as f64,
            height as f64,
        )
    }

    /// Data URL of the mirrored image, used as the texture source.
    pub fn mirror_url(&self) -> Result<String, JsValue> {
        self.mirror_canvas.to_data_url()
    }

    /// Single-pixel read from the mirror. O(1): a fixed 1x1 region.
    pub fn pixel_at(&self, x: f64, y: f64) -> Result<[u8; 4], JsValue> {
        let data = self.mirror_ctx.get_image_data(x, y, 1.0, 1.0)?.data();
        Ok([data[0], data[1], data[2], data[3]])
    }

    /// Initial info-panel contents: red swatch, zeroed readout, grayscale
    /// bucket headers.
    pub fn init_info(&self, document: &Document) -> Result<(), JsValue> {
        self.picker_swatch
            .style()
            .set_property("background-color", "rgb(255,0,0)")?;
        self.pixel_values
            .set_inner_html("RGB: 0,0,0<br/>HSL: 0,0,0<br/>HEX: #FFFFFF");

        let step = 255 / HISTOGRAM_BUCKETS;
        for i in 0..HISTOGRAM_BUCKETS {
            let head = element(document, &format!("histo-head-{}", i + 1))?;
            let v = i * step;
            head.style()
                .set_property("background-color", &format!("rgb({v},{v},{v})"))?;
        }
        Ok(())
    }

    /// Refresh the swatch, the RGB/HSL/HEX readout and the histogram bars.
    pub fn update_info(
        &self,
        document: &Document,
        rgb: [u8; 4],
        histogram: &Histogram,
    ) -> Result<(), JsValue> {
        let [r, g, b, _] = rgb;
        self.picker_swatch
            .style()
            .set_property("background-color", &format!("rgb({r},{g},{b})"))?;

        let (h, s, l) = color::rgb_to_hsl([r, g, b]);
        let hex = color::rgb_to_hex([r, g, b]).to_uppercase();
        self.pixel_values.set_inner_html(&format!(
            "RGB: {r},{g},{b}<br/>HSL: {h},{s},{l}<br/>HEX: {hex}"
        ));

        let total = histogram.sample_count().max(1) as f64;
        for (i, &count) in histogram.counts().iter().enumerate() {
            let bar = element(document, &format!("histo-bar-{}", i + 1))?;
            let width = count as f64 * HISTO_BAR_FULL_WIDTH / total;
            bar.style().set_property("width", &format!("{width}px"))?;
        }
        Ok(())
    }

    /// Move the floating panel. X is the eased value, Y was clamped at
    /// pointer-move time.
    pub fn place_panel(&self, x: f32, y: f32) -> Result<(), JsValue> {
        let style = self.info_panel.style();
        style.set_property("left", &format!("{x}px"))?;
        style.set_property("top", &format!("{y}px"))
    }

    pub fn panel_height(&self) -> f32 {
        self.info_panel.client_height() as f32
    }
}
