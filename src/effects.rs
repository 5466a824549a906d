//! The fixed shader-effect catalog: GLSL program pairs plus Rust reference
//! implementations of the per-pixel math so the sampling model is testable
//! off-GPU.
//!
//! Texture-using effects do not carry authored UVs. The vertex stage projects
//! the vertex to normalized device coordinates, remaps to [0,1] and flips Y,
//! so a tile always "sees" the slice of the backing image behind it. A
//! projected origin is passed along as `vCenter` for the lit effect.

/// One entry in the effect gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Solid white, no texture.
    Basic,
    /// Interpolated per-vertex color.
    Color,
    /// Vertex color multiplied by the screen-space texel.
    Textured,
    /// Textured, but the projection used for tex coords is computed from the
    /// vertex scaled by 0.5, which magnifies the image under the tile.
    Magnified,
    /// Luminance quantized to 8 levels.
    Posterized,
    /// Sobel gradient encoded as an RGB normal map.
    Normals,
    /// Lambertian shading of the pseudo-normal, light at the projected tile
    /// center.
    Lit,
    /// Gradient magnitude through a blue/green/red ramp.
    Sobel,
}

impl Effect {
    pub fn catalog() -> [Effect; 8] {
        [
            Effect::Basic,
            Effect::Color,
            Effect::Textured,
            Effect::Magnified,
            Effect::Posterized,
            Effect::Normals,
            Effect::Lit,
            Effect::Sobel,
        ]
    }

    /// The four effects shown on the hive ring, in ring order.
    pub fn hive_ring() -> [Effect; 4] {
        [Effect::Magnified, Effect::Sobel, Effect::Posterized, Effect::Lit]
    }

    pub fn vertex_source(self) -> &'static str {
        match self {
            Effect::Basic => VERT_BASIC,
            Effect::Color => VERT_COLOR,
            Effect::Magnified => VERT_MAGNIFY,
            _ => VERT_TEXTURE,
        }
    }

    pub fn fragment_source(self) -> &'static str {
        match self {
            Effect::Basic => FRAG_BASIC,
            Effect::Color => FRAG_COLOR,
            Effect::Textured | Effect::Magnified => FRAG_TEXTURE,
            Effect::Posterized => FRAG_POSTERIZED,
            Effect::Normals => FRAG_NORMALS,
            Effect::Lit => FRAG_LIT,
            Effect::Sobel => FRAG_SOBEL,
        }
    }

    /// Whether the program samples the shared image texture.
    pub fn uses_texture(self) -> bool {
        !matches!(self, Effect::Basic | Effect::Color)
    }

    /// Whether the program needs `uTextureSize` kept in sync with the live
    /// backing image resolution. Stale sizes misalign neighborhood sampling.
    pub fn uses_texture_size(self) -> bool {
        self.uses_texture()
    }
}

// ---------------------------------------------------------------------------
// Reference math. Mirrors of the fragment programs, used by tests and kept
// next to the GLSL so a change to one is a change to both.
// ---------------------------------------------------------------------------

/// Sobel row kernel; transposing it yields the column kernel.
pub const SOBEL_KERNEL: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]];

/// Posterization level count.
pub const POSTERIZE_LEVELS: f32 = 8.0;

/// Magnitude breakpoint between the blue/green and green/red ramp segments.
pub const EDGE_RAMP_KEY: f32 = 0.2;

/// Channel-mean luminance, as the posterize program computes it.
pub fn luminance(rgb: [f32; 3]) -> f32 {
    (rgb[0] + rgb[1] + rgb[2]) / 3.0
}

/// Quantize `g` to `levels` discrete steps: `floor(g * levels) / levels`.
pub fn posterize(g: f32, levels: f32) -> f32 {
    (g * levels).floor() / levels
}

/// UV offset for kernel cell `(x, y)`: the 3x3 grid is centered by
/// subtracting 1.5 from each integer offset, then scaled into texel units.
pub fn sample_offset(x: usize, y: usize, texture_size: [f32; 2]) -> [f32; 2] {
    [
        (x as f32 - 1.5) / texture_size[0],
        (y as f32 - 1.5) / texture_size[1],
    ]
}

/// Apply the Sobel kernel and its transpose over a 3x3 patch of red-channel
/// intensities, yielding the two gradient components.
pub fn gradient(patch: &[[f32; 3]; 3]) -> (f32, f32) {
    let mut gx = 0.0;
    let mut gy = 0.0;
    for x in 0..3 {
        for y in 0..3 {
            gx += patch[x][y] * SOBEL_KERNEL[x][y];
            gy += patch[x][y] * SOBEL_KERNEL[y][x];
        }
    }
    (gx, gy)
}

fn normalize3(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Pseudo-normal from a gradient, encoded for an RGB normal map
/// (components remapped from [-1,1] to [0,1]).
pub fn encode_normal(gx: f32, gy: f32) -> [f32; 3] {
    let n = normalize3([gx.clamp(-1.0, 1.0), gy.clamp(-1.0, 1.0), 1.0]);
    [n[0] * 0.5 + 0.5, n[1] * 0.5 + 0.5, n[2] * 0.5 + 0.5]
}

/// Lambertian intensity for the lit effect: the gradient is negated before
/// forming the normal, the light sits at the projected center at height 0.05.
pub fn lit_intensity(gx: f32, gy: f32, center: [f32; 2], uv: [f32; 2]) -> f32 {
    let n = normalize3([(-gx).clamp(-1.0, 1.0), (-gy).clamp(-1.0, 1.0), 1.0]);
    let light_dir = normalize3([center[0] - uv[0], center[1] - uv[1], 0.05]);
    (n[0] * light_dir[0] + n[1] * light_dir[1] + n[2] * light_dir[2]).max(0.0)
}

fn step(edge: f32, x: f32) -> f32 {
    if x >= edge {
        1.0
    } else {
        0.0
    }
}

fn mix3(a: [f32; 3], b: [f32; 3], f: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * f,
        a[1] + (b[1] - a[1]) * f,
        a[2] + (b[2] - a[2]) * f,
    ]
}

/// False-color ramp for a clamped gradient magnitude: blue to green below the
/// breakpoint, green to red above it.
pub fn edge_ramp(grad: f32) -> [f32; 3] {
    let grad = grad.clamp(0.0, 1.0);
    const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
    const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
    const RED: [f32; 3] = [1.0, 0.0, 0.0];

    let low = mix3(BLUE, GREEN, grad / EDGE_RAMP_KEY);
    let high = mix3(GREEN, RED, (grad - EDGE_RAMP_KEY) / (1.0 - EDGE_RAMP_KEY));
    let mut color = [0.0; 3];
    for c in 0..3 {
        color[c] = low[c] * step(grad, EDGE_RAMP_KEY) + high[c] * step(EDGE_RAMP_KEY, grad);
    }
    color
}

// ---------------------------------------------------------------------------
// GLSL sources (GLSL ES 1.00; runs unchanged on a WebGL2 context).
// ---------------------------------------------------------------------------

const VERT_BASIC: &str = r#"
attribute vec3 aVertexPosition;

uniform mat4 uMVMatrix;
uniform mat4 uPMatrix;

void main(void) {
    gl_Position = uPMatrix * uMVMatrix * vec4(aVertexPosition, 1.0);
}
"#;

const VERT_COLOR: &str = r#"
attribute vec3 aVertexPosition;
attribute vec4 aVertexColor;

uniform mat4 uMVMatrix;
uniform mat4 uPMatrix;

varying vec4 vColor;

void main(void) {
    gl_Position = uPMatrix * uMVMatrix * vec4(aVertexPosition, 1.0);
    vColor = aVertexColor;
}
"#;

const VERT_TEXTURE: &str = r#"
attribute vec3 aVertexPosition;
attribute vec4 aVertexColor;

uniform mat4 uMVMatrix;
uniform mat4 uPMatrix;
uniform vec2 uTextureSize;

varying vec4 vColor;
varying vec2 vTexCoord;
varying vec2 vTextureSize;
varying vec2 vCenter;

void main(void) {
    gl_Position = uPMatrix * uMVMatrix * vec4(aVertexPosition, 1.0);

    // screen-space tex coords: project, remap to [0,1], flip vertically
    vec4 mvPos = uPMatrix * uMVMatrix * vec4(aVertexPosition, 1.0);
    mvPos /= mvPos.w;
    vTexCoord = mvPos.xy * 0.5 + 0.5;
    vTexCoord.y = 1.0 - vTexCoord.y;

    vColor = aVertexColor;
    vTextureSize = uTextureSize;

    // projected origin, the lit effect treats it as the light position
    vec4 center4 = uPMatrix * uMVMatrix * vec4(0.0, 0.0, 0.0, 1.0);
    vCenter = (center4.xy / center4.w) * 0.5 + 0.5;
    vCenter.y = 1.0 - vCenter.y;
}
"#;

const VERT_MAGNIFY: &str = r#"
attribute vec3 aVertexPosition;
attribute vec4 aVertexColor;

uniform mat4 uMVMatrix;
uniform mat4 uPMatrix;
uniform vec2 uTextureSize;

varying vec4 vColor;
varying vec2 vTexCoord;
varying vec2 vTextureSize;
varying vec2 vCenter;

void main(void) {
    gl_Position = uPMatrix * uMVMatrix * vec4(aVertexPosition, 1.0);

    // sampling from a half-size footprint zooms the image under the tile
    vec3 shrunk = aVertexPosition;
    shrunk.xy *= 0.5;
    vec4 mvPos = uPMatrix * uMVMatrix * vec4(shrunk, 1.0);
    mvPos /= mvPos.w;
    vTexCoord = mvPos.xy * 0.5 + 0.5;
    vTexCoord.y = 1.0 - vTexCoord.y;

    vColor = aVertexColor;
    vTextureSize = uTextureSize;

    vec4 center4 = uPMatrix * uMVMatrix * vec4(0.0, 0.0, 0.0, 1.0);
    vCenter = (center4.xy / center4.w) * 0.5 + 0.5;
    vCenter.y = 1.0 - vCenter.y;
}
"#;

const FRAG_BASIC: &str = r#"
precision mediump float;

void main(void) {
    gl_FragColor = vec4(1.0, 1.0, 1.0, 1.0);
}
"#;

const FRAG_COLOR: &str = r#"
precision mediump float;

varying vec4 vColor;

void main(void) {
    gl_FragColor = vColor;
}
"#;

const FRAG_TEXTURE: &str = r#"
precision mediump float;

varying vec4 vColor;
varying vec2 vTexCoord;

uniform sampler2D uSampler;

void main(void) {
    gl_FragColor = vColor * texture2D(uSampler, vTexCoord);
}
"#;

const FRAG_POSTERIZED: &str = r#"
precision mediump float;

varying vec2 vTexCoord;

uniform sampler2D uSampler;

void main(void) {
    vec3 sample = texture2D(uSampler, vTexCoord).xyz;
    float g = (sample.x + sample.y + sample.z) / 3.0;

    const float Q = 8.0;
    float quantized = floor(g * Q) / Q;

    gl_FragColor = vec4(vec3(quantized), 1.0);
}
"#;

const FRAG_NORMALS: &str = r#"
precision mediump float;

varying vec2 vTexCoord;
varying vec2 vTextureSize;

uniform sampler2D uSampler;

vec3 src_value(vec2 uv, ivec2 oft) {
    vec2 sample_oft = vec2(oft.x, oft.y) - vec2(1.5);
    return texture2D(uSampler, uv + sample_oft / vTextureSize).xyz;
}

void main(void) {
    mat3 kernel;
    kernel[0] = vec3(1.0, 2.0, 1.0);
    kernel[1] = vec3(0.0, 0.0, 0.0);
    kernel[2] = vec3(-1.0, -2.0, -1.0);

    float gx = 0.0;
    float gy = 0.0;
    for (int x = 0; x < 3; ++x) {
        for (int y = 0; y < 3; ++y) {
            float v = src_value(vTexCoord, ivec2(x, y)).x;
            gx += v * kernel[x][y];
            gy += v * kernel[y][x];
        }
    }

    vec2 g = clamp(vec2(gx, gy), -1.0, 1.0);
    vec3 normal = normalize(vec3(g, 1.0));

    gl_FragColor = vec4(normal * 0.5 + 0.5, 1.0);
}
"#;

const FRAG_LIT: &str = r#"
precision mediump float;

varying vec2 vTexCoord;
varying vec2 vTextureSize;
varying vec2 vCenter;

uniform sampler2D uSampler;

vec3 src_value(vec2 uv, ivec2 oft) {
    vec2 sample_oft = vec2(oft.x, oft.y) - vec2(1.5);
    return texture2D(uSampler, uv + sample_oft / vTextureSize).xyz;
}

void main(void) {
    mat3 kernel;
    kernel[0] = vec3(1.0, 2.0, 1.0);
    kernel[1] = vec3(0.0, 0.0, 0.0);
    kernel[2] = vec3(-1.0, -2.0, -1.0);

    float gx = 0.0;
    float gy = 0.0;
    for (int x = 0; x < 3; ++x) {
        for (int y = 0; y < 3; ++y) {
            float v = src_value(vTexCoord, ivec2(x, y)).x;
            gx += v * kernel[x][y];
            gy += v * kernel[y][x];
        }
    }

    vec2 g = clamp(vec2(gx, gy), -1.0, 1.0);
    vec3 normal = normalize(vec3(-g, 1.0));

    // light hovers just above the projected tile center
    vec3 light = vec3(vCenter, 0.05);
    vec3 lightdir = normalize(light - vec3(vTexCoord, 0.0));
    float diff = max(dot(normal, lightdir), 0.0);

    gl_FragColor = vec4(vec3(diff), 1.0);
}
"#;

const FRAG_SOBEL: &str = r#"
precision mediump float;

varying vec2 vTexCoord;
varying vec2 vTextureSize;

uniform sampler2D uSampler;

vec3 src_value(vec2 uv, ivec2 oft) {
    vec2 sample_oft = vec2(oft.x, oft.y) - vec2(1.5);
    return texture2D(uSampler, uv + sample_oft / vTextureSize).xyz;
}

void main(void) {
    mat3 kernel;
    kernel[0] = vec3(1.0, 2.0, 1.0);
    kernel[1] = vec3(0.0, 0.0, 0.0);
    kernel[2] = vec3(-1.0, -2.0, -1.0);

    float gx = 0.0;
    float gy = 0.0;
    for (int x = 0; x < 3; ++x) {
        for (int y = 0; y < 3; ++y) {
            float v = src_value(vTexCoord, ivec2(x, y)).x;
            gx += v * kernel[x][y];
            gy += v * kernel[y][x];
        }
    }

    float grad = clamp(sqrt(gx * gx + gy * gy), 0.0, 1.0);

    // two-segment false-color ramp with a knee at 0.2
    vec3 red = vec3(1.0, 0.0, 0.0);
    vec3 green = vec3(0.0, 1.0, 0.0);
    vec3 blue = vec3(0.0, 0.0, 1.0);

    float gkey = 0.2;
    vec3 color = mix(blue, green, grad / gkey) * step(grad, gkey);
    color += mix(green, red, (grad - gkey) / (1.0 - gkey)) * step(gkey, grad);

    gl_FragColor = vec4(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posterize_midpoint_hits_bucket_four() {
        assert_eq!(posterize(0.5, POSTERIZE_LEVELS), 0.5);
        assert_eq!(posterize(0.0, POSTERIZE_LEVELS), 0.0);
        // just under a bucket boundary stays in the lower bucket
        assert_eq!(posterize(0.4999, POSTERIZE_LEVELS), 3.0 / 8.0);
    }

    #[test]
    fn flat_patch_has_zero_gradient() {
        let patch = [[0.3; 3]; 3];
        let (gx, gy) = gradient(&patch);
        assert!(gx.abs() < 1e-6);
        assert!(gy.abs() < 1e-6);
    }

    #[test]
    fn vertical_edge_excites_one_component() {
        // columns dark-dark-bright: the transposed kernel picks it up
        let patch = [[0.0, 0.0, 1.0]; 3];
        let (gx, gy) = gradient(&patch);
        assert!(gx.abs() < 1e-6);
        assert!((gy - (-4.0)).abs() < 1e-6);
    }

    #[test]
    fn flat_area_encodes_straight_up_normal() {
        let n = encode_normal(0.0, 0.0);
        assert!((n[0] - 0.5).abs() < 1e-6);
        assert!((n[1] - 0.5).abs() < 1e-6);
        assert!((n[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn lit_is_brightest_under_the_light() {
        // flat surface, light directly overhead
        let under = lit_intensity(0.0, 0.0, [0.5, 0.5], [0.5, 0.5]);
        let away = lit_intensity(0.0, 0.0, [0.5, 0.5], [0.9, 0.9]);
        assert!((under - 1.0).abs() < 1e-6);
        assert!(away < under);
    }

    #[test]
    fn edge_ramp_segments() {
        assert_eq!(edge_ramp(0.0), [0.0, 0.0, 1.0]);
        assert_eq!(edge_ramp(1.0), [1.0, 0.0, 0.0]);
        // low segment blends blue toward green
        let low = edge_ramp(0.1);
        assert!(low[2] > 0.0 && low[1] > 0.0 && low[0] == 0.0);
        // high segment blends green toward red
        let high = edge_ramp(0.6);
        assert!(high[0] > 0.0 && high[1] > 0.0 && high[2] == 0.0);
    }

    #[test]
    fn sample_offsets_center_the_kernel() {
        let size = [200.0, 100.0];
        assert_eq!(sample_offset(0, 0, size), [-1.5 / 200.0, -1.5 / 100.0]);
        assert_eq!(sample_offset(2, 2, size), [0.5 / 200.0, 0.5 / 100.0]);
    }

    #[test]
    fn catalog_uniform_contract() {
        for effect in Effect::catalog() {
            let frag = effect.fragment_source();
            let vert = effect.vertex_source();
            assert_eq!(effect.uses_texture(), frag.contains("uSampler"), "{effect:?}");
            assert_eq!(
                effect.uses_texture_size(),
                vert.contains("uTextureSize"),
                "{effect:?}"
            );
            assert!(vert.contains("uMVMatrix") && vert.contains("uPMatrix"));
        }
        for effect in Effect::hive_ring() {
            assert!(effect.uses_texture());
        }
    }
}
