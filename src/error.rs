use thiserror::Error;

/// Failure taxonomy for the renderer core.
///
/// There are no retries anywhere: a failed frame is skipped and the next
/// scheduled frame is the recovery path. Unknown uniform names are not an
/// error at all; the lookup simply yields nothing.
#[derive(Debug, Error)]
pub enum HiveError {
    #[error("could not obtain a WebGL context: {0}")]
    ContextInit(String),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("shader program failed to link: {log}")]
    ShaderLink { log: String },

    /// Push/pop mismatch in drawable traversal. Programming error, not
    /// user-recoverable.
    #[error("model-view matrix stack underflow")]
    StackUnderflow,

    #[error("mesh has {positions} positions but {colors} colors")]
    MeshMismatch { positions: usize, colors: usize },
}

#[cfg(target_arch = "wasm32")]
impl From<HiveError> for wasm_bindgen::JsValue {
    fn from(err: HiveError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
