use thiserror::Error;

use super::device::Layer;

/// Failures surfaced by console renderers and their GPU devices.
///
/// None of these are transient: each points at a programming error or a
/// lost/unusable graphics context.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Shader module, pipeline, or other fixed resource failed to build.
    #[error("failed to create {resource}: {message}")]
    ResourceCreation {
        resource: &'static str,
        message: String,
    },
    /// A driver/validation error observed right after a state-changing call.
    #[error("graphics error after {call_site}: {message}")]
    GraphicsState {
        call_site: &'static str,
        message: String,
    },
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("failed to open graphics device: {0}")]
    DeviceRequest(String),
    #[error("framebuffer readback failed: {0}")]
    Readback(String),
    #[error("{layer:?} upload holds {actual} bytes, expected {expected}")]
    LayerSize {
        layer: Layer,
        expected: usize,
        actual: usize,
    },
    #[error("console of {width}x{height} cells exceeds the {limit}px texture limit")]
    ConsoleTooLarge { width: u32, height: u32, limit: u32 },
}
