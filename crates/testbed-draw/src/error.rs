//! Error types for shader setup and GPU submission.

use crate::config::ConfigError;
use crate::render::gfx::ShaderStage;

/// Errors produced while building or driving the debug renderers.
///
/// Shader compile and link failures happen at initialization and leave the
/// renderer unusable. Graphics errors are reported after a draw and are
/// diagnostic: the batch has already been reset when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A single shader stage failed to compile.
    #[error("failed to compile {stage} shader '{label}': {log}")]
    ShaderCompile {
        label: String,
        stage: ShaderStage,
        log: String,
    },

    /// The vertex and fragment stages failed to link into a program.
    #[error("failed to link shader program '{label}': {log}")]
    ShaderLink { label: String, log: String },

    /// The graphics context reported an error after an operation.
    #[error("graphics error during {operation}: {message}")]
    Graphics { operation: String, message: String },

    /// A draw was issued while no render target was bound.
    #[error("no render target bound -- call set_target before drawing")]
    NoTarget,

    /// A draw asked the backend to upload more vertices than its buffer holds.
    #[error("vertex upload of {requested} bytes exceeds buffer capacity of {capacity} bytes")]
    BufferOverflow { capacity: u64, requested: u64 },

    /// The configuration cannot produce working batches.
    #[error("invalid debug draw configuration: {0}")]
    Config(#[from] ConfigError),
}
