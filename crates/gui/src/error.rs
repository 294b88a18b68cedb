use thiserror::Error;

/// GPU-side failures of the scene renderer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("Shader program failed to link: {0}")]
    ProgramLink(String),

    #[error("Failed to create GPU resource: {0}")]
    ResourceCreation(String),
}
