/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building registries or loading scenes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A character with the same name is already registered.
    #[error("character already exists: \"{0}\"")]
    DuplicateName(String),

    /// The scene file could not be read.
    #[error("cannot read scene file: {0}")]
    Io(#[from] std::io::Error),

    /// The scene file is not valid JSON for a scene.
    #[error("invalid scene file: {0}")]
    Parse(#[from] serde_json::Error),
}
