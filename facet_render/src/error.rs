use thiserror::Error;

use crate::id::BufferId;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
    #[error("backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(RenderError::OutOfMemory.to_string(), "out of GPU memory");
        assert_eq!(
            RenderError::UnknownBuffer(BufferId(3)).to_string(),
            "unknown buffer BufferId(3)"
        );
    }
}
