pub type OverlayResult<T> = Result<T, OverlayError>;

/// Error taxonomy for the overlay engine.
///
/// Load failures are non-fatal at the [`crate::ChatOverlay`] boundary (the
/// store degrades to empty), resource and abort failures are fatal to the
/// current call only and never corrupt shared state.
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("chat log load error: {0}")]
    Load(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("render aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn aborted(msg: impl Into<String>) -> Self {
        Self::Aborted(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            OverlayError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            OverlayError::load("x")
                .to_string()
                .contains("chat log load error:")
        );
        assert!(
            OverlayError::resource("x")
                .to_string()
                .contains("resource error:")
        );
        assert!(
            OverlayError::aborted("x")
                .to_string()
                .contains("render aborted:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = OverlayError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
