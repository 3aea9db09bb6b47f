use std::ffi::NulError;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("failed to serialize schema document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("string for the host contains a NUL byte at {position}")]
    InteriorNul { position: usize },
}

impl From<NulError> for SessionError {
    fn from(e: NulError) -> Self {
        SessionError::InteriorNul { position: e.nul_position() }
    }
}
