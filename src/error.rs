use thiserror::Error;

/// The central error type for all operations in veilmark.
#[derive(Error, Debug)]
pub enum VeilmarkError {
    #[error("pixel buffer shape mismatch: {width}x{height} needs {expected} bytes, got {got}")]
    InputShape {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    #[error("hash computation failed: {0}")]
    Hash(String),

    #[error("image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// Manually implement PartialEq so tests can assert on error values.
// Foreign error types carried by `#[from]` variants are compared by
// variant only.
impl PartialEq for VeilmarkError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                VeilmarkError::InputShape {
                    width: w1,
                    height: h1,
                    expected: e1,
                    got: g1,
                },
                VeilmarkError::InputShape {
                    width: w2,
                    height: h2,
                    expected: e2,
                    got: g2,
                },
            ) => w1 == w2 && h1 == h2 && e1 == e2 && g1 == g2,
            (VeilmarkError::Decode(s1), VeilmarkError::Decode(s2)) => s1 == s2,
            (VeilmarkError::Encode(s1), VeilmarkError::Encode(s2)) => s1 == s2,
            (VeilmarkError::Hash(s1), VeilmarkError::Hash(s2)) => s1 == s2,
            (VeilmarkError::ImageError(_), VeilmarkError::ImageError(_)) => true,
            (VeilmarkError::IoError(_), VeilmarkError::IoError(_)) => true,
            _ => false,
        }
    }
}

/// A centralized result type for our library.
pub type Result<T> = std::result::Result<T, VeilmarkError>;
