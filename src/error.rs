use thiserror::Error;

/// Why a counting call could not produce a result.
///
/// Every variant is terminal: it is raised while the buffer is being prepared, before
/// any strategy runs, and is handed back to the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ProcessingError {
    /// No image data, or image data that could not be decoded.
    #[error("Unable to decode the image.")]
    DecodeFailure,
    /// The processing buffer could not be allocated.
    #[error("Unable to create a processing context for the image.")]
    ContextCreationFailure,
    /// The processing buffer could not be read as RGBA samples.
    #[error("Unable to access the processing context's pixel data.")]
    BufferAccessFailure,
}
