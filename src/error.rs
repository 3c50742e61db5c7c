use thiserror::Error;

/// Error taxonomy for the catalog pipeline.
///
/// Commands never forward these to Discord verbatim; they pick a short
/// notice for the requester and leave the details to the log.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required setting is missing or unusable. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to a provider.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("{0} returned HTTP {1}")]
    Status(String, reqwest::StatusCode),

    /// Provider answered 200 but the payload is missing an expected field.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// Could not derive an owner identifier from user-supplied input.
    #[error("could not resolve owner: {0}")]
    Resolve(String),

    /// Cache file could not be written.
    #[error("cache i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be serialized for persistence.
    #[error("cache serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
