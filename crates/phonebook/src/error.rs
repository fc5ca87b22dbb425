/// Domain error taxonomy. Errors are raised close to their detection point
/// and carried unmodified to the HTTP boundary, which maps each kind to a
/// status code and response body.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}
