/// Errors raised while building a gesture configuration.
///
/// Nothing in the per-frame path returns an error: input that cannot be
/// interpreted simply yields no gesture.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The pinch threshold must be a positive, finite distance.
    #[error("invalid pinch threshold {0}: expected a positive normalized distance")]
    InvalidPinchThreshold(f32),

    /// A hand policy name that is neither `first` nor `last`.
    #[error("unknown hand policy {0:?}: expected \"first\" or \"last\"")]
    UnknownHandPolicy(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
