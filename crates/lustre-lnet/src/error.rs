use thiserror::Error;

/// Errors from building or parsing NIDs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NidError {
    /// The address part is not an IP address.
    #[error("{0:?} is not a valid IP address")]
    InvalidAddress(String),

    /// No `@network` part.
    #[error("NID {0:?} has no @network part")]
    MissingNetwork(String),

    /// The network part is not `<driver><instance>`.
    #[error("invalid LNet network {0:?}")]
    InvalidNetwork(String),

    /// The driver is not one this crate models.
    #[error("unsupported LNet driver {0:?}")]
    UnsupportedDriver(String),
}
