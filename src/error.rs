use std::time::Duration;

use thiserror::Error;

/// Library error type for photo booth operations.
#[derive(Debug, Error)]
pub enum Error {
    /// `remove_child` named a widget that is not a child of the given parent.
    #[error("widget is not a child of the given parent")]
    ChildNotFound,

    /// `attach` was called on a widget that already has a different parent.
    #[error("widget is already attached to another parent")]
    AlreadyAttached,

    /// A label's font name was set to an empty string.
    #[error("font name must not be empty")]
    EmptyFontName,

    /// No usable font could be resolved for the requested family.
    #[error("no usable font found for family {0:?}")]
    FontUnavailable(String),

    /// Hardware did not become ready within the allotted wait.
    #[error("{what} not ready after {waited:?}")]
    HardwareTimeout { what: &'static str, waited: Duration },
}
