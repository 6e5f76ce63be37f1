use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("No page selected: both a class and an id are required")]
    Missing,
    #[error("Unknown page class \"{0}\"")]
    ClassNotAllowed(String),
}

/// Failure to retrieve a page document or a deferred block.
///
/// The `Display` form of `Status` and `Transport` is what readers see inline
/// in place of a block that could not be loaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to load: {locator}")]
    Status { locator: String, status: u16 },
    #[error("Error loading: {locator}")]
    Transport { locator: String, message: String },
    #[error("Invalid page document at {locator}: {message}")]
    InvalidDocument { locator: String, message: String },
}

impl FetchError {
    pub fn locator(&self) -> &str {
        match self {
            FetchError::Status { locator, .. }
            | FetchError::Transport { locator, .. }
            | FetchError::InvalidDocument { locator, .. } => locator,
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
