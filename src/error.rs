//!
//! # Place Result and Error Types
//!

/// # [PlaceError] Result Type
pub type PlaceResult<T> = Result<T, PlaceError>;

///
/// # Place Error Enumeration
///
pub enum PlaceError {
    /// Lifecycle contract violation, e.g. re-initializing without clearing
    Init { message: String },
    /// Divergence between the cached view and the external database
    Db { message: String },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
}
impl PlaceError {
    /// Create a [PlaceError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [PlaceError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create a [PlaceError::Init] lifecycle violation
    pub fn init(s: impl Into<String>) -> Self {
        Self::Init { message: s.into() }
    }
    /// Create a [PlaceError::Db] divergence error
    pub fn db(s: impl Into<String>) -> Self {
        Self::Db { message: s.into() }
    }
}
impl std::fmt::Debug for PlaceError {
    /// Display a [PlaceError]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PlaceError::Init { message } => {
                write!(f, "Init Error: \n - {}", message)
            }
            PlaceError::Db { message } => {
                write!(f, "Database Error: \n - {}", message)
            }
            PlaceError::Boxed(err) => err.fmt(f),
            PlaceError::Str(err) => err.fmt(f),
        }
    }
}
impl std::fmt::Display for PlaceError {
    /// Display a [PlaceError]
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for PlaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<String> for PlaceError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for PlaceError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl<T: std::error::Error + Send + Sync + 'static> From<Box<T>> for PlaceError {
    fn from(e: Box<T>) -> Self {
        Self::Boxed(e)
    }
}
