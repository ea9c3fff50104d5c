use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the skill
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(voice_calendar::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(voice_calendar::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(voice_calendar::google_calendar))]
    GoogleCalendar(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(code(voice_calendar::auth))]
    Auth(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(voice_calendar::http))]
    Http(#[from] reqwest::Error),

    #[error("Missing value for slot '{0}'")]
    #[diagnostic(code(voice_calendar::missing_slot))]
    MissingSlot(String),

    #[error("Invalid value '{value}' for slot '{slot}'")]
    #[diagnostic(code(voice_calendar::invalid_slot))]
    InvalidSlot { slot: String, value: String },

    #[error("No handler matched request: {0}")]
    #[diagnostic(
        code(voice_calendar::unhandled),
        help("add a route for this request type or intent")
    )]
    Unhandled(String),

    #[error("Request verification failed: {0}")]
    #[diagnostic(code(voice_calendar::verification))]
    Verification(String),

    #[error(transparent)]
    #[diagnostic(code(voice_calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(voice_calendar::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(voice_calendar::other))]
    Other(String),
}

impl Error {
    /// Name of the slot this error is about, if it is a slot problem
    pub fn slot(&self) -> Option<&str> {
        match self {
            Error::MissingSlot(slot) => Some(slot),
            Error::InvalidSlot { slot, .. } => Some(slot),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Auth(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Verification(_) => StatusCode::UNAUTHORIZED,
            Error::Serialization(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("Request rejected with {}: {:?}", status, self);
        (status, self.to_string()).into_response()
    }
}

/// Type alias for Result with our Error type
pub type SkillResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create slot parsing errors
pub fn invalid_slot(slot: &str, value: &str) -> Error {
    Error::InvalidSlot {
        slot: slot.to_string(),
        value: value.to_string(),
    }
}
