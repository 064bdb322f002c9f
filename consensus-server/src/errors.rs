use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use consensus_core::{AuthError, ItineraryError, LobbyError, VoteError};

pub type ServerResult<T> = Result<T, ServerError>;

/// The HTTP-facing error taxonomy. Every domain error folds into one of
/// these, and the body is always `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::UsernameTaken(_) => Self::Conflict(value.to_string()),
            AuthError::UnknownUser(_) => Self::NotFound(value.to_string()),
            AuthError::InvalidUsername(_) => Self::Validation(value.to_string()),
        }
    }
}

impl From<VoteError> for ServerError {
    fn from(value: VoteError) -> Self {
        match value {
            VoteError::UnknownOption(_) => Self::NotFound(value.to_string()),
            // Domain-state conflicts: the request was well-formed but the
            // round cannot take it
            VoteError::RoundClosed(_) | VoteError::RoundNotOpen(_) => {
                Self::Conflict(value.to_string())
            }
        }
    }
}

impl From<ItineraryError> for ServerError {
    fn from(value: ItineraryError) -> Self {
        match value {
            ItineraryError::NotOwner => Self::Forbidden(value.to_string()),
            ItineraryError::BadIndex(_) => Self::Validation(value.to_string()),
            ItineraryError::NotReady
            | ItineraryError::Conflict { .. }
            | ItineraryError::Overflow { .. } => Self::Conflict(value.to_string()),
        }
    }
}

impl From<LobbyError> for ServerError {
    fn from(value: LobbyError) -> Self {
        match value {
            LobbyError::Validation(message) => Self::Validation(message),
            LobbyError::NotFound | LobbyError::CodeNotFound(_) | LobbyError::UnknownRound(_) => {
                Self::NotFound(value.to_string())
            }
            LobbyError::NotOwner(_) | LobbyError::NotAMember => {
                Self::Forbidden(value.to_string())
            }
            LobbyError::Full
            | LobbyError::NotReady
            | LobbyError::AlreadyStarted
            | LobbyError::NotStarted
            | LobbyError::RoundNotResolved(_)
            | LobbyError::WinnerMismatch
            | LobbyError::NoOptions(_) => Self::Conflict(value.to_string()),
            LobbyError::Vote(e) => e.into(),
            LobbyError::Itinerary(e) => e.into(),
            LobbyError::Provider(e) => Self::Unknown(e.to_string()),
        }
    }
}
