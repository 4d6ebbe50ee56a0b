use axum::{http::StatusCode, response::{IntoResponse, Response}};

use crate::rooms::RoomError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<RoomError>() {
            Some(RoomError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(RoomError::InvalidCode(..)) => StatusCode::BAD_REQUEST,
            Some(RoomError::Exhausted { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Some(RoomError::Backend(_) | RoomError::Timestamp(_)) | None => {
                tracing::error!(error = %self.0, backtrace = %self.0.backtrace(), "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
