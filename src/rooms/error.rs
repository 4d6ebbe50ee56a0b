use super::RoomCode;

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} does not exist")]
    NotFound(RoomCode),

    #[error("could not allocate a free room code in {attempts} attempts")]
    Exhausted { attempts: usize },

    #[error("invalid room code {0:?}: {1}")]
    InvalidCode(String, &'static str),

    #[error("room store failure: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("stored timestamp out of range: {0}")]
    Timestamp(#[from] time::error::ComponentRange),
}
