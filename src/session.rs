use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult};

pub const ANON_ID: &str = "anon_id";

/// Anonymous caller. Extracting it starts a session if the caller has none,
/// so handlers that take it never touch rooms without an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub Uuid);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError(anyhow!(msg)))?;
        Ok(Self(bootstrap(&session).await?))
    }
}

pub async fn bootstrap(session: &Session) -> AppResult<Uuid> {
    if let Some(anon) = session.get::<Uuid>(ANON_ID).await? {
        return Ok(anon);
    }

    let anon = Uuid::now_v7();
    session.insert(ANON_ID, anon).await?;
    tracing::debug!(%anon, "started anonymous session");
    Ok(anon)
}
