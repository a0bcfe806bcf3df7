use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use burrow_core::{Destination, ExpirationPolicy, Redirector, ShortCode, Shortener};
use jiff::Timestamp;
use tracing::{debug, info};

pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    // length is checked by the allocator against its configured limit
    let destination = Destination::parse_with_limit(&request.url, usize::MAX)?.into_string();
    let params = request.into_params(Timestamp::now())?;
    let expire_at = match params.expiration {
        ExpirationPolicy::AtTimestamp(at) => Some(at),
        _ => None,
    };

    let code = state.shortener.shorten(params).await?;
    info!(code = %code, destination = %destination, "created short url");

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            short_url: code.to_url(state.base_url()),
            short_code: code.to_string(),
            destination,
            expire_at,
        }),
    ))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    // a code that cannot exist is just unknown
    let Ok(code) = ShortCode::new(&code) else {
        debug!(code = %code, "malformed short code");
        return Err(AppError::NotFound);
    };

    match state.redirector.resolve(&code).await? {
        Some(destination) => Ok(Redirect::temporary(destination.as_str())),
        None => Err(AppError::NotFound),
    }
}
