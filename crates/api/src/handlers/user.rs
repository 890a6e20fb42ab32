//! Handlers for the `/user` resource (calendar connection management).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use slotswap_core::error::CoreError;
use slotswap_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Calendar connection state returned by `GET /user/status`.
#[derive(Debug, Serialize)]
pub struct CalendarStatus {
    pub calendar_connected: bool,
    pub calendar_webhook_url: Option<String>,
}

/// Request body for `PUT /user/calendar`. A `null` (or absent) URL
/// disconnects the calendar.
#[derive(Debug, Deserialize)]
pub struct SetCalendarRequest {
    pub calendar_webhook_url: Option<String>,
}

/// GET /api/v1/user/status
///
/// Report whether the caller has an external calendar endpoint connected.
pub async fn status(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: auth.user_id,
            })
        })?;

    Ok(Json(DataResponse {
        data: CalendarStatus {
            calendar_connected: user.calendar_webhook_url.is_some(),
            calendar_webhook_url: user.calendar_webhook_url,
        },
    }))
}

/// PUT /api/v1/user/calendar
///
/// Set or clear the caller's calendar webhook endpoint. Accepted swaps are
/// mirrored to this URL; see the events crate.
pub async fn set_calendar(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SetCalendarRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref url) = input.calendar_webhook_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::BadRequest(
                "Calendar webhook URL must be an http(s) URL".to_string(),
            ));
        }
    }

    UserRepo::set_calendar_webhook(
        &state.pool,
        auth.user_id,
        input.calendar_webhook_url.as_deref(),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        connected = input.calendar_webhook_url.is_some(),
        "Calendar webhook updated"
    );

    Ok(Json(DataResponse {
        data: CalendarStatus {
            calendar_connected: input.calendar_webhook_url.is_some(),
            calendar_webhook_url: input.calendar_webhook_url,
        },
    }))
}
