use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;

use crate::errors::AppError;
use crate::middleware::auth::{check_api_token, has_content_type, tokens_match};
use crate::models::command::SlashCommand;
use crate::models::reply::{ConfirmAck, GateStatus, SlackReply};
use crate::AppState;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// POST /incoming — Slack slash command asking for the gate to open
pub async fn incoming(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SlackReply>, AppError> {
    if !has_content_type(&headers, FORM_CONTENT_TYPE) {
        return Err(AppError::bad_request("slash command is not form-urlencoded"));
    }

    let cmd = SlashCommand::from_form(&body);

    if !tokens_match(cmd.token.as_deref(), state.config.slack_token.as_deref()) {
        tracing::warn!(
            team = cmd.team_id.as_deref().unwrap_or("-"),
            "slash command with missing or invalid token"
        );
        return Err(AppError::bad_request("slack token mismatch"));
    }

    if !cmd.is_gate_command() {
        return Err(AppError::bad_request(format!(
            "unrecognised command {:?}",
            cmd.command.as_deref().unwrap_or("")
        )));
    }

    tracing::info!(
        user = cmd.user_name.as_deref().unwrap_or("-"),
        channel = cmd.channel_id.as_deref().unwrap_or("-"),
        command = cmd.command.as_deref().unwrap_or("-"),
        "slash command accepted"
    );

    let ack = state.coordinator.trigger_open(cmd.callback_address()).await;
    Ok(Json(ack))
}

/// POST /api/reset — gate controller confirms the gate opened
pub async fn confirm_opened(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ConfirmAck>, AppError> {
    if !has_content_type(&headers, JSON_CONTENT_TYPE) {
        return Err(AppError::bad_request("confirmation is not application/json"));
    }
    check_api_token(&headers, &state.config)?;

    Ok(Json(state.coordinator.confirm_opened().await))
}

/// GET /api — gate controller polls whether it should open
pub async fn gate_status(State(state): State<Arc<AppState>>) -> Json<GateStatus> {
    Json(GateStatus {
        should_open: state.coordinator.query_status().await,
    })
}
