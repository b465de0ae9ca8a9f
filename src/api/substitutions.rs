//! Substitution handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Operation;
use crate::errors::Result;
use crate::schemas::{SubstitutionRequest, SubstitutionView};
use crate::substitution::ListMode;

use super::{blocking, body, require, require_caller};

#[derive(Debug, Deserialize)]
pub struct ReasonBody {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub mode: Option<String>,
}

/// The role rule depends on the mode, so only authentication is checked
/// before the mode is parsed; the service applies the role rule.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SubstitutionView>>> {
    let caller = require_caller(&state, &headers)?;
    let mode = query.mode.as_deref().map(str::parse::<ListMode>).transpose()?;
    blocking(state, move |s| s.substitutions.list(&caller, mode))
        .await
        .map(Json)
}

/// `:id` is the shift id on this route
pub async fn request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shift_id): Path<String>,
    payload: std::result::Result<Json<ReasonBody>, JsonRejection>,
) -> Result<Json<SubstitutionRequest>> {
    let caller = require(&state, &headers, Operation::RequestSubstitution)?;
    let ReasonBody { reason } = body(payload)?;
    blocking(state, move |s| s.substitutions.request(&caller, &shift_id, &reason))
        .await
        .map(Json)
}

pub async fn edit_reason(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ReasonBody>, JsonRejection>,
) -> Result<Json<SubstitutionRequest>> {
    let caller = require(&state, &headers, Operation::EditRequest)?;
    let ReasonBody { reason } = body(payload)?;
    blocking(state, move |s| s.substitutions.edit_reason(&caller, &id, &reason))
        .await
        .map(Json)
}

pub async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SubstitutionRequest>> {
    let caller = require(&state, &headers, Operation::CancelRequest)?;
    blocking(state, move |s| s.substitutions.cancel(&caller, &id))
        .await
        .map(Json)
}

pub async fn approve_recruit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SubstitutionRequest>> {
    let caller = require(&state, &headers, Operation::ApproveRecruit)?;
    blocking(state, move |s| s.substitutions.approve_recruit(&caller, &id))
        .await
        .map(Json)
}

pub async fn accept(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SubstitutionRequest>> {
    let caller = require(&state, &headers, Operation::AcceptSubstitution)?;
    blocking(state, move |s| s.substitutions.accept(&caller, &id))
        .await
        .map(Json)
}

pub async fn finalize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SubstitutionRequest>> {
    let caller = require(&state, &headers, Operation::FinalApprove)?;
    blocking(state, move |s| s.workflow.finalize(&caller, &id).map(|f| f.request))
        .await
        .map(Json)
}
