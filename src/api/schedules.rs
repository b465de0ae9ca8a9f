//! Schedule handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::Operation;
use crate::errors::Result;
use crate::schedule::{NewShift, ShiftTemplate, TemplateOutcome};
use crate::schemas::{PersonalSummary, ShiftPatch, ShiftView};

use super::{blocking, body, require};

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    /// Any date inside the wanted week; defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

pub async fn create_shift(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<NewShift>, JsonRejection>,
) -> Result<Json<ShiftView>> {
    let caller = require(&state, &headers, Operation::CreateShift)?;
    let input = body(payload)?;
    blocking(state, move |s| s.schedule.create_shift(&caller, input))
        .await
        .map(Json)
}

pub async fn create_from_template(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ShiftTemplate>, JsonRejection>,
) -> Result<Json<TemplateOutcome>> {
    let caller = require(&state, &headers, Operation::CreateFromTemplate)?;
    let template = body(payload)?;
    blocking(state, move |s| s.schedule.create_from_template(&caller, template))
        .await
        .map(Json)
}

pub async fn list_week(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Vec<ShiftView>>> {
    let caller = require(&state, &headers, Operation::ListWeek)?;
    blocking(state, move |s| s.schedule.list_week(&caller, query.date.as_deref()))
        .await
        .map(Json)
}

pub async fn list_mine(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ShiftView>>> {
    let caller = require(&state, &headers, Operation::ListMine)?;
    blocking(state, move |s| s.schedule.list_mine(&caller))
        .await
        .map(Json)
}

pub async fn personal_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PersonalSummary>> {
    let caller = require(&state, &headers, Operation::ListMine)?;
    blocking(state, move |s| s.schedule.personal_summary(&caller))
        .await
        .map(Json)
}

pub async fn update_shift(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ShiftPatch>, JsonRejection>,
) -> Result<Json<ShiftView>> {
    let caller = require(&state, &headers, Operation::UpdateShift)?;
    let patch = body(payload)?;
    blocking(state, move |s| s.schedule.update_shift(&caller, &id, patch))
        .await
        .map(Json)
}

pub async fn delete_shift(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let caller = require(&state, &headers, Operation::DeleteShift)?;
    blocking(state, move |s| {
        s.schedule.delete_shift(&caller, &id)?;
        Ok(Deleted { id, deleted: true })
    })
    .await
    .map(Json)
}
