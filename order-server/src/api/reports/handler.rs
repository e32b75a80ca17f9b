//! Sales Report Handlers

use axum::{Json, extract::State};
use shared::SalesReport;
use shared::request::ReportQuery;

use crate::core::ServerState;
use crate::utils::validation::require;
use crate::utils::{AppResult, ValidatedQuery};

/// GET /api/reports?start=&end=
pub async fn sales_report(
    State(state): State<ServerState>,
    ValidatedQuery(query): ValidatedQuery<ReportQuery>,
) -> AppResult<Json<SalesReport>> {
    let start = require(query.start.as_deref(), "start")?;
    let end = require(query.end.as_deref(), "end")?;

    let report = state.reports.build_report_from_str(start, end).await?;
    Ok(Json(report))
}
