use crate::infra::AppState;
use crate::report::BalanceReport;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Datelike;
use leave_portal::error::AppError;
use leave_portal::workflows::leave::{
    leave_router, Directory, LeaveRecordImporter, LeaveRepository, LeaveService, UserId,
};
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Balance report over an uploaded record export, independent of the live store.
#[derive(Debug, Deserialize)]
pub(crate) struct BalanceReportRequest {
    pub(crate) user_id: String,
    #[serde(default)]
    pub(crate) year: Option<i32>,
    pub(crate) records_csv: String,
}

pub(crate) fn with_leave_routes<R, D>(service: Arc<LeaveService<R, D>>) -> axum::Router
where
    R: LeaveRepository + 'static,
    D: Directory + 'static,
{
    leave_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/balances/report",
            axum::routing::post(balance_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn balance_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<BalanceReportRequest>,
) -> Result<Json<BalanceReport>, AppError> {
    let BalanceReportRequest {
        user_id,
        year,
        records_csv,
    } = payload;

    let records = LeaveRecordImporter::from_reader(Cursor::new(records_csv.into_bytes()))?;
    let year = year.unwrap_or_else(|| state.clock.now().year());
    let report = BalanceReport::build(&records, UserId(user_id), year, &state.limits);
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use leave_portal::workflows::leave::{FixedClock, LeaveType, LeaveTypeLimits};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            limits: Arc::new(LeaveTypeLimits::from_pairs([(LeaveType::Casual, 1.0)])),
            clock: Arc::new(FixedClock(
                NaiveDate::from_ymd_opt(2024, 11, 5)
                    .expect("valid date")
                    .and_hms_opt(10, 0, 0)
                    .expect("valid time"),
            )),
        }
    }

    #[tokio::test]
    async fn readiness_reflects_the_flag() {
        let waiting = readiness_endpoint(Extension(state(false)))
            .await
            .into_response();
        assert_eq!(waiting.status(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = readiness_endpoint(Extension(state(true)))
            .await
            .into_response();
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn balance_report_uses_configured_limits() {
        let request = BalanceReportRequest {
            user_id: "asha".to_string(),
            year: Some(2025),
            records_csv: "\
id,userId,type,fromDate,toDate,session,status,recommendedBy,reason,description,createdAt,updatedAt
l-1,asha,Casual,2025-04-01,2025-04-02,Full Day,Approved,HOD,Festival,,,
"
            .to_string(),
        };

        let Json(report) = balance_report_endpoint(Extension(state(true)), Json(request))
            .await
            .expect("report builds");

        assert_eq!(report.year, 2025);
        assert_eq!(report.balances.len(), 1);
        assert_eq!(report.balances[0].used, 2.0);
        assert_eq!(report.balances[0].remaining, 0.0);
        assert!(report.balances[0].overdrawn);
    }

    #[tokio::test]
    async fn malformed_exports_are_bad_requests() {
        let request = BalanceReportRequest {
            user_id: "asha".to_string(),
            year: None,
            records_csv: "\
id,userId,type,fromDate,toDate,session,status,recommendedBy,reason,description,createdAt,updatedAt
l-1,asha,Sabbatical,2025-04-01,2025-04-02,Full Day,Approved,,Rest,,,
"
            .to_string(),
        };

        let error = balance_report_endpoint(Extension(state(true)), Json(request))
            .await
            .expect_err("unknown leave type");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_year_defaults_to_the_clock() {
        let request = BalanceReportRequest {
            user_id: "asha".to_string(),
            year: None,
            records_csv: "\
id,userId,type,fromDate,toDate,session,status,recommendedBy,reason,description,createdAt,updatedAt
l-1,asha,Casual,2024-10-01,2024-10-01,Forenoon,Approved,HOD,Clinic,,,
l-2,asha,Casual,2025-01-06,2025-01-06,Full Day,Approved,HOD,Travel,,,
"
            .to_string(),
        };

        let Json(report) = balance_report_endpoint(Extension(state(true)), Json(request))
            .await
            .expect("report builds");

        assert_eq!(report.year, 2024);
        assert_eq!(report.balances[0].used, 0.5);
        assert!(!report.balances[0].overdrawn);
    }
}
