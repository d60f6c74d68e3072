//! Admin dashboard endpoints: filtered listing with aggregates, status
//! updates, and the standalone stats view. Role gating happens in the
//! router layer (`auth::admin_only`), not here.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{dispatch, AppState, Envelope};
use crate::entity::{Complaint, OwnerInfo, Status};
use crate::error::{AppError, Result};
use crate::store::{ComplaintFilter, StatusCounts};

#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// A complaint joined with the identity slice the dashboard displays.
/// `owner` is null when the user record no longer exists.
#[derive(Debug, Serialize)]
pub struct ComplaintWithOwner {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub owner: Option<OwnerInfo>,
}

fn parse_filter(query: AdminListQuery) -> Result<ComplaintFilter> {
    let mut filter = ComplaintFilter::default();

    // Empty query values (`?status=`) mean "no constraint", same as omission.
    if let Some(s) = query.status.filter(|s| !s.is_empty()) {
        filter.status = Some(s.parse().map_err(AppError::Validation)?);
    }
    if let Some(c) = query.category.filter(|c| !c.is_empty()) {
        filter.category = Some(c.parse().map_err(AppError::Validation)?);
    }
    if let Some(p) = query.priority.filter(|p| !p.is_empty()) {
        filter.priority = Some(p.parse().map_err(AppError::Validation)?);
    }

    Ok(filter)
}

/// Urgent first, then most recent. The sort is stable, so entries with equal
/// priority and timestamp keep the underlying store order.
pub fn sort_for_dashboard(rows: &mut [ComplaintWithOwner]) {
    rows.sort_by(|a, b| {
        b.complaint
            .priority
            .rank()
            .cmp(&a.complaint.priority.rank())
            .then_with(|| b.complaint.created_at.cmp(&a.complaint.created_at))
    });
}

/// GET /admin?status=&category=&priority=
pub async fn list_complaints(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Envelope<Vec<ComplaintWithOwner>>>> {
    let filter = parse_filter(query)?;

    let store = state.store.lock().await;
    let complaints = store.list_filtered(&filter)?;

    let mut rows = Vec::with_capacity(complaints.len());
    for complaint in complaints {
        let owner = store
            .get_user(&complaint.owner_id)?
            .map(|user| OwnerInfo::from(&user));
        rows.push(ComplaintWithOwner { complaint, owner });
    }

    // Stats cover the whole collection regardless of the applied filter.
    let stats = store.status_counts()?;
    drop(store);

    sort_for_dashboard(&mut rows);

    Ok(Json(Envelope::with_stats(
        "Complaints fetched successfully",
        rows,
        stats,
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub status: Option<String>,
    pub admin_remarks: Option<String>,
}

/// PUT /admin/{id}
pub async fn update_complaint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Envelope<Complaint>>> {
    let status: Status = req
        .status
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Status is required".to_string()))?
        .parse()
        .map_err(AppError::Validation)?;
    let admin_remarks = req.admin_remarks.unwrap_or_default();

    let (complaint, owner) = {
        let store = state.store.lock().await;
        let complaint = store
            .update_status(&id, status, &admin_remarks)?
            .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;
        let owner = store.get_user(&complaint.owner_id)?;
        (complaint, owner)
    };

    // The mutation is already persisted; a failed email never rolls it back.
    if let Some(owner) = owner {
        let complaint_id = complaint.id;
        let remarks = complaint.admin_remarks.clone();
        dispatch(state.notifier.clone(), move |n| {
            n.status_update(&owner.email, complaint_id, status, &remarks)
        })
        .await;
    }

    Ok(Json(Envelope::success(
        "Complaint status updated successfully",
        complaint,
    )))
}

/// GET /admin/stats/dashboard
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<Envelope<StatusCounts>>> {
    let stats = state.store.lock().await.status_counts()?;
    Ok(Json(Envelope::success("Stats fetched successfully", stats)))
}
