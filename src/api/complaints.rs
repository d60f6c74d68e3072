//! Student-facing endpoints: raise a complaint, list your own, fetch one.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{dispatch, AppState, AuthUser, Envelope};
use crate::entity::{Category, Complaint, Priority};
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub category: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

/// POST /complaints
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse> {
    let category = req.category.filter(|s| !s.is_empty());
    let description = req.description.filter(|s| !s.trim().is_empty());
    let (Some(category), Some(description)) = (category, description) else {
        return Err(AppError::Validation(
            "Category and description are required".to_string(),
        ));
    };

    let category: Category = category.parse().map_err(AppError::Validation)?;
    let priority: Priority = match req.priority.filter(|s| !s.is_empty()) {
        Some(p) => p.parse().map_err(AppError::Validation)?,
        None => Priority::default(),
    };

    let complaint = Complaint::new(auth.id, category, description, priority);

    let owner = {
        let store = state.store.lock().await;
        store.insert_complaint(&complaint)?;
        store.get_user(&auth.id)?
    };

    // Confirmation email is best-effort; the complaint is already persisted.
    if let Some(owner) = owner {
        let complaint_id = complaint.id;
        dispatch(state.notifier.clone(), move |n| {
            n.complaint_confirmation(&owner.email, complaint_id, category)
        })
        .await;
    }

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success("Complaint raised successfully", complaint)),
    ))
}

/// GET /complaints
pub async fn list_own(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Envelope<Vec<Complaint>>>> {
    let complaints = state.store.lock().await.list_by_owner(&auth.id)?;
    Ok(Json(Envelope::success(
        "Complaints fetched successfully",
        complaints,
    )))
}

/// GET /complaints/{id}
pub async fn get_one(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Complaint>>> {
    let complaint = state
        .store
        .lock()
        .await
        .get_complaint(&id)?
        .ok_or_else(|| AppError::NotFound("Complaint not found".to_string()))?;

    ensure_owner(&complaint, &auth)?;

    Ok(Json(Envelope::success(
        "Complaint fetched successfully",
        complaint,
    )))
}

/// A complaint may only be read through this endpoint by the student who
/// raised it; admins use the /admin listing instead.
pub fn ensure_owner(complaint: &Complaint, caller: &AuthUser) -> Result<()> {
    if complaint.owner_id != caller.id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Role;

    #[test]
    fn test_ensure_owner_accepts_the_owner() {
        let caller = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Student,
        };
        let complaint = Complaint::new(
            caller.id,
            Category::Water,
            "Leaky tap".to_string(),
            Priority::Low,
        );
        assert!(ensure_owner(&complaint, &caller).is_ok());
    }

    #[test]
    fn test_ensure_owner_rejects_other_students() {
        let complaint = Complaint::new(
            Uuid::new_v4(),
            Category::Water,
            "Leaky tap".to_string(),
            Priority::Low,
        );
        let caller = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Student,
        };
        assert!(matches!(
            ensure_owner(&complaint, &caller),
            Err(AppError::Forbidden)
        ));
    }
}
