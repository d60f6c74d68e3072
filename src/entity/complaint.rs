// src/entity/complaint.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Electricity,
    Water,
    WiFi,
    Cleanliness,
    Other,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Electricity => write!(f, "Electricity"),
            Category::Water => write!(f, "Water"),
            Category::WiFi => write!(f, "WiFi"),
            Category::Cleanliness => write!(f, "Cleanliness"),
            Category::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "electricity" => Ok(Category::Electricity),
            "water" => Ok(Category::Water),
            "wifi" => Ok(Category::WiFi),
            "cleanliness" => Ok(Category::Cleanliness),
            "other" => Ok(Category::Other),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Fixed rank used for the admin dashboard sort: Urgent first, Low last.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
            Priority::Urgent => write!(f, "Urgent"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Solved,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "Pending"),
            Status::InProgress => write!(f, "In Progress"),
            Status::Solved => write!(f, "Solved"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Ok(Status::Pending),
            "in_progress" | "inprogress" => Ok(Status::InProgress),
            "solved" => Ok(Status::Solved),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// A reported issue, owned by the student who raised it.
///
/// `created_at` is set once; `updated_at` moves on every status mutation.
/// There is no delete: complaints are permanent records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: Category,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub admin_remarks: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current time truncated to microseconds, the resolution the store keeps.
/// Keeps a freshly created record identical to its re-read form.
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    now - chrono::Duration::nanoseconds(i64::from(now.timestamp_subsec_nanos() % 1_000))
}

impl Complaint {
    pub fn new(owner_id: Uuid, category: Category, description: String, priority: Priority) -> Self {
        let now = now_micros();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category,
            description,
            priority,
            status: Status::default(),
            admin_remarks: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_ordering() {
        assert!(Priority::Urgent.rank() > Priority::High.rank());
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [Status::Pending, Status::InProgress, Status::Solved] {
            let parsed: Status = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_accepts_loose_spellings() {
        assert_eq!("in progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("InProgress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
    }

    #[test]
    fn test_invalid_enum_values_rejected() {
        assert!("Gas".parse::<Category>().is_err());
        assert!("Critical".parse::<Priority>().is_err());
        assert!("Closed".parse::<Status>().is_err());
    }

    #[test]
    fn test_new_complaint_defaults() {
        let owner = Uuid::new_v4();
        let c = Complaint::new(owner, Category::WiFi, "No signal".to_string(), Priority::High);
        assert_eq!(c.owner_id, owner);
        assert_eq!(c.status, Status::Pending);
        assert_eq!(c.admin_remarks, "");
        assert_eq!(c.created_at, c.updated_at);
    }

    #[test]
    fn test_complaint_wire_names_are_camel_case() {
        let c = Complaint::new(
            Uuid::new_v4(),
            Category::WiFi,
            "No signal".to_string(),
            Priority::Medium,
        );
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("ownerId").is_some());
        assert!(json.get("adminRemarks").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["category"], "WiFi");
        assert_eq!(json["status"], "Pending");
    }

    #[test]
    fn test_in_progress_wire_value_has_space() {
        let json = serde_json::to_value(Status::InProgress).unwrap();
        assert_eq!(json, "In Progress");
    }
}
