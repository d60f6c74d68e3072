use serde::Serialize;

use crate::store::StatusCounts;

/// Response envelope every endpoint speaks: `{success, message, data?, stats?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatusCounts>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            stats: None,
        }
    }

    pub fn with_stats(message: impl Into<String>, data: T, stats: StatusCounts) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            stats: Some(stats),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            stats: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_omits_data_and_stats() {
        let json = serde_json::to_value(Envelope::<()>::failure("nope")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "nope");
        assert!(json.get("data").is_none());
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let env = Envelope::with_stats("ok", (), StatusCounts::default());
        let json = serde_json::to_value(env).unwrap();
        assert!(json["stats"].get("inProgress").is_some());
    }
}
