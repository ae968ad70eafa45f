use serde::{Deserialize, Serialize};

/// Acknowledgement returned by mutations that do not hand back the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
        }
    }

    /// Generic acknowledgement for requests the local dispatcher does not route.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: "not_found".to_string(),
            message: Some(message.into()),
        }
    }

    /// Payload the store could not interpret.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }

    /// The operation did what was asked.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// A handler processed the request, whatever its outcome. False only for
    /// the generic `ok` given to endpoints nothing routes.
    pub fn is_handled(&self) -> bool {
        self.status != "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_serializes_without_message() {
        let json = serde_json::to_string(&Ack::ok()).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }

    #[test]
    fn test_is_success() {
        assert!(Ack::success("done").is_success());
        assert!(!Ack::ok().is_success());
        assert!(!Ack::not_found("gone").is_success());
        assert!(!Ack::invalid("bad").is_success());
    }

    #[test]
    fn test_is_handled() {
        assert!(!Ack::ok().is_handled());
        assert!(Ack::success("done").is_handled());
        assert!(Ack::not_found("gone").is_handled());
        assert!(Ack::invalid("bad").is_handled());
    }
}
