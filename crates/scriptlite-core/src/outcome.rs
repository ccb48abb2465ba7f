//! Result tags handed to the presentation layer (CLI / HTTP).

use serde::{Deserialize, Serialize};

/// Every user-visible outcome of save / list / read maps to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Conflict,
    InvalidName,
    ProvisionFailed,
    InstallWarning,
    NotFound,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Conflict => "conflict",
            Self::InvalidName => "invalid_name",
            Self::ProvisionFailed => "provision_failed",
            Self::InstallWarning => "install_warning",
            Self::NotFound => "not_found",
        }
    }

    /// HTTP status code for this outcome. InstallWarning is still a 200: the script was saved.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Success | Self::InstallWarning => 200,
            Self::Conflict => 409,
            Self::InvalidName => 400,
            Self::ProvisionFailed => 500,
            Self::NotFound => 404,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::InstallWarning)
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short human-readable report: a tag plus the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: OutcomeKind,
    pub message: String,
}

impl Outcome {
    pub fn new(status: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tag_matches_as_str() {
        for kind in [
            OutcomeKind::Success,
            OutcomeKind::Conflict,
            OutcomeKind::InvalidName,
            OutcomeKind::ProvisionFailed,
            OutcomeKind::InstallWarning,
            OutcomeKind::NotFound,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_install_warning_is_still_success() {
        assert!(OutcomeKind::InstallWarning.is_success());
        assert_eq!(OutcomeKind::InstallWarning.http_status(), 200);
        assert!(!OutcomeKind::ProvisionFailed.is_success());
    }
}
