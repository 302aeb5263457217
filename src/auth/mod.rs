pub mod bridge;
pub mod client;
pub mod session;

use serde::Serialize;

/// Decision codes returned by the confirmation service, interpreted by sign:
/// negative denies, zero keeps waiting, positive allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Failed,
    Rejected,
    Pending,
    Success,
    PreauthSuccess,
}

impl AuthDecision {
    #[must_use]
    pub const fn from_status(status: i64) -> Self {
        match status {
            -1 => Self::Rejected,
            0 => Self::Pending,
            1 => Self::Success,
            s if s < 0 => Self::Failed,
            _ => Self::PreauthSuccess,
        }
    }

    #[must_use]
    pub const fn status(self) -> i64 {
        match self {
            Self::Failed => -2,
            Self::Rejected => -1,
            Self::Pending => 0,
            Self::Success => 1,
            Self::PreauthSuccess => 2,
        }
    }

    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Success | Self::PreauthSuccess)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Failed | Self::Rejected)
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Payload sent to both service endpoints. Polls resend the same payload,
/// the service correlates by subject and requestor.
#[derive(Debug, Serialize)]
pub struct DecisionRequest<'a> {
    pub samid: &'a str,
    pub requestor: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_known_codes() {
        assert_eq!(AuthDecision::from_status(-1), AuthDecision::Rejected);
        assert_eq!(AuthDecision::from_status(0), AuthDecision::Pending);
        assert_eq!(AuthDecision::from_status(1), AuthDecision::Success);
        assert_eq!(AuthDecision::from_status(2), AuthDecision::PreauthSuccess);
        assert_eq!(AuthDecision::from_status(-2), AuthDecision::Failed);
    }

    #[test]
    fn test_from_status_unknown_codes_follow_sign() {
        assert_eq!(AuthDecision::from_status(-99), AuthDecision::Failed);
        assert_eq!(AuthDecision::from_status(99), AuthDecision::PreauthSuccess);
    }

    #[test]
    fn test_sign_predicates() {
        assert!(AuthDecision::Success.is_approved());
        assert!(AuthDecision::PreauthSuccess.is_approved());
        assert!(AuthDecision::Rejected.is_denied());
        assert!(AuthDecision::Failed.is_denied());
        assert!(AuthDecision::Pending.is_pending());
        assert!(!AuthDecision::Pending.is_approved());
        assert!(!AuthDecision::Pending.is_denied());
    }

    #[test]
    fn test_request_payload_shape() {
        let payload = DecisionRequest {
            samid: "alice",
            requestor: "vpn-gw1",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["samid"], "alice");
        assert_eq!(json["requestor"], "vpn-gw1");
    }
}
