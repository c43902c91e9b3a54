//! Security Evaluator
//!
//! Điểm bảo mật bắt đầu từ cap và bị trừ theo từng loại phát hiện nghiêm
//! trọng trong risk report. Không có report thì điểm là 0: trạng thái bảo
//! mật không rõ thì không được thưởng.

// Internal imports
use crate::config::ScoringPolicy;
use crate::types::{RiskReport, Signal};

/// Lý do fallback khi không có risk report
pub const REPORT_UNAVAILABLE: &str = "risk report unavailable";

/// Các loại phát hiện rủi ro nghiêm trọng được nhận diện
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// Metadata có thể sửa
    MutableMetadata,
    /// Quyền mint vẫn bật
    MintAuthority,
    /// Holder tập trung cao
    HolderConcentration,
}

impl FindingKind {
    /// Nhận diện theo tên cờ, không phân biệt hoa thường
    pub fn classify(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let negated = ["disabled", "revoked", "renounced"]
            .iter()
            .any(|word| name.contains(word));

        if name.contains("mutable metadata") && !name.contains("immutable") {
            Some(FindingKind::MutableMetadata)
        } else if name.contains("mint authority") && !negated {
            Some(FindingKind::MintAuthority)
        } else if name.contains("holder") && (name.contains("concentration") || name.contains("top 10")) {
            Some(FindingKind::HolderConcentration)
        } else {
            None
        }
    }

    pub fn penalty(&self, policy: &ScoringPolicy) -> u32 {
        match self {
            FindingKind::MutableMetadata => policy.mutable_metadata_penalty,
            FindingKind::MintAuthority => policy.mint_authority_penalty,
            FindingKind::HolderConcentration => policy.holder_concentration_penalty,
        }
    }
}

/// Các loại phát hiện nghiêm trọng có trong report, mỗi loại một lần
pub fn recognized_findings(report: &RiskReport) -> Vec<FindingKind> {
    let mut kinds = Vec::new();
    for finding in &report.findings {
        if let Some(kind) = FindingKind::classify(&finding.name) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
    }
    kinds
}

/// Tính điểm bảo mật trong [0, security_cap]
pub fn evaluate_security(report: Option<&RiskReport>, policy: &ScoringPolicy) -> Signal<u32> {
    let Some(report) = report else {
        return Signal::fallback(0, REPORT_UNAVAILABLE);
    };

    let penalty: u32 = recognized_findings(report)
        .iter()
        .map(|kind| kind.penalty(policy))
        .sum();

    Signal::Measured(policy.security_cap.saturating_sub(penalty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskFinding;

    fn report(names: &[&str]) -> RiskReport {
        RiskReport::new(names.iter().map(|name| RiskFinding::named(*name)).collect())
    }

    #[test]
    fn test_clean_report_gets_full_cap() {
        let policy = ScoringPolicy::default();
        let score = evaluate_security(Some(&report(&[])), &policy);
        assert_eq!(score, Signal::Measured(40));
    }

    #[test]
    fn test_missing_report_scores_zero() {
        let policy = ScoringPolicy::default();
        let score = evaluate_security(None, &policy);
        assert!(score.is_fallback());
        assert_eq!(*score.value(), 0);
        assert_eq!(score.fallback_reason(), Some(REPORT_UNAVAILABLE));
    }

    #[test]
    fn test_penalties_per_finding() {
        let policy = ScoringPolicy::default();
        assert_eq!(*evaluate_security(Some(&report(&["Mutable Metadata"])), &policy).value(), 30);
        assert_eq!(*evaluate_security(Some(&report(&["Mint Authority Enabled"])), &policy).value(), 20);
        assert_eq!(
            *evaluate_security(Some(&report(&["High Concentration of Holders"])), &policy).value(),
            25
        );
        assert_eq!(
            *evaluate_security(
                Some(&report(&[
                    "Mutable metadata",
                    "Mint Authority still enabled",
                    "Top 10 holders high ownership",
                ])),
                &policy
            )
            .value(),
            0
        );
    }

    #[test]
    fn test_each_kind_penalized_once() {
        let policy = ScoringPolicy::default();
        let score = evaluate_security(Some(&report(&["Mutable Metadata", "mutable metadata"])), &policy);
        assert_eq!(*score.value(), 30);
    }

    #[test]
    fn test_floor_at_zero() {
        let policy = ScoringPolicy {
            mint_authority_penalty: 60,
            ..ScoringPolicy::default()
        };
        let score = evaluate_security(Some(&report(&["Mint Authority Enabled"])), &policy);
        assert_eq!(*score.value(), 0);
    }

    #[test]
    fn test_unrecognized_and_negated_findings() {
        assert_eq!(FindingKind::classify("Immutable metadata"), None);
        assert_eq!(FindingKind::classify("Mint authority revoked"), None);
        assert_eq!(FindingKind::classify("Low Liquidity"), None);
        assert_eq!(FindingKind::classify("Freeze Authority Enabled"), None);

        let policy = ScoringPolicy::default();
        let score = evaluate_security(Some(&report(&["Low Liquidity", "Copycat token"])), &policy);
        assert_eq!(score, Signal::Measured(40));
    }
}
