//! Score Aggregator & Verdict Policy

// Internal imports
use crate::config::ScoringPolicy;
use crate::hype::hype_contribution;
use crate::types::{HypeAssessment, SubscoreSet, Verdict};

/// Verdict theo dải điểm, mỗi dải đóng ở cận dưới
pub fn verdict_from_score(total_score: u32, policy: &ScoringPolicy) -> Verdict {
    if total_score >= policy.buy_now_min {
        Verdict::BuyNow
    } else if total_score >= policy.potential_buy_min {
        Verdict::PotentialBuy
    } else if total_score >= policy.wait_min {
        Verdict::Wait
    } else {
        Verdict::HighRisk
    }
}

/// Verdict cuối: ưu tiên verdict của model, trừ khi model báo ERROR
pub fn final_verdict(ai_verdict: Verdict, total_score: u32, policy: &ScoringPolicy) -> Verdict {
    match ai_verdict {
        Verdict::Error => verdict_from_score(total_score, policy),
        verdict => verdict,
    }
}

/// Bộ điểm đã tổng hợp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub subscores: SubscoreSet,
    pub total_score: u32,
    pub verdict: Verdict,
}

/// Gộp các điểm thành phần (đã cap) và hype thành tổng điểm và verdict
pub fn aggregate(security: u32, activity: u32, trend: u32, hype: &HypeAssessment, policy: &ScoringPolicy) -> Aggregate {
    let subscores = SubscoreSet {
        security: security.min(policy.security_cap),
        activity: activity.min(policy.activity_cap),
        trend: trend.min(policy.trend_cap),
        hype: hype_contribution(hype.hype_score, policy),
    };
    let total_score = subscores.total();

    Aggregate {
        subscores,
        total_score,
        verdict: final_verdict(hype.verdict, total_score, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hype(score: u8, verdict: Verdict) -> HypeAssessment {
        HypeAssessment {
            hype_score: score,
            verdict,
            probability: 50,
            summary: String::new(),
        }
    }

    #[test]
    fn test_band_boundaries() {
        let policy = ScoringPolicy::default();
        assert_eq!(verdict_from_score(100, &policy), Verdict::BuyNow);
        assert_eq!(verdict_from_score(70, &policy), Verdict::BuyNow);
        assert_eq!(verdict_from_score(69, &policy), Verdict::PotentialBuy);
        assert_eq!(verdict_from_score(40, &policy), Verdict::PotentialBuy);
        assert_eq!(verdict_from_score(39, &policy), Verdict::Wait);
        assert_eq!(verdict_from_score(20, &policy), Verdict::Wait);
        assert_eq!(verdict_from_score(19, &policy), Verdict::HighRisk);
        assert_eq!(verdict_from_score(0, &policy), Verdict::HighRisk);
    }

    #[test]
    fn test_ai_verdict_wins_unless_error() {
        let policy = ScoringPolicy::default();
        assert_eq!(final_verdict(Verdict::Hold, 90, &policy), Verdict::Hold);
        assert_eq!(final_verdict(Verdict::HighRisk, 90, &policy), Verdict::HighRisk);
        assert_eq!(final_verdict(Verdict::Error, 45, &policy), Verdict::PotentialBuy);
    }

    #[test]
    fn test_aggregate_end_to_end_numbers() {
        let policy = ScoringPolicy::default();
        let result = aggregate(30, 30, 10, &hype(80, Verdict::BuyNow), &policy);
        assert_eq!(result.subscores.hype, 16);
        assert_eq!(result.total_score, 86);
        assert_eq!(result.total_score, result.subscores.total());
        assert_eq!(result.verdict, Verdict::BuyNow);
    }

    #[test]
    fn test_aggregate_caps_and_fallback() {
        let policy = ScoringPolicy::default();
        let result = aggregate(55, 31, 12, &HypeAssessment::failed(), &policy);
        assert_eq!(
            result.subscores,
            SubscoreSet {
                security: 40,
                activity: 30,
                trend: 10,
                hype: 0
            }
        );
        assert_eq!(result.total_score, 80);
        assert_eq!(result.verdict, Verdict::BuyNow);

        let weak = aggregate(0, 15, 0, &HypeAssessment::failed(), &policy);
        assert_eq!(weak.verdict, Verdict::HighRisk);
    }
}
