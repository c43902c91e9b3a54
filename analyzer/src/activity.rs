//! Activity/Trend Evaluator

// Internal imports
use crate::config::ScoringPolicy;
use crate::types::{Signal, TokenSnapshot};

/// Chi tiết các phần điểm hoạt động
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityBreakdown {
    /// Volume khung ngắn cao bất thường so với khung dài
    pub volume_spike: bool,
    /// Lệnh mua nhiều hơn lệnh bán trong 1h
    pub buy_pressure: bool,
}

impl ActivityBreakdown {
    pub fn from_snapshot(snapshot: &TokenSnapshot, policy: &ScoringPolicy) -> Self {
        Self {
            volume_spike: has_volume_spike(snapshot, policy),
            buy_pressure: snapshot.buy_count_1h.unwrap_or(0) > snapshot.sell_count_1h.unwrap_or(0),
        }
    }

    pub fn score(&self, policy: &ScoringPolicy) -> u32 {
        let mut score = 0;
        if self.volume_spike {
            score += policy.volume_spike_credit;
        }
        if self.buy_pressure {
            score += policy.buy_pressure_credit;
        }
        score.min(policy.activity_cap)
    }
}

/// So volume 1h với trung bình giờ của 24h; không có volume 1h thì so
/// volume 24h với market cap.
fn has_volume_spike(snapshot: &TokenSnapshot, policy: &ScoringPolicy) -> bool {
    match (snapshot.volume_1h, snapshot.volume_24h) {
        (Some(volume_1h), Some(volume_24h)) if volume_24h > 0.0 => {
            volume_1h * 24.0 >= policy.spike_hourly_multiple * volume_24h
        }
        (Some(_), _) => false,
        (None, volume_24h) => match (volume_24h, snapshot.market_cap) {
            (Some(volume_24h), Some(market_cap)) if market_cap > 0.0 => {
                volume_24h >= policy.turnover_ratio * market_cap
            }
            _ => false,
        },
    }
}

/// Điểm hoạt động trong [0, activity_cap]
pub fn evaluate_activity(snapshot: &TokenSnapshot, policy: &ScoringPolicy) -> Signal<u32> {
    let no_data = snapshot.volume_1h.is_none()
        && snapshot.volume_24h.is_none()
        && snapshot.buy_count_1h.is_none()
        && snapshot.sell_count_1h.is_none();
    if no_data {
        return Signal::fallback(0, "no volume or transaction data");
    }

    Signal::Measured(ActivityBreakdown::from_snapshot(snapshot, policy).score(policy))
}

/// Điểm xu hướng trong [0, trend_cap]
///
/// Chỉ cộng điểm khi khung trung bình (6h, thiếu thì 24h) tăng VÀ khung ngắn
/// (5m, thiếu thì 1h) chưa rơi dưới ngưỡng sập giá.
pub fn evaluate_trend(snapshot: &TokenSnapshot, policy: &ScoringPolicy) -> Signal<u32> {
    let Some(medium) = snapshot.price_change_6h.or(snapshot.price_change_24h) else {
        return Signal::fallback(0, "no medium-window price change");
    };
    let short = snapshot.price_change_5m.or(snapshot.price_change_1h);

    let not_crashing = short.map_or(true, |change| change >= policy.crash_threshold_pct);
    if medium > 0.0 && not_crashing {
        Signal::Measured(policy.trend_credit.min(policy.trend_cap))
    } else {
        Signal::Measured(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> TokenSnapshot {
        TokenSnapshot::new("token")
    }

    #[test]
    fn test_buy_pressure_credit() {
        let policy = ScoringPolicy::default();
        let mut s = snapshot();
        s.buy_count_1h = Some(120);
        s.sell_count_1h = Some(40);

        let breakdown = ActivityBreakdown::from_snapshot(&s, &policy);
        assert!(breakdown.buy_pressure);
        assert!(!breakdown.volume_spike);
        assert_eq!(*evaluate_activity(&s, &policy).value(), 15);
    }

    #[test]
    fn test_equal_counts_get_no_credit() {
        let policy = ScoringPolicy::default();
        let mut s = snapshot();
        s.buy_count_1h = Some(40);
        s.sell_count_1h = Some(40);
        assert_eq!(*evaluate_activity(&s, &policy).value(), 0);
    }

    #[test]
    fn test_hourly_volume_spike() {
        let policy = ScoringPolicy::default();
        let mut s = snapshot();
        s.volume_24h = Some(24_000.0);
        // trung bình 1000/giờ, 1h hiện tại 2000 -> đạt ngưỡng x2
        s.volume_1h = Some(2_000.0);
        assert_eq!(*evaluate_activity(&s, &policy).value(), 15);

        s.volume_1h = Some(1_999.0);
        assert_eq!(*evaluate_activity(&s, &policy).value(), 0);
    }

    #[test]
    fn test_turnover_used_without_hourly_volume() {
        let policy = ScoringPolicy::default();
        let mut s = snapshot();
        s.market_cap = Some(500_000.0);
        s.volume_24h = Some(80_000.0);
        s.buy_count_1h = Some(100);
        s.sell_count_1h = Some(40);
        assert_eq!(*evaluate_activity(&s, &policy).value(), 30);

        s.volume_24h = Some(40_000.0);
        assert_eq!(*evaluate_activity(&s, &policy).value(), 15);
    }

    #[test]
    fn test_activity_capped() {
        let policy = ScoringPolicy {
            volume_spike_credit: 25,
            buy_pressure_credit: 25,
            ..ScoringPolicy::default()
        };
        let mut s = snapshot();
        s.volume_24h = Some(100.0);
        s.volume_1h = Some(100.0);
        s.buy_count_1h = Some(2);
        assert_eq!(*evaluate_activity(&s, &policy).value(), 30);
    }

    #[test]
    fn test_activity_without_data_is_fallback() {
        let policy = ScoringPolicy::default();
        let score = evaluate_activity(&snapshot(), &policy);
        assert!(score.is_fallback());
        assert_eq!(*score.value(), 0);
    }

    #[test]
    fn test_trend_requires_both_conditions() {
        let policy = ScoringPolicy::default();
        let mut s = snapshot();
        s.price_change_6h = Some(5.0);
        s.price_change_5m = Some(-25.0);
        assert_eq!(evaluate_trend(&s, &policy), Signal::Measured(0));

        s.price_change_5m = Some(-20.0);
        assert_eq!(evaluate_trend(&s, &policy), Signal::Measured(10));

        s.price_change_6h = Some(-0.1);
        assert_eq!(evaluate_trend(&s, &policy), Signal::Measured(0));
    }

    #[test]
    fn test_trend_window_fallbacks() {
        let policy = ScoringPolicy::default();
        let mut s = snapshot();
        s.price_change_1h = Some(20.0);
        s.price_change_24h = Some(5.0);
        assert_eq!(evaluate_trend(&s, &policy), Signal::Measured(10));

        // 5m được ưu tiên hơn 1h
        s.price_change_5m = Some(-30.0);
        assert_eq!(evaluate_trend(&s, &policy), Signal::Measured(0));
    }

    #[test]
    fn test_trend_without_medium_window() {
        let policy = ScoringPolicy::default();
        let mut s = snapshot();
        s.price_change_1h = Some(12.0);
        let score = evaluate_trend(&s, &policy);
        assert!(score.is_fallback());
        assert_eq!(*score.value(), 0);
    }
}
