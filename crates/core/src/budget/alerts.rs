//! Alert thresholds.

use rust_decimal::Decimal;
use tripbudget_shared::AlertConfig;

use super::status::{Alert, AlertLevel, AlertScope, utilization};

/// Thresholds that turn utilization into alerts.
///
/// Every bound is exclusive: utilization must be strictly above a bound to
/// reach its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    /// Above this, `exceeded`.
    pub exceeded_above: Decimal,
    /// Above this, `warning`.
    pub warning_above: Decimal,
    /// Above this, `info`.
    pub info_above: Decimal,
    /// When false, only the trip total gets `info` alerts.
    pub info_for_all_scopes: bool,
}

impl AlertPolicy {
    /// 100 / 90 / 80, with `info` on every scope.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            exceeded_above: Decimal::ONE_HUNDRED,
            warning_above: Decimal::from(90),
            info_above: Decimal::from(80),
            info_for_all_scopes: true,
        }
    }

    /// Level reached by `percentage` on `scope`, if any.
    #[must_use]
    pub fn level(&self, scope: &AlertScope, percentage: Decimal) -> Option<AlertLevel> {
        if percentage > self.exceeded_above {
            Some(AlertLevel::Exceeded)
        } else if percentage > self.warning_above {
            Some(AlertLevel::Warning)
        } else if percentage > self.info_above && (self.info_for_all_scopes || scope.is_total()) {
            Some(AlertLevel::Info)
        } else {
            None
        }
    }

    /// Evaluates spend against an allocation.
    ///
    /// Scopes without a positive allocation never alert.
    #[must_use]
    pub fn evaluate(&self, scope: AlertScope, spent: Decimal, allocated: Decimal) -> Option<Alert> {
        if allocated <= Decimal::ZERO {
            return None;
        }
        let percentage = utilization(spent, allocated);
        let level = self.level(&scope, percentage)?;
        Some(Alert::new(level, scope, spent, allocated, percentage))
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<&AlertConfig> for AlertPolicy {
    fn from(config: &AlertConfig) -> Self {
        Self {
            exceeded_above: config.exceeded_above,
            warning_above: config.warning_above,
            info_above: config.info_above,
            info_for_all_scopes: config.info_for_all_scopes,
        }
    }
}
