use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::{Map, Value};

pub const REPORT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Compute,
    Storage,
    Database,
    Network,
    Snapshot,
    Serverless,
}

/// Where the resource lives; serialized as a single `zone`, `region` or
/// `location` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Zone(String),
    Region(String),
    Location(String),
}

/// Most recent sign of use, keyed by what kind of use it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LastActivity {
    LastUsed(DateTime<Utc>),
    LastAttached(DateTime<Utc>),
    LastConnection(DateTime<Utc>),
    LastAccessed(DateTime<Utc>),
    LastInvoked(DateTime<Utc>),
}

impl LastActivity {
    #[cfg(test)]
    pub(crate) fn at(&self) -> DateTime<Utc> {
        match *self {
            LastActivity::LastUsed(t)
            | LastActivity::LastAttached(t)
            | LastActivity::LastConnection(t)
            | LastActivity::LastAccessed(t)
            | LastActivity::LastInvoked(t) => t,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnusedResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(flatten)]
    pub placement: Placement,
    pub status: String,
    #[serde(flatten)]
    pub last_activity: Option<LastActivity>,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_cost: Decimal,
    pub recommendation: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub potential_savings: Decimal,
    pub creation_date: DateTime<Utc>,
    /// Type-specific extras (utilization, sizes, machine types, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl UnusedResource {
    /// Savings above the monthly cost are reported as-is; callers decide
    /// what to do about it.
    pub fn savings_exceed_cost(&self) -> bool {
        self.potential_savings > self.monthly_cost
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WasteSummary {
    pub total_resource_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_monthly_waste: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_potential_savings: Decimal,
    pub currency: &'static str,
    pub generated_at: DateTime<Utc>,
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WasteReport {
    pub unused_resources: Vec<UnusedResource>,
    pub summary: WasteSummary,
}

impl WasteReport {
    pub fn summarize(
        project_id: &str,
        unused_resources: Vec<UnusedResource>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let monthly: Decimal = unused_resources.iter().map(|r| r.monthly_cost).sum();
        let savings: Decimal = unused_resources.iter().map(|r| r.potential_savings).sum();

        let summary = WasteSummary {
            total_resource_count: unused_resources.len(),
            total_monthly_waste: round_currency(monthly),
            total_potential_savings: round_currency(savings),
            currency: REPORT_CURRENCY,
            generated_at,
            project_id: project_id.to_string(),
        };

        Self {
            unused_resources,
            summary,
        }
    }
}

/// Two fractional digits, ties to even.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}
