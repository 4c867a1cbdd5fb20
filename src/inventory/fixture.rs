use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use super::models::{LastActivity, Placement, ResourceType, UnusedResource};
use super::ResourceInventory;

#[derive(Debug, Clone, Copy)]
enum ActivityKind {
    Used,
    Attached,
    Connection,
    Accessed,
    Invoked,
}

impl ActivityKind {
    fn at(self, ts: DateTime<Utc>) -> LastActivity {
        match self {
            ActivityKind::Used => LastActivity::LastUsed(ts),
            ActivityKind::Attached => LastActivity::LastAttached(ts),
            ActivityKind::Connection => LastActivity::LastConnection(ts),
            ActivityKind::Accessed => LastActivity::LastAccessed(ts),
            ActivityKind::Invoked => LastActivity::LastInvoked(ts),
        }
    }
}

struct Template {
    id: &'static str,
    name: &'static str,
    resource_type: ResourceType,
    placement: Placement,
    status: &'static str,
    /// Amounts in cents.
    monthly_cost: i64,
    daily_cost: i64,
    potential_savings: i64,
    recommendation: &'static str,
    created_days_ago: i64,
    activity: Option<(ActivityKind, i64)>,
    attributes: Value,
}

impl Template {
    fn materialize(self, now: DateTime<Utc>) -> UnusedResource {
        let attributes = match self.attributes {
            Value::Object(map) => map,
            _ => Default::default(),
        };

        UnusedResource {
            id: self.id.to_string(),
            name: self.name.to_string(),
            resource_type: self.resource_type,
            placement: self.placement,
            status: self.status.to_string(),
            last_activity: self
                .activity
                .map(|(kind, days)| kind.at(now - Duration::days(days))),
            monthly_cost: Decimal::new(self.monthly_cost, 2),
            daily_cost: Decimal::new(self.daily_cost, 2),
            recommendation: self.recommendation.to_string(),
            potential_savings: Decimal::new(self.potential_savings, 2),
            creation_date: now - Duration::days(self.created_days_ago),
            attributes,
        }
    }
}

fn templates() -> Vec<Template> {
    vec![
        Template {
            id: "vm-instance-1",
            name: "idle-vm-instance",
            resource_type: ResourceType::Compute,
            placement: Placement::Zone("us-central1-a".into()),
            status: "RUNNING",
            monthly_cost: 7342,
            daily_cost: 243,
            potential_savings: 7342,
            recommendation: "Terminate or downsize",
            created_days_ago: 180,
            activity: Some((ActivityKind::Used, 45)),
            attributes: json!({
                "machine_type": "n1-standard-2",
                "usage_metrics": {
                    "cpu_utilization": "3%",
                    "memory_utilization": "12%",
                    "disk_utilization": "25%"
                }
            }),
        },
        Template {
            id: "persistent-disk-1",
            name: "unused-persistent-disk",
            resource_type: ResourceType::Storage,
            placement: Placement::Zone("us-west1-b".into()),
            status: "READY",
            monthly_cost: 2000,
            daily_cost: 67,
            potential_savings: 2000,
            recommendation: "Delete or resize",
            created_days_ago: 120,
            activity: Some((ActivityKind::Attached, 90)),
            attributes: json!({
                "size_gb": 500,
                "disk_type": "pd-standard",
                "attached_to": "None"
            }),
        },
        Template {
            id: "cloud-sql-1",
            name: "legacy-database",
            resource_type: ResourceType::Database,
            placement: Placement::Region("us-east1".into()),
            status: "RUNNING",
            monthly_cost: 10372,
            daily_cost: 346,
            potential_savings: 7372,
            recommendation: "Downsize or move to serverless",
            created_days_ago: 210,
            activity: Some((ActivityKind::Connection, 30)),
            attributes: json!({
                "instance_type": "db-n1-standard-1",
                "usage_metrics": {
                    "cpu_utilization": "5%",
                    "memory_utilization": "15%",
                    "storage_utilization": "40%",
                    "connections_per_day": 3
                }
            }),
        },
        Template {
            id: "static-ip-1",
            name: "unused-reserved-ip",
            resource_type: ResourceType::Network,
            placement: Placement::Region("europe-west1".into()),
            status: "RESERVED",
            monthly_cost: 730,
            daily_cost: 24,
            potential_savings: 730,
            recommendation: "Release IP address",
            created_days_ago: 160,
            activity: None,
            attributes: json!({
                "in_use": false,
                "attached_to": "None"
            }),
        },
        Template {
            id: "snapshot-1",
            name: "old-system-snapshot",
            resource_type: ResourceType::Snapshot,
            placement: Placement::Location("multi-regional".into()),
            status: "READY",
            monthly_cost: 1000,
            daily_cost: 33,
            potential_savings: 1000,
            recommendation: "Delete old snapshot",
            created_days_ago: 240,
            activity: None,
            attributes: json!({
                "size_gb": 250,
                "source_disk": "deleted-disk-1"
            }),
        },
        Template {
            id: "cloudfunc-1",
            name: "deprecated-function",
            resource_type: ResourceType::Serverless,
            placement: Placement::Region("us-central1".into()),
            status: "ACTIVE",
            monthly_cost: 584,
            daily_cost: 19,
            potential_savings: 584,
            recommendation: "Delete unused function",
            created_days_ago: 150,
            activity: Some((ActivityKind::Invoked, 80)),
            attributes: json!({ "invocations_per_month": 2 }),
        },
        Template {
            id: "gcs-bucket-1",
            name: "old-backup-bucket",
            resource_type: ResourceType::Storage,
            placement: Placement::Location("us-multi-regional".into()),
            status: "ACTIVE",
            monthly_cost: 3000,
            daily_cost: 100,
            potential_savings: 2550,
            recommendation: "Move to cold storage or delete",
            created_days_ago: 300,
            activity: Some((ActivityKind::Accessed, 150)),
            attributes: json!({
                "storage_class": "Standard",
                "size_gb": 1500,
                "object_count": 15420
            }),
        },
        Template {
            id: "loadbalancer-1",
            name: "staging-loadbalancer",
            resource_type: ResourceType::Network,
            placement: Placement::Region("global".into()),
            status: "ACTIVE",
            monthly_cost: 1826,
            daily_cost: 61,
            potential_savings: 1826,
            recommendation: "Delete unused load balancer",
            created_days_ago: 120,
            activity: None,
            attributes: json!({
                "traffic": "minimal",
                "frontend_ips": 1
            }),
        },
    ]
}

/// Fixed sample inventory. Every project gets the same eight records, with
/// timestamps placed relative to the request time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInventory;

#[async_trait]
impl ResourceInventory for FixtureInventory {
    async fn list_unused_resources(
        &self,
        _project_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<UnusedResource>> {
        Ok(templates().into_iter().map(|t| t.materialize(now)).collect())
    }
}
