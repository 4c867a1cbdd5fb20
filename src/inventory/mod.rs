pub mod fixture;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use models::{UnusedResource, WasteReport};

/// Source of idle, cost-bearing resources for a project.
#[async_trait]
pub trait ResourceInventory: Send + Sync {
    async fn list_unused_resources(
        &self,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<UnusedResource>>;
}

/// Builds waste reports from a [`ResourceInventory`].
#[derive(Clone)]
pub struct WasteReporter {
    inventory: Arc<dyn ResourceInventory>,
}

impl WasteReporter {
    pub fn new(inventory: Arc<dyn ResourceInventory>) -> Self {
        Self { inventory }
    }

    pub async fn report(&self, project_id: Option<&str>) -> Result<WasteReport, AppError> {
        let project_id = match project_id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(AppError::MissingProjectId),
        };

        let now = Utc::now();
        let resources = self.inventory.list_unused_resources(project_id, now).await?;

        for r in resources.iter().filter(|r| r.savings_exceed_cost()) {
            tracing::warn!(
                resource_id = %r.id,
                monthly_cost = %r.monthly_cost,
                potential_savings = %r.potential_savings,
                "potential savings exceed monthly cost"
            );
        }

        let report = WasteReport::summarize(project_id, resources, now);
        tracing::debug!(
            project_id,
            count = report.summary.total_resource_count,
            total_monthly_waste = %report.summary.total_monthly_waste,
            "waste report generated"
        );
        Ok(report)
    }
}
