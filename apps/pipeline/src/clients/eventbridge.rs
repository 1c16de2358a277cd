use async_trait::async_trait;
use aws_sdk_eventbridge::error::DisplayErrorContext;
use aws_sdk_eventbridge::types::{RuleState, Target};
use aws_sdk_eventbridge::Client;
use thiserror::Error;
use tracing::debug;

use super::EmailScheduler;
use crate::intake::schedule::ScheduleEntry;
use crate::models::events::InvocationEvent;

/// Single target per rule.
const TARGET_ID: &str = "1";

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to encode schedule input: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to create rule {rule}: {message}")]
    PutRule { rule: String, message: String },

    #[error("failed to attach target to rule {rule}: {message}")]
    PutTargets { rule: String, message: String },

    #[error("failed to remove rule {rule}: {message}")]
    Remove { rule: String, message: String },
}

/// Registers one-time cron rules on the default event bus.
#[derive(Clone)]
pub struct EventBridgeScheduler {
    client: Client,
}

impl EventBridgeScheduler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmailScheduler for EventBridgeScheduler {
    async fn register(
        &self,
        entry: &ScheduleEntry,
        target_arn: &str,
        input: &InvocationEvent,
    ) -> Result<(), SchedulerError> {
        let expression = entry.cron_expression();
        self.client
            .put_rule()
            .name(&entry.id)
            .schedule_expression(&expression)
            .state(RuleState::Enabled)
            .send()
            .await
            .map_err(|e| SchedulerError::PutRule {
                rule: entry.id.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let target = Target::builder()
            .id(TARGET_ID)
            .arn(target_arn)
            .input(serde_json::to_string(input)?)
            .build()
            .map_err(|e| SchedulerError::PutTargets {
                rule: entry.id.clone(),
                message: e.to_string(),
            })?;

        let output = self
            .client
            .put_targets()
            .rule(&entry.id)
            .targets(target)
            .send()
            .await
            .map_err(|e| SchedulerError::PutTargets {
                rule: entry.id.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        if !output.failed_entries().is_empty() {
            return Err(SchedulerError::PutTargets {
                rule: entry.id.clone(),
                message: format!("{:?}", output.failed_entries()),
            });
        }

        debug!("Registered rule {} with {expression}", entry.id);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), SchedulerError> {
        let remove_error = |message: String| SchedulerError::Remove {
            rule: id.to_string(),
            message,
        };

        // A rule cannot be deleted while it still has targets.
        self.client
            .remove_targets()
            .rule(id)
            .ids(TARGET_ID)
            .send()
            .await
            .map_err(|e| remove_error(DisplayErrorContext(&e).to_string()))?;
        self.client
            .delete_rule()
            .name(id)
            .send()
            .await
            .map_err(|e| remove_error(DisplayErrorContext(&e).to_string()))?;

        debug!("Removed rule {id}");
        Ok(())
    }
}
