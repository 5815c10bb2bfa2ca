use aws_sdk_sns::Client as SnsClient;
use serde_json::json;

use crate::{UserEvent, UserEventError, UserEventResult};

/// Publishes user events to an SNS topic to decouple events from processing.
///
/// Publishing is gated by the `PUBLISH_USER_EVENTS` flag and must never fail
/// the handler that triggered it; use [`publish_best_effort`] from handlers.
///
/// [`publish_best_effort`]: SNSService::publish_best_effort
pub struct SNSService {
    client: SnsClient,
    topic_arn: Option<String>,
    enabled: bool,
}

impl SNSService {
    pub fn new(client: SnsClient, topic_arn: Option<String>, enabled: bool) -> Self {
        Self {
            client,
            topic_arn,
            enabled,
        }
    }

    /// Read `PUBLISH_USER_EVENTS` and `USER_EVENT_TOPIC` from the Lambda
    /// environment. The topic is only required when publishing is enabled.
    pub fn from_env(client: SnsClient) -> UserEventResult<Self> {
        let enabled = std::env::var("PUBLISH_USER_EVENTS")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let topic_arn = std::env::var("USER_EVENT_TOPIC").ok();
        if enabled && topic_arn.is_none() {
            return Err(UserEventError::ConfigurationError(
                "USER_EVENT_TOPIC not set".to_string(),
            ));
        }

        Ok(Self {
            client,
            topic_arn,
            enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wrap the event in the SNS json message structure, where `default` is
    /// the payload delivered to subscribers without a protocol-specific entry.
    pub fn envelope(event: &UserEvent) -> UserEventResult<String> {
        let message = json!({ "default": serde_json::to_string(event)? });
        Ok(message.to_string())
    }

    /// Publish a user event. No-op when publishing is disabled.
    pub async fn publish_user_event(&self, event: &UserEvent) -> UserEventResult<()> {
        if !self.enabled {
            tracing::debug!("User event publishing disabled, skipping {}", event.subject());
            return Ok(());
        }

        let topic_arn = self.topic_arn.as_deref().ok_or_else(|| {
            UserEventError::ConfigurationError("USER_EVENT_TOPIC not set".to_string())
        })?;

        let message = Self::envelope(event)?;

        self.client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .message_structure("json")
            .subject(event.subject())
            .send()
            .await
            .map_err(|e| UserEventError::SNSError(e.to_string()))?;

        tracing::info!("Published user event: {}", event.subject());
        Ok(())
    }

    /// Publish without propagating failure. Delivery is best-effort: errors
    /// are logged and swallowed so the admission decision is never affected.
    pub async fn publish_best_effort(&self, event: &UserEvent) {
        if let Err(e) = self.publish_user_event(event).await {
            tracing::error!("Failed to publish user event {}: {}", event.subject(), e);
        }
    }
}
