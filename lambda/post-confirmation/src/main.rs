use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use user_events_shared::{
    SNSService, TriggerSource, UserEvent, UserEventError, UserEventResult,
};

/// Resolve the outcome tag for a confirmation event. The email attribute is
/// required even though only the tag is returned, so a malformed event fails
/// the invocation instead of publishing a half-empty notification.
fn resolve_result(payload: &Value) -> UserEventResult<&'static str> {
    payload
        .pointer("/request/userAttributes/email")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            UserEventError::MissingField("request.userAttributes.email".to_string())
        })?;

    let trigger_source = payload
        .get("triggerSource")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok(TriggerSource::from(trigger_source)
        .result_tag()
        .unwrap_or("UNKNOWN"))
}

async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();

    let trigger_source = payload
        .get("triggerSource")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let client_id = payload
        .pointer("/callerContext/clientId")
        .and_then(Value::as_str)
        .unwrap_or_default();

    info!(
        "Request: start - request_id: {}, client_id: {}, trigger_source: {}",
        context.request_id, client_id, trigger_source
    );
    info!("Processing: {}", trigger_source);

    // The user event is published whether the handler succeeds or not, and
    // delivery problems never fail the confirmation itself.
    match resolve_result(&payload) {
        Ok(result) => {
            let user_event = UserEvent::tagged(&trigger_source, result, payload.clone());
            publish_best_effort(&user_event).await;
            info!("Request: end");
            Ok(payload)
        }
        Err(e) => {
            error!("Unexpected exception: {}", e);
            let user_event = UserEvent::tagged(&trigger_source, "ERROR", payload.clone());
            publish_best_effort(&user_event).await;
            info!("Request: end");
            Err(e.into())
        }
    }
}

async fn publish_best_effort(user_event: &UserEvent) {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let sns_client = aws_sdk_sns::Client::new(&config);

    match SNSService::from_env(sns_client) {
        Ok(publisher) => publisher.publish_best_effort(user_event).await,
        Err(e) => error!("Failed to initialize user event publisher: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing, verbosity comes from LOG_LEVEL
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    run(service_fn(function_handler)).await
}
