use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use user_events_shared::{
    CfnResponseService, CfnStatus, CognitoDomainService, CustomDomainConfig,
    CustomResourceEvent, DomainResourceProperties, SecretsService, UserEventError,
    UserEventResult,
};

async fn function_handler(event: LambdaEvent<CustomResourceEvent>) -> Result<(), Error> {
    let (payload, context) = event.into_parts();
    let log_stream_name =
        std::env::var("AWS_LAMBDA_LOG_STREAM_NAME").unwrap_or_else(|_| context.request_id.clone());

    info!(
        "Request: start - request_id: {}, request_type: {}, logical_resource_id: {}",
        context.request_id, payload.request_type, payload.logical_resource_id
    );

    let responder = CfnResponseService::default();

    if !matches!(payload.request_type.as_str(), "Create" | "Update" | "Delete") {
        let message = format!("Unexpected request type: {}", payload.request_type);
        error!("{}", message);
        responder
            .send(
                &payload,
                CfnStatus::Failed,
                json!({ "Data": message }),
                payload.physical_resource_id.clone(),
                &log_stream_name,
            )
            .await;
        info!("Request: end");
        return Ok(());
    }

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let cognito = CognitoDomainService::new(aws_sdk_cognitoidentityprovider::Client::new(&config));
    let secrets = SecretsService::new(aws_sdk_secretsmanager::Client::new(&config));

    // Whatever happens below, CloudFormation gets exactly one terminal status.
    match handle_request(&payload, &cognito, &secrets).await {
        Ok(data) => {
            responder
                .send(
                    &payload,
                    CfnStatus::Success,
                    data,
                    payload.physical_resource_id.clone(),
                    &log_stream_name,
                )
                .await;
            info!("UserPoolDomain success for request type {}", payload.request_type);
            info!("Request: end");
            Ok(())
        }
        Err(e) => {
            error!("Unexpected exception: {}", e);
            responder
                .send(
                    &payload,
                    CfnStatus::Failed,
                    json!({ "Data": e.to_string() }),
                    payload.physical_resource_id.clone(),
                    &log_stream_name,
                )
                .await;
            info!("Request: end");
            Err(e.into())
        }
    }
}

async fn handle_request(
    event: &CustomResourceEvent,
    cognito: &CognitoDomainService,
    secrets: &SecretsService,
) -> UserEventResult<Value> {
    let properties = &event.resource_properties;

    match event.request_type.as_str() {
        "Create" => {
            let domain_config = resolved_domain_config(properties, secrets).await?;
            let cloudfront_domain = cognito
                .create_domain(
                    &properties.domain,
                    &properties.user_pool_id,
                    domain_config.as_ref(),
                )
                .await?;
            Ok(provisioning_data("Created", cloudfront_domain))
        }
        "Update" => {
            // A renamed domain has to be deleted before the new name can be
            // claimed; an unchanged name is re-created in place.
            if let Some(old_properties) = &event.old_resource_properties {
                if old_properties.domain != properties.domain {
                    cognito.delete_domain(&old_properties.domain).await?;
                }
            }

            let domain_config = resolved_domain_config(properties, secrets).await?;
            let cloudfront_domain = cognito
                .create_domain(
                    &properties.domain,
                    &properties.user_pool_id,
                    domain_config.as_ref(),
                )
                .await?;
            Ok(provisioning_data("Updated", cloudfront_domain))
        }
        "Delete" => {
            cognito.delete_domain(&properties.domain).await?;
            Ok(provisioning_data("Deleted", None))
        }
        other => Err(UserEventError::InternalError(format!(
            "Unexpected request type: {}",
            other
        ))),
    }
}

/// Resolve the certificate ARN through Secrets Manager when the property
/// carries a dynamic reference.
async fn resolved_domain_config(
    properties: &DomainResourceProperties,
    secrets: &SecretsService,
) -> UserEventResult<Option<CustomDomainConfig>> {
    match &properties.custom_domain_config {
        Some(config) => {
            let certificate_arn = secrets
                .resolve_certificate_arn(&config.certificate_arn)
                .await?;
            Ok(Some(CustomDomainConfig { certificate_arn }))
        }
        None => Ok(None),
    }
}

fn provisioning_data(outcome: &str, cloudfront_domain: Option<String>) -> Value {
    let mut data = json!({ "Data": outcome });
    if let Some(domain) = cloudfront_domain {
        data["CloudFrontDomain"] = json!(domain);
    }
    data
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
