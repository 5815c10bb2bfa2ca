use aws_lambda_events::event::cognito::CognitoEventUserPoolsPreSignup;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use user_events_shared::{
    validate, DisposableDomainSet, SignupContext, TriggerSource, UserEventError,
    ValidationOutcome,
};

async fn function_handler(
    event: LambdaEvent<CognitoEventUserPoolsPreSignup>,
) -> Result<CognitoEventUserPoolsPreSignup, Error> {
    let (payload, context) = event.into_parts();

    let header = &payload.cognito_event_user_pools_header;
    let trigger_source = header.trigger_source.as_deref().unwrap_or_default();
    let client_id = header
        .caller_context
        .client_id
        .as_deref()
        .unwrap_or_default();

    info!(
        "Request: start - request_id: {}, client_id: {}, trigger_source: {}",
        context.request_id, client_id, trigger_source
    );

    let email = payload
        .request
        .user_attributes
        .get("email")
        .ok_or_else(|| {
            UserEventError::MissingField("request.userAttributes.email".to_string())
        })?;

    let signup = SignupContext::new(email.clone(), TriggerSource::from(trigger_source));

    match validate(
        &signup.email,
        signup.is_admin_call,
        DisposableDomainSet::bundled(),
    ) {
        ValidationOutcome::Allowed => {
            info!(
                "Sign-up allowed for {} (admin_call: {})",
                signup.email, signup.is_admin_call
            );
            info!("Request: end");
            Ok(payload)
        }
        ValidationOutcome::Rejected(reason) => {
            let error = UserEventError::from(reason);
            warn!("Sign-up rejected for {}: {}", signup.email, error);
            info!("Request: end");
            Err(error.into())
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;

    fn signup_event(email: &str, trigger_source: &str) -> CognitoEventUserPoolsPreSignup {
        let mut event = CognitoEventUserPoolsPreSignup::default();
        event.cognito_event_user_pools_header.trigger_source = Some(trigger_source.to_string());
        event
            .request
            .user_attributes
            .insert("email".to_string(), email.to_string());
        event
    }

    #[tokio::test]
    async fn test_valid_signup_passes_event_through() {
        let event = LambdaEvent::new(
            signup_event("user@example.com", "PreSignUp_SignUp"),
            Context::default(),
        );

        let response = function_handler(event).await.unwrap();
        assert_eq!(
            response.request.user_attributes.get("email").map(String::as_str),
            Some("user@example.com")
        );
    }

    #[tokio::test]
    async fn test_uppercase_email_is_rejected() {
        let event = LambdaEvent::new(
            signup_event("User@Example.com", "PreSignUp_SignUp"),
            Context::default(),
        );

        let error = function_handler(event).await.unwrap_err();
        assert_eq!(error.to_string(), "Email must be lowercase");
    }

    #[tokio::test]
    async fn test_invalid_syntax_is_rejected() {
        let event = LambdaEvent::new(
            signup_event("not-an-email", "PreSignUp_SignUp"),
            Context::default(),
        );

        let error = function_handler(event).await.unwrap_err();
        assert_eq!(error.to_string(), "Email address is invalid");
    }

    #[tokio::test]
    async fn test_disposable_domain_is_rejected() {
        let event = LambdaEvent::new(
            signup_event("user@mailinator.com", "PreSignUp_SignUp"),
            Context::default(),
        );

        let error = function_handler(event).await.unwrap_err();
        assert_eq!(error.to_string(), "Email domain is disposable");
    }

    #[tokio::test]
    async fn test_admin_create_user_bypasses_domain_check() {
        let event = LambdaEvent::new(
            signup_event("user@mailinator.com", "PreSignUp_AdminCreateUser"),
            Context::default(),
        );

        assert!(function_handler(event).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_email_fails_the_invocation() {
        let mut payload = CognitoEventUserPoolsPreSignup::default();
        payload.cognito_event_user_pools_header.trigger_source =
            Some("PreSignUp_SignUp".to_string());

        let error = function_handler(LambdaEvent::new(payload, Context::default()))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("Missing event field"));
    }
}
