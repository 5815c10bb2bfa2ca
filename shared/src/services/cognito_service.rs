use aws_sdk_cognitoidentityprovider::types::CustomDomainConfigType;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;

use crate::{CustomDomainConfig, UserEventError, UserEventResult};

/// Manages the Cognito user pool domain on behalf of the custom resource.
pub struct CognitoDomainService {
    client: CognitoClient,
}

impl CognitoDomainService {
    pub fn new(client: CognitoClient) -> Self {
        Self { client }
    }

    /// Create (or re-create) the user pool domain. Returns the CloudFront
    /// alias when Cognito hands one back for a custom domain.
    pub async fn create_domain(
        &self,
        domain: &str,
        user_pool_id: &str,
        custom_domain_config: Option<&CustomDomainConfig>,
    ) -> UserEventResult<Option<String>> {
        let sdk_config = custom_domain_config
            .map(|config| {
                CustomDomainConfigType::builder()
                    .certificate_arn(&config.certificate_arn)
                    .build()
                    .map_err(|e| UserEventError::CognitoError(e.to_string()))
            })
            .transpose()?;

        let response = self
            .client
            .create_user_pool_domain()
            .domain(domain)
            .user_pool_id(user_pool_id)
            .set_custom_domain_config(sdk_config)
            .send()
            .await
            .map_err(|e| UserEventError::CognitoError(e.to_string()))?;

        if let Some(cloudfront_domain) = response.cloud_front_domain() {
            tracing::info!(
                "Created user pool domain {} with CloudFront alias {}",
                domain,
                cloudfront_domain
            );
        } else {
            tracing::info!("Created user pool domain {}", domain);
        }

        Ok(response.cloud_front_domain().map(str::to_string))
    }

    /// Delete the domain if it exists. Describe first so a missing domain is
    /// not an error, which keeps stack teardown idempotent.
    pub async fn delete_domain(&self, domain: &str) -> UserEventResult<()> {
        let description = self
            .client
            .describe_user_pool_domain()
            .domain(domain)
            .send()
            .await
            .map_err(|e| UserEventError::CognitoError(e.to_string()))?;

        let user_pool_id = description
            .domain_description()
            .and_then(|description| description.user_pool_id())
            .map(str::to_string);

        match user_pool_id {
            Some(user_pool_id) => {
                tracing::info!("Domain exists - deleting: {}", domain);
                self.client
                    .delete_user_pool_domain()
                    .domain(domain)
                    .user_pool_id(user_pool_id)
                    .send()
                    .await
                    .map_err(|e| UserEventError::CognitoError(e.to_string()))?;
            }
            None => {
                tracing::info!("Domain not found, nothing to delete: {}", domain);
            }
        }

        Ok(())
    }
}
