use aws_sdk_secretsmanager::Client as SecretsClient;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{UserEventError, UserEventResult};

// CloudFormation does not resolve dynamic references in custom resource
// properties, so the literal reference string reaches the handler and has to
// be resolved here.
static SECRET_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{\{resolve:secretsmanager:(.+):SecretString:([a-zA-Z0-9_:-]+)\}\}$")
        .expect("secret reference pattern is valid")
});

/// Parsed `{{resolve:secretsmanager:...}}` dynamic reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    pub secret_id: String,
    pub attribute: String,
    pub version_id: Option<String>,
    pub version_stage: Option<String>,
}

/// Parse a dynamic reference, `None` when the value is a plain string.
pub fn parse_secret_reference(value: &str) -> Option<SecretReference> {
    let captures = SECRET_REFERENCE.captures(value)?;

    let secret_id = captures[1].to_string();
    let mut tail = captures[2].split(':');
    let attribute = tail.next()?.to_string();
    let version_id = tail.next().map(str::to_string);
    let version_stage = tail.next().map(str::to_string);

    Some(SecretReference {
        secret_id,
        attribute,
        version_id,
        version_stage,
    })
}

/// Resolves Secrets Manager references in resource properties.
pub struct SecretsService {
    client: SecretsClient,
}

impl SecretsService {
    pub fn new(client: SecretsClient) -> Self {
        Self { client }
    }

    /// Resolve a certificate ARN property. Plain values pass through
    /// untouched; reference values are looked up in Secrets Manager and the
    /// named attribute is plucked from the JSON secret string.
    pub async fn resolve_certificate_arn(&self, value: &str) -> UserEventResult<String> {
        let Some(reference) = parse_secret_reference(value) else {
            return Ok(value.to_string());
        };

        let response = self
            .client
            .get_secret_value()
            .secret_id(&reference.secret_id)
            .set_version_id(reference.version_id.clone())
            .set_version_stage(reference.version_stage.clone())
            .send()
            .await
            .map_err(|e| UserEventError::SecretsManagerError(e.to_string()))?;

        let secret_string = response.secret_string().ok_or_else(|| {
            UserEventError::SecretsManagerError(format!(
                "Secret {} has no SecretString",
                reference.secret_id
            ))
        })?;

        let secret: serde_json::Value = serde_json::from_str(secret_string)?;
        let attribute_value = secret
            .get(&reference.attribute)
            .and_then(|value| value.as_str())
            .ok_or_else(|| {
                UserEventError::SecretsManagerError(format!(
                    "Attribute {} not found in secret {}",
                    reference.attribute, reference.secret_id
                ))
            })?;

        // Never log the full secret value
        tracing::info!(
            "Replacing certificate arn with SecretString value: ...{}",
            tail_chars(attribute_value, 5)
        );

        Ok(attribute_value.to_string())
    }
}

fn tail_chars(value: &str, count: usize) -> String {
    let total = value.chars().count();
    value.chars().skip(total.saturating_sub(count)).collect()
}
