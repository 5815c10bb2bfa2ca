use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cognito lifecycle trigger that fired the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    AdminCreateUser,
    ConfirmSignUp,
    ConfirmForgotPassword,
    PreAuthentication,
    PostAuthentication,
    Other,
}

impl From<&str> for TriggerSource {
    fn from(value: &str) -> Self {
        match value {
            "PreSignUp_AdminCreateUser" => TriggerSource::AdminCreateUser,
            "PostConfirmation_ConfirmSignUp" => TriggerSource::ConfirmSignUp,
            "PostConfirmation_ConfirmForgotPassword" => TriggerSource::ConfirmForgotPassword,
            "PreAuthentication_Authentication" => TriggerSource::PreAuthentication,
            "PostAuthentication_Authentication" => TriggerSource::PostAuthentication,
            _ => TriggerSource::Other,
        }
    }
}

impl TriggerSource {
    /// Admin calls are made during user migration and bypass domain checks.
    pub fn is_admin_call(&self) -> bool {
        matches!(self, TriggerSource::AdminCreateUser)
    }

    /// Outcome tag published for this trigger, if one is defined.
    pub fn result_tag(&self) -> Option<&'static str> {
        match self {
            TriggerSource::ConfirmSignUp => Some("CONFIRM_SIGNUP_SUCCESS"),
            TriggerSource::ConfirmForgotPassword => Some("CONFIRM_FORGOT_PASSWORD_SUCCESS"),
            TriggerSource::PreAuthentication => Some("PRE_SIGNIN_SUCCESS"),
            TriggerSource::PostAuthentication => Some("POST_SIGNIN_SUCCESS"),
            _ => None,
        }
    }
}

/// Per-invocation view of a sign-up request. Built from the inbound event,
/// consumed by the validator, discarded when the handler returns.
#[derive(Debug, Clone)]
pub struct SignupContext {
    pub email: String,
    pub trigger_source: TriggerSource,
    pub is_admin_call: bool,
}

impl SignupContext {
    pub fn new(email: String, trigger_source: TriggerSource) -> Self {
        let is_admin_call = trigger_source.is_admin_call();
        Self {
            email,
            trigger_source,
            is_admin_call,
        }
    }
}

/// User event published to SNS: a copy of the inbound event tagged with the
/// trigger source and the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub result: String,
    #[serde(flatten)]
    pub detail: Value,
}

impl UserEvent {
    pub fn tagged(trigger_source: &str, result: &str, detail: Value) -> Self {
        Self {
            event_type: trigger_source.to_string(),
            result: result.to_string(),
            detail,
        }
    }

    /// SNS subject line, `<type>.<result>`.
    pub fn subject(&self) -> String {
        format!("{}.{}", self.event_type, self.result)
    }
}

/// CloudFormation custom resource request for the user pool domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    pub resource_properties: DomainResourceProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<DomainResourceProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainResourceProperties {
    pub user_pool_id: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain_config: Option<CustomDomainConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomDomainConfig {
    pub certificate_arn: String,
}

/// Terminal status reported back to CloudFormation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CfnStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Body of the PUT to the pre-signed response URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnResponseBody {
    pub status: CfnStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_source_mapping() {
        assert_eq!(
            TriggerSource::from("PreSignUp_AdminCreateUser"),
            TriggerSource::AdminCreateUser
        );
        assert_eq!(
            TriggerSource::from("PostConfirmation_ConfirmSignUp"),
            TriggerSource::ConfirmSignUp
        );
        assert_eq!(
            TriggerSource::from("PreAuthentication_Authentication"),
            TriggerSource::PreAuthentication
        );
        assert_eq!(TriggerSource::from("PreSignUp_SignUp"), TriggerSource::Other);
    }

    #[test]
    fn test_admin_call_derivation() {
        let context = SignupContext::new(
            "user@example.com".to_string(),
            TriggerSource::AdminCreateUser,
        );
        assert!(context.is_admin_call);

        let context = SignupContext::new("user@example.com".to_string(), TriggerSource::Other);
        assert!(!context.is_admin_call);
    }

    #[test]
    fn test_result_tags() {
        assert_eq!(
            TriggerSource::ConfirmSignUp.result_tag(),
            Some("CONFIRM_SIGNUP_SUCCESS")
        );
        assert_eq!(
            TriggerSource::PostAuthentication.result_tag(),
            Some("POST_SIGNIN_SUCCESS")
        );
        assert_eq!(TriggerSource::AdminCreateUser.result_tag(), None);
    }

    #[test]
    fn test_user_event_subject_and_shape() {
        let event = UserEvent::tagged(
            "PostConfirmation_ConfirmSignUp",
            "CONFIRM_SIGNUP_SUCCESS",
            json!({"triggerSource": "PostConfirmation_ConfirmSignUp"}),
        );
        assert_eq!(
            event.subject(),
            "PostConfirmation_ConfirmSignUp.CONFIRM_SIGNUP_SUCCESS"
        );

        let serialized = serde_json::to_value(&event).unwrap();
        assert_eq!(serialized["type"], "PostConfirmation_ConfirmSignUp");
        assert_eq!(serialized["result"], "CONFIRM_SIGNUP_SUCCESS");
        assert_eq!(serialized["triggerSource"], "PostConfirmation_ConfirmSignUp");
    }

    #[test]
    fn test_custom_resource_event_deserialization() {
        let raw = json!({
            "RequestType": "Create",
            "ResponseURL": "https://cloudformation-custom-resource-response.example.com/cb",
            "StackId": "arn:aws:cloudformation:eu-west-1:123456789012:stack/auth/guid",
            "RequestId": "unique-id",
            "LogicalResourceId": "UserPoolDomain",
            "ResourceProperties": {
                "UserPoolId": "eu-west-1_ABC123",
                "Domain": "auth.example.com",
                "CustomDomainConfig": {
                    "CertificateArn": "arn:aws:acm:us-east-1:123456789012:certificate/abc"
                }
            }
        });

        let event: CustomResourceEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.request_type, "Create");
        assert_eq!(event.resource_properties.domain, "auth.example.com");
        assert!(event.old_resource_properties.is_none());
        let config = event.resource_properties.custom_domain_config.unwrap();
        assert!(config.certificate_arn.starts_with("arn:aws:acm:"));
    }

    #[test]
    fn test_cfn_response_body_wire_format() {
        let body = CfnResponseBody {
            status: CfnStatus::Success,
            reason: "See the details in CloudWatch Log Stream: stream".to_string(),
            physical_resource_id: "stream".to_string(),
            stack_id: "stack".to_string(),
            request_id: "request".to_string(),
            logical_resource_id: "UserPoolDomain".to_string(),
            no_echo: false,
            data: json!({"Data": "Created"}),
        };

        let serialized = serde_json::to_value(&body).unwrap();
        assert_eq!(serialized["Status"], "SUCCESS");
        assert_eq!(serialized["PhysicalResourceId"], "stream");
        assert_eq!(serialized["NoEcho"], false);
        assert_eq!(serialized["Data"]["Data"], "Created");
    }
}
