use crate::validation::RejectionReason;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserEventError {
    #[error("Email must be lowercase")]
    EmailNotLowercase,

    #[error("Email address is invalid")]
    EmailSyntaxInvalid,

    #[error("Email domain is disposable")]
    DisposableEmailDomain,

    #[error("Missing event field: {0}")]
    MissingField(String),

    #[error("SNS error: {0}")]
    SNSError(String),

    #[error("Cognito error: {0}")]
    CognitoError(String),

    #[error("Secrets Manager error: {0}")]
    SecretsManagerError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<RejectionReason> for UserEventError {
    fn from(reason: RejectionReason) -> Self {
        match reason {
            RejectionReason::NotLowercase => UserEventError::EmailNotLowercase,
            RejectionReason::SyntaxInvalid => UserEventError::EmailSyntaxInvalid,
            RejectionReason::DisposableDomain => UserEventError::DisposableEmailDomain,
        }
    }
}

impl From<serde_json::Error> for UserEventError {
    fn from(err: serde_json::Error) -> Self {
        UserEventError::SerializationError(err.to_string())
    }
}

pub type UserEventResult<T> = Result<T, UserEventError>;
