pub mod sns_service;
pub mod cognito_service;
pub mod secrets_service;
pub mod cfn_service;

pub use sns_service::*;
pub use cognito_service::*;
pub use secrets_service::*;
pub use cfn_service::*;
