use serde_json::Value;

use crate::{CfnResponseBody, CfnStatus, CustomResourceEvent};

/// Delivers the terminal SUCCESS/FAILED callback to CloudFormation.
///
/// The response URL is an S3 pre-signed URL; the PUT must carry an empty
/// content type or S3 rejects the signature.
pub struct CfnResponseService {
    client: reqwest::Client,
}

impl Default for CfnResponseService {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl CfnResponseService {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send the callback. Transport failures are logged and swallowed: the
    /// caller has already decided the invocation outcome and a failed PUT
    /// must not change it.
    pub async fn send(
        &self,
        event: &CustomResourceEvent,
        status: CfnStatus,
        data: Value,
        physical_resource_id: Option<String>,
        log_stream_name: &str,
    ) {
        let body = CfnResponseBody {
            status,
            reason: format!(
                "See the details in CloudWatch Log Stream: {}",
                log_stream_name
            ),
            physical_resource_id: physical_resource_id
                .unwrap_or_else(|| log_stream_name.to_string()),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        };

        let response_body = match serde_json::to_string(&body) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::error!("Failed to serialize CloudFormation response: {}", e);
                return;
            }
        };

        tracing::info!("Response body: {}", response_body);

        let result = self
            .client
            .put(&event.response_url)
            .header("content-type", "")
            .header("content-length", response_body.len())
            .body(response_body)
            .send()
            .await;

        match result {
            Ok(response) => {
                tracing::info!("CloudFormation response status: {}", response.status());
            }
            Err(e) => {
                tracing::error!("Failed to PUT CloudFormation response: {}", e);
            }
        }
    }
}
