use async_trait::async_trait;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client;
use thiserror::Error;
use tracing::debug;

use super::FunctionInvoker;
use crate::models::events::InvocationEvent;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to encode invocation payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invoke of {function} failed: {message}")]
    Sdk { function: String, message: String },

    #[error("invoke of {function} was not accepted (status {status})")]
    Rejected { function: String, status: i32 },
}

/// Asynchronous (`Event`) Lambda invocations.
#[derive(Clone)]
pub struct LambdaInvoker {
    client: Client,
}

impl LambdaInvoker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionInvoker for LambdaInvoker {
    async fn invoke_async(
        &self,
        function: &str,
        event: &InvocationEvent,
    ) -> Result<(), InvokeError> {
        let payload = serde_json::to_vec(event)?;
        let output = self
            .client
            .invoke()
            .function_name(function)
            .invocation_type(InvocationType::Event)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| InvokeError::Sdk {
                function: function.to_string(),
                message: aws_sdk_lambda::error::DisplayErrorContext(&e).to_string(),
            })?;

        let status = output.status_code();
        if !(200..300).contains(&status) {
            return Err(InvokeError::Rejected {
                function: function.to_string(),
                status,
            });
        }
        debug!("Invoked {function} (status {status})");
        Ok(())
    }
}
