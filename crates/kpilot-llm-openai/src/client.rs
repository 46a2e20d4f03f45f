// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use kpilot_common_core::{LlmClient, LlmError, LlmRequest, LlmResponse};
use reqwest::Client;
use tracing::{debug, error, info, instrument, trace};

use crate::types::{OpenAIConfig, OpenAIError, OpenAIRequest, OpenAIResponse};

const USER_AGENT: &str = concat!("kpilot/", env!("CARGO_PKG_VERSION"));

/// Client for OpenAI-compatible chat completion endpoints (Groq, OpenAI,
/// local gateways).
#[derive(Debug, Clone)]
pub struct OpenAIClient {
	config: OpenAIConfig,
	http_client: Client,
}

impl OpenAIClient {
	pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
		let http_client = Client::builder()
			.user_agent(USER_AGENT)
			.build()
			.map_err(|e| LlmError::Http(format!("Failed to create HTTP client: {e}")))?;
		Ok(Self { config, http_client })
	}

	#[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
	async fn send_request(&self, request: &OpenAIRequest) -> Result<String, LlmError> {
		let url = self.config.completions_url();
		debug!(url = %url, tools = request.tools.len(), "Sending chat completion request");

		let response = self
			.http_client
			.post(&url)
			.bearer_auth(self.config.api_key.expose())
			.json(request)
			.send()
			.await
			.map_err(|e| {
				error!(error = %e, "HTTP request failed");
				if e.is_timeout() {
					LlmError::Timeout
				} else {
					LlmError::Http(e.to_string())
				}
			})?;

		let status = response.status();
		debug!(status = %status, "Received response");

		let body = response.text().await.map_err(|e| {
			error!(error = %e, "Failed to read response body");
			LlmError::Http(e.to_string())
		})?;

		if !status.is_success() {
			let message = match serde_json::from_str::<OpenAIError>(&body) {
				Ok(api_error) => api_error.error.message,
				Err(_) if body.trim().is_empty() => format!("status {status}"),
				Err(_) => body,
			};
			error!(status = %status, body = %message, "API error response");
			return Err(LlmError::Api(message));
		}

		trace!(body = %body, "Response body");
		Ok(body)
	}
}

#[async_trait]
impl LlmClient for OpenAIClient {
	#[instrument(skip(self, request), fields(model = %request.model))]
	async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
		let wire_request = OpenAIRequest::from(&request);
		let body = self.send_request(&wire_request).await?;

		let wire_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
			error!(error = %e, "Failed to parse response");
			LlmError::InvalidResponse(format!("Failed to parse response: {e}"))
		})?;

		let response = LlmResponse::try_from(wire_response)?;
		info!(
			finish_reason = ?response.finish_reason,
			tool_calls = response.tool_calls.len(),
			"Completion request finished"
		);
		Ok(response)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use kpilot_common_config::SecretString;
	use kpilot_common_core::{Message, ToolDefinition};
	use serde_json::{json, Value};
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpListener;
	use tokio::task::JoinHandle;

	/// Serves one canned HTTP response and hands back the request it saw.
	async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let handle = tokio::spawn(async move {
			let (mut socket, _) = listener.accept().await.unwrap();
			let mut buf = Vec::new();
			let mut chunk = [0u8; 4096];
			let header_end = loop {
				let n = socket.read(&mut chunk).await.unwrap();
				buf.extend_from_slice(&chunk[..n]);
				if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
					break pos + 4;
				}
			};
			let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
			let content_length = headers
				.lines()
				.find_map(|l| l.strip_prefix("content-length:"))
				.and_then(|v| v.trim().parse::<usize>().ok())
				.unwrap_or(0);
			while buf.len() < header_end + content_length {
				let n = socket.read(&mut chunk).await.unwrap();
				buf.extend_from_slice(&chunk[..n]);
			}
			let response = format!(
				"HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
				body.len()
			);
			socket.write_all(response.as_bytes()).await.unwrap();
			socket.shutdown().await.unwrap();
			String::from_utf8_lossy(&buf).to_string()
		});
		(format!("http://{addr}/v1"), handle)
	}

	fn client_for(base_url: String) -> OpenAIClient {
		OpenAIClient::new(OpenAIConfig::new(SecretString::new("test-key")).with_base_url(base_url)).unwrap()
	}

	#[test]
	fn client_creation() {
		assert!(OpenAIClient::new(OpenAIConfig::new(SecretString::new("k"))).is_ok());
	}

	#[tokio::test]
	async fn complete_posts_to_chat_completions() {
		let body = json!({
			"choices": [{"message": {"role": "assistant", "content": "2 pods running"}, "finish_reason": "stop"}]
		})
		.to_string();
		let (base_url, server) = serve_once("200 OK", body).await;

		let request = LlmRequest::new("openai/gpt-oss-120b")
			.with_messages(vec![Message::user("how many pods?")])
			.with_tools(vec![ToolDefinition::new("list_pods", "List pods", json!({"type": "object"}))]);
		let response = client_for(base_url).complete(request).await.unwrap();
		assert_eq!(response.message.content, "2 pods running");
		assert!(!response.has_tool_calls());

		let raw = server.await.unwrap();
		assert!(raw.starts_with("POST /v1/chat/completions"));
		assert!(raw.to_lowercase().contains("authorization: bearer test-key"));
		let sent: Value = serde_json::from_str(raw.split("\r\n\r\n").nth(1).unwrap()).unwrap();
		assert_eq!(sent["model"], "openai/gpt-oss-120b");
		assert_eq!(sent["tool_choice"], "auto");
	}

	#[tokio::test]
	async fn api_errors_surface_their_message() {
		let body = json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}).to_string();
		let (base_url, server) = serve_once("401 Unauthorized", body).await;

		let err = client_for(base_url)
			.complete(LlmRequest::new("m").with_messages(vec![Message::user("hi")]))
			.await
			.unwrap_err();
		server.await.unwrap();

		assert!(matches!(err, LlmError::Api(_)));
		assert_eq!(err.to_string(), "API error: Invalid API Key");
	}

	#[tokio::test]
	async fn unparseable_body_is_invalid_response() {
		let (base_url, server) = serve_once("200 OK", "not json".to_string()).await;
		let err = client_for(base_url)
			.complete(LlmRequest::new("m").with_messages(vec![Message::user("hi")]))
			.await
			.unwrap_err();
		server.await.unwrap();
		assert!(matches!(err, LlmError::InvalidResponse(_)));
	}
}
