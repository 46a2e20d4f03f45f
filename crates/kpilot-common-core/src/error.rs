// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors that can occur while talking to the model backend.
#[derive(Clone, Error, Debug)]
pub enum LlmError {
	#[error("HTTP error: {0}")]
	Http(String),

	#[error("API error: {0}")]
	Api(String),

	#[error("Request timed out")]
	Timeout,

	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Errors raised while validating or running a cluster operation.
///
/// These never cross the executor boundary as errors; the executor turns
/// each one into a failed result envelope using its `Display` text.
#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum ToolError {
	#[error("unknown tool: {0}")]
	NotFound(String),

	#[error("missing required argument: {0}")]
	MissingArgument(String),

	#[error("invalid argument '{name}': expected {expected}")]
	InvalidArgument { name: String, expected: String },

	#[error("invalid arguments: {0}")]
	InvalidArguments(String),

	#[error("container not found: {container} in {kind} {name}")]
	ContainerNotFound {
		kind: String,
		name: String,
		container: String,
	},

	#[error("duplicate operation name: {0}")]
	DuplicateOperation(String),

	#[error("{0}")]
	Backend(String),

	#[error("Internal error: {0}")]
	Internal(String),
}
