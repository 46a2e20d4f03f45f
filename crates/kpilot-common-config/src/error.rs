// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// No API key in overrides or environment
	#[error("API key not configured: set {0}")]
	MissingApiKey(String),

	/// A `*_FILE` variable pointed at an unreadable file
	#[error("failed to read secret file at {path}: {source}")]
	SecretFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A `*_FILE` variable was set but empty
	#[error("secret file path in {0} is empty")]
	EmptySecretPath(String),

	/// I/O error reading a config file
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
