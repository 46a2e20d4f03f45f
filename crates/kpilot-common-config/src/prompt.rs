// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! System prompt resolution.
//!
//! Precedence, highest first:
//! 1. an explicit runtime override,
//! 2. the `SYSTEM_PROMPT` environment variable,
//! 3. the `system_prompt` key of a TOML file,
//! 4. [`DEFAULT_SYSTEM_PROMPT`].
//!
//! Empty values and any problem with the file (missing, unreadable,
//! malformed, wrong type) fall through to the next level.

use std::fs;
use std::path::{Path, PathBuf};

pub const SYSTEM_PROMPT_ENV: &str = "SYSTEM_PROMPT";

const PROMPT_FILE_NAME: &str = "system_prompt.toml";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful Kubernetes operations assistant. You can help users manage their Kubernetes cluster by:

1. Listing and inspecting resources (pods, deployments, services, namespaces, configmaps, secrets)
2. Creating pods, deployments, services, namespaces, configmaps and secrets
3. Scaling deployments and updating container images or configmap data
4. Getting pod logs for troubleshooting
5. Deleting resources that are no longer needed
6. Getting cluster information

Always provide clear, concise responses using plain text formatting. Avoid special characters or complex markdown.
When showing resource information, use simple tables with basic ASCII characters only.
If an operation could be destructive (like deleting resources), ask for confirmation first.
Never reveal secret values; refer to secrets by name and key only.
Be proactive in suggesting related operations that might be helpful.";

/// Extracts the `system_prompt` string from TOML text.
pub fn prompt_from_toml(contents: &str) -> Option<String> {
	let table: toml::Table = match contents.parse() {
		Ok(table) => table,
		Err(e) => {
			tracing::debug!(error = %e, "ignoring malformed system prompt file");
			return None;
		}
	};
	table
		.get("system_prompt")
		.and_then(|v| v.as_str())
		.filter(|s| !s.trim().is_empty())
		.map(str::to_string)
}

/// Picks the prompt from already-gathered sources.
pub fn resolve_system_prompt(
	explicit: Option<&str>,
	env_value: Option<&str>,
	file_contents: Option<&str>,
) -> String {
	let non_empty = |s: &&str| !s.trim().is_empty();

	if let Some(prompt) = explicit.filter(non_empty) {
		tracing::debug!(source = "override", "resolved system prompt");
		return prompt.to_string();
	}
	if let Some(prompt) = env_value.filter(non_empty) {
		tracing::debug!(source = "env", "resolved system prompt");
		return prompt.to_string();
	}
	if let Some(prompt) = file_contents.and_then(prompt_from_toml) {
		tracing::debug!(source = "file", "resolved system prompt");
		return prompt;
	}
	tracing::debug!(source = "default", "resolved system prompt");
	DEFAULT_SYSTEM_PROMPT.to_string()
}

/// Reads a prompt file, treating any I/O failure as absence.
pub fn read_prompt_file(path: &Path) -> Option<String> {
	match fs::read_to_string(path) {
		Ok(contents) => Some(contents),
		Err(e) => {
			tracing::debug!(path = %path.display(), error = %e, "system prompt file not read");
			None
		}
	}
}

/// Resolves the prompt from the process environment and `path`.
pub fn load_system_prompt(path: &Path) -> String {
	let env_value = std::env::var(SYSTEM_PROMPT_ENV).ok();
	let file_contents = read_prompt_file(path);
	resolve_system_prompt(None, env_value.as_deref(), file_contents.as_deref())
}

/// `./system_prompt.toml` when present, otherwise the per-user config copy.
pub fn default_prompt_path() -> PathBuf {
	let local = PathBuf::from(PROMPT_FILE_NAME);
	if local.exists() {
		return local;
	}
	dirs::config_dir()
		.map(|dir| dir.join("kpilot").join(PROMPT_FILE_NAME))
		.unwrap_or(local)
}

#[cfg(test)]
mod tests {
	use super::*;

	const TOML_PROMPT: &str = "system_prompt = \"\"\"From TOML\"\"\"";

	#[test]
	fn explicit_override_wins() {
		let prompt = resolve_system_prompt(Some("From CLI"), Some("From ENV"), Some(TOML_PROMPT));
		assert_eq!(prompt, "From CLI");
	}

	#[test]
	fn env_beats_file() {
		let prompt = resolve_system_prompt(None, Some("From ENV"), Some(TOML_PROMPT));
		assert_eq!(prompt, "From ENV");
	}

	#[test]
	fn env_is_used_verbatim() {
		let prompt = resolve_system_prompt(None, Some("  spaced\nprompt  "), None);
		assert_eq!(prompt, "  spaced\nprompt  ");
	}

	#[test]
	fn file_used_when_no_env() {
		assert_eq!(resolve_system_prompt(None, None, Some(TOML_PROMPT)), "From TOML");
	}

	#[test]
	fn multiline_triple_quoted_value() {
		let contents = "title = \"x\"\nsystem_prompt = \"\"\"\nline one\nline two\"\"\"\n";
		assert_eq!(prompt_from_toml(contents).as_deref(), Some("line one\nline two"));
	}

	#[test]
	fn default_when_file_missing_or_malformed() {
		assert_eq!(resolve_system_prompt(None, None, None), DEFAULT_SYSTEM_PROMPT);
		assert_eq!(
			resolve_system_prompt(None, None, Some("system_prompt = \"\"\"unterminated")),
			DEFAULT_SYSTEM_PROMPT
		);
		assert_eq!(
			resolve_system_prompt(None, None, Some("system_prompt = 42")),
			DEFAULT_SYSTEM_PROMPT
		);
		assert_eq!(
			resolve_system_prompt(None, None, Some("other = \"value\"")),
			DEFAULT_SYSTEM_PROMPT
		);
	}

	#[test]
	fn empty_values_fall_through() {
		assert_eq!(
			resolve_system_prompt(Some(""), Some("   "), Some(TOML_PROMPT)),
			"From TOML"
		);
		assert_eq!(
			resolve_system_prompt(None, None, Some("system_prompt = \"\"")),
			DEFAULT_SYSTEM_PROMPT
		);
	}

	#[test]
	fn read_prompt_file_missing_is_none() {
		let dir = tempfile::tempdir().unwrap();
		assert!(read_prompt_file(&dir.path().join("missing.toml")).is_none());
	}

	#[test]
	fn read_prompt_file_from_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("system_prompt.toml");
		fs::write(&path, TOML_PROMPT).unwrap();

		let contents = read_prompt_file(&path);
		assert_eq!(
			resolve_system_prompt(None, None, contents.as_deref()),
			"From TOML"
		);
	}
}
