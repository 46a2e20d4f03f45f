// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Runtime settings for the agent.
//!
//! Gathering inputs ([`EnvSnapshot::capture`], reading the prompt file) is
//! kept apart from deciding between them ([`AgentSettings::resolve`]), so the
//! precedence rules can be tested without touching the process environment.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::env::load_secret_env;
use crate::error::ConfigError;
use crate::prompt::{default_prompt_path, read_prompt_file, resolve_system_prompt, SYSTEM_PROMPT_ENV};
use crate::secret::SecretString;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

const API_KEY_VARS: [&str; 2] = ["GROQ_API_KEY", "OPENAI_API_KEY"];
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
const MODEL_VAR: &str = "MODEL";

/// Values given explicitly at runtime (CLI flags, library callers).
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
	pub api_key: Option<SecretString>,
	pub base_url: Option<String>,
	pub model: Option<String>,
	pub kubeconfig: Option<PathBuf>,
	pub system_prompt: Option<String>,
}

/// The environment variables relevant to kpilot, captured once.
#[derive(Clone, Debug, Default)]
pub struct EnvSnapshot {
	vars: HashMap<String, String>,
	api_key: Option<SecretString>,
}

impl EnvSnapshot {
	/// Reads the process environment. API keys honour the `VAR_FILE`
	/// convention; the first of `GROQ_API_KEY`, `OPENAI_API_KEY` wins.
	pub fn capture() -> Result<Self, ConfigError> {
		let mut api_key = None;
		for var in API_KEY_VARS {
			if let Some(key) = load_secret_env(var)? {
				tracing::debug!(var, "found API key");
				api_key = Some(key);
				break;
			}
		}

		let vars = [BASE_URL_VAR, MODEL_VAR, SYSTEM_PROMPT_ENV]
			.into_iter()
			.filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
			.collect();

		Ok(Self { vars, api_key })
	}

	/// Builds a snapshot from literal pairs. API key variables are recognised.
	pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
		let mut vars: HashMap<String, String> = pairs
			.into_iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		let api_key = API_KEY_VARS
			.iter()
			.find_map(|var| vars.get(*var).cloned())
			.map(SecretString::new);
		vars.retain(|k, _| !API_KEY_VARS.contains(&k.as_str()));
		Self { vars, api_key }
	}

	fn get(&self, name: &str) -> Option<&str> {
		self
			.vars
			.get(name)
			.map(String::as_str)
			.filter(|v| !v.trim().is_empty())
	}
}

/// Fully resolved settings for one agent process.
#[derive(Clone, Debug)]
pub struct AgentSettings {
	pub api_key: SecretString,
	pub base_url: String,
	pub model: String,
	pub kubeconfig: Option<PathBuf>,
	pub system_prompt: String,
}

impl AgentSettings {
	/// Applies explicit > env > file > default for every setting.
	///
	/// `prompt_file` is the raw text of the system prompt TOML file, if one
	/// was read.
	pub fn resolve(
		overrides: &ConfigOverrides,
		env: &EnvSnapshot,
		prompt_file: Option<&str>,
	) -> Result<Self, ConfigError> {
		let api_key = overrides
			.api_key
			.clone()
			.filter(|k| !k.is_empty())
			.or_else(|| env.api_key.clone().filter(|k| !k.is_empty()))
			.ok_or_else(|| ConfigError::MissingApiKey(API_KEY_VARS.join(" or ")))?;

		let base_url = overrides
			.base_url
			.clone()
			.or_else(|| env.get(BASE_URL_VAR).map(str::to_string))
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

		let model = overrides
			.model
			.clone()
			.or_else(|| env.get(MODEL_VAR).map(str::to_string))
			.unwrap_or_else(|| DEFAULT_MODEL.to_string());

		// KUBECONFIG is left to cluster config inference
		let kubeconfig = overrides.kubeconfig.clone();

		let system_prompt = resolve_system_prompt(
			overrides.system_prompt.as_deref(),
			env.get(SYSTEM_PROMPT_ENV),
			prompt_file,
		);

		let settings = Self {
			api_key,
			base_url,
			model,
			kubeconfig,
			system_prompt,
		};
		tracing::debug!(
			base_url = %settings.base_url,
			model = %settings.model,
			kubeconfig = ?settings.kubeconfig,
			api_key = %settings.api_key,
			"resolved agent settings"
		);
		Ok(settings)
	}

	/// Resolves against the live process environment.
	///
	/// An explicitly named prompt file must be readable; the default location
	/// is optional.
	pub fn from_env(overrides: &ConfigOverrides, prompt_file: Option<&Path>) -> Result<Self, ConfigError> {
		let env = EnvSnapshot::capture()?;
		let contents = match prompt_file {
			Some(path) => Some(fs::read_to_string(path).map_err(|source| ConfigError::Io {
				path: path.to_path_buf(),
				source,
			})?),
			None => read_prompt_file(&default_prompt_path()),
		};
		Self::resolve(overrides, &env, contents.as_deref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::prompt::DEFAULT_SYSTEM_PROMPT;

	#[test]
	fn defaults_apply_when_only_key_is_set() {
		let env = EnvSnapshot::from_pairs([("GROQ_API_KEY", "dummy-key")]);
		let settings = AgentSettings::resolve(&ConfigOverrides::default(), &env, None).unwrap();

		assert_eq!(settings.api_key.expose(), "dummy-key");
		assert_eq!(settings.base_url, DEFAULT_BASE_URL);
		assert_eq!(settings.model, DEFAULT_MODEL);
		assert!(settings.kubeconfig.is_none());
		assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
	}

	#[test]
	fn env_supplies_model_and_base_url_but_not_kubeconfig() {
		let env = EnvSnapshot::from_pairs([
			("GROQ_API_KEY", "dummy-key"),
			("OPENAI_BASE_URL", "https://example.com/openai/v1"),
			("MODEL", "example/model"),
			("KUBECONFIG", "/tmp/kubeconfig"),
		]);
		let settings = AgentSettings::resolve(&ConfigOverrides::default(), &env, None).unwrap();

		assert_eq!(settings.model, "example/model");
		assert_eq!(settings.base_url, "https://example.com/openai/v1");
		assert!(settings.kubeconfig.is_none());
	}

	#[test]
	fn overrides_beat_env() {
		let env = EnvSnapshot::from_pairs([
			("GROQ_API_KEY", "env-key"),
			("OPENAI_BASE_URL", "https://env.example/api"),
			("MODEL", "env/model"),
			("SYSTEM_PROMPT", "From ENV"),
		]);
		let overrides = ConfigOverrides {
			api_key: Some(SecretString::new("arg-key")),
			base_url: Some("https://arg.example/api".into()),
			model: Some("arg/model".into()),
			kubeconfig: Some(PathBuf::from("/etc/kube")),
			system_prompt: Some("From CLI".into()),
		};
		let settings = AgentSettings::resolve(&overrides, &env, None).unwrap();

		assert_eq!(settings.api_key.expose(), "arg-key");
		assert_eq!(settings.model, "arg/model");
		assert_eq!(settings.base_url, "https://arg.example/api");
		assert_eq!(settings.kubeconfig, Some(PathBuf::from("/etc/kube")));
		assert_eq!(settings.system_prompt, "From CLI");
	}

	#[test]
	fn openai_key_is_a_fallback() {
		let env = EnvSnapshot::from_pairs([("OPENAI_API_KEY", "openai-key")]);
		let settings = AgentSettings::resolve(&ConfigOverrides::default(), &env, None).unwrap();
		assert_eq!(settings.api_key.expose(), "openai-key");

		let env = EnvSnapshot::from_pairs([("OPENAI_API_KEY", "openai-key"), ("GROQ_API_KEY", "groq-key")]);
		let settings = AgentSettings::resolve(&ConfigOverrides::default(), &env, None).unwrap();
		assert_eq!(settings.api_key.expose(), "groq-key");
	}

	#[test]
	fn missing_key_is_an_error() {
		let env = EnvSnapshot::from_pairs([("MODEL", "x")]);
		let err = AgentSettings::resolve(&ConfigOverrides::default(), &env, None).unwrap_err();
		assert!(matches!(err, ConfigError::MissingApiKey(_)));
		assert!(err.to_string().contains("GROQ_API_KEY"));
	}

	#[test]
	fn system_prompt_env_beats_file() {
		let file = "system_prompt = \"\"\"From TOML\"\"\"";
		let env = EnvSnapshot::from_pairs([("GROQ_API_KEY", "k"), ("SYSTEM_PROMPT", "From ENV")]);
		let settings = AgentSettings::resolve(&ConfigOverrides::default(), &env, Some(file)).unwrap();
		assert_eq!(settings.system_prompt, "From ENV");

		let env = EnvSnapshot::from_pairs([("GROQ_API_KEY", "k")]);
		let settings = AgentSettings::resolve(&ConfigOverrides::default(), &env, Some(file)).unwrap();
		assert_eq!(settings.system_prompt, "From TOML");
	}

	#[test]
	fn unreadable_explicit_prompt_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let overrides = ConfigOverrides {
			api_key: Some(SecretString::new("k")),
			..Default::default()
		};
		let err = AgentSettings::from_env(&overrides, Some(&dir.path().join("nope.toml"))).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}

	#[test]
	fn debug_output_hides_key() {
		let env = EnvSnapshot::from_pairs([("GROQ_API_KEY", "gsk_very_secret")]);
		let settings = AgentSettings::resolve(&ConfigOverrides::default(), &env, None).unwrap();
		assert!(!format!("{settings:?}").contains("gsk_very_secret"));
	}
}
