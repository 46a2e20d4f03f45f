// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for kpilot.
//!
//! - [`SecretString`]: API keys that never show up in logs
//! - [`load_dotenv`]: non-overriding `.env` loading via dotenvy
//! - [`resolve_system_prompt`]: explicit > env > file > built-in default
//! - [`AgentSettings`]: every runtime setting resolved in one place

pub mod env;
pub mod error;
pub mod prompt;
pub mod secret;
pub mod settings;

pub use env::{load_dotenv, load_secret_env};
pub use error::ConfigError;
pub use prompt::{
	default_prompt_path, load_system_prompt, prompt_from_toml, read_prompt_file,
	resolve_system_prompt, DEFAULT_SYSTEM_PROMPT, SYSTEM_PROMPT_ENV,
};
pub use secret::{SecretString, REDACTED};
pub use settings::{
	AgentSettings, ConfigOverrides, EnvSnapshot, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
