// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Process environment helpers: `.env` loading and `VAR` / `VAR_FILE` secrets.

use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::ConfigError;
use crate::secret::SecretString;

/// Loads `path` into the process environment without overriding anything
/// already set. A missing or unreadable file is not an error; a line
/// dotenvy cannot parse stops loading at that line.
///
/// Returns the number of variables that were set.
pub fn load_dotenv(path: &Path) -> usize {
	let entries = match dotenvy::from_path_iter(path) {
		Ok(entries) => entries,
		Err(e) => {
			tracing::debug!(path = %path.display(), error = %e, "no env file loaded");
			return 0;
		}
	};

	let mut applied = 0;
	for entry in entries {
		let (key, value) = match entry {
			Ok(pair) => pair,
			Err(e) => {
				tracing::warn!(path = %path.display(), error = %e, "stopped reading env file");
				break;
			}
		};
		if env::var_os(&key).is_some() {
			tracing::trace!(key = %key, "env var already set, keeping existing value");
			continue;
		}
		env::set_var(&key, value);
		applied += 1;
	}

	tracing::debug!(path = %path.display(), applied, "loaded env file");
	applied
}

/// Loads a secret using the `VAR` / `VAR_FILE` convention.
///
/// `{var}_FILE` wins when set; a single trailing newline in the file is
/// stripped. Returns `Ok(None)` when neither variable is set.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, ConfigError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(ConfigError::EmptySecretPath(file_var));
		}
		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
			path: path.clone(),
			source,
		})?;
		let secret = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(SecretString::new(secret)));
	}

	Ok(env::var(var).ok().map(SecretString::new))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn load_strips_inline_comments_and_unescapes_quotes() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(".env");
		fs::write(
			&path,
			"# comment\n\nKPILOT_TEST_DOTENV_MODEL=test-model # pinned\nexport KPILOT_TEST_DOTENV_GREETING=\"a\\nb\"\nKPILOT_TEST_DOTENV_URL='https://example.com/api?a=b'\n",
		)
		.unwrap();
		for key in [
			"KPILOT_TEST_DOTENV_MODEL",
			"KPILOT_TEST_DOTENV_GREETING",
			"KPILOT_TEST_DOTENV_URL",
		] {
			env::remove_var(key);
		}

		assert_eq!(load_dotenv(&path), 3);
		assert_eq!(env::var("KPILOT_TEST_DOTENV_MODEL").unwrap(), "test-model");
		assert_eq!(env::var("KPILOT_TEST_DOTENV_GREETING").unwrap(), "a\nb");
		assert_eq!(
			env::var("KPILOT_TEST_DOTENV_URL").unwrap(),
			"https://example.com/api?a=b"
		);
	}

	#[test]
	fn load_sets_missing_keys_only() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join(".env");
		fs::write(
			&path,
			"KPILOT_TEST_DOTENV_NEW=from-file\nKPILOT_TEST_DOTENV_EXISTING=from-file\n",
		)
		.unwrap();

		env::remove_var("KPILOT_TEST_DOTENV_NEW");
		env::set_var("KPILOT_TEST_DOTENV_EXISTING", "existing");

		let applied = load_dotenv(&path);

		assert_eq!(applied, 1);
		assert_eq!(env::var("KPILOT_TEST_DOTENV_NEW").unwrap(), "from-file");
		assert_eq!(env::var("KPILOT_TEST_DOTENV_EXISTING").unwrap(), "existing");
	}

	#[test]
	fn load_missing_file_is_silent() {
		let dir = tempfile::tempdir().unwrap();
		assert_eq!(load_dotenv(&dir.path().join("absent.env")), 0);
	}

	#[test]
	fn secret_file_takes_precedence_and_strips_newline() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		env::set_var("KPILOT_TEST_SECRET_A", "from-env");
		env::set_var("KPILOT_TEST_SECRET_A_FILE", file.path());

		let secret = load_secret_env("KPILOT_TEST_SECRET_A").unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");
	}

	#[test]
	fn secret_falls_back_to_plain_var() {
		env::remove_var("KPILOT_TEST_SECRET_B_FILE");
		env::set_var("KPILOT_TEST_SECRET_B", "plain");
		let secret = load_secret_env("KPILOT_TEST_SECRET_B").unwrap().unwrap();
		assert_eq!(secret.expose(), "plain");

		assert!(load_secret_env("KPILOT_TEST_SECRET_UNSET").unwrap().is_none());
	}

	#[test]
	fn empty_secret_file_var_is_an_error() {
		env::set_var("KPILOT_TEST_SECRET_C_FILE", "");
		let err = load_secret_env("KPILOT_TEST_SECRET_C").unwrap_err();
		assert!(matches!(err, ConfigError::EmptySecretPath(_)));
	}
}
