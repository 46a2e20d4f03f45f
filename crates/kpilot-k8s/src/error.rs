// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors that can occur while talking to the cluster.
#[derive(Error, Debug)]
pub enum K8sError {
	#[error("K8s API error: {message}")]
	ApiError { message: String },

	#[error("{kind} not found: {name}")]
	NotFound { kind: &'static str, name: String },

	#[error("K8s config error: {message}")]
	Config { message: String },
}

impl K8sError {
	pub(crate) fn not_found(kind: &'static str, name: &str) -> Self {
		K8sError::NotFound {
			kind,
			name: name.to_string(),
		}
	}

	pub(crate) fn config(err: impl std::fmt::Display) -> Self {
		K8sError::Config {
			message: err.to_string(),
		}
	}

	/// Maps a 404 to [`K8sError::NotFound`], everything else to an API error.
	pub(crate) fn from_kube(kind: &'static str, name: &str, err: kube::Error) -> Self {
		match err {
			kube::Error::Api(ref resp) if resp.code == 404 => Self::not_found(kind, name),
			e => e.into(),
		}
	}
}

impl From<kube::Error> for K8sError {
	fn from(err: kube::Error) -> Self {
		K8sError::ApiError {
			message: err.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use kube::core::ErrorResponse;

	fn api_error(code: u16) -> kube::Error {
		kube::Error::Api(ErrorResponse {
			status: "Failure".into(),
			message: "boom".into(),
			reason: "Reason".into(),
			code,
		})
	}

	#[test]
	fn not_found_is_mapped_from_404() {
		let err = K8sError::from_kube("Pod", "web", api_error(404));
		assert!(matches!(err, K8sError::NotFound { kind: "Pod", .. }));
		assert_eq!(err.to_string(), "Pod not found: web");
	}

	#[test]
	fn other_codes_stay_api_errors() {
		let err = K8sError::from_kube("Pod", "web", api_error(409));
		assert!(matches!(err, K8sError::ApiError { .. }));
		assert!(err.to_string().contains("boom"));
	}
}
