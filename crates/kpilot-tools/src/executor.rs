// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Runs catalog operations against a cluster and wraps every outcome in a
//! [`ResultEnvelope`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use futures::FutureExt;
use kpilot_common_core::{ToolCall, ToolError};
use kpilot_k8s::ClusterBackend;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::args::Arguments;
use crate::envelope::ResultEnvelope;
use crate::registry::Catalog;

/// One requested operation: a name and its raw argument object.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
	pub operation: String,
	pub arguments: Value,
}

impl Invocation {
	pub fn new(operation: impl Into<String>, arguments: Value) -> Self {
		Self {
			operation: operation.into(),
			arguments,
		}
	}
}

impl From<&ToolCall> for Invocation {
	fn from(call: &ToolCall) -> Self {
		Self::new(call.name.clone(), call.arguments.clone())
	}
}

/// Dispatches invocations by name. Never returns an error: every failure,
/// panics included, comes back as a failed envelope.
#[derive(Clone)]
pub struct Executor {
	catalog: Arc<Catalog>,
	cluster: Arc<dyn ClusterBackend>,
}

impl Executor {
	pub fn new(catalog: Arc<Catalog>, cluster: Arc<dyn ClusterBackend>) -> Self {
		Self { catalog, cluster }
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub async fn execute(&self, invocation: &Invocation) -> ResultEnvelope {
		let name = invocation.operation.as_str();
		let Some(operation) = self.catalog.get(name) else {
			warn!(operation = name, "unknown operation requested");
			return ResultEnvelope::failure(ToolError::NotFound(name.to_string()).to_string());
		};

		let args = match Arguments::bind(operation.spec(), &invocation.arguments) {
			Ok(args) => args,
			Err(e) => {
				warn!(operation = name, error = %e, "rejected arguments");
				return ResultEnvelope::failure(e.to_string());
			}
		};

		let started = Instant::now();
		let outcome = AssertUnwindSafe(operation.run(&args, self.cluster.as_ref()))
			.catch_unwind()
			.await;
		let elapsed_ms = started.elapsed().as_millis() as u64;

		match outcome {
			Ok(Ok(data)) => {
				debug!(operation = name, elapsed_ms, "operation succeeded");
				ResultEnvelope::ok(data)
			}
			Ok(Err(e)) => {
				info!(operation = name, elapsed_ms, error = %e, "operation failed");
				ResultEnvelope::failure(e.to_string())
			}
			Err(panic) => {
				let e = ToolError::Internal(panic_message(panic.as_ref()));
				warn!(operation = name, elapsed_ms, error = %e, "operation panicked");
				ResultEnvelope::failure(e.to_string())
			}
		}
	}

	/// Runs every invocation concurrently. Results line up with the input.
	pub async fn execute_batch(&self, invocations: &[Invocation]) -> Vec<ResultEnvelope> {
		debug!(count = invocations.len(), "executing batch");
		join_all(invocations.iter().map(|i| self.execute(i))).await
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"operation panicked".to_string()
	}
}
