// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::BoxFuture;
use kpilot_common_core::{ToolDefinition, ToolError};
use kpilot_k8s::ClusterBackend;
use serde_json::Value;

use crate::args::Arguments;
use crate::ops;
use crate::spec::OperationSpec;

/// One dispatchable cluster operation.
#[async_trait]
pub trait Operation: Send + Sync {
	fn spec(&self) -> &OperationSpec;

	fn name(&self) -> &str {
		&self.spec().name
	}

	/// Runs with arguments already bound against [`Operation::spec`].
	async fn run(&self, args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError>;
}

pub type HandlerFn = for<'a> fn(&'a Arguments, &'a dyn ClusterBackend) -> BoxFuture<'a, Result<Value, ToolError>>;

/// A spec paired with the function that performs it.
pub struct Handler {
	spec: OperationSpec,
	run: HandlerFn,
}

impl Handler {
	pub fn new(spec: OperationSpec, run: HandlerFn) -> Self {
		Self { spec, run }
	}
}

#[async_trait]
impl Operation for Handler {
	fn spec(&self) -> &OperationSpec {
		&self.spec
	}

	async fn run(&self, args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
		(self.run)(args, cluster).await
	}
}

/// The ordered set of operations kpilot can perform.
///
/// Advertisement to the model and dispatch both read from the same
/// instance, so the two cannot drift apart.
#[derive(Default)]
pub struct Catalog {
	operations: Vec<Box<dyn Operation>>,
	index: HashMap<String, usize>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every Kubernetes operation, in advertisement order.
	pub fn kubernetes() -> Result<Self, ToolError> {
		let mut catalog = Self::new();
		for handler in ops::handlers() {
			catalog.register(Box::new(handler))?;
		}
		tracing::debug!(operations = catalog.len(), "built operation catalog");
		Ok(catalog)
	}

	pub fn register(&mut self, operation: Box<dyn Operation>) -> Result<(), ToolError> {
		let name = operation.name().to_string();
		if self.index.contains_key(&name) {
			return Err(ToolError::DuplicateOperation(name));
		}
		tracing::trace!(operation = %name, "registering operation");
		self.index.insert(name, self.operations.len());
		self.operations.push(operation);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&dyn Operation> {
		self.index.get(name).map(|&i| self.operations[i].as_ref())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.index.contains_key(name)
	}

	pub fn list(&self) -> Vec<&OperationSpec> {
		self.operations.iter().map(|op| op.spec()).collect()
	}

	pub fn names(&self) -> Vec<&str> {
		self.operations.iter().map(|op| op.name()).collect()
	}

	pub fn definitions(&self) -> Vec<ToolDefinition> {
		self.operations.iter().map(|op| op.spec().to_definition()).collect()
	}

	pub fn len(&self) -> usize {
		self.operations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.operations.is_empty()
	}
}
