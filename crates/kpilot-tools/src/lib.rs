// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The Kubernetes operations kpilot can perform.
//!
//! [`Catalog`] describes each operation to the model; [`Executor`] binds
//! arguments, runs the operation against a [`kpilot_k8s::ClusterBackend`]
//! and reports the outcome as a [`ResultEnvelope`].

pub mod args;
pub mod envelope;
pub mod executor;
mod ops;
pub mod registry;
pub mod spec;
pub mod summary;

pub use args::Arguments;
pub use envelope::ResultEnvelope;
pub use executor::{Executor, Invocation};
pub use registry::{Catalog, Handler, HandlerFn, Operation};
pub use spec::{OperationSpec, ParamType, ParameterSpec};
pub use summary::format_age;
