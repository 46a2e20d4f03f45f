// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Turn-by-turn conversation driver for kpilot.

pub mod orchestrator;
pub mod testing;

pub use orchestrator::{Orchestrator, OrchestratorSettings, ERROR_PREFIX};
pub use testing::ScriptedLlm;
