// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAI-compatible chat completion client for kpilot.

mod client;
mod types;

pub use client::OpenAIClient;
pub use types::*;
