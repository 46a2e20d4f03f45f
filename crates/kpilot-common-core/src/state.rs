// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Conversation state: the append-only message log and the per-turn phase.

use std::fmt;

use crate::message::Message;

/// Where the orchestrator is within a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
	/// Between turns; the only phase a caller ever observes.
	AwaitingInput,
	/// First model call, capabilities advertised.
	QueryingModel,
	/// Running the batch of requested invocations.
	ExecutingBatch,
	/// Second model call, no capabilities advertised.
	Finalizing,
}

impl TurnPhase {
	pub fn name(&self) -> &'static str {
		match self {
			TurnPhase::AwaitingInput => "AwaitingInput",
			TurnPhase::QueryingModel => "QueryingModel",
			TurnPhase::ExecutingBatch => "ExecutingBatch",
			TurnPhase::Finalizing => "Finalizing",
		}
	}
}

impl fmt::Display for TurnPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Ordered, append-only message log for one conversation.
///
/// Messages are never edited or removed individually; [`clear`] is the only
/// way to shrink the log and it always empties it.
///
/// [`clear`]: ConversationHistory::clear
#[derive(Clone, Debug)]
pub struct ConversationHistory {
	id: uuid::Uuid,
	messages: Vec<Message>,
}

impl ConversationHistory {
	pub fn new() -> Self {
		Self {
			id: uuid::Uuid::new_v4(),
			messages: Vec::new(),
		}
	}

	pub fn id(&self) -> uuid::Uuid {
		self.id
	}

	pub fn append(&mut self, message: Message) {
		tracing::debug!(
			conversation_id = %self.id,
			role = ?message.role,
			position = self.messages.len(),
			"appending message"
		);
		self.messages.push(message);
	}

	pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
		for message in messages {
			self.append(message);
		}
	}

	/// Read-only view of the live log.
	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	/// Independent copy of the log; mutating it does not affect the history.
	pub fn snapshot(&self) -> Vec<Message> {
		self.messages.clone()
	}

	pub fn clear(&mut self) {
		tracing::debug!(
			conversation_id = %self.id,
			discarded = self.messages.len(),
			"clearing conversation history"
		);
		self.messages.clear();
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}
}

impl Default for ConversationHistory {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn snapshot_is_independent() {
		let mut history = ConversationHistory::new();
		history.append(Message::user("hello"));

		let mut snapshot = history.snapshot();
		snapshot.push(Message::assistant("injected"));
		snapshot[0].content = "edited".to_string();

		assert_eq!(history.len(), 1);
		assert_eq!(history.messages()[0].content, "hello");
	}

	#[test]
	fn clear_empties_and_keeps_id() {
		let mut history = ConversationHistory::new();
		let id = history.id();
		history.append(Message::user("a"));
		history.append(Message::assistant("b"));

		history.clear();

		assert!(history.is_empty());
		assert_eq!(history.id(), id);
	}

	proptest! {
		/// Appending never reorders: the log reads back exactly in append order.
		#[test]
		fn appends_preserve_order(contents in prop::collection::vec("[a-z]{0,12}", 0..20)) {
			let mut history = ConversationHistory::new();
			for content in &contents {
				history.append(Message::user(content.clone()));
			}

			prop_assert_eq!(history.len(), contents.len());
			let read_back: Vec<String> = history.snapshot().into_iter().map(|m| m.content).collect();
			prop_assert_eq!(read_back, contents);
		}
	}
}
