// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! kpilot: talk to a Kubernetes cluster in plain language.

mod render;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kpilot_agent::{Orchestrator, OrchestratorSettings};
use kpilot_common_config::{load_dotenv, AgentSettings, ConfigOverrides};
use kpilot_k8s::KubeClient;
use kpilot_llm_openai::{OpenAIClient, OpenAIConfig};
use kpilot_tools::{Catalog, Executor, Invocation};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "kpilot=warn";

/// kpilot - conversational Kubernetes assistant.
#[derive(Parser, Debug)]
#[command(name = "kpilot", about = "Conversational Kubernetes assistant", version)]
struct Args {
	#[command(subcommand)]
	command: Option<Command>,

	/// Env file loaded before anything else; existing variables win
	#[arg(long, global = true, default_value = ".env")]
	env_file: PathBuf,

	/// Kubeconfig to use instead of in-cluster or default discovery
	#[arg(long, global = true)]
	kubeconfig: Option<PathBuf>,

	/// Model name (overrides MODEL)
	#[arg(long, global = true)]
	model: Option<String>,

	/// OpenAI-compatible API base URL (overrides OPENAI_BASE_URL)
	#[arg(long, global = true)]
	base_url: Option<String>,

	/// System prompt text (overrides SYSTEM_PROMPT and the prompt file)
	#[arg(long, global = true)]
	system_prompt: Option<String>,

	/// TOML file with a `system_prompt` key
	#[arg(long, global = true)]
	prompt_file: Option<PathBuf>,

	/// Log filter, e.g. `debug` or `kpilot_tools=trace` (overrides RUST_LOG)
	#[arg(long, global = true)]
	log_level: Option<String>,

	/// Emit logs as JSON lines
	#[arg(long, global = true)]
	json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Interactive session (default)
	Chat,
	/// Ask a single question and print the reply
	Ask {
		#[arg(required = true, num_args = 1..)]
		prompt: Vec<String>,
	},
	/// List the operations the assistant can perform
	Tools {
		#[arg(long)]
		json: bool,
	},
	/// Run one operation directly, without the model
	Exec {
		operation: String,
		/// Arguments as a JSON object
		#[arg(long, default_value = "{}")]
		args: String,
	},
}

fn init_tracing(log_level: Option<&str>, json: bool) -> anyhow::Result<()> {
	let filter = match log_level {
		Some(level) => EnvFilter::try_new(level).with_context(|| format!("invalid log level: {level}"))?,
		None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
	};

	let registry = tracing_subscriber::registry().with(filter);
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}
	Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	// before tracing so RUST_LOG from the file applies
	let loaded = load_dotenv(&args.env_file);
	init_tracing(args.log_level.as_deref(), args.json_logs)?;
	tracing::debug!(path = %args.env_file.display(), loaded, "env file processed");

	match args.command {
		Some(Command::Tools { json }) => tools(json),
		Some(Command::Exec {
			ref operation,
			args: ref raw,
		}) => exec(&args, operation, raw).await,
		Some(Command::Ask { ref prompt }) => {
			let mut orchestrator = build_orchestrator(&args).await?;
			println!("{}", orchestrator.process_turn(&prompt.join(" ")).await);
			Ok(())
		}
		Some(Command::Chat) | None => {
			let orchestrator = build_orchestrator(&args).await?;
			chat(orchestrator).await
		}
	}
}

fn tools(json: bool) -> anyhow::Result<()> {
	let catalog = Catalog::kubernetes()?;
	if json {
		let specs = serde_json::to_string_pretty(&catalog.list()).context("failed to encode catalog")?;
		println!("{specs}");
	} else {
		println!("{}", render::operations(&catalog.list()));
	}
	Ok(())
}

async fn exec(args: &Args, operation: &str, raw: &str) -> anyhow::Result<()> {
	let arguments: serde_json::Value =
		serde_json::from_str(raw).with_context(|| format!("--args is not valid JSON: {raw}"))?;
	let executor = build_executor(args).await?;

	let result = executor.execute(&Invocation::new(operation, arguments)).await;
	println!("{}", render::exec_result(operation, &result));
	if !result.success {
		std::process::exit(1);
	}
	Ok(())
}

async fn build_executor(args: &Args) -> anyhow::Result<Executor> {
	let cluster = KubeClient::connect(args.kubeconfig.as_deref())
		.await
		.context("failed to connect to the Kubernetes cluster")?;
	let catalog = Catalog::kubernetes()?;
	Ok(Executor::new(Arc::new(catalog), Arc::new(cluster)))
}

async fn build_orchestrator(args: &Args) -> anyhow::Result<Orchestrator> {
	let overrides = ConfigOverrides {
		api_key: None,
		base_url: args.base_url.clone(),
		model: args.model.clone(),
		kubeconfig: args.kubeconfig.clone(),
		system_prompt: args.system_prompt.clone(),
	};
	let settings =
		AgentSettings::from_env(&overrides, args.prompt_file.as_deref()).context("failed to load settings")?;

	let cluster = KubeClient::connect(settings.kubeconfig.as_deref())
		.await
		.context("failed to connect to the Kubernetes cluster")?;
	let executor = Executor::new(Arc::new(Catalog::kubernetes()?), Arc::new(cluster));

	let llm = OpenAIClient::new(OpenAIConfig::new(settings.api_key.clone()).with_base_url(&settings.base_url))
		.context("failed to build model client")?;

	tracing::info!(model = %settings.model, base_url = %settings.base_url, "starting kpilot");
	Ok(Orchestrator::new(
		Arc::new(llm),
		executor,
		OrchestratorSettings::new(settings.model, settings.system_prompt),
	))
}

async fn chat(mut orchestrator: Orchestrator) -> anyhow::Result<()> {
	println!("kpilot ready. Ask about your cluster; 'reset' clears history, 'quit' exits.");
	let mut lines = BufReader::new(tokio::io::stdin()).lines();

	loop {
		print!("\n> ");
		std::io::stdout().flush().context("failed to flush stdout")?;

		let Some(line) = lines.next_line().await.context("failed to read input")? else {
			break;
		};
		match ReplInput::parse(&line) {
			ReplInput::Empty => continue,
			ReplInput::Quit => break,
			ReplInput::Reset => {
				orchestrator.reset();
				println!("History cleared.");
			}
			ReplInput::History => println!("{}", render::history(&orchestrator.history())),
			ReplInput::Prompt(input) => println!("\n{}", orchestrator.process_turn(input).await),
		}
	}

	println!("Goodbye.");
	Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
	Empty,
	Quit,
	Reset,
	History,
	Prompt(&'a str),
}

impl<'a> ReplInput<'a> {
	/// Commands match case-insensitively; anything else goes to the model.
	fn parse(line: &'a str) -> Self {
		let input = line.trim();
		match input.to_ascii_lowercase().as_str() {
			"" => ReplInput::Empty,
			"quit" | "exit" | "q" => ReplInput::Quit,
			"reset" => ReplInput::Reset,
			"history" => ReplInput::History,
			_ => ReplInput::Prompt(input),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_to_chat_with_dotenv() {
		let args = Args::try_parse_from(["kpilot"]).unwrap();
		assert!(args.command.is_none());
		assert_eq!(args.env_file, PathBuf::from(".env"));
		assert!(!args.json_logs);
	}

	#[test]
	fn ask_joins_words_and_accepts_global_flags() {
		let args = Args::try_parse_from(["kpilot", "ask", "list", "pods", "--model", "x/y"]).unwrap();
		match args.command {
			Some(Command::Ask { prompt }) => assert_eq!(prompt.join(" "), "list pods"),
			other => panic!("unexpected command: {other:?}"),
		}
		assert_eq!(args.model.as_deref(), Some("x/y"));
	}

	#[test]
	fn repl_commands_ignore_case() {
		assert_eq!(ReplInput::parse("Quit"), ReplInput::Quit);
		assert_eq!(ReplInput::parse("  EXIT \n"), ReplInput::Quit);
		assert_eq!(ReplInput::parse("q"), ReplInput::Quit);
		assert_eq!(ReplInput::parse("Reset"), ReplInput::Reset);
		assert_eq!(ReplInput::parse("HISTORY"), ReplInput::History);
		assert_eq!(ReplInput::parse("   "), ReplInput::Empty);
		assert_eq!(
			ReplInput::parse(" List Pods in kube-system "),
			ReplInput::Prompt("List Pods in kube-system")
		);
	}

	#[test]
	fn exec_takes_operation_and_json_args() {
		let args =
			Args::try_parse_from(["kpilot", "exec", "scale_deployment", "--args", r#"{"name":"web","replicas":2}"#])
				.unwrap();
		match args.command {
			Some(Command::Exec { operation, args }) => {
				assert_eq!(operation, "scale_deployment");
				assert!(args.contains("replicas"));
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}
}
