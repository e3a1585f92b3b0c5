use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::{error, info, warn};

use agentweave_core::config::ModelConfig;
use agentweave_core::error::{Result, WeaveError};
use agentweave_core::traits::CompletionClient;
use agentweave_core::types::{AgentRecord, AgentVariant};

use crate::context::{ExecutionContext, PriorAgent};

const ROLE_PREAMBLE: &str =
    "You will be given a role description below. Respond in a clear voice that fits the role.";

const LOOP_DEEPEN_NOTE: &str = "Note: this text has already been processed once and is now being \
     deepened by a follow-up pass. Expand the previous content and add more detail.";

/// What a dispatched agent handed back.
///
/// `Completion` carries both the raw model response (which feeds the next
/// node) and the formatted report (which becomes the log entry). Everything
/// else comes back as `Text`, which serves as both output and forwarded
/// text.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Text(String),
    Completion { report: String, response: String },
}

/// Runs one agent against the current text.
///
/// Dispatch is total: every failure mode is encoded in the returned outcome,
/// never raised. The chain executor has no retry logic and relies on this to
/// keep the pipeline moving.
pub struct AgentDispatcher {
    client: Option<Arc<dyn CompletionClient>>,
    model: ModelConfig,
}

impl AgentDispatcher {
    pub fn new(client: Option<Arc<dyn CompletionClient>>, model: ModelConfig) -> Self {
        Self { client, model }
    }

    /// Run `agent` against the context's current text.
    ///
    /// The agent is recorded in the context's prior-agent history before any
    /// output is produced, regardless of variant.
    pub async fn dispatch(
        &self,
        agent: &AgentRecord,
        ctx: &mut ExecutionContext,
    ) -> DispatchOutcome {
        info!(agent = %agent.name, id = %agent.id, "Dispatching agent");
        ctx.prior.push(PriorAgent::from(agent));

        match agent.variant {
            AgentVariant::Start => DispatchOutcome::Text(run_start(&ctx.current_text)),
            AgentVariant::End => DispatchOutcome::Text(run_end(&ctx.current_text, &ctx.chain)),
            AgentVariant::Loop => self.run_loop(ctx).await,
            AgentVariant::Generic => self.run_generic(agent, ctx).await,
        }
    }

    async fn call(&self, system: &str, user: &str) -> Result<String> {
        match &self.client {
            Some(client) => client.complete(&self.model, system, user).await,
            None => Err(WeaveError::CompletionUnconfigured),
        }
    }

    /// LOOP: re-run the most recent suitable prior agent's prompt over the
    /// current text to deepen it.
    ///
    /// The backward walk skips START and LOOP entries but nothing else; an
    /// END sitting mid-chain is eligible. That matches how runs have always
    /// behaved, so it stays.
    async fn run_loop(&self, ctx: &ExecutionContext) -> DispatchOutcome {
        let input = ctx.current_text.as_str();

        if ctx.chain.len() < 2 || ctx.prior.len() < 2 {
            warn!("LOOP agent has no prior agent to re-run");
            return DispatchOutcome::Text(format!(
                "No prior agent available for LOOP. Text to process: {input}"
            ));
        }

        // Last entry is the LOOP itself
        let target = ctx.prior[..ctx.prior.len() - 1]
            .iter()
            .rev()
            .find(|a| a.variant != AgentVariant::Loop && a.variant != AgentVariant::Start);

        let Some(target) = target else {
            warn!("No suitable prior agent for LOOP");
            return DispatchOutcome::Text(format!(
                "No suitable prior agent found for LOOP. Text to process: {input}"
            ));
        };

        let mut details = vec![
            format!("Timestamp: {}", Local::now().format("%H:%M:%S")),
            "LOOP agent running".to_string(),
            format!("Prior agent: {}", target.name),
            "Re-processing the text with the prior agent's prompt".to_string(),
            format!("Text to process: {input}"),
        ];

        let system = format!(
            "{ROLE_PREAMBLE}\n\n{}\n\n{LOOP_DEEPEN_NOTE}",
            target.prompt
        );
        let user = format!("Text to process: {input}\n\nDeepen and expand this text further.");

        info!(prior = %target.name, "LOOP re-running prior agent's prompt");
        let started = Instant::now();

        match self.call(&system, &user).await {
            Ok(response) => {
                details.push(format!(
                    "Call time: {:.2} seconds",
                    started.elapsed().as_secs_f64()
                ));

                let report = format!(
                    "LOOP agent result (using the '{}' prompt)\n\n\
                     Processing Details:\n{}\n\n\
                     Expanded Content:\n\"{}\"",
                    target.name,
                    bullets(&details),
                    response
                );

                info!(len = response.len(), "LOOP agent completed");
                DispatchOutcome::Completion { report, response }
            }
            Err(e) => {
                error!(error = %e, "LOOP completion call failed");
                DispatchOutcome::Text(format!(
                    "LOOP agent run failed (prior agent: {})\n\n\
                     Processing Details:\n{}\n\n\
                     Error: {}\n\n\
                     Text left unprocessed by this failure:\n\"{}\"",
                    target.name,
                    bullets(&details),
                    e,
                    input
                ))
            }
        }
    }

    /// GENERIC: one completion call with the agent's stored role prompt.
    async fn run_generic(&self, agent: &AgentRecord, ctx: &ExecutionContext) -> DispatchOutcome {
        let input = ctx.current_text.as_str();
        let chain_path = ctx.chain_path();
        let started = Instant::now();

        // Missing client or credential is not a hard stop: the call itself
        // fails and the fallback report takes over.
        if self.client.is_none() {
            warn!("Completion client not configured, the call will fail");
        }
        if self.model.api_key.is_none() {
            warn!("No provider credential configured, the call will fail");
        }

        let system = format!("{ROLE_PREAMBLE}\n\n{}", agent.prompt);

        let additional = if ctx.chain.len() > 1 {
            format!(
                "\n\nThis topic was previously handled by the '{}' agent. As '{}', take it further.",
                ctx.chain[ctx.chain.len() - 2],
                agent.name
            )
        } else {
            String::new()
        };
        let user = format!("Text to process: {input}\n\nAgent chain: {chain_path}{additional}");

        info!(agent = %agent.name, model = %self.model.model_id, "Running completion");

        match self.call(&system, &user).await {
            Ok(response) => {
                let elapsed = started.elapsed().as_secs_f64();

                let processing = vec![
                    format!("Timestamp: {}", Local::now().format("%H:%M:%S")),
                    format!("Agent: {}", agent.name),
                    format!("Agent chain: {chain_path}"),
                    format!("Input text: {}...", truncate_chars(input, 100)),
                    format!("Call time: {elapsed:.2} seconds"),
                ];

                let technical = vec![
                    "Processing mode: LLM completion".to_string(),
                    format!("Model: {}", self.model.model_id),
                    format!("Agents in chain: {}", ctx.chain.len()),
                    format!("Current agent: {}", agent.name),
                    format!("Input length: {} characters", input.chars().count()),
                    format!("Response length: {} characters", response.chars().count()),
                ];

                let report = format!(
                    "Agent '{}' completed\n\n\
                     Processing Details:\n{}\n\n\
                     Technical Details:\n{}\n\n\
                     Model Response:\n\"{}\"",
                    agent.name,
                    bullets(&processing),
                    bullets(&technical),
                    response
                );

                info!(agent = %agent.name, elapsed_secs = elapsed, "Completion finished");
                DispatchOutcome::Completion { report, response }
            }
            Err(e) => {
                error!(agent = %agent.name, error = %e, "Completion call failed");

                let processing = vec![
                    format!("Timestamp: {}", Local::now().format("%H:%M:%S")),
                    format!("Agent: {}", agent.name),
                    format!("Agent chain: {chain_path}"),
                    format!("Input text: {}...", truncate_chars(input, 100)),
                    format!("Error: {e}"),
                    "Note: fallback output used because the completion call failed".to_string(),
                ];

                let technical = vec![
                    "Processing mode: fallback (no completion)".to_string(),
                    format!("Agents in chain: {}", ctx.chain.len()),
                    format!("Current agent: {}", agent.name),
                    format!("Input length: {} characters", input.chars().count()),
                ];

                DispatchOutcome::Text(format!(
                    "Agent '{}' completed (completion failed)\n\n\
                     Processing Details:\n{}\n\n\
                     Technical Details:\n{}\n\n\
                     Processed Text:\n\"{}...\"",
                    agent.name,
                    bullets(&processing),
                    bullets(&technical),
                    truncate_chars(input, 500)
                ))
            }
        }
    }
}

/// START: pure passthrough with an opening report. Cannot fail.
fn run_start(input: &str) -> String {
    let details = vec![
        format!("Timestamp: {}", Local::now().format("%H:%M:%S")),
        "Workflow run started".to_string(),
        format!("Initial text: {input}"),
    ];

    info!(input_len = input.len(), "START agent completed");

    format!(
        "Workflow Started\n\n\
         Processing Details:\n{}\n\n\
         Initial Text:\n\"{}\"",
        bullets(&details),
        input
    )
}

/// END: closing report with the full chain path. Cannot fail.
fn run_end(input: &str, chain: &[String]) -> String {
    let path = chain.join(" -> ");
    let details = vec![
        format!("Timestamp: {}", Local::now().format("%H:%M:%S")),
        "Workflow run finished".to_string(),
        format!("Agents chained: {}", chain.len()),
        format!("Agent chain: {path}"),
        format!("Final processed text: {input}"),
    ];

    info!(chain = %path, "END agent completed");

    format!(
        "Workflow Completed\n\n\
         Processing Details:\n{}\n\n\
         Final Text:\n\"{}\"\n\n\
         This workflow completed successfully.",
        bullets(&details),
        input
    )
}

fn bullets(details: &[String]) -> String {
    details
        .iter()
        .map(|d| format!("- {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
