use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{error, info};

use agentweave_core::traits::AgentRegistry;
use agentweave_core::types::{PipelineResult, ResultEntry, RunStatus, Workflow};

use crate::context::ExecutionContext;
use crate::dispatch::{AgentDispatcher, DispatchOutcome};
use crate::linearize::linearize;
use crate::validate::validate_structure;

/// Drives one execution request end-to-end: linearize, validate, then walk
/// the ordered nodes dispatching each agent and threading output to input.
///
/// `execute` is total: every failure mode comes back as data inside the
/// returned `PipelineResult`, never as an error or a propagated panic.
pub struct ChainExecutor {
    registry: Arc<dyn AgentRegistry>,
    dispatcher: AgentDispatcher,
}

impl ChainExecutor {
    pub fn new(registry: Arc<dyn AgentRegistry>, dispatcher: AgentDispatcher) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    /// Run `workflow` over `input_text` and return the per-node result log.
    pub async fn execute(&self, workflow: &Workflow, input_text: &str) -> PipelineResult {
        let started = Instant::now();
        info!(workflow = %workflow.name, id = %workflow.id, "Executing workflow pipeline");

        match AssertUnwindSafe(self.run(workflow, input_text, started))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(error = %message, "Workflow execution error");
                failed_result(
                    workflow,
                    format!("workflow execution error: {message}"),
                    "Error",
                    started.elapsed().as_secs_f64(),
                )
            }
        }
    }

    async fn run(&self, workflow: &Workflow, input_text: &str, started: Instant) -> PipelineResult {
        let ordered = linearize(&workflow.nodes, &workflow.edges);
        if ordered.is_empty() {
            let message = "no nodes in workflow or ordering failed";
            error!("No nodes in workflow or ordering failed");
            return failed_result(workflow, message, "Error", started.elapsed().as_secs_f64());
        }

        let validation = validate_structure(&ordered);
        if !validation.valid {
            error!(message = %validation.message, "Workflow structure validation failed");
            // Failure detected before any timing-relevant work
            return failed_result(workflow, validation.message, "Structure Error", 0.0);
        }

        let mut ctx = ExecutionContext::new(input_text);
        let mut results = Vec::with_capacity(ordered.len());

        for (i, node) in ordered.iter().enumerate() {
            info!(
                position = i + 1,
                total = ordered.len(),
                label = %node.label,
                "Processing node"
            );
            ctx.chain.push(node.label.clone());

            let processed_text = ctx.current_text.clone();

            let output = match self.registry.find_agent(node.resolve_ref()) {
                Some(agent) => match self.dispatcher.dispatch(&agent, &mut ctx).await {
                    DispatchOutcome::Completion { report, response } => {
                        ctx.current_text = response;
                        report
                    }
                    DispatchOutcome::Text(text) => {
                        ctx.current_text = text.clone();
                        text
                    }
                },
                None => {
                    // A registry miss is local to this node: its error string
                    // becomes the output and the text fed forward.
                    let message = format!("agent not found: {}", node.resolve_ref());
                    error!(agent_ref = %node.resolve_ref(), "Registry lookup failed");
                    ctx.current_text = message.clone();
                    message
                }
            };

            results.push(ResultEntry {
                node_id: node.id.clone(),
                agent_name: node.label.clone(),
                processed_text,
                output,
            });
        }

        let execution_time = started.elapsed().as_secs_f64();
        info!(
            workflow = %workflow.name,
            secs = execution_time,
            "Workflow pipeline completed"
        );

        PipelineResult {
            workflow_id: workflow.id.clone(),
            results,
            execution_time,
            status: RunStatus::Success,
        }
    }
}

fn failed_result(
    workflow: &Workflow,
    message: impl Into<String>,
    agent_name: &str,
    execution_time: f64,
) -> PipelineResult {
    PipelineResult {
        workflow_id: workflow.id.clone(),
        results: vec![ResultEntry {
            node_id: "error".to_string(),
            agent_name: agent_name.to_string(),
            processed_text: String::new(),
            output: message.into(),
        }],
        execution_time,
        status: RunStatus::Failed,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown internal error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    use agentweave_core::config::ModelConfig;
    use agentweave_core::error::{Result, WeaveError};
    use agentweave_core::traits::CompletionClient;
    use agentweave_core::types::{AgentRecord, Edge, Node};

    struct StaticRegistry {
        agents: Vec<AgentRecord>,
    }

    impl AgentRegistry for StaticRegistry {
        fn find_agent(&self, id: &str) -> Option<AgentRecord> {
            self.agents.iter().find(|a| a.id == id).cloned()
        }
    }

    struct StubClient {
        reply: String,
    }

    impl CompletionClient for StubClient {
        fn complete(
            &self,
            _config: &ModelConfig,
            _system: &str,
            _user: &str,
        ) -> BoxFuture<'_, Result<String>> {
            let reply = self.reply.clone();
            Box::pin(async move { Ok(reply) })
        }
    }

    struct FailingClient;

    impl CompletionClient for FailingClient {
        fn complete(
            &self,
            _config: &ModelConfig,
            _system: &str,
            _user: &str,
        ) -> BoxFuture<'_, Result<String>> {
            Box::pin(async { Err(WeaveError::Completion("quota exceeded".into())) })
        }
    }

    struct PanickyClient;

    impl CompletionClient for PanickyClient {
        fn complete(
            &self,
            _config: &ModelConfig,
            _system: &str,
            _user: &str,
        ) -> BoxFuture<'_, Result<String>> {
            panic!("stub blew up");
        }
    }

    fn system_agents() -> Vec<AgentRecord> {
        vec![
            AgentRecord::new("START", "START", None, "entry point"),
            AgentRecord::new("END", "END", None, "exit point"),
            AgentRecord::new("LOOP", "LOOP", None, "re-run the prior prompt"),
        ]
    }

    fn executor_with(
        mut agents: Vec<AgentRecord>,
        client: Option<Arc<dyn CompletionClient>>,
    ) -> ChainExecutor {
        let mut all = system_agents();
        all.append(&mut agents);
        ChainExecutor::new(
            Arc::new(StaticRegistry { agents: all }),
            AgentDispatcher::new(
                client,
                ModelConfig {
                    api_key: Some("sk-test".into()),
                    ..ModelConfig::default()
                },
            ),
        )
    }

    fn workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
        Workflow {
            id: "wf-1".into(),
            name: "test workflow".into(),
            description: None,
            nodes,
            edges,
        }
    }

    #[tokio::test]
    async fn test_three_node_chain() {
        let writer = AgentRecord::new("writer", "Writer", None, "You write.");
        let executor = executor_with(
            vec![writer],
            Some(Arc::new(StubClient {
                reply: "writer output".into(),
            })),
        );

        let wf = workflow(
            vec![
                Node::new("START", "START"),
                Node::new("n-writer", "Writer").with_agent_ref("writer"),
                Node::new("END", "END"),
            ],
            vec![
                Edge::new("e1", "START", "n-writer"),
                Edge::new("e2", "n-writer", "END"),
            ],
        );

        let result = executor.execute(&wf, "hi").await;
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.results[0].agent_name, "START");
        assert_eq!(result.results[1].agent_name, "Writer");
        assert_eq!(result.results[2].agent_name, "END");
        // The raw completion, not the formatted report, feeds the next node
        assert_eq!(result.results[2].processed_text, "writer output");
        assert!(result.execution_time >= 0.0);
    }

    #[tokio::test]
    async fn test_reversed_two_node_workflow() {
        let executor = executor_with(vec![], None);
        let wf = workflow(
            vec![Node::new("END", "END"), Node::new("START", "START")],
            vec![],
        );

        let result = executor.execute(&wf, "hello").await;
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[0].agent_name, "START");
        assert_eq!(result.results[1].agent_name, "END");
    }

    #[tokio::test]
    async fn test_missing_end_fails_before_any_agent() {
        let writer = AgentRecord::new("writer", "Writer", None, "You write.");
        let executor = executor_with(vec![writer], None);
        let wf = workflow(
            vec![
                Node::new("START", "START"),
                Node::new("n-writer", "Writer").with_agent_ref("writer"),
            ],
            vec![Edge::new("e1", "START", "n-writer")],
        );

        let result = executor.execute(&wf, "hi").await;
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].agent_name, "Structure Error");
        assert_eq!(result.results[0].output, "workflow must end with END");
        assert_eq!(result.execution_time, 0.0);
    }

    #[tokio::test]
    async fn test_empty_workflow_fails() {
        let executor = executor_with(vec![], None);
        let wf = workflow(vec![], vec![]);

        let result = executor.execute(&wf, "hi").await;
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.results.len(), 1);
        assert!(result.results[0].output.contains("no nodes"));
    }

    #[tokio::test]
    async fn test_provider_failure_does_not_fail_the_run() {
        let executor = executor_with(vec![], Some(Arc::new(FailingClient)));
        let wf = workflow(
            vec![
                Node::new("START", "START"),
                Node::new("LOOP", "LOOP"),
                Node::new("END", "END"),
            ],
            vec![
                Edge::new("e1", "START", "LOOP"),
                Edge::new("e2", "LOOP", "END"),
            ],
        );

        let result = executor.execute(&wf, "the original input").await;
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.results.len(), 3);
        // LOOP finds no eligible prior agent here; its fallback output still
        // carries the text it was fed (START's report embeds the input)
        assert!(result.results[1].output.contains("the original input"));
    }

    #[tokio::test]
    async fn test_loop_error_report_after_generic_node() {
        let writer = AgentRecord::new("writer", "Writer", None, "You write.");
        let executor = executor_with(vec![writer], Some(Arc::new(FailingClient)));
        let wf = workflow(
            vec![
                Node::new("START", "START"),
                Node::new("n-writer", "Writer").with_agent_ref("writer"),
                Node::new("LOOP", "LOOP"),
                Node::new("END", "END"),
            ],
            vec![
                Edge::new("e1", "START", "n-writer"),
                Edge::new("e2", "n-writer", "LOOP"),
                Edge::new("e3", "LOOP", "END"),
            ],
        );

        let result = executor.execute(&wf, "hi").await;
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.results.len(), 4);
        // Writer fails -> fallback report; LOOP then fails against the
        // provider too and reports the error as data
        assert!(result.results[1].output.contains("completion failed"));
        assert!(result.results[2].output.contains("LOOP agent run failed"));
        assert!(result.results[2].output.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_registry_miss_threads_error_forward() {
        let executor = executor_with(vec![], None);
        let wf = workflow(
            vec![
                Node::new("START", "START"),
                Node::new("n-ghost", "Ghost").with_agent_ref("ghost"),
                Node::new("END", "END"),
            ],
            vec![
                Edge::new("e1", "START", "n-ghost"),
                Edge::new("e2", "n-ghost", "END"),
            ],
        );

        let result = executor.execute(&wf, "hi").await;
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.results[1].output, "agent not found: ghost");
        // The error string is the text fed to the next node
        assert_eq!(result.results[2].processed_text, "agent not found: ghost");
    }

    #[tokio::test]
    async fn test_internal_panic_becomes_failed_result() {
        let writer = AgentRecord::new("writer", "Writer", None, "You write.");
        let executor = executor_with(vec![writer], Some(Arc::new(PanickyClient)));
        let wf = workflow(
            vec![
                Node::new("START", "START"),
                Node::new("n-writer", "Writer").with_agent_ref("writer"),
                Node::new("END", "END"),
            ],
            vec![
                Edge::new("e1", "START", "n-writer"),
                Edge::new("e2", "n-writer", "END"),
            ],
        );

        let result = executor.execute(&wf, "hi").await;
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.results.len(), 1);
        assert!(result.results[0].output.contains("workflow execution error"));
        assert!(result.results[0].output.contains("stub blew up"));
    }
}
