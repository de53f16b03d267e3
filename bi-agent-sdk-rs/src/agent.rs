use crate::error::AgentError;
use crate::events::{
    Event, Role, RunAgentInput, RunErrorEvent, RunFinishedEvent, RunStartedEvent,
    TextMessageContentEvent, TextMessageEndEvent, TextMessageStartEvent, ToolCallArgsEvent,
    ToolCallEndEvent, ToolCallStartEvent,
};
use crate::intent::{Classifier, Intent, KeywordClassifier, VisualizationType};
use crate::stream::{self, EventSink, EventStream};
use crate::visualization;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something that turns one [`RunAgentInput`] into a stream of protocol events.
pub trait Agent: Send + Sync {
    /// Starts the run on the current Tokio runtime and returns its event stream.
    fn run(&self, input: RunAgentInput) -> EventStream;
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Upper bound for a single classifier call.
    pub classify_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            classify_timeout: Duration::from_secs(30),
        }
    }
}

/// Business-intelligence agent: classifies the query, comments on it and attaches a synthetic
/// visualization when the intent asks for one.
pub struct BiAgent {
    classifier: Arc<dyn Classifier>,
    config: AgentConfig,
}

impl BiAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self::with_classifier(Arc::new(KeywordClassifier), config)
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>, config: AgentConfig) -> Self {
        Self { classifier, config }
    }
}

impl Agent for BiAgent {
    fn run(&self, input: RunAgentInput) -> EventStream {
        let (sink, stream) = stream::channel();
        let run = Run {
            classifier: self.classifier.clone(),
            config: self.config.clone(),
            sink,
            last_timestamp: 0,
        };
        tokio::spawn(run.execute(input));
        stream
    }
}

/// Identifiers fixed for the lifetime of one run.
#[derive(Debug, Clone)]
struct RunContext {
    thread_id: String,
    run_id: String,
    message_id: String,
}

struct Run {
    classifier: Arc<dyn Classifier>,
    config: AgentConfig,
    sink: EventSink,
    last_timestamp: i64,
}

impl Run {
    async fn execute(mut self, input: RunAgentInput) {
        let token = self.sink.token().clone();
        let run_id = input.run_id.clone();

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(run_id = %run_id, "run abandoned after unsubscribe");
            }
            _ = self.drive(&input) => {}
        }
    }

    async fn drive(&mut self, input: &RunAgentInput) {
        let Some(query) = input.user_query() else {
            warn!(run_id = %input.run_id, "rejecting run without a user query");
            let _ = self.fail(&AgentError::MissingQuery);
            return;
        };

        let ctx = RunContext {
            thread_id: input.thread_id.clone(),
            run_id: input.run_id.clone(),
            message_id: Utc::now().timestamp_millis().to_string(),
        };
        info!(run_id = %ctx.run_id, thread_id = %ctx.thread_id, "run started");

        let started = self.emit(|timestamp| {
            Event::RunStarted(RunStartedEvent {
                thread_id: ctx.thread_id.clone(),
                run_id: ctx.run_id.clone(),
                timestamp,
            })
        });
        if started.is_err() {
            return;
        }

        match self.process_query(query, &ctx).await {
            Ok(()) => {
                let _ = self.emit(|timestamp| {
                    Event::RunFinished(RunFinishedEvent {
                        thread_id: ctx.thread_id.clone(),
                        run_id: ctx.run_id.clone(),
                        timestamp,
                    })
                });
                info!(run_id = %ctx.run_id, "run finished");
            }
            Err(AgentError::Cancelled) => {
                debug!(run_id = %ctx.run_id, "subscriber went away mid-run");
            }
            Err(e) => {
                warn!(run_id = %ctx.run_id, error = %e, "run failed");
                let _ = self.fail(&e);
            }
        }
    }

    async fn process_query(&mut self, query: &str, ctx: &RunContext) -> Result<(), AgentError> {
        let message_id = ctx.message_id.as_str();

        self.emit(|timestamp| {
            Event::TextMessageStart(TextMessageStartEvent {
                message_id: message_id.to_string(),
                role: Role::Assistant,
                timestamp,
            })
        })?;

        let intent = self.classify(query).await?;
        debug!(
            run_id = %ctx.run_id,
            intent = %intent.kind,
            visualization = ?intent.visualization_type,
            "query classified"
        );

        self.emit_text(message_id, format!("I'm analyzing your query: \"{}\"\n\n", query))?;
        self.emit_text(
            message_id,
            format!(
                "Based on your query, I've identified the intent as: {}\n\n",
                intent.kind
            ),
        )?;

        if intent.requires_visualization {
            self.emit_visualization(&intent, message_id)?;
        }

        self.emit(|timestamp| {
            Event::TextMessageEnd(TextMessageEndEvent {
                message_id: message_id.to_string(),
                timestamp,
            })
        })
    }

    async fn classify(&self, query: &str) -> Result<Intent, AgentError> {
        let limit = self.config.classify_timeout;
        tokio::time::timeout(limit, self.classifier.classify(query))
            .await
            .map_err(|_| AgentError::Timeout(limit))?
    }

    fn emit_visualization(&mut self, intent: &Intent, message_id: &str) -> Result<(), AgentError> {
        let tool_call_name = intent
            .visualization_type
            .unwrap_or(VisualizationType::Chart)
            .as_str();
        let tool_call_id = format!("tool-{}", Utc::now().timestamp_millis());

        self.emit(|timestamp| {
            Event::ToolCallStart(ToolCallStartEvent {
                tool_call_id: tool_call_id.clone(),
                tool_call_name: tool_call_name.to_string(),
                parent_message_id: message_id.to_string(),
                timestamp,
            })
        })?;

        let payload = visualization::generate(intent, &mut rand::rng());
        let delta = serde_json::to_string(&payload)?;

        self.emit(|timestamp| {
            Event::ToolCallArgs(ToolCallArgsEvent {
                tool_call_id: tool_call_id.clone(),
                delta,
                timestamp,
            })
        })?;

        self.emit_text(
            message_id,
            format!(
                "I've generated a {} visualization based on your query. This uses synthetic data for demonstration purposes.\n\n",
                tool_call_name
            ),
        )?;

        self.emit(|timestamp| {
            Event::ToolCallEnd(ToolCallEndEvent {
                tool_call_id: tool_call_id.clone(),
                timestamp,
            })
        })
    }

    fn emit_text(&mut self, message_id: &str, delta: String) -> Result<(), AgentError> {
        self.emit(|timestamp| {
            Event::TextMessageContent(TextMessageContentEvent {
                message_id: message_id.to_string(),
                delta,
                timestamp,
            })
        })
    }

    fn fail(&mut self, error: &AgentError) -> Result<(), AgentError> {
        self.emit(|timestamp| {
            Event::RunError(RunErrorEvent {
                message: error.to_string(),
                code: Some(error.code().to_string()),
                timestamp,
            })
        })
    }

    /// Stamps and pushes one event. Timestamps never go backwards within a run, even if the
    /// wall clock does.
    fn emit(&mut self, build: impl FnOnce(i64) -> Event) -> Result<(), AgentError> {
        let now = Utc::now().timestamp_millis();
        self.last_timestamp = self.last_timestamp.max(now);
        self.sink.emit(build(self.last_timestamp))
    }
}
