//! ChatSession: the tool-calling conversation loop

use super::config::ChatConfig;
use super::execution::TurnExecution;
use super::function_call::{resolve_function_call, FunctionCall, FunctionCallStatus};
use super::state::{ChatMessage, ConversationState};
use crate::config::ModelParams;
use crate::error::{ConversationError, Error, Result, ToolError};
use crate::llm::{ChatOptions, ChatRequest, ChatResponse, LlmClient, LlmMessage};
use crate::output::{ConversationEvent, ConversationOutput, NullOutput};
use crate::tools::ToolRegistry;
use crate::transcript::{TranscriptEntry, TranscriptRecorder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

const EMPTY_REPLY: &str = "No response";
const ERROR_REPLY: &str = "Error processing request";

/// A single conversation with a model that may call registered tools
///
/// Turns are serialised: a submission made while another turn is in flight
/// is ignored. History and display state are only locked between awaits.
pub struct ChatSession {
    client: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    config: ChatConfig,
    options: Option<ChatOptions>,
    output: Box<dyn ConversationOutput>,
    transcript: Option<TranscriptRecorder>,
    history: Mutex<Vec<LlmMessage>>,
    state: Mutex<ConversationState>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatSession {
    /// Create a session around a client and a populated registry
    pub fn new(
        client: Arc<dyn LlmClient>,
        registry: Arc<ToolRegistry>,
        config: ChatConfig,
        params: ModelParams,
    ) -> Self {
        let options = Some(ChatOptions::from(&params)).filter(|options| !options.is_empty());

        Self {
            client,
            registry,
            config,
            options,
            output: Box::new(NullOutput),
            transcript: None,
            history: Mutex::new(Vec::new()),
            state: Mutex::new(ConversationState::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Replace the output handler
    pub fn set_output(&mut self, output: Box<dyn ConversationOutput>) {
        self.output = output;
    }

    /// Record every turn into the given transcript
    pub fn set_transcript_recorder(&mut self, recorder: TranscriptRecorder) {
        self.transcript = Some(recorder);
    }

    pub fn transcript_recorder(&self) -> Option<&TranscriptRecorder> {
        self.transcript.as_ref()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Whether a turn is currently being processed
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the displayed messages
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.state).messages().to_vec()
    }

    /// Snapshot of the committed model-facing history
    pub fn history(&self) -> Vec<LlmMessage> {
        lock(&self.history).clone()
    }

    /// Forget the conversation; returns false while a turn is in flight
    pub fn reset(&self) -> bool {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return false;
        };
        lock(&self.history).clear();
        lock(&self.state).clear();
        true
    }

    /// Process one user submission to completion
    pub async fn submit(&self, input: &str) -> TurnExecution {
        self.submit_with_cancel(input, CancellationToken::new()).await
    }

    /// Process one user submission, aborting the model request on cancellation
    pub async fn submit_with_cancel(
        &self,
        input: &str,
        cancel: CancellationToken,
    ) -> TurnExecution {
        let input = input.trim();
        if input.is_empty() {
            return TurnExecution::ignored();
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Ignoring submission while a turn is in flight");
            return TurnExecution::ignored();
        };

        let started = Instant::now();
        self.emit(ConversationEvent::TurnStarted {
            input: input.to_string(),
        })
        .await;
        self.record(TranscriptEntry::turn_start(input)).await;
        self.append_message(ChatMessage::user(input)).await;

        let mut working = self.history();
        working.push(LlmMessage::user(input));

        let (outcome, rounds) = self.run_turn(&mut working, &cancel).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let execution = match outcome {
            Ok(reply) => {
                *lock(&self.history) = working;
                self.append_message(reply.clone()).await;
                TurnExecution::answered(reply, rounds, duration_ms)
            }
            Err(e) => {
                tracing::error!("Turn failed after {} tool rounds: {}", rounds, e);
                self.record(TranscriptEntry::error(e.to_string())).await;
                let reply =
                    ChatMessage::assistant(ERROR_REPLY, Some(FunctionCall::unknown_error()));
                self.append_message(reply.clone()).await;
                TurnExecution::failed(reply, e.to_string(), rounds, duration_ms)
            }
        };

        self.record(TranscriptEntry::turn_complete(
            execution.status,
            execution.reply.as_ref().map(|reply| reply.content.clone()),
            execution.tool_rounds,
            execution.duration_ms,
        ))
        .await;
        self.emit(ConversationEvent::TurnCompleted {
            execution: execution.clone(),
        })
        .await;

        execution
    }

    /// Drive model requests and tool rounds until a final answer or a fatal error
    ///
    /// `working` ends up holding the history to commit on success.
    async fn run_turn(
        &self,
        working: &mut Vec<LlmMessage>,
        cancel: &CancellationToken,
    ) -> (Result<ChatMessage>, usize) {
        let mut round = 0;
        let mut last_call: Option<FunctionCall> = None;

        loop {
            let response = match self.request_model(round, working, cancel).await {
                Ok(response) => response,
                Err(e) => return (Err(e), round),
            };

            let Some(mut call) = resolve_function_call(&response.message) else {
                let content = if response.message.content.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    response.message.content.clone()
                };
                let function_call = last_call.map(|mut call| {
                    call.status = FunctionCallStatus::Success;
                    call
                });
                working.push(response.message);
                return (Ok(ChatMessage::assistant(content, function_call)), round);
            };

            if round == self.config.max_tool_rounds {
                let exceeded = ConversationError::ToolLoopExceeded {
                    max_rounds: self.config.max_tool_rounds,
                };
                return (Err(exceeded.into()), round);
            }

            self.execute_call(&mut call).await;

            working.push(response.message);
            working.push(LlmMessage::tool_result(
                call.name.clone(),
                call.call_id.clone(),
                call.result.clone().unwrap_or_default(),
            ));
            last_call = Some(call);
            round += 1;
        }
    }

    async fn request_model(
        &self,
        round: usize,
        working: &[LlmMessage],
        cancel: &CancellationToken,
    ) -> Result<ChatResponse> {
        let mut messages = Vec::with_capacity(working.len() + 1);
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(LlmMessage::system(prompt.clone()));
        }
        messages.extend_from_slice(working);

        let request = ChatRequest {
            model: self.client.model_name().to_string(),
            messages,
            tools: self.registry.get_all(),
            options: self.options.clone(),
        };

        self.emit(ConversationEvent::ModelRequest { round }).await;
        self.record(TranscriptEntry::model_request(
            round,
            request.messages.clone(),
            request
                .tools
                .iter()
                .map(|tool| tool.function.name.clone())
                .collect(),
        ))
        .await;

        tracing::debug!(
            "Round {}: sending {} messages and {} tools to {}",
            round,
            request.messages.len(),
            request.tools.len(),
            self.client.provider_name()
        );

        let call = self.client.chat(request);
        let bounded = async {
            match self.config.request_timeout() {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(elapsed) => Err(Error::from(elapsed)),
                },
                None => call.await,
            }
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::from(ConversationError::Cancelled)),
            result = bounded => result,
        }?;

        self.record(TranscriptEntry::model_response(
            round,
            response.message.clone(),
            response.usage.clone(),
            response.finish_reason.clone(),
        ))
        .await;

        Ok(response)
    }

    /// Look up, validate and run a call, storing the outcome in place
    async fn execute_call(&self, call: &mut FunctionCall) {
        self.emit(ConversationEvent::ToolExecutionStarted { call: call.clone() })
            .await;
        self.record(TranscriptEntry::tool_call(call.clone())).await;

        match self.registry.get_by_name(&call.name) {
            None => {
                tracing::warn!("Model requested unknown tool '{}'", call.name);
                call.fail(
                    ToolError::NotFound {
                        name: call.name.clone(),
                    }
                    .to_string(),
                );
            }
            Some(tool) => match tool.parameters().validate(&call.parameters) {
                Err(e) => {
                    let reason = match e {
                        ToolError::InvalidArguments { message } => message,
                        other => other.to_string(),
                    };
                    tracing::warn!("Rejected arguments for tool '{}': {}", call.name, reason);
                    call.fail(format!("Invalid arguments for tool {}: {}", call.name, reason));
                }
                Ok(args) => {
                    tracing::debug!(
                        "Executing tool '{}' with {} arguments",
                        call.name,
                        args.len()
                    );
                    match tool.execute(args).await {
                        Ok(result) => call.succeed(result),
                        Err(e) => {
                            tracing::warn!("Tool '{}' failed: {}", call.name, e);
                            call.fail(format!("Error executing tool: {}", e));
                        }
                    }
                }
            },
        }

        self.record(TranscriptEntry::tool_result(call.clone())).await;
        self.emit(ConversationEvent::ToolExecutionCompleted { call: call.clone() })
            .await;
    }

    async fn append_message(&self, message: ChatMessage) {
        lock(&self.state).push(message.clone());
        self.emit(ConversationEvent::MessageAppended { message }).await;
    }

    async fn emit(&self, event: ConversationEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            tracing::debug!("Failed to emit conversation event: {}", e);
        }
    }

    async fn record(&self, entry: TranscriptEntry) {
        if let Some(recorder) = &self.transcript {
            if let Err(e) = recorder.record(entry).await {
                tracing::warn!("Failed to record transcript entry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::TurnStatus;
    use crate::error::LlmError;
    use crate::llm::{MessageRole, ToolCallRequest};
    use crate::tools::{ParameterSchema, Tool, ToolArguments};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Replays canned responses and captures every request
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<LlmMessage>>>,
        requests: Mutex<Vec<ChatRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<LlmMessage>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
                delay: None,
            })
        }

        fn hanging() -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
                delay: Some(Duration::from_secs(3600)),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.responses.lock().unwrap().pop_front();
            let message =
                next.unwrap_or_else(|| Ok(LlmMessage::assistant("script exhausted")))?;
            Ok(ChatResponse {
                message,
                model: "scripted".to_string(),
                usage: None,
                finish_reason: None,
            })
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    struct ThemeTool {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for ThemeTool {
        fn name(&self) -> &str {
            "change_theme"
        }

        fn description(&self) -> &str {
            "Change the theme of the application."
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::new().required_enum("theme", "Theme to use", ["light", "dark"])
        }

        async fn execute(&self, args: ToolArguments) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let theme = args.require_str("theme")?;
            Ok(Some(format!("Theme changed to {}", theme)))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "explode"
        }

        fn description(&self) -> &str {
            "Always fails."
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        async fn execute(&self, _args: ToolArguments) -> Result<Option<String>> {
            Err(Error::Generic("boom".to_string()))
        }
    }

    struct SilentTool;

    #[async_trait]
    impl Tool for SilentTool {
        fn name(&self) -> &str {
            "clear_log_filter"
        }

        fn description(&self) -> &str {
            "Clear filters."
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        async fn execute(&self, _args: ToolArguments) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn registry(calls: Arc<AtomicUsize>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(ThemeTool { calls });
        registry.register(FailingTool);
        registry.register(SilentTool);
        Arc::new(registry)
    }

    fn session_with(
        client: Arc<ScriptedClient>,
        config: ChatConfig,
    ) -> (ChatSession, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = ChatSession::new(
            client,
            registry(calls.clone()),
            config,
            ModelParams::default(),
        );
        (session, calls)
    }

    fn theme_call(theme: &str) -> LlmMessage {
        LlmMessage::assistant_with_tool_calls(
            "",
            vec![ToolCallRequest::new("change_theme", json!({"theme": theme})).with_id("call_1")],
        )
    }

    #[tokio::test]
    async fn test_plain_answer_needs_one_request() {
        let client = ScriptedClient::new(vec![Ok(LlmMessage::assistant("Hello!"))]);
        let (session, calls) = session_with(client.clone(), ChatConfig::default());

        let execution = session.submit("hi").await;

        assert_eq!(execution.status, TurnStatus::Answered);
        assert_eq!(execution.tool_rounds, 0);
        let reply = execution.reply.unwrap();
        assert_eq!(reply.content, "Hello!");
        assert!(reply.function_call.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "scripted");
        assert_eq!(requests[0].tools.len(), 3);
        assert!(requests[0].options.is_none());

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user());
        assert_eq!(messages[0].content, "hi");
        assert_eq!(session.history().len(), 2);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let client = ScriptedClient::new(vec![
            Ok(theme_call("dark")),
            Ok(LlmMessage::assistant("Switched to dark mode.")),
        ]);
        let (session, calls) = session_with(client.clone(), ChatConfig::default());

        let execution = session.submit("switch to dark mode").await;

        assert_eq!(execution.status, TurnStatus::Answered);
        assert_eq!(execution.tool_rounds, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let reply = execution.reply.unwrap();
        assert_eq!(reply.content, "Switched to dark mode.");
        let call = reply.function_call.unwrap();
        assert_eq!(call.name, "change_theme");
        assert_eq!(call.parameters, json!({"theme": "dark"}));
        assert_eq!(call.status, FunctionCallStatus::Success);
        assert_eq!(call.result.as_deref(), Some("Theme changed to dark"));

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1].messages;
        assert_eq!(second.len(), 3);
        assert_eq!(second[0].role, MessageRole::User);
        assert_eq!(second[1].role, MessageRole::Assistant);
        assert!(second[1].has_tool_calls());
        assert_eq!(second[2].role, MessageRole::Tool);
        assert_eq!(second[2].content, "Theme changed to dark");
        assert_eq!(second[2].tool_name.as_deref(), Some("change_theme"));
        assert_eq!(second[2].tool_call_id.as_deref(), Some("call_1"));

        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn test_implicit_call_in_content() {
        let client = ScriptedClient::new(vec![
            Ok(LlmMessage::assistant(
                r#"{"name": "change_theme", "parameters": {"theme": "light"}}"#,
            )),
            Ok(LlmMessage::assistant("")),
        ]);
        let (session, calls) = session_with(client.clone(), ChatConfig::default());

        let execution = session.submit("light please").await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let reply = execution.reply.unwrap();
        assert_eq!(reply.content, "No response");
        assert_eq!(
            reply.function_call.unwrap().result.as_deref(),
            Some("Theme changed to light")
        );

        let second = &client.requests()[1].messages;
        assert_eq!(second[2].tool_call_id, None);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back() {
        let client = ScriptedClient::new(vec![
            Ok(LlmMessage::assistant_with_tool_calls(
                "",
                vec![ToolCallRequest::new("launch_rocket", json!({}))],
            )),
            Ok(LlmMessage::assistant("I cannot do that.")),
        ]);
        let (session, _) = session_with(client.clone(), ChatConfig::default());

        let execution = session.submit("launch").await;

        assert_eq!(execution.status, TurnStatus::Answered);
        assert_eq!(client.requests()[1].messages[2].content, "Tool launch_rocket not found");
        let call = execution.reply.unwrap().function_call.unwrap();
        assert_eq!(call.name, "launch_rocket");
        assert_eq!(call.status, FunctionCallStatus::Success);
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_execute() {
        let client = ScriptedClient::new(vec![
            Ok(theme_call("purple")),
            Ok(LlmMessage::assistant("Sorry.")),
        ]);
        let (session, calls) = session_with(client.clone(), ChatConfig::default());

        let execution = session.submit("purple theme").await;

        assert_eq!(execution.status, TurnStatus::Answered);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let fed_back = &client.requests()[1].messages[2].content;
        assert!(fed_back.starts_with("Invalid arguments for tool change_theme: "));
        assert!(fed_back.contains("purple"));
    }

    #[tokio::test]
    async fn test_tool_failure_and_empty_result() {
        let client = ScriptedClient::new(vec![
            Ok(LlmMessage::assistant_with_tool_calls(
                "",
                vec![ToolCallRequest::new("explode", json!({}))],
            )),
            Ok(LlmMessage::assistant_with_tool_calls(
                "",
                vec![ToolCallRequest::new("clear_log_filter", json!(null))],
            )),
            Ok(LlmMessage::assistant("Done.")),
        ]);
        let (session, _) = session_with(client.clone(), ChatConfig::default());

        let execution = session.submit("do things").await;

        assert_eq!(execution.tool_rounds, 2);
        let requests = client.requests();
        assert_eq!(requests[1].messages[2].content, "Error executing tool: boom");
        assert_eq!(requests[2].messages[4].content, "");

        let call = execution.reply.unwrap().function_call.unwrap();
        assert_eq!(call.name, "clear_log_filter");
        assert!(call.result.is_none());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let client = ScriptedClient::new(vec![]);
        let (session, _) = session_with(client.clone(), ChatConfig::default());

        let execution = session.submit("   \n").await;

        assert_eq!(execution.status, TurnStatus::Ignored);
        assert!(session.messages().is_empty());
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_fails_turn_and_keeps_history() {
        let client = ScriptedClient::new(vec![
            Ok(LlmMessage::assistant("First answer.")),
            Err(LlmError::Network {
                message: "connection refused".to_string(),
            }
            .into()),
        ]);
        let (session, _) = session_with(client, ChatConfig::default());

        session.submit("first").await;
        let history_before = session.history();
        let execution = session.submit("second").await;

        assert_eq!(execution.status, TurnStatus::Failed);
        assert!(execution.error.unwrap().contains("connection refused"));
        let reply = execution.reply.unwrap();
        assert_eq!(reply.content, "Error processing request");
        let call = reply.function_call.unwrap();
        assert_eq!(call.name, "unknown");
        assert_eq!(call.status, FunctionCallStatus::Error);

        assert_eq!(session.history(), history_before);
        assert_eq!(session.messages().len(), 4);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_tool_loop_exceeded() {
        let client = ScriptedClient::new((0..5).map(|_| Ok(theme_call("dark"))).collect());
        let config = ChatConfig {
            max_tool_rounds: 2,
            ..Default::default()
        };
        let (session, calls) = session_with(client.clone(), config);

        let execution = session.submit("loop forever").await;

        assert_eq!(execution.status, TurnStatus::Failed);
        assert_eq!(execution.tool_rounds, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.requests().len(), 3);
        assert!(execution.error.unwrap().contains("Tool loop exceeded"));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_fails_turn_and_clears_guard() {
        let config = ChatConfig {
            request_timeout_secs: Some(1),
            ..Default::default()
        };
        let (session, _) = session_with(ScriptedClient::hanging(), config);

        let execution = session.submit("hello?").await;

        assert_eq!(execution.status, TurnStatus::Failed);
        assert!(execution.error.unwrap().contains("Timeout"));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_cancellation_fails_turn() {
        let config = ChatConfig {
            request_timeout_secs: None,
            ..Default::default()
        };
        let (session, _) = session_with(ScriptedClient::hanging(), config);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let execution = session.submit_with_cancel("hello?", cancel).await;

        assert_eq!(execution.status, TurnStatus::Failed);
        assert_eq!(execution.error.as_deref(), Some("Conversation error: Turn cancelled"));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_overlapping_submission_is_ignored() {
        let config = ChatConfig {
            request_timeout_secs: None,
            ..Default::default()
        };
        let (session, _) = session_with(ScriptedClient::hanging(), config);
        let session = Arc::new(session);
        let cancel = CancellationToken::new();

        let first = {
            let session = session.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { session.submit_with_cancel("first", cancel).await })
        };

        while !session.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = session.submit("second").await;
        assert_eq!(second.status, TurnStatus::Ignored);
        assert!(!session.reset());

        cancel.cancel();
        let first = first.await.unwrap();
        assert_eq!(first.status, TurnStatus::Failed);

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
    }

    #[tokio::test]
    async fn test_system_prompt_and_reset() {
        let client = ScriptedClient::new(vec![Ok(LlmMessage::assistant("Hi."))]);
        let config = ChatConfig {
            system_prompt: Some("You control a dashboard.".to_string()),
            ..Default::default()
        };
        let params = ModelParams {
            temperature: Some(0.2),
            ..Default::default()
        };
        let session = ChatSession::new(
            client.clone(),
            registry(Arc::new(AtomicUsize::new(0))),
            config,
            params,
        );

        session.submit("hello").await;

        let request = &client.requests()[0];
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.options.as_ref().unwrap().temperature, Some(0.2));
        assert!(session
            .history()
            .iter()
            .all(|message| message.role != MessageRole::System));

        assert!(session.reset());
        assert!(session.messages().is_empty());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_transcript_records_turn() {
        let client = ScriptedClient::new(vec![
            Ok(theme_call("dark")),
            Ok(LlmMessage::assistant("Done.")),
        ]);
        let (mut session, _) = session_with(client, ChatConfig::default());
        session.set_transcript_recorder(TranscriptRecorder::new());

        session.submit("dark").await;

        // start, 2x (request, response), tool call, tool result, complete
        let recorder = session.transcript_recorder().unwrap();
        assert_eq!(recorder.entry_count().await, 8);
    }
}
