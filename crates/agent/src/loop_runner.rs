//! The agent turn loop implementation.

use std::sync::Arc;

use mnemo_config::AppConfig;
use mnemo_core::completion::{CompletionClient, CompletionRequest};
use mnemo_core::error::Error;
use mnemo_core::memory::MemoryStore;
use mnemo_core::message::{Message, MessageToolCall, Transcript};
use mnemo_core::tool::{ToolInvocation, ToolRegistry};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Name of the tool the priming pair is recorded under.
const MEMORY_READ_TOOL: &str = "read_from_memory";

/// Built-in system prompt. `{topic}` is replaced with the configured domain topic.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with a persistent memory and knowledge about {topic}. \
The result of 'read_from_memory' is provided before every user message: check it before answering, \
and never ask the user again for something that is already in memory. \
If the user asks about themselves and the answer is not in memory, ask them for it. \
Whenever the user tells you a new fact about themselves, save it right away with 'write_to_memory'. \
Use 'get_domain_info' when asked about {topic}, and 'search_web' when memory and what you already know are not sufficient.";

/// Explicit configuration for one agent loop.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Model identifier sent with every completion request
    pub model: String,

    pub temperature: f32,

    pub top_p: f32,

    /// First message of the transcript
    pub system_prompt: String,

    /// Keep at most this many user turns (None = unbounded)
    pub history_window: Option<usize>,
}

impl AgentOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            top_p: 1.0,
            system_prompt: DEFAULT_SYSTEM_PROMPT.replace("{topic}", "the configured topic"),
            history_window: None,
        }
    }

    /// Build options from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        let system_prompt = config
            .agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.replace("{topic}", &config.tools.domain_topic));

        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            system_prompt,
            history_window: config.agent.history_window,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = Some(turns);
        self
    }

    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }
}

/// Where the loop is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    AwaitingInput,
    MemoryPriming,
    ModelQuery,
    ToolDispatch,
    FinalAnswer,
    Exit,
}

/// The turn loop: owns the transcript and drives the completion client,
/// tool registry and memory store through one user turn at a time.
pub struct AgentLoop {
    options: AgentOptions,

    client: Arc<dyn CompletionClient>,

    tools: Arc<ToolRegistry>,

    /// Read directly during priming
    memory: Arc<dyn MemoryStore>,

    transcript: Transcript,

    state: AgentState,
}

impl AgentLoop {
    /// Create a loop whose transcript holds only the system prompt.
    pub fn new(
        options: AgentOptions,
        client: Arc<dyn CompletionClient>,
        tools: Arc<ToolRegistry>,
        memory: Arc<dyn MemoryStore>,
    ) -> Self {
        let transcript = Transcript::with_system_prompt(options.system_prompt.clone());
        Self {
            options,
            client,
            tools,
            memory,
            transcript,
            state: AgentState::AwaitingInput,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Enter the terminal state. Further turns are refused.
    pub fn finish(&mut self) {
        info!(turns = self.transcript.user_turns(), "Session finished");
        self.state = AgentState::Exit;
    }

    /// Run one user turn and return the assistant's answer.
    ///
    /// On error the transcript is rolled back to where it was before the
    /// turn started and the loop is ready for the next input.
    pub async fn respond(&mut self, input: &str) -> Result<String, Error> {
        if self.state == AgentState::Exit {
            return Err(Error::Internal("agent loop has exited".into()));
        }
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::Internal("empty user input".into()));
        }

        let checkpoint = self.transcript.len();
        info!(
            turn = self.transcript.user_turns() + 1,
            messages = checkpoint,
            "Processing user turn"
        );

        let result = self.run_turn(input).await;
        self.state = AgentState::AwaitingInput;

        match result {
            Ok(answer) => {
                if let Some(window) = self.options.history_window {
                    let dropped = self.transcript.retain_last_turns(window);
                    if dropped > 0 {
                        debug!(dropped, window, "Trimmed transcript to history window");
                    }
                }
                Ok(answer)
            }
            Err(e) => {
                warn!(error = %e, discarded = self.transcript.len() - checkpoint, "Turn failed, rolling back transcript");
                self.transcript.truncate(checkpoint);
                Err(e)
            }
        }
    }

    async fn run_turn(&mut self, input: &str) -> Result<String, Error> {
        self.transcript.push(Message::user(input));
        self.prime_memory().await?;

        self.state = AgentState::ModelQuery;
        let request = CompletionRequest::with_tools(
            self.options.model.clone(),
            self.transcript.messages().to_vec(),
            self.tools.definitions(),
        )
        .sampling(self.options.temperature, self.options.top_p);

        let response = self.client.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(model = %response.model, tokens = usage.total_tokens, "Model query complete");
        }

        let answer = if response.wants_tools() {
            self.state = AgentState::ToolDispatch;
            self.dispatch_tool_calls(response.message).await;

            let request = CompletionRequest::tool_free(
                self.options.model.clone(),
                self.transcript.messages().to_vec(),
            )
            .sampling(self.options.temperature, self.options.top_p);

            let follow_up = self.client.complete(request).await?;
            if follow_up.wants_tools() {
                warn!(
                    count = follow_up.message.tool_calls.len(),
                    "Ignoring tool calls in tool-free response"
                );
            }
            follow_up.message.content
        } else {
            response.message.content
        };

        self.state = AgentState::FinalAnswer;
        self.transcript.push(Message::assistant(answer.clone()));
        Ok(answer)
    }

    /// Append the assistant's tool-call turn, then one result per call in
    /// the order the model listed them.
    ///
    /// Call ids must stay unique within the transcript. An empty id, or one
    /// already used earlier in the transcript or in the same response, is
    /// replaced by a fresh one before anything is recorded.
    async fn dispatch_tool_calls(&mut self, mut message: Message) {
        let mut seen: Vec<String> = Vec::with_capacity(message.tool_calls.len());
        for call in message.tool_calls.iter_mut() {
            if call.id.is_empty() || seen.contains(&call.id) || self.transcript.has_tool_call_id(&call.id) {
                let fresh = self.fresh_call_id("call");
                warn!(tool = %call.name, call_id = %call.id, replacement = %fresh, "Replacing reused tool call id");
                call.id = fresh;
            }
            seen.push(call.id.clone());
        }

        let calls = message.tool_calls.clone();
        debug!(tool_count = calls.len(), "Executing tool calls");
        self.transcript.push(message);

        for call in &calls {
            let output = self.tools.dispatch(&ToolInvocation::from(call)).await;
            self.transcript.push(Message::tool_result(&call.id, output));
        }
    }

    /// A `<prefix>_<uuid>` call id not yet used in the transcript.
    fn fresh_call_id(&self, prefix: &str) -> String {
        loop {
            let id = format!("{prefix}_{}", Uuid::new_v4().simple());
            if !self.transcript.has_tool_call_id(&id) {
                return id;
            }
        }
    }

    /// Record the current memory log as a read_from_memory call/result pair.
    ///
    /// The pair is produced by the loop itself, never by the model. Its call
    /// id is fresh for every turn and both messages carry the priming marker.
    pub async fn prime_memory(&mut self) -> Result<(), Error> {
        self.state = AgentState::MemoryPriming;
        let content = self.memory.read_all().await?;

        let id = self.fresh_call_id("prime");

        debug!(call_id = %id, memory_bytes = content.len(), "Priming transcript with memory");
        let call = MessageToolCall {
            id: id.clone(),
            name: MEMORY_READ_TOOL.into(),
            arguments: "{}".into(),
        };
        self.transcript
            .push(Message::assistant_tool_calls("", vec![call]).mark_priming());
        self.transcript
            .push(Message::tool_result(id, content).mark_priming());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mnemo_core::completion::{CompletionResponse, Usage};
    use mnemo_core::error::{CompletionError, StorageError};
    use mnemo_core::memory::MEMORY_EMPTY;
    use mnemo_core::message::Role;
    use mnemo_memory::InMemoryStore;

    /// A mock client that returns a fixed response.
    struct MockClient {
        response: String,
    }

    #[async_trait]
    impl CompletionClient for MockClient {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, CompletionError> {
            Ok(CompletionResponse {
                message: Message::assistant(&self.response),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            })
        }
    }

    struct BrokenMemory;

    #[async_trait]
    impl MemoryStore for BrokenMemory {
        fn name(&self) -> &str {
            "broken"
        }
        async fn append(&self, _content: &str) -> Result<String, StorageError> {
            Err(StorageError::Io {
                path: "memory.txt".into(),
                reason: "read-only file system".into(),
            })
        }
        async fn read_all(&self) -> Result<String, StorageError> {
            Err(StorageError::Io {
                path: "memory.txt".into(),
                reason: "input/output error".into(),
            })
        }
    }

    fn agent_with(memory: Arc<dyn MemoryStore>) -> AgentLoop {
        AgentLoop::new(
            AgentOptions::new("mock-model"),
            Arc::new(MockClient {
                response: "Hello! How can I help?".into(),
            }),
            Arc::new(ToolRegistry::new()),
            memory,
        )
    }

    #[test]
    fn new_loop_holds_only_system_prompt() {
        let agent = agent_with(Arc::new(InMemoryStore::new()));
        assert_eq!(agent.state(), AgentState::AwaitingInput);
        assert_eq!(agent.transcript().len(), 1);
        assert_eq!(agent.transcript().messages()[0].role, Role::System);
    }

    #[tokio::test]
    async fn simple_text_response() {
        let mut agent = agent_with(Arc::new(InMemoryStore::new()));
        let response = agent.respond("Hello!").await.unwrap();
        assert_eq!(response, "Hello! How can I help?");
        // System + User + priming call + priming result + Assistant
        assert_eq!(agent.transcript().len(), 5);
        assert_eq!(agent.state(), AgentState::AwaitingInput);
    }

    #[tokio::test]
    async fn priming_pair_is_marked_and_correlated() {
        let mut agent = agent_with(Arc::new(InMemoryStore::new()));
        agent.respond("Hi").await.unwrap();

        let msgs = agent.transcript().messages();
        let call = &msgs[2];
        let result = &msgs[3];
        assert!(call.is_priming() && result.is_priming());
        assert_eq!(call.tool_calls.len(), 1);
        assert_eq!(call.tool_calls[0].name, "read_from_memory");
        assert!(call.tool_calls[0].id.starts_with("prime_"));
        assert_eq!(result.tool_call_id.as_deref(), Some(call.tool_calls[0].id.as_str()));
        assert_eq!(result.content, MEMORY_EMPTY);
        assert!(!msgs[4].is_priming());
    }

    #[tokio::test]
    async fn priming_ids_are_fresh_per_turn() {
        let mut agent = agent_with(Arc::new(InMemoryStore::new()));
        agent.respond("one").await.unwrap();
        agent.respond("two").await.unwrap();

        let ids: Vec<&str> = agent
            .transcript()
            .messages()
            .iter()
            .flat_map(|m| m.tool_calls.iter())
            .map(|tc| tc.id.as_str())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn storage_failure_rolls_back() {
        let mut agent = agent_with(Arc::new(BrokenMemory));
        let err = agent.respond("Hello").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(agent.transcript().len(), 1);
        assert_eq!(agent.state(), AgentState::AwaitingInput);
    }

    #[tokio::test]
    async fn blank_input_is_refused_without_side_effects() {
        let mut agent = agent_with(Arc::new(InMemoryStore::new()));
        assert!(agent.respond("   ").await.is_err());
        assert_eq!(agent.transcript().len(), 1);
    }

    #[tokio::test]
    async fn finished_loop_refuses_turns() {
        let mut agent = agent_with(Arc::new(InMemoryStore::new()));
        agent.finish();
        assert_eq!(agent.state(), AgentState::Exit);
        assert!(agent.respond("hello?").await.is_err());
        assert_eq!(agent.transcript().len(), 1);
    }

    #[tokio::test]
    async fn history_window_keeps_last_turns() {
        let mut agent = AgentLoop::new(
            AgentOptions::new("mock-model").with_history_window(2),
            Arc::new(MockClient { response: "ok".into() }),
            Arc::new(ToolRegistry::new()),
            Arc::new(InMemoryStore::new()),
        );
        for i in 0..5 {
            agent.respond(&format!("message {i}")).await.unwrap();
        }
        let t = agent.transcript();
        assert_eq!(t.user_turns(), 2);
        assert_eq!(t.len(), 1 + 2 * 4);
        assert_eq!(t.messages()[0].role, Role::System);
        assert_eq!(t.messages()[1].content, "message 3");
    }

    #[test]
    fn options_from_config_fill_topic() {
        let config = AppConfig::default();
        let opts = AgentOptions::from_config(&config);
        assert_eq!(opts.model, config.model);
        assert!(opts.system_prompt.contains("Kuršėnai"));
        assert!(!opts.system_prompt.contains("{topic}"));
        assert_eq!(opts.history_window, None);
    }

    #[test]
    fn configured_prompt_overrides_default() {
        let mut config = AppConfig::default();
        config.agent.system_prompt = Some("Be brief.".into());
        assert_eq!(AgentOptions::from_config(&config).system_prompt, "Be brief.");
    }
}
