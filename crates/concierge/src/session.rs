use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use concierge_core::{Agent, AgentBuilder, Dialogue};
use concierge_model::ModelProvider;
use concierge_openai_model::OpenAIProvider;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::Instrument;

use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::deals::DealsClient;
use crate::tools::*;

/// How many exchanges a session keeps for display.
pub const DISPLAY_LOG_CAPACITY: usize = 5;

const DEFAULT_SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// Errors returned by [`Sessions::chat`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The message is empty.
    #[error("missing message")]
    MissingMessage,
    /// The session id is empty.
    #[error("missing session id")]
    MissingSession,
}

/// One user message and the reply to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Exchange {
    /// What the user said.
    pub user: String,
    /// What the assistant replied.
    pub bot: String,
}

/// A session builder.
///
/// See [`Session`] and [`Sessions`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    system_prompt: Option<String>,
    catalog: Option<CatalogClient>,
    deals: Option<DealsClient>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self {
            agent_builder,
            system_prompt: None,
            catalog: None,
            deals: None,
        }
    }

    /// Creates a session builder with everything the configuration
    /// describes: the model provider, both clients and the limits.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = OpenAIProvider::new(config.openai_config());
        Self::with_model_provider(provider)
            .with_catalog(CatalogClient::new(config.catalog.clone()))
            .with_deals(DealsClient::new(config.deals.clone()))
            .with_history_capacity(config.history_capacity)
            .with_max_tool_rounds(config.max_tool_rounds)
    }

    /// Replaces the built-in system prompt.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Enables the hotel search and rate plan tools.
    #[inline]
    pub fn with_catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Enables the deal search tool.
    #[inline]
    pub fn with_deals(mut self, deals: DealsClient) -> Self {
        self.deals = Some(deals);
        self
    }

    /// Sets how many turns the model sees.
    #[inline]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.agent_builder = self.agent_builder.with_history_capacity(capacity);
        self
    }

    /// Sets how many tool rounds one message may take.
    #[inline]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_tool_rounds(rounds);
        self
    }

    /// Builds the session registry.
    pub fn build(self) -> Sessions {
        let system_prompt = self
            .system_prompt
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_owned());
        let mut agent_builder = self
            .agent_builder
            .with_system_prompt(system_prompt)
            .with_tool(CurrentDateTool::new());
        if let Some(catalog) = self.catalog {
            agent_builder = agent_builder
                .with_tool(SearchHotelsTool::new(catalog.clone()))
                .with_tool(RatePlansTool::new(catalog));
        }
        if let Some(deals) = self.deals {
            agent_builder = agent_builder.with_tool(SearchDealsTool::new(deals));
        }

        Sessions {
            agent: Arc::new(agent_builder.build()),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

struct SessionState {
    dialogue: Dialogue,
    log: VecDeque<Exchange>,
}

/// One user's conversation: its dialogue context and the exchanges shown
/// back to them.
///
/// Messages of one session are handled one at a time, start to finish.
/// Sessions never share entities or turns with each other.
pub struct Session {
    id: String,
    agent: Arc<Agent>,
    state: AsyncMutex<SessionState>,
}

impl Session {
    /// Returns the session id.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sends a message to the session and waits for the reply.
    pub async fn send_message(&self, message: &str) -> String {
        let mut state = self.state.lock().await;
        let SessionState { dialogue, log } = &mut *state;

        let reply = self
            .agent
            .handle(dialogue, message)
            .instrument(info_span!("session", id = %self.id))
            .await;

        log.push_back(Exchange {
            user: message.to_owned(),
            bot: reply.clone(),
        });
        while log.len() > DISPLAY_LOG_CAPACITY {
            log.pop_front();
        }
        reply
    }

    /// Returns the most recent exchanges, oldest first.
    pub async fn history(&self) -> Vec<Exchange> {
        self.state.lock().await.log.iter().cloned().collect()
    }
}

/// A registry of sessions keyed by a caller-supplied id.
pub struct Sessions {
    agent: Arc<Agent>,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl Sessions {
    /// Returns the session with the given id, creating it if needed.
    pub fn session(&self, id: &str) -> Arc<Session> {
        let mut sessions =
            self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.entry(id.to_owned()).or_insert_with(|| {
            debug!("new session: {id}");
            Arc::new(Session {
                id: id.to_owned(),
                agent: Arc::clone(&self.agent),
                state: AsyncMutex::new(SessionState {
                    dialogue: self.agent.new_dialogue(),
                    log: VecDeque::with_capacity(DISPLAY_LOG_CAPACITY + 1),
                }),
            })
        });
        Arc::clone(session)
    }

    /// Handles a message of a session and returns the reply.
    pub async fn chat(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::MissingMessage);
        }
        if session_id.trim().is_empty() {
            return Err(ChatError::MissingSession);
        }
        let session = self.session(session_id);
        Ok(session.send_message(message).await)
    }

    /// Returns the display log of a session, empty for unknown sessions.
    pub async fn history(&self, session_id: &str) -> Vec<Exchange> {
        let session = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned();
        match session {
            Some(session) => session.history().await,
            None => vec![],
        }
    }

    /// Returns the number of sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no session exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
