//! The name↔agent binding store.

use std::collections::HashMap;

use agora_types::{AgentId, AgoraError, Result};

/// What a successful registration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The caller already held exactly this name. Nothing changed.
    Unchanged,
    /// The name is now bound to the caller. If the caller previously held
    /// a different name, it was released first and is carried here.
    Registered { released: Option<String> },
}

/// Bidirectional name↔agent registry.
///
/// Both maps are mutated together inside [`register`](Self::register), so
/// no observer ever sees an agent with two names or a name with two
/// agents.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    name_to_agent: HashMap<String, AgentId>,
    agent_to_name: HashMap<AgentId, String>,
}

impl AgentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `caller`.
    ///
    /// # Errors
    /// - [`AgoraError::EmptyAgentName`] for an empty name
    /// - [`AgoraError::NameTaken`] if the name is bound to another agent
    pub fn register(&mut self, caller: AgentId, name: &str) -> Result<RegistrationOutcome> {
        if name.is_empty() {
            return Err(AgoraError::EmptyAgentName);
        }
        match self.name_to_agent.get(name) {
            Some(holder) if *holder == caller => return Ok(RegistrationOutcome::Unchanged),
            Some(_) => {
                return Err(AgoraError::NameTaken {
                    name: name.to_string(),
                });
            }
            None => {}
        }

        // Release the caller's previous name before claiming the new one,
        // keeping the two maps consistent at every step.
        let released = self.agent_to_name.remove(&caller);
        if let Some(old) = &released {
            self.name_to_agent.remove(old);
            tracing::debug!(agent = %caller.short(), released = %old, "released previous name");
        }

        self.name_to_agent.insert(name.to_string(), caller);
        self.agent_to_name.insert(caller, name.to_string());
        Ok(RegistrationOutcome::Registered { released })
    }

    /// The agent a name resolves to, if any.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<AgentId> {
        self.name_to_agent.get(name).copied()
    }

    /// The name an agent holds, if any.
    #[must_use]
    pub fn name_of(&self, agent: &AgentId) -> Option<&str> {
        self.agent_to_name.get(agent).map(String::as_str)
    }

    /// Number of live bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.name_to_agent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_to_agent.is_empty()
    }
}
