use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use super::base::AgentPlatform;
use super::errors::FoundryError;
use super::types::{AgentDefinition, AgentReference, AgentVersion, Conversation, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAgent,
    DeleteAgent,
    CreateConversation,
    DeleteConversation,
    CreateResponse,
}

/// A platform that records every call and fails the operations it is told to.
pub struct MockPlatform {
    response: Response,
    failing: HashSet<Operation>,
    calls: Mutex<Vec<Operation>>,
}

impl MockPlatform {
    pub fn new(response: Response) -> Self {
        Self {
            response,
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, operation: Operation) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls().iter().filter(|op| **op == operation).count()
    }

    fn record(&self, operation: Operation) -> Result<(), FoundryError> {
        self.calls.lock().unwrap().push(operation);
        if self.failing.contains(&operation) {
            let message = format!("{:?} rejected by mock", operation);
            return Err(match operation {
                Operation::CreateAgent => FoundryError::Validation(message),
                _ => FoundryError::Server {
                    status: 500,
                    message,
                },
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AgentPlatform for MockPlatform {
    async fn create_agent(
        &self,
        name: &str,
        _definition: &AgentDefinition,
    ) -> Result<AgentVersion, FoundryError> {
        self.record(Operation::CreateAgent)?;
        Ok(AgentVersion {
            id: format!("{}:1", name),
            name: name.to_string(),
            version: "1".to_string(),
        })
    }

    async fn delete_agent(&self, _agent: &AgentVersion) -> Result<(), FoundryError> {
        self.record(Operation::DeleteAgent)
    }

    async fn create_conversation(&self) -> Result<Conversation, FoundryError> {
        self.record(Operation::CreateConversation)?;
        Ok(Conversation {
            id: "conv_mock".to_string(),
        })
    }

    async fn delete_conversation(&self, _conversation: &Conversation) -> Result<(), FoundryError> {
        self.record(Operation::DeleteConversation)
    }

    async fn create_response(
        &self,
        _conversation: &Conversation,
        _input: &str,
        _agent: &AgentReference,
    ) -> Result<Response, FoundryError> {
        self.record(Operation::CreateResponse)?;
        Ok(self.response.clone())
    }
}
