use async_trait::async_trait;

use super::client::{OpenAiClient, ProjectClient};
use super::errors::FoundryError;
use super::types::{AgentDefinition, AgentReference, AgentVersion, Conversation, Response};

/// Remote operations the analysis pipeline depends on.
#[async_trait]
pub trait AgentPlatform: Send + Sync {
    async fn create_agent(
        &self,
        name: &str,
        definition: &AgentDefinition,
    ) -> Result<AgentVersion, FoundryError>;

    async fn delete_agent(&self, agent: &AgentVersion) -> Result<(), FoundryError>;

    async fn create_conversation(&self) -> Result<Conversation, FoundryError>;

    async fn delete_conversation(&self, conversation: &Conversation) -> Result<(), FoundryError>;

    async fn create_response(
        &self,
        conversation: &Conversation,
        input: &str,
        agent: &AgentReference,
    ) -> Result<Response, FoundryError>;
}

/// The project client paired with the OpenAI-style client derived from it.
pub struct FoundryPlatform {
    project: ProjectClient,
    openai: OpenAiClient,
}

impl FoundryPlatform {
    pub fn new(project: ProjectClient) -> Self {
        let openai = project.openai_client();
        Self { project, openai }
    }
}

#[async_trait]
impl AgentPlatform for FoundryPlatform {
    async fn create_agent(
        &self,
        name: &str,
        definition: &AgentDefinition,
    ) -> Result<AgentVersion, FoundryError> {
        self.project.create_agent_version(name, definition).await
    }

    async fn delete_agent(&self, agent: &AgentVersion) -> Result<(), FoundryError> {
        self.project
            .delete_agent_version(&agent.name, &agent.version)
            .await
    }

    async fn create_conversation(&self) -> Result<Conversation, FoundryError> {
        self.openai.create_conversation().await
    }

    async fn delete_conversation(&self, conversation: &Conversation) -> Result<(), FoundryError> {
        self.openai.delete_conversation(&conversation.id).await
    }

    async fn create_response(
        &self,
        conversation: &Conversation,
        input: &str,
        agent: &AgentReference,
    ) -> Result<Response, FoundryError> {
        self.openai
            .create_response(&conversation.id, input, agent)
            .await
    }
}
