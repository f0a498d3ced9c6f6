use std::fmt;
use std::io::{self, Write};
use thiserror::Error;

use crate::platform::types::{AgentDefinition, AgentVersion, Conversation, Response, ToolDefinition};
use crate::platform::{AgentPlatform, FoundryError};
use crate::report::{ReportSummary, Reporter};

/// Everything needed to run one analysis against a registered agent.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub agent_name: String,
    pub model: String,
    pub instructions: String,
    pub prompt: String,
}

impl AnalysisRequest {
    pub fn agent_definition(&self) -> AgentDefinition {
        AgentDefinition::prompt(&self.model, &self.instructions)
            .with_tool(ToolDefinition::code_interpreter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RegisterAgent,
    OpenConversation,
    Dispatch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RegisterAgent => "Agent creation",
            Stage::OpenConversation => "Conversation creation",
            Stage::Dispatch => "Response request",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage} failed: {source}")]
    Remote {
        stage: Stage,
        #[source]
        source: FoundryError,
    },

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

impl PipelineError {
    fn remote(stage: Stage) -> impl FnOnce(FoundryError) -> Self {
        move |source| PipelineError::Remote { stage, source }
    }
}

/// Remote handles created during a run. Each slot is emptied when its resource is reclaimed.
#[derive(Debug, Default)]
pub struct Resources {
    pub agent: Option<AgentVersion>,
    pub conversation: Option<Conversation>,
}

/// Result of one deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reclaimed {
    NotCreated,
    Deleted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub conversation: Reclaimed,
    pub agent: Reclaimed,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub response: Option<Response>,
    pub summary: Option<ReportSummary>,
    pub error: Option<PipelineError>,
    pub cleanup: CleanupReport,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Register the agent, open a conversation, send the prompt, report the answer,
/// then reclaim whatever was created, whether or not the earlier steps succeeded.
pub async fn run<P, W>(
    platform: &P,
    request: &AnalysisRequest,
    reporter: &Reporter,
    out: &mut W,
) -> RunOutcome
where
    P: AgentPlatform + ?Sized,
    W: Write,
{
    let mut resources = Resources::default();
    let mut summary = None;

    let (response, error) = match execute(platform, request, &mut resources).await {
        Ok(response) => {
            let error = match reporter.report(&response, out) {
                Ok(s) => {
                    summary = Some(s);
                    None
                }
                Err(e) => Some(PipelineError::from(e)),
            };
            (Some(response), error)
        }
        Err(e) => (None, Some(e)),
    };

    if let Some(err) = &error {
        tracing::error!("{}", err);
        let _ = cliclack::log::error(format!("{}", err));
        for hint in crate::hints::hints_for(err) {
            let _ = cliclack::log::remark(format!("Hint: {}", hint));
        }
    }

    let cleanup = reclaim(platform, &mut resources).await;

    RunOutcome {
        response,
        summary,
        error,
        cleanup,
    }
}

async fn execute<P>(
    platform: &P,
    request: &AnalysisRequest,
    resources: &mut Resources,
) -> Result<Response, PipelineError>
where
    P: AgentPlatform + ?Sized,
{
    let _ = cliclack::log::step(format!("Creating agent '{}'...", request.agent_name));
    let agent = platform
        .create_agent(&request.agent_name, &request.agent_definition())
        .await
        .map_err(PipelineError::remote(Stage::RegisterAgent))?;
    tracing::info!(name = %agent.name, version = %agent.version, id = %agent.id, "Agent created");
    let _ = cliclack::log::success(format!(
        "Agent created (name: {}, version: {}, id: {})",
        agent.name, agent.version, agent.id
    ));
    let reference = agent.reference();
    resources.agent = Some(agent);

    let _ = cliclack::log::step("Creating conversation...");
    let conversation = platform
        .create_conversation()
        .await
        .map_err(PipelineError::remote(Stage::OpenConversation))?;
    tracing::info!(id = %conversation.id, "Conversation created");
    let _ = cliclack::log::success(format!("Conversation created (id: {})", conversation.id));

    let _ = cliclack::log::step("Sending analysis request; waiting for the agent to respond...");
    let conversation = resources.conversation.insert(conversation);
    let response = platform
        .create_response(conversation, &request.prompt, &reference)
        .await
        .map_err(PipelineError::remote(Stage::Dispatch))?;
    tracing::info!(id = ?response.id, items = response.output.len(), "Response received");
    let _ = cliclack::log::success("Response received");

    Ok(response)
}

/// Best-effort deletion of the conversation and the agent version.
/// Each attempt is independent and failures are logged, never returned.
pub async fn reclaim<P>(platform: &P, resources: &mut Resources) -> CleanupReport
where
    P: AgentPlatform + ?Sized,
{
    let _ = cliclack::log::step("Cleaning up...");

    let conversation = match resources.conversation.take() {
        None => Reclaimed::NotCreated,
        Some(conversation) => match platform.delete_conversation(&conversation).await {
            Ok(()) => {
                tracing::info!(id = %conversation.id, "Conversation deleted");
                let _ = cliclack::log::success(format!("Conversation {} deleted", conversation.id));
                Reclaimed::Deleted
            }
            Err(e) => {
                tracing::warn!(id = %conversation.id, "Failed to delete conversation: {}", e);
                let _ = cliclack::log::warning(format!("Could not delete conversation: {}", e));
                Reclaimed::Failed(e.to_string())
            }
        },
    };

    let agent = match resources.agent.take() {
        None => Reclaimed::NotCreated,
        Some(agent) => match platform.delete_agent(&agent).await {
            Ok(()) => {
                tracing::info!(
                    name = %agent.name,
                    version = %agent.version,
                    "Agent version deleted"
                );
                let _ = cliclack::log::success(format!(
                    "Agent {} version {} deleted",
                    agent.name, agent.version
                ));
                Reclaimed::Deleted
            }
            Err(e) => {
                tracing::warn!(
                    name = %agent.name,
                    version = %agent.version,
                    "Failed to delete agent: {}",
                    e
                );
                let _ = cliclack::log::warning(format!("Could not delete agent: {}", e));
                Reclaimed::Failed(e.to_string())
            }
        },
    };

    CleanupReport {
        conversation,
        agent,
    }
}
