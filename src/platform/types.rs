pub mod agent;
pub mod response;

pub use agent::{
    AgentDefinition, AgentReference, AgentVersion, ContainerSpec, Conversation,
    CreateAgentVersionRequest, CreateResponseRequest, ToolDefinition,
};
pub use response::{
    CodeInterpreterCall, CodeInterpreterOutput, MessageContent, MessageItem, OutputItem, Response,
    Usage,
};
