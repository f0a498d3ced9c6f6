use serde::{Deserialize, Serialize};

/// Where Code Interpreter runs its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContainerSpec {
    Auto {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        file_ids: Vec<String>,
    },
}

/// A tool capability declared on an agent definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    CodeInterpreter {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container: Option<ContainerSpec>,
    },
}

impl ToolDefinition {
    pub fn code_interpreter() -> Self {
        ToolDefinition::CodeInterpreter {
            container: Some(ContainerSpec::Auto {
                file_ids: Vec::new(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub kind: String,
    pub model: String,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

impl AgentDefinition {
    pub fn prompt(model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            kind: "prompt".to_string(),
            model: model.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentVersionRequest<'a> {
    pub definition: &'a AgentDefinition,
}

/// Handle to one registered version of a named agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentVersion {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub version: String,
}

impl AgentVersion {
    pub fn reference(&self) -> AgentReference {
        AgentReference::new(&self.name)
    }
}

/// Request-time pointer to a registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReference {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl AgentReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "agent_reference".to_string(),
        }
    }
}

/// Handle to a remote conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateResponseRequest<'a> {
    pub conversation: &'a str,
    pub input: &'a str,
    pub agent: &'a AgentReference,
}
