use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: Option<i64>,
    #[serde(default)]
    pub output_tokens: Option<i64>,
    #[serde(default)]
    pub total_tokens: Option<i64>,
}

impl Usage {
    pub fn new(input_tokens: Option<i64>, output_tokens: Option<i64>) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: None,
        }
    }

    pub fn total(&self) -> Option<i64> {
        self.total_tokens
            .or_else(|| match (self.input_tokens, self.output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    OutputText {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        annotations: Vec<Value>,
    },
    Refusal {
        #[serde(default)]
        refusal: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MessageItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl MessageItem {
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| match content {
                MessageContent::OutputText { text, .. } => text.as_deref(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CodeInterpreterOutput {
    Logs {
        #[serde(default)]
        logs: Option<String>,
    },
    Image {
        #[serde(default)]
        url: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// A tool invocation record: code the platform ran in its sandbox.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CodeInterpreterCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub outputs: Option<Vec<CodeInterpreterOutput>>,
}

impl CodeInterpreterCall {
    pub fn has_code(&self) -> bool {
        self.code.as_deref().is_some_and(|code| !code.trim().is_empty())
    }
}

/// One entry of a response's `output` list, keyed by its `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    Message(MessageItem),
    CodeInterpreterCall(CodeInterpreterCall),
    Other { kind: String, raw: Value },
}

impl OutputItem {
    pub fn kind(&self) -> &str {
        match self {
            OutputItem::Message(_) => "message",
            OutputItem::CodeInterpreterCall(_) => "code_interpreter_call",
            OutputItem::Other { kind, .. } => kind,
        }
    }
}

impl<'de> Deserialize<'de> for OutputItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let parsed = match kind.as_str() {
            "message" => serde_json::from_value(value.clone()).map(OutputItem::Message),
            "code_interpreter_call" => {
                serde_json::from_value(value.clone()).map(OutputItem::CodeInterpreterCall)
            }
            _ => return Ok(OutputItem::Other { kind, raw: value }),
        };

        // A malformed item is kept raw so the rest of the response still reports
        Ok(parsed.unwrap_or_else(|err| {
            tracing::warn!(kind = %kind, error = %err, "Keeping unparseable output item as raw");
            OutputItem::Other { kind, raw: value }
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, rename = "output_text")]
    rendered_text: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl Response {
    pub fn new(id: impl Into<String>, output: Vec<OutputItem>) -> Self {
        Self {
            id: Some(id.into()),
            output,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Text of every `output_text` part, in order. Prefers the server-rendered value.
    pub fn output_text(&self) -> String {
        if let Some(text) = &self.rendered_text {
            return text.clone();
        }
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) => Some(message.text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn code_interpreter_calls(&self) -> Vec<&CodeInterpreterCall> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::CodeInterpreterCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}
