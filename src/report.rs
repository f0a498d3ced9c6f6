use bat::PrettyPrinter;
use console::style;
use std::io::{self, Write};

use crate::platform::types::{CodeInterpreterCall, CodeInterpreterOutput, OutputItem, Response};

const NOT_AVAILABLE: &str = "N/A";
const RULE_WIDTH: usize = 60;

/// What the reporter saw while walking a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportSummary {
    pub items: usize,
    pub code_interpreter_calls: usize,
}

impl ReportSummary {
    pub fn code_interpreter_used(&self) -> bool {
        self.code_interpreter_calls > 0
    }
}

/// Prints a response: the answer text, each output item, and token usage.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    /// Render the answer as highlighted markdown on stdout instead of writing it plainly.
    markdown: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    pub fn report<W: Write>(&self, response: &Response, out: &mut W) -> io::Result<ReportSummary> {
        banner(out, "AGENT RESPONSE")?;
        writeln!(out, "Response ID: {}", or_na(response.id.as_deref()))?;
        writeln!(out, "Model: {}", or_na(response.model.as_deref()))?;

        section(out, "Answer")?;
        let text = response.output_text();
        if text.trim().is_empty() {
            writeln!(out, "{}", style("(no text output)").dim())?;
        } else if self.markdown {
            out.flush()?;
            render_markdown(&text)?;
        } else {
            writeln!(out, "{}", text.trim_end())?;
        }

        section(out, &format!("Output items ({})", response.output.len()))?;
        let mut summary = ReportSummary {
            items: response.output.len(),
            ..Default::default()
        };
        for (index, item) in response.output.iter().enumerate() {
            writeln!(out, "[{}] {}", index + 1, style(item.kind()).bold())?;
            match item {
                OutputItem::Message(message) => {
                    writeln!(out, "    Message ID: {}", or_na(message.id.as_deref()))?;
                    writeln!(out, "    Role: {}", or_na(message.role.as_deref()))?;
                }
                OutputItem::CodeInterpreterCall(call) => {
                    if call.has_code() {
                        summary.code_interpreter_calls += 1;
                    }
                    write_tool_call(out, call)?;
                }
                OutputItem::Other { raw, .. } => {
                    let id = raw.get("id").and_then(|v| v.as_str());
                    writeln!(out, "    ID: {}", or_na(id))?;
                }
            }
        }

        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        if summary.code_interpreter_used() {
            writeln!(
                out,
                "{} Code Interpreter was used ({} call{})",
                style("✓").green(),
                summary.code_interpreter_calls,
                if summary.code_interpreter_calls == 1 { "" } else { "s" }
            )?;
        } else {
            writeln!(out, "{} Code Interpreter was not used", style("ℹ").yellow())?;
        }

        if let Some(usage) = &response.usage {
            writeln!(
                out,
                "Token usage: input {}, output {}, total {}",
                number_or_na(usage.input_tokens),
                number_or_na(usage.output_tokens),
                number_or_na(usage.total()),
            )?;
        }

        Ok(summary)
    }
}

fn write_tool_call<W: Write>(out: &mut W, call: &CodeInterpreterCall) -> io::Result<()> {
    writeln!(out, "    Call ID: {}", or_na(call.id.as_deref()))?;
    writeln!(out, "    Container ID: {}", or_na(call.container_id.as_deref()))?;
    if let Some(status) = &call.status {
        writeln!(out, "    Status: {}", status)?;
    }

    match call.code.as_deref().filter(|code| !code.trim().is_empty()) {
        Some(code) => {
            writeln!(out, "    Code:")?;
            writeln!(out, "    ```python")?;
            for line in code.lines() {
                writeln!(out, "    {}", line)?;
            }
            writeln!(out, "    ```")?;
        }
        None => writeln!(out, "    Code: {}", NOT_AVAILABLE)?,
    }

    for output in call.outputs.iter().flatten() {
        match output {
            CodeInterpreterOutput::Logs { logs: Some(logs) } => {
                writeln!(out, "    Logs:")?;
                for line in logs.lines() {
                    writeln!(out, "      {}", line)?;
                }
            }
            CodeInterpreterOutput::Logs { logs: None } => {
                writeln!(out, "    Logs: {}", NOT_AVAILABLE)?
            }
            CodeInterpreterOutput::Image { url } => {
                writeln!(out, "    Image: {}", or_na(url.as_deref()))?
            }
            CodeInterpreterOutput::Other => {}
        }
    }
    Ok(())
}

fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", style(title).bold())?;
    writeln!(out, "{}", rule)
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(format!("--- {} ---", title)).cyan())
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

fn number_or_na(value: Option<i64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn render_markdown(content: &str) -> io::Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map(|_| ())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::types::{MessageContent, MessageItem, Usage};
    use serde_json::json;

    fn message(text: &str) -> OutputItem {
        OutputItem::Message(MessageItem {
            id: Some("msg_1".to_string()),
            role: Some("assistant".to_string()),
            content: vec![MessageContent::OutputText {
                text: Some(text.to_string()),
                annotations: vec![],
            }],
        })
    }

    fn render(response: &Response) -> (String, ReportSummary) {
        let mut out = Vec::new();
        let summary = Reporter::new().report(response, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_report_with_code_interpreter_call() {
        let response = Response::new(
            "resp_1",
            vec![
                OutputItem::CodeInterpreterCall(CodeInterpreterCall {
                    id: Some("ci_1".to_string()),
                    container_id: Some("cntr_1".to_string()),
                    code: Some("import pandas as pd\nprint(df['Profit'].sum())".to_string()),
                    status: Some("completed".to_string()),
                    outputs: Some(vec![CodeInterpreterOutput::Logs {
                        logs: Some("105000".to_string()),
                    }]),
                }),
                message("Total profit was 105,000."),
            ],
        )
        .with_model("gpt-4o")
        .with_usage(Usage::new(Some(300), Some(80)));

        let (output, summary) = render(&response);

        assert_eq!(summary.code_interpreter_calls, 1);
        assert_eq!(summary.items, 2);
        assert!(output.contains("Response ID: resp_1"));
        assert!(output.contains("Model: gpt-4o"));
        assert!(output.contains("Total profit was 105,000."));
        assert!(output.contains("Call ID: ci_1"));
        assert!(output.contains("Container ID: cntr_1"));
        assert!(output.contains("    import pandas as pd\n    print(df['Profit'].sum())"));
        assert!(output.contains("105000"));
        assert!(output.contains("Code Interpreter was used (1 call)"));
        assert!(output.contains("Token usage: input 300, output 80, total 380"));
    }

    #[test]
    fn test_report_without_tool_call() {
        let response = Response::new("resp_2", vec![message("Sales grew steadily.")]);

        let (output, summary) = render(&response);

        assert!(!summary.code_interpreter_used());
        assert!(output.contains("Code Interpreter was not used"));
        assert!(!output.contains("Code Interpreter was used"));
        assert!(output.contains("Model: N/A"));
        assert!(!output.contains("Token usage"));
    }

    #[test]
    fn test_missing_fields_fall_back_to_placeholder() {
        let response = Response::new(
            "resp_3",
            vec![OutputItem::CodeInterpreterCall(CodeInterpreterCall::default())],
        );

        let (output, summary) = render(&response);

        assert!(output.contains("Call ID: N/A"));
        assert!(output.contains("Container ID: N/A"));
        assert!(output.contains("Code: N/A"));
        assert!(output.contains("(no text output)"));
        assert!(output.contains("Code Interpreter was not used"));
        assert_eq!(summary.code_interpreter_calls, 0);
    }

    #[test]
    fn test_unknown_items_are_listed() {
        let response = Response::new(
            "resp_4",
            vec![OutputItem::Other {
                kind: "reasoning".to_string(),
                raw: json!({"type": "reasoning", "id": "rs_1"}),
            }],
        );

        let (output, _) = render(&response);

        assert!(output.contains("Output items (1)"));
        assert!(output.contains("reasoning"));
        assert!(output.contains("ID: rs_1"));
    }

    #[test]
    fn test_sparse_wire_response_is_reported() {
        let response: Response = serde_json::from_value(json!({
            "output": [
                {
                    "type": "code_interpreter_call",
                    "code": "print(df.sum())",
                    "outputs": [{"type": "logs", "logs": null}, {"type": "image"}]
                },
                {"type": "message", "content": [{"type": "output_text"}]}
            ]
        }))
        .unwrap();

        let (output, summary) = render(&response);

        assert!(output.contains("Response ID: N/A"));
        assert!(output.contains("Logs: N/A"));
        assert!(output.contains("Image: N/A"));
        assert!(output.contains("(no text output)"));
        assert_eq!(summary.code_interpreter_calls, 1);
    }
}
