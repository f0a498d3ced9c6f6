use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

use crate::data::SalesData;

const INSTRUCTIONS_TEMPLATE: &str = include_str!("prompts/instructions.md");
const ANALYSIS_TEMPLATE: &str = include_str!("prompts/analysis.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

#[derive(Serialize)]
struct AnalysisContext<'a> {
    csv: &'a str,
    row_count: usize,
    columns: &'a [String],
}

/// Standing instructions registered with the agent.
pub fn agent_instructions() -> String {
    INSTRUCTIONS_TEMPLATE.trim().to_string()
}

/// The single prompt sent to the agent: questions plus the CSV embedded verbatim.
pub fn analysis_prompt(data: &SalesData) -> Result<String, TeraError> {
    load_prompt(
        ANALYSIS_TEMPLATE,
        &AnalysisContext {
            csv: &data.text,
            row_count: data.row_count,
            columns: &data.columns,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn sample() -> SalesData {
        SalesData {
            path: PathBuf::from("sales_data.csv"),
            text: "Month,Sales,Expenses,Profit\nJanuary,12000,8000,4000\n".to_string(),
            columns: vec![
                "Month".to_string(),
                "Sales".to_string(),
                "Expenses".to_string(),
                "Profit".to_string(),
            ],
            row_count: 1,
        }
    }

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You have {{ count }} rows.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "analyst".to_string());
        context.insert("count".to_string(), 12.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, analyst! You have 12 rows.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You have {{ count }} rows.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "analyst".to_string());

        assert!(load_prompt(template, &context).is_err());
    }

    #[test]
    fn test_analysis_prompt_embeds_csv_verbatim() {
        let prompt = analysis_prompt(&sample()).unwrap();

        assert!(prompt.contains("Month,Sales,Expenses,Profit\nJanuary,12000,8000,4000"));
        assert!(prompt.contains("1 rows, columns: Month, Sales, Expenses, Profit"));
        assert!(prompt.contains("```csv"));
        assert!(prompt.contains("total profit"));
    }

    #[test]
    fn test_agent_instructions_mention_code_interpreter() {
        let instructions = agent_instructions();
        assert!(instructions.contains("Code Interpreter"));
        assert!(!instructions.ends_with('\n'));
    }
}
