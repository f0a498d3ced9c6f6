pub mod config;
pub mod data;
pub mod hints;
pub mod pipeline;
pub mod platform;
pub mod prompt_template;
pub mod report;
