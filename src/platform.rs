pub mod base;
pub mod client;
pub mod credential;
pub mod errors;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use base::{AgentPlatform, FoundryPlatform};
pub use client::{OpenAiClient, ProjectClient, ProjectClientConfig};
pub use credential::{CredentialError, CredentialSource, DefaultCredential};
pub use errors::FoundryError;
