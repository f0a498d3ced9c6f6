use crate::pipeline::{PipelineError, Stage};
use crate::platform::FoundryError;

const CREDENTIAL_HINT: &str = "Sign in with 'az login', or set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET for a service principal.";
const ACCESS_HINT: &str = "Check that your identity has the 'Azure AI User' role on the project.";
const NOT_FOUND_HINT: &str = "Check AZURE_AI_PROJECT_ENDPOINT and that AZURE_AI_MODEL_DEPLOYMENT_NAME names an existing deployment.";
const AGENT_CREATION_HINT: &str = "Check that the model deployment supports agents and the Code Interpreter tool in this region.";
const NETWORK_HINT: &str = "Check network connectivity to the project endpoint.";

/// Suggestions for the user, chosen from the error's type and the stage it came from.
pub fn hints_for(error: &PipelineError) -> Vec<&'static str> {
    let PipelineError::Remote { stage, source } = error else {
        return Vec::new();
    };

    let mut hints = Vec::new();
    match source {
        FoundryError::Credential(_) => hints.push(CREDENTIAL_HINT),
        FoundryError::Auth { .. } => {
            hints.push(ACCESS_HINT);
            hints.push(CREDENTIAL_HINT);
        }
        FoundryError::NotFound(_) => hints.push(NOT_FOUND_HINT),
        FoundryError::Network(e) if e.is_connect() || e.is_timeout() => hints.push(NETWORK_HINT),
        _ => {}
    }

    if *stage == Stage::RegisterAgent {
        hints.push(AGENT_CREATION_HINT);
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CredentialError;
    use std::io;

    fn remote(stage: Stage, source: FoundryError) -> PipelineError {
        PipelineError::Remote { stage, source }
    }

    #[test]
    fn test_credential_hint() {
        let err = remote(
            Stage::RegisterAgent,
            FoundryError::Credential(CredentialError::Unavailable("none".to_string())),
        );
        let hints = hints_for(&err);
        assert_eq!(hints, vec![CREDENTIAL_HINT, AGENT_CREATION_HINT]);
    }

    #[test]
    fn test_not_found_hint() {
        let err = remote(Stage::Dispatch, FoundryError::NotFound("deployment".to_string()));
        assert_eq!(hints_for(&err), vec![NOT_FOUND_HINT]);
    }

    #[test]
    fn test_auth_hint() {
        let err = remote(
            Stage::OpenConversation,
            FoundryError::Auth {
                status: 403,
                message: "denied".to_string(),
            },
        );
        assert_eq!(hints_for(&err), vec![ACCESS_HINT, CREDENTIAL_HINT]);
    }

    #[test]
    fn test_agent_creation_hint_for_other_errors() {
        let err = remote(
            Stage::RegisterAgent,
            FoundryError::Validation("tool not supported".to_string()),
        );
        assert_eq!(hints_for(&err), vec![AGENT_CREATION_HINT]);
    }

    #[test]
    fn test_no_hints_for_server_errors_after_setup() {
        let err = remote(
            Stage::Dispatch,
            FoundryError::Server {
                status: 500,
                message: "boom".to_string(),
            },
        );
        assert!(hints_for(&err).is_empty());
        let output = PipelineError::Output(io::Error::new(io::ErrorKind::Other, "closed"));
        assert!(hints_for(&output).is_empty());
    }
}
