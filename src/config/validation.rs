use super::models::Config;
use crate::humanize::ByteSize;
use thiserror::Error;

/// Hard ceiling for `server.max_payload_bytes`; request bodies are tiny JSON objects
const PAYLOAD_LIMIT_CEILING: ByteSize = ByteSize::mib(1);

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("downloader.program must not be empty")]
    EmptyProgram,

    #[error("workspace.root must not be empty")]
    EmptyWorkspaceRoot,

    #[error("server.max_payload_bytes must be positive")]
    ZeroPayloadLimit,

    #[error("server.max_payload_bytes ({actual}) exceeds limit of {limit}")]
    PayloadLimitTooLarge { actual: ByteSize, limit: ByteSize },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_downloader(config)?;
    validate_workspace(config)?;
    validate_payload_limit(config)?;
    Ok(())
}

fn validate_downloader(config: &Config) -> Result<(), ValidationError> {
    if config.downloader.program.trim().is_empty() {
        return Err(ValidationError::EmptyProgram);
    }
    Ok(())
}

fn validate_workspace(config: &Config) -> Result<(), ValidationError> {
    if config.workspace.root.as_os_str().is_empty() {
        return Err(ValidationError::EmptyWorkspaceRoot);
    }
    Ok(())
}

fn validate_payload_limit(config: &Config) -> Result<(), ValidationError> {
    let actual = config.server.max_payload_bytes;
    if actual.as_u64() == 0 {
        return Err(ValidationError::ZeroPayloadLimit);
    }
    if actual > PAYLOAD_LIMIT_CEILING {
        return Err(ValidationError::PayloadLimitTooLarge {
            actual,
            limit: PAYLOAD_LIMIT_CEILING,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_blank_program() {
        let mut config = Config::default();
        config.downloader.program = "  ".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyProgram)));
    }

    #[test]
    fn test_empty_workspace_root() {
        let mut config = Config::default();
        config.workspace.root = PathBuf::new();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyWorkspaceRoot)));
    }

    #[test]
    fn test_payload_limit_bounds() {
        let mut config = Config::default();
        config.server.max_payload_bytes = ByteSize(0);
        assert!(matches!(
            validate(&config),
            Err(ValidationError::ZeroPayloadLimit)
        ));

        config.server.max_payload_bytes = ByteSize::mib(2);
        assert!(matches!(
            validate(&config),
            Err(ValidationError::PayloadLimitTooLarge { .. })
        ));
    }

    #[test]
    fn test_huge_payload_limit_is_reported() {
        let mut config = Config::default();
        config.server.max_payload_bytes = "16000000TB".parse().unwrap();

        let err = validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "server.max_payload_bytes (16000000TB) exceeds limit of 1MB"
        );
    }
}
