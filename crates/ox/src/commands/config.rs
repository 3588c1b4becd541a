//! Config command: print the effective configuration.

use anyhow::{Context, Result};
use colored::Colorize;
use ox_sdk::SDKConfig;

use crate::config::Config;

/// Execute config command.
pub fn execute(json: bool, config: &Config) -> Result<()> {
    let sdk = masked(&config.sdk);

    if json {
        println!("{}", serde_json::to_string_pretty(&sdk)?);
        return Ok(());
    }

    let source = if config.from_file {
        config.path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", config.path.display())
    };
    println!("{} {}", "#".dimmed(), source.dimmed());
    print!(
        "{}",
        toml::to_string_pretty(&sdk).context("Failed to serialize config")?
    );
    Ok(())
}

/// Copy with the session id hidden.
fn masked(sdk: &SDKConfig) -> SDKConfig {
    let mut sdk = sdk.clone();
    if sdk.session.is_some() {
        sdk.session = Some("********".to_string());
    }
    sdk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_masked() {
        let sdk = SDKConfig::default().with_session("secret");
        assert_eq!(masked(&sdk).session.as_deref(), Some("********"));
        assert_eq!(masked(&SDKConfig::default()).session, None);
    }
}
