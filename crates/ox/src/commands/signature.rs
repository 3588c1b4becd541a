//! Signature command: show which pooled collection a query maps to.

use anyhow::Result;
use ox_core::QueryParams;
use ox_sdk::collections::signature;

use crate::cli::SignatureArgs;
use crate::config::Config;

/// Execute signature command.
pub fn execute(args: SignatureArgs, config: &Config) -> Result<()> {
    println!("{}", compute(&args, config));
    Ok(())
}

fn compute(args: &SignatureArgs, config: &Config) -> String {
    let params: QueryParams = args.params.iter().cloned().collect();
    let ignore = if args.ignore.is_empty() {
        &config.sdk.ignore_params
    } else {
        &args.ignore
    };
    signature(&params, ignore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ox_sdk::SDKConfig;
    use std::path::PathBuf;

    fn config() -> Config {
        Config {
            path: PathBuf::from("config.toml"),
            from_file: false,
            sdk: SDKConfig::default(),
        }
    }

    fn args(params: &[(&str, &str)], ignore: &[&str]) -> SignatureArgs {
        SignatureArgs {
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_configured_ignore_list() {
        let sig = compute(&args(&[("limit", "0,50"), ("folder", "1")], &[]), &config());
        assert_eq!(sig, "folder=1");
    }

    #[test]
    fn test_explicit_ignore_replaces_configured() {
        let sig = compute(
            &args(&[("limit", "0,50"), ("sort", "610"), ("folder", "1")], &["sort"]),
            &config(),
        );
        assert_eq!(sig, "folder=1&limit=0,50");
    }

    #[test]
    fn test_nothing_left_is_default() {
        assert_eq!(compute(&args(&[], &[]), &config()), "default");
    }
}
