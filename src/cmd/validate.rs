//! `multipart-relay validate` — check an endpoint list for errors.
//!
//! Validates the configuration that `run` would build from the same
//! flags, reporting results in either human-readable text or
//! machine-readable JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Config;
use crate::config::validation;
use crate::error::RelayError;

pub fn execute(args: &ValidateArgs) -> Result<(), RelayError> {
    let config = Config::from_urls(args.urls.iter().map(|u| u.trim()), args.timeout);

    if let Err(errors) = validation::validate(&config) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} configuration has {} errors\n", errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(RelayError::ConfigValidation { errors });
    }

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {}", validation::format_validation_report(&config));
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "config": config,
                })
            );
        }
    }

    Ok(())
}
