//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::TemplateDefinition;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::setup::{build_runner, runtime_config};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<TemplateSummary>,
}

#[derive(Serialize)]
struct TemplateSummary {
    version: String,
    source_count: usize,
    sink_count: usize,
    parameter_count: usize,
}

impl ValidationResult {
    fn invalid(template: String, error: impl ToString) -> Self {
        Self {
            valid: false,
            template,
            error: Some(error.to_string()),
            warnings: Vec::new(),
            summary: None,
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let config = runtime_config(&args.template)?;
    let runner = build_runner(&args.template)?;
    info!(template = %config.template_name, "Validating template");

    let template = config.template_name.clone();
    let result = match runner.registry().get_template_by_name(&template) {
        Err(e) => ValidationResult::invalid(template, e),
        Ok(definition) => match runner.compiler().compile(&definition, &config) {
            Err(e) => ValidationResult::invalid(template, e),
            Ok(_) => ValidationResult {
                valid: true,
                template,
                error: None,
                warnings: collect_warnings(&definition),
                summary: Some(TemplateSummary {
                    version: format!("{:?}", definition.version),
                    source_count: definition.sources.len(),
                    sink_count: definition.sinks.len(),
                    parameter_count: definition.parameters.len(),
                }),
            },
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Template validation failed")
    }
}

/// Non-fatal issues: compiles, but will not behave as the author likely meant
fn collect_warnings(definition: &TemplateDefinition) -> Vec<String> {
    let mut warnings = Vec::new();

    for sink in &definition.sinks {
        let referenced = definition
            .sources
            .iter()
            .any(|source| source.sink_names.contains(&sink.name));
        if !referenced {
            warnings.push(format!("Sink '{}' is not referenced by any source", sink.name));
        }
    }

    for source in &definition.sources {
        if source.sink_names.is_empty() {
            warnings.push(format!(
                "Source '{}' has no sinks and will fail at run time",
                source.name
            ));
        }
        if source.processes.is_some() || source.concurrency.is_some() {
            warnings.push(format!(
                "Source '{}' sets processes/concurrency; execution is sequential and ignores them",
                source.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Template is valid: {}", result.template);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Parameters: {}", summary.parameter_count);
            println!("  Sources: {}", summary.source_count);
            println!("  Sinks: {}", summary.sink_count);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Template is invalid: {}", result.template);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
