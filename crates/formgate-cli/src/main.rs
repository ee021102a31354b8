//! formgate CLI - check form manifests and validate submitted values.

#![allow(
    clippy::needless_pass_by_value,
    clippy::uninlined_format_args,
    clippy::unwrap_used,
    clippy::doc_markdown
)]

use clap::{Parser, Subcommand, ValueEnum};
use formgate_core::{FormValidator, TestRegistry, ValidationReport};
use formgate_yaml::{FormManifest, FormValues};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formgate")]
#[command(about = "Declarative form validation from YAML manifests")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check form manifest validity
    Check {
        /// Path to manifest file
        #[arg(default_value = "form.yaml")]
        manifest: PathBuf,
    },

    /// Validate submitted values against a manifest
    Validate {
        /// Path to manifest file
        manifest: PathBuf,

        /// YAML or JSON file mapping field names to values
        #[arg(short = 'i', long)]
        values: PathBuf,

        /// Only validate fields of this group
        #[arg(short, long)]
        group: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// List the built-in tests
    Tests,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("formgate_core=debug,formgate_yaml=debug,formgate_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { manifest } => {
            check_manifest(&manifest);
        }
        Commands::Validate {
            manifest,
            values,
            group,
            format,
        } => {
            validate_values(&manifest, &values, group.as_deref(), format);
        }
        Commands::Tests => {
            list_tests();
        }
    }
}

fn read_manifest(path: &Path) -> Result<FormManifest, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read manifest: {}", e))?;
    FormManifest::load(&content).map_err(|e| format!("Manifest invalid: {}", e))
}

fn read_values(path: &Path) -> Result<FormValues, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read values: {}", e))?;
    formgate_yaml::parse_values(&content).map_err(|e| format!("Values invalid: {}", e))
}

fn check_manifest(path: &Path) {
    println!("Checking manifest: {}", path.display());

    match read_manifest(path) {
        Ok(manifest) => print!("{}", summarize(&manifest)),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn summarize(manifest: &FormManifest) -> String {
    let groups: BTreeSet<&str> = manifest
        .fields
        .iter()
        .filter_map(|f| f.group.as_deref())
        .collect();
    let tests: usize = manifest.fields.iter().map(|f| f.tests.len()).sum();

    let mut out = String::from("Manifest valid!\n");
    out.push_str(&format!("  Fields: {}\n", manifest.fields.len()));
    out.push_str(&format!("  Tests: {}\n", tests));
    if !groups.is_empty() {
        let groups: Vec<&str> = groups.into_iter().collect();
        out.push_str(&format!("  Groups: {}\n", groups.join(", ")));
    }
    out.push_str(&format!(
        "  Strict tests: {}\n",
        if manifest.settings.strict_tests { "yes" } else { "no" }
    ));
    out
}

fn validate_values(manifest: &Path, values: &Path, group: Option<&str>, format: Format) {
    tracing::debug!(manifest = %manifest.display(), values = %values.display(), "validating");
    let result = read_manifest(manifest).and_then(|manifest| {
        let values = read_values(values)?;
        manifest
            .build(&values)
            .map_err(|e| format!("Cannot build form: {}", e))
    });
    let report = match result.and_then(|mut validator| run_validation(&mut validator, group)) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    match render_report(&report, format) {
        Ok(out) => print!("{}", out),
        Err(e) => {
            eprintln!("Failed to render report: {}", e);
            std::process::exit(1);
        }
    }

    if !report.all_valid {
        std::process::exit(1);
    }
}

/// Validate the whole form, or one group. For a group run `all_valid`
/// reflects only the fields of that group, and a group no field belongs to
/// is an error.
fn run_validation(
    validator: &mut FormValidator,
    group: Option<&str>,
) -> Result<ValidationReport, String> {
    let Some(group) = group else {
        validator.validate_all();
        return Ok(validator.report());
    };
    if !validator.fields().iter().any(|f| f.group() == Some(group)) {
        return Err(format!("Unknown group: {}", group));
    }

    validator.validate_by_group(Some(group));
    let mut report = validator.report();
    report.fields.retain(|f| f.group.as_deref() == Some(group));
    report.all_valid = report.fields.iter().all(|f| f.valid);
    Ok(report)
}

fn render_report(report: &ValidationReport, format: Format) -> Result<String, String> {
    match format {
        Format::Json => report
            .to_json()
            .map(|json| format!("{}\n", json))
            .map_err(|e| e.to_string()),
        Format::Text => {
            let mut out = String::new();
            for field in &report.fields {
                let mark = if field.valid { "ok  " } else { "FAIL" };
                out.push_str(&format!("{} {}\n", mark, field.key));
                for message in &field.messages {
                    out.push_str(&format!("       {}\n", message));
                }
            }
            let invalid = report.invalid_fields().count();
            if invalid == 0 {
                out.push_str("\nAll fields valid\n");
            } else {
                out.push_str(&format!(
                    "\n{} of {} fields invalid\n",
                    invalid,
                    report.fields.len()
                ));
            }
            Ok(out)
        }
    }
}

fn list_tests() {
    let registry = TestRegistry::builtin();
    println!("Built-in tests ({}):", registry.len());
    for name in registry.names() {
        println!("  {}", name);
    }
}
