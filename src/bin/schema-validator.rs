//! # SCIM Schema Validator
//!
//! Checks host-supplied SCIM schema documents before they are handed to the
//! provider through `SchemaSource::Directory`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin schema-validator schemas/User.json
//! cargo run --bin schema-validator schemas/User.json schemas/Group.json
//! cargo run --bin schema-validator ./schemas/
//! ```
//!
//! Each file is parsed into the schema model, its attributes are listed with
//! their characteristics, and combinations the provider treats oddly are
//! reported as warnings (a `required` attribute that clients cannot write, a
//! complex attribute without sub-attributes, and so on). A directory has
//! every `.json` file checked, then is loaded as a whole the way the provider
//! loads it (`User.json`, `Group.json`, optional `EnterpriseUser.json`).
//!
//! ```text
//! schemas/User.json
//!   ✓ User (urn:ietf:params:scim:schemas:core:2.0:User), 15 attributes
//!
//!   userName        string     immutable  default  server  required
//!   name            complex    readWrite  default  none
//!     givenName     string     readWrite  default  none
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: every document loaded (warnings allowed)
//! - `1`: a document or the directory as a whole failed to load

use scim_provider::schema::{
    AttributeDefinition, AttributeType, Mutability, Returned, Schema, SchemaRegistry, Uniqueness,
};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Outcome of checking one document.
struct Report {
    path: PathBuf,
    outcome: Result<Schema, String>,
    warnings: Vec<String>,
}

impl Report {
    fn check(path: &Path) -> Self {
        let outcome = load_schema(path);
        let warnings = match &outcome {
            Ok(schema) => lint(&schema.attributes),
            Err(_) => Vec::new(),
        };
        Self {
            path: path.to_path_buf(),
            outcome,
            warnings,
        }
    }

    fn print(&self, verbose: bool) {
        println!("{}", self.path.display());
        match &self.outcome {
            Ok(schema) => {
                println!(
                    "  ✓ {} ({}), {} attributes",
                    schema.name,
                    schema.id,
                    schema.attributes.len()
                );
                for warning in &self.warnings {
                    println!("  ! {}", warning);
                }
                if verbose {
                    println!();
                    for attr in &schema.attributes {
                        print_attribute(attr, 1);
                    }
                }
            }
            Err(e) => eprintln!("  ❌ {}", e),
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <schema-file-or-directory>...", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} schemas/User.json", args[0]);
        eprintln!("  {} ./schemas/", args[0]);
        process::exit(1);
    }

    let mut failed = false;
    for arg in &args[1..] {
        let path = Path::new(arg);
        let ok = if path.is_dir() {
            check_directory(path)
        } else if path.is_file() {
            let report = Report::check(path);
            report.print(true);
            report.outcome.is_ok()
        } else {
            eprintln!("{}: not a file or directory", path.display());
            false
        };
        failed |= !ok;
    }

    if failed {
        process::exit(1);
    }
}

fn check_directory(dir: &Path) -> bool {
    let paths = match json_files(dir) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{}: {}", dir.display(), e);
            return false;
        }
    };

    let reports: Vec<Report> = paths.iter().map(|path| Report::check(path)).collect();
    for report in &reports {
        report.print(false);
    }
    let invalid = reports.iter().filter(|r| r.outcome.is_err()).count();
    let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();
    println!(
        "\n{} documents, {} invalid, {} warnings",
        reports.len(),
        invalid,
        warnings
    );
    if invalid > 0 {
        return false;
    }

    match SchemaRegistry::from_schema_dir(dir) {
        Ok(registry) => {
            println!("✓ Loads as a provider schema directory");
            for resource_type in registry.resource_types() {
                let extensions: Vec<&str> = resource_type
                    .extensions
                    .iter()
                    .map(|ext| ext.schema.id.as_str())
                    .collect();
                println!(
                    "    /{} -> {}{}",
                    resource_type.kind.endpoint(),
                    resource_type.schema.id,
                    if extensions.is_empty() {
                        String::new()
                    } else {
                        format!(" + {}", extensions.join(", "))
                    }
                );
            }
            true
        }
        Err(e) => {
            eprintln!("❌ Not usable as a provider schema directory: {}", e);
            false
        }
    }
}

fn json_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn load_schema(path: &Path) -> Result<Schema, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;

    // Name the missing member before serde's less helpful message does.
    let document: Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    let Some(object) = document.as_object() else {
        return Err("document is not a JSON object".to_string());
    };
    let missing: Vec<&str> = ["id", "name", "attributes"]
        .into_iter()
        .filter(|member| !object.contains_key(*member))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing members: {}", missing.join(", ")));
    }

    SchemaRegistry::load_schema_from_str(&content).map_err(|e| e.to_string())
}

/// Characteristic combinations that load but rarely mean what was intended.
fn lint(attributes: &[AttributeDefinition]) -> Vec<String> {
    let mut warnings = Vec::new();
    for attr in attributes {
        let path = if attr.path.is_empty() { &attr.name } else { &attr.path };
        if attr.required && attr.mutability == Mutability::ReadOnly {
            warnings.push(format!("{} is required but readOnly", path));
        }
        if attr.returned == Returned::Never && attr.mutability == Mutability::ReadOnly {
            warnings.push(format!("{} is readOnly and never returned", path));
        }
        if attr.data_type == AttributeType::Complex && attr.sub_attributes.is_empty() {
            warnings.push(format!("{} is complex without sub-attributes", path));
        }
        if attr.data_type != AttributeType::Complex && !attr.sub_attributes.is_empty() {
            warnings.push(format!("{} has sub-attributes but is {}", path, attr.data_type));
        }
        if attr.uniqueness != Uniqueness::None && (attr.multi_valued || !attr.sub_attributes.is_empty()) {
            // the provider only enforces uniqueness on single-valued simple attributes
            warnings.push(format!("uniqueness on {} is not enforced", path));
        }
        warnings.extend(lint(&attr.sub_attributes));
    }
    warnings
}

fn print_attribute(attr: &AttributeDefinition, depth: usize) {
    let name = format!("{}{}", "  ".repeat(depth), attr.name);
    let mut flags = Vec::new();
    if attr.required {
        flags.push("required");
    }
    if attr.multi_valued {
        flags.push("multi-valued");
    }
    if attr.case_exact {
        flags.push("caseExact");
    }

    println!(
        "{:<18} {:<10} {:<10} {:<8} {:<7} {}",
        name,
        attr.data_type.to_string(),
        label(&attr.mutability),
        label(&attr.returned),
        label(&attr.uniqueness),
        flags.join(" ")
    );
    for sub in &attr.sub_attributes {
        print_attribute(sub, depth + 1);
    }
}

/// The characteristic as written in schema documents.
fn label<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(label)) => label,
        _ => String::from("?"),
    }
}
