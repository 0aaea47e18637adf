// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command-line interface for formula evaluation
//!
//! Evaluates formulas against a JSON document, or checks their syntax.

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use octo_formula::model::json::to_json;
use octo_formula::{EngineConfig, FormulaEngine, FormulaError, JsonContext};

#[derive(Parser)]
#[command(name = "octo-formula")]
#[command(about = "Evaluate formulas against a JSON document")]
#[command(version)]
struct Cli {
    /// JSON file with engine configuration
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula
    Evaluate {
        /// Formula to evaluate
        expression: String,
        /// JSON file providing the variables ("-" reads stdin)
        #[arg(long)]
        vars: Option<String>,
        /// Fail on host errors and unknown results
        #[arg(long)]
        strict: bool,
        /// Walk the tree instead of compiling it
        #[arg(long)]
        no_compile: bool,
        /// Print the per-node evaluation trace
        #[arg(long)]
        dump: bool,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Parse a formula and describe it
    Parse {
        /// Formula to parse
        expression: String,
        /// Print only the normalized formula
        #[arg(short, long)]
        quiet: bool,
    },
    /// Check formula syntax
    Validate {
        /// Formula to validate
        expression: String,
        /// Suppress informational messages
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match cli.config.as_deref().map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Evaluate {
            expression,
            vars,
            strict,
            no_compile,
            dump,
            pretty,
        } => {
            let config = EngineConfig {
                strict: config.strict || strict,
                allow_compilation: config.allow_compilation && !no_compile,
                ..config
            };
            handle_evaluate(&expression, vars.as_deref(), config, dump, pretty);
        }
        Commands::Parse { expression, quiet } => handle_parse(&expression, config, quiet),
        Commands::Validate { expression, quiet } => handle_validate(&expression, config, quiet),
    }
}

fn load_config(path: &str) -> anyhow::Result<EngineConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read '{path}'"))?;
    serde_json::from_str(&text).with_context(|| format!("invalid configuration in '{path}'"))
}

fn load_context(vars: Option<&str>) -> anyhow::Result<JsonContext> {
    let text = match vars {
        None => return Ok(JsonContext::default()),
        Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("cannot read stdin")?;
            buffer
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("cannot read '{path}'"))?,
    };
    JsonContext::from_json_str(&text).context("variables must be a JSON document")
}

fn handle_evaluate(
    expression: &str,
    vars: Option<&str>,
    config: EngineConfig,
    dump: bool,
    pretty: bool,
) {
    let ctx = match load_context(vars) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading variables: {e:#}");
            process::exit(1);
        }
    };

    let engine = FormulaEngine::new().with_config(config);
    let tree = match engine.parse(expression) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Error parsing formula: {e}");
            process::exit(1);
        }
    };

    let result = engine.calc(&tree, &ctx);
    if dump {
        eprint!("{}", tree.dump("  ", "\n"));
    }

    match result {
        Ok(value) => {
            let json = to_json(&value);
            let output = if pretty {
                serde_json::to_string_pretty(&json)
            } else {
                serde_json::to_string(&json)
            };
            println!("{}", output.unwrap_or_else(|_| value.to_string()));
        }
        Err(FormulaError::UnknownResult { .. }) => {
            eprintln!("Formula evaluated to unknown");
            process::exit(2);
        }
        Err(e) => {
            eprintln!("Error evaluating formula: {e}");
            process::exit(1);
        }
    }
}

fn handle_parse(expression: &str, config: EngineConfig, quiet: bool) {
    let engine = FormulaEngine::new().with_config(config);
    match engine.parse(expression) {
        Ok(tree) => {
            if quiet {
                println!("{tree}");
                return;
            }
            let references = tree.references();
            println!("✓ Formula parsed successfully");
            println!("Normalized: {tree}");
            println!("Depth: {}", tree.depth());
            println!("Compiled: {}", tree.is_compiled());
            for (label, names) in [
                ("Variables", &references.variables),
                ("Members", &references.members),
                ("Functions", &references.functions),
                ("Methods", &references.methods),
                ("Precompiled", &references.precompiled),
            ] {
                if !names.is_empty() {
                    let names: Vec<&str> = names.iter().map(String::as_str).collect();
                    println!("{label}: {}", names.join(", "));
                }
            }
            println!("Tree: {tree:#?}");
        }
        Err(e) => {
            eprintln!("✗ Parse error: {e}");
            process::exit(1);
        }
    }
}

fn handle_validate(expression: &str, config: EngineConfig, quiet: bool) {
    let engine = FormulaEngine::new().with_config(config.with_compilation(false));
    match engine.parse(expression) {
        Ok(_) => {
            if !quiet {
                println!("✓ Formula is valid");
                println!("Formula: {expression}");
            } else {
                println!("VALID");
            }
        }
        Err(e) => {
            if !quiet {
                eprintln!("✗ Invalid formula: {e}");
                eprintln!("Formula: {expression}");
            } else {
                eprintln!("INVALID");
            }
            process::exit(1);
        }
    }
}
