use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use jobgraph::{Result, diagnostics, model, render, spec};

#[derive(Parser)]
#[command(name = "jobgraph")]
#[command(about = "Job graph serializer for multi-job stream applications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize a plan into its job graph JSON document.
    Json {
        #[arg(long)]
        plan: String,

        /// Write to this file instead of stdout.
        #[arg(short = 'o', long)]
        out: Option<String>,

        #[arg(long)]
        pretty: bool,
    },

    /// Serialize a plan and compare it with a stored document.
    Check {
        #[arg(long)]
        plan: String,

        #[arg(long)]
        expected: String,
    },

    /// Render a self-contained HTML view of a plan.
    Html {
        #[arg(long)]
        plan: String,

        #[arg(short = 'o', long)]
        out: String,
    },
}

fn load_doc(path: &str) -> Result<model::JobGraphDoc> {
    let text = std::fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read plan file {}", path)))?;
    let plan = spec::PlanSpec::from_json(&text)
        .and_then(|s| s.validate_and_build())
        .with_context(|| diagnostics::error_message(format!("load plan {}", path)))?;
    let doc = model::build_job_graph_doc(&plan)
        .with_context(|| diagnostics::error_message(format!("serialize plan {}", path)))?;
    Ok(doc)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Json { plan, out, pretty } => {
            let doc = load_doc(&plan)?;
            let json = render::to_json(&doc, pretty)?;
            match out {
                Some(out) => {
                    std::fs::write(&out, json)?;
                    println!("Wrote {}", out);
                }
                None => println!("{}", json),
            }
        }
        Commands::Check { plan, expected } => {
            let actual = serde_json::to_value(load_doc(&plan)?)?;
            let text = std::fs::read_to_string(&expected).with_context(|| {
                diagnostics::error_message(format!("read expected document {}", expected))
            })?;
            let expected_doc: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| diagnostics::error_message(format!("parse {}", expected)))?;

            let diffs = render::diff_sections(&actual, &expected_doc);
            if !diffs.is_empty() {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "{} differs from {} in: {}",
                        plan,
                        expected,
                        diffs.join(", ")
                    ))
                );
            }
            println!("{} matches {}", plan, expected);
        }
        Commands::Html { plan, out } => {
            let doc = load_doc(&plan)?;
            let html = render::render_html_report(&doc)?;
            std::fs::write(&out, html)?;
            println!("Wrote {}", out);
        }
    }

    Ok(())
}
