//! Docforge command-line interface
//!
//! Renders documents from structure, content and data JSON files on disk,
//! and reports which form fields a data record makes visible.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docforge_engine::OutputFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "docforge")]
#[command(version, about = "Template-driven document assembly")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a document and write it as DOCX or HTML
    Render {
        /// Structure skeleton JSON
        #[arg(long)]
        structure: PathBuf,

        /// Content library JSON
        #[arg(long)]
        content: Option<PathBuf>,

        /// Data record JSON
        #[arg(long)]
        data: Option<PathBuf>,

        /// Form schema JSON; when given the record is validated first
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Output format: docx or html
        #[arg(short, long, default_value = "docx")]
        format: OutputFormat,

        /// Output file; HTML goes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document title used for the HTML page
        #[arg(long)]
        title: Option<String>,

        /// Exit with an error if any warning was produced
        #[arg(long)]
        strict: bool,
    },

    /// Print the ids of the form fields visible for a data record
    Visible {
        #[arg(long)]
        schema: PathBuf,

        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Check a data record against its form schema
    Validate {
        #[arg(long)]
        schema: PathBuf,

        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout may carry the rendered document, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Render {
            structure,
            content,
            data,
            schema,
            format,
            output,
            title,
            strict,
        } => {
            let request = commands::load_request(
                &structure,
                content.as_deref(),
                data.as_deref(),
                schema.as_deref(),
                format,
                title,
            )?;
            commands::render(request, output.as_deref(), strict)
        }
        Command::Visible { schema, data } => {
            let (schema, data) = commands::load_form(&schema, data.as_deref())?;
            for id in commands::visible(&schema, &data) {
                println!("{}", id);
            }
            Ok(())
        }
        Command::Validate { schema, data } => {
            let (schema, data) = commands::load_form(&schema, data.as_deref())?;
            commands::check(&schema, &data)
        }
    }
}
