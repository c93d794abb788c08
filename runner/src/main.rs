mod pipeline;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pipeline::Pipeline;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

/// Apply the patches of a pipeline file and print the resulting documents.
#[derive(Debug, Parser)]
#[command(name = "patchform", version)]
struct Args {
    /// Pipeline file (YAML, or JSON with a `.json` extension).
    #[arg(long, env = "PATCHFORM_INPUT")]
    input: PathBuf,

    #[arg(long, env = "PATCHFORM_OUTPUT", value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,

    /// Log filter directive, e.g. `info` or `patchform=debug`.
    #[arg(long, env = "PATCHFORM_LOG", default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&args.log).context("invalid log filter")?)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(fmt::format().compact().with_target(false)),
        )
        .init();

    let rendered = Pipeline::load(&args.input)?.run()?;
    let out = match args.output {
        OutputFormat::Json => serde_json::to_string_pretty(&rendered)?,
        OutputFormat::Yaml => serde_yaml::to_string(&rendered)?,
    };
    println!("{}", out.trim_end());
    Ok(())
}
