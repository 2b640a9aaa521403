//! Print the OpenAPI document as JSON, or write it to a file.
//!
//! # Examples
//! ```sh
//! cargo run --manifest-path backend/Cargo.toml --bin openapi-dump -- --output openapi.json
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Render the Herdbook OpenAPI document",
    version
)]
struct CliArgs {
    /// Write the document here instead of standard output.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let document = herdbook::doc::openapi()
        .to_pretty_json()
        .wrap_err("serialise OpenAPI document")?;

    match args.output {
        Some(path) => fs::write(&path, document)
            .wrap_err_with(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{document}").wrap_err("write to stdout")?;
        }
    }
    Ok(())
}
