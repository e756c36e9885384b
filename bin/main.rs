//! Builds a message from a TOML description and prints it.
//!
//! Nothing is sent; the output is the exact RFC 5322 text a transport would
//! receive.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use missive::MessageFile;
use missive_common::internal;

/// Preview a message described in a TOML file
#[derive(Parser, Debug)]
#[command(name = "missive")]
#[command(about = "Build a message from a TOML file and print it", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the message file (`[mailer]` and `[message]` tables)
    file: PathBuf,

    /// Only print the header block
    #[arg(long)]
    headers_only: bool,
}

fn main() -> anyhow::Result<()> {
    missive_common::logging::init();

    let cli = Cli::parse();

    let file = MessageFile::load(&cli.file)
        .with_context(|| format!("Unable to load {}", cli.file.display()))?;

    let mut email = file.message.into_email(&file.mailer)?;
    let message = email.build()?;

    internal!(
        level = INFO,
        message_id = ?message.message_id(),
        "Built message from {}",
        cli.file.display()
    );

    let rendered = message.to_rfc5322();
    if cli.headers_only {
        let headers = rendered
            .split_once("\r\n\r\n")
            .map_or(rendered.as_str(), |(headers, _)| headers);
        println!("{headers}");
    } else {
        print!("{rendered}");
    }

    Ok(())
}
