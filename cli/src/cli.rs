//! Command-line surface: one positional file, rendered document on stdout

use std::io::{self, Write};
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use pyc_decoder::render::xml;
use pyc_decoder::Decoder;
use tracing::debug;

/// Dump a compiled-bytecode container as an annotated XML tree
#[derive(Parser, Debug)]
#[command(name = "pycdump", version, about)]
pub struct Cli {
    /// Container file to decode
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

/// Runs a parsed command line against a decoder
pub struct CliHandler {
    decoder: Decoder,
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CliHandler {
    pub fn new() -> Self {
        Self {
            decoder: Decoder::default(),
        }
    }

    /// Decode the file named on the command line and write the document to stdout
    pub fn handle(&self, cli: Cli) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.handle_to(cli, &mut out)
    }

    /// Decode and render into `out`; nothing is written if decoding fails
    pub fn handle_to<W: Write>(&self, cli: Cli, out: &mut W) -> Result<()> {
        let module = self
            .decoder
            .decode_file(&cli.path)
            .with_context(|| format!("failed to decode {}", cli.path.display()))?;
        debug!(version = %module.version, "rendering document");

        out.write_all(xml::render(&module).as_bytes())
            .context("failed to write document")?;
        out.flush().context("failed to write document")?;
        Ok(())
    }
}
