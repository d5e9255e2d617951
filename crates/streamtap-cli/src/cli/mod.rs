//! CLI for streamtap.

mod commands;
mod render;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use streamtap_core::config::{self, StreamtapConfig};
use streamtap_core::ProgressOptions;

use commands::{run_completions, run_copy, run_fetch, run_pipe};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "streamtap")]
#[command(about = "streamtap: progress and throughput for pipes, files and downloads", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub report: ReportArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Reporting flags shared by every transfer command. Unset values come from config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// Minimum milliseconds between progress updates.
    #[arg(long, global = true, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Throughput averaging window in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub window: Option<u32>,

    /// Keep reading input after the output side closes.
    #[arg(long, global = true)]
    pub drain: bool,

    /// Print one JSON object per snapshot on stderr instead of a progress line.
    #[arg(long, global = true)]
    pub json: bool,
}

impl ReportArgs {
    /// Stream options from config, with any flags given on the command line applied on top.
    pub fn options(&self, cfg: &StreamtapConfig) -> ProgressOptions {
        let mut opts = cfg.to_options();
        if let Some(ms) = self.interval_ms {
            opts = opts.time(ms);
        }
        if let Some(secs) = self.window {
            opts = opts.speed(secs);
        }
        if self.drain {
            opts = opts.drain(true);
        }
        opts
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Copy stdin to stdout, reporting progress on stderr.
    Pipe {
        /// Expected total (bytes, or lines with --lines).
        #[arg(long, value_name = "N")]
        length: Option<u64>,

        /// Count lines instead of bytes.
        #[arg(long)]
        lines: bool,
    },

    /// Copy a file; the total comes from the source file size.
    Copy {
        /// Source file.
        src: PathBuf,
        /// Destination file (created or truncated).
        dst: PathBuf,
    },

    /// Download a URL; the total comes from Content-Length.
    Fetch {
        /// HTTP/HTTPS URL.
        url: String,

        /// Write the body here. Without it the body is read and discarded.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Extra request header, "Name: value". Repeatable.
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let opts = cli.report.options(&cfg);
        let json = cli.report.json;

        match cli.command {
            CliCommand::Pipe { length, lines } => {
                run_pipe(opts, cfg.chunk_size, length, lines, json)?
            }
            CliCommand::Copy { src, dst } => run_copy(opts, cfg.chunk_size, &src, &dst, json)?,
            CliCommand::Fetch {
                url,
                output,
                headers,
            } => {
                let mut http = cfg.http_options();
                http.headers = commands::parse_header_args(&headers)?;
                run_fetch(opts, &http, &url, output.as_deref(), json)?
            }
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
