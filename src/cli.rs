//! Command line interface for the `chunkpost` binary.
//!
//! Provides offline access to the chunk codec: split a local file into chunk
//! blobs, or join chunk blobs back into the original file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line arguments for the `chunkpost` binary.
#[derive(Debug, Parser)]
#[command(
    name = "chunkpost",
    version,
    about = "Split files into upload-sized chunks and join them back"
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `chunkpost` binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a file into `.dlfc` chunk blobs.
    Split {
        /// File to split.
        input: PathBuf,
        /// Largest blob to emit, in bytes, header included.
        #[arg(short = 's', long, default_value_t = 10_000_000)]
        max_size: usize,
        /// Directory the blobs are written to.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Reassemble chunk blobs into the original file.
    Join {
        /// Chunk blobs, in any order.
        #[arg(required = true)]
        chunks: Vec<PathBuf>,
        /// Output path; defaults to the original name in the current
        /// directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn parses_split_options() {
        let cli = Cli::parse_from(["chunkpost", "split", "big.iso", "--max-size", "1024"]);
        let Command::Split {
            input,
            max_size,
            out_dir,
        } = cli.command
        else {
            panic!("expected split");
        };
        assert_eq!(input.to_str(), Some("big.iso"));
        assert_eq!(max_size, 1024);
        assert_eq!(out_dir.to_str(), Some("."));
    }

    #[test]
    fn join_requires_chunks() {
        assert!(Cli::try_parse_from(["chunkpost", "join"]).is_err());
        let cli = Cli::parse_from(["chunkpost", "join", "1-1_a.dlfc", "0-1_a.dlfc", "-o", "a"]);
        let Command::Join { chunks, output } = cli.command else {
            panic!("expected join");
        };
        assert_eq!(chunks.len(), 2);
        assert_eq!(output.and_then(|p| p.to_str().map(str::to_owned)).as_deref(), Some("a"));
    }
}
