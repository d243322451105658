//! `chunkpost` binary: split and join chunk blobs on the local file system.

mod cli;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chunkpost::{ChunkName, UploadSplitter, reassemble};
use clap::Parser;
use cli::{Cli, Command};

fn main() -> chunkpost::Result<()> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Split {
            input,
            max_size,
            out_dir,
        } => split(&input, max_size, &out_dir),
        Command::Join { chunks, output } => join(&chunks, output),
    }
}

fn split(input: &Path, max_size: usize, out_dir: &Path) -> chunkpost::Result<()> {
    let data = fs::read(input)?;
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let set = UploadSplitter::new(max_size)?.split(&file_name, &data)?;
    fs::create_dir_all(out_dir)?;
    for blob in set.blobs() {
        fs::write(out_dir.join(blob.name()), blob.bytes())?;
    }
    tracing::info!(chunks = set.len(), file = %file_name, "split complete");
    Ok(())
}

fn join(chunks: &[PathBuf], output: Option<PathBuf>) -> chunkpost::Result<()> {
    let buffers = chunks.iter().map(fs::read).collect::<Result<Vec<_>, _>>()?;
    let data = reassemble(&buffers)?;
    let output = output.unwrap_or_else(|| {
        chunks
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .find_map(ChunkName::parse)
            .and_then(|name| Path::new(name.original()).file_name().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("joined"))
    });
    fs::write(&output, &data)?;
    tracing::info!(bytes = data.len(), output = %output.display(), "join complete");
    Ok(())
}
