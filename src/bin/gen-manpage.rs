//! Man page generator for flashsniff
//!
//! Writes `flashsniff.1` plus one page per subcommand
//! (`flashsniff-decode.1`, `flashsniff-opcodes.1`).
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn render(cmd: clap::Command, output_dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).title(name).render(&mut buffer)?;

    let output_path = output_dir.join(format!("{}.1", name));
    fs::write(&output_path, buffer)?;
    Ok(output_path)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    let main_page = render(cmd.clone(), &output_dir, "flashsniff")?;
    println!("Man page generated at: {}", main_page.display());

    for sub in cmd.get_subcommands() {
        let name = format!("flashsniff-{}", sub.get_name());
        let path = render(sub.clone(), &output_dir, &name)?;
        println!("Man page generated at: {}", path.display());
    }

    println!("\nTo view the man page:");
    println!("  man -l {}", main_page.display());

    Ok(())
}
