//! Godiag: extract Go positions from ASCII forum diagrams.
//!
//! ## Usage
//!
//! - `godiag demo` - Parse a built-in sample diagram and show its positions
//! - `godiag parse <FILE>` - Parse every diagram in a text file
//! - `godiag parse <FILE> --embed` - Also expand all boards to one size

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use godiag::fragment::Fragment;
use godiag::position_list::PositionList;

/// Godiag: turn ASCII Go diagrams into a de-duplicated position graph
#[derive(Parser)]
#[command(name = "godiag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every diagram in a file (diagrams separated by blank lines)
    Parse {
        file: PathBuf,
        /// Embed all fragments onto the largest board found
        #[arg(long)]
        embed: bool,
    },
    /// Parse a built-in sample diagram and print its positions
    Demo,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Parse { file, embed }) => run_parse(&file, embed),
        Some(Commands::Demo) | None => {
            run_demo();
            Ok(())
        }
    }
}

/// Split a file into diagram blocks: runs of non-blank lines.
fn diagram_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn run_parse(file: &Path, embed: bool) -> anyhow::Result<()> {
    let text =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;

    let mut positions = PositionList::new();
    let mut fragments = Vec::new();
    for block in diagram_blocks(&text) {
        match Fragment::parse(&block, &mut positions) {
            Ok(fragment) => fragments.push(fragment),
            Err(error) => log::warn!("skipping diagram: {error}\n{block}"),
        }
    }

    if embed {
        fragments = Fragment::embed_all(fragments, &mut positions);
    }

    for (index, fragment) in fragments.iter().enumerate() {
        println!(
            "#{index}: {}x{} board, {} stones, {} moves, {} dropped rows",
            fragment.board_width,
            fragment.board_height,
            fragment.stones.len(),
            fragment.moves.len(),
            fragment.diagnostics.len(),
        );
    }
    println!(
        "{} diagrams, {} distinct positions (largest has {} stones)",
        fragments.len(),
        positions.len(),
        positions.largest_position(),
    );
    Ok(())
}

fn run_demo() {
    println!("Godiag: ASCII Go diagram extraction\n");

    let text = "\
$$B A one-stone capture
$$ +-------+
$$ | . X . |
$$ | X O X |
$$ | . 1 . |
$$ +-------+";

    println!("=== Diagram ===");
    println!("{text}\n");

    let mut positions = PositionList::new();
    let fragment = match Fragment::parse(text, &mut positions) {
        Ok(fragment) => fragment,
        Err(error) => {
            eprintln!("parse failed: {error}");
            return;
        }
    };

    println!("=== Fragment ===");
    println!(
        "{}x{} board, first player {}, borders {:?}",
        fragment.board_width,
        fragment.board_height,
        fragment.first_player.letter(),
        fragment.borders,
    );

    println!("\n=== Positions ===");
    for (index, &child) in fragment.children.iter().enumerate() {
        let position = positions.get(child);
        println!("child {index} ({} stones):", position.number_stones());
        println!("{position}");
    }
}
