//! CLI for maze generation

use clap::Parser;
use itertools::Itertools;
use maze_carver::maze_builder::MazeBuilder;

/// Carve a perfect maze and print it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width in cells; even values are rounded up to odd
    #[arg(long, default_value_t = 1)]
    width: i64,

    /// Maze height in cells; even values are rounded up to odd
    #[arg(long, default_value_t = 1)]
    height: i64,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

/// Generate one maze, print to stdout
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let maze = MazeBuilder::new(args.width, args.height, args.seed)?.construct();
    let rows: Vec<Vec<char>> = maze.to_char_rows();
    println!("{}", rows.iter().map(|row| row.iter().join("")).join("\n"));
    Ok(())
}
