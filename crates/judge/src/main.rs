use std::io::{self, BufWriter, Read, Write};

use anyhow::Context;
use clap::Parser;

mod problems;
mod scanner;

/// Runs one judge problem, reading the whole input from stdin.
#[derive(Parser, Debug, Clone, Copy)]
#[clap(version)]
enum Args {
    /// Point assign, range minimum (AOJ DSL_2_A).
    PointMin,
    /// Point add, range sum, 1-indexed (AOJ DSL_2_B).
    PointAddSum,
    /// Range add, range sum, 1-indexed (AOJ DSL_2_G).
    RangeAddSum,
    /// Range assign, range minimum (AOJ DSL_2_F).
    RangeAssignMin,
    /// Push back, random access, pop back (AOJ ITP2_1_A).
    Vector,
    /// Shift one element, range minimum, point assign (AOJ 1508).
    ShiftMin,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    log::debug!("{args:?}: {} bytes of input", input.len());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let solve: fn(&str, &mut dyn Write) -> anyhow::Result<()> = match args {
        Args::PointMin => problems::point_min,
        Args::PointAddSum => problems::point_add_sum,
        Args::RangeAddSum => problems::range_add_sum,
        Args::RangeAssignMin => problems::range_assign_min,
        Args::Vector => problems::vector,
        Args::ShiftMin => problems::shift_min,
    };
    solve(&input, &mut out)?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}
