//! Command-line driver: load the dataset and partition files, perform
//! one refinement step, write the new partition list back out.

use clap::Parser;
use colored::Colorize;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use gainsplit::{DataTable, Error, PartitionList, Refiner, Schema};

/// One greedy information-gain refinement step over a partitioned
/// categorical dataset.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Dataset file: a `<rows> <columns>` header, then one row of
    /// category codes per line; the last column is the target label.
    dataset: PathBuf,

    /// Current partition file: one partition per line, identifier first,
    /// then its 1-based row indices.
    in_partition: PathBuf,

    /// Where to write the refined partition list.
    out_partition: PathBuf,

    /// Print the refinement report as JSON instead of the plain line.
    #[arg(long)]
    json: bool,

    /// Skip the disjoint-cover validation of the input partitions.
    #[arg(long)]
    no_check: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "[ERR]".bold().red());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let table = {
        let file = File::open(&args.dataset)?;
        DataTable::from_reader(BufReader::new(file), Schema::default())?
    };
    let mut partitions = {
        let file = File::open(&args.in_partition)?;
        PartitionList::from_reader(BufReader::new(file), table.n_rows())?
    };
    if !args.no_check {
        partitions.check_cover(table.n_rows())?;
    }

    let report = Refiner::new(&table).refine(&mut partitions)?;

    let out = File::create(&args.out_partition)?;
    partitions.write_to(BufWriter::new(out))?;

    match (report, args.json) {
        (Some(report), true) => println!("{}", serde_json::to_string(&report)?),
        (Some(report), false) => {
            println!("{} {report}", "[SPLIT]".bold().green());
        }
        (None, true) => println!("null"),
        (None, false) => {
            println!(
                "{} no partition yields positive information gain; \
                partitions unchanged",
                "[NOOP]".bold().yellow(),
            );
        }
    }
    Ok(())
}
