//! CLI smoke entry point.
//!
//! # Responsibility
//! - Run the canonical derived-field scenario end-to-end against an
//!   in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use calcfield_core::db::open_db_in_memory;
use calcfield_core::{Pair, PairPlan, PairRepository, SqlitePairRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("calcfield: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (a, b) = match args.as_slice() {
        [] => (3, 2),
        [raw_a, raw_b] => (
            Pair::parse_operand("a", raw_a).map_err(|err| err.to_string())?,
            Pair::parse_operand("b", raw_b).map_err(|err| err.to_string())?,
        ),
        _ => return Err("usage: calcfield_cli [<a> <b>]".to_string()),
    };

    let conn = open_db_in_memory().map_err(|err| err.to_string())?;
    let repo =
        SqlitePairRepository::try_new(&conn, PairPlan::full()).map_err(|err| err.to_string())?;

    let mut pair = Pair::new(repo.plan(), a, b);
    println!("before save: {:?}", pair.stored_values());

    repo.save_pair(&mut pair).map_err(|err| err.to_string())?;

    let saved = repo
        .find_first_pair()
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "saved pair not found".to_string())?;

    println!("sum={}", saved.sum().map_err(|err| err.to_string())?);
    println!("product={}", saved.product().map_err(|err| err.to_string())?);
    println!(
        "dividend={}",
        saved.dividend().map_err(|err| err.to_string())?
    );
    println!(
        "exponent={}",
        saved.exponent().map_err(|err| err.to_string())?
    );

    Ok(())
}
