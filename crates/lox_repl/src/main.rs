use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use log::info;

use lox_interpreter::{builtin, evaluator::DEFAULT_MAX_DEPTH, sink::Stdout, Evaluator};

mod repl;

// sysexits.h codes for bad input data and internal failures
const EXIT_SYNTAX_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;

/// A tree-walking interpreter for Lox. Runs FILE if given, otherwise starts a REPL.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run instead of starting the REPL.
    file: Option<PathBuf>,

    /// How deeply function calls may nest before the program is stopped.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match args.file {
        Some(path) => process::exit(run_file(&path, args.max_depth)),
        None => repl::repl(args.max_depth),
    }
}

/// Run a whole script, returning the process exit code.
fn run_file(path: &Path, max_depth: usize) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read the input file '{}': {}", path.display(), err);
            return 1;
        }
    };

    let prog = match lox_parser::parse(&source) {
        Ok(prog) => prog,
        Err(errors) => {
            repl::print_syntax_errors(&errors);
            return EXIT_SYNTAX_ERROR;
        }
    };
    info!("parsed {} declaration(s) from {}", prog.statements.len(), path.display());

    let mut stdout = Stdout;
    let mut evaluator = Evaluator::new(&mut stdout).with_max_depth(max_depth);
    evaluator.define_builtin(builtin::record());
    evaluator.define_builtin(builtin::clock());

    match evaluator.eval(&prog) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {}", err);
            EXIT_RUNTIME_ERROR
        }
    }
}
