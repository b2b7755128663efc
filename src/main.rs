// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 The Ember Authors

//! `ember` - CLI driver for the Ember scripting engine.
//!
//! Runs a script file, or starts an interactive REPL when no script is
//! given (spec.md §6: out-of-scope "command-line driver", interface only).

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ember::error::EmberError;
use ember::vm::{InterpretResult, Vm};

/// Exit code conventions borrowed from BSD `sysexits.h`, matching the
/// reference interpreter's convention for a failed compile vs. a failed run.
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

/// Ember - a small bytecode-compiled scripting language.
#[derive(Parser, Debug)]
#[command(name = "ember")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bytecode compiler and VM for the Ember scripting language", long_about = None)]
struct Cli {
    /// Script to run. Starts an interactive REPL if omitted.
    script: Option<PathBuf>,

    /// Print each compiled chunk's disassembly before running it.
    #[arg(long)]
    dump: bool,

    /// Log every instruction the VM executes, with the value stack.
    #[arg(long)]
    trace: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.trace);

    let result = match &cli.script {
        Some(path) => run_file(path, cli.dump),
        None => {
            ember::repl::run();
            Ok(InterpretResult::Ok)
        }
    };

    match result {
        Ok(InterpretResult::Ok) => ExitCode::SUCCESS,
        Ok(InterpretResult::CompileError) => ExitCode::from(EX_DATAERR),
        Ok(InterpretResult::RuntimeError) => ExitCode::from(EX_SOFTWARE),
        Err(err) => {
            eprintln!("ember: {err}");
            ExitCode::from(EX_USAGE)
        }
    }
}

fn init_logging(verbose: bool, trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false).with_thread_names(false);

    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

fn run_file(path: &PathBuf, dump: bool) -> ember::error::Result<InterpretResult> {
    let source = fs::read_to_string(path).map_err(|source| EmberError::ReadScript {
        path: path.display().to_string(),
        source,
    })?;

    let mut vm = Vm::new();
    let Some(function) = vm.compile(&source) else {
        return Ok(InterpretResult::CompileError);
    };
    if dump {
        if let Some(f) = function.as_function() {
            print!("{}", ember::debug::disassemble_chunk(&f.chunk, f.display_name()));
        }
    }
    Ok(vm.run_function(function))
}
