use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;

use interpreter::{InterpretError, Interpreter};

/// Exit status for malformed source (lexical or syntax errors).
const EXIT_DATA_ERR: u8 = 65;
/// Exit status for a program that failed while running.
const EXIT_SOFTWARE: u8 = 70;

#[derive(clap::Parser)]
struct Args {
    /// Script to run. Starts an interactive prompt when omitted.
    file: Option<PathBuf>,

    /// Print the scanned tokens instead of running the script.
    #[arg(long)]
    tokens: bool,
}

fn run_file(path: PathBuf, interpreter: &mut Interpreter) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)?;
    match interpreter.run_source(&source, &mut stdout()) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{e}");
            match e {
                InterpretError::CompileError(_) => Ok(ExitCode::from(EXIT_DATA_ERR)),
                InterpretError::RuntimeError(_) => Ok(ExitCode::from(EXIT_SOFTWARE)),
                InterpretError::Output(e) => Err(e.into()),
            }
        }
    }
}

fn run_prompt(interpreter: &mut Interpreter) -> anyhow::Result<ExitCode> {
    loop {
        print!("> ");
        stdout().flush()?;
        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            println!();
            return Ok(ExitCode::SUCCESS);
        }
        // Errors are reported and the session goes on with its globals intact
        match interpreter.run_source(&line, &mut stdout()) {
            Ok(()) => (),
            Err(InterpretError::Output(e)) => return Err(e.into()),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn dump_tokens(path: PathBuf) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(path)?;
    let (tokens, errors) = scanner::scan_tokens(&source);

    let mut out = stdout().lock();
    for token in &tokens {
        writeln!(out, "{:?} {} {}", token.ty(), token.lexeme(), token.data)?;
    }
    for error in &errors {
        eprintln!("{error}");
    }

    Ok(if errors.is_empty() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_DATA_ERR) })
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let mut interpreter = Interpreter::new();

    match (args.file, args.tokens) {
        (Some(file), true) => dump_tokens(file),
        (Some(file), false) => run_file(file, &mut interpreter),
        (None, true) => anyhow::bail!("--tokens needs a script to scan"),
        (None, false) => run_prompt(&mut interpreter),
    }
}
