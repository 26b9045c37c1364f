use abscript::config;
use abscript::eval::Interpreter;
use abscript::loader;
use abscript::value::Value;
use clap::Parser;
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// AbstractScript interpreter with a file runner and an interactive REPL
#[derive(Parser, Debug)]
#[command(name = "abscript")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for the AbstractScript language")]
struct CliArgs {
    /// Script file to run (starts the REPL when omitted)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Print interpreter identification and exit
    #[arg(short = 'i', long = "info")]
    info: bool,

    /// Enable debug logging of the interpreter pipeline
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    };
    let _ = simple_logger::init_with_level(level);

    if args.info {
        println!("{}", config::IDENT_BANNER);
        return ExitCode::SUCCESS;
    }

    let outcome = match args.script {
        Some(path) => run_file(&path),
        None => run_repl(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Runs a script file as a top-level program. Imports resolve relative to
/// the file's directory.
fn run_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = match loader::read_source(path)? {
        Some(source) => source,
        None => return Err(format!("could not read file '{}'", path.display()).into()),
    };
    debug!("loaded {} ({} bytes)", path.display(), source.len());

    println!("Running {}...\n", path.display());

    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Interpreter::new(base_dir).run(&source)?;
    Ok(())
}

/// Interactive loop: each line is a small program evaluated against one
/// long-lived interpreter context, so definitions carry across lines.
fn run_repl() -> Result<(), Box<dyn std::error::Error>> {
    let editor_config = Config::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(editor_config)?;
    let _ = rl.load_history(config::HISTORY_FILE);

    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_HINT);

    let mut interpreter = Interpreter::new(".");

    loop {
        match rl.readline(config::PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }

                // REPL errors are reported but never end the session
                match interpreter.run(line) {
                    Ok(Value::Null) => {}
                    Ok(value) => println!("=> {}", value),
                    Err(err) => eprintln!("{}", err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(config::HISTORY_FILE);
    Ok(())
}
