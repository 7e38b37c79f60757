use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use minijs::ast_printer::AstPrinter;
use minijs::diagnostic::{Diagnostic, DiagnosticSink, StderrSink};
use minijs::interpreter::{Interpreter, InterpreterConfig};
use minijs::parser::Parser;
use minijs::scanner::{self, Scanner};
use minijs::session::{Outcome, Session};

#[derive(ClapParser, Debug)]
#[command(version, about = "Interpreter for a small class-based scripting language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,

    /// Abort with a runtime error once calls nest this deep
    #[arg(long, global = true, value_name = "N")]
    max_call_depth: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses input from a file as a program and prints its syntax tree
    Parse {
        filename: PathBuf,

        /// Print the tree as JSON instead of S-expressions
        #[arg(long)]
        json: bool,
    },

    /// Runs input from a file as a program
    Run { filename: PathBuf },

    /// Reads and runs one line at a time until EOF or `exit()`
    Repl,
}

/// Reads the contents of a file as UTF-8 text.
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("minijs::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn new_session(config: &InterpreterConfig) -> Session {
    let interpreter = Interpreter::new().with_config(config.clone());
    Session::with_parts(interpreter, StderrSink)
}

fn tokenize(source: &str) -> Outcome {
    let mut sink = StderrSink;
    let mut outcome = Outcome::Ok;

    for token in Scanner::new(source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);
                println!("{}", token);
            }
            Err(e) => {
                outcome = Outcome::StaticError;
                sink.emit(Diagnostic::from(&e));
            }
        }
    }

    outcome
}

fn parse(source: &str, json: bool) -> Result<Outcome> {
    let mut sink = StderrSink;

    let tokens = match scanner::scan_all(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            errors.iter().for_each(|e| sink.emit(Diagnostic::from(e)));
            return Ok(Outcome::StaticError);
        }
    };

    let statements = match Parser::new(&tokens).parse() {
        Ok(statements) => statements,
        Err(errors) => {
            errors.iter().for_each(|e| sink.emit(Diagnostic::from(e)));
            return Ok(Outcome::StaticError);
        }
    };

    if json {
        let text =
            serde_json::to_string_pretty(&statements).context("Failed to serialize syntax tree")?;
        println!("{}", text);
    } else {
        println!("{}", AstPrinter::print_program(&statements));
    }

    Ok(Outcome::Ok)
}

fn repl(config: &InterpreterConfig) -> Result<()> {
    info!("Starting REPL");

    let mut session = new_session(config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        if line.trim() == "exit()" {
            break;
        }

        let outcome = session.run(&line);
        debug!("REPL line finished with {:?}", outcome);
    }

    info!("REPL finished");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let config = InterpreterConfig {
        max_call_depth: args.max_call_depth,
    };

    let outcome = match args.commands {
        Commands::Tokenize { filename } => {
            info!("Running Tokenize subcommand");
            tokenize(&read_file(filename)?)
        }

        Commands::Parse { filename, json } => {
            info!("Running Parse subcommand");
            parse(&read_file(filename)?, json)?
        }

        Commands::Run { filename } => {
            info!("Running Run subcommand");
            let source = read_file(filename)?;
            new_session(&config).run(&source)
        }

        Commands::Repl => {
            repl(&config)?;
            Outcome::Ok
        }
    };

    if outcome != Outcome::Ok {
        debug!("Exiting with code {}", outcome.exit_code());
        std::process::exit(outcome.exit_code());
    }

    Ok(())
}
