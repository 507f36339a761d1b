//! Prism DDL - Main Entry Point
//!
//! Command line front end: parses DDL from a query, a file or an interactive prompt and prints
//! the normalized SQL or the AST as JSON.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use prism_ddl::{DdlError, ParserConfig, SqlParser, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Normalized SQL
    Sql,
    /// AST as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "prism-ddl")]
#[command(about = "Prism DDL - MySQL CREATE/ALTER TABLE parser and normalizer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// DDL statements to parse
    #[arg(short, long)]
    query: Option<String>,

    /// File containing DDL statements
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Sql)]
    format: OutputFormat,

    /// Statement terminator
    #[arg(short, long)]
    terminator: Option<String>,

    /// Reject CONSTRAINT clauses that are not foreign keys
    #[arg(long)]
    strict_constraints: bool,

    /// Parser configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            ParserConfig::from_json(&json)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => ParserConfig::default(),
    };

    if let Some(terminator) = &cli.terminator {
        config.statement_terminator = terminator.clone();
    }
    if cli.strict_constraints {
        config.strict_constraints = true;
    }

    Ok(config)
}

fn print_statements(
    statements: &[Statement],
    format: OutputFormat,
    terminator: &str,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Sql => {
            for statement in statements {
                println!("{}{}\n", statement, terminator);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(statements)?);
        }
    }
    Ok(())
}

fn run_interactive_mode(parser: &SqlParser, mut format: OutputFormat) -> anyhow::Result<()> {
    let terminator = parser.config().statement_terminator.clone();

    println!("Prism DDL v{}", env!("CARGO_PKG_VERSION"));
    println!("Enter '.help' for usage hints.");
    println!("Enter DDL statements terminated with '{}'", terminator);
    println!();

    let mut rl = DefaultEditor::new()?;
    let history_file = dirs::home_dir()
        .map(|mut path| {
            path.push(".prism_ddl_history");
            path
        })
        .unwrap_or_else(|| PathBuf::from(".prism_ddl_history"));

    // Load history if it exists
    let _ = rl.load_history(&history_file);

    let mut sql_buffer = String::new();

    loop {
        let prompt = if sql_buffer.is_empty() {
            "ddl> "
        } else {
            "  -> "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if sql_buffer.is_empty() && trimmed.starts_with('.') {
                    let _ = rl.add_history_entry(trimmed);
                    if handle_special_command(trimmed, &mut format) {
                        break;
                    }
                    continue;
                }

                if trimmed.is_empty() {
                    continue;
                }

                if !sql_buffer.is_empty() {
                    sql_buffer.push('\n');
                }
                sql_buffer.push_str(trimmed);

                if trimmed.ends_with(terminator.as_str()) {
                    let _ = rl.add_history_entry(&sql_buffer);

                    match parser.parse_multiple(&sql_buffer) {
                        Ok(statements) => print_statements(&statements, format, &terminator)?,
                        Err(e) => eprintln!("Error: {}", e),
                    }

                    sql_buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                sql_buffer.clear();
            }
            Err(ReadlineError::Eof) => {
                println!("exit");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&history_file);

    Ok(())
}

/// Returns true when the prompt should exit
fn handle_special_command(command: &str, format: &mut OutputFormat) -> bool {
    let parts: Vec<&str> = command.split_whitespace().collect();
    let cmd = parts.first().copied().unwrap_or("");

    match cmd {
        ".exit" | ".quit" => {
            println!("Goodbye!");
            return true;
        }
        ".help" => print_help(),
        ".format" => match parts.get(1).map(|f| f.to_ascii_lowercase()).as_deref() {
            Some("sql") => *format = OutputFormat::Sql,
            Some("json") => *format = OutputFormat::Json,
            Some(other) => println!("Unknown format: {}. Use sql or json.", other),
            None => println!("Current format: {:?}", format),
        },
        ".version" => println!("Prism DDL v{}", env!("CARGO_PKG_VERSION")),
        _ => {
            println!("Unknown command: {}", cmd);
            println!("Type '.help' for list of available commands.");
        }
    }
    false
}

fn print_help() {
    println!(".exit, .quit       Exit this program");
    println!(".format sql|json   Set the output format");
    println!(".help              Show this message");
    println!(".version           Show version information");
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let terminator = config.statement_terminator.clone();
    let parser = SqlParser::with_config(config);

    let parsed = if let Some(query) = &cli.query {
        Some(parser.parse_multiple(query))
    } else if let Some(path) = &cli.file {
        Some(parser.parse_file(path))
    } else {
        None
    };

    if let Some(result) = parsed {
        match result {
            Ok(statements) => print_statements(&statements, cli.format, &terminator)?,
            Err(DdlError::Io(e)) => {
                let path = cli.file.clone().unwrap_or_default();
                return Err(anyhow::Error::new(e).context(format!("failed to read {}", path.display())));
            }
            Err(e) => {
                eprintln!("Error parsing DDL: {}", e);
                process::exit(1);
            }
        }
    } else if cli.interactive {
        run_interactive_mode(&parser, cli.format)?;
    } else {
        println!("Please provide --query, --file or --interactive");
        process::exit(1);
    }

    Ok(())
}
