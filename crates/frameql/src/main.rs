use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use frameql_core::engine::Engine;
use frameql_core::engine::session::Session;
use frameql_error::Result;
use frameql_ext_csv::CsvExtension;
use frameql_ext_json::JsonExtension;

#[derive(Parser)]
#[clap(name = "frameql")]
struct Arguments {
    /// Execute file containing sql statements then exit.
    #[clap(short = 'f', long)]
    files: Vec<PathBuf>,
    /// Log output format.
    #[clap(long, value_enum, default_value_t = logutil::LogFormat::HumanReadable)]
    log_format: logutil::LogFormat,
    /// Queries to execute.
    ///
    /// If omitted, and no files were given via the `files` argument, then
    /// statements are read from stdin.
    #[clap(trailing_var_arg = true)]
    queries: Vec<String>,
}

/// Simple binary for running statements against a fresh session.
fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(tracing::Level::ERROR, args.log_format, io::stderr);

    if let Err(e) = inner(args) {
        println!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn inner(args: Arguments) -> Result<()> {
    let engine = Engine::try_new()?;
    engine.register_extension(CsvExtension::new())?;
    engine.register_extension(JsonExtension)?;

    let session = engine.new_session();
    session.set_setting("application_name", env!("CARGO_PKG_NAME"))?;
    let mut stdout = BufWriter::new(io::stdout());

    if !args.files.is_empty() {
        for path in args.files {
            let content = std::fs::read_to_string(path)?;
            run(&session, &content, &mut stdout)?;
        }
        return Ok(());
    }

    if !args.queries.is_empty() {
        for query in args.queries {
            run(&session, &query, &mut stdout)?;
        }
        return Ok(());
    }

    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    run(&session, &content, &mut stdout)
}

fn run(session: &Session, sql: &str, out: &mut impl Write) -> Result<()> {
    // Results are printed as each statement completes so earlier output
    // survives a later failure.
    let stmts = frameql_core::parse(sql)?;
    for stmt in stmts {
        let result = session.execute(stmt)?;
        writeln!(out, "{result}")?;
        out.flush()?;
    }
    Ok(())
}
