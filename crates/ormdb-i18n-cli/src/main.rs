//! ORMDB i18n Command-Line Tool
//!
//! Loads a JSON schema with translatable fields and drives records through
//! the translation hooks against an on-disk database.

mod error;
mod executor;
mod formatter;
mod schema;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use formatter::OutputFormat;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::executor::Session;
use crate::schema::SchemaFile;

/// ORMDB i18n Command-Line Tool
#[derive(Parser, Debug)]
#[command(name = "ormdb-i18n")]
#[command(version, about = "Manage translated ORMDB records")]
pub struct Args {
    /// Database directory
    #[arg(short = 'd', long, default_value = "./data")]
    pub data_path: PathBuf,

    /// Schema file (JSON)
    #[arg(short = 's', long)]
    pub schema: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List models and translation tables
    Tables,

    /// Create a record
    Create {
        model: String,
        /// Field assignment (field=value), repeatable
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
        /// Language of the supplied translatable values
        #[arg(long)]
        lang: Option<String>,
    },

    /// Show a record and its translations
    Get {
        model: String,
        id: String,
        /// Language to project translatable fields in
        #[arg(long)]
        lang: Option<String>,
    },

    /// List records
    List {
        model: String,
        /// Language to project translatable fields in
        #[arg(long)]
        lang: Option<String>,
    },

    /// Update a record
    Update {
        model: String,
        id: String,
        /// Field assignment (field=value), repeatable
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        set: Vec<String>,
        /// Language receiving translatable values
        #[arg(long)]
        lang: Option<String>,
    },

    /// Delete a record and its translations
    Delete { model: String, id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,ormdb_i18n_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let schema = SchemaFile::load(&args.schema)?;
    let session = Session::open(&args.data_path, schema)?;
    let formatter = formatter::create_formatter(args.format);

    let output = executor::execute(&session, args.command, &*formatter).await?;
    session.flush()?;

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_verify() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_update() {
        let args = Args::try_parse_from([
            "ormdb-i18n",
            "--schema",
            "schema.json",
            "update",
            "product",
            "1",
            "--set",
            "name=chair",
            "--set",
            "stock=3",
            "--lang",
            "EN",
        ])
        .unwrap();

        assert_eq!(args.data_path, PathBuf::from("./data"));
        assert_eq!(args.format, OutputFormat::Table);
        match args.command {
            Command::Update { model, id, set, lang } => {
                assert_eq!(model, "product");
                assert_eq!(id, "1");
                assert_eq!(set, vec!["name=chair", "stock=3"]);
                assert_eq!(lang.as_deref(), Some("EN"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_update_requires_assignment() {
        assert!(Args::try_parse_from([
            "ormdb-i18n",
            "--schema",
            "s.json",
            "update",
            "product",
            "1"
        ])
        .is_err());
    }
}
