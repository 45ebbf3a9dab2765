mod backend;
mod commands;
mod config;
mod crossref;
mod diagnostics;
mod error;
mod generator;
mod inline;
mod layout;
mod logging;
mod markup;
mod model;
mod registry;
mod resolver;
mod types;
mod walker;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;

/// Command-line interface.
#[derive(Parser)]
#[command(name = "folio", version, about = "Paginated documentation with page-accurate cross-references")]
struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Config file to use instead of `.folio.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More logging: `-v` debug, `-vv` trace. `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Options of the build command.
#[derive(Args)]
struct BuildArgs {
    /// Try to link every bare lowercase word.
    #[arg(long)]
    hyperlink_all: bool,
    /// Free page to put first.
    #[arg(long)]
    main_page: Option<String>,
    /// Documentation model (JSON).
    #[arg(long)]
    model: Option<PathBuf>,
    /// Output directory.
    #[arg(long)]
    output: Option<PathBuf>,
    /// A4, A5, Letter, or Legal.
    #[arg(long)]
    paper_size: Option<String>,
    /// Page-number switches.
    #[command(flatten)]
    pages: PageSwitches,
    /// Keep `#` in displayed instance-method names.
    #[arg(long)]
    show_hash: bool,
}

impl BuildArgs {
    /// Turn the flags into config overrides.
    fn into_overrides(self) -> Overrides {
        return Overrides {
            hyperlink_all: self.hyperlink_all,
            main_page: self.main_page,
            model: self.model,
            output: self.output,
            paper_size: self.paper_size,
            show_hash: self.show_hash,
            show_pages: self.pages.value(),
        };
    }
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Render the documentation model into the output directory
    Build(BuildArgs),
    /// List all anchors, or print the anchor a name resolves to
    Resolve {
        /// Class or module the name is looked up from
        #[arg(long)]
        context: Option<String>,
        /// Documentation model (JSON)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Reference name, e.g. `Net::HTTP#get` (omit to list all)
        name: Option<String>,
    },
}

/// `--show-pages` / `--no-show-pages`; the last one given wins.
#[derive(Args)]
struct PageSwitches {
    /// Omit page numbers from references.
    #[arg(long, overrides_with = "show_pages")]
    no_show_pages: bool,
    /// Append page numbers to references.
    #[arg(long, overrides_with = "no_show_pages")]
    show_pages: bool,
}

impl PageSwitches {
    /// `None` when neither flag was given.
    const fn value(&self) -> Option<bool> {
        if self.no_show_pages {
            return Some(false);
        }
        if self.show_pages {
            return Some(true);
        }
        return None;
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Build(args) => commands::build(config, args.into_overrides()).map(|()| return ExitCode::SUCCESS),
        Commands::Resolve { context, model, name } => {
            let overrides = Overrides { model, ..Overrides::default() };
            commands::resolve(config, overrides, name.as_deref(), context.as_deref())
        },
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
