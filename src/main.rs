use clap::{Parser, Subcommand};
use content_extract::classify::PageType;
use content_extract::content::ContentIndex;
use content_extract::{check, config, output, pipeline};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "content-extract")]
#[command(about = "Migrate a mirrored legacy site into a single pages.json content file")]
#[command(long_about = "\
Migrate a mirrored legacy site into a single pages.json content file

Every URL in the URL list is mapped onto the mirror, its content region is
extracted, links are rewritten to site paths, and the result is written as
one JSON file sorted by path.

Project layout (paths are configurable in extract.toml):

  site/                            # --root
  ├── extract.toml                 # optional, see 'gen-config'
  └── src/content/pages.json       # written by 'extract'
  mirror/www.idfilters.rs/         # one directory per page
  │   ├── index.html               # home
  │   └── proizvodi/filter-x/
  │       └── index.html
  metadata/urls.txt                # one absolute URL per line

Page types (from the path alone):
  /proizvodi            products_index     /aplikacija      applications_index
  /proizvodi/...        product            /aplikacija/...  application
  .../attachment/...    attachment         /                home
  anything else         page

Set RUST_LOG=debug for per-page logging.

Run 'content-extract gen-config' to generate a documented extract.toml.")]
#[command(version)]
struct Cli {
    /// Project root holding extract.toml; relative config paths resolve here
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract every listed page and write the content file
    Extract,
    /// Check the URL list against the mirror without writing anything
    Check,
    /// Audit the written content file for leftover legacy links
    Verify,
    /// List records from the written content file
    List {
        /// Only show records of this type (e.g. product, application)
        #[arg(long = "type")]
        page_type: Option<PageType>,
    },
    /// Print a stock extract.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
        command => run_project_command(command, &cli.root),
    }
}

/// Commands that read the project config.
fn run_project_command(command: Command, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = resolve_root(root)?;
    let project = config::load_config(&root)?;

    match command {
        Command::Extract => {
            println!("==> Extracting {}", project.paths.mirror_dir(&root).display());
            let report = pipeline::run(&root, &project)?;
            output::print_extract_output(&report, &root);
        }
        Command::Check => {
            println!("==> Checking {}", project.paths.urls_file(&root).display());
            let audit = check::check_inputs(&root, &project)?;
            output::print_check_output(&audit, &root);
            if !audit.is_clean() {
                return Err("inputs have problems".into());
            }
            println!("==> Inputs are valid");
        }
        Command::Verify => {
            let path = project.paths.output_file(&root);
            println!("==> Verifying {}", path.display());
            let index = ContentIndex::load(&path)?;
            let audit = check::verify_artifact(&index, &project.site);
            output::print_verify_output(&audit);
            if !audit.is_clean() {
                return Err("content file has unresolved links".into());
            }
            println!("==> Content file is valid");
        }
        Command::List { page_type } => {
            let index = ContentIndex::load(&project.paths.output_file(&root))?;
            let pages = match page_type {
                Some(t) => index.of_type(t),
                None => index.all().iter().collect(),
            };
            output::print_list_output(&pages);
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Absolute project root, so reported source paths are stable.
fn resolve_root(root: &Path) -> std::io::Result<PathBuf> {
    root.canonicalize()
}
