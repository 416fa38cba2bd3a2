use clap::{Parser, Subcommand};
use ssi_site::{config, generate, output, scan};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "ssi-site")]
#[command(about = "Static site generator with server-side includes")]
#[command(long_about = "\
Static site generator with server-side includes

Pages share markup through include directives that are expanded at build
time. The output is plain static HTML, minified, with a sitemap.

Source structure:

  site/
  ├── config.toml                  # Optional; see 'ssi-site gen-config'
  ├── index.html                   # Page
  ├── about/
  │   ├── index.html               # Page → about/index.html
  │   └── team.inc                 # Partial: include-only, never copied
  ├── _includes/                   # Excluded directory, reached via includes
  │   └── header.inc
  ├── css/site.css                 # Stylesheet: minified
  └── robots.txt                   # Asset: copied as is

Include syntax:

  <!--#include virtual=\"/_includes/header.inc\" -->   from the source root
  <!--#include virtual=\"team.inc\" -->                from the including file

Broken includes become <!-- missing-include:PATH --> or
<!-- cyclic-include:PATH --> in the output unless --strict is given.")]
#[command(version = version_string())]
struct Cli {
    /// Source directory
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (scan manifest)
    #[arg(long, default_value = ".ssi-site-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the source directory into a manifest
    Scan,
    /// Resolve, minify and write the site
    Build {
        /// Fail on any missing or cyclic include
        #[arg(long)]
        strict: bool,
    },
    /// Resolve every page without writing, failing on broken includes
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Build { strict } => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let mut manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            if strict {
                manifest.config.includes.strict = true;
            }

            println!("==> Stage 2: Generating → {}", cli.output.display());
            init_thread_pool(&manifest.config.processing);
            let report = generate::generate(&manifest, &cli.source, &cli.output)?;
            output::print_build_output(&report, &cli.source);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            init_thread_pool(&manifest.config.processing);
            let pages = generate::render_pages(&manifest, &cli.source)?;
            output::print_check_output(&pages, &cli.source);

            let (count, affected) = generate::count_issues(&pages);
            if count > 0 {
                return Err(generate::GenerateError::BrokenIncludes {
                    count,
                    pages: affected,
                }
                .into());
            }
            println!("==> All includes resolved");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
