use std::path;

use anyhow::{bail, Context};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::error;

#[derive(Parser)]
#[command(version, about, long_about = None, author = clap::crate_authors!())]
struct Cli {
    /// Directory with one subdirectory per module, each holding a register description
    modules_dir: path::PathBuf,

    /// Directory to write the `user` and `kernel` header trees into
    headers_dir: path::PathBuf,

    /// Name of the register description looked up in each module directory
    #[arg(long, default_value = "registers.rst")]
    source_name: String,

    /// Name of the header including every generated module header
    #[arg(long, default_value = "isp_reg.h")]
    aggregate_name: String,

    /// Report a module that fails to convert and carry on with the rest
    ///
    /// The exit status is still non-zero if any module failed.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    keep_going: bool,

    /// Parse and validate the descriptions without writing any headers
    #[arg(long, action = clap::ArgAction::SetTrue)]
    dry_run: bool,

    /// Print every parsed module as a canonical register description
    #[arg(long, action = clap::ArgAction::SetTrue)]
    print_rst: bool,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let config = regheader::HeaderConfig::default()
        .source_file_name(&cli.source_name)
        .aggregate_name(&cli.aggregate_name);
    let sources = regheader::discover_modules(&cli.modules_dir, &config)
        .with_context(|| format!("cannot list modules in {}", cli.modules_dir.display()))?;

    if cli.dry_run {
        return dry_run(&cli, &sources);
    }

    let tree = regheader::HeaderTree::create(&cli.headers_dir, &config)
        .with_context(|| format!("cannot create header tree at {}", cli.headers_dir.display()))?;

    let mut failed = 0;
    for src in &sources {
        match tree.convert(src) {
            Ok(module) => print_rst(&cli, &module),
            Err(e) if cli.keep_going => {
                error!("{e}");
                failed += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("cannot convert module {}", src.name()))
            }
        }
    }

    tree.write_aggregates().context("cannot write aggregate headers")?;

    if failed != 0 {
        bail!("{failed} of {} modules failed to convert", sources.len());
    }
    Ok(())
}

fn dry_run(cli: &Cli, sources: &[regheader::ModuleSource]) -> anyhow::Result<()> {
    if !cli.print_rst && !cli.keep_going {
        regheader::dry_run(sources).context("dry run failed")?;
        println!("regheader: dry run completed successfully");
        return Ok(());
    }

    let mut failed = 0;
    for src in sources {
        match regheader::read_module(src) {
            Ok(module) => print_rst(cli, &module),
            Err(e) if cli.keep_going => {
                error!("{e}");
                failed += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("cannot parse module {}", src.name())),
        }
    }
    if failed != 0 {
        bail!("{failed} of {} modules failed to parse", sources.len());
    }
    println!("regheader: dry run completed successfully");
    Ok(())
}

fn print_rst(cli: &Cli, module: &regheader::Module) {
    if cli.print_rst {
        print!("{}", regheader::render_rst(module));
    }
}
