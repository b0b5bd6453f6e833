use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::builder::shopping_bag;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{
    compute_total, format_price, Catalog, DescriptorCache, DisplayLines, ItemCount, KindTally, NodeId,
};
use crate::tree_traits::TreeRender;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show) => _show(cli),
        Some(Commands::Total) => _total(cli),
        Some(Commands::Tree) => _tree(cli),
        Some(Commands::Tally) => _tally(cli),
        Some(Commands::Config {
            command: ConfigCommands::Show,
        }) => _config_show(cli),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Ok(()),
    }
}

/// Effective settings plus the price precision, where `--precision` beats config.
fn load_settings(cli: &Cli) -> CliResult<(Settings, Option<u32>)> {
    let settings = Settings::load(cli.config.as_deref())?;
    let precision = cli.precision.or(settings.price_precision);
    debug!(?settings, ?precision, "settings loaded");
    Ok((settings, precision))
}

fn load_bag(settings: &Settings) -> CliResult<(Catalog, NodeId)> {
    let cache = DescriptorCache::with_display_names(settings.display_names.clone());
    let (catalog, root) = shopping_bag(&cache)?;
    debug!(descriptors = cache.len(), nodes = catalog.len(), "shopping bag built");
    Ok((catalog, root))
}

fn line_format(precision: Option<u32>) -> DisplayLines {
    precision.map(DisplayLines::with_precision).unwrap_or_default()
}

#[instrument(skip(cli))]
fn _show(cli: &Cli) -> CliResult<()> {
    let (settings, precision) = load_settings(cli)?;
    let (catalog, root) = load_bag(&settings)?;
    let lines = catalog.walk(root, &mut line_format(precision))?;
    let total = compute_total(&catalog, root)?;
    output::header("Items:");
    for line in lines {
        output::detail(&line);
    }
    output::action("Total", &format_price(total, precision));
    Ok(())
}

#[instrument(skip(cli))]
fn _total(cli: &Cli) -> CliResult<()> {
    let (settings, precision) = load_settings(cli)?;
    let (catalog, root) = load_bag(&settings)?;
    let total = compute_total(&catalog, root)?;
    output::info(&format_price(total, precision));
    Ok(())
}

#[instrument(skip(cli))]
fn _tree(cli: &Cli) -> CliResult<()> {
    let (settings, precision) = load_settings(cli)?;
    let (catalog, root) = load_bag(&settings)?;
    let tree = catalog.walk(root, &mut TreeRender::new(line_format(precision)))?;
    output::info(&tree);
    Ok(())
}

#[instrument(skip(cli))]
fn _tally(cli: &Cli) -> CliResult<()> {
    let (settings, _) = load_settings(cli)?;
    let (catalog, root) = load_bag(&settings)?;
    let items = catalog.walk(root, &mut ItemCount)?;
    output::header(&format!("{} items:", items));
    for (key, quantity) in catalog.walk(root, &mut KindTally)? {
        output::detail(&format!("{}: {}", key, quantity));
    }
    Ok(())
}

fn _config_show(cli: &Cli) -> CliResult<()> {
    let (settings, _) = load_settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
