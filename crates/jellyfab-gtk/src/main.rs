use anyhow::Context;
use clap::Parser;
use jellyfab_gtk::config::{self, Overrides};
use jellyfab_gtk::gui::app::AppModel;
use jellyfab_gtk::sys::runtime;
use relm4::prelude::*;
use std::path::PathBuf;

/// Demo window for the jelly FAB menu.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file to use instead of the one in the user config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep at most this many primary items
    #[arg(long)]
    primary: Option<usize>,

    /// Keep at most this many secondary items
    #[arg(long)]
    secondary: Option<usize>,

    /// Disable the dimming overlay
    #[arg(long)]
    no_overlay: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let overrides = Overrides {
        primary: args.primary,
        secondary: args.secondary,
        no_overlay: args.no_overlay,
    };
    let config = overrides.apply(config::load_or_default(args.config.as_deref()));

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => config::get_config_path().context("Failed to locate the config file")?,
    };

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(config_path, tx);

    let app = RelmApp::new("org.jellyfab.demo").with_args(Vec::new());

    app.run::<AppModel>((config, args.config, overrides, rx));
    Ok(())
}
