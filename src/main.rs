mod cli;

use anyhow::Context;
use clap::Parser;
use themestate::storage::ServerMarker;
use themestate::theme::ThemeId;
use themestate::ThemeRuntime;

use crate::cli::{Cli, Command};

fn print_state(runtime: &ThemeRuntime) {
    let effective = runtime.effective_theme();
    println!("theme:     {} ({})", effective, effective.display_name());
    println!("base:      {}", runtime.base_theme());
    println!("auto:      {}", runtime.auto_mode());
    println!("route:     {}", runtime.current_route());
    println!("user:      {}", runtime.user_id().unwrap_or("-"));
    println!("class:     {}", runtime.root_class());
    println!("resolved:  {:?}", runtime.resolution_source());
    let available: Vec<&str> = ThemeId::ALL.iter().map(|theme| theme.as_str()).collect();
    println!("available: {}", available.join(", "));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command();
    let marker = cli
        .marker
        .map_or_else(ServerMarker::absent, ServerMarker::from_class_attribute);

    let mut runtime = themestate::run(marker).await;

    match command {
        Command::Show => {}
        Command::Set { theme } => runtime.change_theme_named(&theme)?,
        Command::Auto => runtime.toggle_auto_mode(),
        Command::Route { path } => runtime.navigate_to(path),
        Command::Login { identity } => runtime.set_user_id(Some(identity)),
        Command::Logout => runtime.set_user_id(None),
        Command::Export { file } => {
            runtime
                .export_to_file(&file)
                .with_context(|| format!("failed to export to {}", file.display()))?;
        }
        Command::Import { file } => {
            runtime
                .import_file(&file)
                .with_context(|| format!("failed to import {}", file.display()))?;
        }
        Command::Css => {
            println!("{}", runtime.stylesheet().to_html());
            return Ok(());
        }
    }

    runtime.settle().await;
    print_state(&runtime);
    Ok(())
}
