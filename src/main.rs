// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI entry point for hypr-config-tui
//!
//! Opens one of the interactive editors (keybinds, logind settings,
//! themes) or lists the binds of both keybind files.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use hypr_config_tui::{
    config::{ConfigError, KeybindConfig},
    core::{BindSource, KeyCombo},
    profiles::{KeybindProfile, Profile, SettingsProfile, ThemeProfile},
    ui::{terminal, App},
};
use log::info;
use std::{
    fs::OpenOptions,
    io::IsTerminal,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "hypr-config-tui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Write the log to this file instead of stderr
    #[arg(long, global = true, env = "HYPR_CONFIG_TUI_LOG")]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit keybinds through the overlay file
    Keybinds {
        #[command(flatten)]
        files: BindFiles,
    },

    /// Edit systemd-logind power settings
    Logind {
        /// Path to logind.conf
        #[arg(
            short,
            long,
            env = "HYPR_CONFIG_TUI_LOGIND",
            default_value = "/etc/systemd/logind.conf"
        )]
        config: PathBuf,
    },

    /// Switch the active theme
    Theme {
        /// Directory holding <group>/<name>/theme.conf
        #[arg(
            long,
            env = "HYPR_CONFIG_TUI_THEMES",
            default_value = "~/.config/hypr/themes"
        )]
        themes_dir: PathBuf,

        /// Fragment whose `source =` line selects the theme
        #[arg(
            long,
            env = "HYPR_CONFIG_TUI_THEME_TARGET",
            default_value = "~/.config/hypr/theme.conf"
        )]
        target: PathBuf,
    },

    /// List the binds of both keybind files
    List {
        #[command(flatten)]
        files: BindFiles,
    },
}

#[derive(clap::Args)]
struct BindFiles {
    /// User overlay, sourced after the original
    #[arg(
        long,
        env = "HYPR_CONFIG_TUI_OVERLAY",
        default_value = "~/.config/hypr/custom/keybinds.conf"
    )]
    overlay: PathBuf,

    /// Original bind file (never written)
    #[arg(
        long,
        env = "HYPR_CONFIG_TUI_SOURCE",
        default_value = "~/.config/hypr/hyprland/keybinds.conf"
    )]
    source: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), cli.verbose)?;

    let profile = match cli.command {
        Commands::List { files } => {
            return list_keybindings(&expand(&files.overlay)?, &expand(&files.source)?);
        }
        Commands::Keybinds { files } => {
            KeybindProfile::load(&expand(&files.overlay)?, &expand(&files.source)?)
                .map(Profile::Keybinds)
        }
        Commands::Logind { config } => {
            SettingsProfile::load(&expand(&config)?).map(Profile::Settings)
        }
        Commands::Theme { themes_dir, target } => {
            ThemeProfile::load(&expand(&themes_dir)?, &expand(&target)?).map(Profile::Themes)
        }
    };

    let profile = profile.unwrap_or_else(|e| fatal(&e));

    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        eprintln!("{} An interactive terminal is required", "✗".red().bold());
        std::process::exit(1);
    }

    let code = run(profile)?;
    info!("exiting with status {}", code);
    std::process::exit(code);
}

/// Run the editor; the terminal is restored before this returns
fn run(profile: Profile) -> anyhow::Result<i32> {
    let mut app = App::new(profile);
    let (mut session, mut input) = terminal::open().context("Failed to set up the terminal")?;

    let code = app.run(&mut session, &mut input)?;
    drop(session);
    Ok(code)
}

/// Startup errors are printed, not returned, so the message stays short
fn fatal(error: &ConfigError) -> ! {
    eprintln!("{} {}", "✗".red().bold(), error);
    std::process::exit(1);
}

fn expand(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding: {}", path.display()))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// Log to a file when asked; stderr otherwise (only errors by default,
/// since the terminal belongs to the UI)
fn init_logging(log_file: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "error" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));

    if let Some(path) = log_file {
        let path = expand(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// List the binds of both files
fn list_keybindings(overlay: &Path, source: &Path) -> anyhow::Result<()> {
    let config = KeybindConfig::load(overlay, source).unwrap_or_else(|e| fatal(&e));
    let mut total = 0;

    for source in [BindSource::Base, BindSource::Overlay] {
        let file = config.file(source);
        println!(
            "{}",
            format!("Keybindings from: {} ({})\n", file.path.display(), source).bold()
        );

        for parsed in &file.lines {
            let combo = KeyCombo::from_line(&parsed.bind, &config.variables);
            let line_number = format!("{:>4}", parsed.line_number).dimmed();

            if parsed.bind.is_unbind() {
                println!("{} {} {}", line_number, "unbind".yellow(), combo);
                continue;
            }

            total += 1;
            println!(
                "{} {} → {}",
                line_number,
                format!("{}", combo).cyan().bold(),
                parsed.bind.summary().green()
            );
        }
        println!();
    }

    println!("{} Total: {} bindings", "✓".green(), total);
    Ok(())
}
