//! Builtin command handlers.

use crate::presenter::{Painter, render_diff, render_help, render_list};
use crate::update::{GitUpdater, PackageUpdater};
use crate::{Commands, ConfigAction, dispatch};
use anyhow::Context;
use cmdhub_core::config::user_config_path;
use cmdhub_core::{
    CURRENT_VERSION, CmdhubConfig, CommandGroup, ConfigStore, RegistryBuilder, Snapshot,
    UpgradeSignal, diff, load_config, upgrade_signal,
};
use cmdhub_plugins::{PackageResolver, PackageValidator, load_package_with};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Loaded configuration plus presentation settings for one invocation.
pub struct App {
    config: CmdhubConfig,
    explicit_config: Option<PathBuf>,
    store_path: PathBuf,
    tool: String,
    painter: Painter,
}

impl App {
    /// Load configuration from all layers.
    pub fn load(explicit_config: Option<PathBuf>, color: bool) -> anyhow::Result<Self> {
        let config = load_config(explicit_config.as_deref())
            .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
        let store_path = store_path(explicit_config.as_deref())?;
        let color =
            color && std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Ok(Self {
            config,
            explicit_config,
            store_path,
            tool: tool_name(),
            painter: Painter::new(color),
        })
    }

    /// Re-read configuration after the config file changed.
    fn reloaded(&self) -> anyhow::Result<Self> {
        let config = load_config(self.explicit_config.as_deref())
            .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
        Ok(Self {
            config,
            explicit_config: self.explicit_config.clone(),
            store_path: self.store_path.clone(),
            tool: self.tool.clone(),
            painter: self.painter,
        })
    }

    fn upgrade(&self) -> Option<UpgradeSignal> {
        upgrade_signal(&self.config.upgrade, CURRENT_VERSION)
    }

    fn validator(&self) -> PackageValidator {
        PackageValidator::new().with_blocked_names(self.config.packages.blocked.iter().cloned())
    }

    /// Build the current registry snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let resolver = PackageResolver::new(self.config.packages.paths.as_str())
            .with_validator(self.validator());
        RegistryBuilder::new()
            .with_upgrade(self.upgrade())
            .build(&resolver)
    }

    fn store(&self) -> anyhow::Result<ConfigStore> {
        Ok(ConfigStore::open(&self.store_path)?)
    }
}

/// The file the `config` builtin and install/uninstall edit.
fn store_path(explicit_config: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit_config {
        Some(path) => Ok(path.to_path_buf()),
        None => user_config_path().context("Could not determine a configuration directory"),
    }
}

/// Name the tool was invoked as, used in usage hints.
fn tool_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "cmdhub".into())
}

/// Run the `config` builtin without loading configuration, so a file that
/// no longer loads can still be repaired.
pub fn handle_config_command(
    explicit_config: Option<&Path>,
    action: ConfigAction,
) -> anyhow::Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    handle_config(&store_path(explicit_config)?, action, &mut out)?;
    Ok(ExitCode::SUCCESS)
}

pub fn handle_command(command: Commands, app: &App) -> anyhow::Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(command, app, &GitUpdater::new(), &mut out)
}

fn run(
    command: Commands,
    app: &App,
    updater: &dyn PackageUpdater,
    out: &mut dyn Write,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Help {
            command,
            sub_command,
        } => handle_help(app, command.as_deref(), sub_command.as_deref(), out)?,
        Commands::List { json } => handle_list(app, json, out)?,
        Commands::Config { action } => handle_config(&app.store_path, action, out)?,
        Commands::Install { dirs, force } => handle_install(app, &dirs, force, out)?,
        Commands::Search { keywords } => handle_search(app, &keywords, out)?,
        Commands::Uninstall { commands } => handle_uninstall(app, &commands, out)?,
        Commands::Update { commands, force } => {
            handle_update(app, updater, &commands, force, out)?
        }
        Commands::Upgrade => handle_upgrade(app, out)?,
        Commands::External(args) => return handle_external(app, &args),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_help(
    app: &App,
    command: Option<&str>,
    sub_command: Option<&str>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let snapshot = app.snapshot();
    match command {
        None => render_list(out, &snapshot, "Available Commands:", &app.tool, app.painter)?,
        Some(name) => {
            let (_, cmd) = snapshot
                .find(name)
                .with_context(|| format!("Command '{name}' not found"))?;
            render_help(out, cmd, sub_command, &app.tool, app.painter)?;
        }
    }
    Ok(())
}

fn handle_list(app: &App, json: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let snapshot = app.snapshot();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
    } else {
        render_list(out, &snapshot, "Available Commands:", &app.tool, app.painter)?;
    }
    Ok(())
}

fn handle_config(store_path: &Path, action: ConfigAction, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut store = ConfigStore::open(store_path)?;
    match action {
        ConfigAction::Get { setting } => {
            if let Some(value) = store.get(&setting)? {
                writeln!(out, "{value}")?;
            }
        }
        ConfigAction::Set { setting, value } => {
            store.set(&setting, &value)?;
            store.save()?;
        }
        ConfigAction::List { section } => {
            for (setting, value) in store.list(section.as_deref()) {
                writeln!(out, "{setting} = {value}")?;
            }
        }
        ConfigAction::Unset { setting } => {
            if store.unset(&setting)? {
                store.save()?;
            } else {
                tracing::warn!(setting = %setting, "Setting was not set");
            }
        }
    }
    Ok(())
}

fn handle_install(
    app: &App,
    dirs: &[PathBuf],
    force: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let before = app.snapshot();
    let mut store = app.store()?;

    for dir in dirs {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Package directory {} does not exist", dir.display()))?;
        match load_package_with(&dir, &app.validator()) {
            Ok(group) => {
                tracing::info!(package = %group.origin, commands = group.commands.len(), "Installing package");
            }
            Err(e) if force => {
                tracing::warn!(path = %dir.display(), error = %e, "Installing invalid package");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("{} is not a valid package", dir.display()));
            }
        }
        if !store.add_package_path(&dir)? {
            writeln!(out, "{} is already installed", dir.display())?;
        }
    }
    store.save()?;

    report_changes(app, &before, out)
}

fn handle_search(app: &App, keywords: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let snapshot = app.snapshot();

    let groups: Vec<CommandGroup> = snapshot
        .groups()
        .iter()
        .filter_map(|group| {
            let commands: Vec<_> = group
                .commands
                .iter()
                .filter(|cmd| {
                    let haystack = std::iter::once(&cmd.name)
                        .chain(&cmd.aliases)
                        .chain(std::iter::once(&cmd.description))
                        .map(|s| s.to_lowercase())
                        .collect::<Vec<_>>();
                    keywords
                        .iter()
                        .any(|k| haystack.iter().any(|h| h.contains(k.as_str())))
                })
                .cloned()
                .collect();
            (!commands.is_empty()).then(|| CommandGroup {
                commands,
                ..group.clone()
            })
        })
        .collect();

    let matches = Snapshot::from_groups(groups);
    if matches.is_empty() {
        writeln!(out, "No commands match: {}", keywords.join(" "))?;
        return Ok(());
    }
    render_list(out, &matches, "Matching Commands:", &app.tool, app.painter)?;
    Ok(())
}

fn handle_uninstall(app: &App, commands: &[String], out: &mut dyn Write) -> anyhow::Result<()> {
    let before = app.snapshot();
    let mut store = app.store()?;

    for name in commands {
        let group = before.find_package(name)?;
        let Some(path) = group.package_path() else {
            continue;
        };
        if store.remove_package_path(path)? {
            tracing::info!(package = %group.origin, "Uninstalling package");
        } else {
            writeln!(
                out,
                "{} is not listed in {}; it may come from the environment",
                path.display(),
                store.path().display()
            )?;
        }
    }
    store.save()?;

    report_changes(app, &before, out)
}

fn handle_update(
    app: &App,
    updater: &dyn PackageUpdater,
    commands: &[String],
    force: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let before = app.snapshot();

    let mut targets: Vec<&CommandGroup> = Vec::new();
    if commands.is_empty() {
        targets.extend(before.groups().iter().filter(|g| !g.is_builtin()));
    } else {
        for name in commands {
            let group = before.find_package(name)?;
            if !targets.iter().any(|t| t.package_path() == group.package_path()) {
                targets.push(group);
            }
        }
    }

    for group in targets {
        match updater.update(group) {
            Ok(()) => writeln!(out, "Updated {}", group.origin)?,
            Err(e) if force => {
                tracing::warn!(package = %group.origin, error = %e, "Update failed, continuing");
                writeln!(out, "Failed to update {}: {e}", group.origin)?;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to update {}", group.origin));
            }
        }
    }

    report_changes(app, &before, out)
}

/// Rebuild the registry and render what changed since `before`.
fn report_changes(app: &App, before: &Snapshot, out: &mut dyn Write) -> anyhow::Result<()> {
    let app = app.reloaded()?;
    let after = app.snapshot();
    let changes = diff(before, &after);
    render_diff(out, &changes, &after, &app.tool, app.painter)?;
    Ok(())
}

fn handle_upgrade(app: &App, out: &mut dyn Write) -> anyhow::Result<()> {
    match app.upgrade() {
        Some(signal) => writeln!(
            out,
            "{} {} is available (installed: {}). Download it from {}/releases",
            app.tool,
            signal.latest_version,
            signal.current_version,
            env!("CARGO_PKG_REPOSITORY")
        )?,
        None => writeln!(out, "{} is up to date ({})", app.tool, CURRENT_VERSION)?,
    }
    Ok(())
}

fn handle_external(app: &App, args: &[String]) -> anyhow::Result<ExitCode> {
    let Some((name, rest)) = args.split_first() else {
        anyhow::bail!("No command given");
    };
    let snapshot = app.snapshot();
    let (group, command) = snapshot.find(name).with_context(|| {
        format!(
            "Command '{name}' not found. See \"{} help\" for available commands",
            app.tool
        )
    })?;
    let code = dispatch::run_external(group, command, rest)?;
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
