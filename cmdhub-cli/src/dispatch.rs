//! Running commands provided by packages.

use anyhow::Context;
use cmdhub_core::{Command, CommandGroup};
use std::path::{Component, Path, PathBuf};

/// Path of the executable behind a package command.
///
/// A `bin` that is a relative path staying inside the package directory is
/// used as given. Anything else (download URLs, absolute paths, `..`) falls
/// back to `<package>/bin/cmdhub-<name>` plus the platform executable suffix.
pub fn executable_path(group: &CommandGroup, command: &Command) -> Option<PathBuf> {
    let dir = group.package_path()?;
    if let Some(bin) = command.bin.as_deref().filter(|b| is_package_relative(b)) {
        return Some(dir.join(bin));
    }
    let file = format!("cmdhub-{}{}", command.name, std::env::consts::EXE_SUFFIX);
    Some(dir.join("bin").join(file))
}

fn is_package_relative(bin: &str) -> bool {
    if bin.is_empty() || bin.contains("://") {
        return false;
    }
    Path::new(bin)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Run a package command with `args`, inheriting stdio. Returns its exit code.
pub fn run_external(group: &CommandGroup, command: &Command, args: &[String]) -> anyhow::Result<i32> {
    let exe = executable_path(group, command)
        .with_context(|| format!("'{}' is not a package command", command.name))?;
    if !exe.is_file() {
        anyhow::bail!(
            "Executable for '{}' not found at {} ({})",
            command.name,
            exe.display(),
            group.origin
        );
    }

    tracing::debug!(command = %command.name, exe = %exe.display(), "Dispatching package command");
    let status = std::process::Command::new(&exe)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run {}", exe.display()))?;

    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdhub_core::BuiltinAction;

    #[test]
    fn test_executable_path() {
        let group = CommandGroup::package("cli-echo", "/opt/pkgs/cli-echo", vec![Command::new("echo")]);
        let exe = executable_path(&group, &group.commands[0]).unwrap();
        assert!(exe.starts_with(Path::new("/opt/pkgs/cli-echo/bin")));
        assert!(
            exe.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("cmdhub-echo")
        );
    }

    #[test]
    fn test_executable_path_uses_relative_bin() {
        let mut echo = Command::new("echo");
        echo.bin = Some("scripts/echo.sh".into());
        let group = CommandGroup::package("cli-echo", "/opt/pkgs/cli-echo", vec![echo]);
        assert_eq!(
            executable_path(&group, &group.commands[0]),
            Some(PathBuf::from("/opt/pkgs/cli-echo/scripts/echo.sh"))
        );
    }

    #[test]
    fn test_executable_path_ignores_url_and_escaping_bin() {
        for bin in ["https://example.com/cmdhub-echo", "/usr/bin/echo", "../other/echo", ""] {
            let mut echo = Command::new("echo");
            echo.bin = Some(bin.into());
            let group = CommandGroup::package("cli-echo", "/opt/pkgs/cli-echo", vec![echo]);
            let exe = executable_path(&group, &group.commands[0]).unwrap();
            assert!(
                exe.starts_with(Path::new("/opt/pkgs/cli-echo/bin")),
                "bin {bin:?} resolved to {}",
                exe.display()
            );
        }
    }

    #[test]
    fn test_builtin_has_no_executable() {
        let group = CommandGroup::builtin(Command::new("help"), BuiltinAction::Help);
        assert!(executable_path(&group, &group.commands[0]).is_none());
        assert!(run_external(&group, &group.commands[0], &[]).is_err());
    }

    #[test]
    fn test_missing_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let group = CommandGroup::package("cli-echo", dir.path(), vec![Command::new("echo")]);
        let err = run_external(&group, &group.commands[0], &[]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
