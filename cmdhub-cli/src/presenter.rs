//! Terminal rendering for command lists, registry diffs, and command help.
//!
//! Rendering writes into any `io::Write` so output can be captured in tests.
//! Diff rendering is driven purely by the classification sets.

use cmdhub_core::{Change, Command, RegistryDiff, Snapshot};
use crossterm::style::{Attribute, Color, Stylize, style};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Text styles used by the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Heading,
    Emphasis,
    Added,
    Removed,
    Hint,
}

/// Applies [`Tone`]s, or nothing when color is disabled.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = style(text);
        let styled = match tone {
            Tone::Heading => styled.with(Color::Yellow),
            Tone::Emphasis => styled.with(Color::White).attribute(Attribute::Bold),
            Tone::Added => styled.with(Color::Green),
            Tone::Removed => styled.with(Color::Red),
            Tone::Hint => styled.with(Color::Blue),
        };
        styled.to_string()
    }
}

fn tone_for(change: Change) -> Tone {
    match change {
        Change::Unchanged => Tone::Emphasis,
        Change::Added => Tone::Added,
        Change::Removed => Tone::Removed,
    }
}

/// Render the diff report shown after install, uninstall, and update.
///
/// Each command of `current` is printed once, in snapshot order, styled by
/// the set containing its name. Removed commands follow, since `current`
/// no longer holds them.
pub fn render_diff(
    out: &mut dyn Write,
    diff: &RegistryDiff,
    current: &Snapshot,
    tool: &str,
    painter: Painter,
) -> io::Result<()> {
    write!(out, "{}", painter.paint("\nAvailable Commands:\n\n", Tone::Heading))?;

    let mut seen = BTreeSet::new();
    for command in current.commands() {
        if !seen.insert(command.name.as_str()) {
            continue;
        }
        let Some(change) = diff.classify(&command.name) else {
            continue;
        };
        write_command(out, command, tone_for(change), painter)?;
    }

    for name in diff.removed() {
        if seen.contains(name.as_str()) {
            continue;
        }
        writeln!(out, "  {}", painter.paint(name, Tone::Removed))?;
    }

    write_hint(out, tool, painter)
}

/// Render a plain command listing under `heading`.
pub fn render_list(
    out: &mut dyn Write,
    snapshot: &Snapshot,
    heading: &str,
    tool: &str,
    painter: Painter,
) -> io::Result<()> {
    write!(out, "{}", painter.paint(&format!("\n{heading}\n\n"), Tone::Heading))?;

    let mut seen = BTreeSet::new();
    for command in snapshot.commands() {
        if seen.insert(command.name.as_str()) {
            write_command(out, command, Tone::Emphasis, painter)?;
        }
    }

    write_hint(out, tool, painter)
}

fn write_command(out: &mut dyn Write, command: &Command, tone: Tone, painter: Painter) -> io::Result<()> {
    write!(out, "  {}", painter.paint(&command.name, tone))?;
    if !command.aliases.is_empty() {
        let label = if command.aliases.len() == 1 { "alias" } else { "aliases" };
        let aliases: Vec<String> = command
            .aliases
            .iter()
            .map(|a| painter.paint(a, tone))
            .collect();
        write!(out, " ({label}: {})", aliases.join(", "))?;
    }
    writeln!(out)?;
    writeln!(out, "    {}", command.description)
}

fn write_hint(out: &mut dyn Write, tool: &str, painter: Painter) -> io::Result<()> {
    writeln!(
        out,
        "\nSee \"{}\" for details.",
        painter.paint(&format!("{tool} help [command]"), Tone::Hint)
    )
}

/// Render detailed help for one command, or one of its subcommands.
pub fn render_help(
    out: &mut dyn Write,
    command: &Command,
    sub_command: Option<&str>,
    tool: &str,
    painter: Painter,
) -> io::Result<()> {
    if let Some(sub) = sub_command.and_then(|s| command.subcommand(s)) {
        writeln!(out, "{}", painter.paint("Name:", Tone::Heading))?;
        writeln!(out, "   {tool} {} {}\n", command.name, sub.name)?;
        if !sub.aliases.is_empty() {
            writeln!(out, "{}", painter.paint("Aliases:", Tone::Heading))?;
            writeln!(out, "   {}\n", sub.aliases.join(", "))?;
        }
        writeln!(out, "{}", painter.paint("Usage:", Tone::Heading))?;
        return writeln!(out, "   {tool} {} {} {}", command.name, sub.name, sub.arguments);
    }

    writeln!(out, "{}", painter.paint("Name:", Tone::Heading))?;
    writeln!(out, "   {tool} {}\n", command.name)?;

    if !command.aliases.is_empty() {
        let label = if command.aliases.len() == 1 { "Alias:" } else { "Aliases:" };
        writeln!(out, "{}", painter.paint(label, Tone::Heading))?;
        writeln!(out, "   {}\n", command.aliases.join(", "))?;
    }

    writeln!(out, "{}", painter.paint("Usage:", Tone::Heading))?;
    let mut usage = format!("{tool} {}", command.name);
    for flag in &command.flags {
        usage.push_str(&format!(" [--{}]", flag.name));
    }
    if !command.arguments.is_empty() {
        usage.push(' ');
        usage.push_str(&command.arguments);
    }
    writeln!(out, "   {usage}\n")?;

    if !command.description.is_empty() {
        writeln!(out, "{}", painter.paint("Description:", Tone::Heading))?;
        writeln!(out, "   {}\n", command.description)?;
    }

    if !command.subcommands.is_empty() {
        writeln!(out, "{}", painter.paint("Subcommands:", Tone::Heading))?;
        for sub in &command.subcommands {
            writeln!(out, "   {} {}", sub.name, sub.arguments)?;
        }
        writeln!(out)?;
    }

    if !command.flags.is_empty() {
        writeln!(out, "{}", painter.paint("Flags:", Tone::Heading))?;
        let width = command.flags.iter().map(|f| f.name.len()).max().unwrap_or(0);
        for flag in &command.flags {
            writeln!(out, "   --{:<width$}  {}", flag.name, flag.usage)?;
        }
        writeln!(out)?;
    }

    if !command.docs.is_empty() {
        writeln!(out, "{}", command.docs)?;
    }
    Ok(())
}
