//! ek - command line front end for editkit

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{Level, debug, info};

use editkit::cli::{Cli, Command};
use editkit::config::Config;
use editkit::context::EditContext;
use editkit::error::EditError;
use editkit::host::{Buffer, LinePrompter, TextBuffer};

/// Parse a level name case-insensitively; `warning` is accepted for `warn`
fn parse_level(name: &str) -> Option<Level> {
    if name.eq_ignore_ascii_case("warning") {
        return Some(Level::WARN);
    }
    name.parse().ok()
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("editkit")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(name) => parse_level(name).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", name);
            Level::INFO
        }),
        None => Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("editkit.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(style) = cli.style {
        config.style = style;
    }

    let ctx = EditContext::startup(&config).context("Failed to start editkit")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Expand { name } => cmd_expand(&ctx, &name),
        Command::Reindent { file, in_place } => cmd_reindent(&ctx, &file, in_place),
        Command::Launch { command } => cmd_launch(&ctx, &command).await,
        Command::Templates => cmd_templates(&ctx),
        Command::Profiles => cmd_profiles(&ctx),
    }
}

fn cmd_expand(ctx: &EditContext, name: &str) -> Result<()> {
    debug!(%name, "cmd_expand: called");
    let mut prompter = LinePrompter::new()?;
    let mut buffer = TextBuffer::new();

    match ctx.expand_template(name, &mut prompter, &mut buffer) {
        Ok(expansion) => {
            println!("{}", buffer.text());
            let (line, col) = expansion.cursor_line_col();
            eprintln!("{} line {}, column {}", "cursor:".dimmed(), line, col);
            Ok(())
        }
        Err(EditError::PromptAborted { label, .. }) => {
            eprintln!("{} at prompt '{}', nothing inserted", "Aborted".yellow(), label);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_reindent(ctx: &EditContext, file: &Path, in_place: bool) -> Result<()> {
    debug!(?file, in_place, "cmd_reindent: called");
    let content = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let mut buffer = TextBuffer::from_text(content);
    let result = ctx.reindent_buffer(&mut buffer);

    if in_place {
        fs::write(file, buffer.text()).context(format!("Failed to write {}", file.display()))?;
    } else {
        print!("{}", buffer.text());
    }

    result.map_err(|e| eyre!("{}: {}", file.display(), e))
}

async fn cmd_launch(ctx: &EditContext, command: &str) -> Result<()> {
    debug!(%command, "cmd_launch: called");
    let handle = ctx.launch_process_with(command, |handle, state| {
        // Last chance to read the sink before it is released
        match handle.read_output() {
            Ok(output) => print!("{}", output),
            Err(e) => eprintln!("{} {}", "Failed to read output:".red(), e),
        }
        info!(id = %handle.id(), %state, "Supervised process finished");
    })?;

    eprintln!(
        "{} {} (pid {})",
        "Launched".green(),
        handle.command().bold(),
        handle.pid().map(|p| p.to_string()).unwrap_or_else(|| "?".to_string())
    );

    let state = handle.wait().await;
    let label = match state {
        procsup::ProcessState::Exited { code: 0 } => state.to_string().green(),
        _ => state.to_string().red(),
    };
    eprintln!("{} {}", "Process".bold(), label);
    Ok(())
}

fn cmd_templates(ctx: &EditContext) -> Result<()> {
    debug!("cmd_templates: called");
    println!("{}", "Templates:".bold());
    for template in ctx.registry().iter() {
        println!("  {:12} {}", template.name.cyan(), template.description);
    }
    Ok(())
}

fn cmd_profiles(ctx: &EditContext) -> Result<()> {
    debug!("cmd_profiles: called");
    println!("{}", "Style profiles:".bold());
    for name in ctx.catalog().names() {
        let profile = ctx.catalog().get(name)?;
        let marker = if name == ctx.profile().name() { "*" } else { " " };
        println!(
            "{} {:12} basic-offset {}",
            marker.green(),
            name.cyan(),
            profile.basic_offset()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("TRACE"), Some(Level::TRACE));
        assert_eq!(parse_level("Warning"), Some(Level::WARN));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }
}
