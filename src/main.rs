//! oar - transcript viewer and toolkit picker for the oarlock playground.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, FuzzySelect, Select};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use oarlock::auth::{require_auth, AuthMode, EnvSessionProvider};
use oarlock::config::{Settings, KNOWN_KEYS, USE_AUTH};
use oarlock::db::{Database, SqliteUserStore, SqliteWorkflowStore};
use oarlock::toolkit::{
    CloseOutcome, DisconnectOutcome, LoadOutcome, StaticCatalog, ToolsPanel, DEFAULT_PAGE_SIZE,
};
use oarlock::transcript::{TerminalRenderer, TranscriptDocument, TranscriptSession};

/// oar - render agent transcripts and pick workflow tools
#[derive(Parser, Debug)]
#[command(name = "oar")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Enable verbose logging (equivalent to RUST_LOG=trace)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Database file (defaults to the XDG data directory)
    #[arg(long, global = true, env = "OAR_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a saved transcript to the terminal
    Render(RenderArgs),

    /// Show or change stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show the current user
    Whoami,

    /// Browse a toolkit and select tools for a project
    Tools(ToolsArgs),
}

#[derive(ClapArgs, Debug)]
struct RenderArgs {
    /// Transcript JSON file
    transcript: PathBuf,

    /// Show internal messages and tool calls
    #[arg(long, overrides_with = "no_debug_messages")]
    debug_messages: bool,

    /// Hide internal messages and tool calls
    #[arg(long, overrides_with = "debug_messages")]
    no_debug_messages: bool,

    /// Open internal responses as raw JSON
    #[arg(long)]
    json_mode: bool,

    /// Show the system message instead of the transcript
    #[arg(long)]
    system: bool,

    /// An assistant response is still being generated
    #[arg(long)]
    streaming: bool,

    /// Expand the parameters panel of a tool call
    #[arg(long = "expand-params", value_name = "ID")]
    expand_params: Vec<String>,

    /// Expand the results panel of a tool call
    #[arg(long = "expand-results", value_name = "ID")]
    expand_results: Vec<String>,

    /// Turn off wrapping for an expanded tool call
    #[arg(long = "overflow", value_name = "ID")]
    overflow: Vec<String>,

    /// Mark entries that can be flagged for correction
    #[arg(long)]
    fix: bool,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// List all settings with their effective values
    List,
    /// Print one setting
    Get { key: String },
    /// Change a setting
    Set { key: String, value: String },
}

#[derive(ClapArgs, Debug)]
struct ToolsArgs {
    /// Catalog JSON file
    catalog: PathBuf,

    /// Toolkit slug
    toolkit: String,

    /// Project to save the selection under
    #[arg(long, default_value = "default")]
    project: String,

    /// Tools per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(args))
}

fn init_tracing(args: &Args) {
    let default_filter = if args.verbose {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if args.debug || args.verbose {
        tracing::info!("Debug logging enabled");
    }
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let db = match path {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };
    db.migrate()?;
    tracing::debug!("Using database at {}", db.path().display());
    Ok(db)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let db = open_database(args.db)?;

    match args.command {
        Command::Render(render) => run_render(&db, render),
        Command::Settings { action } => run_settings(&db, action),
        Command::Whoami => run_whoami(db).await,
        Command::Tools(tools) => run_tools(db, tools).await,
    }
}

// ============================================================================
// render
// ============================================================================

fn run_render(db: &Database, args: RenderArgs) -> anyhow::Result<()> {
    let doc = TranscriptDocument::load(&args.transcript)
        .with_context(|| format!("loading {}", args.transcript.display()))?;

    let mut config = Settings::new(db).view_config()?;
    if args.debug_messages {
        config.show_debug_messages = true;
    }
    if args.no_debug_messages {
        config.show_debug_messages = false;
    }
    config.show_json_mode |= args.json_mode;
    config.show_system_message = args.system;
    config.allow_fix |= args.fix;

    let mut session = TranscriptSession::new(config);
    for id in &args.expand_params {
        session.toggle_params(id);
    }
    for id in &args.expand_results {
        session.toggle_results(id);
    }
    for id in &args.overflow {
        if !session.toggle_wrap(id) {
            tracing::warn!("Tool call {} must be expanded before wrapping can change", id);
        }
    }

    let view = session.render(&doc.input(args.streaming));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    TerminalRenderer::new().render(&mut out, &view)?;
    Ok(())
}

// ============================================================================
// settings
// ============================================================================

fn run_settings(db: &Database, action: SettingsAction) -> anyhow::Result<()> {
    let settings = Settings::new(db);
    match action {
        SettingsAction::List => {
            for key in KNOWN_KEYS {
                println!("{} = {}", key, effective_value(&settings, key)?);
            }
            for (key, value) in settings.list()? {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    println!("{} = {}", key, value);
                }
            }
        }
        SettingsAction::Get { key } => {
            let value = if KNOWN_KEYS.contains(&key.as_str()) {
                effective_value(&settings, &key)?.to_string()
            } else {
                settings.require(&key)?
            };
            println!("{}", value);
        }
        SettingsAction::Set { key, value } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                anyhow::bail!(
                    "Unknown setting: {} (expected one of {})",
                    key,
                    KNOWN_KEYS.join(", ")
                );
            }
            settings.set_bool_str(&key, &value)?;
            println!("{} = {}", key, effective_value(&settings, &key)?);
        }
    }
    Ok(())
}

fn effective_value(settings: &Settings<'_>, key: &str) -> anyhow::Result<bool> {
    let config = settings.view_config()?;
    Ok(match key {
        oarlock::config::SHOW_DEBUG_MESSAGES => config.show_debug_messages,
        oarlock::config::SHOW_JSON_MODE => config.show_json_mode,
        oarlock::config::ALLOW_FIX => config.allow_fix,
        USE_AUTH => settings.use_auth()?,
        other => anyhow::bail!("Unknown setting: {}", other),
    })
}

// ============================================================================
// whoami
// ============================================================================

async fn run_whoami(db: Database) -> anyhow::Result<()> {
    let mode = AuthMode::from_flag(Settings::new(&db).use_auth()?);
    let users = SqliteUserStore::new(Arc::new(Mutex::new(db)));

    let user = require_auth(mode, &EnvSessionProvider, &users).await?;
    match &user.name {
        Some(name) => println!("{} <{}>", name, user.email),
        None => println!("{}", user.email),
    }
    println!("id: {}", user.id);
    Ok(())
}

// ============================================================================
// tools
// ============================================================================

enum ToolsAction {
    Next,
    Previous,
    Toggle,
    Save,
    Connect,
    Disconnect,
    Close,
}

impl ToolsAction {
    fn label(&self) -> &'static str {
        match self {
            Self::Next => "Next page",
            Self::Previous => "Previous page",
            Self::Toggle => "Toggle a tool",
            Self::Save => "Save selection",
            Self::Connect => "Connect account",
            Self::Disconnect => "Disconnect account",
            Self::Close => "Close",
        }
    }
}

async fn run_tools(db: Database, args: ToolsArgs) -> anyhow::Result<()> {
    let catalog = StaticCatalog::load(&args.catalog, args.page_size)
        .with_context(|| format!("loading {}", args.catalog.display()))?;
    let toolkit = catalog
        .toolkit(&args.toolkit)
        .cloned()
        .with_context(|| format!("Unknown toolkit: {}", args.toolkit))?;
    let workflow = SqliteWorkflowStore::new(Arc::new(Mutex::new(db)));

    let mut panel = ToolsPanel::new(args.project, toolkit);
    if panel.open(&catalog, &workflow).await == LoadOutcome::Failed {
        println!("Could not load tools for {}", args.toolkit);
    }

    let theme = ColorfulTheme::default();
    while panel.is_open() {
        print_page(&panel, &catalog)?;

        let connected = panel.is_connected(&catalog.project_config());
        let mut actions = Vec::new();
        if panel.can_go_forward() {
            actions.push(ToolsAction::Next);
        }
        if panel.can_go_back() {
            actions.push(ToolsAction::Previous);
        }
        if !panel.tools().is_empty() {
            actions.push(ToolsAction::Toggle);
        }
        if panel.has_changes() {
            actions.push(ToolsAction::Save);
        }
        if !panel.toolkit().no_auth {
            actions.push(if connected {
                ToolsAction::Disconnect
            } else {
                ToolsAction::Connect
            });
        }
        actions.push(ToolsAction::Close);

        let labels: Vec<&str> = actions.iter().map(ToolsAction::label).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt(panel.toolkit().name.as_str())
            .items(&labels)
            .default(0)
            .interact_opt()?;

        let Some(action) = choice.and_then(|i| actions.get(i)) else {
            close_panel(&mut panel, &theme)?;
            continue;
        };

        match action {
            ToolsAction::Next => {
                panel.next_page(&catalog).await;
            }
            ToolsAction::Previous => {
                panel.previous_page(&catalog).await;
            }
            ToolsAction::Toggle => {
                let names: Vec<String> = panel
                    .tools()
                    .iter()
                    .map(|t| format!("{} ({})", t.name, t.slug))
                    .collect();
                let picked = FuzzySelect::with_theme(&theme)
                    .with_prompt("Tool")
                    .items(&names)
                    .default(0)
                    .interact_opt()?;
                if let Some(slug) = picked.and_then(|i| panel.tools().get(i)).map(|t| t.slug.clone()) {
                    panel.toggle_selected(&slug);
                }
            }
            ToolsAction::Save => match panel.save(&workflow).await {
                Ok(count) => println!("Saved {} tool(s)", count),
                Err(e) => println!("Save failed: {}", e),
            },
            ToolsAction::Connect => {
                panel.connect();
                println!("Complete the {} sign-in, then continue.", panel.toolkit().name);
                let done = Confirm::with_theme(&theme)
                    .with_prompt("Done?")
                    .default(true)
                    .interact_opt()?
                    .unwrap_or(false);
                if done {
                    let account = catalog.connect_account(&panel.toolkit().slug)?;
                    tracing::info!("Connected {} as {}", panel.toolkit().slug, account.id);
                }
                panel.auth_complete();
            }
            ToolsAction::Disconnect => {
                let config = catalog.project_config();
                match panel.disconnect(&catalog, &workflow, &config).await {
                    Ok(DisconnectOutcome::Disconnected) => println!("Disconnected"),
                    Ok(DisconnectOutcome::NoAccount) => println!("No connected account"),
                    Err(e) => println!("Disconnect failed: {}", e),
                }
            }
            ToolsAction::Close => close_panel(&mut panel, &theme)?,
        }
    }

    Ok(())
}

fn close_panel(panel: &mut ToolsPanel, theme: &ColorfulTheme) -> anyhow::Result<()> {
    if panel.request_close() == CloseOutcome::NeedsConfirmation {
        let discard = Confirm::with_theme(theme)
            .with_prompt("You have unsaved changes. Discard them?")
            .default(false)
            .interact_opt()?
            .unwrap_or(false);
        panel.confirm_close(discard);
    }
    Ok(())
}

fn print_page(panel: &ToolsPanel, catalog: &StaticCatalog) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let status = if panel.is_connected(&catalog.project_config()) {
        "connected"
    } else {
        "not connected"
    };
    writeln!(
        out,
        "\n{} ({}), page {}",
        panel.toolkit().name,
        status,
        panel.page_number()
    )?;
    if panel.tools().is_empty() {
        writeln!(out, "  (no tools)")?;
    }
    for tool in panel.tools() {
        let mark = if panel.is_selected(&tool.slug) { "[x]" } else { "[ ]" };
        writeln!(out, "  {} {}  {}", mark, tool.name, tool.description)?;
    }
    Ok(())
}
