use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anamnese::api::{AnamneseBackend, ExportFormat, HttpBackend};
use anamnese::app::App;
use anamnese::auth::{strip_fragment, AuthRelay};
use anamnese::config::Config;
use anamnese::logging;
use anamnese::record::Vocabulary;
use anamnese::session::DraftStore;
use anamnese::ui::detail::record_text;
use anamnese::ui::terminal_guard::install_panic_hook;

#[derive(Parser)]
#[command(name = "anamnese")]
#[command(about = "Terminal client for structured clinical intake (anamnese)")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in through the identity provider
    Login {
        /// Redirect URL carrying `#session_id=...` (prompted for when absent)
        #[arg(long)]
        callback: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List stored anamneses
    List {
        /// Filter by patient name or chief complaint
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print one anamnese
    Show { id: String },

    /// Download an anamnese as PDF or JSON
    Export {
        id: String,

        #[arg(short, long, value_enum, default_value = "pdf")]
        format: ExportFormat,

        /// Output directory (default: paths.exports)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the AI clinical summary for an anamnese
    Summary { id: String },

    /// Inspect or discard the locally saved wizard draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Inspect or write the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Print the draft as JSON
    Show,
    /// Delete the draft
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the effective configuration to the user config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Login { callback }) => cmd_login(&config, callback).await?,
        Some(Commands::Logout) => cmd_logout(&config).await?,
        Some(Commands::Whoami) => cmd_whoami(&config).await?,
        Some(Commands::List { search }) => cmd_list(&config, search).await?,
        Some(Commands::Show { id }) => cmd_show(&config, &id).await?,
        Some(Commands::Export { id, format, output }) => {
            cmd_export(&config, &id, format, output).await?
        }
        Some(Commands::Summary { id }) => cmd_summary(&config, &id).await?,
        Some(Commands::Draft { action }) => cmd_draft(&config, action)?,
        Some(Commands::Config { action }) => cmd_config(&config, action)?,
        None => {
            // No subcommand = launch the TUI
            run_tui(config, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    install_panic_hook();

    let backend = HttpBackend::from_config(&config);
    let mut app = App::new(config, Box::new(backend))?;
    let result = app.run(None).await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

/// Backend carrying the stored session, or an error telling the user to log in
async fn signed_in_backend(config: &Config) -> Result<HttpBackend> {
    let relay = AuthRelay::new(config);
    let mut backend = HttpBackend::from_config(config);
    let context = relay.bootstrap(&mut backend, None).await;
    if !context.is_authenticated() {
        bail!("Not logged in. Run `anamnese login` first.");
    }
    Ok(backend)
}

async fn cmd_login(config: &Config, callback: Option<String>) -> Result<()> {
    let relay = AuthRelay::new(config);

    let location = match callback {
        Some(location) => location,
        None => {
            println!("Open this URL in a browser and sign in:");
            println!();
            println!("  {}", relay.login_url()?);
            println!();
            print!("Paste the URL you were redirected to: ");
            io::stdout().flush()?;

            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read redirect URL")?;
            line.trim().to_string()
        }
    };

    let mut backend = HttpBackend::from_config(config);
    let context = relay.bootstrap(&mut backend, Some(&location)).await;
    match context.user {
        Some(user) => {
            println!("Logged in as {} <{}>", user.name, user.email);
            println!("Return to {}", strip_fragment(&location));
            Ok(())
        }
        None => bail!("Login failed: the session id was missing or rejected"),
    }
}

async fn cmd_logout(config: &Config) -> Result<()> {
    let relay = AuthRelay::new(config);
    let mut backend = HttpBackend::from_config(config);
    let mut context = relay.bootstrap(&mut backend, None).await;
    relay.logout(&mut backend, &mut context).await;
    println!("Logged out");
    Ok(())
}

async fn cmd_whoami(config: &Config) -> Result<()> {
    let relay = AuthRelay::new(config);
    let mut backend = HttpBackend::from_config(config);
    match relay.bootstrap(&mut backend, None).await.user {
        Some(user) => println!("{} <{}> ({})", user.name, user.email, user.id),
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn cmd_list(config: &Config, search: Option<String>) -> Result<()> {
    let backend = signed_in_backend(config).await?;
    let records = backend.list_anamneses(search.as_deref()).await?;

    if records.is_empty() {
        println!("No anamneses found");
        return Ok(());
    }

    println!("Anamneses ({})", records.len());
    println!("{}", "─".repeat(60));
    for record in &records {
        let ident = &record.record.identificacao;
        println!(
            "{}  {}  {}  {}  [{}]",
            record.id,
            record.patient_name(),
            ident.idade,
            record.created_at.format("%d/%m/%Y"),
            ident.grau_confiabilidade.label()
        );
        if !record.chief_complaint().is_empty() {
            println!("    \"{}\"", record.chief_complaint());
        }
    }
    Ok(())
}

async fn cmd_show(config: &Config, id: &str) -> Result<()> {
    let backend = signed_in_backend(config).await?;
    match backend.get_anamnese(id).await {
        Ok(record) => {
            println!("{}", record_text(&record));
            Ok(())
        }
        Err(e) if e.is_not_found() => bail!("Anamnese {} not found", id),
        Err(e) => Err(e.into()),
    }
}

async fn cmd_export(
    config: &Config,
    id: &str,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let backend = signed_in_backend(config).await?;
    let file = backend.download_export(id, format).await?;
    let dir = output.unwrap_or_else(|| config.exports_path());
    let path = file
        .save_to(&dir)
        .with_context(|| format!("Failed to write export to {}", dir.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

async fn cmd_summary(config: &Config, id: &str) -> Result<()> {
    let backend = signed_in_backend(config).await?;
    let summary = backend.generate_summary(id).await?;
    println!("{}", summary);
    Ok(())
}

fn cmd_draft(config: &Config, action: DraftAction) -> Result<()> {
    let drafts = DraftStore::new(&config.state_path());
    match action {
        DraftAction::Show => match drafts.load()? {
            Some(draft) => println!("{}", serde_json::to_string_pretty(&draft)?),
            None => println!("No draft saved"),
        },
        DraftAction::Clear => {
            drafts.clear()?;
            println!("Draft cleared");
        }
    }
    Ok(())
}

fn cmd_config(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print!("{}", config.to_toml()?),
        ConfigAction::Init => {
            let path = config.save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
