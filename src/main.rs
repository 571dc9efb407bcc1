/// Version injected at compile time via SITECFG_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("SITECFG_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sitecfg::azure::client::ArmClient;
use sitecfg::azure::http::format_api_error;
use sitecfg::config::{self, load_document, Config};
use sitecfg::site::expand::expand_web_app_for_create;
use sitecfg::site::fetcher::{fetch_snapshot, read_web_app};
use sitecfg::site::flatten::flatten_site_config;
use sitecfg::site::nested;
use sitecfg::site::registry::get_all_stack_kinds;
use sitecfg::site::settings::{self, AppSettingsMap};
use sitecfg::site::stack::{self, ApplicationStack, OsFamily};
use sitecfg::site::{Reconciler, WebApp};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Expand, flatten and reconcile web app site configuration
#[derive(Parser, Debug)]
#[command(name = "sitecfg", version, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert between stack identifiers and structured stacks
    Stack {
        #[command(subcommand)]
        command: StackCommand,
    },
    /// Print the nested create body for a flat document
    Expand {
        file: PathBuf,
        #[arg(long, value_enum)]
        os: Option<OsFamily>,
    },
    /// Print the flat site config for a nested one
    Flatten {
        file: PathBuf,
        /// Raw app settings (JSON or YAML map)
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long, value_enum)]
        os: Option<OsFamily>,
    },
    /// Print the sub-resources an update would write, in order
    Plan { old: PathBuf, new: PathBuf },
    /// Read a site into the flat model
    Read {
        #[command(flatten)]
        site: SiteArgs,
        /// Previous flat document, for write-only values
        #[arg(long)]
        previous: Option<PathBuf>,
    },
    /// Reconcile a site from the old document to the new one
    Apply {
        old: PathBuf,
        new: PathBuf,
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Show or change persistent settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StackCommand {
    /// Decode an identifier such as `NODE|20-lts`
    Decode {
        identifier: String,
        #[arg(long, value_enum)]
        os: Option<OsFamily>,
    },
    /// Encode a JSON stack such as `{"python":{"version":"3.11"}}`
    Encode {
        json: String,
        #[arg(long, value_enum)]
        os: Option<OsFamily>,
        /// Encode for a function app instead of a web app
        #[arg(long)]
        function_app: bool,
    },
    /// List the known stack kinds
    Kinds,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetSubscription { subscription_id: String },
    SetResourceGroup { resource_group: String },
}

#[derive(clap::Args, Debug)]
struct SiteArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    slot: Option<String>,
    #[arg(short = 'g', long)]
    resource_group: Option<String>,
    #[arg(short, long)]
    subscription: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("sitecfg {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sitecfg").join("sitecfg.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".sitecfg").join("sitecfg.log");
    }
    PathBuf::from("sitecfg.log")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn connect(config: &Config, site: &SiteArgs) -> Result<ArmClient> {
    let target = config.site_target(
        &site.name,
        site.slot.as_deref(),
        site.resource_group.as_deref(),
        site.subscription.as_deref(),
    )?;
    tracing::info!("Using site {} in {}", target.name, target.resource_group);
    ArmClient::new(target, &config::access_token()?)
}

async fn run(command: Command, mut config: Config) -> Result<()> {
    match command {
        Command::Stack { command } => match command {
            StackCommand::Decode { identifier, os } => {
                let stack = stack::decode(&identifier, config.effective_os(os));
                print_json(&stack)
            },
            StackCommand::Encode { json, os, function_app } => {
                let stack: ApplicationStack = serde_json::from_str(&json).context("Invalid stack JSON")?;
                println!("{}", stack::encode_for_site(&stack, config.effective_os(os), function_app));
                Ok(())
            },
            StackCommand::Kinds => {
                for kind in get_all_stack_kinds() {
                    println!("{}", kind);
                }
                Ok(())
            },
        },
        Command::Expand { file, os } => {
            let mut app: WebApp = load_document(&file)?;
            if let Some(os) = os {
                app.os = os;
            }
            print_json(&expand_web_app_for_create(&app)?)
        },
        Command::Flatten { file, settings: settings_file, os } => {
            let nested: nested::SiteConfig = load_document(&file)?;
            let raw: AppSettingsMap = match settings_file {
                Some(path) => load_document(&path)?,
                None => AppSettingsMap::new(),
            };
            let (reserved, _) = settings::classify(&raw);
            print_json(&flatten_site_config(Some(&nested), &reserved, config.effective_os(os)))
        },
        Command::Plan { old, new } => {
            let old: WebApp = load_document(&old)?;
            let new: WebApp = load_document(&new)?;
            let plan = Reconciler::plan(&old, &new, None)?;
            for sub_resource in plan.sub_resources() {
                println!("{}", sub_resource);
            }
            for name in &plan.orphaned_sticky_names {
                eprintln!("warning: sticky name {} matches no setting", name);
            }
            Ok(())
        },
        Command::Read { site, previous } => {
            let previous: Option<WebApp> = previous.as_deref().map(load_document::<WebApp>).transpose()?;
            let client = connect(&config, &site)?;
            let app = read_web_app(&client, previous.as_ref()).await?;
            print_json(&app)
        },
        Command::Apply { old, new, site } => {
            let old: WebApp = load_document(&old)?;
            let new: WebApp = load_document(&new)?;
            let client = connect(&config, &site)?;

            // Untouched site config fields and generated settings keep their live values
            let snapshot = fetch_snapshot(&client).await?;
            let plan = Reconciler::plan(&old, &new, Some(&snapshot))?;
            if plan.is_empty() {
                println!("No changes");
                return Ok(());
            }

            let flushed = Reconciler::flush(&plan, &client).await?;
            for sub_resource in flushed {
                println!("updated {}", sub_resource);
            }
            Ok(())
        },
        Command::Config { command } => match command {
            ConfigCommand::Show => print_json(&config),
            ConfigCommand::SetSubscription { subscription_id } => config.set_subscription(&subscription_id),
            ConfigCommand::SetResourceGroup { resource_group } => config.set_resource_group(&resource_group),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;
    let config = Config::load();

    if let Err(err) = run(args.command, config).await {
        tracing::error!("Command failed: {:#}", err);
        eprintln!("Error: {}", format_api_error(&err));
        std::process::exit(1);
    }

    Ok(())
}
