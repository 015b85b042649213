use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use client::{EPSG_IO_URL, EpsgIoResolver, HttpMapAgent, unwrap_root};
use commands::{Action, CommandRegistry, InitAppPayload, InitOptions};
use contracts::fusion::ApplicationDefinition;
use contracts::runtime_map::RuntimeMap;
use contracts::weblayout::WebLayout;
use i18n::StringBundles;
use layout::{AppContext, Initializer, LayoutKind, normalize_flex_layout, normalize_web_layout};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Map viewer layout normalization and startup")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a layout document against runtime map documents on disk
    Normalize {
        /// Layout resource id; the suffix selects the schema
        #[arg(long)]
        resource: String,

        /// Layout document (JSON)
        #[arg(long)]
        layout: PathBuf,

        /// Runtime map document (JSON); repeat for each map, in creation order
        #[arg(long = "map", required = true)]
        maps: Vec<PathBuf>,

        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Run startup against a live map agent and print the dispatched action
    Init {
        /// Map agent endpoint
        #[arg(long, env = "MGVIEW_AGENT")]
        agent: String,

        /// Layout resource id
        #[arg(long)]
        resource: String,

        #[arg(long, default_value = "en")]
        locale: String,

        /// Reuse an existing session instead of creating one
        #[arg(long)]
        session: Option<String>,

        /// Projection registry used for unknown EPSG codes
        #[arg(long, default_value = EPSG_IO_URL)]
        epsg_registry: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::Normalize {
            resource,
            layout,
            maps,
            locale,
        } => cmd_normalize(resource, &layout, &maps, locale),
        Command::Init {
            agent,
            resource,
            locale,
            session,
            epsg_registry,
        } => cmd_init(&agent, resource, locale, session, epsg_registry).await,
    }
}

fn cmd_normalize(
    resource: String,
    layout_path: &Path,
    map_paths: &[PathBuf],
    locale: String,
) -> Result<(), String> {
    let layout = read_json(layout_path)?;
    let maps = map_paths
        .iter()
        .map(|p| read_json(p).and_then(|v| decode::<RuntimeMap>(v, p)))
        .collect::<Result<Vec<_>, _>>()?;
    let options = InitOptions {
        resource_id: Some(resource),
        locale,
        session: maps.first().map(|m| m.session_id.clone()),
    };
    let payload = normalize(layout, &maps, &options, layout_path)?;
    print_json(&Action::InitApp(Box::new(payload)))
}

/// Offline counterpart of startup: no session, bundle or projection work.
fn normalize(
    layout: Value,
    maps: &[RuntimeMap],
    options: &InitOptions,
    source: &Path,
) -> Result<InitAppPayload, String> {
    let resource = options.resource_id.as_deref().unwrap_or_default();
    let kind = LayoutKind::of(resource)
        .ok_or_else(|| format!("unknown layout resource type: {resource}"))?;
    let mut registry = CommandRegistry::new();
    let strings = StringBundles::new();
    let payload = match kind {
        LayoutKind::WebLayout => {
            let doc: WebLayout = decode(layout, source)?;
            normalize_web_layout(&doc, maps, options, &[], &mut registry, &strings)
        }
        LayoutKind::ApplicationDefinition => {
            let doc: ApplicationDefinition = decode(layout, source)?;
            normalize_flex_layout(&doc, maps, options, &mut registry, &strings)
        }
    };
    info!("registered {} commands from {resource}", registry.len());
    Ok(payload)
}

async fn cmd_init(
    agent_url: &str,
    resource: String,
    locale: String,
    session: Option<String>,
    epsg_registry: String,
) -> Result<(), String> {
    let agent = HttpMapAgent::new(agent_url).map_err(|e| e.to_string())?;
    let resolver = EpsgIoResolver::new(epsg_registry);
    let options = InitOptions {
        resource_id: Some(resource),
        locale,
        session,
    };

    let mut app = AppContext::default();
    let mut actions: Vec<Action> = Vec::new();
    Initializer::new(&agent, &resolver)
        .init_layout(options, &mut app, &mut actions)
        .await;

    for action in &actions {
        print_json(action)?;
    }
    match actions.first() {
        Some(Action::InitError(err)) => Err(err.error.message.clone()),
        Some(_) => Ok(()),
        None => Err("startup dispatched nothing".to_string()),
    }
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("parse {path:?}: {e}"))
}

/// Decodes a server document, with or without its root element.
fn decode<T: DeserializeOwned>(value: Value, source: &Path) -> Result<T, String> {
    serde_json::from_value(unwrap_root(value)).map_err(|e| format!("decode {source:?}: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| format!("encode output: {e}"))?;
    println!("{text}");
    Ok(())
}
