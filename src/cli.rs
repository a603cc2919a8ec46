use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigStore, StorageBackend};
use crate::filter::{parse_status_selector, DashboardFilter, SortKey, ALL};
use crate::forms::NewEventForm;
use crate::models::{EventPatch, EventStatus};
use crate::store::EventStore;
use crate::utils;

#[derive(Parser)]
#[command(name = "party-map")]
#[command(about = "Browse events and manage the ones you organize", long_about = None)]
struct Cli {
    /// Directory holding config and event data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend: file or sqlite
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List published events and the featured catalog
    Browse {
        #[arg(short, long, default_value = "")]
        query: String,

        #[arg(short, long, default_value = ALL)]
        category: String,

        /// date, price or popularity
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Create an event as the organizer
    Create {
        #[arg(long)]
        title: String,

        /// May be repeated; the first one is used as the event category
        #[arg(long = "category")]
        categories: Vec<String>,

        #[arg(long, default_value = "")]
        venue: String,

        #[arg(long, default_value = "")]
        city: String,

        #[arg(long, default_value = "")]
        state: String,

        #[arg(long, default_value = "49")]
        price: String,

        #[arg(long)]
        image: Option<String>,

        /// Save without publishing
        #[arg(long)]
        draft: bool,
    },
    /// Change fields of one of your events
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(long)]
        attendees: Option<u32>,

        #[arg(long)]
        status: Option<EventStatus>,
    },
    Publish {
        id: String,
    },
    Unpublish {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Your events, drafts included
    Mine {
        #[arg(short, long, default_value = "")]
        query: String,

        /// all, published or draft
        #[arg(long, default_value = ALL)]
        status: String,

        #[arg(short, long, default_value = ALL)]
        category: String,
    },
    /// Organizer dashboard totals
    Stats,
    /// Show or change saved settings
    Config {
        #[arg(long)]
        set_backend: Option<StorageBackend>,

        #[arg(long)]
        set_log_level: Option<String>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore the error when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report<T: Serialize>(result: std::result::Result<Option<T>, String>, id: &str) -> Result<()> {
    match result.map_err(|e| anyhow!(e))? {
        Some(event) => print_json(&event),
        None => {
            tracing::warn!(id = %id, "no such event");
            print_json(&serde_json::Value::Null)
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let data_root = cli.data_dir.unwrap_or_else(utils::data_root);
    let config_store = ConfigStore::load(&data_root);
    let config = config_store.read();
    init_logging(&config.log_level);

    let command = match cli.command {
        Command::Config {
            set_backend,
            set_log_level,
        } => {
            let updated = if set_backend.is_none() && set_log_level.is_none() {
                config
            } else {
                config_store
                    .update(|config| {
                        if let Some(backend) = set_backend {
                            config.storage_backend = backend;
                        }
                        if let Some(level) = set_log_level {
                            config.log_level = level;
                        }
                    })
                    .with_context(|| format!("writing {:?}", config_store.path()))?
            };
            return print_json(&updated);
        }
        command => command,
    };

    let backend = cli.backend.unwrap_or(config.storage_backend);
    let storage = crate::open_storage(backend, &data_root)
        .with_context(|| format!("opening {backend} storage in {:?}", data_root))?;
    let mut store = EventStore::open(storage);

    match command {
        Command::Browse {
            query,
            category,
            sort,
        } => print_json(&crate::browse_events(&store, &query, &category, sort)),
        Command::Create {
            title,
            categories,
            venue,
            city,
            state,
            price,
            image,
            draft,
        } => {
            let form = NewEventForm {
                title,
                categories,
                venue_name: venue,
                city,
                state,
                ticket_price: price,
                cover_image: image,
                draft,
            };
            let event = crate::create_event(&mut store, form).map_err(|e| anyhow!(e))?;
            tracing::info!(
                "{}",
                if draft {
                    "Event saved as draft!"
                } else {
                    "Event published successfully!"
                }
            );
            print_json(&event)
        }
        Command::Update {
            id,
            title,
            date,
            location,
            image,
            category,
            price,
            attendees,
            status,
        } => {
            let patch = EventPatch {
                title,
                date,
                location,
                image,
                category,
                attendees: attendees.map(Some),
                price: price.map(|p| if p.is_empty() { None } else { Some(p) }),
                status,
            };
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            report(crate::update_event(&mut store, &id, patch), &id)
        }
        Command::Publish { id } => report(crate::publish_event(&mut store, &id), &id),
        Command::Unpublish { id } => report(crate::unpublish_event(&mut store, &id), &id),
        Command::Delete { id } => {
            let removed = crate::delete_event(&mut store, &id).map_err(|e| anyhow!(e))?;
            if !removed {
                tracing::warn!(id = %id, "no such event");
            }
            print_json(&removed)
        }
        Command::Mine {
            query,
            status,
            category,
        } => {
            let filter = DashboardFilter {
                query,
                status: parse_status_selector(&status).map_err(|e| anyhow!(e))?,
                category,
            };
            print_json(&crate::my_events(&store, &filter))
        }
        Command::Stats => print_json(&crate::dashboard_stats(&store)),
        Command::Config { .. } => unreachable!("handled before opening storage"),
    }
}
