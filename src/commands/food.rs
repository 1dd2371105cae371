use clap::{Args, Subcommand};
use foodmenu_core::{Food, FoodGateway, FoodId, ItemSyncStore, SyncSession};
use std::io::{self, Write};

use crate::config::Config;
use crate::render::{ListRenderer, OutputFormat};

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// List all food items
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a food item's details
    Show {
        /// Food ID (record key)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a food item
    Add {
        /// Name of the item
        name: String,

        /// Price, shown as entered
        price: String,
    },

    /// Delete a food item
    Delete {
        /// Food ID (record key)
        id: String,
    },

    /// Follow the collection, re-rendering the list on every change
    Watch,
}

impl FoodCommand {
    pub async fn run<G>(&self, gateway: G, config: &Config) -> Result<(), Box<dyn std::error::Error>>
    where
        G: FoodGateway + Clone + Send + Sync + 'static,
    {
        match &self.command {
            FoodSubcommand::Watch => watch(gateway, config).await,
            _ => self.execute(gateway, config, &mut io::stdout()).await,
        }
    }

    /// Runs the one-shot subcommands, writing their output to `out`.
    pub async fn execute<G, W>(
        &self,
        gateway: G,
        config: &Config,
        out: &mut W,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        G: FoodGateway + Clone + Send + Sync + 'static,
        W: Write,
    {
        let currency = config.currency_symbol.value.as_str();

        match &self.command {
            FoodSubcommand::List { format } => {
                let store = load(gateway, config).await?;
                let mut renderer = ListRenderer::new(out, currency);
                match format {
                    OutputFormat::Text => renderer.render_list(store.get_all())?,
                    OutputFormat::Json => renderer.render_json(store.get_all())?,
                }
                Ok(())
            }

            FoodSubcommand::Show { id, format } => {
                let store = load(gateway, config).await?;
                let food = store
                    .get_by_id(id)
                    .ok_or_else(|| format!("Food not found: {}", id))?;

                match format {
                    OutputFormat::Text => ListRenderer::new(out, currency).render_detail(food)?,
                    OutputFormat::Json => {
                        writeln!(
                            out,
                            "{}",
                            serde_json::to_string_pretty(&crate::render::FoodView::from(food))?
                        )?;
                    }
                }
                Ok(())
            }

            FoodSubcommand::Add { name, price } => {
                let food = Food::new(name, price);
                let id = gateway.create(&food).await?;
                writeln!(out, "Added {} ({})", food.name, id)?;
                Ok(())
            }

            FoodSubcommand::Delete { id } => {
                gateway.delete(&FoodId::from(id.as_str())).await?;
                writeln!(out, "Deleted {}", id)?;
                Ok(())
            }

            FoodSubcommand::Watch => Err("watch cannot run as a one-shot command".into()),
        }
    }
}

/// Loads the current contents of the collection through a short session.
async fn load<G>(gateway: G, config: &Config) -> Result<ItemSyncStore, Box<dyn std::error::Error>>
where
    G: FoodGateway + Clone + Send + Sync + 'static,
{
    let mut session = SyncSession::new(gateway, ());
    session.start().await?;
    session
        .load(config.first_event_timeout(), config.idle_timeout())
        .await?;
    Ok(session.into_store())
}

/// Loads the collection quietly, then renders it once and starts following
/// changes.
async fn open_watch<G, W>(
    gateway: G,
    config: &Config,
    out: W,
) -> Result<SyncSession<G, ListRenderer<W>>, Box<dyn std::error::Error>>
where
    G: FoodGateway + Clone + Send + Sync + 'static,
    W: Write,
{
    let renderer = ListRenderer::new(out, config.currency_symbol.value.as_str()).paused();
    let mut session = SyncSession::new(gateway, renderer);
    session.start().await?;
    session
        .load(config.first_event_timeout(), config.idle_timeout())
        .await?;
    session.observer_mut().resume();
    session.refresh();
    Ok(session)
}

async fn watch<G>(gateway: G, config: &Config) -> Result<(), Box<dyn std::error::Error>>
where
    G: FoodGateway + Clone + Send + Sync + 'static,
{
    let mut session = open_watch(gateway, config, io::stdout()).await?;
    tracing::info!("Watching collection, press Ctrl-C to stop");

    let outcome = tokio::select! {
        result = session.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    session.stop();

    if let Some(result) = outcome {
        result?;
    }
    Ok(())
}
