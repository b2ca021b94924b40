//! Rural Storefront - command line client
//!
//! Talks to the storefront backend for distributors, SHGs and pharmacists:
//! browse inventory, place and fulfil orders, and correct received stock.

use std::collections::BTreeSet;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{OrderStatus, OrdererType};
use storefront::external::backend::{InventoryQuery, OrderQuery};
use storefront::external::BackendClient;
use storefront::services::{NewProduct, PlaceOrderRequest, Storefront};
use storefront::settings::SettingsStore;
use storefront::sync::{RemoteOrderRequest, RemoteStorefront};
use storefront::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Rural storefront client")]
struct Cli {
    /// Use this backend URL instead of the saved or configured one
    #[arg(long, global = true, env = "STOREFRONT_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Remote(RemoteCommand),
    /// Save the backend URL for later runs
    SetApiUrl { url: String },
    /// Forget the saved backend URL
    ResetApiUrl,
    /// Run an order through its whole lifecycle against in-memory stores
    Demo,
}

/// Commands that talk to the backend
#[derive(Debug, Subcommand)]
enum RemoteCommand {
    /// List products
    Inventory {
        #[arg(long)]
        distributor: Option<String>,
        /// Only products shown in offers
        #[arg(long)]
        enabled_only: bool,
    },
    /// List orders
    Orders {
        #[arg(long)]
        distributor: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// List a user's received stock
    Stock {
        #[arg(long)]
        user: String,
    },
    /// Order an offered product
    PlaceOrder {
        #[arg(long)]
        product: i64,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "COD")]
        payment_mode: String,
        #[arg(long)]
        address: String,
    },
    /// Accept a pending order
    Accept { order: String },
    /// Dispatch an accepted order
    Dispatch { order: String },
    /// Mark a dispatched order delivered
    Deliver { order: String },
    /// Show or hide a product in offers
    ToggleOffer {
        #[arg(long)]
        product: i64,
    },
    /// Reduce a stock record to a new quantity
    UpdateStock {
        #[arg(long)]
        user: String,
        #[arg(long)]
        stock: i64,
        #[arg(long)]
        quantity: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(&config);

    let cli = Cli::parse();
    let settings = SettingsStore::new(&config.storage.settings_path);

    tracing::debug!("Environment: {}", config.environment);

    let command = match cli.command {
        Command::SetApiUrl { url } => {
            let saved = settings.save_api_url(&url)?;
            println!("Backend URL saved: {}", saved);
            return Ok(());
        }
        Command::ResetApiUrl => {
            settings.reset_api_url()?;
            println!("Backend URL reset to {}", config.api.base_url);
            return Ok(());
        }
        Command::Demo => return run_demo(),
        Command::Remote(command) => command,
    };

    let base_url = cli
        .api_url
        .unwrap_or_else(|| settings.resolve_api_url(&config.api.base_url));
    tracing::info!("Using backend at {}", base_url);

    let client = BackendClient::new(base_url, config.request_timeout())?;
    let mut store = RemoteStorefront::new(client);
    run_remote(&mut store, command).await?;

    if store.is_stale() {
        tracing::warn!("Some data could not be refreshed after the change");
    }

    Ok(())
}

async fn run_remote(store: &mut RemoteStorefront, command: RemoteCommand) -> anyhow::Result<()> {
    match command {
        RemoteCommand::Inventory {
            distributor,
            enabled_only,
        } => {
            let query = InventoryQuery {
                distributor_id: distributor,
                enabled_only,
            };
            print_json(&store.refresh_inventory(query).await?)?;
        }
        RemoteCommand::Orders {
            distributor,
            user,
            status,
        } => {
            let query = OrderQuery {
                distributor_id: distributor,
                user_id: user,
                status,
            };
            print_json(&store.refresh_orders(query).await?)?;
        }
        RemoteCommand::Stock { user } => {
            print_json(&store.refresh_stock(&user).await?)?;
        }
        RemoteCommand::PlaceOrder {
            product,
            quantity,
            user,
            payment_mode,
            address,
        } => {
            store.refresh_inventory(InventoryQuery::default()).await?;
            let order = store
                .place_order(RemoteOrderRequest {
                    product_id: product,
                    quantity,
                    user_id: user,
                    payment_mode,
                    delivery_address: address,
                })
                .await?;
            print_json(&order)?;
        }
        RemoteCommand::Accept { order } => {
            store.refresh_orders(OrderQuery::default()).await?;
            print_json(&store.accept_order(&order).await?)?;
        }
        RemoteCommand::Dispatch { order } => {
            store.refresh_orders(OrderQuery::default()).await?;
            print_json(&store.dispatch_order(&order).await?)?;
        }
        RemoteCommand::Deliver { order } => {
            store.refresh_orders(OrderQuery::default()).await?;
            print_json(&store.deliver_order(&order).await?)?;
        }
        RemoteCommand::ToggleOffer { product } => {
            store.refresh_inventory(InventoryQuery::default()).await?;
            print_json(&store.toggle_offer(product).await?)?;
        }
        RemoteCommand::UpdateStock {
            user,
            stock,
            quantity,
        } => {
            store.refresh_stock(&user).await?;
            print_json(&store.update_stock(stock, quantity).await?)?;
        }
    }
    Ok(())
}

/// Initialize tracing, RUST_LOG wins over the configured filter
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.clone().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Place 50 packs at 120 and walk the order to delivery
fn run_demo() -> anyhow::Result<()> {
    let mut storefront = Storefront::new();

    let product = storefront.inventory.add_product(NewProduct {
        distributor_id: "1".to_string(),
        distributor_name: "Maa Durga Enterprises".to_string(),
        distributor_phone: Some("+919876543210".to_string()),
        product_name: "Reusable Pads - 8 pack".to_string(),
        description: Some("Eco-friendly reusable sanitary pads".to_string()),
        unit_price: Decimal::from(120),
        quantity: 150,
        moq: 10,
        lead_time: Some("2-4 days".to_string()),
        service_areas: BTreeSet::from(["Cuttack".to_string(), "Khordha".to_string()]),
        payment_modes: BTreeSet::from(["COD".to_string(), "UPI".to_string()]),
        show_in_offers: true,
        ..Default::default()
    })?;

    let order = storefront.place_order(PlaceOrderRequest {
        product_id: product.id,
        quantity: 50,
        orderer_name: "Sakhi Self Help Group".to_string(),
        orderer_type: OrdererType::Shg,
        user_id: None,
        payment_mode: Some("UPI".to_string()),
        delivery_address: Some("Rampur Block, Cuttack".to_string()),
    })?;
    storefront.accept_order(order.id, None)?;
    storefront.dispatch_order(order.id)?;
    let delivery = storefront.deliver_order(order.id)?;

    print_json(&delivery)?;
    Ok(())
}
