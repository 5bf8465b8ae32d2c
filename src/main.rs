use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, Instrument};

use furniture_orders::api::HttpOrderApi;
use furniture_orders::app_system::{setup_tracing, Config, OrderApp};
use furniture_orders::domain::{Order, OrderId, UserId};
use furniture_orders::order_view::ViewState;
use furniture_orders::session::{Session, SessionStore};

/// Browse, place and delete furniture orders.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify yourself (creates the user if needed)
    Login {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Forget the stored user
    Logout,
    /// Show the stored user
    Whoami,
    /// List the furniture catalog
    Catalog,
    /// List orders; the first applicable filter wins
    Orders {
        /// Only this user's orders (admins only)
        #[arg(long)]
        user: Option<UserId>,
        /// Orders containing this furniture style
        #[arg(long)]
        style: Option<String>,
        /// First day to include, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include, YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Place an order, e.g. `order modern/chairx2 rustic/table`
    Order {
        #[arg(required = true, value_name = "STYLE/TYPE[xN]")]
        items: Vec<ItemSpec>,
    },
    /// Delete an order
    Delete { id: OrderId },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Whoami => "whoami",
            Command::Catalog => "catalog",
            Command::Orders { .. } => "orders",
            Command::Order { .. } => "order",
            Command::Delete { .. } => "delete",
        }
    }
}

/// One `style/type` cart entry with an optional `xN` quantity suffix.
#[derive(Debug, Clone, PartialEq)]
struct ItemSpec {
    style: String,
    kind: String,
    quantity: u32,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || format!("expected style/type[xN], got '{raw}'");
        let (style, rest) = raw.split_once('/').ok_or_else(malformed)?;
        let (kind, quantity) = match rest.rsplit_once('x') {
            Some((kind, count)) if !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()) => {
                let quantity = count
                    .parse()
                    .map_err(|_| format!("quantity '{count}' is too large"))?;
                (kind, quantity)
            }
            _ => (rest, 1),
        };
        if style.is_empty() || kind.is_empty() {
            return Err(malformed());
        }
        if quantity == 0 {
            return Err(format!("quantity in '{raw}' must be at least 1"));
        }
        Ok(Self {
            style: style.to_string(),
            kind: kind.to_string(),
            quantity,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    let config = Config::load()?;
    let api = Arc::new(HttpOrderApi::new(&config.api_url, config.request_timeout)?);
    let store = SessionStore::new(&config.session_file);
    info!(base_url = %api.base_url(), command = cli.command.name(), "Running command");

    match cli.command {
        Command::Login { name } => {
            let name = name.join(" ");
            let session = Session::login(api.as_ref(), &store, &name, &config.admin_name).await?;
            let role = if session.is_admin { "admin" } else { "customer" };
            println!("Logged in as {} (id {}, {role})", session.user.name, session.user.id);
        }
        Command::Logout => match Session::init(&store, &config.admin_name)? {
            Some(session) => {
                let name = session.user.name.clone();
                session.logout(&store)?;
                println!("Goodbye, {name}");
            }
            None => println!("Nobody is logged in"),
        },
        Command::Whoami => match Session::init(&store, &config.admin_name)? {
            Some(session) => println!("{} (id {})", session.user.name, session.user.id),
            None => println!("Nobody is logged in"),
        },
        command => {
            let session = Session::init(&store, &config.admin_name)?
                .ok_or_else(|| anyhow!("Not logged in. Run `furniture-orders login <name>` first"))?;
            let app = OrderApp::start(api, session, &config).await;
            let span = tracing::info_span!("command", name = command.name());
            let outcome = run_view_command(&app, command).instrument(span).await;
            app.shutdown().await?;
            outcome?;
        }
    }

    Ok(())
}

async fn run_view_command(app: &OrderApp, command: Command) -> anyhow::Result<()> {
    let view = &app.view;
    match command {
        Command::Catalog => {
            view.load_catalog().await?;
            for option in view.snapshot().catalog {
                println!(
                    "{:<10} {:<10} {:>9.2}  {}",
                    option.style, option.kind, option.price, option.description
                );
            }
        }
        Command::Orders {
            user,
            style,
            from,
            to,
        } => {
            if user.is_some() {
                view.set_user_filter(user).await?;
            }
            if style.is_some() {
                view.set_style_filter(style).await?;
            }
            if from.is_some() || to.is_some() {
                view.set_date_range(from, to).await?;
            }
            let state = view.settled().await?;
            print_orders(&state)?;
        }
        Command::Order { items } => {
            view.load_catalog().await?;
            let catalog = view.snapshot().catalog;
            for item in items {
                let option = catalog
                    .iter()
                    .find(|o| o.style == item.style && o.kind == item.kind)
                    .ok_or_else(|| anyhow!("No {} {} in the catalog", item.style, item.kind))?;
                for _ in 0..item.quantity {
                    view.toggle_item(option.clone()).await?;
                }
            }
            let total = view.snapshot().total;
            let order = view.submit_order().await?;
            println!("Order {} placed: {} items, total {:.2}", order.id, order.furnitures.len(), total);
        }
        Command::Delete { id } => {
            view.delete_order(id).await?;
            println!("Order {id} deleted");
        }
        Command::Login { .. } | Command::Logout | Command::Whoami => {
            unreachable!("session commands run without a view")
        }
    }
    Ok(())
}

fn print_orders(state: &ViewState) -> anyhow::Result<()> {
    if let Some(error) = &state.error {
        bail!("{error}");
    }
    if state.visible.is_empty() {
        let scope = if state.criteria.is_empty() { "" } else { " matching the filter" };
        println!("No orders{scope}");
        return Ok(());
    }
    for order in &state.visible {
        print_order(order);
    }
    println!("{} of {} orders", state.visible.len(), state.orders.len());
    Ok(())
}

fn print_order(order: &Order) {
    println!(
        "#{:<6} {}  {:<12} {:>3} items  {:>10.2}",
        order.id,
        order.date.format("%Y-%m-%d %H:%M"),
        order.user.name,
        order.furnitures.len(),
        order.price
    );
}
