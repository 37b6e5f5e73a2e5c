//! Bazaar CLI - marketplace front end for the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog as a guest
//! bazaar products list --category electrical --limit 10
//!
//! # Guest cart, kept until sign-in
//! bazaar cart add 6600aa00bb11cc22dd33ee44
//!
//! # Sign in (password from BAZAAR_PASSWORD or --password)
//! bazaar login seller@example.com --next /seller/products
//!
//! # Super admin console
//! bazaar admin settings
//! bazaar admin report orders --out exports/
//! ```
//!
//! Configuration comes from the environment (and `.env`); see
//! `ClientConfig::from_env`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use bazaar_client::api::{ManageQuery, NewAdmin, ProductQuery, Report, UserQuery};
use bazaar_client::{ClientConfig, Theme};
use bazaar_core::{ProductStatus, Role, SellerStatus};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::catalog::DraftFields;
use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an email or username
    Login {
        /// Email address or username
        login: String,

        #[arg(long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: String,

        /// Path to continue to after signing in
        #[arg(long)]
        next: Option<String>,
    },
    /// Sign out (local carts and wishlists are kept)
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Create a customer account
    Signup {
        #[command(subcommand)]
        action: SignupAction,
    },
    /// Recover a forgotten password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Local shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Local wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Orders of the signed-in account
    Orders {
        /// How many recent orders to show (staff and sellers)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Customer profile
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Dashboard figures for the signed-in role
    Dashboard {
        /// Include category and creator breakdowns (super admin)
        #[arg(long)]
        advanced: bool,
    },
    /// Super admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Show whether the current visitor may open a route
    Route {
        /// Path, optionally with a query string
        path: String,
    },
    /// Show, set or toggle the colour theme
    Theme {
        /// `dark`, `light` or `toggle`; omit to show the current theme
        value: Option<String>,
    },
}

#[derive(Subcommand)]
enum SignupAction {
    /// Create the account right away
    Create(SignupArgs),
    /// Email a verification code
    Request(SignupArgs),
    /// Finish sign-up with the emailed code
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
}

#[derive(Args)]
struct SignupArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Email a reset code
    Forgot {
        /// Email address or username
        identifier: String,
    },
    /// Set a new password with the emailed code
    Reset {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        code: String,
        #[arg(long, env = "BAZAAR_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
        #[arg(long, env = "BAZAAR_CONFIRM_PASSWORD", hide_env_values = true)]
        confirm_password: String,
    },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    category: Option<String>,
    /// Free-text search
    #[arg(long)]
    q: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    source_company: Option<String>,
    #[arg(long)]
    min_price: Option<Decimal>,
    #[arg(long)]
    max_price: Option<Decimal>,
    #[arg(long)]
    min_rating: Option<Decimal>,
    #[arg(long)]
    bank_offer: bool,
    #[arg(long)]
    exchange_offer: bool,
    #[arg(long)]
    emi_available: bool,
    #[arg(long)]
    partner_coupon: bool,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
}

impl From<ListArgs> for ProductQuery {
    fn from(args: ListArgs) -> Self {
        let flag = |set: bool| set.then_some(true);
        Self {
            category: args.category,
            q: args.q,
            brand: args.brand,
            source_company: args.source_company,
            min_price: args.min_price,
            max_price: args.max_price,
            min_rating: args.min_rating,
            bank_offer: flag(args.bank_offer),
            exchange_offer: flag(args.exchange_offer),
            emi_available: flag(args.emi_available),
            partner_coupon: flag(args.partner_coupon),
            page: args.page,
            limit: args.limit,
        }
    }
}

#[derive(Subcommand)]
enum ProductAction {
    /// Public catalog
    List(ListArgs),
    /// One product in detail
    Show { id: String },
    /// Products of the signed-in seller
    Mine,
    /// Staff listing with status filter
    Manage {
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        status: Option<ProductStatus>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Create a product
    Create {
        #[command(flatten)]
        fields: DraftFields,
        /// Image files to upload (at most 5)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Edit a product
    Edit {
        id: String,
        #[command(flatten)]
        fields: DraftFields,
        /// Extra image files to upload
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Delete a product
    Delete { id: String },
    /// Upload images and print their URLs
    Upload {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product, or one more of it
    Add { id: String },
    /// Remove a product
    Remove { id: String },
    /// Show the cart and its subtotal
    Show,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Add a product, or remove it if already saved
    Toggle { id: String },
    /// Show the wishlist
    Show,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Show the profile
    Show,
    /// Change name and/or phone
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Show platform settings
    Settings,
    /// Set the platform commission in percent
    Commission { pct: Decimal },
    /// Switch maintenance mode
    Maintenance {
        state: Switch,
        /// Message shown to visitors
        #[arg(long)]
        message: Option<String>,
    },
    /// List sellers
    Sellers {
        #[arg(long)]
        status: Option<SellerStatus>,
    },
    /// Approve, reject or suspend a seller
    SellerStatus { id: String, status: SellerStatus },
    /// List products for moderation
    Products {
        #[arg(long)]
        status: Option<ProductStatus>,
    },
    /// Approve or reject a product
    ProductStatus { id: String, status: ProductStatus },
    /// List users
    Users {
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        q: Option<String>,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Enable or disable a user
    ToggleUser { id: String },
    /// Change a user's role
    SetRole { id: String, role: Role },
    /// List admin accounts
    Admins,
    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "BAZAAR_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Enable or disable an admin account
    ToggleAdmin { id: String },
    /// Download a CSV report
    Report {
        report: Report,
        /// File or directory to write to
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Quiet by default: command output goes to stdout, logs to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_client=warn,bazaar_cli=warn".into());

    let json = std::env::var("BAZAAR_LOG_JSON").is_ok();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let mut ctx = match Context::load(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            eprintln!("{}", e.user_message("Could not start"));
            std::process::exit(1);
        }
    };

    let result = run(&mut ctx, cli.command).await;

    if let Err(e) = &result {
        tracing::error!("Command failed: {e}");
        ctx.notices.push(e.user_message("Something went wrong"));
    }
    for notice in ctx.notices.active() {
        if result.is_ok() {
            println!("» {notice}");
        } else {
            eprintln!("{notice}");
        }
    }
    if result.is_err() {
        std::process::exit(1);
    }
}

async fn run(ctx: &mut Context, command: Commands) -> Result<(), CliError> {
    use commands::{account, auth, catalog, lists, prefs};

    match command {
        Commands::Login {
            login,
            password,
            next,
        } => auth::login(ctx, &login, &password, next.as_deref()).await?,
        Commands::Logout => auth::logout(ctx).await,
        Commands::Whoami => auth::whoami(ctx)?,
        Commands::Signup { action } => match action {
            SignupAction::Create(args) => {
                auth::signup(ctx, &args.name, &args.email, &args.password).await?;
            }
            SignupAction::Request(args) => {
                auth::request_signup_code(ctx, &args.name, &args.email, &args.password).await?;
            }
            SignupAction::Verify { email, code } => {
                auth::verify_signup_code(ctx, &email, &code).await?;
            }
        },
        Commands::Password { action } => match action {
            PasswordAction::Forgot { identifier } => {
                auth::forgot_password(ctx, &identifier).await?;
            }
            PasswordAction::Reset {
                identifier,
                code,
                new_password,
                confirm_password,
            } => {
                auth::reset_password(ctx, &identifier, &code, &new_password, &confirm_password)
                    .await?;
            }
        },
        Commands::Products { action } => match action {
            ProductAction::List(args) => catalog::list(ctx, &args.into()).await?,
            ProductAction::Show { id } => catalog::show(ctx, &id).await?,
            ProductAction::Mine => catalog::mine(ctx).await?,
            ProductAction::Manage { q, status, page } => {
                catalog::manage(ctx, &ManageQuery { q, status, page }).await?;
            }
            ProductAction::Create { fields, images } => {
                catalog::create(ctx, fields, &images).await?;
            }
            ProductAction::Edit { id, fields, images } => {
                catalog::edit(ctx, &id, fields, &images).await?;
            }
            ProductAction::Delete { id } => catalog::delete(ctx, &id).await?,
            ProductAction::Upload { images } => catalog::upload_images(ctx, &images).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Add { id } => lists::cart_add(ctx, &id).await?,
            CartAction::Remove { id } => lists::cart_remove(ctx, &id)?,
            CartAction::Show => lists::cart_show(ctx),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Toggle { id } => lists::wishlist_toggle(ctx, &id).await?,
            WishlistAction::Show => lists::wishlist_show(ctx),
        },
        Commands::Orders { limit } => account::orders(ctx, limit).await?,
        Commands::Account { action } => match action {
            AccountAction::Show => account::show(ctx).await?,
            AccountAction::Update { name, phone } => account::update(ctx, name, phone).await?,
        },
        Commands::Dashboard { advanced } => account::dashboard(ctx, advanced).await?,
        Commands::Admin { action } => run_admin(ctx, action).await?,
        Commands::Route { path } => prefs::check_route(ctx, &path),
        Commands::Theme { value } => match value.as_deref() {
            None => prefs::show_theme(ctx),
            Some("toggle") => prefs::set_theme(ctx, None)?,
            Some(raw) => {
                let theme: Theme = raw.parse().map_err(CliError::Usage)?;
                prefs::set_theme(ctx, Some(theme))?;
            }
        },
    }
    Ok(())
}

async fn run_admin(ctx: &Context, action: AdminAction) -> Result<(), CliError> {
    use commands::admin;

    match action {
        AdminAction::Settings => admin::settings(ctx).await,
        AdminAction::Commission { pct } => admin::set_commission(ctx, pct).await,
        AdminAction::Maintenance { state, message } => {
            admin::set_maintenance(ctx, matches!(state, Switch::On), message).await
        }
        AdminAction::Sellers { status } => admin::sellers(ctx, status).await,
        AdminAction::SellerStatus { id, status } => {
            admin::set_seller_status(ctx, &id, status).await
        }
        AdminAction::Products { status } => admin::products(ctx, status).await,
        AdminAction::ProductStatus { id, status } => {
            admin::set_product_status(ctx, &id, status).await
        }
        AdminAction::Users { role, q, limit } => {
            admin::users(ctx, &UserQuery { role, q, limit }).await
        }
        AdminAction::ToggleUser { id } => admin::toggle_user(ctx, &id).await,
        AdminAction::SetRole { id, role } => admin::set_role(ctx, &id, role).await,
        AdminAction::Admins => admin::admins(ctx).await,
        AdminAction::CreateAdmin {
            name,
            username,
            email,
            password,
        } => {
            let admin = NewAdmin {
                name: &name,
                username: &username,
                email: &email,
                password: &password,
            };
            admin::create_admin(ctx, admin).await
        }
        AdminAction::ToggleAdmin { id } => admin::toggle_admin(ctx, &id).await,
        AdminAction::Report { report, out } => admin::report(ctx, report, out).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_flags_only_send_set_filters() {
        let cli = Cli::try_parse_from([
            "bazaar", "products", "list", "--q", "lamp", "--emi-available", "--limit", "5",
        ])
        .unwrap();
        let Commands::Products {
            action: ProductAction::List(args),
        } = cli.command
        else {
            panic!("expected products list");
        };
        let query = ProductQuery::from(args);
        assert_eq!(query.q.as_deref(), Some("lamp"));
        assert_eq!(query.emi_available, Some(true));
        assert_eq!(query.bank_offer, None);
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_admin_parses_typed_values() {
        let cli = Cli::try_parse_from(["bazaar", "admin", "set-role", "u1", "seller"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Admin {
                    action: AdminAction::SetRole { role: Role::Seller, .. }
                }
            })
        ));
        assert!(Cli::try_parse_from(["bazaar", "admin", "report", "invoices"]).is_err());
    }
}
