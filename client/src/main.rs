//! `crm` command-line front end.
//!
//! Configuration comes from `CRM_*` environment variables; logs go to stderr
//! as JSON and command output goes to stdout.
//!
//! # Examples
//! ```sh
//! CRM_API_BASE_URL=https://crm.example.com/api/ crm login --email ada@crm.io --password '…'
//! crm customers list --status active --sort total-spent --desc
//! ```
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use serde::Serialize;
use tokio::runtime::{Builder, Handle};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crm_client::domain::ports::{DEFAULT_GROWTH_MONTHS, ExpiryScheduler, RevenuePeriod};
use crm_client::domain::{
    CustomerDraft, CustomerId, CustomerSort, CustomerStatus, DEFAULT_PER_PAGE, FetchUserOutcome,
    PageRequest, SortOrder, StatusFilter,
};
use crm_client::outbound::scheduler::TokioExpiryScheduler;
use crm_client::{ActionError, AppContext, ClientSettings};
use ortho_config::OrthoConfig;

/// `crm` command arguments.
#[derive(Debug, Parser)]
#[command(name = "crm", about = "Work with CRM customers from the terminal", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and persist the session tokens.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the stored tokens.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Customer records.
    #[command(subcommand)]
    Customers(CustomerCommand),
    /// Month-to-date figures computed from the customer list.
    Dashboard,
    /// Server-side analytics.
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
}

#[derive(Debug, Subcommand)]
enum CustomerCommand {
    /// List one page of customers.
    List {
        /// Case-insensitive match on name, email or company.
        #[arg(long)]
        search: Option<String>,
        /// `all`, `active`, `inactive` or `lead`.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// `name`, `created-at` or `total-spent`.
        #[arg(long)]
        sort: Option<CustomerSort>,
        /// Sort largest first.
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },
    /// Show one customer.
    Show { id: CustomerId },
    /// Create a customer.
    Create(CustomerFields),
    /// Change the given fields of a customer.
    Update {
        id: CustomerId,
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Delete a customer.
    Delete { id: CustomerId },
}

#[derive(Debug, Args)]
struct CustomerFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    status: Option<CustomerStatus>,
    #[arg(long)]
    total_spent: Option<f64>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl From<CustomerFields> for CustomerDraft {
    fn from(fields: CustomerFields) -> Self {
        Self {
            name: fields.name,
            email: fields.email,
            company: fields.company,
            phone: fields.phone,
            status: fields.status,
            total_spent: fields.total_spent,
            address: fields.address,
            notes: fields.notes,
        }
    }
}

#[derive(Debug, Subcommand)]
enum AnalyticsCommand {
    /// Headline figures.
    Summary,
    /// Revenue series.
    Revenue {
        #[arg(long, default_value = "month")]
        period: RevenuePeriod,
    },
    /// Sales funnel.
    Funnel,
    /// New customers per month.
    Growth {
        #[arg(long, default_value_t = DEFAULT_GROWTH_MONTHS)]
        months: u32,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("crm")])
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(cli.command, &settings))
}

async fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    let scheduler: Arc<dyn ExpiryScheduler> =
        Arc::new(TokioExpiryScheduler::new(Handle::current()));
    let context = AppContext::from_settings(settings, scheduler)
        .wrap_err("failed to initialise the CRM client")?;
    let mut out = io::stdout().lock();

    let outcome = execute(&context, command, &mut out).await;
    for note in context.notifications().notifications() {
        match note.message {
            Some(message) => writeln!(out, "[{:?}] {}: {message}", note.severity, note.title)?,
            None => writeln!(out, "[{:?}] {}", note.severity, note.title)?,
        }
    }
    outcome
}

async fn execute(context: &AppContext, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = context
                .login(&email, &password)
                .await
                .map_err(|err| eyre!(err))?;
            write_json(out, &user)
        }
        Command::Logout => {
            context.logout().await;
            Ok(())
        }
        Command::Whoami => match context.restore_session().await {
            FetchUserOutcome::Refreshed(user) => write_json(out, &user),
            FetchUserOutcome::Skipped => Err(eyre!("not signed in")),
            FetchUserOutcome::SessionInvalidated | FetchUserOutcome::Superseded => {
                Err(eyre!("session is no longer valid; sign in again"))
            }
        },
        Command::Customers(command) => customers(context, command, out).await,
        Command::Dashboard => {
            load_all(context).await?;
            write_json(out, &context.customers().dashboard_stats())
        }
        Command::Analytics(command) => analytics(context, command, out).await,
    }
}

async fn customers(
    context: &AppContext,
    command: CustomerCommand,
    out: &mut impl Write,
) -> Result<()> {
    let store = context.customers();
    match command {
        CustomerCommand::List {
            search,
            status,
            sort,
            desc,
            page,
            per_page,
        } => {
            load_all(context).await?;
            store.set_search_query(search.unwrap_or_default());
            store.set_status_filter(status);
            let request = PageRequest {
                sort_by: sort,
                order: if desc { SortOrder::Desc } else { SortOrder::Asc },
                page,
                per_page,
            };
            write_json(out, &store.page(&request))
        }
        CustomerCommand::Show { id } => {
            if !context.load_customer(&id).await {
                return Err(store_error(context));
            }
            let customer = store
                .current_customer()
                .ok_or_else(|| eyre!("customer {id} not found"))?;
            write_json(out, &customer)
        }
        CustomerCommand::Create(fields) => {
            let customer = context
                .create_customer(&fields.into())
                .await
                .map_err(action_error)?;
            write_json(out, &customer)
        }
        CustomerCommand::Update { id, fields } => {
            if !context.load_customer(&id).await {
                return Err(store_error(context));
            }
            context
                .update_customer(&id, &fields.into())
                .await
                .map_err(action_error)?;
            match store.current_customer() {
                Some(customer) => write_json(out, &customer),
                None => Ok(()),
            }
        }
        CustomerCommand::Delete { id } => context.delete_customer(&id).await.map_err(action_error),
    }
}

async fn analytics(
    context: &AppContext,
    command: AnalyticsCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        AnalyticsCommand::Summary => write_json(out, &context.analytics_summary().await?),
        AnalyticsCommand::Revenue { period } => write_json(out, &context.revenue(period).await?),
        AnalyticsCommand::Funnel => write_json(out, &context.funnel().await?),
        AnalyticsCommand::Growth { months } => {
            write_json(out, &context.customer_growth(months).await?)
        }
    }
}

async fn load_all(context: &AppContext) -> Result<()> {
    if context.load_customers().await {
        Ok(())
    } else {
        Err(store_error(context))
    }
}

fn store_error(context: &AppContext) -> color_eyre::Report {
    eyre!(
        context
            .customers()
            .last_error()
            .unwrap_or_else(|| "customer request failed".to_owned())
    )
}

fn action_error(err: ActionError) -> color_eyre::Report {
    match err {
        ActionError::Validation(errors) => {
            let fields = errors
                .iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect::<Vec<_>>()
                .join("; ");
            eyre!("invalid customer ({fields})")
        }
        ActionError::Rejected { message } => eyre!(message),
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).wrap_err("failed to encode output")?;
    writeln!(out)?;
    Ok(())
}
