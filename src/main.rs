use clap::{Parser, Subcommand};
use groupsettle::application::service::BalanceService;
use groupsettle::config::Settings;
use groupsettle::domain::model::{GroupId, MemberId};
use groupsettle::domain::ports::{ExpenseRepository, GroupRepository, PaymentRepository};
use groupsettle::domain::simplify::SimplifyStrategy;
use groupsettle::infrastructure::in_memory::{
    InMemoryExpenseRepository, InMemoryGroupRepository, InMemoryPaymentRepository,
};
use groupsettle::interfaces::csv::expense_reader::ExpenseReader;
use groupsettle::interfaces::json::snapshot_reader::SnapshotReader;
use groupsettle::interfaces::report::{ReportFormat, ReportWriter};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON snapshot of groups, expenses and payments
    snapshot: PathBuf,

    /// Group to report on
    #[arg(long)]
    group: String,

    /// Extra expenses in flat CSV form, one row per split
    #[arg(long)]
    expenses_csv: Option<PathBuf>,

    /// Debt matching policy: largest-first or in-order
    #[arg(long, env = "GROUPSETTLE_STRATEGY")]
    strategy: Option<SimplifyStrategy>,

    /// Report format: json or csv
    #[arg(long, env = "GROUPSETTLE_FORMAT")]
    format: Option<ReportFormat>,

    /// TOML settings file
    #[arg(long, env = "GROUPSETTLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Net balance of every member (default)
    Balances,
    /// Transfers that settle the group
    Simplify,
    /// One member's balance and transfers
    Member { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut settings = Settings::load_or_default(cli.config.as_deref()).into_diagnostic()?;
    if let Some(strategy) = cli.strategy {
        settings.strategy = strategy;
    }
    if let Some(format) = cli.format {
        settings.format = format;
    }

    let groups = InMemoryGroupRepository::new();
    let expenses = InMemoryExpenseRepository::new();
    let payments = InMemoryPaymentRepository::new();

    let file = File::open(&cli.snapshot).into_diagnostic()?;
    let snapshot = SnapshotReader::new(file)
        .with_default_currency(settings.default_currency.as_str())
        .read()
        .into_diagnostic()?;
    info!(
        groups = snapshot.groups.len(),
        expenses = snapshot.expenses.len(),
        payments = snapshot.payments.len(),
        "Loaded snapshot"
    );
    for group in snapshot.groups {
        groups.store(group).await.into_diagnostic()?;
    }
    for expense in snapshot.expenses {
        expenses.store(expense).await.into_diagnostic()?;
    }
    for payment in snapshot.payments {
        payments.store(payment).await.into_diagnostic()?;
    }

    if let Some(path) = &cli.expenses_csv {
        let file = File::open(path).into_diagnostic()?;
        let reader = ExpenseReader::new(file);
        for result in reader.expenses() {
            match result {
                Ok(expense) => {
                    expenses.store(expense).await.into_diagnostic()?;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable expense");
                }
            }
        }
    }

    let service = BalanceService::new(Box::new(groups), Box::new(expenses), Box::new(payments))
        .with_strategy(settings.strategy);
    let group_id = GroupId::new(cli.group);

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock(), settings.format);
    match cli.command.unwrap_or(Command::Balances) {
        Command::Balances => {
            let balances = service.group_balances(&group_id).await.into_diagnostic()?;
            writer.write_balances(&balances).into_diagnostic()?;
        }
        Command::Simplify => {
            let debts = service.simplified_debts(&group_id).await.into_diagnostic()?;
            writer.write_debts(&debts).into_diagnostic()?;
        }
        Command::Member { id } => {
            let summary = service
                .member_summary(&group_id, &MemberId::new(id))
                .await
                .into_diagnostic()?;
            writer.write_summary(&summary).into_diagnostic()?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only the report.
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("groupsettle=info"));

    if std::env::var("GROUPSETTLE_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}
