//! Command-line surface of `invoicer`.
//!
//! Every subcommand returns its report as a `String`; [`run`] prints it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use invoice_core::{
    DocumentLineItem, DocumentService, Estimate, EstimateContent, EstimateStatus, Invoice,
    InvoiceContent, InvoiceRepository, InvoiceStatus, MemoryRepositoryFactory, NewPayment,
    Payment, RepositoryRegistry, TaxBreakdown, TaxCalculator, TaxCalculatorConfig,
};
use invoice_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{AppConfig, ConfigOverrides};
use crate::line_item_loader;
use crate::logging;
use crate::utils::{format_money, format_percent, opt_display, parse_decimal};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Estimates, invoices and payments with per-line tax rates.
#[derive(Debug, Parser)]
#[command(name = "invoicer", version)]
pub struct Cli {
    /// TOML configuration file. Defaults to `invoicer.toml` when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database backend: `sqlite` or `memory`.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `invoices.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log level or `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend.clone(),
            connection_string: self.db.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate totals for a CSV of line items without saving anything.
    Totals {
        /// Line-item CSV (description, quantity, unit, rate, tax_rate).
        #[arg(long)]
        file: PathBuf,

        /// Percent applied to items without a tax rate.
        #[arg(long, value_parser = parse_decimal)]
        default_tax_rate: Option<Decimal>,
    },

    /// Manage estimates.
    #[command(subcommand)]
    Estimate(EstimateCommand),

    /// Manage invoices and payments.
    #[command(subcommand)]
    Invoice(InvoiceCommand),
}

#[derive(Debug, Subcommand)]
pub enum EstimateCommand {
    /// Create an estimate from a line-item CSV.
    Create {
        #[arg(long)]
        client: String,
        #[arg(long)]
        items: PathBuf,
        #[arg(long)]
        valid_until: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Replace an estimate's content and line items.
    Update {
        id: i64,
        #[arg(long)]
        client: String,
        #[arg(long)]
        items: PathBuf,
        #[arg(long)]
        valid_until: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },

    Show {
        id: i64,
    },

    List {
        #[arg(long, value_parser = parse_estimate_status)]
        status: Option<EstimateStatus>,
    },

    /// Create a draft invoice from an estimate.
    Convert {
        id: i64,
        /// Issue date of the new invoice; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    Status {
        id: i64,
        #[arg(value_parser = parse_estimate_status)]
        status: EstimateStatus,
    },

    /// Expire open estimates whose validity date has passed.
    Expire {
        /// Expire as of this date; defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// Create an invoice from a line-item CSV.
    Create {
        #[arg(long)]
        client: String,
        #[arg(long)]
        items: PathBuf,
        /// Defaults to today.
        #[arg(long)]
        issue_date: Option<NaiveDate>,
        /// Defaults to the issue date plus the configured payment terms.
        #[arg(long)]
        due_date: Option<NaiveDate>,
        /// Percent of the total charged per day overdue.
        #[arg(long, value_parser = parse_decimal)]
        late_fee_rate: Option<Decimal>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Replace an invoice's content and line items, keeping its payments.
    Update {
        id: i64,
        #[arg(long)]
        client: String,
        #[arg(long)]
        items: PathBuf,
        #[arg(long)]
        issue_date: Option<NaiveDate>,
        #[arg(long)]
        due_date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_decimal)]
        late_fee_rate: Option<Decimal>,
        #[arg(long)]
        notes: Option<String>,
    },

    Show {
        id: i64,
    },

    List {
        #[arg(long, value_parser = parse_invoice_status)]
        status: Option<InvoiceStatus>,
    },

    /// Record a payment against an invoice.
    Pay {
        id: i64,
        #[arg(long, value_parser = parse_decimal)]
        amount: Decimal,
        /// Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        transaction_id: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a payment and restore the invoice balance.
    RemovePayment {
        payment_id: i64,
    },

    /// Apply late fees to every overdue invoice.
    LateFees {
        /// Assess as of this date; defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Set a manual status (`draft`, `sent` or `overdue`).
    Status {
        id: i64,
        #[arg(value_parser = parse_invoice_status)]
        status: InvoiceStatus,
    },

    Delete {
        id: i64,
    },
}

fn parse_estimate_status(s: &str) -> Result<EstimateStatus, String> {
    EstimateStatus::parse(s).ok_or_else(|| {
        let valid: Vec<_> = EstimateStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("expected one of: {}", valid.join(", "))
    })
}

fn parse_invoice_status(s: &str) -> Result<InvoiceStatus, String> {
    InvoiceStatus::parse(s).ok_or_else(|| {
        let valid: Vec<_> = InvoiceStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("expected one of: {}", valid.join(", "))
    })
}

// ─── entry points ────────────────────────────────────────────────────────────

/// Registry with every backend this binary can open.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

async fn open_repository(config: &AppConfig) -> Result<Box<dyn InvoiceRepository>> {
    let db_config = config.database.db_config();
    debug!(backend = %db_config.backend, "opening repository");
    build_registry().create(&db_config).await.with_context(|| {
        format!(
            "cannot open {} database '{}'",
            db_config.backend, db_config.connection_string
        )
    })
}

/// Loads configuration, starts logging and executes one command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref(), &cli.overrides())?;
    logging::init_logging(&config.logging)?;
    info!(
        backend = %config.database.backend,
        database = %config.database.connection_string,
        "invoicer starting"
    );

    let today = Local::now().date_naive();

    let output = match cli.command {
        Command::Totals {
            file,
            default_tax_rate,
        } => run_totals(&file, default_tax_rate.unwrap_or(config.default_tax_rate))?,
        Command::Estimate(command) => {
            let repo = open_repository(&config).await?;
            let service = DocumentService::new(&*repo, config.service_config());
            run_estimate(&service, command, today).await?
        }
        Command::Invoice(command) => {
            let repo = open_repository(&config).await?;
            let service = DocumentService::new(&*repo, config.service_config());
            run_invoice(&service, command, today).await?
        }
    };

    print!("{output}");
    Ok(())
}

/// Prices a CSV of line items with the calculator alone.
pub fn run_totals(
    file: &Path,
    default_tax_rate: Decimal,
) -> Result<String> {
    let items = line_item_loader::load_from_file(file)?;
    let totals = TaxCalculator::new(TaxCalculatorConfig { default_tax_rate })
        .calculate(&items)?
        .rounded();

    let mut out = format!(
        "{} line items, default tax rate {}\n",
        items.len(),
        format_percent(default_tax_rate)
    );
    out.push_str(&render_totals(&totals));
    Ok(out)
}

pub async fn run_estimate(
    service: &DocumentService<'_>,
    command: EstimateCommand,
    today: NaiveDate,
) -> Result<String> {
    let out = match command {
        EstimateCommand::Create {
            client,
            items,
            valid_until,
            notes,
        } => {
            let content = EstimateContent {
                client_name: client,
                valid_until,
                notes,
                line_items: line_item_loader::load_from_file(&items)?,
            };
            render_estimate(&service.create_estimate(&content).await?)
        }
        EstimateCommand::Update {
            id,
            client,
            items,
            valid_until,
            notes,
        } => {
            let content = EstimateContent {
                client_name: client,
                valid_until,
                notes,
                line_items: line_item_loader::load_from_file(&items)?,
            };
            render_estimate(&service.update_estimate(id, &content).await?)
        }
        EstimateCommand::Show { id } => render_estimate(&service.get_estimate(id).await?),
        EstimateCommand::List { status } => {
            render_estimate_list(&service.list_estimates(status).await?)
        }
        EstimateCommand::Convert { id, date } => {
            let invoice = service
                .convert_estimate_to_invoice(id, date.unwrap_or(today))
                .await?;
            render_invoice(&invoice, &[])
        }
        EstimateCommand::Status { id, status } => {
            service.set_estimate_status(id, status).await?;
            format!("Estimate {id} is now {}\n", status.as_str())
        }
        EstimateCommand::Expire { as_of } => {
            let as_of = as_of.unwrap_or(today);
            let expired = service.expire_estimates(as_of).await?;
            let mut out = format!("{} estimates expired as of {as_of}\n", expired.len());
            for estimate in &expired {
                out.push_str(&format!(
                    "{}  valid until {}  {}\n",
                    estimate.estimate_number,
                    opt_display(estimate.valid_until),
                    estimate.client_name
                ));
            }
            out
        }
        EstimateCommand::Delete { id } => {
            service.delete_estimate(id).await?;
            format!("Deleted estimate {id}\n")
        }
    };
    Ok(out)
}

pub async fn run_invoice(
    service: &DocumentService<'_>,
    command: InvoiceCommand,
    today: NaiveDate,
) -> Result<String> {
    let out = match command {
        InvoiceCommand::Create {
            client,
            items,
            issue_date,
            due_date,
            late_fee_rate,
            notes,
        } => {
            let content = InvoiceContent {
                client_name: client,
                issue_date,
                due_date,
                notes,
                late_fee_rate,
                line_items: line_item_loader::load_from_file(&items)?,
            };
            render_invoice(&service.create_invoice(&content, today).await?, &[])
        }
        InvoiceCommand::Update {
            id,
            client,
            items,
            issue_date,
            due_date,
            late_fee_rate,
            notes,
        } => {
            let content = InvoiceContent {
                client_name: client,
                issue_date,
                due_date,
                notes,
                late_fee_rate,
                line_items: line_item_loader::load_from_file(&items)?,
            };
            let invoice = service.update_invoice(id, &content, today).await?;
            let payments = service.list_payments(id).await?;
            render_invoice(&invoice, &payments)
        }
        InvoiceCommand::Show { id } => {
            let invoice = service.get_invoice(id).await?;
            let payments = service.list_payments(id).await?;
            render_invoice(&invoice, &payments)
        }
        InvoiceCommand::List { status } => {
            render_invoice_list(&service.list_invoices(status).await?)
        }
        InvoiceCommand::Pay {
            id,
            amount,
            date,
            method,
            transaction_id,
            notes,
        } => {
            let (payment, invoice) = service
                .record_payment(&NewPayment {
                    invoice_id: id,
                    amount,
                    payment_method: method,
                    payment_date: date.unwrap_or(today),
                    notes,
                    transaction_id,
                })
                .await?;
            format!(
                "Recorded payment {} of {} on {}: {}, {} due\n",
                payment.id,
                format_money(payment.amount),
                invoice.invoice_number,
                invoice.status.as_str(),
                format_money(invoice.amount_due)
            )
        }
        InvoiceCommand::RemovePayment { payment_id } => {
            let invoice = service.delete_payment(payment_id).await?;
            format!(
                "Deleted payment {payment_id} from {}: {}, {} due\n",
                invoice.invoice_number,
                invoice.status.as_str(),
                format_money(invoice.amount_due)
            )
        }
        InvoiceCommand::LateFees { as_of } => {
            let as_of = as_of.unwrap_or(today);
            let changed = service.assess_late_fees(as_of).await?;
            let mut out = format!("{} invoices updated as of {as_of}\n", changed.len());
            for invoice in &changed {
                out.push_str(&format!(
                    "{}  {:<8}  late fee {:>10}  due {:>10}\n",
                    invoice.invoice_number,
                    invoice.status.as_str(),
                    format_money(invoice.late_fee_amount),
                    format_money(invoice.amount_due)
                ));
            }
            out
        }
        InvoiceCommand::Status { id, status } => {
            service.set_invoice_status(id, status).await?;
            format!("Invoice {id} is now {}\n", status.as_str())
        }
        InvoiceCommand::Delete { id } => {
            service.delete_invoice(id).await?;
            format!("Deleted invoice {id}\n")
        }
    };
    Ok(out)
}

// ─── rendering ───────────────────────────────────────────────────────────────

/// One right-aligned money line of a totals block.
pub fn money_line(
    label: &str,
    amount: Decimal,
) -> String {
    format!("{label:<18}{:>12}\n", format_money(amount))
}

pub fn render_totals(totals: &TaxBreakdown) -> String {
    [
        money_line("Taxable subtotal", totals.taxable_subtotal),
        money_line("Exempt subtotal", totals.exempt_subtotal),
        money_line("Subtotal", totals.subtotal),
        money_line("Tax", totals.total_tax),
        money_line("Total", totals.total),
    ]
    .concat()
}

fn render_line_items(items: &[DocumentLineItem]) -> String {
    let mut out = format!(
        "{:<28} {:>8} {:<6} {:>10} {:>8} {:>12}\n",
        "Description", "Qty", "Unit", "Rate", "Tax", "Amount"
    );
    for item in items {
        out.push_str(&format!(
            "{:<28} {:>8} {:<6} {:>10} {:>8} {:>12}\n",
            item.description,
            item.quantity.normalize(),
            opt_display(item.unit.as_deref()),
            format_money(item.rate),
            format_percent(item.tax_rate),
            format_money(item.amount)
        ));
    }
    out
}

pub fn render_estimate(estimate: &Estimate) -> String {
    let mut out = format!(
        "Estimate {} ({})\nClient:      {}\nValid until: {}\n",
        estimate.estimate_number,
        estimate.status.as_str(),
        estimate.client_name,
        opt_display(estimate.valid_until)
    );
    if let Some(notes) = &estimate.notes {
        out.push_str(&format!("Notes:       {notes}\n"));
    }
    out.push('\n');
    out.push_str(&render_line_items(&estimate.line_items));
    out.push('\n');
    out.push_str(&render_totals(&estimate.totals));
    out
}

pub fn render_invoice(
    invoice: &Invoice,
    payments: &[Payment],
) -> String {
    let mut out = format!(
        "Invoice {} ({})\nClient:      {}\nIssued:      {}\nDue:         {}\n",
        invoice.invoice_number,
        invoice.status.as_str(),
        invoice.client_name,
        invoice.issue_date,
        invoice.due_date
    );
    if let Some(estimate_id) = invoice.estimate_id {
        out.push_str(&format!("From estimate {estimate_id}\n"));
    }
    if let Some(notes) = &invoice.notes {
        out.push_str(&format!("Notes:       {notes}\n"));
    }
    out.push('\n');
    out.push_str(&render_line_items(&invoice.line_items));
    out.push('\n');
    out.push_str(&render_totals(&invoice.totals));
    out.push_str(&money_line("Late fee", invoice.late_fee_amount));
    out.push_str(&money_line("Paid", invoice.amount_paid));
    out.push_str(&money_line("Amount due", invoice.amount_due));

    if !payments.is_empty() {
        out.push_str("\nPayments\n");
        for payment in payments {
            out.push_str(&format!(
                "{:>5}  {}  {:>12}  {}\n",
                payment.id,
                payment.payment_date,
                format_money(payment.amount),
                opt_display(payment.payment_method.as_deref())
            ));
        }
    }
    out
}

pub fn render_estimate_list(estimates: &[Estimate]) -> String {
    if estimates.is_empty() {
        return "No estimates\n".to_string();
    }
    estimates
        .iter()
        .map(|e| {
            format!(
                "{:>5}  {}  {:<9} {:<28} {:>12}\n",
                e.id,
                e.estimate_number,
                e.status.as_str(),
                e.client_name,
                format_money(e.totals.total)
            )
        })
        .collect()
}

pub fn render_invoice_list(invoices: &[Invoice]) -> String {
    if invoices.is_empty() {
        return "No invoices\n".to_string();
    }
    invoices
        .iter()
        .map(|i| {
            format!(
                "{:>5}  {}  {:<8} {:<28} {}  {:>12}  {:>12}\n",
                i.id,
                i.invoice_number,
                i.status.as_str(),
                i.client_name,
                i.due_date,
                format_money(i.totals.total),
                format_money(i.amount_due)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use invoice_core::{MemoryRepository, ServiceConfig};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/sample_line_items.csv"
    );

    fn date(
        year: i32,
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from([
            "invoicer", "invoice", "list", "--status", "overdue", "--db", ":memory:",
        ])
        .unwrap();

        assert_eq!(cli.db.as_deref(), Some(":memory:"));
        assert!(matches!(
            cli.command,
            Command::Invoice(InvoiceCommand::List {
                status: Some(InvoiceStatus::Overdue)
            })
        ));
    }

    #[test]
    fn pay_accepts_thousands_separator() {
        let cli = Cli::try_parse_from(["invoicer", "invoice", "pay", "3", "--amount", "1,250.50"])
            .unwrap();

        match cli.command {
            Command::Invoice(InvoiceCommand::Pay { id, amount, .. }) => {
                assert_eq!(id, 3);
                assert_eq!(amount, dec!(1250.50));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = Cli::try_parse_from(["invoicer", "estimate", "status", "1", "approved"]);

        assert!(result.is_err());
    }

    #[test]
    fn overrides_carry_global_flags() {
        let cli = Cli::try_parse_from([
            "invoicer",
            "--backend",
            "memory",
            "--log-level",
            "debug",
            "estimate",
            "list",
        ])
        .unwrap();

        assert_eq!(
            cli.overrides(),
            ConfigOverrides {
                backend: Some("memory".to_string()),
                connection_string: None,
                log_level: Some("debug".to_string()),
                log_file: None,
            }
        );
    }

    #[test]
    fn build_registry_knows_both_backends() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn totals_of_fixture() {
        let out = run_totals(Path::new(FIXTURE), dec!(13)).unwrap();

        assert!(out.starts_with("4 line items, default tax rate 13%\n"));
        assert!(out.contains(&money_line("Taxable subtotal", dec!(287.50))));
        assert!(out.contains(&money_line("Exempt subtotal", dec!(1200.00))));
        assert!(out.contains(&money_line("Tax", dec!(37.38))));
        assert!(out.contains(&money_line("Total", dec!(1524.88))));
    }

    #[test]
    fn totals_reject_out_of_range_default() {
        assert!(run_totals(Path::new(FIXTURE), dec!(150)).is_err());
    }

    #[test]
    fn money_line_aligns_amounts() {
        assert_eq!(
            money_line("Total", dec!(113)),
            "Total                   113.00\n"
        );
    }

    #[tokio::test]
    async fn estimate_commands_round_trip() {
        let repo = MemoryRepository::new();
        let service = DocumentService::new(&repo, ServiceConfig::default());
        let today = date(2026, 5, 1);

        let created = run_estimate(
            &service,
            EstimateCommand::Create {
                client: "Harbour Renovations".to_string(),
                items: PathBuf::from(FIXTURE),
                valid_until: Some(date(2026, 6, 1)),
                notes: None,
            },
            today,
        )
        .await
        .unwrap();
        assert!(created.starts_with("Estimate EST-000001 (draft)\n"));
        assert!(created.contains("Labour"));

        let listed = run_estimate(&service, EstimateCommand::List { status: None }, today)
            .await
            .unwrap();
        assert!(listed.contains("EST-000001"));
        assert!(listed.contains("1524.88"));

        let converted = run_estimate(&service, EstimateCommand::Convert { id: 1, date: None }, today)
            .await
            .unwrap();
        assert!(converted.starts_with("Invoice INV-000001 (draft)\n"));
        assert!(converted.contains("Due:         2026-05-31\n"));
        assert!(converted.contains(&money_line("Amount due", dec!(1524.88))));
    }

    #[tokio::test]
    async fn invoice_payment_flow() {
        let repo = MemoryRepository::new();
        let service = DocumentService::new(&repo, ServiceConfig::default());
        let today = date(2026, 5, 1);

        run_invoice(
            &service,
            InvoiceCommand::Create {
                client: "Harbour Renovations".to_string(),
                items: PathBuf::from(FIXTURE),
                issue_date: None,
                due_date: None,
                late_fee_rate: None,
                notes: Some("Net 30".to_string()),
            },
            today,
        )
        .await
        .unwrap();

        let paid = run_invoice(
            &service,
            InvoiceCommand::Pay {
                id: 1,
                amount: dec!(524.88),
                date: None,
                method: Some("cheque".to_string()),
                transaction_id: None,
                notes: None,
            },
            today,
        )
        .await
        .unwrap();
        assert_eq!(
            paid,
            "Recorded payment 1 of 524.88 on INV-000001: partial, 1000.00 due\n"
        );

        let shown = run_invoice(&service, InvoiceCommand::Show { id: 1 }, today)
            .await
            .unwrap();
        assert!(shown.contains("Notes:       Net 30\n"));
        assert!(shown.contains("\nPayments\n"));
        assert!(shown.contains("cheque"));

        let removed = run_invoice(
            &service,
            InvoiceCommand::RemovePayment { payment_id: 1 },
            today,
        )
        .await
        .unwrap();
        assert_eq!(
            removed,
            "Deleted payment 1 from INV-000001: sent, 1524.88 due\n"
        );
    }

    #[tokio::test]
    async fn expire_reports_lapsed_estimates() {
        let repo = MemoryRepository::new();
        let service = DocumentService::new(&repo, ServiceConfig::default());
        let today = date(2026, 5, 1);
        run_estimate(
            &service,
            EstimateCommand::Create {
                client: "Harbour Renovations".to_string(),
                items: PathBuf::from(FIXTURE),
                valid_until: Some(date(2026, 6, 1)),
                notes: None,
            },
            today,
        )
        .await
        .unwrap();

        let before = run_estimate(&service, EstimateCommand::Expire { as_of: None }, today)
            .await
            .unwrap();
        let after = run_estimate(
            &service,
            EstimateCommand::Expire {
                as_of: Some(date(2026, 6, 2)),
            },
            today,
        )
        .await
        .unwrap();

        assert_eq!(before, "0 estimates expired as of 2026-05-01\n");
        assert_eq!(
            after,
            "1 estimates expired as of 2026-06-02\n\
             EST-000001  valid until 2026-06-01  Harbour Renovations\n"
        );
        let shown = run_estimate(&service, EstimateCommand::Show { id: 1 }, today)
            .await
            .unwrap();
        assert!(shown.starts_with("Estimate EST-000001 (expired)\n"));
    }

    #[test]
    fn expire_accepts_as_of_flag() {
        let cli =
            Cli::try_parse_from(["invoicer", "estimate", "expire", "--as-of", "2026-06-02"]).unwrap();

        assert!(matches!(
            cli.command,
            Command::Estimate(EstimateCommand::Expire { as_of: Some(d) }) if d == date(2026, 6, 2)
        ));
    }

    #[tokio::test]
    async fn paid_invoice_status_change_is_refused() {
        let repo = MemoryRepository::new();
        let service = DocumentService::new(&repo, ServiceConfig::default());
        let today = date(2026, 5, 1);
        run_invoice(
            &service,
            InvoiceCommand::Create {
                client: "Harbour Renovations".to_string(),
                items: PathBuf::from(FIXTURE),
                issue_date: None,
                due_date: None,
                late_fee_rate: None,
                notes: None,
            },
            today,
        )
        .await
        .unwrap();
        run_invoice(
            &service,
            InvoiceCommand::Pay {
                id: 1,
                amount: dec!(1524.88),
                date: None,
                method: None,
                transaction_id: None,
                notes: None,
            },
            today,
        )
        .await
        .unwrap();

        let err = run_invoice(
            &service,
            InvoiceCommand::Status {
                id: 1,
                status: InvoiceStatus::Sent,
            },
            today,
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invoice 1 is fully paid; delete a payment before changing its status"
        );
    }

    #[tokio::test]
    async fn manual_paid_status_is_refused() {
        let repo = MemoryRepository::new();
        let service = DocumentService::new(&repo, ServiceConfig::default());

        let result = run_invoice(
            &service,
            InvoiceCommand::Status {
                id: 1,
                status: InvoiceStatus::Paid,
            },
            date(2026, 5, 1),
        )
        .await;

        assert!(result.is_err());
    }

    #[test]
    fn empty_lists_say_so() {
        assert_eq!(render_estimate_list(&[]), "No estimates\n");
        assert_eq!(render_invoice_list(&[]), "No invoices\n");
    }
}
