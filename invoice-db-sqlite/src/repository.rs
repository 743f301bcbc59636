use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use invoice_core::{
    DocumentLineItem, ESTIMATE_PREFIX, Estimate, EstimateStatus, INVOICE_PREFIX, Invoice,
    InvoiceBalance, InvoiceRepository, InvoiceStatus, NewDocumentLineItem, NewEstimate,
    NewInvoice, NewPayment, Payment, RepositoryError, TaxBreakdown, format_document_number,
};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Decode, Row, Sqlite, Type};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

const ESTIMATE_COLUMNS: &str = "SELECT id, estimate_number, client_name, status, valid_until, notes,
        taxable_subtotal, exempt_subtotal, subtotal, total_tax, total,
        created_at, updated_at
     FROM estimates";

const INVOICE_COLUMNS: &str = "SELECT id, invoice_number, estimate_id, client_name, status,
        issue_date, due_date, notes,
        taxable_subtotal, exempt_subtotal, subtotal, total_tax, total,
        late_fee_rate, late_fee_amount, amount_paid, amount_due, paid_at,
        created_at, updated_at
     FROM invoices";

const PAYMENT_COLUMNS: &str = "SELECT id, invoice_id, amount, payment_method, payment_date,
        notes, transaction_id, created_at
     FROM payments";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens a pool for `connection_string`.
    ///
    /// `":memory:"` gets a single long-lived connection, since every SQLite
    /// connection to `:memory:` is a separate database. Bare paths are
    /// created if missing; strings starting with `sqlite:` are passed to sqlx
    /// as URLs.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let connected = if connection_string == ":memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await
        } else {
            let options = if connection_string.starts_with("sqlite:") {
                SqliteConnectOptions::from_str(connection_string)
                    .with_context(|| format!("Invalid database URL: {}", connection_string))?
            } else {
                SqliteConnectOptions::new()
                    .filename(connection_string)
                    .create_if_missing(true)
            };
            SqlitePoolOptions::new()
                .connect_with(options.foreign_keys(true))
                .await
        };
        let pool = connected
            .with_context(|| format!("Failed to connect to database: {}", connection_string))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    #[cfg(test)]
    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_line_items(
        &self,
        table: LineItemTable,
        parent_id: i64,
    ) -> Result<Vec<DocumentLineItem>, RepositoryError> {
        let rows = sqlx::query(table.select_sql())
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_line_item).collect()
    }

    async fn load_estimate(
        &self,
        row: &SqliteRow,
    ) -> Result<Estimate, RepositoryError> {
        let id: i64 = column(row, "id")?;
        let line_items = self.fetch_line_items(LineItemTable::Estimate, id).await?;
        row_to_estimate(row, line_items)
    }

    async fn load_invoice(
        &self,
        row: &SqliteRow,
    ) -> Result<Invoice, RepositoryError> {
        let id: i64 = column(row, "id")?;
        let line_items = self.fetch_line_items(LineItemTable::Invoice, id).await?;
        row_to_invoice(row, line_items)
    }
}

/// The two tables holding document line items share one layout.
#[derive(Debug, Clone, Copy)]
enum LineItemTable {
    Estimate,
    Invoice,
}

impl LineItemTable {
    fn insert_sql(self) -> &'static str {
        match self {
            Self::Estimate => {
                "INSERT INTO estimate_line_items (
                    estimate_id, description, quantity, unit, rate, amount, tax_rate, sort_order
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
            }
            Self::Invoice => {
                "INSERT INTO invoice_line_items (
                    invoice_id, description, quantity, unit, rate, amount, tax_rate, sort_order
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
            }
        }
    }

    fn select_sql(self) -> &'static str {
        match self {
            Self::Estimate => {
                "SELECT id, description, quantity, unit, rate, amount, tax_rate, sort_order
                 FROM estimate_line_items WHERE estimate_id = ? ORDER BY sort_order, id"
            }
            Self::Invoice => {
                "SELECT id, description, quantity, unit, rate, amount, tax_rate, sort_order
                 FROM invoice_line_items WHERE invoice_id = ? ORDER BY sort_order, id"
            }
        }
    }

    fn delete_sql(self) -> &'static str {
        match self {
            Self::Estimate => "DELETE FROM estimate_line_items WHERE estimate_id = ?",
            Self::Invoice => "DELETE FROM invoice_line_items WHERE invoice_id = ?",
        }
    }
}

async fn replace_line_items(
    conn: &mut SqliteConnection,
    table: LineItemTable,
    parent_id: i64,
    items: &[NewDocumentLineItem],
) -> Result<(), RepositoryError> {
    sqlx::query(table.delete_sql())
        .bind(parent_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    for item in items {
        sqlx::query(table.insert_sql())
            .bind(parent_id)
            .bind(&item.description)
            .bind(decimal_to_text(item.quantity))
            .bind(item.unit.as_deref())
            .bind(decimal_to_text(item.rate))
            .bind(decimal_to_text(item.amount))
            .bind(decimal_to_text(item.tax_rate))
            .bind(item.sort_order)
            .execute(&mut *conn)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
    }

    Ok(())
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn row_to_line_item(row: &SqliteRow) -> Result<DocumentLineItem, RepositoryError> {
    Ok(DocumentLineItem {
        id: column(row, "id")?,
        description: column(row, "description")?,
        quantity: get_decimal(row, "quantity")?,
        unit: column(row, "unit")?,
        rate: get_decimal(row, "rate")?,
        amount: get_decimal(row, "amount")?,
        tax_rate: get_decimal(row, "tax_rate")?,
        sort_order: column(row, "sort_order")?,
    })
}

fn row_to_totals(row: &SqliteRow) -> Result<TaxBreakdown, RepositoryError> {
    Ok(TaxBreakdown {
        taxable_subtotal: get_decimal(row, "taxable_subtotal")?,
        exempt_subtotal: get_decimal(row, "exempt_subtotal")?,
        subtotal: get_decimal(row, "subtotal")?,
        total_tax: get_decimal(row, "total_tax")?,
        total: get_decimal(row, "total")?,
    })
}

fn row_to_estimate(
    row: &SqliteRow,
    line_items: Vec<DocumentLineItem>,
) -> Result<Estimate, RepositoryError> {
    let status_str: String = column(row, "status")?;
    let status = EstimateStatus::parse(&status_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid estimate status: {}", status_str))
    })?;
    let estimate_number: Option<String> = column(row, "estimate_number")?;

    Ok(Estimate {
        id: column(row, "id")?,
        estimate_number: estimate_number.unwrap_or_default(),
        client_name: column(row, "client_name")?,
        status,
        valid_until: column::<Option<NaiveDate>>(row, "valid_until")?,
        notes: column(row, "notes")?,
        totals: row_to_totals(row)?,
        line_items,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_invoice(
    row: &SqliteRow,
    line_items: Vec<DocumentLineItem>,
) -> Result<Invoice, RepositoryError> {
    let status_str: String = column(row, "status")?;
    let status = InvoiceStatus::parse(&status_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid invoice status: {}", status_str))
    })?;
    let invoice_number: Option<String> = column(row, "invoice_number")?;

    Ok(Invoice {
        id: column(row, "id")?,
        invoice_number: invoice_number.unwrap_or_default(),
        estimate_id: column(row, "estimate_id")?,
        client_name: column(row, "client_name")?,
        status,
        issue_date: column::<NaiveDate>(row, "issue_date")?,
        due_date: column::<NaiveDate>(row, "due_date")?,
        notes: column(row, "notes")?,
        totals: row_to_totals(row)?,
        late_fee_rate: get_decimal(row, "late_fee_rate")?,
        late_fee_amount: get_decimal(row, "late_fee_amount")?,
        amount_paid: get_decimal(row, "amount_paid")?,
        amount_due: get_decimal(row, "amount_due")?,
        paid_at: column::<Option<DateTime<Utc>>>(row, "paid_at")?,
        line_items,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_payment(row: &SqliteRow) -> Result<Payment, RepositoryError> {
    Ok(Payment {
        id: column(row, "id")?,
        invoice_id: column(row, "invoice_id")?,
        amount: get_decimal(row, "amount")?,
        payment_method: column(row, "payment_method")?,
        payment_date: column::<NaiveDate>(row, "payment_date")?,
        notes: column(row, "notes")?,
        transaction_id: column(row, "transaction_id")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

#[async_trait]
impl InvoiceRepository for SqliteRepository {
    async fn create_estimate(
        &self,
        estimate: &NewEstimate,
    ) -> Result<Estimate, RepositoryError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO estimates (
                client_name, status, valid_until, notes,
                taxable_subtotal, exempt_subtotal, subtotal, total_tax, total,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&estimate.client_name)
        .bind(estimate.status.as_str())
        .bind(estimate.valid_until)
        .bind(estimate.notes.as_deref())
        .bind(decimal_to_text(estimate.totals.taxable_subtotal))
        .bind(decimal_to_text(estimate.totals.exempt_subtotal))
        .bind(decimal_to_text(estimate.totals.subtotal))
        .bind(decimal_to_text(estimate.totals.total_tax))
        .bind(decimal_to_text(estimate.totals.total))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();

        sqlx::query("UPDATE estimates SET estimate_number = ? WHERE id = ?")
            .bind(format_document_number(ESTIMATE_PREFIX, id))
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        replace_line_items(&mut tx, LineItemTable::Estimate, id, &estimate.line_items).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(estimate_id = id, line_items = estimate.line_items.len(), "inserted estimate");
        self.get_estimate(id).await
    }

    async fn get_estimate(
        &self,
        id: i64,
    ) -> Result<Estimate, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", ESTIMATE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        self.load_estimate(&row).await
    }

    async fn list_estimates(
        &self,
        status: Option<EstimateStatus>,
    ) -> Result<Vec<Estimate>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{} WHERE status = ? ORDER BY id DESC",
                    ESTIMATE_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY id DESC", ESTIMATE_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut estimates = Vec::with_capacity(rows.len());
        for row in &rows {
            estimates.push(self.load_estimate(row).await?);
        }
        Ok(estimates)
    }

    async fn update_estimate(
        &self,
        id: i64,
        estimate: &NewEstimate,
    ) -> Result<Estimate, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE estimates SET
                client_name = ?, status = ?, valid_until = ?, notes = ?,
                taxable_subtotal = ?, exempt_subtotal = ?, subtotal = ?, total_tax = ?, total = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&estimate.client_name)
        .bind(estimate.status.as_str())
        .bind(estimate.valid_until)
        .bind(estimate.notes.as_deref())
        .bind(decimal_to_text(estimate.totals.taxable_subtotal))
        .bind(decimal_to_text(estimate.totals.exempt_subtotal))
        .bind(decimal_to_text(estimate.totals.subtotal))
        .bind(decimal_to_text(estimate.totals.total_tax))
        .bind(decimal_to_text(estimate.totals.total))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        replace_line_items(&mut tx, LineItemTable::Estimate, id, &estimate.line_items).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_estimate(id).await
    }

    async fn update_estimate_status(
        &self,
        id: i64,
        status: EstimateStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE estimates SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_estimate(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM estimates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn create_invoice(
        &self,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO invoices (
                estimate_id, client_name, status, issue_date, due_date, notes,
                taxable_subtotal, exempt_subtotal, subtotal, total_tax, total,
                late_fee_rate, late_fee_amount, amount_paid, amount_due, paid_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(invoice.estimate_id)
        .bind(&invoice.client_name)
        .bind(invoice.balance.status.as_str())
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.notes.as_deref())
        .bind(decimal_to_text(invoice.totals.taxable_subtotal))
        .bind(decimal_to_text(invoice.totals.exempt_subtotal))
        .bind(decimal_to_text(invoice.totals.subtotal))
        .bind(decimal_to_text(invoice.totals.total_tax))
        .bind(decimal_to_text(invoice.totals.total))
        .bind(decimal_to_text(invoice.late_fee_rate))
        .bind(decimal_to_text(invoice.balance.late_fee_amount))
        .bind(decimal_to_text(invoice.balance.amount_paid))
        .bind(decimal_to_text(invoice.balance.amount_due))
        .bind(invoice.balance.paid_at)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();

        sqlx::query("UPDATE invoices SET invoice_number = ? WHERE id = ?")
            .bind(format_document_number(INVOICE_PREFIX, id))
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        replace_line_items(&mut tx, LineItemTable::Invoice, id, &invoice.line_items).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(invoice_id = id, line_items = invoice.line_items.len(), "inserted invoice");
        self.get_invoice(id).await
    }

    async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<Invoice, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", INVOICE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        self.load_invoice(&row).await
    }

    async fn list_invoices(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{} WHERE status = ? ORDER BY id DESC",
                    INVOICE_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY id DESC", INVOICE_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in &rows {
            invoices.push(self.load_invoice(row).await?);
        }
        Ok(invoices)
    }

    async fn update_invoice(
        &self,
        id: i64,
        invoice: &NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE invoices SET
                estimate_id = ?, client_name = ?, status = ?, issue_date = ?, due_date = ?,
                notes = ?,
                taxable_subtotal = ?, exempt_subtotal = ?, subtotal = ?, total_tax = ?, total = ?,
                late_fee_rate = ?, late_fee_amount = ?, amount_paid = ?, amount_due = ?,
                paid_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(invoice.estimate_id)
        .bind(&invoice.client_name)
        .bind(invoice.balance.status.as_str())
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.notes.as_deref())
        .bind(decimal_to_text(invoice.totals.taxable_subtotal))
        .bind(decimal_to_text(invoice.totals.exempt_subtotal))
        .bind(decimal_to_text(invoice.totals.subtotal))
        .bind(decimal_to_text(invoice.totals.total_tax))
        .bind(decimal_to_text(invoice.totals.total))
        .bind(decimal_to_text(invoice.late_fee_rate))
        .bind(decimal_to_text(invoice.balance.late_fee_amount))
        .bind(decimal_to_text(invoice.balance.amount_paid))
        .bind(decimal_to_text(invoice.balance.amount_due))
        .bind(invoice.balance.paid_at)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        replace_line_items(&mut tx, LineItemTable::Invoice, id, &invoice.line_items).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_invoice(id).await
    }

    async fn update_invoice_status(
        &self,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE invoices SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn update_invoice_balance(
        &self,
        id: i64,
        balance: &InvoiceBalance,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE invoices SET
                status = ?, late_fee_amount = ?, amount_paid = ?, amount_due = ?,
                paid_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(balance.status.as_str())
        .bind(decimal_to_text(balance.late_fee_amount))
        .bind(decimal_to_text(balance.amount_paid))
        .bind(decimal_to_text(balance.amount_due))
        .bind(balance.paid_at)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_invoice(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn add_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<Payment, RepositoryError> {
        sqlx::query("SELECT id FROM invoices WHERE id = ?")
            .bind(payment.invoice_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        let result = sqlx::query(
            "INSERT INTO payments (
                invoice_id, amount, payment_method, payment_date, notes, transaction_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(payment.invoice_id)
        .bind(decimal_to_text(payment.amount))
        .bind(payment.payment_method.as_deref())
        .bind(payment.payment_date)
        .bind(payment.notes.as_deref())
        .bind(payment.transaction_id.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_payment(result.last_insert_rowid()).await
    }

    async fn get_payment(
        &self,
        id: i64,
    ) -> Result<Payment, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", PAYMENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_payment(&row)
    }

    async fn list_payments(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{} WHERE invoice_id = ? ORDER BY payment_date, id",
            PAYMENT_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_payment).collect()
    }

    async fn delete_payment(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
