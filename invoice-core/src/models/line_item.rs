use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{LineItem, LineItemError, TaxCalculationError};

/// A persisted line item as stored on an estimate or invoice.
///
/// `tax_rate` is the resolved rate: the default has already been substituted
/// for items that were entered without one, so a later change to the default
/// never alters stored documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLineItem {
    pub id: i64,
    pub description: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub rate: Decimal,
    pub amount: Decimal,
    pub tax_rate: Decimal,
    pub sort_order: i32,
}

impl DocumentLineItem {
    /// Converts back into calculator input with the stored rate made explicit.
    pub fn to_line_item(&self) -> LineItem {
        LineItem {
            description: self.description.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            rate: self.rate,
            tax_rate: Some(self.tax_rate),
        }
    }
}

/// For inserting line items (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocumentLineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub rate: Decimal,
    pub amount: Decimal,
    pub tax_rate: Decimal,
    pub sort_order: i32,
}

impl NewDocumentLineItem {
    pub fn from_line_item(
        item: &LineItem,
        default_tax_rate: Decimal,
        sort_order: i32,
    ) -> Result<Self, LineItemError> {
        Ok(Self {
            description: item.description.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            rate: item.rate,
            amount: item.amount()?,
            tax_rate: item.effective_tax_rate(default_tax_rate),
            sort_order,
        })
    }
}

impl From<&DocumentLineItem> for NewDocumentLineItem {
    fn from(item: &DocumentLineItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            rate: item.rate,
            amount: item.amount,
            tax_rate: item.tax_rate,
            sort_order: item.sort_order,
        }
    }
}

/// Resolves calculator input into storable rows, numbering them in input order.
pub fn resolve_line_items(
    items: &[LineItem],
    default_tax_rate: Decimal,
) -> Result<Vec<NewDocumentLineItem>, TaxCalculationError> {
    items
        .iter()
        .zip(0..)
        .enumerate()
        .map(|(index, (item, sort_order))| {
            NewDocumentLineItem::from_line_item(item, default_tax_rate, sort_order)
                .map_err(|source| TaxCalculationError::InvalidLineItem { index, source })
        })
        .collect()
}
