use std::collections::HashSet;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Catalog categories an invoice can be restricted to. Every invoice
/// endpoint accepts exactly one category and rejects products from the
/// other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductCategory {
    Chemical,
    Glassware,
    Others,
}

impl ProductCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Chemical => "chemical",
            ProductCategory::Glassware => "glassware",
            ProductCategory::Others => "others",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chemical" => Some(ProductCategory::Chemical),
            "glassware" => Some(ProductCategory::Glassware),
            "others" => Some(ProductCategory::Others),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: ProductCategory,
    pub unit: String,
    pub threshold_value: i32,
}

#[derive(Debug, Clone)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub vendor_code: String,
}

/// A line item as submitted by the client, before catalog validation.
#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub product_id: Uuid,
    pub quantity: BigDecimal,
    pub total_price: BigDecimal,
    pub expiry_date: Option<NaiveDate>,
}

/// A validated line item carrying the product snapshot taken at invoice
/// time. The snapshot is never re-read, so later catalog edits do not
/// rewrite historical invoices.
#[derive(Debug, Clone)]
pub struct EnrichedLineItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub threshold_value: i32,
    pub quantity: BigDecimal,
    pub total_price: BigDecimal,
    pub price_per_unit: BigDecimal,
    pub expiry_date: Option<NaiveDate>,
}

/// The client-supplied portion of a create request, category-agnostic.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub vendor_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub line_items: Vec<LineItemInput>,
    pub total_invoice_price: Option<BigDecimal>,
}

/// A fully validated invoice ready to be persisted. The display ID is
/// allocated by the store at commit time.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub vendor: Vendor,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub total_invoice_price: Option<BigDecimal>,
    pub line_items: Vec<EnrichedLineItem>,
}

#[derive(Debug, Clone)]
pub struct InvoiceView {
    pub id: Uuid,
    pub invoice_id: String,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub vendor_code: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub total_invoice_price: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<EnrichedLineItem>,
}

/// One denormalized stock update forwarded to the chemical inventory
/// aggregator after a chemical invoice commits.
#[derive(Debug, Clone)]
pub struct ChemicalStockUpdate {
    pub chemical_name: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub vendor: String,
    pub price_per_unit: BigDecimal,
    pub department: String,
}

/// Format the human-readable invoice ID, e.g. `INV-20240101-001`.
/// The suffix is padded to three digits and grows naturally past 999.
pub fn format_invoice_id(day: NaiveDate, seq: i64) -> String {
    format!("INV-{}-{:03}", day.format("%Y%m%d"), seq)
}

/// Reject drafts where two line items reference the same product.
pub fn ensure_unique_products(items: &[LineItemInput]) -> Result<(), DomainError> {
    let distinct: HashSet<Uuid> = items.iter().map(|i| i.product_id).collect();
    if distinct.len() != items.len() {
        return Err(DomainError::Validation(
            "Duplicate products in invoice".to_string(),
        ));
    }
    Ok(())
}

/// Validate one submitted line item against its catalog product and compute
/// the derived unit price. The product fields are copied into the result so
/// the stored invoice is a snapshot, not a reference.
pub fn enrich_line_item(
    product: &Product,
    required: ProductCategory,
    item: &LineItemInput,
) -> Result<EnrichedLineItem, DomainError> {
    if product.category != required {
        return Err(DomainError::CategoryMismatch(format!(
            "Product '{}' is {}, only {} products are allowed on this invoice",
            product.name, product.category, required
        )));
    }
    if item.quantity <= BigDecimal::zero() {
        return Err(DomainError::Validation(format!(
            "Quantity for product '{}' must be positive",
            product.name
        )));
    }
    if item.total_price < BigDecimal::zero() {
        return Err(DomainError::Validation(format!(
            "Total price for product '{}' must not be negative",
            product.name
        )));
    }
    Ok(EnrichedLineItem {
        product_id: product.id,
        product_name: product.name.clone(),
        unit: product.unit.clone(),
        threshold_value: product.threshold_value,
        quantity: item.quantity.clone(),
        total_price: item.total_price.clone(),
        price_per_unit: &item.total_price / &item.quantity,
        expiry_date: item.expiry_date,
    })
}
