use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{
    chemical_stock, invoice_line_items, invoices, products, users, vendors, voucher_counters,
};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub threshold_value: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub threshold_value: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = vendors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VendorRow {
    pub id: Uuid,
    pub name: String,
    pub vendor_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = vendors)]
pub struct NewVendorRow {
    pub id: Uuid,
    pub name: String,
    pub vendor_code: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceRow {
    pub id: Uuid,
    pub invoice_id: String,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub total_invoice_price: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = invoices)]
pub struct NewInvoiceRow {
    pub id: Uuid,
    pub invoice_id: String,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub total_invoice_price: Option<BigDecimal>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = invoice_line_items)]
#[diesel(belongs_to(InvoiceRow, foreign_key = invoice_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceLineItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub threshold_value: i32,
    pub quantity: BigDecimal,
    pub total_price: BigDecimal,
    pub price_per_unit: BigDecimal,
    pub expiry_date: Option<NaiveDate>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = invoice_line_items)]
pub struct NewInvoiceLineItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub threshold_value: i32,
    pub quantity: BigDecimal,
    pub total_price: BigDecimal,
    pub price_per_unit: BigDecimal,
    pub expiry_date: Option<NaiveDate>,
    pub position: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = chemical_stock)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChemicalStockRow {
    pub id: Uuid,
    pub chemical_name: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub vendor: String,
    pub price_per_unit: BigDecimal,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chemical_stock)]
pub struct NewChemicalStockRow {
    pub id: Uuid,
    pub chemical_name: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub expiry_date: Option<NaiveDate>,
    pub vendor: String,
    pub price_per_unit: BigDecimal,
    pub department: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = voucher_counters)]
#[diesel(primary_key(category))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VoucherCounterRow {
    pub category: String,
    pub current_value: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub lab_id: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub lab_id: Option<String>,
}
