use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::invoice::{
    EnrichedLineItem, InvoiceDraft, InvoiceView, LineItemInput, ProductCategory,
};
use crate::errors::AppError;
use crate::AppInvoiceService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: Uuid,
    /// Accepts a JSON number or a decimal string, e.g. 5 or "5".
    #[schema(value_type = f64)]
    pub quantity: BigDecimal,
    #[schema(value_type = f64)]
    pub total_price: BigDecimal,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub vendor_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub line_items: Vec<LineItemRequest>,
    /// Recorded on chemical invoices only; ignored elsewhere.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub total_invoice_price: Option<BigDecimal>,
}

impl CreateInvoiceRequest {
    fn into_draft(self) -> InvoiceDraft {
        InvoiceDraft {
            vendor_id: self.vendor_id,
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            line_items: self
                .line_items
                .into_iter()
                .map(|l| LineItemInput {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    total_price: l.total_price,
                    expiry_date: l.expiry_date,
                })
                .collect(),
            total_invoice_price: self.total_invoice_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub product_id: Uuid,
    pub name: String,
    pub unit: String,
    pub threshold_value: i32,
    /// Decimal values are rendered as strings to avoid float rounding.
    pub quantity: String,
    pub total_price: String,
    pub price_per_unit: String,
    pub expiry_date: Option<NaiveDate>,
}

impl From<EnrichedLineItem> for LineItemResponse {
    fn from(item: EnrichedLineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.product_name,
            unit: item.unit,
            threshold_value: item.threshold_value,
            quantity: item.quantity.to_string(),
            total_price: item.total_price.to_string(),
            price_per_unit: item.price_per_unit.to_string(),
            expiry_date: item.expiry_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_id: String,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub vendor_code: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub total_invoice_price: Option<String>,
    pub created_at: String,
    pub line_items: Vec<LineItemResponse>,
}

impl From<InvoiceView> for InvoiceResponse {
    fn from(view: InvoiceView) -> Self {
        Self {
            id: view.id,
            invoice_id: view.invoice_id,
            vendor_id: view.vendor_id,
            vendor_name: view.vendor_name,
            vendor_code: view.vendor_code,
            invoice_number: view.invoice_number,
            invoice_date: view.invoice_date,
            total_invoice_price: view.total_invoice_price.map(|p| p.to_string()),
            created_at: view.created_at.to_rfc3339(),
            line_items: view.line_items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn create(
    service: web::Data<AppInvoiceService>,
    body: CreateInvoiceRequest,
    category: ProductCategory,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let invoice = web::block(move || service.create_invoice(category, body.into_draft()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(InvoiceResponse::from(invoice)))
}

/// POST /invoices
///
/// Creates a chemical invoice. After the invoice commits, each line item is
/// forwarded to the chemical stock aggregator and the "invoice" voucher
/// counter is bumped; failures of either are logged and do not affect the
/// response.
#[utoipa::path(
    post,
    path = "/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceResponse),
        (status = 400, description = "Validation failure or duplicate products"),
        (status = 404, description = "Vendor or product not found"),
        (status = 409, description = "Product category mismatch"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn create_chemical_invoice(
    service: web::Data<AppInvoiceService>,
    body: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    create(service, body.into_inner(), ProductCategory::Chemical).await
}

/// POST /invoices/glassware
///
/// Same shape as the chemical endpoint but restricted to glassware
/// products; no aggregate total is recorded and no stock update is sent.
#[utoipa::path(
    post,
    path = "/invoices/glassware",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceResponse),
        (status = 400, description = "Validation failure or duplicate products"),
        (status = 404, description = "Vendor or product not found"),
        (status = 409, description = "Product category mismatch"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn create_glassware_invoice(
    service: web::Data<AppInvoiceService>,
    body: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    create(service, body.into_inner(), ProductCategory::Glassware).await
}

/// POST /invoices/others
#[utoipa::path(
    post,
    path = "/invoices/others",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceResponse),
        (status = 400, description = "Validation failure or duplicate products"),
        (status = 404, description = "Vendor or product not found"),
        (status = 409, description = "Product category mismatch"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn create_others_invoice(
    service: web::Data<AppInvoiceService>,
    body: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    create(service, body.into_inner(), ProductCategory::Others).await
}

/// GET /invoices
///
/// All invoices, newest first, vendor name and code resolved.
#[utoipa::path(
    get,
    path = "/invoices",
    responses(
        (status = 200, description = "List of invoices", body = [InvoiceResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    service: web::Data<AppInvoiceService>,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let invoices = web::block(move || service.list_invoices())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    let body: Vec<InvoiceResponse> = invoices.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}
