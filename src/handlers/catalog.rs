use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::invoice::{Product, ProductCategory, Vendor};
use crate::errors::AppError;
use crate::infrastructure::catalog_repo::{DieselProductCatalog, DieselVendorRegistry};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    /// One of "chemical", "glassware", "others".
    pub category: String,
    pub unit: String,
    pub threshold_value: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub threshold_value: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            category: p.category.as_str().to_string(),
            unit: p.unit,
            threshold_value: p.threshold_value,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorRequest {
    pub name: String,
    pub vendor_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorResponse {
    pub id: Uuid,
    pub name: String,
    pub vendor_code: String,
}

impl From<Vendor> for VendorResponse {
    fn from(v: Vendor) -> Self {
        Self {
            id: v.id,
            name: v.name,
            vendor_code: v.vendor_code,
        }
    }
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Unknown category"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_product(
    catalog: web::Data<DieselProductCatalog>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let category = ProductCategory::parse(&body.category).ok_or_else(|| {
        AppError::Validation(format!("Unknown product category '{}'", body.category))
    })?;

    let catalog = catalog.into_inner();
    let product = web::block(move || {
        catalog.insert(Product {
            id: Uuid::new_v4(),
            name: body.name,
            category,
            unit: body.unit,
            threshold_value: body.threshold_value,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "List of products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    catalog: web::Data<DieselProductCatalog>,
) -> Result<HttpResponse, AppError> {
    let catalog = catalog.into_inner();
    let products = web::block(move || catalog.list())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /vendors
#[utoipa::path(
    post,
    path = "/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = VendorResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_vendor(
    registry: web::Data<DieselVendorRegistry>,
    body: web::Json<CreateVendorRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let registry = registry.into_inner();
    let vendor = web::block(move || {
        registry.insert(Vendor {
            id: Uuid::new_v4(),
            name: body.name,
            vendor_code: body.vendor_code,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(VendorResponse::from(vendor)))
}

/// GET /vendors
#[utoipa::path(
    get,
    path = "/vendors",
    responses(
        (status = 200, description = "List of vendors", body = [VendorResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_vendors(
    registry: web::Data<DieselVendorRegistry>,
) -> Result<HttpResponse, AppError> {
    let registry = registry.into_inner();
    let vendors = web::block(move || registry.list())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    let body: Vec<VendorResponse> = vendors.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}
