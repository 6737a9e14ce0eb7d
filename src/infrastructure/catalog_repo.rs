use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::invoice::{Product, ProductCategory, Vendor};
use crate::domain::ports::{ProductCatalog, VendorRegistry};
use crate::schema::{products, vendors};

use super::models::{NewProductRow, NewVendorRow, ProductRow, VendorRow};

fn to_product(row: ProductRow) -> Result<Product, DomainError> {
    let category = ProductCategory::parse(&row.category).ok_or_else(|| {
        DomainError::Internal(format!(
            "product {} has unknown category '{}'",
            row.id, row.category
        ))
    })?;
    Ok(Product {
        id: row.id,
        name: row.name,
        category,
        unit: row.unit,
        threshold_value: row.threshold_value,
    })
}

fn to_vendor(row: VendorRow) -> Vendor {
    Vendor {
        id: row.id,
        name: row.name,
        vendor_code: row.vendor_code,
    }
}

#[derive(Clone)]
pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Used by the catalog admin endpoints; the invoice workflow only ever
    /// reads through the `ProductCatalog` trait.
    pub fn insert(&self, product: Product) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = NewProductRow {
            id: product.id,
            name: product.name,
            category: product.category.as_str().to_string(),
            unit: product.unit,
            threshold_value: product.threshold_value,
        };
        diesel::insert_into(products::table)
            .values(&row)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .map_err(DomainError::from)
            .and_then(to_product)
    }

    pub fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(to_product)
            .collect()
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(to_product)
            .transpose()
    }
}

#[derive(Clone)]
pub struct DieselVendorRegistry {
    pool: DbPool,
}

impl DieselVendorRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn insert(&self, vendor: Vendor) -> Result<Vendor, DomainError> {
        let mut conn = self.pool.get()?;
        let row = NewVendorRow {
            id: vendor.id,
            name: vendor.name,
            vendor_code: vendor.vendor_code,
        };
        let row: VendorRow = diesel::insert_into(vendors::table)
            .values(&row)
            .returning(VendorRow::as_returning())
            .get_result(&mut conn)?;
        Ok(to_vendor(row))
    }

    pub fn list(&self) -> Result<Vec<Vendor>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = vendors::table
            .select(VendorRow::as_select())
            .order(vendors::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(to_vendor).collect())
    }
}

impl VendorRegistry for DieselVendorRegistry {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = vendors::table
            .filter(vendors::id.eq(id))
            .select(VendorRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(to_vendor))
    }
}
