use uuid::Uuid;

use super::errors::DomainError;
use super::invoice::{ChemicalStockUpdate, InvoiceView, NewInvoice, Product, Vendor};

/// Read-only view of the product catalog. The invoice workflow never
/// writes products.
pub trait ProductCatalog: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
}

/// Read-only view of the vendor registry.
pub trait VendorRegistry: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, DomainError>;
}

pub trait InvoiceStore: Send + Sync + 'static {
    /// Persist the invoice, allocating its daily-sequential display ID
    /// atomically in the same transaction.
    fn create(&self, invoice: NewInvoice) -> Result<InvoiceView, DomainError>;
    /// All invoices, newest first, vendor name/code resolved.
    fn find_all(&self) -> Result<Vec<InvoiceView>, DomainError>;
}

/// The "Chemical Master" collaborator. Errors from it are logged and
/// swallowed by the caller, never propagated to the invoice outcome.
pub trait InventoryAggregator: Send + Sync + 'static {
    fn add_chemicals(&self, updates: &[ChemicalStockUpdate]) -> Result<(), DomainError>;
}

/// Per-category accounting counter, bumped once per created invoice.
pub trait VoucherSequencer: Send + Sync + 'static {
    fn increment(&self, category: &str) -> Result<i64, DomainError>;
}

// Allow shared handles to be used wherever a port is expected.
impl<T: ProductCatalog + ?Sized> ProductCatalog for std::sync::Arc<T> {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        (**self).find_by_id(id)
    }
}

impl<T: VendorRegistry + ?Sized> VendorRegistry for std::sync::Arc<T> {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, DomainError> {
        (**self).find_by_id(id)
    }
}

impl<T: InvoiceStore + ?Sized> InvoiceStore for std::sync::Arc<T> {
    fn create(&self, invoice: NewInvoice) -> Result<InvoiceView, DomainError> {
        (**self).create(invoice)
    }

    fn find_all(&self) -> Result<Vec<InvoiceView>, DomainError> {
        (**self).find_all()
    }
}

impl<T: InventoryAggregator + ?Sized> InventoryAggregator for std::sync::Arc<T> {
    fn add_chemicals(&self, updates: &[ChemicalStockUpdate]) -> Result<(), DomainError> {
        (**self).add_chemicals(updates)
    }
}

impl<T: VoucherSequencer + ?Sized> VoucherSequencer for std::sync::Arc<T> {
    fn increment(&self, category: &str) -> Result<i64, DomainError> {
        (**self).increment(category)
    }
}
