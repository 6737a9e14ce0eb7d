use crate::domain::errors::DomainError;
use crate::domain::invoice::{
    ensure_unique_products, enrich_line_item, ChemicalStockUpdate, EnrichedLineItem, InvoiceDraft,
    InvoiceView, NewInvoice, ProductCategory,
};
use crate::domain::ports::{
    InventoryAggregator, InvoiceStore, ProductCatalog, VendorRegistry, VoucherSequencer,
};

/// Voucher counter bumped once per created invoice, regardless of category.
const VOUCHER_CATEGORY: &str = "invoice";

/// Orchestrates the create/query workflows over the collaborator ports.
/// All three create endpoints share this one path; only the accepted
/// category and the side-effect fan-out differ.
pub struct InvoiceService<C, V, S, A, Q> {
    catalog: C,
    vendors: V,
    invoices: S,
    inventory: A,
    vouchers: Q,
}

impl<C, V, S, A, Q> InvoiceService<C, V, S, A, Q>
where
    C: ProductCatalog,
    V: VendorRegistry,
    S: InvoiceStore,
    A: InventoryAggregator,
    Q: VoucherSequencer,
{
    pub fn new(catalog: C, vendors: V, invoices: S, inventory: A, vouchers: Q) -> Self {
        Self {
            catalog,
            vendors,
            invoices,
            inventory,
            vouchers,
        }
    }

    /// Create one invoice restricted to `category`.
    ///
    /// The persistence step is the point of no return: once the store
    /// commits, side-effect failures are logged and swallowed and the
    /// caller still sees the created invoice.
    pub fn create_invoice(
        &self,
        category: ProductCategory,
        draft: InvoiceDraft,
    ) -> Result<InvoiceView, DomainError> {
        if draft.invoice_number.trim().is_empty() {
            return Err(DomainError::Validation(
                "Invoice number is required".to_string(),
            ));
        }
        if draft.line_items.is_empty() {
            return Err(DomainError::Validation(
                "At least one line item is required".to_string(),
            ));
        }
        ensure_unique_products(&draft.line_items)?;

        let vendor = self
            .vendors
            .find_by_id(draft.vendor_id)?
            .ok_or(DomainError::NotFound("Vendor"))?;

        // Lookups run in input order and stop at the first failure, so the
        // reported error is deterministic.
        let mut line_items = Vec::with_capacity(draft.line_items.len());
        for item in &draft.line_items {
            let product = self
                .catalog
                .find_by_id(item.product_id)?
                .ok_or(DomainError::NotFound("Product"))?;
            line_items.push(enrich_line_item(&product, category, item)?);
        }

        // The aggregate total is only recorded on chemical invoices.
        let total_invoice_price = match category {
            ProductCategory::Chemical => draft.total_invoice_price,
            _ => None,
        };

        let invoice = self.invoices.create(NewInvoice {
            vendor,
            invoice_number: draft.invoice_number,
            invoice_date: draft.invoice_date,
            total_invoice_price,
            line_items,
        })?;

        self.dispatch_side_effects(category, &invoice);

        Ok(invoice)
    }

    pub fn list_invoices(&self) -> Result<Vec<InvoiceView>, DomainError> {
        self.invoices.find_all()
    }

    /// Best-effort fan-out after the invoice is durable. Failures here must
    /// never unwind the committed invoice; they are logged and dropped.
    fn dispatch_side_effects(&self, category: ProductCategory, invoice: &InvoiceView) {
        if category == ProductCategory::Chemical {
            let updates: Vec<ChemicalStockUpdate> = invoice
                .line_items
                .iter()
                .map(|item| stock_update(item, &invoice.vendor_name))
                .collect();
            if !updates.is_empty() {
                if let Err(e) = self.inventory.add_chemicals(&updates) {
                    log::warn!(
                        "failed to add chemicals to central stock for {}: {}",
                        invoice.invoice_id,
                        e
                    );
                }
            }
        }

        if let Err(e) = self.vouchers.increment(VOUCHER_CATEGORY) {
            log::warn!(
                "failed to increment voucher counter for {}: {}",
                invoice.invoice_id,
                e
            );
        }
    }
}

fn stock_update(item: &EnrichedLineItem, vendor_name: &str) -> ChemicalStockUpdate {
    ChemicalStockUpdate {
        chemical_name: item.product_name.clone(),
        quantity: item.quantity.clone(),
        unit: item.unit.clone(),
        expiry_date: item.expiry_date,
        vendor: vendor_name.to_string(),
        price_per_unit: item.price_per_unit.clone(),
        department: "chemical".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::invoice::{format_invoice_id, LineItemInput, Product, Vendor};

    #[derive(Default)]
    struct FakeCatalog {
        products: HashMap<Uuid, Product>,
    }

    impl ProductCatalog for FakeCatalog {
        fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
            Ok(self.products.get(&id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeRegistry {
        vendors: HashMap<Uuid, Vendor>,
    }

    impl VendorRegistry for FakeRegistry {
        fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, DomainError> {
            Ok(self.vendors.get(&id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        created: Mutex<Vec<InvoiceView>>,
    }

    impl InvoiceStore for FakeStore {
        fn create(&self, invoice: NewInvoice) -> Result<InvoiceView, DomainError> {
            let mut created = self.created.lock().unwrap();
            let view = InvoiceView {
                id: Uuid::new_v4(),
                invoice_id: format_invoice_id(Utc::now().date_naive(), created.len() as i64 + 1),
                vendor_id: invoice.vendor.id,
                vendor_name: invoice.vendor.name,
                vendor_code: invoice.vendor.vendor_code,
                invoice_number: invoice.invoice_number,
                invoice_date: invoice.invoice_date,
                total_invoice_price: invoice.total_invoice_price,
                created_at: Utc::now(),
                line_items: invoice.line_items,
            };
            created.push(view.clone());
            Ok(view)
        }

        fn find_all(&self) -> Result<Vec<InvoiceView>, DomainError> {
            let mut all = self.created.lock().unwrap().clone();
            all.reverse();
            Ok(all)
        }
    }

    #[derive(Default)]
    struct FakeAggregator {
        updates: Mutex<Vec<ChemicalStockUpdate>>,
        fail: bool,
    }

    impl InventoryAggregator for FakeAggregator {
        fn add_chemicals(&self, updates: &[ChemicalStockUpdate]) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::Internal("aggregator down".to_string()));
            }
            self.updates.lock().unwrap().extend_from_slice(updates);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeVouchers {
        count: Mutex<i64>,
        fail: bool,
    }

    impl VoucherSequencer for FakeVouchers {
        fn increment(&self, _category: &str) -> Result<i64, DomainError> {
            if self.fail {
                return Err(DomainError::Internal("counter down".to_string()));
            }
            let mut count = self.count.lock().unwrap();
            *count += 1;
            Ok(*count)
        }
    }

    type FakeService = InvoiceService<
        std::sync::Arc<FakeCatalog>,
        std::sync::Arc<FakeRegistry>,
        std::sync::Arc<FakeStore>,
        std::sync::Arc<FakeAggregator>,
        std::sync::Arc<FakeVouchers>,
    >;

    struct Fixture {
        service: FakeService,
        store: std::sync::Arc<FakeStore>,
        aggregator: std::sync::Arc<FakeAggregator>,
        vouchers: std::sync::Arc<FakeVouchers>,
        vendor_id: Uuid,
        chemical_id: Uuid,
        glassware_id: Uuid,
    }

    fn fixture(aggregator_fails: bool, vouchers_fail: bool) -> Fixture {
        use std::sync::Arc;

        let vendor_id = Uuid::new_v4();
        let chemical_id = Uuid::new_v4();
        let glassware_id = Uuid::new_v4();

        let mut catalog = FakeCatalog::default();
        catalog.products.insert(
            chemical_id,
            Product {
                id: chemical_id,
                name: "Acetone".to_string(),
                category: ProductCategory::Chemical,
                unit: "g".to_string(),
                threshold_value: 10,
            },
        );
        catalog.products.insert(
            glassware_id,
            Product {
                id: glassware_id,
                name: "Beaker 250ml".to_string(),
                category: ProductCategory::Glassware,
                unit: "pcs".to_string(),
                threshold_value: 5,
            },
        );

        let mut registry = FakeRegistry::default();
        registry.vendors.insert(
            vendor_id,
            Vendor {
                id: vendor_id,
                name: "LabSupply Co".to_string(),
                vendor_code: "LS-01".to_string(),
            },
        );

        let store = Arc::new(FakeStore::default());
        let aggregator = Arc::new(FakeAggregator {
            fail: aggregator_fails,
            ..FakeAggregator::default()
        });
        let vouchers = Arc::new(FakeVouchers {
            fail: vouchers_fail,
            ..FakeVouchers::default()
        });

        let service = InvoiceService::new(
            Arc::new(catalog),
            Arc::new(registry),
            store.clone(),
            aggregator.clone(),
            vouchers.clone(),
        );

        Fixture {
            service,
            store,
            aggregator,
            vouchers,
            vendor_id,
            chemical_id,
            glassware_id,
        }
    }

    fn draft(vendor_id: Uuid, items: Vec<LineItemInput>) -> InvoiceDraft {
        InvoiceDraft {
            vendor_id,
            invoice_number: "IN-1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            line_items: items,
            total_invoice_price: Some(BigDecimal::from(50)),
        }
    }

    fn item(product_id: Uuid, quantity: &str, total_price: &str) -> LineItemInput {
        LineItemInput {
            product_id,
            quantity: BigDecimal::from_str(quantity).unwrap(),
            total_price: BigDecimal::from_str(total_price).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        }
    }

    #[test]
    fn chemical_invoice_computes_unit_price_and_fans_out() {
        let fx = fixture(false, false);

        let invoice = fx
            .service
            .create_invoice(
                ProductCategory::Chemical,
                draft(fx.vendor_id, vec![item(fx.chemical_id, "5", "50")]),
            )
            .expect("create should succeed");

        assert_eq!(invoice.line_items[0].price_per_unit, BigDecimal::from(10));
        assert_eq!(invoice.vendor_name, "LabSupply Co");
        assert_eq!(invoice.total_invoice_price, Some(BigDecimal::from(50)));

        let updates = fx.aggregator.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].chemical_name, "Acetone");
        assert_eq!(updates[0].department, "chemical");
        assert_eq!(updates[0].vendor, "LabSupply Co");
        assert_eq!(*fx.vouchers.count.lock().unwrap(), 1);
    }

    #[test]
    fn glassware_invoice_skips_inventory_and_drops_total() {
        let fx = fixture(false, false);

        let invoice = fx
            .service
            .create_invoice(
                ProductCategory::Glassware,
                draft(fx.vendor_id, vec![item(fx.glassware_id, "4", "100")]),
            )
            .expect("create should succeed");

        assert_eq!(invoice.total_invoice_price, None);
        assert!(fx.aggregator.updates.lock().unwrap().is_empty());
        assert_eq!(*fx.vouchers.count.lock().unwrap(), 1);
    }

    #[test]
    fn unknown_vendor_is_not_found() {
        let fx = fixture(false, false);

        let err = fx
            .service
            .create_invoice(
                ProductCategory::Chemical,
                draft(Uuid::new_v4(), vec![item(fx.chemical_id, "5", "50")]),
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound("Vendor")));
        assert!(fx.store.created.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_product_is_not_found_and_nothing_is_persisted() {
        let fx = fixture(false, false);

        let err = fx
            .service
            .create_invoice(
                ProductCategory::Chemical,
                draft(fx.vendor_id, vec![item(Uuid::new_v4(), "5", "50")]),
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound("Product")));
        assert!(fx.store.created.lock().unwrap().is_empty());
        assert_eq!(*fx.vouchers.count.lock().unwrap(), 0);
    }

    #[test]
    fn duplicate_products_are_rejected_before_lookups() {
        let fx = fixture(false, false);

        let err = fx
            .service
            .create_invoice(
                ProductCategory::Chemical,
                draft(
                    fx.vendor_id,
                    vec![item(fx.chemical_id, "5", "50"), item(fx.chemical_id, "1", "10")],
                ),
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(fx.store.created.lock().unwrap().is_empty());
    }

    #[test]
    fn wrong_category_rejects_and_persists_nothing() {
        let fx = fixture(false, false);

        let err = fx
            .service
            .create_invoice(
                ProductCategory::Chemical,
                draft(fx.vendor_id, vec![item(fx.glassware_id, "5", "50")]),
            )
            .unwrap_err();

        assert!(matches!(err, DomainError::CategoryMismatch(_)));
        assert!(fx.store.created.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_line_items_are_rejected() {
        let fx = fixture(false, false);

        let err = fx
            .service
            .create_invoice(ProductCategory::Chemical, draft(fx.vendor_id, vec![]))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn side_effect_failures_do_not_affect_the_created_invoice() {
        let fx = fixture(true, true);

        let invoice = fx
            .service
            .create_invoice(
                ProductCategory::Chemical,
                draft(fx.vendor_id, vec![item(fx.chemical_id, "5", "50")]),
            )
            .expect("create must succeed even when side effects fail");

        let listed = fx.service.list_invoices().expect("list should succeed");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, invoice.id);
    }

    #[test]
    fn listing_is_newest_first() {
        let fx = fixture(false, false);

        let first = fx
            .service
            .create_invoice(
                ProductCategory::Chemical,
                draft(fx.vendor_id, vec![item(fx.chemical_id, "5", "50")]),
            )
            .unwrap();
        let second = fx
            .service
            .create_invoice(
                ProductCategory::Glassware,
                draft(fx.vendor_id, vec![item(fx.glassware_id, "2", "20")]),
            )
            .unwrap();

        let listed = fx.service.list_invoices().unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }
}
