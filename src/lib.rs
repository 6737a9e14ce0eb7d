pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod mailer;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::invoice_service::InvoiceService;
use auth::OtpStore;
use handlers::auth::AuthState;
use infrastructure::catalog_repo::{DieselProductCatalog, DieselVendorRegistry};
use infrastructure::invoice_repo::DieselInvoiceStore;
use infrastructure::side_effects::{DieselInventoryAggregator, DieselVoucherSequencer};
use infrastructure::user_repo::DieselUserRepository;
use mailer::{LogMailer, Mailer};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Password-reset codes live this long.
const OTP_TTL: Duration = Duration::from_secs(10 * 60);

/// The invoice workflow wired to its Postgres-backed collaborators.
pub type AppInvoiceService = InvoiceService<
    DieselProductCatalog,
    DieselVendorRegistry,
    DieselInvoiceStore,
    DieselInventoryAggregator,
    DieselVoucherSequencer,
>;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::invoices::create_chemical_invoice,
        handlers::invoices::create_glassware_invoice,
        handlers::invoices::create_others_invoice,
        handlers::invoices::list_invoices,
        handlers::catalog::create_product,
        handlers::catalog::list_products,
        handlers::catalog::create_vendor,
        handlers::catalog::list_vendors,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::current_user,
        handlers::auth::forgot_password,
        handlers::auth::verify_otp,
        handlers::auth::reset_password,
    ),
    components(schemas(
        handlers::invoices::CreateInvoiceRequest,
        handlers::invoices::LineItemRequest,
        handlers::invoices::InvoiceResponse,
        handlers::invoices::LineItemResponse,
        handlers::catalog::CreateProductRequest,
        handlers::catalog::ProductResponse,
        handlers::catalog::CreateVendorRequest,
        handlers::catalog::VendorResponse,
        handlers::auth::RegisterRequest,
        handlers::auth::LoginRequest,
        handlers::auth::UserResponse,
        handlers::auth::ForgotPasswordRequest,
        handlers::auth::VerifyOtpRequest,
        handlers::auth::ResetPasswordRequest,
    ))
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
    jwt_secret: String,
) -> std::io::Result<actix_web::dev::Server> {
    let invoice_service = web::Data::new(InvoiceService::new(
        DieselProductCatalog::new(pool.clone()),
        DieselVendorRegistry::new(pool.clone()),
        DieselInvoiceStore::new(pool.clone()),
        DieselInventoryAggregator::new(pool.clone()),
        DieselVoucherSequencer::new(pool.clone()),
    ));
    let catalog = web::Data::new(DieselProductCatalog::new(pool.clone()));
    let registry = web::Data::new(DieselVendorRegistry::new(pool.clone()));
    let users = web::Data::new(DieselUserRepository::new(pool));
    let auth_state = web::Data::new(AuthState {
        jwt_secret,
        otp_store: OtpStore::new(OTP_TTL),
        mailer: Arc::new(LogMailer) as Arc<dyn Mailer>,
    });

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(invoice_service.clone())
            .app_data(catalog.clone())
            .app_data(registry.clone())
            .app_data(users.clone())
            .app_data(auth_state.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/invoices")
                    .route("", web::post().to(handlers::invoices::create_chemical_invoice))
                    .route("", web::get().to(handlers::invoices::list_invoices))
                    .route(
                        "/glassware",
                        web::post().to(handlers::invoices::create_glassware_invoice),
                    )
                    .route(
                        "/others",
                        web::post().to(handlers::invoices::create_others_invoice),
                    ),
            )
            .service(
                web::scope("/products")
                    .route("", web::post().to(handlers::catalog::create_product))
                    .route("", web::get().to(handlers::catalog::list_products)),
            )
            .service(
                web::scope("/vendors")
                    .route("", web::post().to(handlers::catalog::create_vendor))
                    .route("", web::get().to(handlers::catalog::list_vendors)),
            )
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login))
                    .route("/me", web::get().to(handlers::auth::current_user))
                    .route(
                        "/forgot-password",
                        web::post().to(handlers::auth::forgot_password),
                    )
                    .route("/verify-otp", web::post().to(handlers::auth::verify_otp))
                    .route(
                        "/reset-password",
                        web::post().to(handlers::auth::reset_password),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
