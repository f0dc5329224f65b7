//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, category_handler, transaction_handler, user_handler};
use crate::domain::{Category, Product, Transaction, TransactionItem, TransactionStatus, User, UserRole};
use crate::services::{AuthPayload, RevokedToken};

/// OpenAPI documentation for the Pemmob API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pemmob API",
        version = "0.1.0",
        description = "Mobile commerce backend: catalog, checkout and user accounts",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        category_handler::all,
        transaction_handler::all,
        transaction_handler::checkout,
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        user_handler::fetch,
        user_handler::update_profile,
    ),
    components(
        schemas(
            // Domain types
            User,
            UserRole,
            Category,
            Product,
            Transaction,
            TransactionItem,
            TransactionStatus,
            // Auth types
            AuthPayload,
            RevokedToken,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            // Request bodies
            transaction_handler::CheckoutRequest,
            transaction_handler::CartItemRequest,
            user_handler::UpdateProfileRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Categories", description = "Product catalog"),
        (name = "Transactions", description = "Order history and checkout"),
        (name = "Authentication", description = "Registration, login and logout"),
        (name = "Users", description = "Profile of the authenticated user")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /api/login or /api/register"))
                        .build(),
                ),
            );
        }
    }
}
