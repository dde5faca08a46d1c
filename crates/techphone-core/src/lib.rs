//! Domain types, configuration, and pure utilities for the TechPhone
//! storefront service. No database or network I/O lives here; the only
//! filesystem access is loading the env/catalog configuration.

use thiserror::Error;

pub mod app_config;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod orders;
pub mod roles;
pub mod validation;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, CatalogFile, ProductConfig};
pub use categories::expand_category_variants;
pub use config::{load_app_config, load_app_config_from_env};
pub use orders::{generate_order_number, OrderStatus, PaymentStatus};
pub use roles::{has_permission, is_admin, is_guest, is_user, reconcile_role, Permission, Role};
pub use validation::{
    validate_email, validate_number, validate_password, validate_phone, validate_required,
    ValidationError,
};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
