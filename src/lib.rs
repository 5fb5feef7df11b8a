pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{api::ApiClient, storage::LocalStorage};
pub use config::settings::Settings;
pub use core::calculator::QuoteCalculator;
pub use core::checkout::{CheckoutFlow, CheckoutState, OrderDetails};
pub use core::session::SessionManager;
pub use core::store::QuoteStore;
pub use utils::error::{QuoteError, Result};
