pub mod settings;

#[cfg(feature = "cli")]
pub mod cli;

pub use settings::Settings;
