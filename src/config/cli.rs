use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::model::PaymentMethod;

#[derive(Debug, Parser)]
#[command(name = "renoquote")]
#[command(about = "Renovation cost quotes and financing from the command line")]
pub struct Cli {
    /// Path to a TOML settings file; built-in defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the available renovation styles
    Styles,

    /// Compute a quote and save it for the financing flow
    Calc {
        /// Area to renovate, in square meters
        #[arg(long)]
        area: f64,

        /// Style id or name, as listed by `styles`
        #[arg(long)]
        style: String,

        #[arg(long, default_value = "full")]
        payment: PaymentMethod,

        /// Installment term in months (installment payment only)
        #[arg(long)]
        months: Option<u32>,

        /// Also write the estimate as pretty JSON to this file
        #[arg(long)]
        estimate: Option<PathBuf>,
    },

    /// Show the saved quote history, newest first
    History,

    /// Submit an order, prefilled from the last saved quote
    Order {
        #[arg(long)]
        phone: String,

        #[arg(long)]
        address: String,

        /// Defaults to today
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Defaults to start date plus the quoted duration
        #[arg(long)]
        end_date: Option<NaiveDate>,

        #[arg(long, default_value = "full")]
        payment: PaymentMethod,

        /// Installment term in months; the configured default applies if omitted
        #[arg(long)]
        months: Option<u32>,
    },

    /// Sign in and store the session token pair
    Login {
        #[arg(long)]
        phone: String,

        #[arg(long)]
        password: String,
    },

    /// Clear the stored session token pair
    Logout,
}
