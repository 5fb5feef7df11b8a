pub mod calculator;
pub mod checkout;
pub mod session;
pub mod store;
