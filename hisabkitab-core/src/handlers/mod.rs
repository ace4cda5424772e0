//! Route handlers. Each takes the `CurrentUser` extractor (except the
//! public account and health routes) and hands it to the store and
//! billing functions explicitly.

pub mod accounts;
pub mod clients;
pub mod health;
pub mod invoices;
pub mod settings;
