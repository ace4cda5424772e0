pub mod client;
pub mod invoice;
pub mod settings;
pub mod user;

pub use client::{Client, CreateClient};
pub use invoice::{Invoice, InvoiceForm, Item, NewInvoice, NewItem, Party};
pub use settings::{Settings, UpdateSettings};
pub use user::{CreateUser, LoginUser, User};
