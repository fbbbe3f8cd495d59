//! Invoice data model.

mod company;
mod entry;
mod id;
mod invoice;

pub use company::Company;
pub use entry::{InvoiceEntry, Money, Vat};
pub use id::InvoiceId;
pub use invoice::{Invoice, InvoiceBuilder};
