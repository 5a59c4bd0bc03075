pub mod checkoffs;
pub mod dispatch;
pub mod invoices;
pub mod profile;
pub mod trips;
