pub mod checkoff;
pub mod client;
pub mod driver;
pub mod invoice;
pub mod trip;
