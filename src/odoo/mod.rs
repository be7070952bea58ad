pub mod client;

pub use client::{OdooClient, OdooError, OdooSession};
