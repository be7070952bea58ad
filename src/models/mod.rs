pub mod payloads;
pub mod product;
