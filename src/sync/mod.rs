pub mod approval;
pub mod mirror;
pub mod reconcile;
