//! Webhook gateway syncing marketplace product approvals with an Odoo ERP
//! and pushing notifications to the mobile app via FCM.

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod notification;
pub mod odoo;
pub mod store;
pub mod sync;

use store::postgres::PgStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: PgStore,
    pub odoo: odoo::OdooClient,
    /// Absent when FIREBASE_SERVICE_ACCOUNT is not configured; the push
    /// endpoint then reports the configuration gap instead of failing.
    pub fcm: Option<notification::fcm::FcmClient>,
    pub config: config::Config,
}
