/// Router Module Index
///
/// Organizes routing into access-segregated modules. Access control is attached to whole
/// modules as route layers in `create_router`, never inside individual handlers.

/// Routes open to every visitor: public content, sign-in, health.
pub mod public;

/// The content admin API under `/api/admin`. Guarded by `auth::admin_api_gate`.
pub mod admin;

/// The admin UI pages under `/admin`. Guarded by `auth::admin_ui_gate`.
pub mod admin_ui;
