//! # Notifications Domain
//!
//! Email notifications for catalog changes.
//!
//! - [`providers`]: the [`EmailProvider`] trait with SMTP (production)
//!   and log-only (development) implementations
//! - [`notifier`]: [`AdminNotifier`], which fans a product change out to
//!   every other admin group member

pub mod error;
pub mod notifier;
pub mod providers;

pub use error::{NotificationError, NotificationResult};
pub use notifier::{AdminNotifier, RecipientDirectory, TriggerUser};
pub use providers::{EmailContent, EmailProvider, LogProvider, SentEmail, SmtpConfig, SmtpProvider};
