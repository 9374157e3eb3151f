//! Business logic services for the storefront.
//!
//! - `auth` - customer registration and password login
//! - `checkout` - checkout validation and order placement
//! - `email` - transactional email over SMTP
//! - `whatsapp` - store alerts through the WhatsApp Cloud API
//! - `notifications` - fan-out to in-app, email and WhatsApp channels

pub mod auth;
pub mod checkout;
pub mod email;
pub mod notifications;
pub mod whatsapp;

pub use auth::{AuthError, AuthService, Registration};
pub use checkout::{CheckoutForm, ValidCheckout};
pub use email::{EmailError, EmailService};
pub use notifications::Notifier;
pub use whatsapp::{WhatsAppClient, WhatsAppError};
