//! Lead capture collaborators: recaptcha verification, the lead sink, and
//! best-effort notifications.

pub mod config;
pub mod notify;
pub mod recaptcha;
pub mod sink;

pub use config::*;
pub use notify::{spawn_notification, LeadNotification, LeadNotifier, MailApiNotifier};
pub use recaptcha::{RecaptchaVerifier, SiteVerifyResponse};
pub use sink::{HttpLeadSink, LeadSink};
