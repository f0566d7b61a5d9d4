pub mod config;
pub mod error;
pub mod logger;
pub mod fetcher;
pub mod extractor;
pub mod filter;
pub mod persister;
pub mod digest;
pub mod roster;
pub mod notifier;
pub mod pipeline;

// Exporting types for convenience
pub use config::{DeliveryPolicy, RunConfig};
pub use error::DigestError;
pub use extractor::{Author, Extractor, PaperRecord, PaperUrls};
pub use fetcher::Fetcher;
pub use notifier::{DeliveryReport, DigestMail, MailSession, SmtpSession};
pub use roster::RecipientEntry;
