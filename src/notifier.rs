use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{Address, Message, SmtpTransport, Transport};
use log::{debug, info, warn};
use crate::config::{DeliveryPolicy, RunConfig};
use crate::digest;
use crate::error::{DigestError, Result};
use crate::extractor::PaperRecord;
use crate::filter::filter;
use crate::roster::{load_roster, RecipientEntry};

const SENDER_NAME: &str = "ArxivDaily";

/// One personalized digest, ready to be turned into a MIME message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestMail {
    pub sender: String,
    pub name: String,
    pub address: String,
    pub subject: String,
    pub html: String,
}

impl DigestMail {
    pub fn new(sender: &str, entry: &RecipientEntry, date: &str, html: String) -> Self {
        DigestMail {
            sender: sender.to_string(),
            name: entry.name.clone(),
            address: entry.address.clone(),
            subject: format!("Arxiv Daily ({})", date),
            html,
        }
    }

    /// `ArxivDaily<sender>` -> `name<address>`, body a `multipart/related` with one HTML part.
    pub fn to_message(&self) -> Result<Message> {
        let from = Mailbox::new(Some(SENDER_NAME.to_string()), parse_address(&self.sender)?);
        let to = Mailbox::new(Some(self.name.clone()), parse_address(&self.address)?);

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.as_str())
            .multipart(MultiPart::related().singlepart(SinglePart::html(self.html.clone())))
            .map_err(|e| DigestError::MailDelivery {
                recipient: self.address.clone(),
                reason: e.to_string(),
            })
    }
}

fn parse_address(address: &str) -> Result<Address> {
    address.parse().map_err(|e: lettre::address::AddressError| DigestError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// An open outbound mail connection, used serially for the whole roster.
pub trait MailSession {
    fn deliver(&mut self, mail: &DigestMail) -> Result<()>;

    /// Ends the session. Called once, after the last delivery attempt.
    fn close(&mut self) -> Result<()>;
}

/// SMTP relay session: plaintext connection, one login, one pooled connection.
pub struct SmtpSession {
    transport: Option<SmtpTransport>,
}

impl SmtpSession {
    pub fn open(host: &str, port: u16, sender: &str, credential: &str) -> Result<Self> {
        info!("Connecting to {}:{} as {}", host, port, sender);

        let transport = SmtpTransport::builder_dangerous(host)
            .port(port)
            .credentials(Credentials::new(sender.to_string(), credential.to_string()))
            .pool_config(PoolConfig::new().max_size(1))
            .build();

        match transport.test_connection() {
            Ok(true) => {
                debug!("SMTP session to {} established", host);
                Ok(SmtpSession { transport: Some(transport) })
            }
            Ok(false) => Err(DigestError::MailSession(format!("{}:{} refused the session", host, port))),
            Err(e) => Err(DigestError::MailSession(format!("{}:{}: {}", host, port, e))),
        }
    }
}

impl MailSession for SmtpSession {
    fn deliver(&mut self, mail: &DigestMail) -> Result<()> {
        let message = mail.to_message()?;
        let transport = self.transport.as_ref().ok_or_else(|| DigestError::MailDelivery {
            recipient: mail.address.clone(),
            reason: "session already closed".to_string(),
        })?;

        let response = transport.send(&message).map_err(|e| DigestError::MailDelivery {
            recipient: mail.address.clone(),
            reason: e.to_string(),
        })?;
        debug!("SMTP {} for {}", response.code(), mail.address);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the transport shuts the pooled connection down.
        if self.transport.take().is_some() {
            debug!("SMTP session closed");
        }
        Ok(())
    }
}

/// Outcome of one pass over the roster.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: Vec<String>,
    /// `(address, reason)` for every recipient skipped under [`DeliveryPolicy::BestEffort`].
    pub failed: Vec<(String, String)>,
}

/// Opens the relay session, loads the roster and mails every subscriber their digest.
pub fn notify(records: &[PaperRecord], config: &RunConfig) -> Result<DeliveryReport> {
    let mut session = SmtpSession::open(
        &config.smtp_host,
        config.smtp_port,
        &config.mail_sender,
        &config.mail_license,
    )?;
    notify_over(&mut session, records, config)
}

/// Runs the roster over an already open `session` and closes it afterwards,
/// also when loading the roster or a delivery fails.
pub fn notify_over<S: MailSession + ?Sized>(
    session: &mut S,
    records: &[PaperRecord],
    config: &RunConfig,
) -> Result<DeliveryReport> {
    let result = load_roster(config.roster_path()).and_then(|roster| {
        send_digests(
            &mut *session,
            records,
            &roster,
            &config.mail_sender,
            &config.date,
            config.delivery,
        )
    });

    if let Err(e) = session.close() {
        warn!("Failed to close mail session cleanly: {}", e);
    }
    result
}

/// Sends one personalized digest per roster entry, in roster order, over `session`.
pub fn send_digests<S: MailSession + ?Sized>(
    session: &mut S,
    records: &[PaperRecord],
    roster: &[RecipientEntry],
    sender: &str,
    date: &str,
    policy: DeliveryPolicy,
) -> Result<DeliveryReport> {
    let mut report = DeliveryReport::default();

    for entry in roster {
        let papers = filter(records, entry.keywords.as_slice());
        let mail = DigestMail::new(sender, entry, date, digest::render(&papers));

        match session.deliver(&mail) {
            Ok(()) => {
                info!(
                    "Successfully sent email to {}<{}> ({} papers)",
                    entry.name,
                    entry.address,
                    papers.len()
                );
                report.sent.push(entry.address.clone());
            }
            Err(e) if policy == DeliveryPolicy::BestEffort => {
                warn!("Skipping {}<{}>: {}", entry.name, entry.address, e);
                report.failed.push((entry.address.clone(), e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    info!("Delivered {} digests, {} failed", report.sent.len(), report.failed.len());
    Ok(report)
}
