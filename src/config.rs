use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};

pub const LISTING_URL: &str = "https://arxiv.org/list/cs.CL/pastweek?skip=0&show=200";
pub const SMTP_HOST: &str = "smtp.163.com";
pub const SMTP_PORT: u16 = 25;
pub const FILES_DIR: &str = "files/";
pub const ROSTER_FILE: &str = "receivers_list.txt";

/// What to do when one recipient's digest cannot be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Stop at the first failure; the rest of the roster gets nothing.
    #[default]
    Abort,
    /// Log the failure and carry on with the next recipient.
    BestEffort,
}

impl FromStr for DeliveryPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(DeliveryPolicy::Abort),
            "best-effort" | "best_effort" => Ok(DeliveryPolicy::BestEffort),
            other => Err(anyhow!("unknown delivery policy {:?} (expected abort or best-effort)", other)),
        }
    }
}

/// Settings for one daily run, built once at startup and handed to every stage.
#[derive(Clone)]
pub struct RunConfig {
    /// Listing date as printed by arXiv, e.g. `Thu, 23 Sep 2021`.
    pub date: String,
    pub mail_sender: String,
    pub mail_license: String,
    pub files_dir: PathBuf,
    pub listing_url: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub delivery: DeliveryPolicy,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("date", &self.date)
            .field("mail_sender", &self.mail_sender)
            .field("mail_license", &"<redacted>")
            .field("files_dir", &self.files_dir)
            .field("listing_url", &self.listing_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("delivery", &self.delivery)
            .finish()
    }
}

impl RunConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let date = lookup("ARXIV_DAILY_DATE")
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(today);
        validate_date(&date)?;

        let smtp_port = match lookup("ARXIV_DAILY_SMTP_PORT") {
            Some(port) => port
                .trim()
                .parse()
                .context("ARXIV_DAILY_SMTP_PORT must be a valid port number")?,
            None => SMTP_PORT,
        };

        let delivery = match lookup("ARXIV_DAILY_DELIVERY") {
            Some(policy) => policy.parse()?,
            None => DeliveryPolicy::default(),
        };

        Ok(Self {
            date,
            mail_sender: lookup("ARXIV_DAILY_MAIL_SENDER")
                .context("ARXIV_DAILY_MAIL_SENDER must be set")?,
            mail_license: lookup("ARXIV_DAILY_MAIL_LICENSE")
                .context("ARXIV_DAILY_MAIL_LICENSE must be set")?,
            files_dir: lookup("ARXIV_DAILY_FILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(FILES_DIR)),
            listing_url: lookup("ARXIV_DAILY_LISTING_URL").unwrap_or_else(|| LISTING_URL.to_string()),
            smtp_host: lookup("ARXIV_DAILY_SMTP_HOST").unwrap_or_else(|| SMTP_HOST.to_string()),
            smtp_port,
            delivery,
        })
    }

    /// `Thu, 23 Sep 2021` -> `23-Sep-2021`, the stem of the archive files.
    pub fn date_label(&self) -> String {
        self.date.split_whitespace().skip(1).collect::<Vec<_>>().join("-")
    }

    pub fn roster_path(&self) -> PathBuf {
        self.files_dir.join(ROSTER_FILE)
    }
}

fn today() -> String {
    Local::now().format("%a, %-d %b %Y").to_string()
}

fn validate_date(date: &str) -> Result<()> {
    if NaiveDate::parse_from_str(date, "%a, %d %b %Y").is_err() {
        bail!("ARXIV_DAILY_DATE {:?} is not an RFC 2822 date such as \"Thu, 23 Sep 2021\"", date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("ARXIV_DAILY_DATE", "Thu, 23 Sep 2021"),
        ("ARXIV_DAILY_MAIL_SENDER", "digest@163.com"),
        ("ARXIV_DAILY_MAIL_LICENSE", "secret"),
    ];

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.listing_url, LISTING_URL);
        assert_eq!(config.smtp_host, "smtp.163.com");
        assert_eq!(config.smtp_port, 25);
        assert_eq!(config.files_dir, PathBuf::from("files/"));
        assert_eq!(config.roster_path(), PathBuf::from("files/receivers_list.txt"));
        assert_eq!(config.delivery, DeliveryPolicy::Abort);
    }

    #[test]
    fn test_date_label() {
        let config = RunConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.date_label(), "23-Sep-2021");
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("ARXIV_DAILY_SMTP_PORT", "2525"),
            ("ARXIV_DAILY_DELIVERY", "best-effort"),
            ("ARXIV_DAILY_FILES_DIR", "/tmp/arxiv"),
        ]);
        let config = RunConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.delivery, DeliveryPolicy::BestEffort);
        assert_eq!(config.roster_path(), PathBuf::from("/tmp/arxiv/receivers_list.txt"));
    }

    #[test]
    fn test_missing_credentials() {
        let err = RunConfig::from_lookup(lookup_from(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("ARXIV_DAILY_MAIL_LICENSE"));
    }

    #[test]
    fn test_rejects_malformed_date() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("ARXIV_DAILY_DATE", "2021-09-23");
        assert!(RunConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_default_date_is_valid() {
        let config = RunConfig::from_lookup(lookup_from(&REQUIRED[1..])).unwrap();
        assert!(validate_date(&config.date).is_ok());
        assert_eq!(config.date_label().split('-').count(), 3);
    }

    #[test]
    fn test_debug_hides_license() {
        let config = RunConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn test_unknown_policy() {
        assert!("sometimes".parse::<DeliveryPolicy>().is_err());
    }
}
