use std::path::{Path, PathBuf};
use log::info;
use crate::config::RunConfig;
use crate::error::Result;
use crate::extractor::{Extractor, PaperRecord};
use crate::fetcher::Fetcher;
use crate::filter::filter;
use crate::notifier::{self, DeliveryReport};
use crate::persister::persist;

/// Keyword of the machine-translation archive file.
pub const MT_KEYWORD: &str = "translation";

/// One daily run: fetch, extract, archive, mail.
///
/// Nothing is written or sent unless fetching and extraction both succeed.
pub fn run(config: &RunConfig) -> Result<DeliveryReport> {
    info!("Arxiv Daily run for {}", config.date);

    let html = Fetcher::new()?.fetch(&config.listing_url)?;
    let papers = Extractor::new().extract(&html, &config.date)?;

    archive(&papers, &config.files_dir, &config.date_label())?;
    notifier::notify(&papers, config)
}

/// Writes `{label}.json` with every paper and `{label}-MT.json` with the
/// translation papers. Returns both paths in that order.
pub fn archive(papers: &[PaperRecord], dir: &Path, label: &str) -> Result<(PathBuf, PathBuf)> {
    let all_path = dir.join(format!("{}.json", label));
    persist(papers, &all_path)?;

    let mt_path = dir.join(format!("{}-MT.json", label));
    persist(&filter(papers, &[MT_KEYWORD]), &mt_path)?;

    Ok((all_path, mt_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persister::load;

    fn titled(title: &str) -> PaperRecord {
        PaperRecord { title: title.to_string(), ..Default::default() }
    }

    #[test]
    fn test_archive_file_names_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let papers = vec![titled("Parsing"), titled("Low-Resource Machine Translation"), titled("Dialogue")];

        let (all, mt) = archive(&papers, dir.path(), "23-Sep-2021").unwrap();

        assert_eq!(all, dir.path().join("23-Sep-2021.json"));
        assert_eq!(mt, dir.path().join("23-Sep-2021-MT.json"));
        assert_eq!(load(&all).unwrap(), papers);
        assert_eq!(load(&mt).unwrap(), vec![papers[1].clone()]);
    }

    #[test]
    fn test_archive_without_translation_papers() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mt) = archive(&[titled("Parsing")], dir.path(), "24-Sep-2021").unwrap();
        assert!(load(&mt).unwrap().is_empty());
    }
}
