use std::fs::File;
use std::io::Read;
use std::path::Path;
use log::info;
use crate::error::{DigestError, Result};

/// One subscriber: `name|address|kw1,kw2,...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientEntry {
    pub name: String,
    pub address: String,
    pub keywords: Vec<String>,
}

/// Loads the roster file. Any line that does not have exactly three `|`-separated
/// fields aborts the load.
///
/// There is no escaping: a `|` or `,` inside a name, address or keyword breaks the line.
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<RecipientEntry>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DigestError::io(path, e))?;
    let entries = read_entries(file)?;
    info!("Loaded {} recipients from {:?}", entries.len(), path);
    Ok(entries)
}

/// Same as [`load_roster`] for roster text already in memory.
pub fn parse_roster(text: &str) -> Result<Vec<RecipientEntry>> {
    read_entries(text.as_bytes())
}

fn read_entries<R: Read>(source: R) -> Result<Vec<RecipientEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut entries = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(entries.len() + 1, |p| p.line() as usize);

        if record.len() != 3 {
            return Err(DigestError::RosterParse {
                line,
                content: record.iter().collect::<Vec<_>>().join("|"),
                fields: record.len(),
            });
        }

        entries.push(RecipientEntry {
            name: record[0].to_string(),
            address: record[1].to_string(),
            keywords: split_keywords(&record[2]),
        });
    }
    Ok(entries)
}

fn split_keywords(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
