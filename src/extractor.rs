use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use log::{debug, info};
use crate::error::{DigestError, Result};

/// Prefix for the site-relative links found in the listing.
pub const ARXIV_ORIGIN: &str = "https://arxiv.org";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaperUrls {
    #[serde(rename = "abstract")]
    pub abstract_url: String,
    pub pdf: String,
    pub other: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub url: String,
}

/// One paper of the daily listing. Missing pieces are empty strings / empty vecs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    pub url: PaperUrls,
    pub title: String,
    pub authors: Vec<Author>,
    pub comments: String,
    pub subjects: String,
}

pub struct Extractor {
    heading: Selector,
    link_block: Selector,
    meta_block: Selector,
    abstract_link: Selector,
    pdf_link: Selector,
    other_link: Selector,
    meta: Selector,
    title: Selector,
    authors: Selector,
    subjects: Selector,
    comments: Selector,
    anchor: Selector,
}

fn selector(css: &str) -> Selector {
    // Only called with the literals below.
    Selector::parse(css).expect("static selector must parse")
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Extractor {
            heading: selector("h3"),
            link_block: selector("dt"),
            meta_block: selector("dd"),
            abstract_link: selector(r#"[title="Abstract"]"#),
            pdf_link: selector(r#"[title="Download PDF"]"#),
            other_link: selector(r#"[title="Other formats"]"#),
            meta: selector("div.meta"),
            title: selector(".list-title"),
            authors: selector(".list-authors"),
            subjects: selector(".list-subjects"),
            comments: selector(".list-comments"),
            anchor: selector("a"),
        }
    }

    /// Parses the papers listed under the first date heading of the page.
    ///
    /// Fails without partial results when the heading does not read `expected_date`,
    /// when link blocks (`dt`) and paper blocks (`dd`) do not pair up, or when an
    /// entry lacks its meta block.
    pub fn extract(&self, html: &str, expected_date: &str) -> Result<Vec<PaperRecord>> {
        let document = Html::parse_document(html);

        let heading = document.select(&self.heading).next().ok_or(DigestError::MissingListing)?;
        let found = heading
            .children()
            .find_map(|node| node.value().as_text().map(|text| text.to_string()))
            .unwrap_or_default();
        if found != expected_date {
            return Err(DigestError::DateMismatch {
                expected: expected_date.to_string(),
                found,
            });
        }

        // The page lists several days; only the list right after the first heading is today's.
        let listing = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "dl")
            .ok_or(DigestError::MissingListing)?;

        let links: Vec<ElementRef> = listing.select(&self.link_block).collect();
        let metas: Vec<ElementRef> = listing.select(&self.meta_block).collect();
        if links.len() != metas.len() {
            return Err(DigestError::StructureMismatch { links: links.len(), metas: metas.len() });
        }

        let mut papers = Vec::with_capacity(links.len());
        for index in 0..links.len() {
            papers.push(self.parse_entry(index, links[index], metas[index])?);
        }

        info!("Extracted {} papers for {}", papers.len(), expected_date);
        Ok(papers)
    }

    fn parse_entry(&self, index: usize, link_block: ElementRef, meta_block: ElementRef) -> Result<PaperRecord> {
        let abstract_anchor = first(link_block, &self.abstract_link);
        let url = PaperUrls {
            abstract_url: absolute_href(abstract_anchor),
            pdf: absolute_href(first(link_block, &self.pdf_link)),
            other: absolute_href(first(link_block, &self.other_link)),
        };
        let id = abstract_anchor.map(text_of).unwrap_or_default();

        let meta = first(meta_block, &self.meta).ok_or(DigestError::MetaMissing { index })?;

        let authors = first(meta, &self.authors)
            .map(|block| {
                block
                    .select(&self.anchor)
                    .map(|a| Author {
                        name: text_of(a),
                        url: absolute_href(Some(a)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let paper = PaperRecord {
            id,
            url,
            title: labeled_text(first(meta, &self.title), "Title: "),
            authors,
            comments: labeled_text(first(meta, &self.comments), "Comments: "),
            subjects: labeled_text(first(meta, &self.subjects), "Subjects: "),
        };
        debug!("[{}] {} {}", index + 1, paper.id, paper.title);
        Ok(paper)
    }
}

fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn absolute_href(anchor: Option<ElementRef>) -> String {
    match anchor.and_then(|a| a.value().attr("href")) {
        Some(href) => format!("{}{}", ARXIV_ORIGIN, href),
        None => String::new(),
    }
}

fn labeled_text(element: Option<ElementRef>, label: &str) -> String {
    match element {
        Some(el) => {
            let text = text_of(el);
            match text.strip_prefix(label) {
                Some(rest) => rest.trim().to_string(),
                None => text,
            }
        }
        None => String::new(),
    }
}
