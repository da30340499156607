//! Scrape-path normalization: join the export against the post lookup sheet
//! and derive the companies, contacts and posts tables.

use crate::diff::dedup_by_key;
use crate::domain::{Company, Contact, Post, Record, ScrapedRow};
use crate::utils::{derive_company_id, non_empty, parse_follower_count};
use std::collections::HashMap;

/// Platform label stamped on every scraped row.
pub const LINKEDIN_PLATFORM: &str = "LinkedIn";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInfo {
    pub post_name: Option<String>,
    pub post_id: Option<String>,
}

/// Post URL → post name/id, read from a `[link, post, id]` worksheet.
#[derive(Debug, Clone, Default)]
pub struct PostLookup {
    posts: HashMap<String, PostInfo>,
}

impl PostLookup {
    /// Short rows are padded with missing cells; the first row for a link wins.
    pub fn from_grid(grid: &[Vec<String>]) -> Self {
        let mut posts = HashMap::new();
        for row in grid {
            let cell = |idx: usize| non_empty(row.get(idx).map(String::as_str));
            let Some(link) = row.first().filter(|l| !l.is_empty()) else {
                continue;
            };
            posts.entry(link.clone()).or_insert_with(|| PostInfo {
                post_name: cell(1),
                post_id: cell(2),
            });
        }
        Self { posts }
    }

    pub fn get(&self, post_url: &str) -> Option<&PostInfo> {
        self.posts.get(post_url)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// A scraped row after the post join and company-id derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedRow {
    pub raw: ScrapedRow,
    pub post_name: Option<String>,
    pub post_id: Option<String>,
    pub platform: String,
    pub company_id: Option<String>,
}

/// Left join: rows without a lookup match keep null post metadata.
pub fn enrich(raw: Vec<ScrapedRow>, lookup: &PostLookup) -> Vec<EnrichedRow> {
    raw.into_iter()
        .map(|row| {
            let post = row
                .post_url
                .as_deref()
                .and_then(|url| lookup.get(url))
                .cloned()
                .unwrap_or_default();
            let company_id = row.company_name.as_deref().and_then(derive_company_id);
            EnrichedRow {
                raw: row,
                post_name: post.post_name,
                post_id: post.post_id,
                platform: LINKEDIN_PLATFORM.to_string(),
                company_id,
            }
        })
        .collect()
}

/// Companies with every field present, one per company URL.
pub fn companies(rows: &[EnrichedRow]) -> Vec<Company> {
    let complete: Vec<Company> = rows
        .iter()
        .filter_map(|row| {
            Some(Company {
                company_id: row.company_id.clone()?,
                company_name: row.raw.company_name.clone()?,
                company_url: row.raw.company_url.clone()?,
                followers_count: row
                    .raw
                    .followers_count
                    .as_deref()
                    .and_then(parse_follower_count)?,
            })
        })
        .collect();
    dedup_by_key(complete, |c| Some(c.company_url.as_str()))
}

/// Whether a contact belongs in the contacts table.
///
/// Keeps only contacts with no company identifier. This looks inverted
/// (contacts that do belong to a company are dropped) and stays as-is until
/// the business rule is confirmed.
pub fn retain_contact(contact: &Contact) -> bool {
    contact.company_id.is_none()
}

/// One contact per profile link, filtered through [`retain_contact`].
pub fn contacts(rows: &[EnrichedRow]) -> Vec<Contact> {
    let all: Vec<Contact> = rows
        .iter()
        .map(|row| Contact {
            source_user_id: row.raw.source_user_id.clone(),
            name: row.raw.name.clone(),
            occupation: row.raw.occupation.clone(),
            profile_link: row.raw.profile_link.clone(),
            degree: row.raw.degree.clone(),
            company_url: row.raw.company_url.clone(),
            post_id: row.post_id.clone(),
            reaction_type: row.raw.reaction_type.clone(),
            platform: Some(row.platform.clone()),
            company_id: row.company_id.clone(),
        })
        .collect();
    dedup_by_key(all, Contact::key)
        .into_iter()
        .filter(retain_contact)
        .collect()
}

/// One post per post URL.
pub fn posts(rows: &[EnrichedRow]) -> Vec<Post> {
    let all: Vec<Post> = rows
        .iter()
        .map(|row| Post {
            post_url: row.raw.post_url.clone(),
            platform: Some(row.platform.clone()),
            post_id: row.post_id.clone(),
            post_name: row.post_name.clone(),
        })
        .collect();
    dedup_by_key(all, Post::key)
}
