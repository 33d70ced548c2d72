//! Validation and merging of raw model records.
//!
//! The model is asked for a flat object per contact. Its output is read
//! leniently and classified into a [`ExtractedContact`] immediately, so no
//! later stage deals with loosely-typed JSON.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use dmfinder_shared::ExtractedContact;

/// Placeholder names the model sometimes emits ("Contact", "Contact 2").
static PLACEHOLDER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^contact(\s+\d+)?$").expect("valid regex"));

/// A plain address: no masking characters, one `@`, a dotted domain.
static PLAIN_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@*]+@[^\s@*]+\.[^\s@*]+$").expect("valid regex"));

/// One element of the model's array, every field optional.
#[derive(Debug, Default, Deserialize)]
struct RawContact {
    #[serde(default, deserialize_with = "lenient_string")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    generic_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    source_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    company_phone: Option<String>,
}

/// Accept strings; treat `null`, numbers, arrays and objects as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    })
}

/// Classify one raw record. Returns `None` for records that are neither a
/// named person nor a plausible generic email.
///
/// A record carrying both a name and an email is kept as a person; the
/// person is the stronger lead.
pub fn classify(value: &Value) -> Option<ExtractedContact> {
    let raw = match RawContact::deserialize(value) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "dropping non-object contact record");
            return None;
        }
    };

    let source_url = raw.source_url.unwrap_or_default();
    let company_phone = raw.company_phone.unwrap_or_default();

    match (raw.first_name, raw.last_name) {
        (Some(first_name), Some(last_name)) => {
            let full = format!("{first_name} {last_name}");
            if PLACEHOLDER_NAME.is_match(&full) || PLACEHOLDER_NAME.is_match(&first_name) {
                debug!(name = %full, "dropping placeholder contact");
                return None;
            }
            Some(ExtractedContact::Person {
                first_name,
                last_name,
                title: raw.title.unwrap_or_default(),
                linkedin_url: raw.linkedin_url.unwrap_or_default(),
                source_url,
                company_phone,
            })
        }
        _ => match raw.generic_email {
            Some(email) if PLAIN_EMAIL.is_match(&email) => Some(ExtractedContact::GenericEmail {
                email,
                source_url,
                company_phone,
            }),
            Some(email) => {
                debug!(%email, "dropping masked or malformed email");
                None
            }
            None => {
                debug!("dropping record with neither a full name nor an email");
                None
            }
        },
    }
}

/// Merge duplicates, preserving order of first appearance.
///
/// People are keyed by case-insensitive first and last name; the longest
/// title wins and empty link/source/phone fields are filled from later
/// duplicates. Generic emails collapse on the same address or the same
/// non-empty source URL.
pub fn dedup_contacts(contacts: Vec<ExtractedContact>) -> Vec<ExtractedContact> {
    let mut merged: Vec<ExtractedContact> = Vec::with_capacity(contacts.len());
    let mut people: HashMap<(String, String), usize> = HashMap::new();
    let mut emails: HashMap<String, usize> = HashMap::new();
    let mut email_sources: HashMap<String, usize> = HashMap::new();

    for contact in contacts {
        match contact {
            ExtractedContact::Person {
                ref first_name,
                ref last_name,
                ..
            } => {
                let key = (first_name.to_lowercase(), last_name.to_lowercase());
                match people.get(&key) {
                    Some(&idx) => merge_person(&mut merged[idx], contact),
                    None => {
                        people.insert(key, merged.len());
                        merged.push(contact);
                    }
                }
            }
            ExtractedContact::GenericEmail {
                ref email,
                ref source_url,
                ..
            } => {
                let email_key = email.to_lowercase();
                let existing = emails.get(&email_key).copied().or_else(|| {
                    (!source_url.is_empty())
                        .then(|| email_sources.get(source_url).copied())
                        .flatten()
                });

                match existing {
                    Some(idx) => fill_phone(&mut merged[idx], contact.company_phone()),
                    None => {
                        let idx = merged.len();
                        emails.insert(email_key, idx);
                        if !source_url.is_empty() {
                            email_sources.insert(source_url.clone(), idx);
                        }
                        merged.push(contact);
                    }
                }
            }
        }
    }

    merged
}

fn merge_person(kept: &mut ExtractedContact, duplicate: ExtractedContact) {
    let (
        ExtractedContact::Person {
            title,
            linkedin_url,
            source_url,
            company_phone,
            ..
        },
        ExtractedContact::Person {
            title: dup_title,
            linkedin_url: dup_linkedin,
            source_url: dup_source,
            company_phone: dup_phone,
            ..
        },
    ) = (kept, duplicate)
    else {
        return;
    };

    if dup_title.chars().count() > title.chars().count() {
        *title = dup_title;
    }
    fill_if_empty(linkedin_url, dup_linkedin);
    fill_if_empty(source_url, dup_source);
    fill_if_empty(company_phone, dup_phone);
}

fn fill_phone(kept: &mut ExtractedContact, phone: &str) {
    if let ExtractedContact::GenericEmail { company_phone, .. } = kept {
        fill_if_empty(company_phone, phone.to_string());
    }
}

fn fill_if_empty(slot: &mut String, candidate: String) {
    if slot.is_empty() && !candidate.is_empty() {
        *slot = candidate;
    }
}
