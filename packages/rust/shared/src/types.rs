//! Core domain types for the contact-discovery pipeline.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Title used for every generic (non-personal) company email record.
pub const GENERIC_EMAIL_TITLE: &str = "Generic Email";

/// Output column order for contact rows.
pub const CONTACT_COLUMNS: [&str; 9] = [
    "first_name",
    "last_name",
    "title",
    "linkedin_url",
    "generic_email",
    "source_url",
    "company_phone",
    "domain",
    "company_name",
];

// ---------------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------------

/// One input row: a company to look up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub domain: String,
    pub company_name: String,
}

impl Company {
    pub fn new(domain: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            company_name: company_name.into(),
        }
    }
}

impl std::fmt::Display for Company {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.company_name, self.domain)
    }
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// A single organic search hit as returned by the provider.
///
/// Fields stay optional so malformed provider entries survive decoding and
/// are dropped at formatting time instead of failing the whole response.
/// Non-string values (numbers, objects, `null`) decode as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(default, deserialize_with = "string_or_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub snippet: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeString {
        Str(String),
        #[allow(dead_code)]
        Other(IgnoredAny),
    }

    Ok(match MaybeString::deserialize(deserializer)? {
        MaybeString::Str(s) => Some(s),
        MaybeString::Other(_) => None,
    })
}

impl Hit {
    /// A fully populated hit.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            link: Some(link.into()),
            snippet: Some(snippet.into()),
        }
    }

    /// Borrow all three fields, or `None` if any is missing.
    pub fn complete(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.title.as_deref()?,
            self.link.as_deref()?,
            self.snippet.as_deref()?,
        ))
    }
}

/// Outcome of one search query. A failed search has no hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub hits: Vec<Hit>,
}

impl SearchResult {
    /// An empty result that still carries its query.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            hits: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// A validated contact record recovered from the model's reply.
///
/// Exactly one identity is populated: a named person or a generic email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContact {
    Person {
        first_name: String,
        last_name: String,
        title: String,
        linkedin_url: String,
        source_url: String,
        company_phone: String,
    },
    GenericEmail {
        email: String,
        source_url: String,
        company_phone: String,
    },
}

impl ExtractedContact {
    pub fn source_url(&self) -> &str {
        match self {
            Self::Person { source_url, .. } | Self::GenericEmail { source_url, .. } => source_url,
        }
    }

    pub fn company_phone(&self) -> &str {
        match self {
            Self::Person { company_phone, .. } | Self::GenericEmail { company_phone, .. } => {
                company_phone
            }
        }
    }
}

/// One output row, with provenance attached.
///
/// Field order is the CSV column order ([`CONTACT_COLUMNS`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub linkedin_url: String,
    pub generic_email: String,
    pub source_url: String,
    pub company_phone: String,
    pub domain: String,
    pub company_name: String,
}

impl Contact {
    /// Whether this row describes a generic company email.
    pub fn is_generic_email(&self) -> bool {
        !self.generic_email.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_complete_requires_all_fields() {
        let hit = Hit::new("Title", "https://acme.com", "Snippet");
        assert_eq!(hit.complete(), Some(("Title", "https://acme.com", "Snippet")));

        let partial = Hit {
            title: Some("Title".into()),
            link: None,
            snippet: Some("Snippet".into()),
        };
        assert!(partial.complete().is_none());
    }

    #[test]
    fn hit_deserializes_with_missing_fields() {
        let hit: Hit = serde_json::from_str(r#"{"title":"Only a title","position":1}"#).unwrap();
        assert_eq!(hit.title.as_deref(), Some("Only a title"));
        assert!(hit.link.is_none());
    }

    #[test]
    fn hit_treats_non_string_fields_as_missing() {
        let hit: Hit = serde_json::from_str(
            r#"{"title":42,"link":"https://acme.com","snippet":null,"sitelinks":[{"title":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(hit.title, None);
        assert_eq!(hit.link.as_deref(), Some("https://acme.com"));
        assert_eq!(hit.snippet, None);
    }

    #[test]
    fn contact_serializes_in_column_order() {
        let contact = Contact {
            first_name: "Jane".into(),
            domain: "acme.com".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&contact).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        // serde_json sorts keys without preserve_order; check membership instead
        for column in CONTACT_COLUMNS {
            assert!(keys.contains(&column), "missing column {column}");
        }
        assert_eq!(keys.len(), CONTACT_COLUMNS.len());
    }

    #[test]
    fn extracted_contact_accessors() {
        let email = ExtractedContact::GenericEmail {
            email: "info@acme.com".into(),
            source_url: "https://acme.com/contact".into(),
            company_phone: "(614) 316-2342".into(),
        };
        assert_eq!(email.source_url(), "https://acme.com/contact");
        assert_eq!(email.company_phone(), "(614) 316-2342");
    }

    #[test]
    fn company_display() {
        let company = Company::new("acme.com", "Acme Corp");
        assert_eq!(company.to_string(), "Acme Corp (acme.com)");
    }
}
