//! Attach provenance to extracted contacts and clean up their fields.

use dmfinder_shared::{Company, Contact, ExtractedContact, GENERIC_EMAIL_TITLE};

/// A profile URL must contain this.
const PROFILE_MARKER: &str = "linkedin.com/in/";

/// LinkedIn paths that are never a personal profile.
const REJECTED_PATHS: [&str; 6] = [
    "linkedin.com/company/",
    "linkedin.com/posts/",
    "linkedin.com/pub/dir/",
    "linkedin.com/feed/",
    "linkedin.com/jobs/",
    "linkedin.com/school/",
];

/// Keep `url` only if it looks like a personal LinkedIn profile; otherwise
/// return an empty string.
pub fn validate_linkedin_url(url: Option<&str>) -> String {
    let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
        return String::new();
    };

    let lower = url.to_ascii_lowercase();
    if lower.contains(PROFILE_MARKER) && !REJECTED_PATHS.iter().any(|p| lower.contains(p)) {
        url.to_string()
    } else {
        String::new()
    }
}

/// Flatten contacts into output rows owned by `company`.
///
/// Domain and company name always come from the input row, never the model.
pub fn normalize(contacts: Vec<ExtractedContact>, company: &Company) -> Vec<Contact> {
    contacts
        .into_iter()
        .map(|contact| {
            let mut row = match contact {
                ExtractedContact::Person {
                    first_name,
                    last_name,
                    title,
                    linkedin_url,
                    source_url,
                    company_phone,
                } => Contact {
                    first_name,
                    last_name,
                    title,
                    linkedin_url: validate_linkedin_url(Some(&linkedin_url)),
                    generic_email: String::new(),
                    source_url,
                    company_phone,
                    ..Contact::default()
                },
                ExtractedContact::GenericEmail {
                    email,
                    source_url,
                    company_phone,
                } => Contact {
                    title: GENERIC_EMAIL_TITLE.to_string(),
                    generic_email: email,
                    source_url,
                    company_phone,
                    ..Contact::default()
                },
            };
            row.domain = company.domain.clone();
            row.company_name = company.company_name.clone();
            row
        })
        .collect()
}
