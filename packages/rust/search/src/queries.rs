//! Role-targeted search query templates.

use dmfinder_shared::Company;

/// Role-specific tail of each query, appended after `<domain> <company_name>`.
/// One entry per role category: CEO, founder/owner, president/chairman,
/// partner, generic contact email. `-zoominfo -dnb` keeps data-broker pages
/// from crowding out first-party results.
pub const QUERY_ROLES: [&str; 5] = [
    "CEO -zoominfo -dnb",
    "Founder owner -zoominfo -dnb",
    "president chairman -zoominfo -dnb",
    "partner -zoominfo -dnb",
    "contact email",
];

/// Expand a company into one query per role, in role order.
///
/// Values are interpolated verbatim; the search provider accepts free text.
pub fn build_queries(company: &Company) -> Vec<String> {
    QUERY_ROLES
        .iter()
        .map(|role| format!("{} {} {role}", company.domain, company.company_name))
        .collect()
}
