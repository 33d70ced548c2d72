//! Renders search results into the text block handed to the model.
//!
//! The layout here is described literally in the extraction prompt; change
//! both together.

use dmfinder_shared::SearchResult;

/// Prefix of each per-query section.
pub const QUERY_HEADER: &str = "**Search Query:**";

/// Separator between hits within one section.
pub const HIT_SEPARATOR: &str = "\n---\n";

/// Separator between query sections.
pub const SECTION_SEPARATOR: &str = "\n\n\n";

/// Format results in input order, keeping at most `max_hits` hits per query.
///
/// The first `max_hits` provider entries are considered; entries missing a
/// title, link or snippet are skipped, so a section may show fewer hits.
/// A query with no usable hits still gets its header.
pub fn format_results(results: &[SearchResult], max_hits: usize) -> String {
    results
        .iter()
        .map(|result| {
            let hits: Vec<String> = result
                .hits
                .iter()
                .take(max_hits)
                .filter_map(|hit| hit.complete())
                .map(|(title, link, snippet)| format!("- {title}\n  {link}\n  {snippet}"))
                .collect();

            format!(
                "{QUERY_HEADER} {}\n\n{}",
                result.query,
                hits.join(HIT_SEPARATOR)
            )
        })
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}
