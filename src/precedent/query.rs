//! Search query construction for the precedent index

use crate::context::CaseContext;

/// Maximum length of the assembled search query
const QUERY_MAX_LEN: usize = 200;
/// Maximum keywords taken from the case description
const MAX_DESCRIPTION_KEYWORDS: usize = 10;
/// Keywords shorter than this are dropped as noise
const MIN_KEYWORD_LEN: usize = 4;
/// Maximum tags taken per evidence item
const MAX_TAGS_PER_ITEM: usize = 3;

/// Build a query string from venue keywords, description keywords, and
/// evidence tags, truncated to 200 characters.
pub fn build_search_query(ctx: &CaseContext) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(venue) = ctx.case.venue {
        parts.push(venue.search_keywords().to_string());
    }

    if let Some(description) = &ctx.case.description {
        let keywords: Vec<&str> = description
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|w| w.len() > MIN_KEYWORD_LEN)
            .take(MAX_DESCRIPTION_KEYWORDS)
            .collect();
        if !keywords.is_empty() {
            parts.push(keywords.join(" "));
        }
    }

    for item in &ctx.evidence {
        if !item.tags.is_empty() {
            parts.push(
                item.tags
                    .iter()
                    .take(MAX_TAGS_PER_ITEM)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }
    }

    let query = parts.join(" ");
    query.chars().take(QUERY_MAX_LEN).collect()
}

/// Map a province to the index's jurisdiction partition code.
/// Unmapped or missing provinces fall back to the default code.
pub fn jurisdiction_code(province: Option<&str>) -> &'static str {
    match province.map(str::to_uppercase).as_deref() {
        Some("ON") => "on",
        Some("BC") => "bc",
        Some("AB") => "ab",
        Some("QC") => "qc",
        Some("MB") => "mb",
        Some("SK") => "sk",
        Some("NS") => "ns",
        Some("NB") => "nb",
        Some("NL") => "nl",
        Some("PE") => "pe",
        Some("NT") => "nt",
        Some("NU") => "nu",
        Some("YT") => "yt",
        _ => "on",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CaseRecord, EvidenceItem, Venue};
    use chrono::Utc;
    use uuid::Uuid;

    fn ctx(
        venue: Option<Venue>,
        description: Option<&str>,
        tags: Vec<Vec<&str>>,
    ) -> CaseContext {
        let case_id = Uuid::new_v4();
        CaseContext {
            case: CaseRecord {
                id: case_id,
                user_id: Uuid::new_v4(),
                venue,
                province: Some("ON".to_string()),
                description: description.map(String::from),
                merit_score: None,
            },
            evidence: tags
                .into_iter()
                .map(|t| EvidenceItem {
                    id: Uuid::new_v4(),
                    case_id,
                    label: "item".to_string(),
                    description: None,
                    extracted_text: None,
                    tags: t.into_iter().map(String::from).collect(),
                    uploaded_at: Utc::now(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_venue_keywords_lead_the_query() {
        let ctx = ctx(Some(Venue::Ltb), None, vec![]);
        let query = build_search_query(&ctx);
        assert!(query.starts_with("landlord tenant"));
    }

    #[test]
    fn test_short_words_are_dropped() {
        let ctx = ctx(None, Some("the unit had mold and water damage"), vec![]);
        let query = build_search_query(&ctx);
        assert!(query.contains("damage"));
        assert!(query.contains("water"));
        assert!(!query.contains("the"));
        assert!(!query.contains("mold"));
    }

    #[test]
    fn test_description_keywords_capped_at_ten() {
        let description = (0..20)
            .map(|i| format!("keyword{:02}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let ctx = ctx(None, Some(&description), vec![]);
        let query = build_search_query(&ctx);
        assert!(query.contains("keyword09"));
        assert!(!query.contains("keyword10"));
    }

    #[test]
    fn test_tags_capped_at_three_per_item() {
        let ctx = ctx(None, None, vec![vec!["a1111", "b2222", "c3333", "d4444"]]);
        let query = build_search_query(&ctx);
        assert!(query.contains("c3333"));
        assert!(!query.contains("d4444"));
    }

    #[test]
    fn test_query_truncated_to_200_chars() {
        let description = "verylongkeyword ".repeat(30);
        let ctx = ctx(Some(Venue::Hrto), Some(&description), vec![vec!["x7777"]]);
        let query = build_search_query(&ctx);
        assert!(query.chars().count() <= 200);
    }

    #[test]
    fn test_jurisdiction_mapping() {
        assert_eq!(jurisdiction_code(Some("ON")), "on");
        assert_eq!(jurisdiction_code(Some("bc")), "bc");
        assert_eq!(jurisdiction_code(Some("XX")), "on");
        assert_eq!(jurisdiction_code(None), "on");
    }
}
