//! Prompt builder: numbered pattern context + the knitting-assistant template.

use pattern_store::PatternHit;

/// Template with `{query}` and `{context}` placeholders.
pub const RECOMMENDATION_TEMPLATE: &str = "You are a knowledgeable knitting assistant helping someone find the perfect pattern.

Based on the following knitting patterns, recommend the best options for this request:

REQUEST: {query}

RELEVANT PATTERNS: {context}

Provide 2-3 personalized recommendations. For each pattern, explain:
1. Why it matches their request
2. What skill level it requires
3. Any important details they should know
4. Provide the ravelry link to the pattern

Be friendly, helpful, and concise.

RECOMMENDATIONS:";

/// One numbered block per hit, separated by a blank line.
pub fn format_context(hits: &[PatternHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, h)| {
            let p = &h.pattern;
            format!(
                "{}. {} by {}\n  Type: {}\n  Yarn weight: {}\n  Difficulty: {:.1}/10\n  Link: {}",
                i + 1,
                p.name,
                p.designer,
                p.category,
                p.yarn_weight,
                p.difficulty,
                p.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fills the template; substitution is single-pass so user text is never re-expanded.
pub fn render_prompt(query: &str, context: &str) -> String {
    let (head, rest) = RECOMMENDATION_TEMPLATE
        .split_once("{query}")
        .unwrap_or((RECOMMENDATION_TEMPLATE, ""));
    let (mid, tail) = rest.split_once("{context}").unwrap_or((rest, ""));
    format!("{head}{query}{mid}{context}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ravelry_client::PatternRecord;

    fn hit(id: u64, name: &str, difficulty: f64) -> PatternHit {
        PatternHit {
            id,
            score: 0.5,
            document: String::new(),
            pattern: PatternRecord {
                id,
                name: name.into(),
                designer: "Jo Purl".into(),
                difficulty,
                yarn_weight: "Bulky".into(),
                notes: String::new(),
                url: format!("https://www.ravelry.com/patterns/library/{id}"),
                category: "cardigan sweater".into(),
                downloadable: true,
                free: true,
            },
        }
    }

    #[test]
    fn context_is_numbered_from_one() {
        let ctx = format_context(&[hit(1, "Big Cardi", 3.456), hit(2, "Small Cardi", 0.0)]);
        assert_eq!(
            ctx,
            "1. Big Cardi by Jo Purl\n  Type: cardigan sweater\n  Yarn weight: Bulky\n  Difficulty: 3.5/10\n  Link: https://www.ravelry.com/patterns/library/1\n\n\
             2. Small Cardi by Jo Purl\n  Type: cardigan sweater\n  Yarn weight: Bulky\n  Difficulty: 0.0/10\n  Link: https://www.ravelry.com/patterns/library/2"
        );
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn prompt_embeds_query_and_context() {
        let p = render_prompt("a {context} hat", "CTX");
        assert!(p.contains("REQUEST: a {context} hat\n"));
        assert!(p.contains("RELEVANT PATTERNS: CTX\n"));
        assert!(p.ends_with("RECOMMENDATIONS:"));
        assert!(p.starts_with("You are a knowledgeable knitting assistant"));
    }
}
