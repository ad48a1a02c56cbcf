//! Prompt templates for the review tools

use super::statistics::RatingStats;
use super::types::ReviewRecord;

const KEYWORDS_PROMPT: &str = "Given the following user query, extract the most important keywords \
in order to retrieve related reviews via RAG.
Add only very close synonyms. User query: {user_query}
Return ONLY a comma-separated list of keywords, no explanations.";

const SUMMARY_PROMPT: &str = "Summarize the following reviews. Focus on:
- Main pros and cons
- Recurring themes
- Overall sentiment
- Key recommendations

Reviews: {reviews}

Provide a concise summary in 2-3 paragraphs.";

const STATISTICS_PROMPT: &str = "Report statistics for the following reviews:
- Average rating
- Rating range
- Total number of reviews
- How many are positive (4-5) and how many are negative (1-2)

These figures were computed exactly from the ratings; use them as given and do not recompute:
{stats}

Reviews: {reviews}

Reply concisely.";

const QUESTION_PROMPT: &str = "You are an expert assistant specialized in analyzing e-commerce \
product reviews. Based on the provided review texts, answer the user's question accurately and \
comprehensively.

Review texts:
{reviews_texts}

User question: {question}

Please provide a detailed and helpful response based on the review data.";

/// Prompt asking for a single comma-separated keyword line
pub fn keywords_prompt(user_query: &str) -> String {
    fill(KEYWORDS_PROMPT, &[("user_query", user_query)])
}

pub fn summary_prompt(reviews: &[ReviewRecord]) -> String {
    let reviews = serialize_reviews(reviews);
    fill(SUMMARY_PROMPT, &[("reviews", reviews.as_str())])
}

/// Statistics prompt with the locally computed aggregates as ground truth
pub fn statistics_prompt(reviews: &[ReviewRecord], stats: &RatingStats) -> String {
    let stats = stats.to_string();
    let reviews = serialize_reviews(reviews);
    fill(
        STATISTICS_PROMPT,
        &[("stats", stats.as_str()), ("reviews", reviews.as_str())],
    )
}

pub fn question_prompt(question: &str, reviews_texts: &[String]) -> String {
    let reviews_texts = reviews_texts.join("\n\n");
    fill(
        QUESTION_PROMPT,
        &[("reviews_texts", reviews_texts.as_str()), ("question", question)],
    )
}

/// Substitute `{name}` slots in one pass over the template; substituted
/// text is never rescanned.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let slot = slots.iter().find_map(|(name, value)| {
            let after = tail.strip_prefix(*name)?.strip_prefix('}')?;
            Some((*value, after))
        });
        match slot {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn serialize_reviews(reviews: &[ReviewRecord]) -> String {
    // ReviewRecord has no map keys or non-finite floats that could fail
    serde_json::to_string(reviews).unwrap_or_else(|_| String::from("[]"))
}
