//! Prompt Template
//!
//! Fixed prompt construction for the paper-analysis task. The template embeds
//! title, abstract, and publication year verbatim (empty fields stay empty)
//! and requests a JSON object with exactly the four analysis keys.

use crate::types::PaperRecord;

/// System instruction sent with every request
pub const SYSTEM_PROMPT: &str =
    "You are an AI language model tasked with analyzing academic papers. \
     Always respond with valid JSON.";

/// Required keys in the model's JSON reply, in output-column order
pub const REQUIRED_KEYS: [&str; 4] = [
    "concise_summary",
    "research_methodology",
    "key_research_questions",
    "future_research_directions",
];

/// Build the user prompt for one record
pub fn build_prompt(record: &PaperRecord) -> String {
    let year = record
        .publication_year
        .map(|y| y.to_string())
        .unwrap_or_default();

    format!(
        r#"Task: Provide a concise summary, describe the research methodology, list key research questions, and suggest future research directions.

Input:
Title: {title}
Abstract: {abstract_text}
Publication Year: {year}

Output: JSON format with the following keys:
- concise_summary
- research_methodology
- key_research_questions
- future_research_directions

Example output:
{{
    "concise_summary": "brief summary",
    "research_methodology": "methodology description",
    "key_research_questions": ["question1", "question2"],
    "future_research_directions": ["direction1", "direction2"]
}}"#,
        title = record.title,
        abstract_text = record.abstract_text,
        year = year,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_fields() {
        let record = PaperRecord::new("p-1")
            .with_title("Graph Learning at Scale")
            .with_abstract("We propose a method.")
            .with_year(2023);

        let prompt = build_prompt(&record);
        assert!(prompt.contains("Title: Graph Learning at Scale"));
        assert!(prompt.contains("Abstract: We propose a method."));
        assert!(prompt.contains("Publication Year: 2023"));
        for key in REQUIRED_KEYS {
            assert!(prompt.contains(key));
        }
    }

    #[test]
    fn test_prompt_allows_empty_fields() {
        let record = PaperRecord::new("p-2");
        let prompt = build_prompt(&record);
        assert!(prompt.contains("Title: \n"));
        assert!(prompt.contains("Abstract: \n"));
        assert!(prompt.contains("Publication Year: \n"));
    }
}
