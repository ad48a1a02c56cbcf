//! Direct question answering over retrieved reviews

use super::prompts::question_prompt;
use crate::error::Result;
use crate::index::Retriever;
use crate::llm::{strip_thinking, Generator};

/// Prefix of the answer returned when retrieval or generation failed
pub const QUESTION_FAILED_PREFIX: &str = "Error processing question: ";

/// Answer `question` from the `k` closest reviews, thinking section removed
pub async fn answer_question(
    generator: &dyn Generator,
    retriever: &dyn Retriever,
    question: &str,
    k: usize,
) -> String {
    match try_answer(generator, retriever, question, k).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!("Question answering failed: {}", e);
            format!("{}{}", QUESTION_FAILED_PREFIX, e)
        }
    }
}

async fn try_answer(
    generator: &dyn Generator,
    retriever: &dyn Retriever,
    question: &str,
    k: usize,
) -> Result<String> {
    let hits = retriever.search(question, k).await?;
    let texts: Vec<String> = hits.into_iter().map(|(doc, _)| doc.text).collect();
    tracing::debug!("Answering {:?} from {} reviews", question, texts.len());

    let response = generator.generate(&question_prompt(question, &texts)).await?;
    Ok(strip_thinking(&response).trim().to_string())
}
