//! Prompt composer for the warehouse chatbot.
//!
//! Builds the single deterministic prompt sent to the generation service:
//! role framing, the verbatim question, a per-table shape summary, and a
//! fixed block of contextual statistics.

use crate::warehouse::Row;
use std::collections::BTreeMap;

/// Fixed aggregate statistics included with every prompt. Not necessarily
/// related to the question; they give the model a sense of scale.
const CONTEXT_METRICS: &str =
    "19K total accounts, 10K total customers, 100K total transactions, 20K total agencies, 54K total products";

/// Compose the generation prompt for a question and its fetched data.
pub fn compose(question: &str, data: &BTreeMap<String, Vec<Row>>) -> String {
    let summary = data
        .iter()
        .map(|(table, rows)| {
            let fields = rows
                .first()
                .map(|row| {
                    row.keys()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            format!("{}: {} rows with fields: {}", table, rows.len(), fields)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a banking assistant for internal staff. Your role is to help staff understand banking data in a clear, precise, short way. Given the following data, please answer this question: "{question}"

Available data summary:
{summary}

Sample data (metrics):
might not be related to the query, but here for context: {CONTEXT_METRICS}

Please provide a brief precise response that:
1. Directly answers the question in simple terms
2. Uses natural, everyday language
3. Includes relevant numbers and statistics
4. Avoids technical jargon unless necessary
5. Makes the information easy to understand
6. Keeps the response concise and focused

Remember: You're talking to a bank staff member, so be professional but friendly. Use bullet points for better readability, focus on the most important information first, and don't mention sql table names.

Response:"#
    )
}
