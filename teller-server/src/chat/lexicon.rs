//! Keyword router for the warehouse chatbot.
//!
//! Maps free-text input to the warehouse tables worth querying, by
//! case-insensitive substring matching against a static lexicon. All matches
//! are unioned; there is no ranking or stemming.

use std::collections::BTreeSet;

/// Static lexicon: lowercase term → warehouse tables it points at.
///
/// Tables may repeat across terms; the router deduplicates.
const KEYWORD_MAP: &[(&str, &[&str])] = &[
    (
        "customer",
        &[
            "dim_customer",
            "fact_customer_activity",
            "dim_account",
            "fact_credit_details",
        ],
    ),
    (
        "customers",
        &[
            "dim_customer",
            "fact_customer_activity",
            "dim_account",
            "fact_credit_details",
        ],
    ),
    (
        "account",
        &[
            "dim_account",
            "fact_resources",
            "fact_transaction",
            "fact_product_subscription",
        ],
    ),
    (
        "accounts",
        &[
            "dim_account",
            "fact_resources",
            "fact_transaction",
            "fact_product_subscription",
        ],
    ),
    (
        "transaction",
        &["fact_transaction", "dim_account", "dim_customer", "dim_agency"],
    ),
    (
        "transactions",
        &["fact_transaction", "dim_account", "dim_customer", "dim_agency"],
    ),
    (
        "agency",
        &["dim_agency", "dim_employee", "dim_account", "fact_objectives"],
    ),
    (
        "agencies",
        &["dim_agency", "dim_employee", "dim_account", "fact_objectives"],
    ),
    (
        "zone",
        &["dim_agency", "dim_employee", "dim_account", "fact_objectives"],
    ),
    ("employee", &["dim_employee", "fact_objectives", "dim_agency"]),
    ("employees", &["dim_employee", "fact_objectives", "dim_agency"]),
    (
        "product",
        &["dim_product", "fact_product_subscription", "fact_credit_details"],
    ),
    (
        "products",
        &["dim_product", "fact_product_subscription", "fact_credit_details"],
    ),
    (
        "credit",
        &["fact_credit_details", "dim_customer", "dim_product"],
    ),
    (
        "credits",
        &["fact_credit_details", "dim_customer", "dim_product"],
    ),
    (
        "resource",
        &["fact_resources", "dim_account", "dim_customer"],
    ),
    (
        "resources",
        &["fact_resources", "dim_account", "dim_customer"],
    ),
    (
        "objective",
        &["fact_objectives", "dim_employee", "dim_agency"],
    ),
    (
        "objectives",
        &["fact_objectives", "dim_employee", "dim_agency"],
    ),
    (
        "activity",
        &["fact_customer_activity", "dim_customer", "dim_agency"],
    ),
    (
        "activities",
        &["fact_customer_activity", "dim_customer", "dim_agency"],
    ),
];

/// Canned response when no lexicon term matches. A terminal state, not an
/// error.
pub const HELP_MESSAGE: &str = "I can help you with information about:\n\
    • Customers (e.g., 'Tell me about the customer with the id C034114' or 'How many customers do we have?')\n\
    • Accounts (e.g., 'Which agency has the most accounts?')\n\
    • Transactions (e.g., 'Show me recent transactions')\n\
    • Agencies (e.g., 'List all agencies')\n\
    • Products (e.g., 'What are our top products?')\n\
    • Credits (e.g., 'Show me recent credit approvals')\n\
    What would you like to know?";

/// Resolve the set of warehouse tables relevant to a message.
///
/// Empty result means no lexicon term occurred in the message.
pub fn relevant_tables(message: &str) -> BTreeSet<&'static str> {
    let lower = message.to_lowercase();

    let mut tables = BTreeSet::new();
    for (term, mapped) in KEYWORD_MAP {
        if lower.contains(term) {
            tables.extend(mapped.iter().copied());
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keyword_yields_empty_set() {
        assert!(relevant_tables("hello there").is_empty());
        assert!(relevant_tables("").is_empty());
        assert!(relevant_tables("what is the weather like").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let tables = relevant_tables("Tell me about our CUSTOMERS");
        assert!(tables.contains("dim_customer"));
        assert!(tables.contains("fact_customer_activity"));
    }

    #[test]
    fn overlapping_terms_union_without_duplicates() {
        // "customer" and "credit" both map to dim_customer and
        // fact_credit_details; the union holds each table once.
        let tables = relevant_tables("show customer credit history");
        let expected: BTreeSet<&str> = [
            "dim_customer",
            "fact_customer_activity",
            "dim_account",
            "fact_credit_details",
            "dim_product",
        ]
        .into_iter()
        .collect();
        assert_eq!(tables, expected);
    }

    #[test]
    fn singular_term_matches_inside_plural() {
        // Substring containment: "transaction" occurs inside "transactions"
        let singular = relevant_tables("one transaction");
        let plural = relevant_tables("many transactions");
        assert_eq!(singular, plural);
    }

    #[test]
    fn customer_id_question_hits_customer_tables() {
        let tables = relevant_tables("Tell me about the customer with the id C034114");
        assert!(tables.contains("dim_customer"));
        assert!(tables.contains("dim_account"));
        assert!(tables.contains("fact_credit_details"));
    }

    #[test]
    fn help_message_lists_topics() {
        assert!(HELP_MESSAGE.contains("Customers"));
        assert!(HELP_MESSAGE.contains("Transactions"));
        assert!(HELP_MESSAGE.contains("What would you like to know?"));
    }
}
