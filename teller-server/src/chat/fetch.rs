//! Data fetcher for the warehouse chatbot.
//!
//! Issues one bounded query per relevant table and aggregates the results.
//! A failing table is logged and skipped; the request only fails when no
//! table produced data.

use crate::warehouse::{Row, Warehouse};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use teller_common::util::truncate_with_ellipsis;
use teller_common::Error;

/// String fields longer than this are truncated before prompting.
pub const TRUNCATE_CHARS: usize = 100;

/// Fetch every relevant table, truncating long text fields.
///
/// Returns `table → rows` for tables that produced data. Per-table failures
/// are non-fatal; if nothing produced data the whole fetch fails with the
/// first error encountered, or a generic message when every table was simply
/// empty.
pub async fn fetch_tables(
    warehouse: &dyn Warehouse,
    tables: &BTreeSet<&'static str>,
    row_limit: u32,
) -> Result<BTreeMap<String, Vec<Row>>, Error> {
    let mut data = BTreeMap::new();
    let mut first_error: Option<String> = None;

    for table in tables {
        let sql = format!("SELECT * FROM {} LIMIT {}", table, row_limit);
        match warehouse.query(&sql).await {
            Ok(rows) if !rows.is_empty() => {
                tracing::debug!(table, rows = rows.len(), "Fetched warehouse table");
                let rows = rows.into_iter().map(truncate_row).collect();
                data.insert(table.to_string(), rows);
            }
            Ok(_) => {
                tracing::debug!(table, "Warehouse table is empty");
            }
            Err(e) => {
                tracing::warn!(table, error = %e, "Warehouse fetch failed, skipping table");
                if first_error.is_none() {
                    first_error = Some(e.to_string());
                }
            }
        }
    }

    if data.is_empty() {
        let message = first_error
            .map(|e| format!("Database error: {}", e))
            .unwrap_or_else(|| "No data was fetched from any table".to_string());
        return Err(Error::DataUnavailable(message));
    }

    Ok(data)
}

fn truncate_row(row: Row) -> Row {
    row.into_iter()
        .map(|(column, value)| {
            let value = match value {
                Value::String(s) if s.chars().count() > TRUNCATE_CHARS => {
                    Value::String(truncate_with_ellipsis(&s, TRUNCATE_CHARS))
                }
                other => other,
            };
            (column, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Warehouse stub with canned per-table outcomes.
    struct StubWarehouse {
        tables: HashMap<&'static str, std::result::Result<Vec<Row>, &'static str>>,
    }

    #[async_trait]
    impl Warehouse for StubWarehouse {
        async fn query(&self, sql: &str) -> Result<Vec<Row>> {
            let table = self
                .tables
                .iter()
                .find(|(name, _)| sql.contains(*name));
            match table {
                Some((_, Ok(rows))) => Ok(rows.clone()),
                Some((_, Err(msg))) => Err(anyhow::anyhow!(*msg)),
                None => Ok(Vec::new()),
            }
        }
    }

    fn row(fields: &[(&str, Value)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn tables(names: &[&'static str]) -> BTreeSet<&'static str> {
        names.iter().copied().collect()
    }

    #[tokio::test]
    async fn aggregates_tables_with_data() {
        let warehouse = StubWarehouse {
            tables: HashMap::from([
                (
                    "dim_customer",
                    Ok(vec![row(&[("customerid", Value::from("C1"))])]),
                ),
                ("dim_account", Ok(vec![row(&[("accountid", Value::from("A1"))])])),
            ]),
        };

        let data = fetch_tables(&warehouse, &tables(&["dim_customer", "dim_account"]), 50)
            .await
            .unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data["dim_customer"].len(), 1);
    }

    #[tokio::test]
    async fn failing_table_is_skipped() {
        let warehouse = StubWarehouse {
            tables: HashMap::from([
                ("dim_customer", Err("relation does not exist")),
                ("dim_account", Ok(vec![row(&[("accountid", Value::from("A1"))])])),
            ]),
        };

        let data = fetch_tables(&warehouse, &tables(&["dim_customer", "dim_account"]), 50)
            .await
            .unwrap();

        assert_eq!(data.len(), 1);
        assert!(data.contains_key("dim_account"));
    }

    #[tokio::test]
    async fn all_failures_surface_first_error() {
        let warehouse = StubWarehouse {
            tables: HashMap::from([
                ("dim_agency", Err("connection refused")),
                ("dim_employee", Err("connection refused")),
            ]),
        };

        let err = fetch_tables(&warehouse, &tables(&["dim_agency", "dim_employee"]), 50)
            .await
            .unwrap_err();

        match err {
            Error::DataUnavailable(msg) => {
                assert!(msg.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn all_empty_yields_generic_message() {
        let warehouse = StubWarehouse {
            tables: HashMap::new(),
        };

        let err = fetch_tables(&warehouse, &tables(&["dim_product"]), 50)
            .await
            .unwrap_err();

        match err {
            Error::DataUnavailable(msg) => {
                assert_eq!(msg, "No data was fetched from any table");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn long_strings_are_truncated() {
        let long = "x".repeat(150);
        let exact = "y".repeat(100);
        let warehouse = StubWarehouse {
            tables: HashMap::from([(
                "dim_customer",
                Ok(vec![row(&[
                    ("notes", Value::from(long)),
                    ("name", Value::from(exact.clone())),
                    ("visits", Value::from(42)),
                ])]),
            )]),
        };

        let data = fetch_tables(&warehouse, &tables(&["dim_customer"]), 50)
            .await
            .unwrap();

        let fetched = &data["dim_customer"][0];
        let notes = fetched["notes"].as_str().unwrap();
        assert_eq!(notes.chars().count(), TRUNCATE_CHARS + 3);
        assert!(notes.ends_with("..."));
        // 100 chars or fewer stay untouched, non-strings stay untouched
        assert_eq!(fetched["name"].as_str().unwrap(), exact);
        assert_eq!(fetched["visits"], Value::from(42));
    }

    #[tokio::test]
    async fn row_limit_lands_in_sql() {
        struct CapturingWarehouse {
            seen: std::sync::Mutex<Vec<String>>,
        }

        #[async_trait]
        impl Warehouse for CapturingWarehouse {
            async fn query(&self, sql: &str) -> Result<Vec<Row>> {
                self.seen.lock().unwrap().push(sql.to_string());
                Ok(vec![Row::from([("a".to_string(), Value::from(1))])])
            }
        }

        let warehouse = CapturingWarehouse {
            seen: std::sync::Mutex::new(Vec::new()),
        };
        fetch_tables(&warehouse, &tables(&["dim_account"]), 50)
            .await
            .unwrap();

        let seen = warehouse.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["SELECT * FROM dim_account LIMIT 50"]);
    }
}
