#![cfg(feature = "test-utils-postgres")]

//! Contract conformance against a real PostgreSQL server (embedded, no
//! external services). One test exercises the full surface so the server is
//! provisioned once.

use chrono::NaiveDate;
use sql_client::prelude::*;
use sql_client::test_utils::{setup_postgres_embedded, stop_postgres_embedded};

#[test]
fn postgres_full_surface() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let server = setup_postgres_embedded("sql_client_test").await?;

        let mut client = SqlClient::new();
        client.open("postgres", &server.dsn, 5).await?;
        assert_eq!(client.driver(), Some(DatabaseType::Postgres));

        client
            .execute(
                "CREATE TABLE events (
                    id BIGINT PRIMARY KEY,
                    label TEXT,
                    score DOUBLE PRECISION,
                    happened_at TIMESTAMP,
                    active BOOLEAN
                )",
                &[],
            )
            .await?;

        // Direct operations with native $n placeholders.
        let happened_at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .ok_or("bad timestamp literal")?;
        client
            .execute(
                "INSERT INTO events (id, label, score, happened_at, active)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    RowValues::Int(1),
                    RowValues::Text("launch".into()),
                    RowValues::Float(0.5),
                    RowValues::Timestamp(happened_at),
                    RowValues::Bool(true),
                ],
            )
            .await?;

        let row = client
            .query_row("SELECT * FROM events WHERE id = $1", &[RowValues::Int(1)])
            .await?
            .ok_or("expected a row")?;
        assert_eq!(row.get("label").and_then(RowValues::as_text), Some("launch"));
        assert_eq!(row.get("score").and_then(RowValues::as_float), Some(0.5));
        assert_eq!(
            row.get("happened_at").and_then(RowValues::as_timestamp),
            Some(happened_at)
        );
        assert_eq!(row.get("active").and_then(RowValues::as_bool), Some(&true));

        // Prepared slot.
        client
            .set_prepare("INSERT INTO events (id, label) VALUES ($1, $2)")
            .await?;
        client
            .execute_prepare(&[RowValues::Int(2), RowValues::Text("retry".into())])
            .await?;
        client.set_prepare("SELECT label FROM events WHERE id = $1").await?;
        let row = client
            .query_row_prepare(&[RowValues::Int(2)])
            .await?
            .ok_or("expected a row")?;
        assert_eq!(row.get("label").and_then(RowValues::as_text), Some("retry"));

        // Transaction commit, with a transactional prepared statement.
        client.begin_transaction().await?;
        client
            .set_prepare_transaction("INSERT INTO events (id, label) VALUES ($1, $2)")
            .await?;
        client
            .execute_prepare_transaction(&[RowValues::Int(3), RowValues::Text("tx".into())])
            .await?;
        let rs = client
            .query_transaction("SELECT count(*) AS n FROM events", &[])
            .await?;
        assert_eq!(rs.results[0].get("n").and_then(RowValues::as_int), Some(&3));
        client.end_transaction(TxOutcome::Commit).await?;

        // Transaction rollback.
        client.begin_transaction().await?;
        client
            .execute_transaction("DELETE FROM events WHERE id = $1", &[RowValues::Int(1)])
            .await?;
        client.end_transaction(TxOutcome::Rollback).await?;
        let row = client
            .query_row("SELECT label FROM events WHERE id = $1", &[RowValues::Int(1)])
            .await?;
        assert!(row.is_some());

        // Precondition messages are identical across backends.
        client.end_transaction(TxOutcome::Commit).await.map_or_else(
            |e| assert_eq!(e.to_string(), "please call BeginTransaction first"),
            |()| panic!("expected a precondition error"),
        );

        client.close().await?;
        stop_postgres_embedded(server).await;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
