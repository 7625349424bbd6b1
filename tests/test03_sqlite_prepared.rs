#![cfg(feature = "sqlite")]

//! Prepared-statement slot lifecycle against SQLite.
//!
//! The slot pins a pool connection for its whole lifetime, so these tests use
//! a file-backed database with a pool large enough for slot plus direct
//! traffic (`:memory:` would give each pooled connection its own database).

use sql_client::prelude::*;
use tempfile::NamedTempFile;

#[test]
fn prepared_insert_and_select() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;

        let mut client = SqlClient::new();
        client.open("sqlite", dsn, 3).await?;
        client
            .execute("CREATE TABLE users (id INTEGER, name TEXT);", &[])
            .await?;

        client
            .set_prepare("INSERT INTO users (id, name) VALUES (?1, ?2)")
            .await?;
        for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
            client
                .execute_prepare(&[RowValues::Int(id), RowValues::Text(name.into())])
                .await?;
        }

        // Direct operations keep working while the slot is held.
        let rs = client.query("SELECT count(*) AS n FROM users", &[]).await?;
        assert_eq!(rs.results[0].get("n").and_then(RowValues::as_int), Some(&3));

        // Replacing the slot releases the old statement.
        client
            .set_prepare("SELECT name FROM users WHERE id = ?1")
            .await?;
        let rs = client.query_prepare(&[RowValues::Int(2)]).await?;
        assert_eq!(rs.results.len(), 1);
        assert_eq!(
            rs.results[0].get("name").and_then(RowValues::as_text),
            Some("bob")
        );

        let row = client
            .query_row_prepare(&[RowValues::Int(3)])
            .await?
            .ok_or("expected a row")?;
        assert_eq!(row.get("name").and_then(RowValues::as_text), Some("carol"));

        let none = client.query_row_prepare(&[RowValues::Int(99)]).await?;
        assert!(none.is_none());

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn failed_prepare_keeps_the_old_slot() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;

        let mut client = SqlClient::new();
        client.open("sqlite", dsn, 3).await?;
        client
            .execute("CREATE TABLE t (id INTEGER);", &[])
            .await?;
        client
            .execute("INSERT INTO t (id) VALUES (?1)", &[RowValues::Int(7)])
            .await?;

        client.set_prepare("SELECT id FROM t WHERE id = ?1").await?;

        let err = client
            .set_prepare("SELECT FROM nowhere WHERE")
            .await
            .unwrap_err();
        assert!(matches!(err, SqlClientError::SqliteError(_)));

        // The previously installed statement survives the failed replace.
        let row = client
            .query_row_prepare(&[RowValues::Int(7)])
            .await?
            .ok_or("expected a row")?;
        assert_eq!(row.get("id").and_then(RowValues::as_int), Some(&7));

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn wrong_argument_count_forwards_the_driver_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;

        let mut client = SqlClient::new();
        client.open("sqlite", dsn, 3).await?;
        client
            .execute("CREATE TABLE users (id INTEGER, name TEXT);", &[])
            .await?;
        client
            .execute(
                "INSERT INTO users (id, name) VALUES (?1, ?2)",
                &[RowValues::Int(1), RowValues::Text("alice".into())],
            )
            .await?;

        client
            .set_prepare("SELECT name FROM users WHERE id = ?1 AND name = ?2")
            .await?;

        // One argument for a two-parameter statement: rusqlite's arity check
        // fires and is forwarded as-is.
        let err = client
            .query_row_prepare(&[RowValues::Int(1)])
            .await
            .unwrap_err();
        assert!(matches!(err, SqlClientError::SqliteError(_)));
        assert!(err.to_string().contains("parameter"));

        // The statement still works with the right arity.
        let row = client
            .query_row_prepare(&[RowValues::Int(1), RowValues::Text("alice".into())])
            .await?
            .ok_or("expected a row")?;
        assert_eq!(row.get("name").and_then(RowValues::as_text), Some("alice"));

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn exhausted_pool_times_out_instead_of_hanging() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;

        let mut client = SqlClient::new();
        client.open("sqlite", dsn, 1).await?;
        client
            .execute("CREATE TABLE t (id INTEGER);", &[])
            .await?;

        // The slot pins the pool's only connection; a direct operation must
        // fail with the pool's wait timeout rather than block forever.
        client.set_prepare("SELECT id FROM t").await?;
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            client.query("SELECT count(*) FROM t", &[]),
        )
        .await?;
        let err = result.unwrap_err();
        assert!(matches!(err, SqlClientError::PoolErrorSqlite(_)));

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn reopen_discards_the_slot() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;

        let mut client = SqlClient::new();
        client.open("sqlite", dsn, 3).await?;
        client
            .execute("CREATE TABLE t (id INTEGER);", &[])
            .await?;
        client.set_prepare("SELECT id FROM t").await?;

        client.open("sqlite", dsn, 3).await?;
        let err = client.query_prepare(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepare first");

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
