#![cfg(feature = "sqlite")]

//! Transaction lifecycle against SQLite: commit, rollback, the transactional
//! prepared slot, and cleanup on close.

use sql_client::prelude::*;
use tempfile::NamedTempFile;

async fn open_with_table(dsn: &str) -> Result<SqlClient, Box<dyn std::error::Error>> {
    let mut client = SqlClient::new();
    client.open("sqlite", dsn, 3).await?;
    client
        .execute("CREATE TABLE IF NOT EXISTS accounts (id INTEGER, balance INTEGER);", &[])
        .await?;
    Ok(client)
}

async fn balance_of(client: &mut SqlClient, id: i64) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    let row = client
        .query_row(
            "SELECT balance FROM accounts WHERE id = ?1",
            &[RowValues::Int(id)],
        )
        .await?;
    Ok(row
        .and_then(|r| r.get("balance").and_then(RowValues::as_int).copied()))
}

#[test]
fn commit_makes_writes_visible() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;
        let mut client = open_with_table(dsn).await?;

        client.begin_transaction().await?;
        client
            .execute_transaction(
                "INSERT INTO accounts (id, balance) VALUES (?1, ?2)",
                &[RowValues::Int(1), RowValues::Int(100)],
            )
            .await?;

        // Reads inside the transaction see its own writes.
        let row = client
            .query_row_transaction(
                "SELECT balance FROM accounts WHERE id = ?1",
                &[RowValues::Int(1)],
            )
            .await?
            .ok_or("expected a row inside the transaction")?;
        assert_eq!(row.get("balance").and_then(RowValues::as_int), Some(&100));

        // Reads outside the transaction do not see uncommitted writes (the
        // pool is in WAL mode, so other connections read the old snapshot).
        assert_eq!(balance_of(&mut client, 1).await?, None);

        client.end_transaction(TxOutcome::Commit).await?;
        assert_eq!(balance_of(&mut client, 1).await?, Some(100));

        // The transaction is gone once ended.
        let err = client
            .query_transaction("SELECT 1", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "please call BeginTransaction first");

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn rollback_discards_writes() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;
        let mut client = open_with_table(dsn).await?;

        client.begin_transaction().await?;
        client
            .execute_transaction(
                "INSERT INTO accounts (id, balance) VALUES (?1, ?2)",
                &[RowValues::Int(2), RowValues::Int(50)],
            )
            .await?;
        client.end_transaction(TxOutcome::Rollback).await?;

        assert_eq!(balance_of(&mut client, 2).await?, None);
        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn end_transaction_accepts_a_result() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;
        let mut client = open_with_table(dsn).await?;

        // Ok commits.
        client.begin_transaction().await?;
        let work: Result<(), SqlClientError> = client
            .execute_transaction(
                "INSERT INTO accounts (id, balance) VALUES (?1, ?2)",
                &[RowValues::Int(3), RowValues::Int(1)],
            )
            .await;
        client.end_transaction(&work).await?;
        work?;
        assert_eq!(balance_of(&mut client, 3).await?, Some(1));

        // Err rolls back.
        client.begin_transaction().await?;
        client
            .execute_transaction(
                "UPDATE accounts SET balance = ?1 WHERE id = ?2",
                &[RowValues::Int(999), RowValues::Int(3)],
            )
            .await?;
        let failed: Result<(), SqlClientError> =
            Err(SqlClientError::ExecutionError("caller gave up".into()));
        client.end_transaction(&failed).await?;
        assert_eq!(balance_of(&mut client, 3).await?, Some(1));

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn one_transaction_at_a_time() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;
        let mut client = open_with_table(dsn).await?;

        client.begin_transaction().await?;
        let err = client.begin_transaction().await.unwrap_err();
        assert!(matches!(err, SqlClientError::ExecutionError(_)));
        assert!(err.to_string().contains("already in progress"));

        // The original transaction is untouched.
        client
            .execute_transaction(
                "INSERT INTO accounts (id, balance) VALUES (?1, ?2)",
                &[RowValues::Int(4), RowValues::Int(10)],
            )
            .await?;
        client.end_transaction(TxOutcome::Commit).await?;
        assert_eq!(balance_of(&mut client, 4).await?, Some(10));

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn transactional_prepared_slot_lives_and_dies_with_the_transaction()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;
        let mut client = open_with_table(dsn).await?;

        client.begin_transaction().await?;

        // No statement installed yet.
        let err = client.query_prepare_transaction(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepareTransaction first");

        client
            .set_prepare_transaction("INSERT INTO accounts (id, balance) VALUES (?1, ?2)")
            .await?;
        for id in 10..13 {
            client
                .execute_prepare_transaction(&[RowValues::Int(id), RowValues::Int(id * 10)])
                .await?;
        }

        // Replace the slot with a select mid-transaction.
        client
            .set_prepare_transaction("SELECT balance FROM accounts WHERE id = ?1")
            .await?;
        let row = client
            .query_row_prepare_transaction(&[RowValues::Int(11)])
            .await?
            .ok_or("expected a row")?;
        assert_eq!(row.get("balance").and_then(RowValues::as_int), Some(&110));

        client.end_transaction(TxOutcome::Commit).await?;
        assert_eq!(balance_of(&mut client, 12).await?, Some(120));

        // The slot died with the transaction.
        client.begin_transaction().await?;
        let err = client
            .query_prepare_transaction(&[RowValues::Int(11)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepareTransaction first");
        client.end_transaction(TxOutcome::Rollback).await?;

        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn close_rolls_back_an_open_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = NamedTempFile::new()?;
        let dsn = db.path().to_str().ok_or("non-utf8 temp path")?;

        let mut client = open_with_table(dsn).await?;
        client.begin_transaction().await?;
        client
            .execute_transaction(
                "INSERT INTO accounts (id, balance) VALUES (?1, ?2)",
                &[RowValues::Int(5), RowValues::Int(77)],
            )
            .await?;
        client.close().await?;

        let mut client = open_with_table(dsn).await?;
        assert_eq!(balance_of(&mut client, 5).await?, None);
        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
