//! Call-order contract: every operation fails with its documented stable
//! message when its layer is missing, regardless of backend.

use sql_client::prelude::*;

#[test]
fn fresh_handle_rejects_everything_with_stable_messages()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = SqlClient::new();
        assert_eq!(client.driver(), None);

        let err = client.query("SELECT 1", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call Open first");
        let err = client.query_row("SELECT 1", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call Open first");
        let err = client.execute("DELETE FROM t", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call Open first");
        let err = client.set_prepare("SELECT 1").await.unwrap_err();
        assert_eq!(err.to_string(), "please call Open first");
        let err = client.begin_transaction().await.unwrap_err();
        assert_eq!(err.to_string(), "please call Open first");

        // Prepared-statement layer missing.
        let err = client.query_prepare(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepare first");
        let err = client.query_row_prepare(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepare first");
        let err = client.execute_prepare(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepare first");

        // Transaction layer missing.
        let err = client.query_transaction("SELECT 1", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call BeginTransaction first");
        let err = client
            .query_row_transaction("SELECT 1", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "please call BeginTransaction first");
        let err = client
            .execute_transaction("DELETE FROM t", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "please call BeginTransaction first");
        let err = client.set_prepare_transaction("SELECT 1").await.unwrap_err();
        assert_eq!(err.to_string(), "please call BeginTransaction first");
        let err = client.end_transaction(TxOutcome::Commit).await.unwrap_err();
        assert_eq!(err.to_string(), "please call BeginTransaction first");

        // Transactional prepared layer missing reports its own message, even
        // with no transaction at all.
        let err = client.query_prepare_transaction(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepareTransaction first");
        let err = client.query_row_prepare_transaction(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepareTransaction first");
        let err = client.execute_prepare_transaction(&[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call SetPrepareTransaction first");

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn close_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = SqlClient::new();
        client.close().await?;
        client.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn unknown_tag_is_a_config_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = SqlClient::new();
        let err = client.open("interbase", "whatever", 1).await.unwrap_err();
        assert!(matches!(err, SqlClientError::ConfigError(_)));
        assert!(err.to_string().contains("unknown driver tag"));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn registered_tag_without_a_binding_is_unimplemented() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = SqlClient::new();
        let err = client
            .open("oracle", "scott/tiger@localhost", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SqlClientError::Unimplemented(_)));
        assert!(err.to_string().contains("'oracle'"));
        // The failed open leaves the handle closed.
        let err = client.query("SELECT 1", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call Open first");
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[cfg(feature = "sqlite")]
#[test]
fn open_and_close_track_the_driver() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut client = SqlClient::new();
        client.open("sqlite", ":memory:", 1).await?;
        assert_eq!(client.driver(), Some(DatabaseType::Sqlite));
        assert_eq!(client.driver().map(|d| d.tag()), Some("sqlite"));

        client.close().await?;
        assert_eq!(client.driver(), None);
        let err = client.query("SELECT 1", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "please call Open first");
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
