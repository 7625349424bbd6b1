//! Embedded `PostgreSQL` helpers for integration tests.
//!
//! Only compiled with the `test-utils-postgres` feature; production builds
//! never pull in the bundled server binaries.

use postgresql_embedded::PostgreSQL;

/// A running embedded `PostgreSQL` server plus a DSN pointing at a freshly
/// created database on it.
pub struct EmbeddedPostgres {
    postgresql: PostgreSQL,
    /// Connection string for the provisioned database.
    pub dsn: String,
}

/// Start an embedded `PostgreSQL` server and create `db_name` on it.
///
/// The returned handle keeps the server alive; pass it to
/// [`stop_postgres_embedded`] when the test is done.
///
/// # Errors
///
/// Returns an error if the bundled binaries cannot be set up, the server
/// fails to start, or the database cannot be created.
pub async fn setup_postgres_embedded(
    db_name: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    let mut postgresql = PostgreSQL::default();
    postgresql.setup().await?;
    postgresql.start().await?;
    postgresql.create_database(db_name).await?;

    let settings = postgresql.settings();
    let dsn = format!(
        "postgres://{user}:{password}@{host}:{port}/{db_name}",
        user = settings.username,
        password = settings.password,
        host = settings.host,
        port = settings.port,
    );

    Ok(EmbeddedPostgres { postgresql, dsn })
}

/// Stop a previously started embedded `PostgreSQL` server.
pub async fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    let _ = postgresql.stop().await;
}
