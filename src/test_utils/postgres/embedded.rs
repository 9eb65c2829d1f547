use super::super::SHARED_RUNTIME;
use crate::config::ConnectionConfig;
use crate::postgres::Session;

use postgresql_embedded::PostgreSQL;

/// Represents a running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    /// Working connection parameters: the requested user, database, and password, pointed
    /// at the embedded server
    pub config: ConnectionConfig,
}

/// Start an embedded `PostgreSQL` instance that accepts `cfg`'s user, password, and
/// database. Host and port in `cfg` are ignored; read them back from the returned config.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, or if database/user
/// provisioning or the post-start connectivity check fails.
pub fn setup_postgres_embedded(
    cfg: &ConnectionConfig,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();

        // Setup PostgreSQL binaries (bundled, so no download conflicts)
        postgresql.setup().await?;
        postgresql.start().await?;

        let port = postgresql.settings().port;
        let host = postgresql.settings().host.clone();
        let embedded_user = postgresql.settings().username.clone();
        let embedded_password = postgresql.settings().password.clone();

        if !postgresql.database_exists(&cfg.dbname).await? {
            postgresql.create_database(&cfg.dbname).await?;
        }

        let admin_cfg = ConnectionConfig {
            host: host.clone(),
            port,
            user: embedded_user.clone(),
            password: embedded_password.clone(),
            dbname: "postgres".to_string(),
            ..cfg.clone()
        };

        let final_cfg = if cfg.user == embedded_user {
            ConnectionConfig {
                password: embedded_password,
                ..admin_cfg.clone()
            }
        } else {
            // Connect as the embedded superuser to create the requested login
            let mut admin = Session::connect_labeled(&admin_cfg, "admin").await?;
            let create_user_sql = format!(
                "CREATE USER \"{}\" WITH PASSWORD '{}' SUPERUSER",
                cfg.user,
                cfg.password.replace('\'', "''")
            );
            admin
                .execute(&create_user_sql)
                .await
                .map_err(|e| format!("Failed to create user {}: {e}", cfg.user))?;
            admin.close().await?;
            println!("Created user {} with desired credentials", cfg.user);

            ConnectionConfig {
                host,
                port,
                ..cfg.clone()
            }
        };
        let final_cfg = ConnectionConfig {
            dbname: cfg.dbname.clone(),
            ..final_cfg
        };

        println!("PostgreSQL started on port {port}");
        println!("Database URL: {}", final_cfg.redacted_url());

        // Quick connection test
        let mut session = Session::connect(&final_cfg).await?;
        session.query("SELECT 1").await?;
        session.close().await?;
        println!("Successfully connected to embedded PostgreSQL database!");

        Ok(EmbeddedPostgres {
            postgresql,
            port,
            config: final_cfg,
        })
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
