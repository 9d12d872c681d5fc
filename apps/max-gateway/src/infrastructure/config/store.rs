//! Configuration Store Loader
//!
//! Reads the `service_config` table (key, value, last-update triples) from
//! the configuration database into the resolved string map consumed by the
//! channel sessions. A load failure is not fatal to startup: the caller logs
//! it and continues with whatever was loaded, which downstream manifests as
//! connect failures on the affected channels.

use turso::{Builder, Value};

use crate::application::ConfigMap;

/// Store access error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying database reported an error.
    #[error("configuration store: {0}")]
    Store(#[from] turso::Error),
}

/// Load the service configuration table from the store at `dsn`.
///
/// Each loaded entry is logged with its last-update stamp.
///
/// # Errors
///
/// Fails when the store cannot be opened or the table cannot be read.
pub async fn load_service_config(dsn: &str) -> Result<ConfigMap, StoreError> {
    let db = Builder::new_local(dsn).build().await?;
    let conn = db.connect()?;

    let mut rows = conn
        .query(
            "SELECT field_key, field_value, last_update FROM service_config",
            (),
        )
        .await?;

    let mut config = ConfigMap::new();
    while let Some(row) = rows.next().await? {
        let key = text_value(&row.get_value(0)?);
        let value = text_value(&row.get_value(1)?);
        let updated = text_value(&row.get_value(2)?);

        tracing::info!(key = %key, value = %value, updated = %updated, "Service config entry");
        config.insert(key, value);
    }

    Ok(config)
}

/// Render a store value as trimmed text.
fn text_value(value: &Value) -> String {
    match value {
        Value::Text(s) => s.trim().to_owned(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Null | Value::Blob(_) => String::new(),
    }
}
