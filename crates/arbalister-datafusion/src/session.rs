use datafusion::prelude::{SessionConfig, SessionContext};

/// Configuration for contexts that load files for IPC export.
///
/// Parquet string columns are read as plain `Utf8`: string views are not
/// understood by every Arrow IPC consumer.
pub fn session_config() -> SessionConfig {
    SessionConfig::new().set_bool("datafusion.execution.parquet.schema_force_view_types", false)
}

/// Fresh execution context. Each request or load gets its own.
pub fn new_session_context() -> SessionContext {
    SessionContext::new_with_config(session_config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parquet_view_types_are_disabled() {
        let ctx = new_session_context();
        let config = ctx.copied_config();
        assert!(!config.options().execution.parquet.schema_force_view_types);
    }
}
