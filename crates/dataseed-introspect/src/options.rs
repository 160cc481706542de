/// Options that control how introspection behaves.
#[derive(Debug, Clone, Default)]
pub struct IntrospectOptions {
    /// Include `pg_*` and `information_schema` when no explicit list is set.
    pub include_system_schemas: bool,
    /// Restrict introspection to these schemas.
    pub schemas: Option<Vec<String>>,
}

impl IntrospectOptions {
    pub fn with_schemas(schemas: Vec<String>) -> Self {
        Self {
            schemas: if schemas.is_empty() { None } else { Some(schemas) },
            ..Self::default()
        }
    }
}
