use crate::{error::RpgsError, parser::compile_stats};
use rpgs_schema::SchemaRegistry;

/// Compiles one schema source per resource kind into a [`SchemaRegistry`].
///
/// The resource kind is supplied by the caller (normally the name of the
/// directory holding `stats.rpgs`). A source that cannot be decoded is left
/// out of the registry and returned in the failure list; the other kinds are
/// still compiled.
pub fn build_registry<I, K, S>(sources: I) -> (SchemaRegistry, Vec<RpgsError>)
where
    I: IntoIterator<Item = (K, S)>,
    K: Into<String>,
    S: AsRef<[u8]>,
{
    let mut compiled = Vec::new();
    let mut failures = Vec::new();

    for (kind, source) in sources {
        let kind = kind.into();
        match compile_stats(&kind, source.as_ref()) {
            Ok(schema) => {
                tracing::debug!(resource_kind = %kind, stats = schema.len(), "compiled schema");
                compiled.push((kind, schema));
            }
            Err(e) => {
                tracing::warn!(resource_kind = %kind, error = %e, "skipping unreadable schema");
                failures.push(e);
            }
        }
    }

    (compiled.into_iter().collect(), failures)
}
