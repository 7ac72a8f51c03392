use std::collections::HashMap;

use frameql_error::{DbError, Result};
use frameql_parser::ast::{OptionValue, WithOption};

use crate::arrays::scalar::ScalarValue;
use crate::backend::Backend;
use crate::source::registry::FormatRegistry;
use crate::source::options::{option_as_bool, option_into_string};
use crate::source::{ReaderOptions, SourceDescriptor};

/// Format name for datasets looked up in the publish registry.
pub const MEMORY_FORMAT: &str = "memory";

/// Options from a `WITH (...)` clause after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOptions {
    pub source: SourceDescriptor,
    /// Explicit `persist` option.
    pub persist: Option<bool>,
    /// Explicit `gpu` or `backend` option.
    pub backend: Option<Backend>,
}

impl CreateOptions {
    /// Validate WITH options against the registered formats.
    ///
    /// Only checks configuration. Nothing is read.
    pub fn try_from_with_options(
        options: &[WithOption],
        formats: &FormatRegistry,
    ) -> Result<Self> {
        let mut opts = collect_options(options)?;

        let persist = opts
            .remove("persist")
            .map(|v| option_as_bool("persist", &v))
            .transpose()?;

        let gpu = opts
            .remove("gpu")
            .map(|v| option_as_bool("gpu", &v))
            .transpose()?;

        let backend = match (gpu, opts.remove("backend")) {
            (Some(_), Some(_)) => {
                return Err(DbError::invalid_option(
                    "backend",
                    "cannot be combined with 'gpu'",
                ));
            }
            (Some(true), None) => Some(Backend::Accelerated),
            (Some(false), None) => Some(Backend::Cpu),
            (None, Some(v)) => {
                let name = v.to_string();
                Some(Backend::from_name(&name).ok_or_else(|| {
                    DbError::invalid_option("backend", format!("unknown backend '{name}'"))
                })?)
            }
            (None, None) => None,
        };

        let location = take_string_option(&mut opts, "location")?;
        let format = match take_string_option(&mut opts, "format")? {
            Some(format) => format.to_ascii_lowercase(),
            None => {
                let location = location
                    .as_deref()
                    .ok_or_else(|| DbError::missing_option("location"))?;
                formats.infer_format(location).ok_or_else(|| {
                    DbError::missing_option("format").with_field("location", location)
                })?
            }
        };

        let source = if format == MEMORY_FORMAT {
            if let Some(key) = opts.keys().next() {
                return Err(DbError::invalid_option(
                    key,
                    "not valid for published datasets",
                ));
            }
            let name = location.ok_or_else(|| {
                DbError::missing_option("location").with_field("format", MEMORY_FORMAT)
            })?;
            SourceDescriptor::Published { name }
        } else {
            let factory = formats.resolve(&format)?;

            let mut reader_opts = ReaderOptions::new();
            for (key, val) in opts {
                reader_opts.insert(key, val);
            }

            for &key in factory.required_options() {
                let present = match key {
                    "location" => location.is_some(),
                    other => reader_opts.contains_key(other),
                };
                if !present {
                    return Err(DbError::missing_option(key).with_field("format", &format));
                }
            }
            factory.validate_options(&reader_opts)?;

            SourceDescriptor::File {
                format,
                location: location.unwrap_or_default(),
                options: reader_opts,
            }
        };

        Ok(CreateOptions {
            source,
            persist,
            backend,
        })
    }
}

/// Collect options into a map keyed by the lowercased option name.
fn collect_options(options: &[WithOption]) -> Result<HashMap<String, ScalarValue>> {
    let mut map = HashMap::with_capacity(options.len());
    for opt in options {
        let key = opt.key.value.to_ascii_lowercase();
        let val = match &opt.value {
            OptionValue::Literal(lit) => ScalarValue::try_from(lit)
                .map_err(|e| DbError::invalid_option(&key, e.message()))?,
            OptionValue::Ident(ident) => ScalarValue::Utf8(ident.value.clone()),
        };
        if map.insert(key.clone(), val).is_some() {
            return Err(DbError::invalid_option(key, "specified more than once"));
        }
    }
    Ok(map)
}

fn take_string_option(
    opts: &mut HashMap<String, ScalarValue>,
    key: &str,
) -> Result<Option<String>> {
    opts.remove(key)
        .map(|v| option_into_string(key, v))
        .transpose()
}
