use std::collections::HashMap;
use std::sync::LazyLock;

use frameql_error::{DbError, Result};

use crate::arrays::scalar::ScalarValue;
use crate::backend::Backend;

/// Configuration for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub application_name: String,
    /// Backend used for relations that don't request one.
    pub default_backend: Backend,
    /// If CREATE TABLE ... AS materializes the query result.
    pub persist_create_table_as: bool,
    /// Number of partitions to split raw data into.
    pub partitions: u64,
}

pub const DEFAULT_PARTITIONS: u64 = 4;

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            application_name: String::new(),
            default_backend: Backend::Cpu,
            persist_create_table_as: true,
            partitions: DEFAULT_PARTITIONS,
        }
    }
}

impl SessionConfig {
    pub fn set_from_scalar(&mut self, name: &str, value: ScalarValue) -> Result<()> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| DbError::new(format!("Missing setting for '{name}'")))?;

        (func.set)(value, self)
    }

    pub fn get_as_scalar(&self, name: &str) -> Result<ScalarValue> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| DbError::new(format!("Missing setting for '{name}'")))?;

        let val = (func.get)(self);
        Ok(val)
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        let def_conf = Self::default();

        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| DbError::new(format!("Missing setting for '{name}'")))?;

        let scalar = (func.get)(&def_conf);
        (func.set)(scalar, self)
    }

    /// Names and descriptions of all settings, sorted by name.
    pub fn describe_settings() -> Vec<(&'static str, &'static str)> {
        let mut settings: Vec<_> = GET_SET_FUNCTIONS
            .iter()
            .map(|(name, func)| (*name, func.description))
            .collect();
        settings.sort();
        settings
    }
}

struct SettingFunctions {
    description: &'static str,
    set: fn(scalar: ScalarValue, conf: &mut SessionConfig) -> Result<()>,
    get: fn(conf: &SessionConfig) -> ScalarValue,
}

impl SettingFunctions {
    const fn new<S: SessionSetting>() -> Self {
        SettingFunctions {
            description: S::DESCRIPTION,
            set: S::set_from_scalar as _,
            get: S::get_as_scalar as _,
        }
    }
}

fn insert_setting<S: SessionSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<ApplicationName>(&mut map);
    insert_setting::<DefaultBackend>(&mut map);
    insert_setting::<PersistCreateTableAs>(&mut map);
    insert_setting::<Partitions>(&mut map);

    map
});

pub trait SessionSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_scalar(scalar: ScalarValue, conf: &mut SessionConfig) -> Result<()>;
    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue;
}

pub struct ApplicationName;

impl SessionSetting for ApplicationName {
    const NAME: &'static str = "application_name";
    const DESCRIPTION: &'static str = "Name of the application using this session";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut SessionConfig) -> Result<()> {
        conf.application_name = scalar.try_as_str()?.to_string();
        Ok(())
    }

    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue {
        conf.application_name.clone().into()
    }
}

pub struct DefaultBackend;

impl SessionSetting for DefaultBackend {
    const NAME: &'static str = "default_backend";
    const DESCRIPTION: &'static str =
        "Backend for relations that don't specify one ('cpu' or 'accelerated')";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut SessionConfig) -> Result<()> {
        let name = scalar.try_as_str()?;
        conf.default_backend = Backend::from_name(name)
            .ok_or_else(|| DbError::new(format!("Unknown backend '{name}'")))?;
        Ok(())
    }

    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue {
        conf.default_backend.as_str().into()
    }
}

pub struct PersistCreateTableAs;

impl SessionSetting for PersistCreateTableAs {
    const NAME: &'static str = "persist_create_table_as";
    const DESCRIPTION: &'static str =
        "If CREATE TABLE ... AS materializes the query result when created";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut SessionConfig) -> Result<()> {
        conf.persist_create_table_as = scalar.try_as_bool()?;
        Ok(())
    }

    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue {
        conf.persist_create_table_as.into()
    }
}

const MIN_PARTITION_COUNT: i64 = 1;
const MAX_PARTITION_COUNT: i64 = 512;

pub struct Partitions;

impl SessionSetting for Partitions {
    const NAME: &'static str = "partitions";
    const DESCRIPTION: &'static str = "Number of partitions to split raw data into";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut SessionConfig) -> Result<()> {
        let val = scalar.try_as_i64()?;

        if val < MIN_PARTITION_COUNT {
            return Err(DbError::new(format!(
                "Partition count cannot be less than {MIN_PARTITION_COUNT}"
            )));
        }

        if val > MAX_PARTITION_COUNT {
            return Err(DbError::new(format!(
                "Partition count cannot be greater than {MAX_PARTITION_COUNT}"
            )));
        }

        conf.partitions = val as u64;
        Ok(())
    }

    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue {
        ScalarValue::Int64(conf.partitions as i64)
    }
}
