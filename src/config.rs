use crate::convention::NamingConvention;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings of the host migration environment that affect construction.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MigrationConfig {
    pub target_schema: Option<TargetSchema>,
}

/// The schema model migrations are generated against.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TargetSchema {
    pub naming_convention: Option<NamingConvention>,
}

/// Source of the naming convention copied into each new catalog.
///
/// Queried on every catalog creation, so implementations may change their
/// answer between calls.
pub trait MigrationContext {
    fn naming_convention(&self) -> Option<NamingConvention>;
}

impl MigrationContext for MigrationConfig {
    fn naming_convention(&self) -> Option<NamingConvention> {
        self.target_schema
            .as_ref()
            .and_then(|target| target.naming_convention.clone())
    }
}

impl MigrationConfig {
    pub fn with_naming_convention(convention: NamingConvention) -> Self {
        Self {
            target_schema: Some(TargetSchema {
                naming_convention: Some(convention),
            }),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("schemaobj.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<MigrationConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: MigrationConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded migration config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &MigrationConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_naming_convention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemaobj.toml");
        std::fs::write(
            &path,
            r#"
[target_schema.naming_convention]
pk = "pk_%(table_name)s"
fk = "fk_%(table_name)s_%(column_0_name)s_%(referred_table_name)s"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        let convention = config.naming_convention().unwrap();
        assert_eq!(convention.pk.as_deref(), Some("pk_%(table_name)s"));
        assert!(convention.uq.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemaobj.toml");
        let config = MigrationConfig::with_naming_convention(NamingConvention {
            ix: Some("ix_%(column_0_label)s".into()),
            ..NamingConvention::default()
        });

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), Some(config));
    }

    #[test]
    fn test_config_without_target_schema() {
        assert!(MigrationConfig::default().naming_convention().is_none());
        let bare = MigrationConfig {
            target_schema: Some(TargetSchema::default()),
        };
        assert!(bare.naming_convention().is_none());
    }
}
