//! The site configuration file.

use std::{fs, io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Settings read from the site configuration file at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// The name displayed in page titles and headings.
    pub site_name: String,
    /// Comma-separated category names suggested when adding a transaction.
    pub categories: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Förenklat bokslut".to_owned(),
            categories: "Bank,Hyra,Inköp,Försäljning,Lön,Övrigt".to_owned(),
        }
    }
}

impl SiteConfig {
    /// Read the config from `path`, writing the default config there first if
    /// the file does not exist.
    ///
    /// # Errors
    /// Returns [Error::ConfigError] if the file cannot be read, parsed or created.
    pub fn load_or_create(path: &Path) -> Result<Self, Error> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|error| {
                Error::ConfigError(format!("could not parse {}: {error}", path.display()))
            }),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "Config file {} not found, creating default config.",
                    path.display()
                );

                let config = SiteConfig::default();
                config.save(path)?;

                Ok(config)
            }
            Err(error) => Err(Error::ConfigError(format!(
                "could not read {}: {error}",
                path.display()
            ))),
        }
    }

    fn save(&self, path: &Path) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|error| Error::ConfigError(error.to_string()))?;

        fs::write(path, text).map_err(|error| {
            Error::ConfigError(format!("could not write {}: {error}", path.display()))
        })?;

        tracing::debug!("Wrote default config file to {}", path.display());

        Ok(())
    }

    /// The configured category names, trimmed and without empty entries.
    pub fn predefined_categories(&self) -> Vec<String> {
        self.categories
            .split(',')
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::{Error, config::SiteConfig};

    #[test]
    fn creates_default_config_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = SiteConfig::load_or_create(&path).unwrap();

        assert_eq!(config, SiteConfig::default());
        assert!(path.is_file());
        assert_eq!(SiteConfig::load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn reads_existing_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"site_name": "Min bokföring", "categories": "Mat, Resor"}"#,
        )
        .unwrap();

        let config = SiteConfig::load_or_create(&path).unwrap();

        assert_eq!(config.site_name, "Min bokföring");
        assert_eq!(config.predefined_categories(), vec!["Mat", "Resor"]);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "site_name: yaml?").unwrap();

        let result = SiteConfig::load_or_create(&path);

        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn predefined_categories_skips_empty_entries() {
        let config = SiteConfig {
            site_name: "Test".to_owned(),
            categories: " Hyra,, Lön ,".to_owned(),
        };

        assert_eq!(config.predefined_categories(), vec!["Hyra", "Lön"]);
    }
}
