//! Scheduler configuration document and loaders for the YAML inputs of the binary.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::core::pod::DEFAULT_SCHEDULER_NAME;
use crate::plugins::prefer_node_label;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubeSchedulerConfiguration {
    // Profiles are scheduling profiles the scheduler supports. Pods choose a profile by
    // setting its scheduler name in their spec. Pods that don't specify any scheduler name
    // are scheduled with the "default-scheduler" profile, if present here.
    #[serde(default)]
    pub profiles: Vec<KubeSchedulerProfile>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubeSchedulerProfile {
    #[serde(default = "default_scheduler_name")]
    pub scheduler_name: String,
    #[serde(default)]
    pub plugins: Plugins,
    #[serde(default)]
    pub plugin_config: Vec<PluginConfig>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Plugins {
    // Each extension point is a list of enabled plugins which must be present in the registry.
    #[serde(default)]
    pub filter: PluginSet,
    #[serde(default)]
    pub score: PluginSet,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct PluginSet {
    #[serde(default)]
    pub enabled: Vec<Plugin>,
}

// Plugin specifies a plugin name and its weight when applicable.
#[derive(Debug, Deserialize, PartialEq)]
pub struct Plugin {
    pub name: String,
    // Weight is used only for Score plugins, 1 when not set.
    #[serde(default)]
    pub weight: Option<i64>,
}

/// Args for one plugin. Left undecoded: only the plugin knows their schema.
#[derive(Debug, Deserialize, PartialEq)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default)]
    pub args: Option<Value>,
}

fn default_scheduler_name() -> String {
    DEFAULT_SCHEDULER_NAME.to_string()
}

impl KubeSchedulerProfile {
    pub fn plugin_args(&self, plugin_name: &str) -> Option<&Value> {
        self.plugin_config
            .iter()
            .find(|config| config.name == plugin_name)
            .and_then(|config| config.args.as_ref())
    }
}

/// Single default profile which runs PreferNodeLabel at both filter and score with default args.
pub fn default_kube_scheduler_config() -> KubeSchedulerConfiguration {
    KubeSchedulerConfiguration {
        profiles: vec![KubeSchedulerProfile {
            scheduler_name: default_scheduler_name(),
            plugins: Plugins {
                filter: PluginSet {
                    enabled: vec![Plugin {
                        name: prefer_node_label::NAME.to_string(),
                        weight: None,
                    }],
                },
                score: PluginSet {
                    enabled: vec![Plugin {
                        name: prefer_node_label::NAME.to_string(),
                        weight: Some(1),
                    }],
                },
            },
            plugin_config: vec![],
        }],
    }
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_with_plugin_args() {
        let config: KubeSchedulerConfiguration = serde_yaml::from_str(
            r#"
        profiles:
        - schedulerName: zone-scheduler
          plugins:
            score:
              enabled:
              - name: PreferNodeLabel
                weight: 3
          pluginConfig:
          - name: PreferNodeLabel
            args:
              labelKey: zone
              labelValue: us-east
        "#,
        )
        .unwrap();

        let profile = &config.profiles[0];
        assert_eq!(profile.scheduler_name, "zone-scheduler");
        assert!(profile.plugins.filter.enabled.is_empty());
        assert_eq!(profile.plugins.score.enabled[0].weight, Some(3));
        assert_eq!(
            profile.plugin_args("PreferNodeLabel"),
            Some(&serde_json::json!({"labelKey": "zone", "labelValue": "us-east"}))
        );
        assert_eq!(profile.plugin_args("Other"), None);
    }

    #[test]
    fn test_profile_defaults() {
        let config: KubeSchedulerConfiguration =
            serde_yaml::from_str("profiles:\n- {}\n").unwrap();
        assert_eq!(config.profiles[0].scheduler_name, DEFAULT_SCHEDULER_NAME);
        assert_eq!(config.profiles[0].plugins, Plugins::default());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_yaml::<KubeSchedulerConfiguration>(Path::new("/nonexistent/config.yaml"))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
