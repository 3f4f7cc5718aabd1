use serde::{Deserialize, Serialize};

use super::Config;

/// How test cases are labelled by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodDisplay {
    /// `Class.Method`
    #[default]
    ClassAndMethod,
    /// `Method`
    Method,
}

/// Settings read by the engine and handed to every builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOptions {
    pub method_display: MethodDisplay,
    /// Whether data-driven builders should emit one case per data row
    pub pre_enumerate_theories: bool,
    /// Whether builder construction failures reach the diagnostic sink
    pub diagnostic_messages: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            method_display: MethodDisplay::ClassAndMethod,
            pre_enumerate_theories: true,
            diagnostic_messages: true,
        }
    }
}

impl DiscoveryOptions {
    /// Defaults overlaid with whatever the configuration file sets
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            method_display: config.method_display.unwrap_or(defaults.method_display),
            pre_enumerate_theories: config
                .pre_enumerate_theories
                .unwrap_or(defaults.pre_enumerate_theories),
            diagnostic_messages: config
                .diagnostic_messages
                .unwrap_or(defaults.diagnostic_messages),
        }
    }

    pub fn with_method_display(mut self, method_display: MethodDisplay) -> Self {
        self.method_display = method_display;
        self
    }

    pub fn with_pre_enumerate_theories(mut self, enabled: bool) -> Self {
        self.pre_enumerate_theories = enabled;
        self
    }
}
