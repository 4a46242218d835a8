use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_values(
            component,
            env::var("SERVICE_NAME").ok(),
            env::var("STAGE").ok(),
        )
    }

    fn from_values(component: &str, service_name: Option<String>, stage: Option<String>) -> Self {
        let component = component.trim().to_string();

        let service_name = non_empty(service_name).unwrap_or_else(|| component.clone());
        let environment = non_empty(stage).unwrap_or_else(|| "unknown".to_string());

        Self {
            service_name,
            environment,
            component,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_component_and_unknown_stage() {
        let config = ObservabilityConfig::from_values(" billing-worker ", Some("  ".to_string()), None);

        assert_eq!(config.service_name, "billing-worker");
        assert_eq!(config.environment, "unknown");
        assert_eq!(config.component, "billing-worker");
    }

    #[test]
    fn uses_explicit_service_name_and_stage() {
        let config = ObservabilityConfig::from_values(
            "seed",
            Some("subscription-tracker".to_string()),
            Some("staging".to_string()),
        );

        assert_eq!(config.service_name, "subscription-tracker");
        assert_eq!(config.environment, "staging");
    }
}
