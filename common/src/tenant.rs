//! Tenant definitions that seed a generator run.
//!
//! A tenant is a simulated workload owner: a name, how many workload units to
//! submit on its behalf and the resource envelope every one of those units
//! carries. The catalog can be loaded from YAML (JSON is valid YAML) or taken
//! from the builtin defaults.
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Key of the cpu entry in a resource envelope.
pub const RESOURCE_CPU: &str = "cpu";
/// Key of the memory entry in a resource envelope.
pub const RESOURCE_MEMORY: &str = "memory";
/// Key of the duration entry in a resource envelope.
pub const RESOURCE_DURATION: &str = "duration";

/// Every resource envelope carries exactly these keys.
pub const RESOURCE_KEYS: [&str; 3] = [RESOURCE_CPU, RESOURCE_MEMORY, RESOURCE_DURATION];

/// Replica count of each builtin tenant.
pub const DEFAULT_REPLICAS: u64 = 50;

/// Errors produced while loading or validating a tenant catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read tenant file {}: {source}", path.display())]
    Io {
        /// Path of the catalog file
        path: PathBuf,
        /// Underlying io error
        source: std::io::Error,
    },
    /// The catalog is not valid YAML or does not match the expected shape.
    #[error("failed to parse tenant catalog: {source}")]
    Parse {
        /// Underlying deserialization error
        #[from]
        source: serde_yaml::Error,
    },
    /// A tenant definition breaks a catalog invariant.
    #[error("invalid tenant {tenant:?}: {reason}")]
    InvalidTenant {
        /// Name of the offending tenant
        tenant: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Definition of a single simulated tenant.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    /// Tenant name, used as the owner identity of every workload unit.
    /// Must be a valid DNS label fragment as it is embedded in pod names.
    pub name: String,
    /// Number of workload units to submit for this tenant.
    pub replicas: u64,
    /// Scheduler facing hints (millicores, bytes, seconds).
    /// Omitted hints are derived from `resources`.
    #[serde(default)]
    pub resource_hints: BTreeMap<String, String>,
    /// Container runtime facing quantities, e.g. "2" cores, "8G" memory, "50" seconds.
    pub resources: BTreeMap<String, String>,
}

impl TenantSpec {
    /// Construct a tenant whose hints and values are both given explicitly.
    pub fn new(
        name: impl Into<String>,
        replicas: u64,
        hints: [(&str, &str); 3],
        values: [(&str, &str); 3],
    ) -> Self {
        let to_map = |pairs: [(&str, &str); 3]| {
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            name: name.into(),
            replicas,
            resource_hints: to_map(hints),
            resources: to_map(values),
        }
    }

    /// Raw runtime quantity for a resource key.
    pub fn resource(&self, key: &str) -> Option<&str> {
        self.resources.get(key).map(String::as_str)
    }

    /// Raw scheduler hint for a resource key, if one was provided.
    pub fn hint(&self, key: &str) -> Option<&str> {
        self.resource_hints.get(key).map(String::as_str)
    }

    fn invalid(&self, reason: impl Into<String>) -> CatalogError {
        CatalogError::InvalidTenant {
            tenant: self.name.clone(),
            reason: reason.into(),
        }
    }

    /// Check the invariants of a single tenant definition.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(self.invalid(
                "name may only contain lowercase alphanumeric characters and '-'",
            ));
        }

        let expected: BTreeSet<&str> = RESOURCE_KEYS.into_iter().collect();
        let values: BTreeSet<&str> = self.resources.keys().map(String::as_str).collect();
        if values != expected {
            return Err(self.invalid(format!(
                "resources must contain exactly {:?}, found {:?}",
                expected, values
            )));
        }
        if let Some(unknown) = self
            .resource_hints
            .keys()
            .find(|key| !expected.contains(key.as_str()))
        {
            return Err(self.invalid(format!("unknown resource hint {unknown:?}")));
        }
        Ok(())
    }
}

/// The list of tenants submitted during a run, in submission order.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
pub struct TenantCatalog {
    /// Tenants in the order their workload units are submitted.
    pub tenants: Vec<TenantSpec>,
}

impl TenantCatalog {
    /// The builtin tenants.
    pub fn builtin() -> Self {
        Self {
            tenants: vec![
                TenantSpec::new(
                    "user1",
                    DEFAULT_REPLICAS,
                    [("cpu", "2000"), ("memory", "8000000000"), ("duration", "50")],
                    [("cpu", "2"), ("memory", "8G"), ("duration", "50")],
                ),
                TenantSpec::new(
                    "user2",
                    DEFAULT_REPLICAS,
                    [("cpu", "1000"), ("memory", "4000000000"), ("duration", "200")],
                    [("cpu", "1"), ("memory", "4G"), ("duration", "200")],
                ),
                TenantSpec::new(
                    "user3",
                    DEFAULT_REPLICAS,
                    [("cpu", "8000"), ("memory", "2000000000"), ("duration", "50")],
                    [("cpu", "8"), ("memory", "2G"), ("duration", "50")],
                ),
                TenantSpec::new(
                    "user4",
                    DEFAULT_REPLICAS,
                    [("cpu", "4000"), ("memory", "1000000000"), ("duration", "200")],
                    [("cpu", "4"), ("memory", "1G"), ("duration", "200")],
                ),
            ],
        }
    }

    /// Parse and validate a catalog from YAML or JSON text.
    pub fn from_yaml_str(data: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_yaml::from_str(data)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read, parse and validate a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_yaml_str(&data)
    }

    /// Override the replica count of every tenant.
    pub fn with_replicas(mut self, replicas: u64) -> Self {
        self.tenants
            .iter_mut()
            .for_each(|tenant| tenant.replicas = replicas);
        self
    }

    /// Check every tenant and that tenant names are unique.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for tenant in &self.tenants {
            tenant.validate()?;
            if !seen.insert(tenant.name.as_str()) {
                return Err(tenant.invalid("duplicate tenant name"));
            }
        }
        Ok(())
    }

    /// Total number of workload units the catalog expands to.
    pub fn total_units(&self) -> u64 {
        self.tenants.iter().map(|tenant| tenant.replicas).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use expect_test::expect;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = TenantCatalog::builtin();
        catalog.validate().unwrap();
        let names: Vec<_> = catalog.tenants.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["user1", "user2", "user3", "user4"]);
        assert_eq!(catalog.total_units(), 200);
        assert_eq!(catalog.tenants[0].resource(RESOURCE_MEMORY), Some("8G"));
        assert_eq!(catalog.tenants[0].hint(RESOURCE_CPU), Some("2000"));
    }

    #[test]
    fn load_from_yaml() {
        let catalog = TenantCatalog::from_yaml_str(
            r#"
tenants:
  - name: batch
    replicas: 3
    resourceHints:
      duration: "30"
    resources:
      cpu: 500m
      memory: 1Gi
      duration: "30"
"#,
        )
        .unwrap();
        expect![[r#"
            TenantCatalog {
                tenants: [
                    TenantSpec {
                        name: "batch",
                        replicas: 3,
                        resource_hints: {
                            "duration": "30",
                        },
                        resources: {
                            "cpu": "500m",
                            "duration": "30",
                            "memory": "1Gi",
                        },
                    },
                ],
            }
        "#]]
        .assert_debug_eq(&catalog);
    }

    #[test]
    fn replicas_override() {
        let catalog = TenantCatalog::builtin().with_replicas(2);
        assert!(catalog.tenants.iter().all(|t| t.replicas == 2));
        assert_eq!(catalog.total_units(), 8);
    }

    #[test]
    fn missing_resource_key() {
        let err = TenantCatalog::from_yaml_str(
            r#"
tenants:
  - name: user1
    replicas: 1
    resources:
      cpu: "1"
      memory: 1G
"#,
        )
        .unwrap_err();
        expect![[r#"invalid tenant "user1": resources must contain exactly {"cpu", "duration", "memory"}, found {"cpu", "memory"}"#]]
            .assert_eq(&err.to_string());
    }

    #[test]
    fn unknown_hint_key() {
        let mut tenant = TenantCatalog::builtin().tenants.remove(0);
        tenant
            .resource_hints
            .insert("gpu".to_owned(), "1".to_owned());
        let err = tenant.validate().unwrap_err();
        expect![[r#"invalid tenant "user1": unknown resource hint "gpu""#]]
            .assert_eq(&err.to_string());
    }

    #[test]
    fn duplicate_names() {
        let mut catalog = TenantCatalog::builtin();
        catalog.tenants[1].name = "user1".to_owned();
        let err = catalog.validate().unwrap_err();
        expect![[r#"invalid tenant "user1": duplicate tenant name"#]].assert_eq(&err.to_string());
    }

    #[test]
    fn name_must_fit_pod_name() {
        let mut catalog = TenantCatalog::builtin();
        catalog.tenants[0].name = "User_1".to_owned();
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidTenant { tenant, .. }) if tenant == "User_1"
        ));
    }

    #[test]
    fn malformed_yaml() {
        assert!(matches!(
            TenantCatalog::from_yaml_str("tenants: 12"),
            Err(CatalogError::Parse { .. })
        ));
    }
}
