//! SDL (Stack Definition Language) parsing.
//!
//! An SDL file is read once into a typed model. Groups for the chain message
//! come from [`Sdl::deployment_groups`], the provider manifest from
//! [`crate::manifest::Manifest::from_sdl`]. Every map is a `BTreeMap`, so
//! iteration (and therefore group and service order) is sorted by name.

pub mod groupspec;
pub mod units;

use crate::error::DeployError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use units::Quantity;

const SUPPORTED_VERSIONS: &[&str] = &["2.0", "2.1"];

/// Parsed SDL document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sdl {
    pub version: String,
    pub services: BTreeMap<String, Service>,
    pub profiles: Profiles,
    /// service name → placement name → deployment.
    pub deployment: BTreeMap<String, BTreeMap<String, ServiceDeployment>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub image: String,
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    /// `KEY=VALUE` strings.
    #[serde(default)]
    pub env: Option<Vec<String>>,
    #[serde(default)]
    pub expose: Vec<Expose>,
    #[serde(default)]
    pub params: Option<ServiceParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expose {
    pub port: u32,
    #[serde(rename = "as", default)]
    pub as_port: Option<u32>,
    #[serde(default)]
    pub proto: Option<String>,
    #[serde(default)]
    pub to: Vec<ExposeTo>,
    #[serde(default)]
    pub accept: Vec<String>,
}

impl Expose {
    pub fn is_global(&self) -> bool {
        self.to.iter().any(|t| t.global)
    }

    /// Port as seen from outside; 0 when `as` is not given.
    pub fn external_port(&self) -> u32 {
        self.as_port.unwrap_or(0)
    }

    pub fn proto(&self) -> String {
        self.proto
            .as_deref()
            .unwrap_or("TCP")
            .to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposeTo {
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceParams {
    /// volume name → mount.
    #[serde(default)]
    pub storage: BTreeMap<String, StorageMount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageMount {
    pub mount: String,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profiles {
    pub compute: BTreeMap<String, ComputeProfile>,
    pub placement: BTreeMap<String, PlacementProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeProfile {
    pub resources: ResourceSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub cpu: CpuSpec,
    pub memory: SizeSpec,
    #[serde(default)]
    pub storage: Option<StorageSpec>,
    #[serde(default)]
    pub gpu: Option<GpuSpec>,
}

impl ResourceSpec {
    /// Storage volumes; a profile without storage gets one 1Gi `default` volume.
    pub fn storage_volumes(&self) -> Vec<StorageVolume> {
        match &self.storage {
            None => vec![StorageVolume {
                name: None,
                size: "1Gi".to_string(),
                attributes: BTreeMap::new(),
            }],
            Some(StorageSpec::One(v)) => vec![v.clone()],
            Some(StorageSpec::Many(vs)) => vs.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSpec {
    pub units: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorageSpec {
    One(StorageVolume),
    Many(Vec<StorageVolume>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageVolume {
    #[serde(default)]
    pub name: Option<String>,
    pub size: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_yaml::Value>,
}

impl StorageVolume {
    /// Volume name, defaulting by position the way providers expect.
    pub fn name_or_default(&self, idx: usize) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None if idx == 0 => "default".to_string(),
            None => format!("data{}", idx),
        }
    }

    /// Attributes as sorted `(key, value)` string pairs.
    pub fn attribute_pairs(&self) -> Vec<(String, String)> {
        self.attributes
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    _ => String::new(),
                };
                (k.clone(), value)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuSpec {
    pub units: u32,
    #[serde(default)]
    pub attributes: Option<GpuAttributes>,
}

impl GpuSpec {
    /// Composite attribute keys: `vendor/nvidia/model/h100/ram/80Gi`.
    pub fn attribute_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        let Some(attrs) = &self.attributes else {
            return keys;
        };
        for (vendor, models) in &attrs.vendor {
            match models.as_deref() {
                None | Some([]) => keys.push(format!("vendor/{}/model/*", vendor)),
                Some(models) => {
                    for m in models {
                        let mut key = format!("vendor/{}/model/{}", vendor, m.model);
                        if let Some(ram) = &m.ram {
                            key.push_str(&format!("/ram/{}", ram));
                        }
                        if let Some(iface) = &m.interface {
                            key.push_str(&format!("/interface/{}", iface));
                        }
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        keys
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuAttributes {
    #[serde(default)]
    pub vendor: BTreeMap<String, Option<Vec<GpuModel>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuModel {
    pub model: String,
    #[serde(default)]
    pub ram: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementProfile {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(rename = "signedBy", default)]
    pub signed_by: Option<SignedBySpec>,
    /// compute profile name → price per block.
    pub pricing: BTreeMap<String, Price>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignedBySpec {
    #[serde(rename = "allOf", default)]
    pub all_of: Vec<String>,
    #[serde(rename = "anyOf", default)]
    pub any_of: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(default = "default_denom")]
    pub denom: String,
    pub amount: Quantity,
}

fn default_denom() -> String {
    "uakt".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDeployment {
    pub profile: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl Sdl {
    /// Parse and validate SDL bytes.
    pub fn read(content: &[u8]) -> Result<Self, DeployError> {
        let text = std::str::from_utf8(content)
            .map_err(|e| DeployError::Sdl(format!("not valid UTF-8: {}", e)))?;
        if text.trim().is_empty() {
            return Err(DeployError::Sdl("empty SDL".into()));
        }

        let sdl: Sdl = serde_yaml::from_str(text)
            .map_err(|e| DeployError::Sdl(format!("invalid YAML: {}", e)))?;
        sdl.validate()?;
        Ok(sdl)
    }

    /// Cross-reference checks serde can't express.
    pub fn validate(&self) -> Result<(), DeployError> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(DeployError::Sdl(format!(
                "unsupported version '{}' (expected one of {:?})",
                self.version, SUPPORTED_VERSIONS
            )));
        }
        if self.services.is_empty() {
            return Err(DeployError::Sdl("no services defined".into()));
        }
        if self.deployment.is_empty() {
            return Err(DeployError::Sdl("no deployments defined".into()));
        }

        for (service_name, placements) in &self.deployment {
            let service = self.services.get(service_name).ok_or_else(|| {
                DeployError::Sdl(format!(
                    "deployment references undefined service '{}'",
                    service_name
                ))
            })?;

            if service.image.trim().is_empty() {
                return Err(DeployError::Sdl(format!(
                    "service '{}' has no image",
                    service_name
                )));
            }

            if placements.is_empty() {
                return Err(DeployError::Sdl(format!(
                    "service '{}' has no placement",
                    service_name
                )));
            }

            for (placement_name, svc) in placements {
                if svc.count == 0 {
                    return Err(DeployError::Sdl(format!(
                        "service '{}' in '{}' has count 0",
                        service_name, placement_name
                    )));
                }
                if !self.profiles.compute.contains_key(&svc.profile) {
                    return Err(DeployError::Sdl(format!(
                        "service '{}' references undefined compute profile '{}'",
                        service_name, svc.profile
                    )));
                }
                let placement = self.profiles.placement.get(placement_name).ok_or_else(|| {
                    DeployError::Sdl(format!(
                        "service '{}' references undefined placement '{}'",
                        service_name, placement_name
                    ))
                })?;
                if !placement.pricing.contains_key(&svc.profile) {
                    return Err(DeployError::Sdl(format!(
                        "placement '{}' has no price for profile '{}'",
                        placement_name, svc.profile
                    )));
                }
            }
        }

        for (service_name, service) in &self.services {
            for expose in &service.expose {
                for to in &expose.to {
                    if let Some(target) = &to.service {
                        if !self.services.contains_key(target) {
                            return Err(DeployError::Sdl(format!(
                                "service '{}' exposes to undefined service '{}'",
                                service_name, target
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Placement name → services deployed there (sorted), with their deployment entry.
    pub fn placements(&self) -> BTreeMap<&str, Vec<(&str, &ServiceDeployment)>> {
        let mut out: BTreeMap<&str, Vec<(&str, &ServiceDeployment)>> = BTreeMap::new();
        for (service_name, placements) in &self.deployment {
            for (placement_name, svc) in placements {
                out.entry(placement_name.as_str())
                    .or_default()
                    .push((service_name.as_str(), svc));
            }
        }
        out
    }

    /// Compute profile by name. Existence is checked by [`Sdl::validate`].
    pub(crate) fn compute(&self, profile: &str) -> Result<&ComputeProfile, DeployError> {
        self.profiles
            .compute
            .get(profile)
            .ok_or_else(|| DeployError::Sdl(format!("undefined compute profile '{}'", profile)))
    }
}
