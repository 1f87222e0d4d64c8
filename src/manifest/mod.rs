//! Manifest construction from SDL.
//!
//! The manifest is what the winning provider runs. Its hash goes on-chain
//! with the deployment (see [`version`]), so serialization must match the
//! provider's JSON byte for byte:
//! - resource quantities as decimal strings
//! - empty command/args/env as `null`, not `[]`
//! - camelCase field names where the provider uses them
//! - services sorted by name

pub mod version;

use crate::error::DeployError;
use crate::sdl::units::{cpu_millis, size_bytes};
use crate::sdl::{Expose, Sdl, Service};
use serde::{Deserialize, Serialize};

pub use version::{manifest_version, to_canonical_json};

/// Full manifest: one group per placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub groups: Vec<ManifestGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestGroup {
    pub name: String,
    pub services: Vec<ManifestService>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestService {
    pub name: String,
    pub image: String,
    pub command: Option<Vec<String>>,
    pub args: Option<Vec<String>>,
    pub env: Option<Vec<String>>,
    pub resources: ManifestResources,
    pub count: u32,
    pub expose: Vec<ManifestServiceExpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<ManifestServiceParams>,
    pub credentials: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestServiceExpose {
    pub port: u32,
    #[serde(rename = "externalPort")]
    pub external_port: u32,
    pub proto: String,
    pub service: String,
    pub global: bool,
    pub hosts: Option<Vec<String>>,
    #[serde(rename = "httpOptions")]
    pub http_options: ManifestHttpOptions,
    pub ip: String,
    #[serde(rename = "endpointSequenceNumber")]
    pub endpoint_sequence_number: u32,
}

/// Provider defaults for HTTP ingress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestHttpOptions {
    #[serde(rename = "maxBodySize")]
    pub max_body_size: u32,
    #[serde(rename = "readTimeout")]
    pub read_timeout: u32,
    #[serde(rename = "sendTimeout")]
    pub send_timeout: u32,
    #[serde(rename = "nextTries")]
    pub next_tries: u32,
    #[serde(rename = "nextTimeout")]
    pub next_timeout: u32,
    #[serde(rename = "nextCases")]
    pub next_cases: Vec<String>,
}

impl Default for ManifestHttpOptions {
    fn default() -> Self {
        Self {
            max_body_size: 1_048_576,
            read_timeout: 60_000,
            send_timeout: 60_000,
            next_tries: 3,
            next_timeout: 0,
            next_cases: vec!["error".to_string(), "timeout".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestResources {
    pub id: u32,
    pub cpu: ManifestQuantity,
    pub memory: ManifestSize,
    pub storage: Vec<ManifestStorage>,
    pub gpu: ManifestQuantity,
    pub endpoints: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestQuantity {
    pub units: ManifestValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ManifestAttribute>,
}

/// Memory and storage carry their quantity under `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSize {
    pub size: ManifestValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ManifestAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestStorage {
    pub name: String,
    pub size: ManifestValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ManifestAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestValue {
    pub val: String,
}

impl From<u64> for ManifestValue {
    fn from(v: u64) -> Self {
        Self { val: v.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestAttribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestServiceParams {
    pub storage: Vec<ManifestStorageParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestStorageParams {
    pub name: String,
    pub mount: String,
    #[serde(rename = "readOnly")]
    pub read_only: bool,
}

impl Manifest {
    /// Render the manifest for every placement in the SDL.
    pub fn from_sdl(sdl: &Sdl) -> Result<Self, DeployError> {
        let mut groups = Vec::new();

        for (placement_name, services) in sdl.placements() {
            let mut out = Vec::with_capacity(services.len());
            for (idx, (service_name, svc)) in services.iter().enumerate() {
                let service = sdl.services.get(*service_name).ok_or_else(|| {
                    DeployError::Manifest(format!("undefined service '{}'", service_name))
                })?;
                let compute = sdl
                    .compute(&svc.profile)
                    .map_err(|e| DeployError::Manifest(e.to_string()))?;

                out.push(ManifestService {
                    name: service_name.to_string(),
                    image: service.image.clone(),
                    command: non_empty(&service.command),
                    args: non_empty(&service.args),
                    env: non_empty(&service.env),
                    resources: manifest_resources(idx as u32 + 1, &compute.resources)?,
                    count: svc.count,
                    expose: service.expose.iter().map(manifest_expose).collect(),
                    params: storage_params(service),
                    credentials: None,
                });
            }

            groups.push(ManifestGroup {
                name: placement_name.to_string(),
                services: out,
            });
        }

        if groups.is_empty() {
            return Err(DeployError::Manifest("SDL deploys no services".into()));
        }
        Ok(Self { groups })
    }

    /// Total service instances across all groups.
    pub fn service_count(&self) -> u32 {
        self.groups
            .iter()
            .flat_map(|g| g.services.iter())
            .map(|s| s.count)
            .sum()
    }
}

fn non_empty(v: &Option<Vec<String>>) -> Option<Vec<String>> {
    v.clone().filter(|v| !v.is_empty())
}

fn manifest_resources(
    id: u32,
    spec: &crate::sdl::ResourceSpec,
) -> Result<ManifestResources, DeployError> {
    let map_sdl = |e: DeployError| DeployError::Manifest(e.to_string());

    let storage = spec
        .storage_volumes()
        .iter()
        .enumerate()
        .map(|(idx, vol)| {
            Ok(ManifestStorage {
                name: vol.name_or_default(idx),
                size: size_bytes(&vol.size).map_err(map_sdl)?.into(),
                attributes: vol
                    .attribute_pairs()
                    .into_iter()
                    .map(|(key, value)| ManifestAttribute { key, value })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, DeployError>>()?;

    let gpu = match &spec.gpu {
        Some(g) => ManifestQuantity {
            units: (g.units as u64).into(),
            attributes: g
                .attribute_keys()
                .into_iter()
                .map(|key| ManifestAttribute {
                    key,
                    value: "true".to_string(),
                })
                .collect(),
        },
        None => ManifestQuantity {
            units: 0u64.into(),
            attributes: Vec::new(),
        },
    };

    Ok(ManifestResources {
        id,
        cpu: ManifestQuantity {
            units: cpu_millis(&spec.cpu.units).map_err(map_sdl)?.into(),
            attributes: Vec::new(),
        },
        memory: ManifestSize {
            size: size_bytes(&spec.memory.size).map_err(map_sdl)?.into(),
            attributes: Vec::new(),
        },
        storage,
        gpu,
        endpoints: None,
    })
}

fn manifest_expose(e: &Expose) -> ManifestServiceExpose {
    ManifestServiceExpose {
        port: e.port,
        external_port: e.external_port(),
        proto: e.proto(),
        service: e
            .to
            .iter()
            .find_map(|t| t.service.clone())
            .unwrap_or_default(),
        global: e.is_global(),
        hosts: if e.accept.is_empty() {
            None
        } else {
            Some(e.accept.clone())
        },
        http_options: ManifestHttpOptions::default(),
        ip: String::new(),
        endpoint_sequence_number: 0,
    }
}

fn storage_params(service: &Service) -> Option<ManifestServiceParams> {
    let params = service.params.as_ref()?;
    if params.storage.is_empty() {
        return None;
    }
    Some(ManifestServiceParams {
        storage: params
            .storage
            .iter()
            .map(|(name, m)| ManifestStorageParams {
                name: name.clone(),
                mount: m.mount.clone(),
                read_only: m.read_only,
            })
            .collect(),
    })
}
