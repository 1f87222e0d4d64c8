//! SDL to `GroupSpec` conversion for the create-deployment message.
//!
//! One `GroupSpec` per placement. Services in a placement become that
//! group's `ResourceUnit`s, in service-name order, which is also the order
//! the manifest uses; the provider matches the two by position.

use super::units::{cpu_millis, dec_amount, size_bytes};
use super::{ResourceSpec, Sdl, Service};
use crate::error::DeployError;
use crate::gen::akash::base::attributes::v1::{Attribute, PlacementRequirements, SignedBy};
use crate::gen::akash::base::resources::v1beta4::{
    Cpu, Endpoint, EndpointKind, Gpu, Memory, ResourceValue, Resources, Storage,
};
use crate::gen::akash::deployment::v1beta4::{GroupSpec, ResourceUnit};
use crate::gen::cosmos::base::v1beta1::DecCoin;

impl Sdl {
    /// Build the deployment groups, sorted by placement name.
    pub fn deployment_groups(&self) -> Result<Vec<GroupSpec>, DeployError> {
        let mut groups = Vec::new();

        for (placement_name, services) in self.placements() {
            let placement = self.profiles.placement.get(placement_name).ok_or_else(|| {
                DeployError::Sdl(format!("undefined placement '{}'", placement_name))
            })?;

            let signed_by = placement.signed_by.clone().unwrap_or_default();
            let requirements = PlacementRequirements {
                signed_by: Some(SignedBy {
                    all_of: signed_by.all_of,
                    any_of: signed_by.any_of,
                }),
                attributes: placement
                    .attributes
                    .iter()
                    .map(|(k, v)| Attribute {
                        key: k.clone(),
                        value: v.clone(),
                    })
                    .collect(),
            };

            let mut resources = Vec::with_capacity(services.len());
            for (idx, (service_name, svc)) in services.iter().enumerate() {
                let service = self.services.get(*service_name).ok_or_else(|| {
                    DeployError::Sdl(format!("undefined service '{}'", service_name))
                })?;
                let compute = self.compute(&svc.profile)?;
                let price = placement.pricing.get(&svc.profile).ok_or_else(|| {
                    DeployError::Sdl(format!(
                        "placement '{}' has no price for profile '{}'",
                        placement_name, svc.profile
                    ))
                })?;

                resources.push(ResourceUnit {
                    resource: Some(build_resources(
                        idx as u32 + 1,
                        &compute.resources,
                        service,
                    )?),
                    count: svc.count,
                    price: Some(DecCoin {
                        denom: price.denom.clone(),
                        amount: dec_amount(&price.amount)?,
                    }),
                });
            }

            tracing::debug!(
                group = placement_name,
                units = resources.len(),
                "built group spec"
            );

            groups.push(GroupSpec {
                name: placement_name.to_string(),
                requirements: Some(requirements),
                resources,
            });
        }

        Ok(groups)
    }
}

fn resource_value(v: u64) -> Option<ResourceValue> {
    Some(ResourceValue {
        val: v.to_string().into_bytes(),
    })
}

/// Resources for one service; `id` is its 1-based position in the group.
pub(crate) fn build_resources(
    id: u32,
    spec: &ResourceSpec,
    service: &Service,
) -> Result<Resources, DeployError> {
    let cpu = Cpu {
        units: resource_value(cpu_millis(&spec.cpu.units)?),
        attributes: Vec::new(),
    };

    let memory = Memory {
        quantity: resource_value(size_bytes(&spec.memory.size)?),
        attributes: Vec::new(),
    };

    let storage = spec
        .storage_volumes()
        .iter()
        .enumerate()
        .map(|(idx, vol)| {
            Ok(Storage {
                name: vol.name_or_default(idx),
                quantity: resource_value(size_bytes(&vol.size)?),
                attributes: vol
                    .attribute_pairs()
                    .into_iter()
                    .map(|(key, value)| Attribute { key, value })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, DeployError>>()?;

    let gpu = match &spec.gpu {
        Some(g) => Gpu {
            units: resource_value(g.units as u64),
            attributes: g
                .attribute_keys()
                .into_iter()
                .map(|key| Attribute {
                    key,
                    value: "true".to_string(),
                })
                .collect(),
        },
        None => Gpu {
            units: resource_value(0),
            attributes: Vec::new(),
        },
    };

    Ok(Resources {
        id,
        cpu: Some(cpu),
        memory: Some(memory),
        storage,
        gpu: Some(gpu),
        endpoints: endpoints(service),
    })
}

/// Endpoints a service needs from the provider. Global port 80 rides the
/// shared HTTP ingress; any other global port needs a random port.
fn endpoints(service: &Service) -> Vec<Endpoint> {
    let mut out: Vec<Endpoint> = service
        .expose
        .iter()
        .filter(|e| e.is_global())
        .map(|e| {
            let external = if e.external_port() == 0 {
                e.port
            } else {
                e.external_port()
            };
            let kind = if external == 80 {
                EndpointKind::SharedHttp
            } else {
                EndpointKind::RandomPort
            };
            Endpoint {
                kind: kind as i32,
                sequence_number: 0,
            }
        })
        .collect();
    out.sort_by_key(|e| e.kind);
    out
}
