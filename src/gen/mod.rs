//! Akash Network protobuf types.
//!
//! Only the slice of the Akash and Cosmos proto packages the deployer sends
//! on-chain: deployment creation/closing and everything a `GroupSpec` is made
//! of. Field tags follow the upstream `.proto` definitions, so these encode
//! byte-for-byte like the chain's own types.

/// Implements `prost::Name` so the message can be packed into an `Any`.
macro_rules! proto_name {
    ($ty:ident, $package:literal) => {
        impl ::prost::Name for $ty {
            const NAME: &'static str = stringify!($ty);
            const PACKAGE: &'static str = $package;

            fn full_name() -> ::prost::alloc::string::String {
                concat!($package, ".", stringify!($ty)).into()
            }

            fn type_url() -> ::prost::alloc::string::String {
                concat!("/", $package, ".", stringify!($ty)).into()
            }
        }
    };
}

pub mod cosmos {
    pub mod base {
        pub mod v1beta1 {
            /// Coin with an integer amount.
            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct Coin {
                #[prost(string, tag = "1")]
                pub denom: ::prost::alloc::string::String,
                #[prost(string, tag = "2")]
                pub amount: ::prost::alloc::string::String,
            }

            /// Coin with a decimal amount (18 digits of precision on-chain).
            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct DecCoin {
                #[prost(string, tag = "1")]
                pub denom: ::prost::alloc::string::String,
                #[prost(string, tag = "2")]
                pub amount: ::prost::alloc::string::String,
            }
        }
    }
}

pub mod akash {
    pub mod base {
        pub mod attributes {
            pub mod v1 {
                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Attribute {
                    #[prost(string, tag = "1")]
                    pub key: ::prost::alloc::string::String,
                    #[prost(string, tag = "2")]
                    pub value: ::prost::alloc::string::String,
                }

                /// Auditor signatures a provider must carry.
                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct SignedBy {
                    #[prost(string, repeated, tag = "1")]
                    pub all_of: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                    #[prost(string, repeated, tag = "2")]
                    pub any_of: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct PlacementRequirements {
                    #[prost(message, optional, tag = "1")]
                    pub signed_by: ::core::option::Option<SignedBy>,
                    #[prost(message, repeated, tag = "2")]
                    pub attributes: ::prost::alloc::vec::Vec<Attribute>,
                }
            }
        }

        pub mod deposit {
            pub mod v1 {
                #[derive(
                    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
                )]
                #[repr(i32)]
                pub enum Source {
                    Invalid = 0,
                    Balance = 1,
                    Grant = 2,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Deposit {
                    #[prost(message, optional, tag = "1")]
                    pub amount: ::core::option::Option<crate::gen::cosmos::base::v1beta1::Coin>,
                    #[prost(enumeration = "Source", repeated, tag = "2")]
                    pub sources: ::prost::alloc::vec::Vec<i32>,
                }
            }
        }

        pub mod resources {
            pub mod v1beta4 {
                use super::super::attributes::v1::Attribute;

                /// Resource quantity, carried as the decimal string's bytes.
                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct ResourceValue {
                    #[prost(bytes = "vec", tag = "1")]
                    pub val: ::prost::alloc::vec::Vec<u8>,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Cpu {
                    #[prost(message, optional, tag = "1")]
                    pub units: ::core::option::Option<ResourceValue>,
                    #[prost(message, repeated, tag = "2")]
                    pub attributes: ::prost::alloc::vec::Vec<Attribute>,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Memory {
                    #[prost(message, optional, tag = "1")]
                    pub quantity: ::core::option::Option<ResourceValue>,
                    #[prost(message, repeated, tag = "2")]
                    pub attributes: ::prost::alloc::vec::Vec<Attribute>,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Storage {
                    #[prost(string, tag = "1")]
                    pub name: ::prost::alloc::string::String,
                    #[prost(message, optional, tag = "2")]
                    pub quantity: ::core::option::Option<ResourceValue>,
                    #[prost(message, repeated, tag = "3")]
                    pub attributes: ::prost::alloc::vec::Vec<Attribute>,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Gpu {
                    #[prost(message, optional, tag = "1")]
                    pub units: ::core::option::Option<ResourceValue>,
                    #[prost(message, repeated, tag = "2")]
                    pub attributes: ::prost::alloc::vec::Vec<Attribute>,
                }

                #[derive(
                    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
                )]
                #[repr(i32)]
                pub enum EndpointKind {
                    SharedHttp = 0,
                    RandomPort = 1,
                    LeasedIp = 2,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Endpoint {
                    #[prost(enumeration = "EndpointKind", tag = "1")]
                    pub kind: i32,
                    #[prost(uint32, tag = "2")]
                    pub sequence_number: u32,
                }

                #[derive(Clone, PartialEq, Eq, ::prost::Message)]
                pub struct Resources {
                    #[prost(uint32, tag = "1")]
                    pub id: u32,
                    #[prost(message, optional, tag = "2")]
                    pub cpu: ::core::option::Option<Cpu>,
                    #[prost(message, optional, tag = "3")]
                    pub memory: ::core::option::Option<Memory>,
                    #[prost(message, repeated, tag = "4")]
                    pub storage: ::prost::alloc::vec::Vec<Storage>,
                    #[prost(message, optional, tag = "5")]
                    pub gpu: ::core::option::Option<Gpu>,
                    #[prost(message, repeated, tag = "6")]
                    pub endpoints: ::prost::alloc::vec::Vec<Endpoint>,
                }
            }
        }
    }

    pub mod deployment {
        pub mod v1 {
            #[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
            pub struct DeploymentId {
                #[prost(string, tag = "1")]
                pub owner: ::prost::alloc::string::String,
                #[prost(uint64, tag = "2")]
                pub dseq: u64,
            }
        }

        pub mod v1beta4 {
            use super::super::base::attributes::v1::PlacementRequirements;
            use super::super::base::deposit::v1::Deposit;
            use super::super::base::resources::v1beta4::Resources;
            use super::v1::DeploymentId;
            use crate::gen::cosmos::base::v1beta1::DecCoin;

            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct ResourceUnit {
                #[prost(message, optional, tag = "1")]
                pub resource: ::core::option::Option<Resources>,
                #[prost(uint32, tag = "2")]
                pub count: u32,
                #[prost(message, optional, tag = "3")]
                pub price: ::core::option::Option<DecCoin>,
            }

            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct GroupSpec {
                #[prost(string, tag = "1")]
                pub name: ::prost::alloc::string::String,
                #[prost(message, optional, tag = "2")]
                pub requirements: ::core::option::Option<PlacementRequirements>,
                #[prost(message, repeated, tag = "3")]
                pub resources: ::prost::alloc::vec::Vec<ResourceUnit>,
            }

            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct MsgCreateDeployment {
                #[prost(message, optional, tag = "1")]
                pub id: ::core::option::Option<DeploymentId>,
                #[prost(message, repeated, tag = "2")]
                pub groups: ::prost::alloc::vec::Vec<GroupSpec>,
                /// SHA-256 of the manifest; providers reject a manifest whose
                /// hash differs.
                #[prost(bytes = "vec", tag = "3")]
                pub hash: ::prost::alloc::vec::Vec<u8>,
                #[prost(message, optional, tag = "4")]
                pub deposit: ::core::option::Option<Deposit>,
            }
            proto_name!(MsgCreateDeployment, "akash.deployment.v1beta4");

            #[derive(Clone, PartialEq, Eq, ::prost::Message)]
            pub struct MsgCloseDeployment {
                #[prost(message, optional, tag = "1")]
                pub id: ::core::option::Option<DeploymentId>,
            }
            proto_name!(MsgCloseDeployment, "akash.deployment.v1beta4");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::akash::deployment::{v1::DeploymentId, v1beta4::*};
    use prost::{Message, Name};

    #[test]
    fn test_type_urls() {
        assert_eq!(
            MsgCreateDeployment::type_url(),
            "/akash.deployment.v1beta4.MsgCreateDeployment"
        );
        assert_eq!(
            MsgCloseDeployment::full_name(),
            "akash.deployment.v1beta4.MsgCloseDeployment"
        );
    }

    #[test]
    fn test_close_encoding_is_stable() {
        let msg = MsgCloseDeployment {
            id: Some(DeploymentId {
                owner: "akash1x".to_string(),
                dseq: 1,
            }),
        };
        // field 1 (len-delimited) { field 1 "akash1x", field 2 varint 1 }
        let expected = vec![
            0x0a, 0x0b, 0x0a, 0x07, b'a', b'k', b'a', b's', b'h', b'1', b'x', 0x10, 0x01,
        ];
        assert_eq!(msg.encode_to_vec(), expected);
    }
}
