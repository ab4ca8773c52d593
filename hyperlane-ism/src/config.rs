//! Declarative module trees for [`IsmDeployer`](crate::deploy::IsmDeployer).
//!
//! Bridge modules are built in code around their bridge endpoints and
//! enter a tree as [`IsmConfig::Address`].

use serde::{Deserialize, Serialize};

use hyperlane_core::{H256, U256};

use crate::timelock::RemoteRouterConfig;

/// Declarative description of a module tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IsmConfig {
    /// An already deployed module
    Address {
        /// Where it lives
        address: H256,
    },
    /// [`TestIsm`](crate::test_ism::TestIsm)
    TestIsm {
        /// Whether it accepts messages
        #[serde(default = "default_accept")]
        accept: bool,
    },
    /// [`TrustedRelayerIsm`](crate::trusted_relayer::TrustedRelayerIsm)
    /// against the deployer's mailbox
    TrustedRelayer {
        /// The only relayer allowed to deliver
        relayer: H256,
    },
    /// [`PausableIsm`](crate::pausable::PausableIsm)
    Pausable {
        /// Who may pause
        owner: H256,
        /// Start paused
        #[serde(default)]
        paused: bool,
    },
    /// Owner managed routing
    DomainRouting(RoutingConfig),
    /// Append-only routing
    IncrementalDomainRouting(RoutingConfig),
    /// Routing that falls back to the mailbox default module
    DefaultFallbackRouting(RoutingConfig),
    /// Domain routing with per-origin transfer limits
    RateLimitedRouting(RateLimitedRoutingConfig),
    /// m-of-n aggregation
    Aggregation {
        /// Members, in any order
        modules: Vec<IsmConfig>,
        /// Required successes
        threshold: u8,
    },
    /// [`TimelockRouter`](crate::timelock::TimelockRouter) against the
    /// deployer's mailbox
    Timelock {
        /// Owner of the router
        owner: H256,
        /// Seconds between preverification and acceptance
        window: u64,
        /// Initial remote routers
        #[serde(default)]
        routers: Vec<RemoteRouterConfig>,
    },
}

fn default_accept() -> bool {
    true
}

/// Settings shared by the routing flavours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Owner of the routing table
    pub owner: H256,
    /// Initial routes
    #[serde(default)]
    pub domains: Vec<DomainIsmConfig>,
}

/// A route in a [`RoutingConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainIsmConfig {
    /// Origin domain
    pub domain: u32,
    /// Module for messages from `domain`
    pub ism: IsmConfig,
}

/// Routing plus the limits of a
/// [`WarpRateLimitingIsm`](crate::routing::WarpRateLimitingIsm).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitedRoutingConfig {
    #[serde(flatten)]
    pub routing: RoutingConfig,
    /// Origins without an entry are not limited
    #[serde(default)]
    pub limits: Vec<RateLimitConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub origin: u32,
    /// Transferable amount per window
    pub max_capacity: U256,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_nested_configs() {
        let json = r#"{
            "type": "domainRouting",
            "owner": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "domains": [
                { "domain": 5, "ism": { "type": "testIsm" } },
                {
                    "domain": 7,
                    "ism": {
                        "type": "aggregation",
                        "threshold": 1,
                        "modules": [
                            { "type": "pausable", "owner": "0x0000000000000000000000000000000000000000000000000000000000000001" },
                            { "type": "trustedRelayer", "relayer": "0x0000000000000000000000000000000000000000000000000000000000000002" }
                        ]
                    }
                }
            ]
        }"#;
        let config: IsmConfig = serde_json::from_str(json).unwrap();
        let IsmConfig::DomainRouting(routing) = config else {
            panic!("expected domain routing");
        };
        assert_eq!(routing.owner, H256::from_low_u64_be(1));
        assert_eq!(routing.domains[0].ism, IsmConfig::TestIsm { accept: true });
        match &routing.domains[1].ism {
            IsmConfig::Aggregation { modules, threshold } => {
                assert_eq!(*threshold, 1);
                assert_eq!(
                    modules[0],
                    IsmConfig::Pausable {
                        owner: H256::from_low_u64_be(1),
                        paused: false
                    }
                );
            }
            other => panic!("expected aggregation, got {other:?}"),
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let config = IsmConfig::TestIsm { accept: false };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["type"], "testIsm");
        assert_eq!(value["accept"], false);
    }

    #[test]
    fn parses_timelock_and_rate_limited_routing() {
        let json = r#"[
            {
                "type": "timelock",
                "owner": "0x0000000000000000000000000000000000000000000000000000000000000001",
                "window": 3600,
                "routers": [
                    { "domain": 1, "router": "0x0000000000000000000000000000000000000000000000000000000000000071" }
                ]
            },
            {
                "type": "rateLimitedRouting",
                "owner": "0x0000000000000000000000000000000000000000000000000000000000000001",
                "domains": [{ "domain": 5, "ism": { "type": "testIsm" } }],
                "limits": [{ "origin": 5, "maxCapacity": "0x3e8" }]
            }
        ]"#;
        let configs: Vec<IsmConfig> = serde_json::from_str(json).unwrap();
        assert_eq!(
            configs[0],
            IsmConfig::Timelock {
                owner: H256::from_low_u64_be(1),
                window: 3600,
                routers: vec![RemoteRouterConfig {
                    domain: 1,
                    router: Some(H256::from_low_u64_be(0x71))
                }],
            }
        );
        let IsmConfig::RateLimitedRouting(limited) = &configs[1] else {
            panic!("expected rate limited routing");
        };
        assert_eq!(limited.routing.domains[0].domain, 5);
        assert_eq!(
            limited.limits,
            vec![RateLimitConfig {
                origin: 5,
                max_capacity: U256::from(1000u64)
            }]
        );
    }
}
