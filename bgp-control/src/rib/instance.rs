//! Routing-instance (VRF) registry.
//!
//! A routing instance is a name plus import/export route-target sets
//! plus one `Table` per address family it carries. The instance/table
//! graph is created and torn down by configuration deltas (§6); the
//! replicator (§4.E) and rtarget manager (§4.H) both read this registry
//! to know which instances exist and which targets they import/export.

use std::collections::HashMap;
use std::str::FromStr;

use bgp_packet::ExtCommunityValue;

use crate::error::ConfigError;
use crate::rib::table::Table;

/// Interned-by-value instance name. A thin newtype rather than a bare
/// `String` so it reads unambiguously at call sites and round-trips
/// through `serde` the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct InstanceName(String);

impl InstanceName {
    pub fn new(name: impl Into<String>) -> Self {
        InstanceName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A route-target ext-community, parsed once at config-apply time
/// (policy errors per §7 are logged and the offending delta dropped,
/// not propagated as a session-fatal condition).
pub fn parse_route_target(s: &str) -> Result<ExtCommunityValue, String> {
    let rest = s.strip_prefix("target:").unwrap_or(s);
    let (asn_part, local_part) = rest.split_once(':').ok_or_else(|| s.to_string())?;
    let asn: u16 = asn_part.parse().map_err(|_| s.to_string())?;
    let local: u32 = local_part.parse().map_err(|_| s.to_string())?;
    let mut val = [0u8; 6];
    val[0..2].copy_from_slice(&asn.to_be_bytes());
    val[2..6].copy_from_slice(&local.to_be_bytes());
    Ok(ExtCommunityValue {
        high_type: 0x00,
        low_type: 0x02,
        val,
    })
}

pub struct RoutingInstance {
    pub name: InstanceName,
    pub import_targets: Vec<ExtCommunityValue>,
    pub export_targets: Vec<ExtCommunityValue>,
    pub tables: HashMap<bgp_packet::AfiSafi, Table>,
}

impl RoutingInstance {
    pub fn new(name: InstanceName) -> Self {
        RoutingInstance {
            name,
            import_targets: Vec::new(),
            export_targets: Vec::new(),
            tables: HashMap::new(),
        }
    }

    pub fn table(&mut self, family: bgp_packet::AfiSafi) -> &mut Table {
        self.tables
            .entry(family)
            .or_insert_with(|| Table::new(self.name.clone(), family))
    }
}

#[derive(Default)]
pub struct InstanceManager {
    pub instances: HashMap<InstanceName, RoutingInstance>,
}

impl InstanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        name: InstanceName,
        import_targets: &[String],
        export_targets: &[String],
    ) -> Result<(), ConfigError> {
        if self.instances.contains_key(&name) {
            return Err(ConfigError::InstanceExists(name.to_string()));
        }
        let mut inst = RoutingInstance::new(name.clone());
        for t in import_targets {
            let rt = parse_route_target(t).map_err(|target| ConfigError::InvalidRouteTarget {
                instance: name.to_string(),
                target,
            })?;
            inst.import_targets.push(rt);
        }
        for t in export_targets {
            let rt = parse_route_target(t).map_err(|target| ConfigError::InvalidRouteTarget {
                instance: name.to_string(),
                target,
            })?;
            inst.export_targets.push(rt);
        }
        self.instances.insert(name, inst);
        Ok(())
    }

    pub fn remove(&mut self, name: &InstanceName) -> Result<(), ConfigError> {
        self.instances
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::InstanceMissing(name.to_string()))
    }

    /// `Connection Add` sugar (§6): symmetric import of each other's
    /// export-targets.
    pub fn connect(&mut self, a: &InstanceName, b: &InstanceName) -> Result<(), ConfigError> {
        let a_exports = self
            .instances
            .get(a)
            .ok_or_else(|| ConfigError::InstanceMissing(a.to_string()))?
            .export_targets
            .clone();
        let b_exports = self
            .instances
            .get(b)
            .ok_or_else(|| ConfigError::InstanceMissing(b.to_string()))?
            .export_targets
            .clone();

        self.instances.get_mut(b).unwrap().import_targets.extend(a_exports);
        self.instances.get_mut(a).unwrap().import_targets.extend(b_exports);
        Ok(())
    }

    pub fn get(&self, name: &InstanceName) -> Option<&RoutingInstance> {
        self.instances.get(name)
    }

    pub fn get_mut(&mut self, name: &InstanceName) -> Option<&mut RoutingInstance> {
        self.instances.get_mut(name)
    }
}

impl FromStr for InstanceName {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(InstanceName::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_add_is_symmetric_import_sugar() {
        let mut mgr = InstanceManager::new();
        mgr.add(InstanceName::new("blue"), &[], &["target:1:1".into()]).unwrap();
        mgr.add(InstanceName::new("pink"), &[], &["target:1:2".into()]).unwrap();
        mgr.connect(&InstanceName::new("blue"), &InstanceName::new("pink")).unwrap();

        let blue = mgr.get(&InstanceName::new("blue")).unwrap();
        let pink = mgr.get(&InstanceName::new("pink")).unwrap();
        assert_eq!(blue.import_targets, pink.export_targets);
        assert_eq!(pink.import_targets, blue.export_targets);
    }

    #[test]
    fn bad_route_target_is_reported_without_aborting() {
        let mut mgr = InstanceManager::new();
        let err = mgr
            .add(InstanceName::new("red"), &["not-a-target".into()], &[])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRouteTarget { .. }));
    }
}
