use std::collections::HashSet;

use super::types::WorkerEndpoint;

/// Source of candidate worker addresses, re-enumerated on every health tick.
pub trait WorkerDiscovery: Send + Sync {
    fn candidates(&self) -> Vec<WorkerEndpoint>;
}

/// Fixed address list taken from configuration.
pub struct StaticDiscovery {
    endpoints: Vec<WorkerEndpoint>,
}

impl StaticDiscovery {
    /// Keeps the first occurrence of each address.
    pub fn new(addresses: &[String]) -> Self {
        let mut seen = HashSet::new();
        let endpoints = addresses
            .iter()
            .map(|address| WorkerEndpoint::new(address))
            .filter(|endpoint| seen.insert(endpoint.id.clone()))
            .collect();

        Self { endpoints }
    }
}

impl WorkerDiscovery for StaticDiscovery {
    fn candidates(&self) -> Vec<WorkerEndpoint> {
        self.endpoints.clone()
    }
}
