//! Connection Graph
//!
//! Undirected peer topology used to propagate transformations. It is
//! independent from spatial proximity: flocking never reads it.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Resource: member id -> peer ids, kept symmetric
#[derive(Resource, Debug, Clone, Default)]
pub struct ConnectionGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
    min_peers: usize,
    max_peers: usize,
}

impl ConnectionGraph {
    pub fn new(min_peers: usize, max_peers: usize) -> Self {
        Self {
            edges: BTreeMap::new(),
            min_peers,
            max_peers,
        }
    }

    /// Adds a member and links it to a random sample of existing members.
    ///
    /// The peer count is drawn uniformly from `[min_peers, max_peers]` and capped
    /// by the number of existing members. Returns the chosen peers.
    pub fn join(&mut self, member_id: &str, rng: &mut impl Rng) -> Vec<String> {
        if self.edges.contains_key(member_id) {
            return Vec::new();
        }

        let existing: Vec<String> = self.edges.keys().cloned().collect();
        let target = rng.gen_range(self.min_peers..=self.max_peers).min(existing.len());
        let peers: Vec<String> = existing.choose_multiple(rng, target).cloned().collect();

        let own = self.edges.entry(member_id.to_string()).or_default();
        own.extend(peers.iter().cloned());

        for peer in &peers {
            if let Some(links) = self.edges.get_mut(peer) {
                links.insert(member_id.to_string());
            }
        }

        peers
    }

    /// Removes a member and every edge touching it. Unknown ids are ignored.
    pub fn leave(&mut self, member_id: &str) -> bool {
        let Some(peers) = self.edges.remove(member_id) else {
            return false;
        };
        for peer in peers {
            if let Some(links) = self.edges.get_mut(&peer) {
                links.remove(member_id);
            }
        }
        true
    }

    /// Peers of a member; empty for unknown ids
    pub fn neighbors_of(&self, member_id: &str) -> Vec<String> {
        self.edges
            .get(member_id)
            .map(|peers| peers.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn degree(&self, member_id: &str) -> usize {
        self.edges.get(member_id).map_or(0, |peers| peers.len())
    }

    pub fn contains(&self, member_id: &str) -> bool {
        self.edges.contains_key(member_id)
    }

    pub fn are_connected(&self, a: &str, b: &str) -> bool {
        self.edges.get(a).is_some_and(|peers| peers.contains(b))
    }

    /// Mean peer count; 0 for an empty graph
    pub fn average_degree(&self) -> f32 {
        if self.edges.is_empty() {
            return 0.0;
        }
        let total: usize = self.edges.values().map(|peers| peers.len()).sum();
        total as f32 / self.edges.len() as f32
    }

    /// True when every edge is recorded in both directions
    pub fn is_symmetric(&self) -> bool {
        self.edges.iter().all(|(id, peers)| {
            peers
                .iter()
                .all(|peer| self.edges.get(peer).is_some_and(|back| back.contains(id)))
        })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
