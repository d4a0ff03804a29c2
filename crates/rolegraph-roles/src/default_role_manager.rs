//! ---
//! rg_section: "03-role-hierarchy"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Role inheritance graph and transitive closure queries."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use tracing::{debug, trace};

use crate::{RoleLink, RoleManager, DEFAULT_MAX_HIERARCHY_DEPTH};

/// Qualifiers kept as separate fields so no two qualifier lists share a subgraph.
type DomainKey = Vec<String>;

fn domain_key(domain: &[&str]) -> DomainKey {
    domain.iter().map(|field| (*field).to_owned()).collect()
}

/// Inheritance links of a single domain.
#[derive(Debug, Clone, Default)]
struct DomainGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DomainGraph {
    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(index) = self.nodes.get(name) {
            return *index;
        }
        let index = self.graph.add_node(name.to_owned());
        self.nodes.insert(name.to_owned(), index);
        index
    }

    fn link(&mut self, name1: &str, name2: &str) -> bool {
        let from = self.node(name1);
        let to = self.node(name2);
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Neighbours in the order their edges were inserted.
    fn neighbours(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut ordered: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .neighbors_directed(node, direction)
            .filter_map(|other| {
                let edge = match direction {
                    Direction::Outgoing => self.graph.find_edge(node, other),
                    Direction::Incoming => self.graph.find_edge(other, node),
                };
                edge.map(|edge| (edge, other))
            })
            .collect();
        ordered.sort_unstable_by_key(|(edge, _)| *edge);
        ordered.into_iter().map(|(_, other)| other).collect()
    }

    /// Breadth-first closure from `start`, excluding `start`, at most `max_depth` hops.
    fn closure(&self, start: &str, direction: Direction, max_depth: usize) -> Vec<String> {
        let Some(start) = self.nodes.get(start).copied() else {
            return Vec::new();
        };
        let mut visited = HashSet::from([start]);
        let mut frontier = vec![start];
        let mut found = Vec::new();

        for _ in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for node in frontier {
                for other in self.neighbours(node, direction) {
                    if visited.insert(other) {
                        found.push(self.graph[other].clone());
                        next.push(other);
                    }
                }
            }
            frontier = next;
        }

        if !frontier.is_empty() {
            debug!(
                start = %self.graph[start],
                max_depth,
                "hierarchy depth ceiling reached before traversal completed"
            );
        }
        found
    }
}

/// In-memory [`RoleManager`] backed by one directed graph per domain.
///
/// Edges point from the inheriting name to the inherited role. Every query is
/// bounded by `max_hierarchy_depth` hops and keeps a visited set, so cyclic
/// inheritance terminates.
#[derive(Debug, Clone)]
pub struct DefaultRoleManager {
    domains: BTreeMap<DomainKey, DomainGraph>,
    max_hierarchy_depth: usize,
}

impl Default for DefaultRoleManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HIERARCHY_DEPTH)
    }
}

impl DefaultRoleManager {
    /// Create an empty resolver with the given traversal ceiling.
    pub fn new(max_hierarchy_depth: usize) -> Self {
        Self {
            domains: BTreeMap::new(),
            max_hierarchy_depth,
        }
    }

    /// Configured traversal ceiling.
    pub fn max_hierarchy_depth(&self) -> usize {
        self.max_hierarchy_depth
    }

    /// Number of direct links across all domains.
    pub fn link_count(&self) -> usize {
        self.domains
            .values()
            .map(|domain| domain.graph.edge_count())
            .sum()
    }

    /// Whether no link has been recorded.
    pub fn is_empty(&self) -> bool {
        self.link_count() == 0
    }

    /// Log every stored link at trace level.
    pub fn print_roles(&self) {
        for link in self.links() {
            trace!(
                name = %link.name,
                role = %link.role,
                domain = ?link.domain,
                "role link"
            );
        }
    }

    fn domain(&self, domain: &[&str]) -> Option<&DomainGraph> {
        self.domains.get(&domain_key(domain))
    }
}

impl RoleManager for DefaultRoleManager {
    fn clear(&mut self) {
        self.domains.clear();
    }

    fn add_link(&mut self, name1: &str, name2: &str, domain: &[&str]) -> bool {
        let key = domain_key(domain);
        let added = self.domains.entry(key).or_default().link(name1, name2);
        if added {
            trace!(name = name1, role = name2, domain = ?domain, "role link added");
        }
        added
    }

    fn has_link(&self, name1: &str, name2: &str, domain: &[&str]) -> bool {
        if name1 == name2 {
            return true;
        }
        self.domain(domain)
            .map(|graph| {
                graph
                    .closure(name1, Direction::Outgoing, self.max_hierarchy_depth)
                    .iter()
                    .any(|role| role == name2)
            })
            .unwrap_or(false)
    }

    fn get_roles(&self, name: &str, domain: &[&str]) -> Vec<String> {
        self.domain(domain)
            .map(|graph| graph.closure(name, Direction::Outgoing, self.max_hierarchy_depth))
            .unwrap_or_default()
    }

    fn get_users(&self, name: &str, domain: &[&str]) -> Vec<String> {
        self.domain(domain)
            .map(|graph| graph.closure(name, Direction::Incoming, self.max_hierarchy_depth))
            .unwrap_or_default()
    }

    fn links(&self) -> Vec<RoleLink> {
        let mut links = Vec::new();
        for (key, domain) in &self.domains {
            for edge in domain.graph.edge_indices() {
                if let Some((from, to)) = domain.graph.edge_endpoints(edge) {
                    links.push(RoleLink {
                        name: domain.graph[from].clone(),
                        role: domain.graph[to].clone(),
                        domain: key.clone(),
                    });
                }
            }
        }
        links
    }
}
