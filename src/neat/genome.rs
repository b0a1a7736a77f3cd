//! Genome encoding and genetic operators.
//!
//! A genome is a list of node genes and a list of connection genes, each
//! connection carrying a historical marker (innovation number) so that
//! genomes of different shapes can be aligned for crossover and distance.
//!
//! Networks are kept feed-forward: structural mutation never adds a
//! connection that would close a cycle.
//!
//! # References
//!
//! - Stanley & Miikkulainen (2002), "Evolving Neural Networks through
//!   Augmenting Topologies", *Evolutionary Computation* 10(2)

use rand::Rng;
use std::collections::HashMap;

/// Identifier of a node gene.
pub type NodeId = usize;

/// Historical marker of a connection gene.
pub type Innovation = usize;

/// Role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Sensor node fed by the caller.
    Input,
    /// Constant `1.0` node.
    Bias,
    /// Node added by structural mutation.
    Hidden,
    /// Node whose activation is returned to the caller.
    Output,
}

/// A node gene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeGene {
    /// Node identifier, unique within a run.
    pub id: NodeId,
    /// Node role.
    pub kind: NodeKind,
}

/// A connection gene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionGene {
    /// Historical marker shared by every genome that has this connection.
    pub innovation: Innovation,
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Connection weight.
    pub weight: f64,
    /// Disabled genes are inherited but not expressed in the network.
    pub enabled: bool,
}

/// Assigns innovation numbers and node ids for one run.
///
/// The same structural mutation (same endpoints, or the same connection
/// split) receives the same marker everywhere in the population.
#[derive(Debug, Clone)]
pub struct InnovationTracker {
    next_innovation: Innovation,
    next_node: NodeId,
    connections: HashMap<(NodeId, NodeId), Innovation>,
    splits: HashMap<Innovation, NodeId>,
}

impl InnovationTracker {
    /// Creates a tracker for networks with the given sensor and output
    /// counts. Ids `0..inputs` are inputs, `inputs` is the bias and the
    /// next `outputs` ids are outputs.
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            next_innovation: 0,
            next_node: inputs + 1 + outputs,
            connections: HashMap::new(),
            splits: HashMap::new(),
        }
    }

    /// Returns the innovation number of the connection `from -> to`,
    /// allocating one on first use.
    pub fn connection_innovation(&mut self, from: NodeId, to: NodeId) -> Innovation {
        if let Some(&innov) = self.connections.get(&(from, to)) {
            return innov;
        }
        let innov = self.next_innovation;
        self.next_innovation += 1;
        self.connections.insert((from, to), innov);
        innov
    }

    /// Returns the node id created by splitting connection `innovation`.
    pub fn split_node(&mut self, innovation: Innovation) -> NodeId {
        if let Some(&id) = self.splits.get(&innovation) {
            return id;
        }
        let id = self.fresh_node();
        self.splits.insert(innovation, id);
        id
    }

    /// Allocates a node id never handed out before.
    pub fn fresh_node(&mut self) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        id
    }

    /// Number of distinct connection innovations seen so far.
    pub fn innovation_count(&self) -> usize {
        self.next_innovation
    }
}

/// A NEAT genome.
///
/// Node genes are sorted by id and connection genes by innovation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome {
    nodes: Vec<NodeGene>,
    connections: Vec<ConnectionGene>,
    fitness: f64,
}

impl Genome {
    /// Creates a minimal genome: every input and the bias connected
    /// directly to every output, with random weights.
    pub fn minimal<R: Rng>(
        inputs: usize,
        outputs: usize,
        tracker: &mut InnovationTracker,
        weight_range: f64,
        rng: &mut R,
    ) -> Self {
        let mut nodes = Vec::with_capacity(inputs + 1 + outputs);
        for id in 0..inputs {
            nodes.push(NodeGene {
                id,
                kind: NodeKind::Input,
            });
        }
        nodes.push(NodeGene {
            id: inputs,
            kind: NodeKind::Bias,
        });
        for k in 0..outputs {
            nodes.push(NodeGene {
                id: inputs + 1 + k,
                kind: NodeKind::Output,
            });
        }

        let mut connections = Vec::with_capacity((inputs + 1) * outputs);
        for from in 0..=inputs {
            for k in 0..outputs {
                let to = inputs + 1 + k;
                connections.push(ConnectionGene {
                    innovation: tracker.connection_innovation(from, to),
                    from,
                    to,
                    weight: rng.random_range(-weight_range..=weight_range),
                    enabled: true,
                });
            }
        }
        connections.sort_by_key(|c| c.innovation);

        Self {
            nodes,
            connections,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Builds a genome from explicit gene lists.
    ///
    /// Genes are sorted; no structural checks are performed here, they
    /// happen when the genome is decoded into a network.
    pub fn from_genes(mut nodes: Vec<NodeGene>, mut connections: Vec<ConnectionGene>) -> Self {
        nodes.sort_by_key(|n| n.id);
        nodes.dedup_by_key(|n| n.id);
        connections.sort_by_key(|c| c.innovation);
        Self {
            nodes,
            connections,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Node genes, sorted by id.
    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    /// Connection genes, sorted by innovation.
    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    /// Number of enabled connections.
    pub fn enabled_connections(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }

    /// Fitness from the last evaluation (`-inf` when never evaluated).
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Stores the evaluated fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn has_node(&self, id: NodeId) -> bool {
        self.nodes.binary_search_by_key(&id, |n| n.id).is_ok()
    }

    /// Kind of node `id`, if present.
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| self.nodes[i].kind)
    }

    fn insert_node(&mut self, node: NodeGene) {
        if let Err(pos) = self.nodes.binary_search_by_key(&node.id, |n| n.id) {
            self.nodes.insert(pos, node);
        }
    }

    fn insert_connection(&mut self, conn: ConnectionGene) {
        let pos = self
            .connections
            .partition_point(|c| c.innovation < conn.innovation);
        self.connections.insert(pos, conn);
    }

    /// Perturbs or replaces connection weights.
    ///
    /// Each connection is perturbed by a uniform offset in
    /// `[-power, power]` with probability `perturb_rate`, otherwise its
    /// weight is redrawn from `[-range, range]`.
    pub fn mutate_weights<R: Rng>(
        &mut self,
        perturb_rate: f64,
        power: f64,
        range: f64,
        rng: &mut R,
    ) {
        for conn in &mut self.connections {
            if rng.random_bool(perturb_rate) {
                if power > 0.0 {
                    conn.weight += rng.random_range(-power..=power);
                }
            } else {
                conn.weight = rng.random_range(-range..=range);
            }
        }
    }

    /// Splits a random enabled connection `a -> b` into `a -> n -> b`.
    ///
    /// The old connection is disabled; `a -> n` gets weight 1 and
    /// `n -> b` inherits the old weight. Returns `false` when there is no
    /// enabled connection to split.
    pub fn mutate_add_node<R: Rng>(
        &mut self,
        tracker: &mut InnovationTracker,
        rng: &mut R,
    ) -> bool {
        let enabled: Vec<usize> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.enabled)
            .map(|(i, _)| i)
            .collect();
        if enabled.is_empty() {
            return false;
        }
        let idx = enabled[rng.random_range(0..enabled.len())];
        self.connections[idx].enabled = false;
        let old = self.connections[idx];

        let mut node = tracker.split_node(old.innovation);
        if self.has_node(node) {
            // This genome already split the same gene once.
            node = tracker.fresh_node();
        }
        self.insert_node(NodeGene {
            id: node,
            kind: NodeKind::Hidden,
        });
        self.insert_connection(ConnectionGene {
            innovation: tracker.connection_innovation(old.from, node),
            from: old.from,
            to: node,
            weight: 1.0,
            enabled: true,
        });
        self.insert_connection(ConnectionGene {
            innovation: tracker.connection_innovation(node, old.to),
            from: node,
            to: old.to,
            weight: old.weight,
            enabled: true,
        });
        true
    }

    /// Adds a random feed-forward connection between two unconnected
    /// nodes. Returns `false` when no such pair exists.
    pub fn mutate_add_connection<R: Rng>(
        &mut self,
        tracker: &mut InnovationTracker,
        weight_range: f64,
        rng: &mut R,
    ) -> bool {
        let mut candidates = Vec::new();
        for src in &self.nodes {
            if src.kind == NodeKind::Output {
                continue;
            }
            for dst in &self.nodes {
                if !matches!(dst.kind, NodeKind::Hidden | NodeKind::Output) || src.id == dst.id {
                    continue;
                }
                if self
                    .connections
                    .iter()
                    .any(|c| c.from == src.id && c.to == dst.id)
                {
                    continue;
                }
                if self.creates_cycle(src.id, dst.id) {
                    continue;
                }
                candidates.push((src.id, dst.id));
            }
        }
        if candidates.is_empty() {
            return false;
        }
        let (from, to) = candidates[rng.random_range(0..candidates.len())];
        self.insert_connection(ConnectionGene {
            innovation: tracker.connection_innovation(from, to),
            from,
            to,
            weight: rng.random_range(-weight_range..=weight_range),
            enabled: true,
        });
        true
    }

    /// Returns `true` if adding `from -> to` would close a cycle.
    ///
    /// Disabled connections count, since crossover may re-enable them.
    pub fn creates_cycle(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut stack = vec![to];
        let mut visited = vec![to];
        while let Some(node) = stack.pop() {
            for conn in self.connections.iter().filter(|c| c.from == node) {
                if conn.to == from {
                    return true;
                }
                if !visited.contains(&conn.to) {
                    visited.push(conn.to);
                    stack.push(conn.to);
                }
            }
        }
        false
    }

    /// Produces a child from two parents.
    ///
    /// `fitter` supplies the structure: matching genes are inherited from
    /// either parent at random, disjoint and excess genes only from
    /// `fitter`. A gene disabled in either parent stays disabled with
    /// probability 0.75.
    pub fn crossover<R: Rng>(fitter: &Genome, other: &Genome, rng: &mut R) -> Genome {
        let mut connections = Vec::with_capacity(fitter.connections.len());
        let mut j = 0;
        for gene in &fitter.connections {
            while j < other.connections.len() && other.connections[j].innovation < gene.innovation {
                j += 1;
            }
            let matching = other
                .connections
                .get(j)
                .filter(|o| o.innovation == gene.innovation);

            let mut child_gene = match matching {
                Some(o) if rng.random_bool(0.5) => *o,
                _ => *gene,
            };
            if let Some(o) = matching {
                if !gene.enabled || !o.enabled {
                    child_gene.enabled = !rng.random_bool(0.75);
                }
            }
            connections.push(child_gene);
        }

        let nodes = fitter.nodes.clone();
        Genome {
            nodes,
            connections,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Compatibility distance used for speciation.
    ///
    /// `δ = c_d · (D + E) / N + c_w · W̄`, where `D + E` counts
    /// non-matching genes, `W̄` is the mean weight difference of matching
    /// genes and `N` is the size of the larger genome (1 below 20 genes).
    pub fn distance(
        &self,
        other: &Genome,
        disjoint_coefficient: f64,
        weight_coefficient: f64,
    ) -> f64 {
        let a = &self.connections;
        let b = &other.connections;
        let (mut i, mut j) = (0, 0);
        let mut non_matching = 0usize;
        let mut matching = 0usize;
        let mut weight_diff = 0.0;

        while i < a.len() && j < b.len() {
            match a[i].innovation.cmp(&b[j].innovation) {
                std::cmp::Ordering::Equal => {
                    matching += 1;
                    weight_diff += (a[i].weight - b[j].weight).abs();
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => {
                    non_matching += 1;
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    non_matching += 1;
                    j += 1;
                }
            }
        }
        non_matching += (a.len() - i) + (b.len() - j);

        let longest = a.len().max(b.len());
        let n = if longest < 20 { 1.0 } else { longest as f64 };
        let mean_diff = if matching > 0 {
            weight_diff / matching as f64
        } else {
            0.0
        };
        disjoint_coefficient * non_matching as f64 / n + weight_coefficient * mean_diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_minimal_genome_shape() {
        let mut tracker = InnovationTracker::new(2, 1);
        let g = Genome::minimal(2, 1, &mut tracker, 1.0, &mut rng());

        assert_eq!(g.nodes().len(), 4);
        assert_eq!(g.kind_of(2), Some(NodeKind::Bias));
        assert_eq!(g.kind_of(3), Some(NodeKind::Output));
        assert_eq!(g.connections().len(), 3);
        assert!(g.connections().iter().all(|c| c.to == 3 && c.enabled));
        assert!(g
            .connections()
            .iter()
            .all(|c| (-1.0..=1.0).contains(&c.weight)));
    }

    #[test]
    fn test_minimal_genomes_share_innovations() {
        let mut tracker = InnovationTracker::new(2, 1);
        let mut r = rng();
        let a = Genome::minimal(2, 1, &mut tracker, 1.0, &mut r);
        let b = Genome::minimal(2, 1, &mut tracker, 1.0, &mut r);
        let ia: Vec<_> = a.connections().iter().map(|c| c.innovation).collect();
        let ib: Vec<_> = b.connections().iter().map(|c| c.innovation).collect();
        assert_eq!(ia, ib);
        assert_eq!(tracker.innovation_count(), 3);
    }

    #[test]
    fn test_add_node_splits_connection() {
        let mut tracker = InnovationTracker::new(2, 1);
        let mut r = rng();
        let mut g = Genome::minimal(2, 1, &mut tracker, 1.0, &mut r);

        assert!(g.mutate_add_node(&mut tracker, &mut r));
        assert_eq!(g.nodes().len(), 5);
        assert_eq!(g.connections().len(), 5);
        assert_eq!(g.enabled_connections(), 4);

        let hidden = g
            .nodes()
            .iter()
            .find(|n| n.kind == NodeKind::Hidden)
            .expect("hidden node")
            .id;
        let into: Vec<_> = g.connections().iter().filter(|c| c.to == hidden).collect();
        assert_eq!(into.len(), 1);
        assert!((into[0].weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_split_same_node_id() {
        let mut tracker = InnovationTracker::new(1, 1);
        let mut r = rng();
        let base = Genome::minimal(1, 1, &mut tracker, 1.0, &mut r);
        let first = base.connections()[0].innovation;
        let a = tracker.split_node(first);
        let b = tracker.split_node(first);
        assert_eq!(a, b);
        assert_ne!(tracker.fresh_node(), a);
    }

    #[test]
    fn test_add_connection_never_creates_cycle() {
        let mut tracker = InnovationTracker::new(2, 1);
        let mut r = rng();
        let mut g = Genome::minimal(2, 1, &mut tracker, 1.0, &mut r);
        for _ in 0..5 {
            g.mutate_add_node(&mut tracker, &mut r);
        }
        for _ in 0..30 {
            g.mutate_add_connection(&mut tracker, 1.0, &mut r);
        }
        for c in g.connections() {
            // Reverse edge must not exist anywhere reachable.
            let mut probe = g.clone();
            probe.connections.retain(|x| x.innovation != c.innovation);
            assert!(
                !probe.creates_cycle(c.from, c.to),
                "connection {} -> {} closes a cycle",
                c.from,
                c.to
            );
        }
        for c in g.connections() {
            assert_ne!(g.kind_of(c.from), Some(NodeKind::Output));
            assert!(matches!(
                g.kind_of(c.to),
                Some(NodeKind::Hidden) | Some(NodeKind::Output)
            ));
        }
    }

    #[test]
    fn test_fully_connected_has_no_candidates() {
        let mut tracker = InnovationTracker::new(2, 1);
        let mut g = Genome::minimal(2, 1, &mut tracker, 1.0, &mut rng());
        assert!(!g.mutate_add_connection(&mut tracker, 1.0, &mut rng()));
    }

    #[test]
    fn test_creates_cycle() {
        let nodes = vec![
            NodeGene {
                id: 0,
                kind: NodeKind::Input,
            },
            NodeGene {
                id: 1,
                kind: NodeKind::Hidden,
            },
            NodeGene {
                id: 2,
                kind: NodeKind::Hidden,
            },
            NodeGene {
                id: 3,
                kind: NodeKind::Output,
            },
        ];
        let conns = vec![
            ConnectionGene {
                innovation: 0,
                from: 0,
                to: 1,
                weight: 1.0,
                enabled: true,
            },
            ConnectionGene {
                innovation: 1,
                from: 1,
                to: 2,
                weight: 1.0,
                enabled: true,
            },
            ConnectionGene {
                innovation: 2,
                from: 2,
                to: 3,
                weight: 1.0,
                enabled: true,
            },
        ];
        let g = Genome::from_genes(nodes, conns);
        assert!(g.creates_cycle(2, 1));
        assert!(g.creates_cycle(3, 0));
        assert!(g.creates_cycle(1, 1));
        assert!(!g.creates_cycle(0, 2));
    }

    #[test]
    fn test_crossover_keeps_fitter_structure() {
        let mut tracker = InnovationTracker::new(2, 1);
        let mut r = rng();
        let mut fitter = Genome::minimal(2, 1, &mut tracker, 1.0, &mut r);
        let mut other = fitter.clone();
        fitter.mutate_add_node(&mut tracker, &mut r);
        other.mutate_add_connection(&mut tracker, 1.0, &mut r);
        other.mutate_weights(0.0, 0.0, 1.0, &mut r);

        let child = Genome::crossover(&fitter, &other, &mut r);
        let fi: Vec<_> = fitter.connections().iter().map(|c| c.innovation).collect();
        let ci: Vec<_> = child.connections().iter().map(|c| c.innovation).collect();
        assert_eq!(fi, ci);
        assert_eq!(child.nodes(), fitter.nodes());
        assert_eq!(child.fitness(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_distance() {
        let mut tracker = InnovationTracker::new(2, 1);
        let mut r = rng();
        let a = Genome::minimal(2, 1, &mut tracker, 1.0, &mut r);
        assert!(a.distance(&a, 1.0, 0.4).abs() < 1e-12);

        let mut b = a.clone();
        b.mutate_add_node(&mut tracker, &mut r);
        // Two new genes, no weight change on matching ones.
        assert!((a.distance(&b, 1.0, 0.0) - 2.0).abs() < 1e-12);
        assert!((a.distance(&b, 1.0, 0.4) - b.distance(&a, 1.0, 0.4)).abs() < 1e-12);
    }

    #[test]
    fn test_mutate_weights_replace() {
        let mut tracker = InnovationTracker::new(2, 1);
        let mut r = rng();
        let mut g = Genome::minimal(2, 1, &mut tracker, 0.1, &mut r);
        g.mutate_weights(0.0, 0.5, 5.0, &mut r);
        assert!(g.connections().iter().all(|c| c.weight.abs() <= 5.0));
    }
}
