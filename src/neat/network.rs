//! Feed-forward phenotype decoded from a [`Genome`].

use super::genome::{Genome, NodeId, NodeKind};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while decoding or activating a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The enabled connections contain a cycle.
    #[error("genome encodes a cyclic network")]
    Cycle,

    /// A connection references a node that has no gene.
    #[error("connection references unknown node {0}")]
    UnknownNode(NodeId),

    /// `activate` received the wrong number of inputs.
    #[error("expected {expected} inputs, got {actual}")]
    InputCount {
        /// Sensor count of the network.
        expected: usize,
        /// Length of the slice passed in.
        actual: usize,
    },
}

/// One non-sensor neuron, evaluated in topological order.
#[derive(Debug, Clone)]
struct Neuron {
    slot: usize,
    incoming: Vec<(usize, f64)>,
}

/// A decoded, stateless feed-forward network.
///
/// Activation uses the steepened sigmoid `1 / (1 + e^(-4.9x))` on every
/// hidden and output neuron.
#[derive(Debug, Clone)]
pub struct Network {
    input_slots: Vec<usize>,
    bias_slots: Vec<usize>,
    output_slots: Vec<usize>,
    neurons: Vec<Neuron>,
    slot_count: usize,
}

impl Network {
    /// Decodes the enabled part of `genome` into a network.
    ///
    /// Fails with [`NetworkError::Cycle`] if the connections are not
    /// feed-forward.
    pub fn from_genome(genome: &Genome) -> Result<Self, NetworkError> {
        let nodes = genome.nodes();
        let slot_of: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(slot, n)| (n.id, slot)).collect();

        let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); nodes.len()];
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut in_degree = vec![0usize; nodes.len()];
        for conn in genome.connections().iter().filter(|c| c.enabled) {
            let from = *slot_of
                .get(&conn.from)
                .ok_or(NetworkError::UnknownNode(conn.from))?;
            let to = *slot_of
                .get(&conn.to)
                .ok_or(NetworkError::UnknownNode(conn.to))?;
            incoming[to].push((from, conn.weight));
            outgoing[from].push(to);
            in_degree[to] += 1;
        }

        // Kahn's algorithm.
        let mut ready: Vec<usize> = (0..nodes.len()).filter(|&s| in_degree[s] == 0).collect();
        let mut order = Vec::with_capacity(nodes.len());
        while let Some(slot) = ready.pop() {
            order.push(slot);
            for &next in &outgoing[slot] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(next);
                }
            }
        }
        if order.len() != nodes.len() {
            return Err(NetworkError::Cycle);
        }

        let slots_of = |kind: NodeKind| -> Vec<usize> {
            nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.kind == kind)
                .map(|(slot, _)| slot)
                .collect()
        };

        let neurons = order
            .into_iter()
            .filter(|&slot| matches!(nodes[slot].kind, NodeKind::Hidden | NodeKind::Output))
            .map(|slot| Neuron {
                slot,
                incoming: std::mem::take(&mut incoming[slot]),
            })
            .collect();

        Ok(Self {
            input_slots: slots_of(NodeKind::Input),
            bias_slots: slots_of(NodeKind::Bias),
            output_slots: slots_of(NodeKind::Output),
            neurons,
            slot_count: nodes.len(),
        })
    }

    /// Number of sensor inputs.
    pub fn input_count(&self) -> usize {
        self.input_slots.len()
    }

    /// Number of outputs.
    pub fn output_count(&self) -> usize {
        self.output_slots.len()
    }

    /// Number of hidden and output neurons.
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Propagates `inputs` through the network and returns the outputs,
    /// ordered by output node id.
    pub fn activate(&self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.input_slots.len() {
            return Err(NetworkError::InputCount {
                expected: self.input_slots.len(),
                actual: inputs.len(),
            });
        }

        let mut values = vec![0.0; self.slot_count];
        for (&slot, &x) in self.input_slots.iter().zip(inputs) {
            values[slot] = x;
        }
        for &slot in &self.bias_slots {
            values[slot] = 1.0;
        }
        for neuron in &self.neurons {
            let sum: f64 = neuron
                .incoming
                .iter()
                .map(|&(src, w)| values[src] * w)
                .sum();
            values[neuron.slot] = steepened_sigmoid(sum);
        }

        Ok(self.output_slots.iter().map(|&s| values[s]).collect())
    }
}

fn steepened_sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-4.9 * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neat::genome::{ConnectionGene, NodeGene};

    fn node(id: NodeId, kind: NodeKind) -> NodeGene {
        NodeGene { id, kind }
    }

    fn conn(innovation: usize, from: NodeId, to: NodeId, weight: f64) -> ConnectionGene {
        ConnectionGene {
            innovation,
            from,
            to,
            weight,
            enabled: true,
        }
    }

    #[test]
    fn test_no_connections_outputs_half() {
        let g = Genome::from_genes(
            vec![node(0, NodeKind::Input), node(1, NodeKind::Bias), node(2, NodeKind::Output)],
            vec![],
        );
        let net = Network::from_genome(&g).unwrap();
        assert_eq!(net.input_count(), 1);
        assert_eq!(net.output_count(), 1);
        let out = net.activate(&[3.0]).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hidden_layer_propagation() {
        let g = Genome::from_genes(
            vec![
                node(0, NodeKind::Input),
                node(1, NodeKind::Bias),
                node(2, NodeKind::Output),
                node(3, NodeKind::Hidden),
            ],
            vec![conn(0, 0, 3, 1.0), conn(1, 3, 2, 1.0)],
        );
        let net = Network::from_genome(&g).unwrap();
        assert_eq!(net.neuron_count(), 2);

        let hidden = steepened_sigmoid(1.0);
        let expected = steepened_sigmoid(hidden);
        let out = net.activate(&[1.0]).unwrap();
        assert!((out[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_connection_ignored() {
        let mut c = conn(0, 0, 2, 10.0);
        c.enabled = false;
        let g = Genome::from_genes(
            vec![node(0, NodeKind::Input), node(1, NodeKind::Bias), node(2, NodeKind::Output)],
            vec![c],
        );
        let out = Network::from_genome(&g).unwrap().activate(&[1.0]).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bias_drives_output() {
        let g = Genome::from_genes(
            vec![node(0, NodeKind::Input), node(1, NodeKind::Bias), node(2, NodeKind::Output)],
            vec![conn(0, 1, 2, 5.0)],
        );
        let out = Network::from_genome(&g).unwrap().activate(&[0.0]).unwrap();
        assert!(out[0] > 0.99);
    }

    #[test]
    fn test_cycle_rejected() {
        let g = Genome::from_genes(
            vec![
                node(0, NodeKind::Input),
                node(1, NodeKind::Hidden),
                node(2, NodeKind::Hidden),
                node(3, NodeKind::Output),
            ],
            vec![conn(0, 1, 2, 1.0), conn(1, 2, 1, 1.0), conn(2, 2, 3, 1.0)],
        );
        assert_eq!(Network::from_genome(&g).unwrap_err(), NetworkError::Cycle);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let g = Genome::from_genes(
            vec![node(0, NodeKind::Input), node(1, NodeKind::Output)],
            vec![conn(0, 0, 9, 1.0)],
        );
        assert_eq!(
            Network::from_genome(&g).unwrap_err(),
            NetworkError::UnknownNode(9)
        );
    }

    #[test]
    fn test_input_count_mismatch() {
        let g = Genome::from_genes(
            vec![node(0, NodeKind::Input), node(1, NodeKind::Output)],
            vec![],
        );
        let net = Network::from_genome(&g).unwrap();
        assert_eq!(
            net.activate(&[1.0, 2.0]).unwrap_err(),
            NetworkError::InputCount {
                expected: 1,
                actual: 2
            }
        );
    }
}
