use derive_more::{Display, Error};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One road distance between two cities
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteEdge {
    pub from: String,
    pub to: String,
    pub km: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Neighbor {
    pub city: String,
    pub km: f64,
}

/// Undirected weighted graph of city distances
///
/// Cities and neighbors keep the order they were first linked in.
#[derive(Clone, Debug, Default)]
pub struct RouteGraph {
    adjacency: IndexMap<String, IndexMap<String, f64>>,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<'a, T: IntoIterator<Item = &'a RouteEdge>>(
        edges: T,
    ) -> Result<Self, RouteError> {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(&edge.from, &edge.to, edge.km)?;
        }
        Ok(graph)
    }

    /// Self-loops are dropped; a repeated pair keeps its shortest distance.
    pub fn add_edge(&mut self, from: &str, to: &str, km: f64) -> Result<(), RouteError> {
        Self::validate_edge(from, to, km)?;
        if from == to {
            return Ok(());
        }
        self.link(from, to, km);
        self.link(to, from, km);
        Ok(())
    }

    pub fn neighbors(&self, city: &str) -> Vec<Neighbor> {
        self.adjacency
            .get(city)
            .map(|n| {
                n.iter()
                    .map(|(city, km)| Neighbor {
                        city: city.clone(),
                        km: *km,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn distance(&self, from: &str, to: &str) -> Option<f64> {
        self.adjacency.get(from)?.get(to).copied()
    }

    /// Number of cities
    pub fn size(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexMap::len).sum::<usize>() / 2
    }

    fn link(&mut self, a: &str, b: &str, km: f64) {
        self.adjacency
            .entry(a.to_owned())
            .or_default()
            .entry(b.to_owned())
            .and_modify(|prev| *prev = prev.min(km))
            .or_insert(km);
    }

    fn validate_edge(from: &str, to: &str, km: f64) -> Result<(), RouteError> {
        if from.is_empty() || to.is_empty() {
            return Err(RouteError::EmptyCity);
        }
        if !km.is_finite() {
            return Err(RouteError::NonFiniteDistance);
        }
        if km < 0.0 {
            return Err(RouteError::NegativeDistance);
        }
        Ok(())
    }
}

#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    #[display(fmt = "from/to cannot be empty")]
    EmptyCity,
    #[display(fmt = "km must be a finite number")]
    NonFiniteDistance,
    #[display(fmt = "km must be non-negative")]
    NegativeDistance,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str, km: f64) -> RouteEdge {
        RouteEdge {
            from: from.to_owned(),
            to: to.to_owned(),
            km,
        }
    }

    #[test]
    fn test_from_edges() {
        let graph = RouteGraph::from_edges(&[
            edge("MTY", "SALT", 85.0),
            edge("MTY", "REYN", 220.0),
            edge("SALT", "MTY", 80.0),
        ])
        .unwrap();
        assert_eq!(graph.size(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.distance("SALT", "MTY"), Some(80.0));
        assert_eq!(graph.distance("MTY", "SALT"), Some(80.0));
        assert_eq!(graph.neighbors("REYN"), vec![Neighbor { city: "MTY".to_owned(), km: 220.0 }]);
        assert!(graph.neighbors("GDL").is_empty());
    }

    #[test]
    fn test_neighbors_keep_insertion_order() {
        let graph = RouteGraph::from_edges(&[
            edge("A", "B", 10.0),
            edge("A", "C", 20.0),
            edge("A", "D", 5.0),
            edge("E", "A", 7.0),
            edge("A", "C", 1.0),
        ])
        .unwrap();
        assert_eq!(
            graph
                .neighbors("A")
                .into_iter()
                .map(|n| n.city)
                .collect::<Vec<_>>(),
            ["B", "C", "D", "E"]
        );
        assert_eq!(graph.distance("A", "C"), Some(1.0));
    }

    #[test]
    fn test_self_loop_is_ignored() {
        let graph = RouteGraph::from_edges(&[edge("A", "A", 0.0)]).unwrap();
        assert_eq!(graph.size(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_rejects_malformed_edges() {
        assert_eq!(
            RouteGraph::from_edges(&[edge("", "B", 10.0)]).unwrap_err(),
            RouteError::EmptyCity
        );
        assert_eq!(
            RouteGraph::from_edges(&[edge("A", "", 10.0)]).unwrap_err(),
            RouteError::EmptyCity
        );
        assert_eq!(
            RouteGraph::from_edges(&[edge("A", "B", -1.0)]).unwrap_err(),
            RouteError::NegativeDistance
        );
        assert_eq!(
            RouteGraph::from_edges(&[edge("A", "B", f64::NAN)]).unwrap_err(),
            RouteError::NonFiniteDistance
        );
        assert_eq!(
            RouteGraph::from_edges(&[edge("A", "B", f64::INFINITY)]).unwrap_err(),
            RouteError::NonFiniteDistance
        );
    }
}
