use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::lattice::params::PricingParameters;
use crate::PricingResult;

/// Per-step movement derived from volatility and step length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeFactors {
    pub t_step: f64,
    pub up: f64,
    pub down: f64,
}

impl LatticeFactors {
    /// `u = e^{sigma sqrt(dt)}`, `d = e^{-sigma sqrt(dt)}`, so `u * d = 1`.
    pub fn new(volatility: f64, t_step: f64) -> Self {
        let move_size = volatility * t_step.sqrt();
        LatticeFactors {
            t_step,
            up: move_size.exp(),
            down: (-move_size).exp(),
        }
    }

    pub fn from_params(params: &PricingParameters) -> Self {
        LatticeFactors::new(params.volatility, params.t_step())
    }
}

/// One reachable price: `down_moves` of the `step` moves so far were down-moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeNode {
    pub step: u32,
    pub down_moves: u32,
    pub price: f64,
}

/// Recombining price lattice.
///
/// Stored packed by step: step `i` occupies `i + 1` consecutive cells ordered by
/// down-move count, so only the `(steps + 1)(steps + 2) / 2` reachable nodes exist.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLattice {
    steps: u32,
    cells: Vec<f64>,
}

pub(crate) fn offset(step: u32) -> usize {
    let i = step as usize;
    i * (i + 1) / 2
}

impl PriceLattice {
    /// Fill every cell `[j, i]` with `current_price * u^(i-j) * d^j`.
    pub fn build(current_price: f64, factors: &LatticeFactors, steps: u32) -> Self {
        let mut cells = Vec::with_capacity(offset(steps + 1));
        for i in 0..=steps {
            for j in 0..=i {
                let ups = (i - j) as i32;
                let downs = j as i32;
                cells.push(current_price * factors.up.powi(ups) * factors.down.powi(downs));
            }
        }
        PriceLattice { steps, cells }
    }

    /// Build from validated parameters, refusing lattices whose extremes overflow.
    pub fn from_params(params: &PricingParameters) -> PricingResult<(LatticeFactors, Self)> {
        let factors = LatticeFactors::from_params(params);
        tracing::debug!(
            u = factors.up,
            d = factors.down,
            t_step = factors.t_step,
            steps = params.steps,
            "building price lattice"
        );
        let lattice = PriceLattice::build(params.current_price, &factors, params.steps);
        if let Some(bad) = lattice.terminal().iter().find(|p| !p.is_finite()) {
            return Err(PricingError::numeric(
                "lattice construction",
                format!(
                    "terminal price {bad} at {} steps; volatility {} over {} years is out of range",
                    params.steps, params.volatility, params.expiration
                ),
            ));
        }
        Ok((factors, lattice))
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Price after `step` moves with `down_moves` down-moves; `None` outside the triangle.
    pub fn get(&self, down_moves: u32, step: u32) -> Option<f64> {
        if step > self.steps || down_moves > step {
            return None;
        }
        self.cells.get(offset(step) + down_moves as usize).copied()
    }

    /// All prices reachable after `step` moves, from all-up to all-down.
    pub fn column(&self, step: u32) -> &[f64] {
        if step > self.steps {
            return &[];
        }
        &self.cells[offset(step)..offset(step + 1)]
    }

    pub fn terminal(&self) -> &[f64] {
        self.column(self.steps)
    }

    pub fn populated_cells(&self) -> usize {
        self.cells.len()
    }

    /// Columns as owned rows, the shape renderers consume.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..=self.steps).map(|i| self.column(i).to_vec()).collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = LatticeNode> + '_ {
        (0..=self.steps).flat_map(move |step| {
            self.column(step)
                .iter()
                .enumerate()
                .map(move |(j, &price)| LatticeNode {
                    step,
                    down_moves: j as u32,
                    price,
                })
        })
    }

    /// Each node paired with its up-child and down-child.
    pub fn edges(&self) -> impl Iterator<Item = (LatticeNode, LatticeNode)> + '_ {
        self.nodes()
            .filter(move |n| n.step < self.steps)
            .flat_map(move |n| {
                [n.down_moves, n.down_moves + 1].into_iter().map(move |j| {
                    let child = LatticeNode {
                        step: n.step + 1,
                        down_moves: j,
                        price: self.cells[offset(n.step + 1) + j as usize],
                    };
                    (n, child)
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn reference_params() -> PricingParameters {
        PricingParameters {
            current_price: 100.0,
            strike: 100.0,
            volatility: 0.2,
            risk_free_rate: 0.05,
            expiration: 1.0,
            steps: 2,
        }
    }

    #[test]
    fn test_reference_factors() {
        let f = LatticeFactors::from_params(&reference_params());
        assert_eq!(f.t_step, 0.5);
        assert!(approx_eq(f.up, 1.151909910168909, 1e-14));
        assert!(approx_eq(f.down, 0.8681234453945849, 1e-14));
        assert!(approx_eq(f.up * f.down, 1.0, 1e-15));
    }

    #[test]
    fn test_reference_lattice() {
        let (_, lattice) = PriceLattice::from_params(&reference_params()).unwrap();
        assert_eq!(lattice.populated_cells(), 6);
        assert_eq!(lattice.get(0, 0), Some(100.0));
        assert!(approx_eq(lattice.get(0, 2).unwrap(), 132.6896441145344, 1e-10));
        assert!(approx_eq(lattice.get(1, 2).unwrap(), 100.0, 1e-10));
        assert!(approx_eq(lattice.get(2, 2).unwrap(), 75.36383164437648, 1e-10));
        assert_eq!(lattice.get(3, 2), None);
        assert_eq!(lattice.get(0, 3), None);
    }

    #[test]
    fn test_zero_volatility_is_flat() {
        let f = LatticeFactors::new(0.0, 0.25);
        let lattice = PriceLattice::build(42.0, &f, 4);
        assert!(lattice.nodes().all(|n| n.price == 42.0));
    }

    #[test]
    fn test_column_bounds() {
        let f = LatticeFactors::new(0.3, 0.1);
        let lattice = PriceLattice::build(10.0, &f, 5);
        assert_eq!(lattice.column(0).len(), 1);
        assert_eq!(lattice.terminal().len(), 6);
        assert!(lattice.column(6).is_empty());
        assert_eq!(lattice.rows().len(), 6);
    }

    #[test]
    fn test_edges_connect_children() {
        let f = LatticeFactors::new(0.3, 0.1);
        let lattice = PriceLattice::build(10.0, &f, 3);
        let edges: Vec<_> = lattice.edges().collect();
        // two children for each of the 1 + 2 + 3 non-terminal nodes
        assert_eq!(edges.len(), 12);
        for (parent, child) in edges {
            assert_eq!(child.step, parent.step + 1);
            assert!(child.down_moves == parent.down_moves || child.down_moves == parent.down_moves + 1);
        }
    }

    #[test]
    fn test_overflow_is_numeric_anomaly() {
        let params = PricingParameters {
            volatility: 400.0,
            expiration: 5.0,
            steps: 500,
            ..reference_params()
        };
        match PriceLattice::from_params(&params) {
            Err(PricingError::NumericAnomaly { context, .. }) => {
                assert_eq!(context, "lattice construction")
            }
            other => panic!("Expected NumericAnomaly, got {other:?}"),
        }
    }
}
