use serde::{Deserialize, Serialize};

use crate::config::ProbabilityWeighting;
use crate::error::PricingError;
use crate::lattice::tree::{offset, LatticeFactors, PriceLattice};
use crate::types::OptionType;
use crate::PricingResult;

/// Per-step discount and branch weighting used by backward induction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchWeights {
    pub weighting: ProbabilityWeighting,
    /// `e^{-r dt}`
    pub discount: f64,
    pub up_probability: f64,
}

impl BranchWeights {
    pub fn new(
        weighting: ProbabilityWeighting,
        factors: &LatticeFactors,
        risk_free_rate: f64,
    ) -> PricingResult<Self> {
        let discount = (-risk_free_rate * factors.t_step).exp();
        let up_probability = match weighting {
            ProbabilityWeighting::Equal => 0.5,
            ProbabilityWeighting::RiskNeutral => {
                let spread = factors.up - factors.down;
                if spread <= 0.0 {
                    return Err(PricingError::invalid(
                        "volatility",
                        "must be positive for risk-neutral weighting",
                    ));
                }
                let p = ((risk_free_rate * factors.t_step).exp() - factors.down) / spread;
                if !(0.0..=1.0).contains(&p) {
                    return Err(PricingError::invalid(
                        "volatility",
                        format!(
                            "risk-neutral up-probability {p:.6} falls outside [0, 1]; \
                             raise volatility or steps relative to the rate"
                        ),
                    ));
                }
                p
            }
        };
        Ok(BranchWeights {
            weighting,
            discount,
            up_probability,
        })
    }

    /// Discounted expectation of a node's two children.
    #[inline]
    pub fn combine(&self, up_child: f64, down_child: f64) -> f64 {
        match self.weighting {
            ProbabilityWeighting::Equal => self.discount * 0.5 * (up_child + down_child),
            ProbabilityWeighting::RiskNeutral => {
                self.discount
                    * (self.up_probability * up_child + (1.0 - self.up_probability) * down_child)
            }
        }
    }
}

/// Option values over the whole lattice, same packing as [`PriceLattice`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueLattice {
    option_type: OptionType,
    steps: u32,
    cells: Vec<f64>,
}

impl ValueLattice {
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn get(&self, down_moves: u32, step: u32) -> Option<f64> {
        if step > self.steps || down_moves > step {
            return None;
        }
        self.cells.get(offset(step) + down_moves as usize).copied()
    }

    pub fn column(&self, step: u32) -> &[f64] {
        if step > self.steps {
            return &[];
        }
        &self.cells[offset(step)..offset(step + 1)]
    }

    /// Present value of the option.
    pub fn root(&self) -> f64 {
        self.cells[0]
    }
}

/// Terminal payoffs for every node at expiration.
pub fn terminal_payoffs(lattice: &PriceLattice, option_type: OptionType, strike: f64) -> Vec<f64> {
    lattice
        .terminal()
        .iter()
        .map(|&price| option_type.payoff(price, strike))
        .collect()
}

/// Full backward induction, keeping every intermediate value.
pub fn value_lattice(
    lattice: &PriceLattice,
    option_type: OptionType,
    strike: f64,
    weights: &BranchWeights,
) -> ValueLattice {
    let steps = lattice.steps();
    let mut cells = vec![0.0; offset(steps + 1)];
    let terminal = offset(steps);
    cells[terminal..].copy_from_slice(&terminal_payoffs(lattice, option_type, strike));

    for i in (0..steps).rev() {
        let here = offset(i);
        let next = offset(i + 1);
        for j in 0..=i as usize {
            cells[here + j] = weights.combine(cells[next + j], cells[next + j + 1]);
        }
    }

    ValueLattice {
        option_type,
        steps,
        cells,
    }
}

/// Root value and its two children, from a single rolling column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootValue {
    pub value: f64,
    pub up_child: f64,
    pub down_child: f64,
}

/// Backward induction in `O(steps)` space. Same arithmetic as [`value_lattice`].
pub fn root_value(
    lattice: &PriceLattice,
    option_type: OptionType,
    strike: f64,
    weights: &BranchWeights,
) -> RootValue {
    let mut column = terminal_payoffs(lattice, option_type, strike);
    let mut children = (column[0], column.get(1).copied().unwrap_or(column[0]));

    for i in (0..lattice.steps()).rev() {
        if i == 0 {
            children = (column[0], column[1]);
        }
        for j in 0..=i as usize {
            column[j] = weights.combine(column[j], column[j + 1]);
        }
        column.truncate(i as usize + 1);
    }

    RootValue {
        value: column[0],
        up_child: children.0,
        down_child: children.1,
    }
}

/// Hedge ratio at the root: change in option value per change in underlying over step one.
pub fn root_delta(lattice: &PriceLattice, root: &RootValue) -> Option<f64> {
    let up = lattice.get(0, 1)?;
    let down = lattice.get(1, 1)?;
    let spread = up - down;
    if spread == 0.0 {
        return None;
    }
    Some((root.up_child - root.down_child) / spread)
}
