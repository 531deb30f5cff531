//! Depth-first branch-and-bound with bounds propagation.
//!
//! Constraints are normalized into `sum(a_i * x_i) <= b` and
//! `sum(a_i * x_i) != b` rows over interval domains, divided by the gcd of
//! their coefficients. Pairs of `<=` rows that cancel a variable are also
//! summed into extra rows, which exposes conflicts such as `x < y, y < x`
//! that interval reasoning alone only finds one unit at a time. Each node
//! propagates the rows to a fixpoint, then bisects the smallest open domain. With an
//! objective, every improving solution tightens a cut row and the search
//! continues until the tree is exhausted.
//!
//! All arithmetic is in `i128`; [`CpModel::validate`] guarantees the
//! magnitudes involved stay far from its limits.

use super::linear::{CmpOp, LinearConstraint};
use super::model::{CpModel, Objective};
use super::solver::{SolverConfig, SolverStatus};
use super::variables::VarId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Propagation passes per node before falling back to branching.
const MAX_PROPAGATION_ROUNDS: usize = 10_000;

/// Cap on rows derived from pairwise sums.
const MAX_DERIVED_ROWS: usize = 4_096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    lo: i64,
    hi: i64,
}

impl Bounds {
    fn is_fixed(self) -> bool {
        self.lo == self.hi
    }

    fn width(self) -> i128 {
        self.hi as i128 - self.lo as i128
    }
}

/// Marker for an empty domain or a violated row.
#[derive(Debug)]
struct Conflict;

#[derive(Debug, Clone)]
enum Row {
    /// `sum(a_i * x_i) <= rhs`
    Le { terms: Vec<(usize, i128)>, rhs: i128 },
    /// `sum(a_i * x_i) != rhs`
    Ne { terms: Vec<(usize, i128)>, rhs: i128 },
}

impl Row {
    fn from_constraint(c: &LinearConstraint) -> Vec<Row> {
        let terms: Vec<(usize, i128)> = c
            .expr
            .terms()
            .iter()
            .map(|&(v, a)| (v.index(), a as i128))
            .collect();
        let negated: Vec<(usize, i128)> = terms.iter().map(|&(i, a)| (i, -a)).collect();
        let k = c.expr.constant_term() as i128;
        match c.op {
            CmpOp::Le => vec![Row::Le { terms, rhs: -k }],
            CmpOp::Lt => vec![Row::Le { terms, rhs: -k - 1 }],
            CmpOp::Ge => vec![Row::Le { terms: negated, rhs: k }],
            CmpOp::Gt => vec![Row::Le { terms: negated, rhs: k - 1 }],
            CmpOp::Eq => vec![
                Row::Le { terms, rhs: -k },
                Row::Le { terms: negated, rhs: k },
            ],
            CmpOp::Ne => vec![Row::Ne { terms, rhs: -k }],
        }
    }

    /// Divides the row by the gcd of its coefficients. For `<=` the
    /// right-hand side rounds down; a `!=` row whose right-hand side is not
    /// a multiple can never be violated and is dropped.
    fn normalized(self) -> Option<Row> {
        match self {
            Row::Le { terms, rhs } => {
                let g = terms_gcd(&terms);
                if g <= 1 {
                    return Some(Row::Le { terms, rhs });
                }
                Some(Row::Le {
                    terms: terms.into_iter().map(|(i, a)| (i, a / g)).collect(),
                    rhs: floor_div(rhs, g),
                })
            }
            Row::Ne { terms, rhs } => {
                let g = terms_gcd(&terms);
                if g <= 1 {
                    return Some(Row::Ne { terms, rhs });
                }
                if rhs % g != 0 {
                    return None;
                }
                Some(Row::Ne {
                    terms: terms.into_iter().map(|(i, a)| (i, a / g)).collect(),
                    rhs: rhs / g,
                })
            }
        }
    }

    /// Cut requiring the objective to strictly improve on `best`.
    fn objective_cut(objective: &Objective, best: i128) -> Row {
        let expr = objective.expr();
        let k = expr.constant_term() as i128;
        let terms = expr.terms().iter().map(|&(v, a)| (v.index(), a as i128));
        if objective.is_maximize() {
            // expr >= best + 1
            Row::Le {
                terms: terms.map(|(i, a)| (i, -a)).collect(),
                rhs: k - best - 1,
            }
        } else {
            // expr <= best - 1
            Row::Le {
                terms: terms.collect(),
                rhs: best - 1 - k,
            }
        }
    }

    fn is_satisfied(&self, values: &[i64]) -> bool {
        match self {
            Row::Le { terms, rhs } => dot(terms, values) <= *rhs,
            Row::Ne { terms, rhs } => dot(terms, values) != *rhs,
        }
    }

    /// Tightens `doms`; returns whether any bound moved.
    fn propagate(&self, doms: &mut [Bounds]) -> Result<bool, Conflict> {
        match self {
            Row::Le { terms, rhs } => propagate_le(terms, *rhs, doms),
            Row::Ne { terms, rhs } => propagate_ne(terms, *rhs, doms),
        }
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn terms_gcd(terms: &[(usize, i128)]) -> i128 {
    terms.iter().fold(0, |g, &(_, a)| gcd(g, a))
}

/// Sum of two `<=` rows when it eliminates at least one variable.
fn combine(left: &[(usize, i128)], left_rhs: i128, right: &[(usize, i128)], right_rhs: i128) -> Option<Row> {
    let cancels = left
        .iter()
        .any(|&(i, a)| right.iter().any(|&(j, b)| i == j && a == -b));
    if !cancels {
        return None;
    }
    let mut terms: Vec<(usize, i128)> = left.to_vec();
    for &(j, b) in right {
        match terms.iter_mut().find(|(i, _)| *i == j) {
            Some((_, a)) => *a += b,
            None => terms.push((j, b)),
        }
    }
    terms.retain(|&(_, a)| a != 0);
    Row::Le {
        terms,
        rhs: left_rhs + right_rhs,
    }
    .normalized()
}

/// Pairwise sums of the `<=` rows that cancel a variable.
fn derived_rows(rows: &[Row]) -> Vec<Row> {
    let le: Vec<(&[(usize, i128)], i128)> = rows
        .iter()
        .filter_map(|row| match row {
            Row::Le { terms, rhs } => Some((terms.as_slice(), *rhs)),
            Row::Ne { .. } => None,
        })
        .collect();
    let mut derived = Vec::new();
    for (k, &(left, left_rhs)) in le.iter().enumerate() {
        for &(right, right_rhs) in &le[k + 1..] {
            if derived.len() >= MAX_DERIVED_ROWS {
                return derived;
            }
            derived.extend(combine(left, left_rhs, right, right_rhs));
        }
    }
    derived
}

fn dot(terms: &[(usize, i128)], values: &[i64]) -> i128 {
    terms.iter().map(|&(i, a)| a * values[i] as i128).sum()
}

fn term_min(a: i128, d: Bounds) -> i128 {
    if a >= 0 {
        a * d.lo as i128
    } else {
        a * d.hi as i128
    }
}

fn floor_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && ((n % d < 0) != (d < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && ((n % d < 0) == (d < 0)) {
        q + 1
    } else {
        q
    }
}

// x[i] <= (rhs - sum_{j != i} min(a_j * x_j)) / a_i, flipped for a_i < 0
fn propagate_le(terms: &[(usize, i128)], rhs: i128, doms: &mut [Bounds]) -> Result<bool, Conflict> {
    let min_sum: i128 = terms.iter().map(|&(i, a)| term_min(a, doms[i])).sum();
    if min_sum > rhs {
        return Err(Conflict);
    }
    let mut changed = false;
    for &(i, a) in terms {
        let d = doms[i];
        let slack = rhs - (min_sum - term_min(a, d));
        if a > 0 {
            let ub = floor_div(slack, a);
            if ub < d.hi as i128 {
                if ub < d.lo as i128 {
                    return Err(Conflict);
                }
                doms[i].hi = ub as i64;
                changed = true;
            }
        } else {
            let lb = ceil_div(slack, a);
            if lb > d.lo as i128 {
                if lb > d.hi as i128 {
                    return Err(Conflict);
                }
                doms[i].lo = lb as i64;
                changed = true;
            }
        }
    }
    Ok(changed)
}

// Only acts once at most one variable is open: removes the forbidden value
// when it sits on a bound.
fn propagate_ne(terms: &[(usize, i128)], rhs: i128, doms: &mut [Bounds]) -> Result<bool, Conflict> {
    let mut fixed_sum = 0i128;
    let mut open = None;
    for &(i, a) in terms {
        let d = doms[i];
        if d.is_fixed() {
            fixed_sum += a * d.lo as i128;
        } else if open.is_some() {
            return Ok(false);
        } else {
            open = Some((i, a));
        }
    }
    let Some((i, a)) = open else {
        return if fixed_sum == rhs {
            Err(Conflict)
        } else {
            Ok(false)
        };
    };
    let target = rhs - fixed_sum;
    if target % a != 0 {
        return Ok(false);
    }
    let forbidden = target / a;
    let d = doms[i];
    if forbidden == d.lo as i128 {
        doms[i].lo += 1;
        Ok(true)
    } else if forbidden == d.hi as i128 {
        doms[i].hi -= 1;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Outcome of one search.
#[derive(Debug, Clone)]
pub(super) struct SearchOutcome {
    pub status: SolverStatus,
    pub values: Vec<i64>,
    pub objective: Option<i128>,
    pub nodes: u64,
}

/// One search over one model. Never reused across models.
pub(super) struct Search<'a> {
    model: &'a CpModel,
    config: &'a SolverConfig,
    cancel: Option<&'a AtomicBool>,
    rows: Vec<Row>,
    /// Per variable: try the upper half of a split first.
    prefer_high: Vec<bool>,
    started: Instant,
    nodes: u64,
}

impl<'a> Search<'a> {
    pub fn new(
        model: &'a CpModel,
        config: &'a SolverConfig,
        started: Instant,
        cancel: Option<&'a AtomicBool>,
    ) -> Self {
        let mut rows: Vec<Row> = model
            .constraints
            .iter()
            .flat_map(Row::from_constraint)
            .filter_map(Row::normalized)
            .collect();
        let derived = derived_rows(&rows);
        rows.extend(derived);
        let prefer_high = (0..model.int_vars.len())
            .map(|i| match &model.objective {
                Some(obj) => {
                    let coef = obj.expr().coefficient(VarId(i));
                    if obj.is_maximize() {
                        coef > 0
                    } else {
                        coef < 0
                    }
                }
                None => false,
            })
            .collect();
        Self {
            model,
            config,
            cancel,
            rows,
            prefer_high,
            started,
            nodes: 0,
        }
    }

    pub fn run(mut self) -> SearchOutcome {
        let root: Vec<Bounds> = self
            .model
            .int_vars
            .iter()
            .map(|v| Bounds {
                lo: v.min,
                hi: v.max,
            })
            .collect();
        let time_limit =
            (self.config.time_limit_ms > 0).then(|| Duration::from_millis(self.config.time_limit_ms));

        let mut stack = vec![root];
        let mut cut: Option<Row> = None;
        let mut best: Option<(Vec<i64>, i128)> = None;
        let mut limited = false;

        while let Some(mut doms) = stack.pop() {
            if self.config.node_limit > 0 && self.nodes >= self.config.node_limit {
                limited = true;
                break;
            }
            if time_limit.is_some_and(|limit| self.started.elapsed() >= limit) {
                limited = true;
                break;
            }
            if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                tracing::trace!(nodes = self.nodes, "search cancelled");
                limited = true;
                break;
            }
            self.nodes += 1;

            if self.propagate(&mut doms, cut.as_ref()).is_err() {
                continue;
            }

            if let Some(i) = select_var(&doms) {
                let (low, high) = split(&doms, i);
                if self.prefer_high[i] {
                    stack.push(low);
                    stack.push(high);
                } else {
                    stack.push(high);
                    stack.push(low);
                }
                continue;
            }

            let values: Vec<i64> = doms.iter().map(|d| d.lo).collect();
            if !self
                .rows
                .iter()
                .chain(cut.as_ref())
                .all(|row| row.is_satisfied(&values))
            {
                continue;
            }

            let Some(objective) = &self.model.objective else {
                return self.finish(SolverStatus::Optimal, values, None);
            };
            let value = objective.expr().evaluate(&values);
            tracing::trace!(objective = %value, nodes = self.nodes, "improving solution");
            cut = Some(Row::objective_cut(objective, value));
            best = Some((values, value));
            if self.config.stop_after_first {
                limited = true;
                break;
            }
        }

        match best {
            Some((values, value)) => {
                let status = if limited {
                    SolverStatus::Feasible
                } else {
                    SolverStatus::Optimal
                };
                self.finish(status, values, Some(value))
            }
            None => {
                let status = if limited {
                    SolverStatus::Unknown
                } else {
                    SolverStatus::Infeasible
                };
                self.finish(status, Vec::new(), None)
            }
        }
    }

    fn propagate(&self, doms: &mut [Bounds], cut: Option<&Row>) -> Result<(), Conflict> {
        for _ in 0..MAX_PROPAGATION_ROUNDS {
            let mut changed = false;
            for row in self.rows.iter().chain(cut) {
                changed |= row.propagate(doms)?;
            }
            if !changed {
                break;
            }
        }
        Ok(())
    }

    fn finish(&self, status: SolverStatus, values: Vec<i64>, objective: Option<i128>) -> SearchOutcome {
        tracing::trace!(status = %status, nodes = self.nodes, "search finished");
        SearchOutcome {
            status,
            values,
            objective,
            nodes: self.nodes,
        }
    }
}

/// Smallest open domain, lowest index on ties.
fn select_var(doms: &[Bounds]) -> Option<usize> {
    doms.iter()
        .enumerate()
        .filter(|(_, d)| !d.is_fixed())
        .min_by_key(|(_, d)| d.width())
        .map(|(i, _)| i)
}

fn split(doms: &[Bounds], i: usize) -> (Vec<Bounds>, Vec<Bounds>) {
    let d = doms[i];
    let mid = (d.lo as i128 + d.width() / 2) as i64;
    let mut low = doms.to_vec();
    let mut high = doms.to_vec();
    low[i].hi = mid;
    high[i].lo = mid + 1;
    (low, high)
}
