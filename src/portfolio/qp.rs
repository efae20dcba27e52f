//! # Long-only Quadratic Programs
//!
//! $$
//! \min_{x \ge 0} \ \tfrac12 x^\top P x \quad \text{s.t.} \quad E x = b
//! $$
//!
//! Thin layer over the Clarabel interior-point solver for the non-negative,
//! equality-constrained QPs the optimizers need.

use clarabel::algebra::CscMatrix;
use clarabel::solver::DefaultSettingsBuilder;
use clarabel::solver::DefaultSolver;
use clarabel::solver::IPSolver;
use clarabel::solver::SolverStatus;
use clarabel::solver::SupportedConeT;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView2;
use tracing::debug;

use crate::error::AnalyticsError;
use crate::error::Result;

/// Interior-point solver limits.
#[derive(Clone, Copy, Debug)]
pub struct SolverSettings {
  pub max_iter: u32,
  pub tolerance: f64,
}

impl Default for SolverSettings {
  fn default() -> Self {
    Self {
      max_iter: 200,
      tolerance: 1e-9,
    }
  }
}

/// Terminal state of a QP solve.
#[derive(Clone, Debug, PartialEq)]
pub enum QpOutcome {
  /// Optimal primal solution.
  Solved(Array1<f64>),
  /// The equality constraints cannot be met with `x >= 0`.
  Infeasible,
}

/// `min 0.5 x'Px` subject to `eq_matrix x = eq_rhs` and `x >= 0`.
///
/// Only the upper triangle of `p` is read.
pub fn solve_nonneg_qp(
  p: ArrayView2<f64>,
  eq_matrix: ArrayView2<f64>,
  eq_rhs: &[f64],
  settings: &SolverSettings,
) -> Result<QpOutcome> {
  let n = p.nrows();
  let m_eq = eq_matrix.nrows();
  if p.ncols() != n || eq_matrix.ncols() != n || eq_rhs.len() != m_eq {
    return Err(AnalyticsError::Optimization(format!(
      "inconsistent QP dimensions: P {:?}, E {:?}, b {}",
      p.dim(),
      eq_matrix.dim(),
      eq_rhs.len()
    )));
  }

  // Rows: equalities (zero cone) followed by -x + s = 0 (non-negative cone).
  let mut a = Array2::<f64>::zeros((m_eq + n, n));
  a.slice_mut(ndarray::s![..m_eq, ..]).assign(&eq_matrix);
  for i in 0..n {
    a[[m_eq + i, i]] = -1.0;
  }
  let mut b = eq_rhs.to_vec();
  b.extend(std::iter::repeat(0.0).take(n));

  let p_csc = dense_to_csc(p, true);
  let a_csc = dense_to_csc(a.view(), false);
  let q = vec![0.0; n];
  let cones = [
    SupportedConeT::ZeroConeT(m_eq),
    SupportedConeT::NonnegativeConeT(n),
  ];

  let settings = DefaultSettingsBuilder::default()
    .verbose(false)
    .max_iter(settings.max_iter)
    .tol_gap_abs(settings.tolerance)
    .tol_gap_rel(settings.tolerance)
    .tol_feas(settings.tolerance)
    .build()
    .map_err(|e| AnalyticsError::Solver(e.to_string()))?;

  let mut solver = DefaultSolver::new(&p_csc, &q, &a_csc, &b, &cones, settings);
  solver.solve();

  let status = solver.solution.status;
  debug!(
    ?status,
    iterations = solver.info.iterations,
    n,
    m_eq,
    "qp solve finished"
  );

  match status {
    SolverStatus::Solved | SolverStatus::AlmostSolved => {
      Ok(QpOutcome::Solved(Array1::from(solver.solution.x.clone())))
    }
    SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
      Ok(QpOutcome::Infeasible)
    }
    other => Err(AnalyticsError::Solver(format!("{other:?}"))),
  }
}

/// Dense to compressed-sparse-column, optionally keeping only the upper triangle.
fn dense_to_csc(dense: ArrayView2<f64>, upper_only: bool) -> CscMatrix<f64> {
  let (m, n) = dense.dim();
  let mut colptr = Vec::with_capacity(n + 1);
  let mut rowval = Vec::new();
  let mut nzval = Vec::new();

  colptr.push(0);
  for j in 0..n {
    let rows = if upper_only { (j + 1).min(m) } else { m };
    for i in 0..rows {
      let v = dense[[i, j]];
      if v != 0.0 {
        rowval.push(i);
        nzval.push(v);
      }
    }
    colptr.push(rowval.len());
  }

  CscMatrix::new(m, n, colptr, rowval, nzval)
}
