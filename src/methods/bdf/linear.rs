//! Linear solvers for the Newton iteration matrix `I - c·J`.

use crate::{
    Float,
    matrix::{Gmres, Lu, Matrix, SingularMatrix},
    methods::result::Stats,
    ode::OdeSystem,
    session::Variant,
};

use super::wrms;

/// Krylov dimension of the matrix-free solver.
const MAXL: usize = 5;
/// Ratio of the linear tolerance to the Newton tolerance.
const EPLIN: Float = 0.05;

/// Newton linear solver, fixed by the session variant.
#[derive(Clone, Debug)]
pub(crate) enum Linear {
    Dense(DenseNewton),
    MatrixFree(MatrixFree),
}

impl Linear {
    pub fn new(variant: Variant, n: usize) -> Self {
        match variant {
            Variant::Dense => Linear::Dense(DenseNewton::new(n, false)),
            Variant::DenseAnalyticJacobian => Linear::Dense(DenseNewton::new(n, true)),
            Variant::MatrixFree => Linear::MatrixFree(MatrixFree::new(n)),
        }
    }

    /// `true` when the solver keeps a Jacobian that can go stale between steps.
    pub fn stores_jacobian(&self) -> bool {
        matches!(self, Linear::Dense(_))
    }

    /// Drop the factored iteration matrix; the next solve needs a setup.
    pub fn invalidate(&mut self) {
        match self {
            Linear::Dense(dense) => dense.lu = None,
            Linear::MatrixFree(mf) => mf.c = None,
        }
    }

    /// Whether [`setup`](Self::setup) must run before solving with `c`.
    pub fn needs_setup(&self, c: Float) -> bool {
        match self {
            Linear::Dense(dense) => dense.lu.is_none() || dense.c != c,
            Linear::MatrixFree(mf) => mf.c != Some(c),
        }
    }

    /// Prepare for solves with `I - c·J` at `(t, y)`, where `fy = f(t, y)`.
    ///
    /// With `refresh` the dense solver re-evaluates its Jacobian first.
    pub fn setup<S>(
        &mut self,
        system: &S,
        t: Float,
        y: &[Float],
        fy: &[Float],
        c: Float,
        h: Float,
        scale: &[Float],
        refresh: bool,
        stats: &mut Stats,
    ) -> Result<(), SingularMatrix>
    where
        S: OdeSystem + ?Sized,
    {
        stats.lin_setups += 1;
        match self {
            Linear::Dense(dense) => {
                if refresh {
                    dense.evaluate_jacobian(system, t, y, fy, h, scale, stats);
                }
                dense.factor(c)
            }
            Linear::MatrixFree(mf) => {
                mf.c = Some(c);
                Ok(())
            }
        }
    }

    /// Overwrite `b` with the solution of `(I - c·J) x = b`.
    ///
    /// `(t, y, fy)` is the current Newton iterate, used by the matrix-free solver
    /// for its difference quotients. Returns `false` when the solve failed to make
    /// progress and the Newton iteration should give up.
    pub fn solve<S>(
        &mut self,
        system: &S,
        t: Float,
        y: &[Float],
        fy: &[Float],
        scale: &[Float],
        tol: Float,
        b: &mut [Float],
        stats: &mut Stats,
    ) -> bool
    where
        S: OdeSystem + ?Sized,
    {
        match self {
            Linear::Dense(dense) => match &dense.lu {
                Some(lu) => {
                    lu.solve_mut(b);
                    true
                }
                None => false,
            },
            Linear::MatrixFree(mf) => mf.solve(system, t, y, fy, scale, tol, b, stats),
        }
    }
}

/// Dense Jacobian with an LU-factored iteration matrix.
#[derive(Clone, Debug)]
pub(crate) struct DenseNewton {
    analytic: bool,
    jac: Matrix,
    lu: Option<Lu>,
    /// `c` the current factors were built with.
    c: Float,
    ytmp: Vec<Float>,
    ftmp: Vec<Float>,
}

impl DenseNewton {
    fn new(n: usize, analytic: bool) -> Self {
        Self {
            analytic,
            jac: Matrix::zeros(n),
            lu: None,
            c: 0.0,
            ytmp: vec![0.0; n],
            ftmp: vec![0.0; n],
        }
    }

    fn evaluate_jacobian<S>(
        &mut self,
        system: &S,
        t: Float,
        y: &[Float],
        fy: &[Float],
        h: Float,
        scale: &[Float],
        stats: &mut Stats,
    ) where
        S: OdeSystem + ?Sized,
    {
        stats.jac_evals += 1;
        log::trace!("jacobian refresh at t = {t}");
        self.jac.fill(0.0);
        if self.analytic {
            system.jacobian(t, y, fy, &mut self.jac);
            return;
        }

        // Forward differences, one column per right-hand side evaluation
        let n = y.len();
        let uround = Float::EPSILON;
        let srur = uround.sqrt();
        let fnorm = wrms(fy, scale);
        let min_inc = if fnorm != 0.0 {
            1000.0 * h.abs() * uround * n as Float * fnorm
        } else {
            1.0
        };

        self.ytmp.copy_from_slice(y);
        for j in 0..n {
            let yj = self.ytmp[j];
            let inc = (srur * yj.abs()).max(min_inc * scale[j]);
            self.ytmp[j] = yj + inc;
            system.rhs(t, &self.ytmp, &mut self.ftmp);
            stats.rhs_evals_jac += 1;
            let inv = 1.0 / inc;
            for (col, (fi, f0)) in self
                .jac
                .column_mut(j)
                .iter_mut()
                .zip(self.ftmp.iter().zip(fy))
            {
                *col = (fi - f0) * inv;
            }
            self.ytmp[j] = yj;
        }
    }

    fn factor(&mut self, c: Float) -> Result<(), SingularMatrix> {
        let n = self.jac.n();
        let mut m = Matrix::identity(n);
        for (mij, jij) in m.as_mut_slice().iter_mut().zip(self.jac.as_slice()) {
            *mij -= c * jij;
        }
        self.lu = None;
        let lu = Lu::factor(&m)?;
        self.lu = Some(lu);
        self.c = c;
        Ok(())
    }
}

/// GMRES on `I - c·J` with difference-quotient Jacobian-vector products.
#[derive(Clone, Debug)]
pub(crate) struct MatrixFree {
    gmres: Gmres,
    c: Option<Float>,
    x: Vec<Float>,
    ytmp: Vec<Float>,
    ftmp: Vec<Float>,
}

impl MatrixFree {
    fn new(n: usize) -> Self {
        Self {
            gmres: Gmres::new(n, MAXL),
            c: None,
            x: vec![0.0; n],
            ytmp: vec![0.0; n],
            ftmp: vec![0.0; n],
        }
    }

    fn solve<S>(
        &mut self,
        system: &S,
        t: Float,
        y: &[Float],
        fy: &[Float],
        scale: &[Float],
        tol: Float,
        b: &mut [Float],
        stats: &mut Stats,
    ) -> bool
    where
        S: OdeSystem + ?Sized,
    {
        let Some(c) = self.c else {
            return false;
        };
        let Self {
            gmres,
            x,
            ytmp,
            ftmp,
            ..
        } = self;

        let mut evals = 0;
        // A·v = v - c·(f(t, y + σv) - f(t, y)) / σ with σ = 1 / ‖v‖
        let apply = |v: &[Float], av: &mut [Float]| {
            let vnorm = wrms(v, scale);
            if vnorm == 0.0 {
                av.fill(0.0);
                return;
            }
            let sigma = 1.0 / vnorm;
            for ((yt, yi), vi) in ytmp.iter_mut().zip(y).zip(v) {
                *yt = yi + sigma * vi;
            }
            system.rhs(t, ytmp.as_slice(), ftmp.as_mut_slice());
            evals += 1;
            for (((a, vi), fi), f0) in av.iter_mut().zip(v).zip(ftmp.iter()).zip(fy) {
                *a = vi - c * (fi - f0) / sigma;
            }
        };
        let outcome = gmres.solve(apply, b, scale, EPLIN * tol, x);

        stats.rhs_evals_jac += evals;
        stats.linear_iters += outcome.iterations;
        if !outcome.reduced() || x.iter().any(|v| !v.is_finite()) {
            return false;
        }
        b.copy_from_slice(x);
        true
    }
}
