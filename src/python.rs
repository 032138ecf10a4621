//! Python bindings for integration sessions.

use std::cell::RefCell;

use numpy::{PyArray1, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::{
    Float,
    error::Error,
    matrix::Matrix,
    methods::settings::{Settings, Tuning},
    ode::OdeSystem,
    session::{Config, Session, Variant},
};

fn to_py_err(e: Error) -> PyErr {
    match e {
        Error::InvalidParameter { .. } | Error::DimensionMismatch { .. } => {
            PyValueError::new_err(e.to_string())
        }
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

/// Read a 1D array_like into `out`.
fn read_vector(obj: &Bound<'_, PyAny>, out: &mut [Float]) -> PyResult<()> {
    let values: Vec<Float> = match obj.extract::<PyReadonlyArray1<Float>>() {
        Ok(arr) => arr.as_slice()?.to_vec(),
        Err(_) => obj.extract()?,
    };
    if values.len() != out.len() {
        return Err(PyValueError::new_err(format!(
            "expected {} values, got {}",
            out.len(),
            values.len()
        )));
    }
    out.copy_from_slice(&values);
    Ok(())
}

/// Read an N×N array_like, indexed `[row][col]`, into `jac`.
fn read_matrix(obj: &Bound<'_, PyAny>, jac: &mut Matrix) -> PyResult<()> {
    let n = jac.n();
    if let Ok(arr) = obj.extract::<PyReadonlyArray2<Float>>() {
        let view = arr.as_array();
        if view.dim() != (n, n) {
            return Err(PyValueError::new_err(format!(
                "expected a {n}x{n} Jacobian, got {:?}",
                view.dim()
            )));
        }
        for j in 0..n {
            for (i, v) in jac.column_mut(j).iter_mut().enumerate() {
                *v = view[[i, j]];
            }
        }
        return Ok(());
    }
    let rows: Vec<Vec<Float>> = obj.extract()?;
    if rows.len() != n || rows.iter().any(|r| r.len() != n) {
        return Err(PyValueError::new_err(format!("expected a {n}x{n} Jacobian")));
    }
    for j in 0..n {
        for (i, v) in jac.column_mut(j).iter_mut().enumerate() {
            *v = rows[i][j];
        }
    }
    Ok(())
}

/// ODE system backed by Python callables `rhs(t, y)`, `jac(t, y)` and
/// `roots(t, y)`.
///
/// A callable that raises poisons its output with NaN so the step fails, and the
/// first exception is kept to be re-raised once `advance` returns.
struct PySystem {
    rhs: Py<PyAny>,
    jac: Option<Py<PyAny>>,
    roots: Option<Py<PyAny>>,
    error: RefCell<Option<PyErr>>,
}

impl PySystem {
    fn call(
        &self,
        f: &Py<PyAny>,
        t: Float,
        y: &[Float],
        read: impl FnOnce(&Bound<'_, PyAny>) -> PyResult<()>,
    ) -> bool {
        let result = Python::attach(|py| {
            let y_arr = PyArray1::from_slice(py, y);
            let out = f.bind(py).call1((t, y_arr))?;
            read(&out)
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("python callback failed at t = {t}: {e}");
                self.error.borrow_mut().get_or_insert(e);
                false
            }
        }
    }

    fn take_error(&self) -> Option<PyErr> {
        self.error.borrow_mut().take()
    }
}

impl OdeSystem for PySystem {
    fn rhs(&self, t: Float, y: &[Float], dydt: &mut [Float]) {
        if !self.call(&self.rhs, t, y, |out| read_vector(out, dydt)) {
            dydt.fill(Float::NAN);
        }
    }

    fn has_jacobian(&self) -> bool {
        self.jac.is_some()
    }

    fn jacobian(&self, t: Float, y: &[Float], _fy: &[Float], jac: &mut Matrix) {
        let Some(f) = &self.jac else { return };
        if !self.call(f, t, y, |out| read_matrix(out, jac)) {
            jac.fill(Float::NAN);
        }
    }

    fn roots(&self, t: Float, y: &[Float], gout: &mut [Float]) {
        let Some(f) = &self.roots else { return };
        if !self.call(f, t, y, |out| read_vector(out, gout)) {
            gout.fill(Float::NAN);
        }
    }
}

fn parse_variant(name: &str) -> PyResult<Variant> {
    match name {
        "dense" => Ok(Variant::Dense),
        "dense_jac" | "analytic" => Ok(Variant::DenseAnalyticJacobian),
        "matrix_free" | "krylov" => Ok(Variant::MatrixFree),
        _ => Err(PyValueError::new_err(format!(
            "unknown variant '{name}', expected 'dense', 'dense_jac' or 'matrix_free'"
        ))),
    }
}

/// A stiff integration session.
///
/// Parameters
/// ----------
/// rhs : callable
///     ``rhs(t, y)`` returning dy/dt as array_like of shape (n,).
/// t0 : float
///     Initial time.
/// y0 : array_like, shape (n,)
///     Initial state.
/// rtol, atol : float, optional
///     Relative and absolute tolerances.
/// variant : {'dense', 'dense_jac', 'matrix_free'}, optional
///     Linear solver. 'dense_jac' requires ``jac``.
/// jac : callable, optional
///     ``jac(t, y)`` returning the (n, n) Jacobian.
/// roots : callable, optional
///     ``roots(t, y)`` returning the root function values. Enable with
///     ``init_roots``.
/// max_steps : int, optional
///     Initial step budget per ``advance``.
#[pyclass(name = "Session", module = "stiff_session", unsendable)]
struct PySession {
    inner: Option<Session<PySystem>>,
}

impl PySession {
    fn session(&mut self) -> PyResult<&mut Session<PySystem>> {
        self.inner
            .as_mut()
            .ok_or_else(|| PyRuntimeError::new_err("session has been destroyed"))
    }
}

#[pymethods]
impl PySession {
    #[new]
    #[pyo3(signature = (
        rhs, t0, y0, rtol=1e-6, atol=1e-8, variant="dense", jac=None, roots=None, max_steps=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        rhs: Py<PyAny>,
        t0: Float,
        y0: Vec<Float>,
        rtol: Float,
        atol: Float,
        variant: &str,
        jac: Option<Py<PyAny>>,
        roots: Option<Py<PyAny>>,
        max_steps: Option<u64>,
    ) -> PyResult<Self> {
        let config = Config::builder()
            .variant(parse_variant(variant)?)
            .rtol(rtol)
            .atol(atol)
            .maybe_max_steps(max_steps)
            .settings(Settings::default())
            .build();
        let system = PySystem {
            rhs,
            jac,
            roots,
            error: RefCell::new(None),
        };
        let session = Session::new(system, t0, &y0, config).map_err(to_py_err)?;
        Ok(Self {
            inner: Some(session),
        })
    }

    /// Integrate to `t`. Returns ``(t_reached, status_code)``.
    ///
    /// Status 0 is success and 2 a root return. Re-raises the first exception
    /// thrown by a callback.
    fn advance(&mut self, t: Float) -> PyResult<(Float, i32)> {
        let session = self.session()?;
        let out = session.advance(t);
        if let Some(e) = session.system().take_error() {
            return Err(e);
        }
        Ok((out.t, out.status.code()))
    }

    /// Current state as a new array.
    fn state<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<Float>>> {
        Ok(PyArray1::from_slice(py, self.session()?.state()))
    }

    #[getter]
    fn t(&mut self) -> PyResult<Float> {
        Ok(self.session()?.current_time())
    }

    fn reinit(&mut self, t0: Float, y0: Vec<Float>) -> PyResult<()> {
        self.session()?.reinit(t0, &y0).map_err(to_py_err)
    }

    /// Set a tuning option by name, e.g. ``set_option("max_ord", 3)``.
    fn set_option(&mut self, name: &str, value: Float) -> PyResult<()> {
        let tuning = Tuning::parse(name, value).map_err(to_py_err)?;
        self.session()?.set(tuning).map_err(to_py_err)
    }

    fn init_roots(&mut self, count: usize) -> PyResult<()> {
        let session = self.session()?;
        if count > 0 && session.system().roots.is_none() {
            return Err(PyValueError::new_err("no roots callable was given"));
        }
        session.init_roots(count).map_err(to_py_err)
    }

    fn root_info(&mut self) -> PyResult<Vec<i32>> {
        Ok(self.session()?.root_info().to_vec())
    }

    fn stats<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let s = self.session()?.stats();
        let d = PyDict::new(py);
        d.set_item("steps", s.steps)?;
        d.set_item("rhs_evals", s.rhs_evals)?;
        d.set_item("rhs_evals_jac", s.rhs_evals_jac)?;
        d.set_item("lin_setups", s.lin_setups)?;
        d.set_item("jac_evals", s.jac_evals)?;
        d.set_item("err_test_fails", s.err_test_fails)?;
        d.set_item("nonlin_iters", s.nonlin_iters)?;
        d.set_item("nonlin_conv_fails", s.nonlin_conv_fails)?;
        d.set_item("linear_iters", s.linear_iters)?;
        d.set_item("root_evals", s.root_evals)?;
        d.set_item("stab_lim_order_reductions", s.stab_lim_order_reductions)?;
        d.set_item("last_order", s.last_order)?;
        d.set_item("current_order", s.current_order)?;
        d.set_item("last_step", s.last_step)?;
        d.set_item("current_step", s.current_step)?;
        d.set_item("current_time", s.current_time)?;
        Ok(d)
    }

    /// Release the session. Calling it again does nothing.
    fn destroy(&mut self) {
        crate::session::destroy(&mut self.inner);
    }

    #[getter]
    fn destroyed(&self) -> bool {
        self.inner.is_none()
    }

    fn __repr__(&self) -> String {
        match &self.inner {
            Some(s) => format!(
                "<Session: n={}, t={:.6e}, variant={:?}>",
                s.len(),
                s.current_time(),
                s.variant()
            ),
            None => "<Session: destroyed>".to_string(),
        }
    }
}

#[pymodule]
fn stiff_session(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySession>()?;
    m.setattr(
        "__doc__",
        "Long-running stiff ODE integration sessions.\n\n\
         `Session` wraps a variable-order BDF integrator with dense,\n\
         analytic-Jacobian or matrix-free Newton solves, root finding and\n\
         automatic step budget escalation.",
    )?;
    Ok(())
}
