use std::cell::RefCell;

use numpy::{PyArray1, PyArrayMethods};
use pyo3::{exceptions::PyValueError, prelude::*, types::PyDict};

use crate::{
    Float,
    core::{ode::ODE, state::State},
    methods::tableau::Tableau,
    solve::{RunConfig, RunTrace},
};

/// Python callable `fun(x, y)` used as right-hand side.
///
/// The first exception raised by `fun` is kept and every later evaluation
/// returns NaN, which stops the run with a non-finite derivative. The caller
/// re-raises the stored exception afterwards.
struct PythonRhs<'py> {
    fun: Bound<'py, PyAny>,
    error: RefCell<Option<PyErr>>,
}

impl<'py> PythonRhs<'py> {
    fn new(fun: Bound<'py, PyAny>) -> Self {
        Self {
            fun,
            error: RefCell::new(None),
        }
    }

    fn call<const N: usize>(&self, x: Float, y: &[Float; N]) -> PyResult<[Float; N]> {
        if N == 1 {
            let result = self.fun.call1((x, y[0]))?;
            if let Ok(value) = result.extract::<Float>() {
                return Ok([value; N]);
            }
            return result.extract::<[Float; N]>();
        }
        let result = self.fun.call1((x, y.to_vec()))?;
        result.extract::<[Float; N]>().map_err(|_| {
            PyValueError::new_err(format!("fun must return a sequence of {N} floats"))
        })
    }
}

impl<const N: usize> ODE<N> for PythonRhs<'_> {
    fn ode(&self, x: Float, y: &[Float; N], dydx: &mut [Float; N]) {
        if self.error.borrow().is_some() {
            *dydx = [Float::NAN; N];
            return;
        }
        match self.call(x, y) {
            Ok(derivative) => *dydx = derivative,
            Err(err) => {
                *self.error.borrow_mut() = Some(err);
                *dydx = [Float::NAN; N];
            }
        }
    }
}

enum Initial {
    Scalar(State<1>),
    System(State<2>),
}

fn initial(x0: Float, y0: &Bound<'_, PyAny>) -> PyResult<Initial> {
    if let Ok(y) = y0.extract::<Float>() {
        return Ok(Initial::Scalar(State::scalar(x0, y)));
    }
    match y0.extract::<[Float; 2]>() {
        Ok([y1, y2]) => Ok(Initial::System(State::system(x0, y1, y2))),
        Err(_) => Err(PyValueError::new_err(
            "y0 must be a float or a sequence of two floats",
        )),
    }
}

fn tableau(method: &str) -> PyResult<Tableau> {
    Tableau::by_name(method)
        .ok_or_else(|| PyValueError::new_err(format!("unknown method '{method}'")))
}

/// Knobs shared by both entry points.
struct Request {
    tableau: Tableau,
    h0: Float,
    x_max: Float,
    max_steps: usize,
    adaptive: Option<(Float, Float)>,
}

fn execute<'py, const N: usize>(
    py: Python<'py>,
    fun: Bound<'py, PyAny>,
    initial: State<N>,
    request: Request,
) -> PyResult<Bound<'py, PyDict>>
where
    PythonRhs<'py>: ODE<N>,
{
    let config = RunConfig::builder()
        .tableau(request.tableau)
        .rhs(PythonRhs::new(fun))
        .initial(initial)
        .h0(request.h0)
        .x_max(request.x_max)
        .max_steps(request.max_steps)
        .adaptive(request.adaptive.is_some())
        .maybe_tolerance(request.adaptive.map(|(tolerance, _)| tolerance))
        .maybe_epsilon_border(request.adaptive.map(|(_, epsilon_border)| epsilon_border))
        .build();

    let outcome = config.run();
    if let Some(err) = config.rhs.error.take() {
        return Err(err);
    }
    let (trace, error) = match outcome {
        Ok(trace) => (trace, None),
        Err(failure) => (failure.partial, Some(failure.error.to_string())),
    };
    to_dict(py, &trace, error)
}

fn to_dict<'py, const N: usize>(
    py: Python<'py>,
    trace: &RunTrace<N>,
    error: Option<String>,
) -> PyResult<Bound<'py, PyDict>> {
    let columns = trace.labels();
    let table = trace.to_table();
    let shape = (table.len(), columns.len());
    let flat: Vec<Float> = table.into_iter().flatten().collect();
    let data = PyArray1::from_vec(py, flat).reshape(shape)?;

    let dict = PyDict::new(py);
    dict.set_item("columns", columns)?;
    dict.set_item("data", data)?;
    dict.set_item("error", error)?;
    Ok(dict)
}

fn dispatch<'py>(
    py: Python<'py>,
    fun: Bound<'py, PyAny>,
    x0: Float,
    y0: &Bound<'py, PyAny>,
    request: Request,
) -> PyResult<Bound<'py, PyDict>> {
    match initial(x0, y0)? {
        Initial::Scalar(state) => execute(py, fun, state, request),
        Initial::System(state) => execute(py, fun, state, request),
    }
}

#[pyfunction]
#[pyo3(signature = (fun, x0, y0, h, x_max, max_steps=100_000, method="rk4"))]
/// Integrate on a fixed grid.
///
/// Parameters
/// ----------
/// fun : callable
///     Right-hand side ``fun(x, y)``. For a scalar problem ``y`` is a float
///     and ``fun`` returns a float; for a system ``y`` is a list ``[y1, y2]``
///     and ``fun`` returns two floats.
/// x0 : float
///     Start of the interval.
/// y0 : float or sequence of two floats
///     Initial value.
/// h : float
///     Step size. The last step is shortened to land on ``x_max``.
/// x_max : float
///     End of the interval.
/// max_steps : int, optional
///     Maximum number of steps.
/// method : str, optional
///     One of ``euler``, ``heun``, ``midpoint``, ``kutta3``, ``rk4``.
///
/// Returns
/// -------
/// dict with fields ``columns`` (list of str), ``data`` (ndarray of shape
/// (rows, columns)) and ``error`` (str or None). On error ``data`` holds the
/// rows computed before the failure.
#[allow(clippy::too_many_arguments)]
fn fixed_step<'py>(
    py: Python<'py>,
    fun: Bound<'py, PyAny>,
    x0: Float,
    y0: Bound<'py, PyAny>,
    h: Float,
    x_max: Float,
    max_steps: usize,
    method: &str,
) -> PyResult<Bound<'py, PyDict>> {
    let request = Request {
        tableau: tableau(method)?,
        h0: h,
        x_max,
        max_steps,
        adaptive: None,
    };
    dispatch(py, fun, x0, &y0, request)
}

#[pyfunction]
#[pyo3(signature = (fun, x0, y0, h0, x_max, tolerance, epsilon_border=1e-6, max_steps=100_000, method="rk4"))]
/// Integrate with step-doubling control.
///
/// Each step is compared against two half steps; the step is halved while
/// the error estimate exceeds ``tolerance`` and doubled when it falls below
/// ``tolerance / 64``.
///
/// Parameters
/// ----------
/// fun : callable
///     Right-hand side ``fun(x, y)``, see ``fixed_step``.
/// x0 : float
///     Start of the interval.
/// y0 : float or sequence of two floats
///     Initial value.
/// h0 : float
///     Initial step size.
/// x_max : float
///     End of the interval.
/// tolerance : float
///     Largest accepted local error estimate.
/// epsilon_border : float, optional
///     The run ends once ``|x - x_max| <= epsilon_border``.
/// max_steps : int, optional
///     Maximum number of accepted steps.
/// method : str, optional
///     One of ``euler``, ``heun``, ``midpoint``, ``kutta3``, ``rk4``.
///
/// Returns
/// -------
/// dict, see ``fixed_step``.
#[allow(clippy::too_many_arguments)]
fn adaptive<'py>(
    py: Python<'py>,
    fun: Bound<'py, PyAny>,
    x0: Float,
    y0: Bound<'py, PyAny>,
    h0: Float,
    x_max: Float,
    tolerance: Float,
    epsilon_border: Float,
    max_steps: usize,
    method: &str,
) -> PyResult<Bound<'py, PyDict>> {
    let request = Request {
        tableau: tableau(method)?,
        h0,
        x_max,
        max_steps,
        adaptive: Some((tolerance, epsilon_border)),
    };
    dispatch(py, fun, x0, &y0, request)
}

#[pymodule]
fn rkdoubling(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(fixed_step, m)?)?;
    m.add_function(wrap_pyfunction!(adaptive, m)?)?;
    Ok(())
}
