//! Field-function callback registry.
//!
//! A renderer cannot hold references to Rust closures, so isosurface
//! extraction reaches user code through an index: every field function is
//! appended to a process-wide table, the renderer is told the index, and
//! whenever it needs a field value it writes the index and the sample point
//! into a single shared evaluation record, calls [`evaluate`], and reads the
//! result back from the same record.
//!
//! The shared record is only meaningful while one render pass is active and
//! evaluations are strictly serialized. [`begin_pass`] enforces the first
//! condition with a process-wide lock held for the whole pass; the renderer
//! calling [`evaluate`] synchronously provides the second. Running two passes
//! concurrently would otherwise race on the record (last writer wins) and
//! silently produce wrong isosurface values.
//!
//! The table only grows: indices are never reused or removed.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::DVec3;

use crate::error::{IsoviewError, Result};

/// Value and gradient of a scalar field at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    /// Field value `f(x)`.
    pub value: f64,
    /// Gradient `df/dx`.
    pub gradient: DVec3,
}

impl FieldSample {
    /// Sentinel handed to the renderer when an evaluation fails.
    pub const NAN: Self = Self {
        value: f64::NAN,
        gradient: DVec3::NAN,
    };

    /// Creates a new sample.
    pub const fn new(value: f64, gradient: DVec3) -> Self {
        Self { value, gradient }
    }

    /// Creates a sample with zero gradient.
    pub const fn scalar(value: f64) -> Self {
        Self {
            value,
            gradient: DVec3::ZERO,
        }
    }
}

impl From<(f64, DVec3)> for FieldSample {
    fn from((value, gradient): (f64, DVec3)) -> Self {
        Self::new(value, gradient)
    }
}

impl From<(f64, f64, f64, f64)> for FieldSample {
    fn from((value, vx, vy, vz): (f64, f64, f64, f64)) -> Self {
        Self::new(value, DVec3::new(vx, vy, vz))
    }
}

/// A scalar field function `f(x) -> (value, gradient)`.
pub type FieldFn = Arc<dyn Fn(DVec3) -> FieldSample + Send + Sync>;

/// Ordered table of field functions addressed by position.
#[derive(Default, Clone)]
pub struct CallbackRegistry {
    functions: Vec<FieldFn>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    /// Appends a function and returns its index.
    pub fn register(&mut self, f: FieldFn) -> usize {
        self.functions.push(f);
        self.functions.len() - 1
    }

    /// Returns the function registered at `index`.
    pub fn get(&self, index: usize) -> Option<&FieldFn> {
        self.functions.get(index)
    }

    /// Calls the function registered at `index`.
    pub fn call(&self, index: usize, x: DVec3) -> Option<FieldSample> {
        self.functions.get(index).map(|f| f(x))
    }

    /// Returns the number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if no function has been registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.functions.len())
            .finish()
    }
}

/// The single record shared between the renderer and the registry.
#[derive(Debug)]
struct EvaluationRecord {
    active_index: usize,
    input: DVec3,
    output: FieldSample,
    failure: Option<(usize, String)>,
}

impl EvaluationRecord {
    const fn new() -> Self {
        Self {
            active_index: 0,
            input: DVec3::ZERO,
            output: FieldSample::scalar(0.0),
            failure: None,
        }
    }
}

static REGISTRY: Mutex<CallbackRegistry> = Mutex::new(CallbackRegistry::new());
static RECORD: Mutex<EvaluationRecord> = Mutex::new(EvaluationRecord::new());
static PASS_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static IN_PASS: Cell<bool> = const { Cell::new(false) };
}

// A panic inside a user function never happens while these locks are held,
// so a poisoned lock still guards consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive access to the callback table for the duration of one render pass.
///
/// Dropping the guard ends the pass and lets the next one begin.
pub struct PassGuard {
    _lock: MutexGuard<'static, ()>,
}

/// Starts a render pass.
///
/// Blocks while another thread runs a pass. Fails with
/// [`IsoviewError::Setup`] when the calling thread is already inside a pass,
/// for example when a field function tries to run a scene.
pub fn begin_pass() -> Result<PassGuard> {
    if IN_PASS.with(Cell::get) {
        return Err(IsoviewError::Setup(
            "a render pass is already active on this thread".to_string(),
        ));
    }
    let guard = lock(&PASS_LOCK);
    IN_PASS.with(|flag| flag.set(true));
    *lock(&RECORD) = EvaluationRecord::new();
    Ok(PassGuard { _lock: guard })
}

impl PassGuard {
    /// Publishes a field function and returns its fresh index.
    pub fn register(&self, f: FieldFn) -> usize {
        let index = lock(&REGISTRY).register(f);
        log::debug!("registered field callback {index}");
        index
    }

    /// Takes the first evaluation failure recorded during this pass.
    pub fn take_failure(&self) -> Option<IsoviewError> {
        lock(&RECORD)
            .failure
            .take()
            .map(|(index, reason)| IsoviewError::Evaluation { index, reason })
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        IN_PASS.with(|flag| flag.set(false));
    }
}

impl fmt::Debug for PassGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassGuard").finish_non_exhaustive()
    }
}

/// Selects the function that owns the next evaluation.
pub fn set_active_index(index: usize) {
    lock(&RECORD).active_index = index;
}

/// Sets the point for the next evaluation.
pub fn set_input(x: DVec3) {
    lock(&RECORD).input = x;
}

/// Returns the result of the last evaluation.
pub fn output() -> FieldSample {
    lock(&RECORD).output
}

/// Evaluates the active function at the current input and stores the result.
///
/// Called by renderers, not by user code. There is no error channel back to
/// the renderer: if the index is unknown or the function panics, the output is
/// set to [`FieldSample::NAN`] and the failure is kept for the orchestrator to
/// report once the pass has been torn down.
pub fn evaluate() {
    let (index, x) = {
        let record = lock(&RECORD);
        (record.active_index, record.input)
    };
    let f = lock(&REGISTRY).get(index).cloned();

    let result = match f {
        Some(f) => panic::catch_unwind(AssertUnwindSafe(|| f(x))).map_err(panic_reason),
        None => Err(format!("no field function registered at index {index}")),
    };

    let mut record = lock(&RECORD);
    match result {
        Ok(sample) => record.output = sample,
        Err(reason) => {
            log::error!("field callback {index} failed at {x}: {reason}");
            record.output = FieldSample::NAN;
            if record.failure.is_none() {
                record.failure = Some((index, reason));
            }
        }
    }
}

/// Evaluates the function at `index` through the shared record.
///
/// This is the renderer side of the protocol: set index, set input,
/// evaluate, read output.
pub fn sample(index: usize, x: DVec3) -> FieldSample {
    set_active_index(index);
    set_input(x);
    evaluate();
    output()
}

/// Returns the function registered at `index` in the process-wide table.
pub fn registered(index: usize) -> Option<FieldFn> {
    lock(&REGISTRY).get(index).cloned()
}

/// Returns the number of functions in the process-wide table.
pub fn registered_len() -> usize {
    lock(&REGISTRY).len()
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "field function panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn constant(value: f64) -> FieldFn {
        Arc::new(move |_: DVec3| FieldSample::scalar(value))
    }

    #[test]
    fn test_local_registry_indices() {
        let mut registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.register(constant(1.0)), 0);
        assert_eq!(registry.register(constant(2.0)), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.call(1, DVec3::ZERO), Some(FieldSample::scalar(2.0)));
        assert!(registry.call(2, DVec3::ZERO).is_none());
    }

    #[test]
    fn test_sample_through_shared_record() {
        let pass = begin_pass().unwrap();
        let index = pass.register(Arc::new(|x: DVec3| {
            FieldSample::new(x.length_squared(), 2.0 * x)
        }));

        let s = sample(index, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(s.value, 14.0);
        assert_eq!(s.gradient, DVec3::new(2.0, 4.0, 6.0));
        assert!(pass.take_failure().is_none());
    }

    #[test]
    fn test_registered_function_identity() {
        let pass = begin_pass().unwrap();
        let f = constant(3.5);
        let index = pass.register(Arc::clone(&f));
        let stored = registered(index).unwrap();
        assert!(Arc::ptr_eq(&f, &stored));
        assert!(registered_len() > index);
    }

    #[test]
    fn test_panicking_function_yields_sentinel() {
        let pass = begin_pass().unwrap();
        let index = pass.register(Arc::new(|_: DVec3| -> FieldSample { panic!("boom") }));

        let s = sample(index, DVec3::ONE);
        assert!(s.value.is_nan());
        assert!(s.gradient.is_nan());

        match pass.take_failure() {
            Some(IsoviewError::Evaluation { index: i, reason }) => {
                assert_eq!(i, index);
                assert!(reason.contains("boom"));
            }
            other => panic!("expected evaluation failure, got {other:?}"),
        }
        assert!(pass.take_failure().is_none());
    }

    #[test]
    fn test_unknown_index_is_recorded() {
        let pass = begin_pass().unwrap();
        let s = sample(usize::MAX, DVec3::ZERO);
        assert!(s.value.is_nan());
        assert!(matches!(
            pass.take_failure(),
            Some(IsoviewError::Evaluation { index: usize::MAX, .. })
        ));
    }

    #[test]
    fn test_nested_pass_is_rejected() {
        let _pass = begin_pass().unwrap();
        assert!(matches!(begin_pass(), Err(IsoviewError::Setup(_))));
    }

    #[test]
    fn test_new_pass_clears_previous_failure() {
        {
            let pass = begin_pass().unwrap();
            let _ = sample(usize::MAX, DVec3::ZERO);
            drop(pass);
        }
        let pass = begin_pass().unwrap();
        assert!(pass.take_failure().is_none());
    }

    proptest! {
        #[test]
        fn prop_indices_follow_registration_order(values in proptest::collection::vec(-1e3f64..1e3, 0..32)) {
            let mut registry = CallbackRegistry::new();
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(registry.register(constant(*v)), i);
            }
            prop_assert_eq!(registry.len(), values.len());
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(registry.call(i, DVec3::ZERO).map(|s| s.value), Some(*v));
            }
        }
    }
}
