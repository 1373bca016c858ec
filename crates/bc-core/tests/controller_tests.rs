//! Política de fallo por step y orden estricto en el controlador.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bc_core::{CompanyRepository, DatasetSlot, EntityExtractor, EtlError, EtlStep, FailurePolicy,
              InMemoryTableStore, PipelineContext, PipelineController, StepOutcome};
use bc_domain::{CompanyRecord, Dataset};

struct NoRepository;
impl CompanyRepository for NoRepository {
    fn companies(&mut self) -> Result<Vec<CompanyRecord>, EtlError> {
        Ok(vec![])
    }
}

struct NoExtractor;
impl EntityExtractor for NoExtractor {
    fn extract(&mut self, entity: &str, _company_id: &str) -> Result<Dataset, EtlError> {
        Ok(Dataset::new(entity))
    }
}

fn empty_context() -> PipelineContext {
    PipelineContext::new(Box::new(NoRepository),
                         Box::new(NoExtractor),
                         Box::new(InMemoryTableStore::new()),
                         HashSet::new())
}

/// Step de prueba: registra su ejecución y falla según configuración.
struct RecordingStep {
    id: String,
    policy: FailurePolicy,
    fail_with: Option<EtlError>,
    order: Arc<AtomicUsize>,
    ran_at: Arc<AtomicUsize>,
}

impl RecordingStep {
    fn ok(id: &str, order: &Arc<AtomicUsize>) -> (Self, Arc<AtomicUsize>) {
        let ran_at = Arc::new(AtomicUsize::new(usize::MAX));
        (Self { id: id.to_string(),
                policy: FailurePolicy::Fatal,
                fail_with: None,
                order: order.clone(),
                ran_at: ran_at.clone() },
         ran_at)
    }

    fn failing(id: &str, order: &Arc<AtomicUsize>, policy: FailurePolicy, err: EtlError) -> Self {
        Self { id: id.to_string(),
               policy,
               fail_with: Some(err),
               order: order.clone(),
               ran_at: Arc::new(AtomicUsize::new(usize::MAX)) }
    }
}

impl EtlStep for RecordingStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    fn run(&self, _ctx: &mut PipelineContext) -> Result<StepOutcome, EtlError> {
        let at = self.order.fetch_add(1, Ordering::SeqCst);
        self.ran_at.store(at, Ordering::SeqCst);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(StepOutcome::rows(1)),
        }
    }
}

#[test]
fn steps_run_in_registration_order() {
    let order = Arc::new(AtomicUsize::new(0));
    let (a, a_at) = RecordingStep::ok("a", &order);
    let (b, b_at) = RecordingStep::ok("b", &order);
    let (c, c_at) = RecordingStep::ok("c", &order);

    let controller = PipelineController::new(vec![Box::new(a), Box::new(b), Box::new(c)]);
    let summary = controller.run(&mut empty_context()).unwrap();

    assert_eq!(summary.reports.len(), 3);
    assert!(a_at.load(Ordering::SeqCst) < b_at.load(Ordering::SeqCst));
    assert!(b_at.load(Ordering::SeqCst) < c_at.load(Ordering::SeqCst));
    assert_eq!(summary.reports.iter().map(|r| r.step_id.as_str()).collect::<Vec<_>>(),
               vec!["a", "b", "c"]);
}

#[test]
fn fatal_failure_halts_remaining_steps_and_keeps_reports() {
    let order = Arc::new(AtomicUsize::new(0));
    let (a, _) = RecordingStep::ok("a", &order);
    let boom = RecordingStep::failing("boom", &order, FailurePolicy::Fatal,
                                  EtlError::load("t", "connection refused"));
    let (never, never_at) = RecordingStep::ok("never", &order);

    let controller = PipelineController::new(vec![Box::new(a), Box::new(boom), Box::new(never)]);
    let err = controller.run(&mut empty_context()).unwrap_err();

    assert_eq!(err.step_id, "boom");
    assert!(matches!(err.source, EtlError::Load { .. }));
    // los steps ya completados quedan reportados; el resto no corre
    assert_eq!(err.completed.len(), 1);
    assert_eq!(never_at.load(Ordering::SeqCst), usize::MAX);
}

#[test]
fn continue_logged_failure_does_not_halt() {
    let order = Arc::new(AtomicUsize::new(0));
    let soft = RecordingStep::failing("csv", &order, FailurePolicy::ContinueLogged,
                                  EtlError::Transform("disk full".into()));
    let (after, after_at) = RecordingStep::ok("after", &order);

    let controller = PipelineController::new(vec![Box::new(soft), Box::new(after)]);
    let summary = controller.run(&mut empty_context()).unwrap();

    assert_ne!(after_at.load(Ordering::SeqCst), usize::MAX);
    // el fallo no se traga en silencio: queda en el resumen
    assert_eq!(summary.logged_failures.len(), 1);
    assert_eq!(summary.logged_failures[0].0, "csv");
}

#[test]
fn reading_unwritten_slot_is_invalid_argument() {
    let ctx = empty_context();
    assert!(matches!(ctx.companies(), Err(EtlError::InvalidArgument(_))));
    assert!(matches!(ctx.dataset(DatasetSlot::Customers), Err(EtlError::InvalidArgument(_))));
}

#[test]
fn written_slot_is_readable() {
    let mut ctx = empty_context();
    ctx.set_dataset(DatasetSlot::Projects, Dataset::new("projects"));
    assert_eq!(ctx.dataset(DatasetSlot::Projects).unwrap().entity, "projects");
}
