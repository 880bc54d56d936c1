//! Three-phase forwarding from a proxy command to its implementation
//!
//! An invocation runs `begin`, then `process` once per streamed record in
//! arrival order, then `end`. The first failing phase stops the invocation:
//! its error is returned unchanged and no later phase reaches the
//! implementation.
//!
//! [`ProxyForwarder`] drives the protocol at runtime. [`ForwardingPlan`] is the
//! same protocol as data, for emission into a generated proxy.

use crate::emit::Directive;
use crate::error::DispatchError;
use crate::model::ImplementationId;
use crate::resolver::DispatchTable;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// Parameter forced to 1 so records stream through without batching
pub const OUT_BUFFER_PARAMETER: &str = "OutBuffer";

/// Arguments bound by the caller, by parameter name
pub type BoundParameters = IndexMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Begin,
    Process,
    End,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Begin => "begin",
            Phase::Process => "process",
            Phase::End => "end",
        };
        f.write_str(name)
    }
}

/// Force a bound output buffer size to 1; returns whether one was bound
pub fn negotiate_buffering(bound: &mut BoundParameters) -> bool {
    match bound.get_mut(OUT_BUFFER_PARAMETER) {
        Some(value) => {
            *value = serde_json::Value::from(1);
            true
        }
        None => false,
    }
}

/// A started implementation that accepts a stream of records
pub trait SteppablePipeline<I> {
    type Error;

    fn begin(&mut self, bound: &BoundParameters) -> Result<(), Self::Error>;

    fn process(&mut self, record: I) -> Result<(), Self::Error>;

    fn end(&mut self) -> Result<(), Self::Error>;
}

/// Acquires a handle to the implementation behind an [`ImplementationId`]
pub trait ImplementationFactory<I> {
    type Pipeline: SteppablePipeline<I>;

    fn create(
        &mut self,
        implementation: &ImplementationId,
    ) -> Result<Self::Pipeline, <Self::Pipeline as SteppablePipeline<I>>::Error>;
}

/// Runtime side of a generated proxy
#[derive(Debug, Clone)]
pub struct ProxyForwarder {
    table: DispatchTable,
}

impl ProxyForwarder {
    pub fn new(table: DispatchTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Begin phase: resolve, acquire exactly one handle, negotiate buffering
    ///
    /// Nothing is created when the parameter set cannot be resolved.
    pub fn begin<I, F, E>(
        &self,
        parameter_set: &str,
        mut bound: BoundParameters,
        factory: &mut F,
    ) -> Result<ActiveForward<'_, I, F::Pipeline>, E>
    where
        F: ImplementationFactory<I>,
        F::Pipeline: SteppablePipeline<I, Error = E>,
        E: From<DispatchError>,
    {
        let implementation = self.table.resolve(parameter_set)?.clone();
        let buffered = negotiate_buffering(&mut bound);
        debug!(
            command = self.table.command(),
            parameter_set,
            %implementation,
            buffered,
            "begin"
        );

        let mut pipeline = factory.create(&implementation)?;
        pipeline.begin(&bound)?;

        Ok(ActiveForward {
            command: self.table.command(),
            implementation,
            pipeline,
            aborted: None,
            processed: 0,
            _record: PhantomData,
        })
    }

    /// Run all three phases over `records`; returns the number of records forwarded
    pub fn forward<I, F, E>(
        &self,
        parameter_set: &str,
        bound: BoundParameters,
        records: impl IntoIterator<Item = I>,
        factory: &mut F,
    ) -> Result<usize, E>
    where
        F: ImplementationFactory<I>,
        F::Pipeline: SteppablePipeline<I, Error = E>,
        E: From<DispatchError>,
    {
        let mut active = self.begin(parameter_set, bound, factory)?;
        for record in records {
            active.process(record)?;
        }
        active.end()
    }
}

/// An invocation past its begin phase
///
/// `end` consumes the invocation, so phases can only run in order.
pub struct ActiveForward<'a, I, P> {
    command: &'a str,
    implementation: ImplementationId,
    pipeline: P,
    aborted: Option<Phase>,
    processed: usize,
    _record: PhantomData<fn(I)>,
}

impl<I, P, E> ActiveForward<'_, I, P>
where
    P: SteppablePipeline<I, Error = E>,
    E: From<DispatchError>,
{
    fn check_not_aborted(&self, phase: Phase) -> Result<(), E> {
        match self.aborted {
            Some(failed) => Err(DispatchError::PhaseAfterAbort {
                command: self.command.to_string(),
                phase,
                failed,
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Forward one record
    pub fn process(&mut self, record: I) -> Result<(), E> {
        self.check_not_aborted(Phase::Process)?;
        match self.pipeline.process(record) {
            Ok(()) => {
                self.processed += 1;
                Ok(())
            }
            Err(error) => {
                self.aborted = Some(Phase::Process);
                Err(error)
            }
        }
    }

    /// Finalize the implementation; returns the number of records forwarded
    pub fn end(mut self) -> Result<usize, E> {
        self.check_not_aborted(Phase::End)?;
        self.pipeline.end()?;
        debug!(
            command = self.command,
            processed = self.processed,
            "end"
        );
        Ok(self.processed)
    }

    pub fn implementation(&self) -> &ImplementationId {
        &self.implementation
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}

/// One logical step of a forwarding phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ForwardStep {
    NegotiateBuffering { parameter: String },
    ReadParameterSet,
    MapParameterSets { entries: Vec<(String, ImplementationId)> },
    SelectImplementation { implementation: ImplementationId },
    AcquireHandle { by_parameter_set: bool },
    BeginPipeline,
    ProcessRecord,
    EndPipeline,
}

impl ForwardStep {
    fn to_directive(&self) -> Directive {
        match self {
            ForwardStep::NegotiateBuffering { parameter } => Directive::block(
                format!("if bound '{parameter}'"),
                vec![Directive::literal(format!("bound['{parameter}'] = 1"))],
            ),
            ForwardStep::ReadParameterSet => {
                Directive::literal("parameter_set = invocation.parameter_set")
            }
            ForwardStep::MapParameterSets { entries } => Directive::block(
                "mapping =",
                entries
                    .iter()
                    .map(|(set, implementation)| {
                        Directive::literal(format!("{set} = '{implementation}'"))
                    })
                    .collect(),
            ),
            ForwardStep::SelectImplementation { implementation } => {
                Directive::literal(format!("implementation = '{implementation}'"))
            }
            ForwardStep::AcquireHandle { by_parameter_set } => {
                if *by_parameter_set {
                    Directive::literal("pipeline = acquire(mapping[parameter_set], bound)")
                } else {
                    Directive::literal("pipeline = acquire(implementation, bound)")
                }
            }
            ForwardStep::BeginPipeline => Directive::literal("pipeline.begin(invocation)"),
            ForwardStep::ProcessRecord => Directive::literal("pipeline.process(record)"),
            ForwardStep::EndPipeline => Directive::literal("pipeline.end()"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhasePlan {
    pub phase: Phase,
    pub steps: Vec<ForwardStep>,
}

/// The forwarding protocol of one command as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingPlan {
    pub phases: Vec<PhasePlan>,
}

impl ForwardingPlan {
    pub fn from_table(table: &DispatchTable) -> Self {
        let mut begin = vec![
            ForwardStep::NegotiateBuffering {
                parameter: OUT_BUFFER_PARAMETER.to_string(),
            },
        ];
        match table {
            DispatchTable::Unconditional { implementation, .. } => {
                begin.push(ForwardStep::SelectImplementation {
                    implementation: implementation.clone(),
                });
                begin.push(ForwardStep::AcquireHandle {
                    by_parameter_set: false,
                });
            }
            DispatchTable::ByParameterSet { entries, .. } => {
                begin.push(ForwardStep::ReadParameterSet);
                begin.push(ForwardStep::MapParameterSets {
                    entries: entries
                        .iter()
                        .map(|(set, implementation)| (set.clone(), implementation.clone()))
                        .collect(),
                });
                begin.push(ForwardStep::AcquireHandle {
                    by_parameter_set: true,
                });
            }
        }
        begin.push(ForwardStep::BeginPipeline);

        Self {
            phases: vec![
                PhasePlan {
                    phase: Phase::Begin,
                    steps: begin,
                },
                PhasePlan {
                    phase: Phase::Process,
                    steps: vec![ForwardStep::ProcessRecord],
                },
                PhasePlan {
                    phase: Phase::End,
                    steps: vec![ForwardStep::EndPipeline],
                },
            ],
        }
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhasePlan> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Each phase as a block whose failures are rethrown unchanged
    pub fn to_directives(&self) -> Vec<Directive> {
        let mut out = Vec::new();
        for (index, plan) in self.phases.iter().enumerate() {
            if index > 0 {
                out.push(Directive::Blank);
            }
            out.push(Directive::block(
                plan.phase.to_string(),
                vec![
                    Directive::block(
                        "try",
                        plan.steps.iter().map(ForwardStep::to_directive).collect(),
                    ),
                    Directive::block("catch", vec![Directive::literal("rethrow")]),
                ],
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Renderer, TextRenderer};
    use crate::group::VariantGroup;
    use crate::model::Variant;
    use crate::schema::Schema;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    enum TestError {
        #[error("implementation failed: {0}")]
        Implementation(String),
        #[error(transparent)]
        Dispatch(#[from] DispatchError),
    }

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct Recorder {
        created: Vec<String>,
        log: Log,
        fail_on: Option<i32>,
        fail_begin: bool,
    }

    struct RecordingPipeline {
        log: Log,
        fail_on: Option<i32>,
        fail_begin: bool,
    }

    impl SteppablePipeline<i32> for RecordingPipeline {
        type Error = TestError;

        fn begin(&mut self, bound: &BoundParameters) -> Result<(), TestError> {
            if self.fail_begin {
                return Err(TestError::Implementation("begin".to_string()));
            }
            let out_buffer = bound
                .get(OUT_BUFFER_PARAMETER)
                .map(|v| v.to_string())
                .unwrap_or_default();
            self.log.borrow_mut().push(format!("begin {out_buffer}"));
            Ok(())
        }

        fn process(&mut self, record: i32) -> Result<(), TestError> {
            if self.fail_on == Some(record) {
                return Err(TestError::Implementation(format!("record {record}")));
            }
            self.log.borrow_mut().push(format!("process {record}"));
            Ok(())
        }

        fn end(&mut self) -> Result<(), TestError> {
            self.log.borrow_mut().push("end".to_string());
            Ok(())
        }
    }

    impl ImplementationFactory<i32> for Recorder {
        type Pipeline = RecordingPipeline;

        fn create(&mut self, implementation: &ImplementationId) -> Result<RecordingPipeline, TestError> {
            self.created.push(implementation.to_string());
            Ok(RecordingPipeline {
                log: Rc::clone(&self.log),
                fail_on: self.fail_on,
                fail_begin: self.fail_begin,
            })
        }
    }

    fn events(recorder: &Recorder) -> Vec<String> {
        recorder.log.borrow().clone()
    }

    fn forwarder(names: &[&str]) -> ProxyForwarder {
        let variants = names
            .iter()
            .map(|n| Variant::new(*n, ImplementationId::new("Private", format!("Get-Thing_{n}"))))
            .collect();
        let group = VariantGroup::new("Get-Thing", variants, Arc::new(Schema::default())).unwrap();
        ProxyForwarder::new(DispatchTable::from_group(&group))
    }

    #[test]
    fn test_negotiate_buffering() {
        let mut bound = BoundParameters::new();
        assert!(!negotiate_buffering(&mut bound));

        bound.insert(OUT_BUFFER_PARAMETER.to_string(), serde_json::json!(500));
        assert!(negotiate_buffering(&mut bound));
        assert_eq!(bound[OUT_BUFFER_PARAMETER], serde_json::json!(1));
    }

    #[test]
    fn test_records_are_forwarded_in_order() {
        let forwarder = forwarder(&["List", "Get"]);
        let mut recorder = Recorder::default();
        let mut bound = BoundParameters::new();
        bound.insert(OUT_BUFFER_PARAMETER.to_string(), serde_json::json!(100));

        let count = forwarder
            .forward("Get", bound, vec![3, 1, 2], &mut recorder)
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(recorder.created, vec!["Private\\Get-Thing_Get".to_string()]);
        assert_eq!(
            events(&recorder),
            vec!["begin 1", "process 3", "process 1", "process 2", "end"]
        );
    }

    #[test]
    fn test_unmapped_parameter_set_creates_nothing() {
        let forwarder = forwarder(&["List", "Get"]);
        let mut recorder = Recorder::default();

        let error = forwarder
            .forward("Delete", BoundParameters::new(), vec![1], &mut recorder)
            .unwrap_err();

        assert!(matches!(
            error,
            TestError::Dispatch(DispatchError::UnmappedParameterSet { .. })
        ));
        assert!(recorder.created.is_empty());
        assert!(events(&recorder).is_empty());
    }

    #[test]
    fn test_failing_record_stops_later_phases() {
        let forwarder = forwarder(&["Only"]);
        let mut recorder = Recorder {
            fail_on: Some(2),
            ..Default::default()
        };

        let error = forwarder
            .forward("ignored", BoundParameters::new(), vec![1, 2, 3], &mut recorder)
            .unwrap_err();

        assert_eq!(error, TestError::Implementation("record 2".to_string()));
        assert_eq!(events(&recorder), vec!["begin ", "process 1"]);
    }

    #[test]
    fn test_failing_begin_is_returned_unchanged() {
        let forwarder = forwarder(&["Only"]);
        let mut recorder = Recorder {
            fail_begin: true,
            ..Default::default()
        };

        let error = forwarder
            .forward("ignored", BoundParameters::new(), vec![1], &mut recorder)
            .unwrap_err();

        assert_eq!(error, TestError::Implementation("begin".to_string()));
        assert_eq!(recorder.created.len(), 1);
        assert!(events(&recorder).is_empty());
    }

    #[test]
    fn test_phases_after_abort_are_refused() {
        let forwarder = forwarder(&["Only"]);
        let mut recorder = Recorder {
            fail_on: Some(1),
            ..Default::default()
        };

        let mut active = forwarder
            .begin::<i32, _, TestError>("ignored", BoundParameters::new(), &mut recorder)
            .unwrap();
        assert!(active.process(1).is_err());
        assert!(active.is_aborted());

        let error = active.process(5).unwrap_err();
        assert_eq!(
            error,
            TestError::Dispatch(DispatchError::PhaseAfterAbort {
                command: "Get-Thing".to_string(),
                phase: Phase::Process,
                failed: Phase::Process,
            })
        );
        assert!(matches!(
            active.end(),
            Err(TestError::Dispatch(DispatchError::PhaseAfterAbort { phase: Phase::End, .. }))
        ));
        assert_eq!(events(&recorder), vec!["begin "]);
    }

    #[test]
    fn test_plan_for_single_variant_has_no_mapping() {
        let forwarder = forwarder(&["Only"]);
        let plan = ForwardingPlan::from_table(forwarder.table());

        let begin = plan.phase(Phase::Begin).unwrap();
        assert!(!begin
            .steps
            .iter()
            .any(|s| matches!(s, ForwardStep::MapParameterSets { .. })));
        assert_eq!(
            plan.phases.iter().map(|p| p.phase).collect::<Vec<_>>(),
            vec![Phase::Begin, Phase::Process, Phase::End]
        );
    }

    #[test]
    fn test_plan_directives_list_each_mapping() {
        let forwarder = forwarder(&["List", "Get"]);
        let plan = ForwardingPlan::from_table(forwarder.table());

        let text = TextRenderer::default().render(&plan.to_directives());
        assert!(text.contains("List = 'Private\\Get-Thing_List'"));
        assert!(text.contains("Get = 'Private\\Get-Thing_Get'"));
        assert!(text.contains("process {"));
        assert!(text.find("begin {").unwrap() < text.find("end {").unwrap());
    }
}
