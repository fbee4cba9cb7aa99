//! TemplateCompiler core
//!
//! Turns a definition plus a runtime config into a [`CompiledTemplate`].
//!
//! # Phases
//! 1. plan: names, type tags and sink references are checked and parameter
//!    bags merged; nothing is constructed, so a broken template has no side
//!    effects
//! 2. build: sinks first (each gets a telemetry handle), then sources, then
//!    wiring by sink name

use std::sync::Arc;

use contracts::{
    ParamMap, Params, RuntimeConfig, SharedSink, SinkBase, SinkSpec, Source, SourceBase,
    SourceSpec, Telemetry, TemplateDefinition,
};
use indexmap::IndexMap;
use observability::SinkTelemetry;
use tracing::{debug, info, instrument};

use crate::compiled::CompiledTemplate;
use crate::error::{CompileError, Result};
use crate::merge;
use crate::registry::{PluginRegistry, SinkConstructor, SourceConstructor};

/// Creates the telemetry handle attached to the named sink
pub type TelemetryFactory = Arc<dyn Fn(&str) -> Box<dyn Telemetry> + Send + Sync>;

struct SinkPlan<'a> {
    spec: &'a SinkSpec,
    constructor: SinkConstructor,
    params: ParamMap,
}

struct SourcePlan<'a> {
    spec: &'a SourceSpec,
    constructor: SourceConstructor,
    params: ParamMap,
}

/// Template compiler
///
/// Holds the plugin registry it resolves type tags against. Cheap to clone;
/// compilations share nothing mutable.
#[derive(Clone)]
pub struct TemplateCompiler {
    registry: Arc<PluginRegistry>,
    telemetry: TelemetryFactory,
}

impl TemplateCompiler {
    pub fn new(registry: impl Into<Arc<PluginRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            telemetry: Arc::new(SinkTelemetry::boxed),
        }
    }

    /// Replace the default [`SinkTelemetry`] handles
    pub fn with_telemetry<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> Box<dyn Telemetry> + Send + Sync + 'static,
    {
        self.telemetry = Arc::new(factory);
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Compile `definition` under `config`
    ///
    /// # Errors
    /// - [`CompileError::DuplicateComponent`]
    /// - [`CompileError::UnknownPluginType`]
    /// - [`CompileError::DanglingSinkReference`]
    /// - [`CompileError::ComponentConfiguration`] for unresolved placeholders
    ///   and constructor failures
    #[instrument(
        name = "template_compiler_compile",
        skip(self, definition, config),
        fields(
            template = %definition.name,
            sources = definition.sources.len(),
            sinks = definition.sinks.len()
        )
    )]
    pub fn compile(
        &self,
        definition: &TemplateDefinition,
        config: &RuntimeConfig,
    ) -> Result<CompiledTemplate> {
        let (sink_plans, source_plans) = self.plan(definition, config)?;
        debug!("plan complete, constructing components");

        let mut compiled = CompiledTemplate::new(&definition.name);
        compiled.sinks = self.build_sinks(sink_plans, config)?;
        let sources = self.build_sources(source_plans, config)?;

        for (name, mut source) in sources {
            for sink_name in source.base().sink_names.clone() {
                // plan() guarantees every reference resolves
                if let Some(sink) = compiled.sinks.get(&sink_name) {
                    source.base_mut().add_sink(sink_name, Arc::clone(sink));
                }
            }
            compiled.sources.insert(name, source);
        }

        info!(
            sources = compiled.sources.len(),
            sinks = compiled.sinks.len(),
            "template compiled"
        );
        Ok(compiled)
    }

    fn plan<'a>(
        &self,
        definition: &'a TemplateDefinition,
        config: &RuntimeConfig,
    ) -> Result<(Vec<SinkPlan<'a>>, Vec<SourcePlan<'a>>)> {
        if let Some(name) = definition.duplicate_name() {
            return Err(CompileError::DuplicateComponent {
                name: name.to_string(),
            });
        }

        let mut sink_constructors = Vec::with_capacity(definition.sinks.len());
        for spec in &definition.sinks {
            let constructor = self
                .registry
                .resolve_sink(&spec.kind)
                .ok_or_else(|| CompileError::unknown_type(&spec.kind, &spec.name))?;
            sink_constructors.push((spec, constructor));
        }

        let mut source_constructors = Vec::with_capacity(definition.sources.len());
        for spec in &definition.sources {
            let constructor = self
                .registry
                .resolve_source(&spec.kind)
                .ok_or_else(|| CompileError::unknown_type(&spec.kind, &spec.name))?;
            if let Some(missing) = spec
                .sink_names
                .iter()
                .find(|sink| definition.sink(sink).is_none())
            {
                return Err(CompileError::dangling(&spec.name, missing));
            }
            source_constructors.push((spec, constructor));
        }

        let effective = merge::effective_parameters(&definition.parameters, config);

        let sinks = sink_constructors
            .into_iter()
            .map(|(spec, constructor)| {
                let params = merge::merge_component(&spec.name, &spec.params, &effective, config)?;
                Ok(SinkPlan {
                    spec,
                    constructor,
                    params,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let sources = source_constructors
            .into_iter()
            .map(|(spec, constructor)| {
                let params = merge::merge_component(&spec.name, &spec.params, &effective, config)?;
                Ok(SourcePlan {
                    spec,
                    constructor,
                    params,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((sinks, sources))
    }

    fn build_sinks(
        &self,
        plans: Vec<SinkPlan<'_>>,
        config: &RuntimeConfig,
    ) -> Result<IndexMap<String, SharedSink>> {
        let mut sinks = IndexMap::with_capacity(plans.len());
        for plan in plans {
            let name = plan.spec.name.as_str();
            let base = SinkBase::new(
                name,
                &plan.spec.kind,
                plan.spec.data_type.clone(),
                component_params(name, plan.params, config),
            );

            let mut sink = (plan.constructor)(base).map_err(|e| CompileError::from_contract(name, e))?;
            if sink.telemetry_enabled() {
                debug!(sink = name, "sink brought its own telemetry handle");
            } else {
                sink.enable_telemetry((self.telemetry)(name))
                    .map_err(|e| CompileError::from_contract(name, e))?;
            }

            debug!(sink = name, kind = %plan.spec.kind, "sink constructed");
            sinks.insert(name.to_string(), contracts::share_sink(sink));
        }
        Ok(sinks)
    }

    fn build_sources(
        &self,
        plans: Vec<SourcePlan<'_>>,
        config: &RuntimeConfig,
    ) -> Result<Vec<(String, Box<dyn Source>)>> {
        let mut sources = Vec::with_capacity(plans.len());
        for plan in plans {
            let name = plan.spec.name.as_str();
            let base = SourceBase::new(
                name,
                &plan.spec.kind,
                plan.spec.sink_names.clone(),
                plan.spec.hints(),
                component_params(name, plan.params, config),
            );

            let source = (plan.constructor)(base).map_err(|e| CompileError::from_contract(name, e))?;
            debug!(
                source = name,
                kind = %plan.spec.kind,
                processes = ?plan.spec.processes,
                concurrency = ?plan.spec.concurrency,
                "source constructed"
            );
            sources.push((name.to_string(), source));
        }
        Ok(sources)
    }
}

fn component_params(component: &str, fields: ParamMap, config: &RuntimeConfig) -> Params {
    Params::new(component, fields, config.credentials.clone())
}
