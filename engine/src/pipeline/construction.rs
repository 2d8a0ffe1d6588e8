use super::{PipelineController, PipelineError};
use crate::config::EngineSettings;
use crate::events::EventBroadcaster;
use crate::feed::FrameFeeder;
use crate::runtime;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use inflow_types::{ElementRole, ElementSpec, Link, PipelineSpec, PipelineState};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info};

impl PipelineController {
    /// Create a new pipeline from a declarative description.
    ///
    /// The whole topology is built and linked here; any failure drops the
    /// partially built pipeline before returning.
    pub fn new(
        spec: &PipelineSpec,
        settings: EngineSettings,
        events: EventBroadcaster,
    ) -> Result<Self, PipelineError> {
        if !runtime::is_initialized() {
            return Err(PipelineError::RuntimeNotInitialized);
        }

        info!("Creating pipeline '{}' ({})", spec.name, spec.id);
        validate_topology(spec)?;

        let pipeline = gst::Pipeline::builder().name(spec.name.as_str()).build();

        let mut controller = Self {
            id: spec.id,
            name: spec.name.clone(),
            pipeline,
            elements: HashMap::new(),
            source: build_app_source(spec, &settings),
            feeder: None,
            events,
            settings,
            cached_state: Arc::new(RwLock::new(PipelineState::Null)),
            bus_watch: None,
            poisoned: false,
        };

        for element_spec in &spec.elements {
            controller.add_element(element_spec)?;
        }

        // Link either the explicit topology or the insertion-order chain.
        let links: Vec<Link> = if spec.links.is_empty() {
            spec.elements
                .windows(2)
                .map(|pair| Link {
                    from: pair[0].id.clone(),
                    to: pair[1].id.clone(),
                })
                .collect()
        } else {
            spec.links.clone()
        };
        for link in &links {
            controller.link_elements(link)?;
            debug!("Linked: {} -> {}", link.from, link.to);
        }

        controller.feeder = Some(FrameFeeder::new(controller.source.clone(), spec.id));

        info!(
            "Pipeline '{}' created: {} elements, {} links",
            spec.name,
            controller.elements.len(),
            links.len()
        );
        Ok(controller)
    }

    /// Surrender the frame feeder to the producer.
    ///
    /// Returns `Some` exactly once; the feeder is the single serialization
    /// point for all pushes into the source element.
    pub fn take_feeder(&mut self) -> Option<FrameFeeder> {
        self.feeder.take()
    }

    /// Create an element from its description and add it to the bin.
    fn add_element(&mut self, element_spec: &ElementSpec) -> Result<(), PipelineError> {
        debug!(
            "Adding element {} (factory: {}, role: {:?})",
            element_spec.id, element_spec.factory, element_spec.role
        );

        let element = match element_spec.role {
            ElementRole::Source => self.source.clone().upcast::<gst::Element>(),
            ElementRole::Transform | ElementRole::Sink => {
                gst::ElementFactory::make(&element_spec.factory)
                    .name(element_spec.id.as_str())
                    .build()
                    .map_err(|e| {
                        error!("Failed to create element {}: {}", element_spec.id, e);
                        PipelineError::ElementCreation(format!(
                            "{}: {} - {}",
                            element_spec.id, element_spec.factory, e
                        ))
                    })?
            }
        };

        for (prop_name, prop_value) in &element_spec.properties {
            super::properties::apply_property(&element, &element_spec.id, prop_name, prop_value)?;
        }

        self.pipeline.add(&element).map_err(|e| {
            error!("Failed to add {} to pipeline: {}", element_spec.id, e);
            PipelineError::ElementCreation(format!(
                "Failed to add {} to pipeline: {}",
                element_spec.id, e
            ))
        })?;

        self.elements.insert(element_spec.id.clone(), element);
        Ok(())
    }

    /// Link two elements by id.
    fn link_elements(&self, link: &Link) -> Result<(), PipelineError> {
        let src = self
            .elements
            .get(&link.from)
            .ok_or_else(|| PipelineError::ElementNotFound(link.from.clone()))?;
        let sink = self
            .elements
            .get(&link.to)
            .ok_or_else(|| PipelineError::ElementNotFound(link.to.clone()))?;

        src.link(sink).map_err(|e| {
            error!("Failed to link {} -> {}: {}", link.from, link.to, e);
            PipelineError::Link(link.from.clone(), link.to.clone())
        })
    }
}

/// Build the application source configured from the engine settings.
fn build_app_source(spec: &PipelineSpec, settings: &EngineSettings) -> gst_app::AppSrc {
    // validate_topology guarantees exactly one source element
    let name = spec
        .source()
        .map(|e| e.id.as_str())
        .unwrap_or("source");

    gst_app::AppSrc::builder()
        .name(name)
        .max_bytes(settings.source.max_queue_bytes)
        .block(settings.source.block_on_full)
        .is_live(settings.source.is_live)
        .build()
}

/// Reject descriptions the controller cannot own: duplicate ids, a missing
/// or ambiguous source, or a pipeline with nothing to consume the stream.
fn validate_topology(spec: &PipelineSpec) -> Result<(), PipelineError> {
    let mut seen = HashSet::new();
    for element in &spec.elements {
        if !seen.insert(element.id.as_str()) {
            return Err(PipelineError::DuplicateElement(element.id.clone()));
        }
    }

    let sources = spec.ids_with_role(ElementRole::Source);
    if sources.len() != 1 {
        return Err(PipelineError::InvalidTopology(format!(
            "expected exactly one source element, found {}",
            sources.len()
        )));
    }
    if spec.ids_with_role(ElementRole::Sink).is_empty() {
        return Err(PipelineError::InvalidTopology(
            "pipeline has no sink element".to_string(),
        ));
    }

    for link in &spec.links {
        if !seen.contains(link.from.as_str()) {
            return Err(PipelineError::ElementNotFound(link.from.clone()));
        }
        if !seen.contains(link.to.as_str()) {
            return Err(PipelineError::ElementNotFound(link.to.clone()));
        }
    }

    Ok(())
}
