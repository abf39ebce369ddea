use rustc_hash::FxHashMap;

use crate::capture::{BatchSink, CaptureBatcher};
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::logging::log_console;
use crate::traits::CaptureNode;

/// Name the browser worklet registers the capture processor under.
pub const CAPTURE_PROCESSOR_ID: &str = "level-capture-processor";

pub type BoxedNode = Box<dyn CaptureNode>;

/// Builds a node for one pipeline slot, handing it the sink its batches go to.
pub type NodeFactory<S> = fn(&CaptureConfig, S) -> Result<BoxedNode, CaptureError>;

/// Lookup table from stable identifier to node factory.
///
/// The host owns the registry and passes it wherever nodes get created; there is
/// no process-wide instance.
pub struct ProcessorRegistry<S> {
    factories: FxHashMap<&'static str, NodeFactory<S>>,
}

impl<S> Default for ProcessorRegistry<S> {
    fn default() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }
}

impl<S> ProcessorRegistry<S>
where
    S: BatchSink + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the capture batcher under [`CAPTURE_PROCESSOR_ID`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CAPTURE_PROCESSOR_ID, capture_factory::<S>);
        registry
    }

    /// Adds or replaces a factory, returning the one it replaced.
    pub fn register(&mut self, id: &'static str, factory: NodeFactory<S>) -> Option<NodeFactory<S>> {
        self.factories.insert(id, factory)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub fn create(
        &self,
        id: &str,
        config: &CaptureConfig,
        sink: S,
    ) -> Result<BoxedNode, CaptureError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| CaptureError::UnknownProcessor(id.to_string()))?;
        let node = factory(config, sink)?;
        log_console(&format!(
            "created {} node with batch capacity {}",
            id,
            node.capacity()
        ));
        Ok(node)
    }
}

fn capture_factory<S>(config: &CaptureConfig, sink: S) -> Result<BoxedNode, CaptureError>
where
    S: BatchSink + Send + 'static,
{
    Ok(Box::new(CaptureBatcher::from_config(config, sink)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Batch;
    use crate::capture::batch_channel;
    use crate::capture::BatchSender;

    #[test]
    fn default_registry_builds_capture_node() {
        let registry = ProcessorRegistry::<BatchSender>::with_defaults();
        assert!(registry.contains(CAPTURE_PROCESSOR_ID));

        let (tx, mut rx) = batch_channel(4);
        let config = CaptureConfig {
            batch_capacity: 16,
            ..CaptureConfig::default()
        };
        let mut node = registry.create(CAPTURE_PROCESSOR_ID, &config, tx).unwrap();
        assert_eq!(node.capacity(), 16);

        node.process(Some(&[0.5; 20]));
        assert_eq!(node.pending_len(), 4);
        assert_eq!(node.stats().emitted, 1);
        assert_eq!(rx.try_recv().map(|batch| batch.len()), Some(16));
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let registry = ProcessorRegistry::<Vec<Batch>>::with_defaults();
        let err = registry
            .create("level-meter", &CaptureConfig::default(), Vec::new())
            .err()
            .unwrap();
        assert!(matches!(err, CaptureError::UnknownProcessor(id) if id == "level-meter"));
    }

    #[test]
    fn invalid_config_fails_construction() {
        let registry = ProcessorRegistry::<Vec<Batch>>::with_defaults();
        let config = CaptureConfig {
            batch_capacity: 0,
            ..CaptureConfig::default()
        };
        let err = registry
            .create(CAPTURE_PROCESSOR_ID, &config, Vec::new())
            .err()
            .unwrap();
        assert!(matches!(err, CaptureError::ZeroCapacity));
    }

    #[test]
    fn register_replaces_existing_factory() {
        fn tiny(_: &CaptureConfig, sink: Vec<Batch>) -> Result<BoxedNode, CaptureError> {
            Ok(Box::new(CaptureBatcher::new(2, sink)))
        }

        let mut registry = ProcessorRegistry::<Vec<Batch>>::new();
        assert!(registry.ids().next().is_none());
        assert!(registry.register(CAPTURE_PROCESSOR_ID, tiny).is_none());
        assert!(registry.register(CAPTURE_PROCESSOR_ID, tiny).is_some());

        let node = registry
            .create(CAPTURE_PROCESSOR_ID, &CaptureConfig::default(), Vec::new())
            .unwrap();
        assert_eq!(node.capacity(), 2);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![CAPTURE_PROCESSOR_ID]);
    }
}
