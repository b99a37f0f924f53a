// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Integration tests for the engine driver (§4.8): wiring `Flow::new`
//! together with graph construction and device placement the way an
//! embedding application does, rather than poking at `compile`/
//! `plan_placements` in isolation.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::config::EngineConfig;
    use crate::data::Record;
    use crate::engine::{Flow, NodeImpls};
    use crate::errors::FlowError;
    use crate::graph::{DevicePreference, Graph, NodeKind};
    use crate::traits::{Consumer, NodeError, Processor, Producer};

    struct OneShotProducer(Option<i32>);

    impl Producer for OneShotProducer {
        fn next(&mut self) -> Result<Option<Record>, NodeError> {
            Ok(self.0.take().map(Record::new))
        }
    }

    struct Identity;

    impl Processor for Identity {
        fn process(&self, inputs: Vec<Record>) -> Result<Record, NodeError> {
            Ok(inputs.into_iter().next().unwrap())
        }
    }

    struct CollectConsumer(Arc<Mutex<Vec<i32>>>);

    impl Consumer for CollectConsumer {
        fn consume(&mut self, inputs: Vec<Record>) -> Result<(), NodeError> {
            self.0.lock().unwrap().push(*inputs[0].downcast_ref::<i32>().unwrap());
            Ok(())
        }
    }

    #[test]
    fn flow_new_rejects_an_unreachable_consumer_before_spawning_anything() {
        let mut graph = Graph::new();
        let producer = graph.add_node(Some("producer".into()), NodeKind::Producer);
        let sink = graph.add_node(Some("sink".into()), NodeKind::consumer());
        let stray = graph.add_node(Some("stray".into()), NodeKind::consumer());
        // `sink` is never wired to the producer; `stray` is wired to nothing.
        let _ = stray;

        let impls = NodeImpls::new().with_producer(Box::new(OneShotProducer(Some(1))));
        let err = Flow::new(graph, producer, &[sink], impls, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, FlowError::Construction(_)));
    }

    #[test]
    fn flow_new_rejects_a_gpu_required_processor_when_no_accelerator_exists() {
        let mut graph = Graph::new();
        let producer = graph.add_node(Some("producer".into()), NodeKind::Producer);
        let gpu_only = graph.add_node(
            Some("gpu_only".into()),
            NodeKind::processor(1, DevicePreference::GpuRequired),
        );
        let sink = graph.add_node(Some("sink".into()), NodeKind::consumer());
        graph.wire(gpu_only, &[producer]).unwrap();
        graph.wire(sink, &[gpu_only]).unwrap();

        let impls = NodeImpls::new()
            .with_producer(Box::new(OneShotProducer(Some(1))))
            .with_processor(gpu_only, Arc::new(Identity))
            .with_consumer(sink, Box::new(CollectConsumer(Arc::new(Mutex::new(Vec::new())))));

        // This test environment has no accelerators, so a GPU-required node
        // must fail placement rather than silently run on CPU.
        let err = Flow::new(graph, producer, &[sink], impls, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, FlowError::Placement(_)));
    }

    #[test]
    fn flow_runs_a_tiny_pipeline_to_completion() {
        let mut graph = Graph::new();
        let producer = graph.add_node(Some("producer".into()), NodeKind::Producer);
        let identity = graph.add_node(Some("identity".into()), NodeKind::processor(1, DevicePreference::Cpu));
        let sink = graph.add_node(Some("sink".into()), NodeKind::consumer());
        graph.wire(identity, &[producer]).unwrap();
        graph.wire(sink, &[identity]).unwrap();

        let items = Arc::new(Mutex::new(Vec::new()));
        let impls = NodeImpls::new()
            .with_producer(Box::new(OneShotProducer(Some(42))))
            .with_processor(identity, Arc::new(Identity))
            .with_consumer(sink, Box::new(CollectConsumer(items.clone())));

        let mut flow = Flow::new(graph, producer, &[sink], impls, EngineConfig::default()).unwrap();
        flow.run();
        flow.join();

        assert_eq!(*items.lock().unwrap(), vec![42]);
    }
}
