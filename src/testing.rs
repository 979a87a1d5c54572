//! Plan fixtures shared by unit tests.

use crate::plan::{JobNode, OpCode, OperatorSpec, Stream, StreamEdge};

pub fn stream(id: &str) -> Stream {
    Stream::new(id, "kafka", format!("{id}-topic"), 4)
}

pub fn edge(id: &str, sources: &[&str], targets: &[&str]) -> StreamEdge {
    let edge = sources
        .iter()
        .fold(StreamEdge::new(stream(id)), |e, job| e.with_source_job(*job));
    targets.iter().fold(edge, |e, job| e.with_target_job(*job))
}

/// `input -> map -> output` reading `input` and writing `output`, neither shared.
pub fn linear_job(name: &str, input: &str, output: &str) -> JobNode {
    let mut job = JobNode::new(name, "1");
    job.add_input(edge(input, &[], &[name]), Some("input"));
    job.add_output(edge(output, &[name], &[]));
    job.add_operator(OperatorSpec::new("input", OpCode::Input).with_next("map"));
    job.add_operator(
        OperatorSpec::new("map", OpCode::Map)
            .with_source_location(format!("{name}.rs:10"))
            .with_next("send"),
    );
    job.add_operator(OperatorSpec::new("send", OpCode::Output).with_output_stream(output));
    job
}
