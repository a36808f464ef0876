use assert_matches::assert_matches;
use rustplay_core::{JobId, JobStatus, Output, Target};
use rustplay_events::{EventBus, EventLog, JobEvent, JobOutcome};

#[tokio::test]
async fn writes_one_line_per_event_until_bus_closes() {
    let bus = EventBus::default();
    let receiver = bus.subscribe();
    let task = tokio::spawn(EventLog::run(Vec::<u8>::new(), receiver));

    let id = JobId::new();
    bus.publish(JobEvent::started(id, Target::Run));
    bus.publish(JobEvent::finished(
        id,
        JobStatus::Succeeded,
        JobOutcome::Output(Output {
            stdout: "Hello".into(),
            ..Default::default()
        }),
    ));
    drop(bus);

    let written = task.await.expect("event log task should not panic");
    let text = String::from_utf8(written).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let started: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(started["event"], "job_started");
    assert_eq!(started["target"], "run");
    assert_eq!(started["id"], id.to_string());

    let finished: JobEvent = serde_json::from_str(lines[1]).unwrap();
    assert_matches!(
        finished,
        JobEvent::JobFinished {
            status: JobStatus::Succeeded,
            outcome: JobOutcome::Output(Output { ref stdout, .. }),
            ..
        } if stdout == "Hello"
    );
}

#[tokio::test]
async fn empty_bus_produces_empty_log() {
    let bus = EventBus::default();
    let task = tokio::spawn(EventLog::run(Vec::<u8>::new(), bus.subscribe()));
    drop(bus);

    let written = task.await.unwrap();
    assert!(written.is_empty());
}
