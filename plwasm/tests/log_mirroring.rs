use std::sync::{Mutex, Once};

use log::{Level, Log, Metadata, Record};
use plwasm::engine::testing::{Scenario, ScriptedEngine};
use plwasm::engine::LogLevel;
use plwasm::{RunOutcome, Session};
use pretty_assertions::assert_eq;

static RECORDS: Mutex<Vec<(String, Level, String)>> = Mutex::new(Vec::new());
static CAPTURE: Capture = Capture;
static INSTALL: Once = Once::new();

struct Capture;

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.lock().expect("records poisoned").push((
            record.target().to_string(),
            record.level(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

fn captured(target: &str) -> Vec<(String, Level, String)> {
    RECORDS
        .lock()
        .expect("records poisoned")
        .iter()
        .filter(|(t, _, _)| t == target)
        .cloned()
        .collect()
}

#[test]
fn engine_records_reach_the_log_facade_at_their_own_level() {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).expect("logger already installed");
        log::set_max_level(log::LevelFilter::Trace);
    });

    let engine = ScriptedEngine::new().with_scenario(
        "hdr",
        Scenario::new()
            .log(LogLevel::Info, "parsing header")
            .log(LogLevel::Warn, "trailing bytes")
            .read(0, 2),
    );
    let mut session = Session::new(engine);
    session.bind(vec![0xCAu8, 0xFE]);
    assert_eq!(session.run("hdr"), RunOutcome::Succeeded);

    assert_eq!(
        captured("plwasm::engine"),
        [
            ("plwasm::engine".to_string(), Level::Info, "parsing header".to_string()),
            ("plwasm::engine".to_string(), Level::Warn, "trailing bytes".to_string()),
            ("plwasm::engine".to_string(), Level::Debug, "0x00000000: CA FE".to_string()),
        ]
    );
    assert!(captured("plwasm::session")
        .iter()
        .any(|(_, level, message)| *level == Level::Info && message == "0 properties produced!"));
}
