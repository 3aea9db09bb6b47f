use plwasm::engine::testing::{Outcome, Scenario, ScriptedEngine};
use plwasm::engine::{CompileError, EnumEntry, EvalError, LogLevel, Node};
use plwasm::{split_transcript, RunOutcome, Session, SessionConfigBuilder, SessionState, SENTINEL};
use pretty_assertions::assert_eq;

const HEADER: &str = r#"
struct Header {
    u8 magic [[property("Header", "magic")]];
    s16 delta [[property("Header", "delta")]];
    Mode mode [[property("Header", "mode")]];
    char tag[4] [[property("Meta", "tag")]];
    u8 flags [[property("Header")]];
};
Header header @ 0x00;
"#;

fn header_nodes() -> Vec<Node> {
    vec![
        Node::unsigned("magic", 1).with_attribute("property", ["Header", "magic"]),
        Node::signed("delta", 2).with_attribute("property", ["Header", "delta"]),
        Node::enumeration(
            "mode",
            1,
            vec![EnumEntry::value("Read", 0), EnumEntry::range("Write", 1, 3)],
        )
        .with_attribute("property", ["Header", "mode"]),
        Node::string("tag", 4).with_attribute("property", ["Meta", "tag"]),
        Node::unsigned("flags", 1).with_attribute("property", ["Header"]),
        Node::unsigned("padding", 3),
    ]
}

fn header_session() -> Session<ScriptedEngine> {
    let _ = env_logger::builder().is_test(true).try_init();
    let engine = ScriptedEngine::new().with_scenario(
        HEADER,
        Scenario::new()
            .log(LogLevel::Info, "parsing header")
            .read(0, 4)
            .nodes(header_nodes()),
    );
    let mut session = Session::new(engine);
    session.initialize();
    session
}

#[test]
fn header_run_produces_schema_and_transcript() -> anyhow::Result<()> {
    let mut session = header_session();
    session.bind(vec![0x7Fu8, 0x45, 0x4C, 0x46, 0x00]);

    assert_eq!(session.run(HEADER), RunOutcome::Succeeded);
    assert_eq!(session.state(), SessionState::Succeeded);
    assert_eq!(session.properties().len(), 4);

    insta::assert_snapshot!(session.schema_json()?, @r#"[{"categoryName":"Header","items":[{"id":1,"name":"delta","properties":{"max":32767,"min":-32768},"type":"signed"},{"id":0,"name":"magic","properties":{"max":255,"min":0},"type":"unsigned"},{"id":2,"name":"mode","properties":{"fields":[{"name":"Read","value":0},{"name":"Write","value":1}]},"type":"enum"}]},{"categoryName":"Meta","items":[{"id":3,"name":"tag","properties":{"length":4},"type":"string"}]}]"#);

    assert_eq!(
        session.transcript(),
        "[INFO]  parsing header\n\x01[DEBUG] 0x00000000: 7F 45 4C 46\n\x01"
    );
    Ok(())
}

#[test]
fn repeated_runs_are_deterministic() -> anyhow::Result<()> {
    let mut session = header_session();
    session.bind(vec![0u8; 8]);

    session.run(HEADER);
    let (transcript, schema) = (session.transcript(), session.schema_json()?);

    session.bind(vec![0u8; 8]);
    session.run(HEADER);
    assert_eq!(session.transcript(), transcript);
    assert_eq!(session.schema_json()?, schema);
    assert_eq!(session.engine().executions(), 2);
    Ok(())
}

#[test]
fn every_record_is_sentinel_terminated() {
    let errors = vec![
        CompileError::new("unexpected token '}'").at("<Source Code>", 3, 9),
        CompileError::new("unknown type 'Mode'")
            .at("<Source Code>", 4, 5)
            .with_description("declare it before use"),
    ];
    let engine = ScriptedEngine::new().with_scenario(
        "broken",
        Scenario::new()
            .log(LogLevel::Debug, "lexing")
            .log(LogLevel::Warn, "shadowed name")
            .outcome(Outcome::CompileErrors(errors)),
    );
    let mut session = Session::new(engine);

    assert_eq!(session.run("broken"), RunOutcome::CompileFailed);
    let transcript = session.transcript();
    assert_eq!(transcript.matches(SENTINEL).count(), 4);
    assert!(transcript.ends_with("\n\x01"));

    let lines = split_transcript(&transcript);
    let levels: Vec<_> = lines.iter().map(|l| l.level).collect();
    assert_eq!(levels, [Some(LogLevel::Debug), Some(LogLevel::Warn), None, None]);
    assert_eq!(
        lines[3].text,
        "error: unknown type 'Mode'\n  -->   in <Source Code>:4:5\n\ndeclare it before use"
    );
}

#[test]
fn compile_and_eval_failures_are_exclusive() {
    let engine = ScriptedEngine::new()
        .with_scenario(
            "compile",
            Scenario::new().outcome(Outcome::CompileErrors(vec![CompileError::new("bad")])),
        )
        .with_scenario(
            "eval",
            Scenario::new().outcome(Outcome::EvalError(EvalError::new(2, 4, "division by zero"))),
        );
    let mut session = Session::new(engine);

    session.run("compile");
    assert!(!session.transcript().contains("division"));

    assert_eq!(session.run("eval"), RunOutcome::EvalFailed);
    assert_eq!(session.transcript(), "2:4  division by zero\n\x01");
}

#[test]
fn out_of_range_read_is_an_eval_error() {
    let engine = ScriptedEngine::new().with_scenario("far", Scenario::new().read(0x10, 1));
    let mut session = Session::new(engine);
    session.bind(vec![0u8; 4]);

    assert_eq!(session.run("far"), RunOutcome::EvalFailed);
    assert_eq!(session.transcript(), "1:1  address 0x10 out of range (data size 0x4)\n\x01");
}

#[test]
fn dangerous_calls_are_refused() {
    let engine = ScriptedEngine::new()
        .with_scenario("rm", Scenario::new().dangerous_call("std::file::remove"));
    let mut session = Session::new(engine);
    session.initialize();

    assert_eq!(session.run("rm"), RunOutcome::EvalFailed);
    assert_eq!(
        session.transcript(),
        "[ERROR] call to dangerous function 'std::file::remove' was denied\n\x01\
         1:1  dangerous function call denied\n\x01"
    );
}

#[test]
fn fault_leaves_last_schema_in_place() -> anyhow::Result<()> {
    let mut session = header_session();
    session.engine_mut().register(
        "oom",
        Scenario::new().outcome(Outcome::Fault("std::bad_alloc".into())),
    );

    session.run(HEADER);
    let schema = session.schema_json()?;

    assert_eq!(session.run("oom"), RunOutcome::ExceptionRaised);
    assert_eq!(session.schema_json()?, schema);
    assert_eq!(session.transcript(), "[ERROR]: Exception thrown: std::bad_alloc\n\x01");
    Ok(())
}

#[test]
fn configured_source_label_reaches_diagnostics() {
    let config = SessionConfigBuilder::new()
        .with_source_label("pattern.hexpat")
        .with_include_paths(["/usr/share/patterns"])
        .get();
    let mut session = Session::with_config(ScriptedEngine::new(), config);
    session.initialize();

    assert_eq!(session.run("not registered"), RunOutcome::CompileFailed);
    assert_eq!(
        session.transcript(),
        "error: unknown script\n  -->   in pattern.hexpat:1:1\n\x01"
    );
    assert_eq!(
        session.engine().include_paths(),
        [std::path::PathBuf::from("/usr/share/patterns")]
    );
}
