//! End-to-end scenarios over small, hand-checked event logs.

use pepper_mining::conformance::DiffOp;
use pepper_mining::prelude::*;
use pepper_mining::violation::ViolationSubject;
use pretty_assertions::assert_eq;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once; `RUST_LOG` selects the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_target(false)
        .try_init();
}

fn event_table(rows: &[[&str; 4]]) -> RawTable {
    let mut table = RawTable::new(["case_id", "activity", "event_time", "user"]).unwrap();
    for row in rows {
        table.push_row(*row).unwrap();
    }
    table
}

fn load(rows: &[[&str; 4]]) -> SharedView {
    let mut data = ProcessData::new();
    data.load_event_table(&event_table(rows)).unwrap();
    data.into_shared()
}

fn two_cases() -> SharedView {
    load(&[
        ["1", "a", "2022-02-01 09:00:00", "Pete"],
        ["1", "b", "2022-02-01 10:00:00", "Pete"],
        ["1", "c", "2022-02-01 11:00:00", "Sue"],
        ["2", "a", "2022-02-02 09:00:00", "Mike"],
        ["2", "c", "2022-02-02 09:30:00", "Mike"],
    ])
}

fn model(rows: &[(&str, &str)]) -> ProcessModel {
    let mut table = RawTable::new(["activity", "sorting"]).unwrap();
    for (activity, sorting) in rows {
        table.push_row([*activity, *sorting]).unwrap();
    }
    ProcessModel::from_table(&table).unwrap()
}

/// Test a case missing a model step is reported as a deletion.
#[test]
fn test_conformance_deletion_scenario() {
    init_tracing();
    let abc = model(&[("c", "3"), ("a", "1"), ("b", "2")]);
    let checker = ConformanceChecker::new(two_cases(), [&abc]).unwrap();

    let case_1 = checker.result("1").unwrap();
    assert!(!case_1.has_violation);
    assert!(case_1.diagnostic.is_none());

    let case_2 = checker.result("2").unwrap();
    assert!(case_2.has_violation);
    let diff = case_2.diagnostic.as_ref().unwrap().against(abc.id()).unwrap();
    assert_eq!(
        diff.ops(),
        &[DiffOp::Deleted {
            activity: "b".to_string(),
            model_position: 1,
        }]
    );

    let summary = checker.get_summary(&["NumberOfCases"]).unwrap();
    assert_eq!(summary[0].value, Some(1.0));
}

/// Test the skipped step is an undesired connection unless a model declares it.
#[test]
fn test_undesired_connection_both_ways() {
    init_tracing();
    let abc = model(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let detector = UndesiredConnection::new(two_cases(), [&abc]).unwrap();
    assert_eq!(detector.violations().len(), 1);
    assert_eq!(
        detector.violations()[0].subject,
        ViolationSubject::Transition {
            from: "a".to_string(),
            to: "c".to_string(),
        }
    );
    assert_eq!(detector.violations()[0].case_ids, vec!["2"]);

    let ac = model(&[("a", "1"), ("c", "2")]);
    let detector = UndesiredConnection::new(two_cases(), [&abc, &ac]).unwrap();
    assert!(detector.violations().is_empty());
}

/// Test segregation of duties is grouped by user.
#[test]
fn test_run_by_same_user_scenario() {
    init_tracing();
    let view = load(&[
        ["1", "register", "2022-02-01 09:00:00", "Pete"],
        ["1", "check ticket", "2022-02-01 10:00:00", "Sue"],
        ["1", "decide", "2022-02-01 11:00:00", "Sara"],
        ["2", "register", "2022-02-02 09:00:00", "Pete"],
        ["2", "check ticket", "2022-02-02 10:00:00", "Mike"],
        ["2", "decide", "2022-02-02 11:00:00", "Mike"],
    ]);
    let detector = RunBySameUser::new(view, ["check ticket", "decide"]).unwrap();

    assert_eq!(detector.violations().len(), 1);
    let violation = &detector.violations()[0];
    assert_eq!(violation.subject, ViolationSubject::User("Mike".to_string()));
    assert_eq!(violation.case_ids, vec!["2"]);
    assert_eq!(violation.violation_type, ViolationType::RunBySameUser);

    let rows = detector.get_violation(&["NumberOfEvents"]).unwrap();
    assert_eq!(rows[0].kpi("NumberOfEvents"), Some(3.0));
}

/// Test a full pipeline from raw tables through a filter chain.
#[test]
fn test_filter_chain_pipeline() {
    init_tracing();
    let mut data = ProcessData::new();
    data.load_event_table(&event_table(&[
        ["1", "a", "2022-02-01 09:00:00", "Pete"],
        ["1", "b", "2022-02-01 10:00:00", ""],
        ["2", "a", "2022-02-02 09:00:00", "Mike"],
        ["3", "b", "2022-02-03 09:00:00", "Sara"],
        ["3", "a", "2022-02-03 08:00:00", "Sara"],
        ["3", "c", "2022-02-03 10:00:00", "Sara"],
    ]))
    .unwrap();
    let cases = RawTable::new(["case_id", "channel"])
        .unwrap()
        .with_row(["1", "web"])
        .unwrap()
        .with_row(["3", "web"])
        .unwrap();
    data.load_case_table(&cases).unwrap();
    let root = data.into_shared();

    let sized = CaseSizeFilter::new(root.clone(), 2, 10).unwrap().into_shared();
    let started = CaseStartActivityFilter::new(sized, ["a"], FilterMode::Contain).unwrap();
    assert_eq!(
        started.filter_description(),
        "[None] [Filter by case size (2, 10)] [Filter by START activity (a)]"
    );
    assert_eq!(
        started.cases().case_ids().collect::<Vec<_>>(),
        vec!["1", "3"]
    );
    assert_eq!(started.variants().len(), 2);
    assert!(started.variants().get("a->b->c").is_some());

    let causes = root_cause_analysis(&started, 5);
    assert_eq!(causes[0].column, "channel");
    assert_eq!(causes[0].frequencies[0].number_of_cases, 2);
    assert_eq!(causes[0].frequencies[0].percent_of_cases, 100.0);

    assert_eq!(root.cases().len(), 3);
    assert_eq!(root.cases().get("2").unwrap().attribute("channel"), None);
}

/// Test KPI-augmented accessors and unknown KPI errors.
#[test]
fn test_kpi_augmented_views() {
    init_tracing();
    let view = two_cases();

    let variants = view.variants_with_kpis(&["NumberOfCases", "ThroughputTime"]).unwrap();
    assert_eq!(variants.len(), 2);
    let ac = variants.iter().find(|v| v.row.key == "a->c").unwrap();
    assert_eq!(ac.kpi("NumberOfCases"), Some(1.0));
    assert_eq!(ac.kpi("ThroughputTimeMax"), Some(1800.0));

    let activities = view.activities_with_kpis(&["NumberOfEvents"]).unwrap();
    assert_eq!(activities[0].row, "a");
    assert_eq!(activities[0].kpi("NumberOfEvents"), Some(2.0));

    assert!(matches!(
        view.cases_with_kpis(&["NoSuchKpi"]),
        Err(MiningError::UnknownKpi(_))
    ));
    assert!(matches!(
        view.cases_with_kpis(&["AverageEventsPerCase"]),
        Err(MiningError::KpiNotImplemented { .. })
    ));
}

/// Test configuration loaded from a file drives ingestion and overview.
#[test]
fn test_config_file_drives_analysis() {
    init_tracing();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[ingest]\ntime_format = \"%d/%m/%Y %H:%M\"\n\n[analysis]\nroot_cause_top = 1\nsummary_kpis = [\"NumberOfCases\", \"Rework\"]"
    )
    .unwrap();
    let config = load_config(file.path()).unwrap();

    let mut data = ProcessData::with_config(config);
    let table = RawTable::new(["case_id", "activity", "event_time"])
        .unwrap()
        .with_row(["1", "a", "01/02/2022 09:00"])
        .unwrap()
        .with_row(["1", "a", "01/02/2022 10:00"])
        .unwrap();
    data.load_event_table(&table).unwrap();

    let overview = data.overview().unwrap();
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0].value, Some(1.0));
    assert_eq!(overview[1].value, Some(1.0));
}

/// Test the process flow exposes Start/End edges for renderers.
#[test]
fn test_process_flow_for_renderer() {
    init_tracing();
    let view = two_cases();
    let flow = ProcessFlow::discover(view.as_ref());

    let start_a = flow.edge(&FlowNode::Start, &FlowNode::activity("a")).unwrap();
    assert_eq!(start_a.cases, 2);
    let c_end = flow.edge(&FlowNode::activity("c"), &FlowNode::End).unwrap();
    assert_eq!(c_end.cases, 2);

    let json = serde_json::to_string(&flow).unwrap();
    assert!(json.contains("\"Start\""));
}
