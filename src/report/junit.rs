use super::types::RunReport;
use crate::runner::state::{RunSummary, TestEvent, TestStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML from a run, one `<testsuite>` per test class
pub fn generate_junit_xml(report: &RunReport) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut by_class: BTreeMap<&str, Vec<&TestEvent>> = BTreeMap::new();
    for event in &report.events {
        by_class.entry(class_of(event)).or_default().push(event);
    }

    let summary = &report.summary;
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", report.report_name.as_str()));
    suites_start.push_attribute(("tests", summary.total.to_string().as_str()));
    suites_start.push_attribute(("failures", summary.failed.to_string().as_str()));
    suites_start.push_attribute(("skipped", summary.skipped.to_string().as_str()));
    suites_start.push_attribute(("time", seconds(summary.total_duration_ms).as_str()));
    writer.write_event(Event::Start(suites_start))?;

    for (class_name, events) in &by_class {
        let owned: Vec<TestEvent> = events.iter().map(|e| (*e).clone()).collect();
        let counts = RunSummary::from_events(&owned);
        let time: u64 = events.iter().filter_map(|e| e.duration_ms).sum();

        let mut suite_start = BytesStart::new("testsuite");
        suite_start.push_attribute(("name", *class_name));
        suite_start.push_attribute(("tests", counts.total.to_string().as_str()));
        suite_start.push_attribute(("failures", counts.failed.to_string().as_str()));
        suite_start.push_attribute(("skipped", counts.skipped.to_string().as_str()));
        suite_start.push_attribute(("id", report.run_id.as_str()));
        suite_start.push_attribute(("time", seconds(Some(time)).as_str()));
        suite_start.push_attribute((
            "timestamp",
            report.started_at.format("%Y-%m-%dT%H:%M:%S").to_string().as_str(),
        ));
        writer.write_event(Event::Start(suite_start))?;

        for event in events {
            write_test_case(&mut writer, class_name, event)?;
        }

        writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}

fn class_of(event: &TestEvent) -> &str {
    event
        .test_identifier
        .split_once(" :: ")
        .map(|(class, _)| class)
        .unwrap_or("default")
}

fn seconds(ms: Option<u64>) -> String {
    (ms.unwrap_or(0) as f64 / 1000.0).to_string()
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    class_name: &str,
    event: &TestEvent,
) -> Result<()> {
    let case_name = match &event.context {
        Some(context) => format!("{} [{}]", event.test_name, context),
        None => event.test_name.clone(),
    };
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", case_name.as_str()));
    case_start.push_attribute(("classname", class_name));
    case_start.push_attribute(("time", seconds(event.duration_ms).as_str()));
    writer.write_event(Event::Start(case_start))?;

    match event.status {
        TestStatus::Pass => {}
        TestStatus::Fail => {
            let message = event.message.as_deref().unwrap_or("Unknown error");
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", message));
            fail_start.push_attribute(("type", "AssertionError"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(BytesText::new(message)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        TestStatus::Skip => {
            let mut skip = BytesStart::new("skipped");
            if let Some(message) = &event.message {
                skip.push_attribute(("message", message.as_str()));
            }
            writer.write_event(Event::Empty(skip))?;
        }
    }

    if let Some(path) = &event.screenshot_path {
        writer.write_event(Event::Start(BytesStart::new("system-out")))?;
        writer.write_event(Event::Text(BytesText::new(&format!(
            "[[ATTACHMENT|{}]]",
            path
        ))))?;
        writer.write_event(Event::End(BytesEnd::new("system-out")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Generate JUnit report
pub async fn generate(report: &RunReport, output: Option<&Path>) -> Result<()> {
    let xml = generate_junit_xml(report)?;

    if let Some(path) = output {
        std::fs::write(path, xml)?;
        println!("JUnit report saved to: {}", path.display());
    } else {
        println!("{}", xml);
    }

    Ok(())
}
