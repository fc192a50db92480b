use lightkeep_core::model::BudgetViolation;
use lightkeep_core::providers::audit::fake::sample_report;
use lightkeep_core::report::decompose::decompose;
use serde_json::{json, Value};

const FETCH_TIME: &str = "2026-08-29T10:00:00.000Z";

fn report() -> Value {
    sample_report("https://example.com", FETCH_TIME)
}

#[test]
fn page_size_is_bytes_divided_by_1024_exactly() {
    let mut payload = report();
    payload["audits"]["total-byte-weight"]["numericValue"] = json!(2048.0);

    let bundle = decompose("https://example.com", Some("landing"), None, &payload).unwrap();
    assert_eq!(bundle.metrics.page_size_kb, 2.0);
    assert_eq!(bundle.key.fetch_time, FETCH_TIME);
    assert_eq!(bundle.key.template.as_deref(), Some("landing"));
}

#[test]
fn one_opportunity_per_opportunity_typed_entry_verbatim() {
    let mut payload = report();
    payload["audits"]["unused-css-rules"] = json!({
        "title": "Reduce unused CSS",
        "details": { "type": "opportunity", "overallSavingsMs": 180.0 }
    });

    let bundle = decompose("https://example.com", None, None, &payload).unwrap();
    assert_eq!(bundle.opportunities.len(), 2);

    let texts: Vec<&str> = bundle
        .opportunities
        .iter()
        .map(|o| o.audit_text.as_str())
        .collect();
    assert!(texts.contains(&"Eliminate render-blocking resources"));
    assert!(texts.contains(&"Reduce unused CSS"));

    let css = bundle
        .opportunities
        .iter()
        .find(|o| o.audit_text == "Reduce unused CSS")
        .unwrap();
    assert_eq!(css.estimated_savings_ms, 180.0);
}

#[test]
fn missing_metric_key_is_a_hard_error() {
    let mut payload = report();
    payload["audits"].as_object_mut().unwrap().remove("speed-index");

    let err = decompose("https://example.com", None, None, &payload).unwrap_err();
    assert!(err.to_string().contains("speed-index"));
}

#[test]
fn missing_fetch_time_is_a_hard_error() {
    let mut payload = report();
    payload.as_object_mut().unwrap().remove("fetchTime");

    assert!(decompose("https://example.com", None, None, &payload).is_err());
}

#[test]
fn perfect_score_diagnostic_yields_zero_items_but_keeps_its_group() {
    let payload = report();
    let bundle = decompose("https://example.com", None, None, &payload).unwrap();

    // Every whitelisted diagnostic is present as a group, populated or not.
    let ids: Vec<&str> = bundle.diagnostics.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "mainthread-work-breakdown",
            "bootup-time",
            "font-display",
            "third-party-summary",
            "dom-size"
        ]
    );

    // bootup-time has items in the report but a perfect score.
    let bootup = bundle
        .diagnostics
        .iter()
        .find(|g| g.id == "bootup-time")
        .unwrap();
    assert!(bootup.items.is_empty());
}

#[test]
fn imperfect_diagnostic_maps_items_per_its_field_mapping() {
    let mut payload = report();
    payload["audits"]["third-party-summary"] = json!({
        "score": 0.5,
        "details": { "items": [
            { "entity": { "text": "Analytics Co" }, "blockingTime": 120.0 },
            { "entity": { "text": "Ads Co" }, "blockingTime": 45.0 }
        ]}
    });

    let bundle = decompose("https://example.com", None, None, &payload).unwrap();

    let third_party = bundle
        .diagnostics
        .iter()
        .find(|g| g.id == "third-party-summary")
        .unwrap();
    assert_eq!(third_party.items.len(), 2);
    assert_eq!(third_party.items[0].label, "Analytics Co");
    assert_eq!(third_party.items[0].value, 120.0);
    assert_eq!(third_party.items[1].label, "Ads Co");
    assert_eq!(third_party.items[1].value, 45.0);

    // mainthread-work-breakdown (score 0.55) maps groupLabel/duration.
    let mainthread = bundle
        .diagnostics
        .iter()
        .find(|g| g.id == "mainthread-work-breakdown")
        .unwrap();
    assert_eq!(mainthread.items.len(), 2);
    assert_eq!(mainthread.items[0].label, "Script Evaluation");
    assert_eq!(mainthread.items[0].value, 820.0);

    // dom-size (score 0.9) maps statistic/value.
    let dom = bundle.diagnostics.iter().find(|g| g.id == "dom-size").unwrap();
    assert_eq!(dom.items.len(), 1);
    assert_eq!(dom.items[0].label, "Total DOM Elements");
    assert_eq!(dom.items[0].value, 1450.0);
}

#[test]
fn absent_resource_type_defaults_to_other() {
    let payload = report();
    let bundle = decompose("https://example.com", None, None, &payload).unwrap();

    assert_eq!(bundle.resources.len(), 2);
    assert_eq!(bundle.resources[0].resource_type, "Script");
    assert_eq!(bundle.resources[1].resource_type, "Other");
    assert_eq!(
        bundle.resources[1].resource_url,
        "https://example.com/static/logo.png"
    );
}

#[test]
fn budget_violations_extracted_with_defaults() {
    let mut payload = report();
    payload["audits"]["performance-budget"] = json!({
        "details": { "items": [
            {
                "label": "Script",
                "requestCount": 10,
                "transferSize": 120000,
                "countOverBudget": "2 requests",
                "sizeOverBudget": 2048
            },
            { "label": "Image" }
        ]}
    });
    payload["audits"]["timing-budget"] = json!({
        "details": { "items": [
            { "label": "First Contentful Paint", "measurement": 3000.0, "overBudget": 1000.0 }
        ]}
    });

    let bundle = decompose("https://example.com", None, None, &payload).unwrap();
    assert_eq!(bundle.budgets.len(), 3);

    match &bundle.budgets[0] {
        BudgetViolation::Performance {
            item_label,
            request_count,
            transfer_size,
            count_over_budget,
            size_over_budget,
        } => {
            assert_eq!(item_label, "Script");
            assert_eq!(*request_count, 10);
            assert_eq!(*transfer_size, 120000);
            assert_eq!(*count_over_budget, 2);
            assert_eq!(*size_over_budget, 2048);
        }
        other => panic!("expected performance violation, got {other:?}"),
    }

    match &bundle.budgets[1] {
        BudgetViolation::Performance {
            request_count,
            transfer_size,
            count_over_budget,
            size_over_budget,
            ..
        } => {
            assert_eq!(*request_count, 0);
            assert_eq!(*transfer_size, 0);
            assert_eq!(*count_over_budget, 0);
            assert_eq!(*size_over_budget, 0);
        }
        other => panic!("expected performance violation, got {other:?}"),
    }

    match &bundle.budgets[2] {
        BudgetViolation::Timing {
            item_label,
            measurement,
            over_budget,
        } => {
            assert_eq!(item_label, "First Contentful Paint");
            assert_eq!(*measurement, 3000.0);
            assert_eq!(*over_budget, 1000.0);
        }
        other => panic!("expected timing violation, got {other:?}"),
    }
}

#[test]
fn no_budget_audits_means_no_violations() {
    let bundle = decompose("https://example.com", None, None, &report()).unwrap();
    assert!(bundle.budgets.is_empty());
}

#[test]
fn job_id_propagates_into_the_key() {
    let bundle = decompose("https://example.com", None, Some("nightly-42"), &report()).unwrap();
    assert_eq!(bundle.key.job_id.as_deref(), Some("nightly-42"));
}
