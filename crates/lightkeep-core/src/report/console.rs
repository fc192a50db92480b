use crate::model::{RunSummary, TargetStatus};

/// End-of-run summary. Per-target failures carry the FAIL marker so a
/// wrapping caller can pick them out of captured output, separate from
/// routine progress logging.
pub fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        if outcome.status == TargetStatus::Failed {
            eprintln!("FAIL [{}]: {}", outcome.url, outcome.message);
        }
    }

    eprintln!(
        "Audits: ok={} failed={} registered={} expired_removed={}",
        summary.completed(),
        summary.failed(),
        summary.registered,
        summary.expired_removed
    );
}
