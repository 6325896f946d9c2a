use serde_json::json;

use super::common::*;
use crate::workflows::nsm::codes::WorkType;
use crate::workflows::nsm::domain::ClaimStatus;
use crate::workflows::nsm::syncer::AssessmentSyncer;

fn assessment(work_item_id: &str, disbursement_id: &str) -> serde_json::Value {
    json!({
        "application": {
            "assessment_comment": "Part granted",
            "letters_and_calls": [
                { "type": { "value": "letters", "en": "Letters" }, "count": 1, "uplift": 0,
                  "adjustment_comment": "one letter only" },
                { "type": "calls", "count": 3 }
            ],
            "work_items": [
                { "id": work_item_id, "time_spent": 60, "uplift": 0,
                  "work_type": { "value": "preparation", "en": "Preparation" },
                  "adjustment_comment": "reduced" }
            ],
            "disbursements": [
                { "id": disbursement_id, "total_cost_without_vat": 4.5, "vat_amount": 0.9,
                  "miles": 10, "apply_vat": "true", "adjustment_comment": "fewer miles" }
            ]
        }
    })
}

#[test]
fn part_grants_copy_adjusted_line_items() {
    let mut claim = complete_claim("claim-sync-1");
    claim.status = ClaimStatus::PartGrant;
    let reporter = RecordingReporter::default();

    let report = AssessmentSyncer::new(&reporter).sync(&mut claim, &assessment("wi-2", "disb-4"));

    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.letters_and_calls, 1);
    assert_eq!(report.work_items, 1);
    assert_eq!(report.disbursements, 1);
    assert_eq!(claim.assessment_comment.as_deref(), Some("Part granted"));
    assert_eq!(claim.allowed_letters, Some(1));
    assert_eq!(claim.letters_adjustment_comment.as_deref(), Some("one letter only"));
    assert_eq!(claim.allowed_calls, None);
    assert_eq!(claim.calls_adjustment_comment, None);

    let item = claim.work_item("wi-2").expect("work item");
    assert_eq!(item.allowed_time_spent, Some(60));
    assert_eq!(item.allowed_work_type, Some(WorkType::Preparation));
    assert_eq!(item.time_spent, Some(120));

    let disbursement = claim.disbursement("disb-4").expect("disbursement");
    assert_eq!(disbursement.allowed_total_cost_without_vat, Some(money("4.5")));
    assert_eq!(disbursement.allowed_apply_vat, Some(true));
    assert!(reporter.reports().is_empty());
}

#[test]
fn unadjusted_items_are_left_alone() {
    let mut claim = complete_claim("claim-sync-2");
    claim.status = ClaimStatus::Granted;
    let record = json!({
        "application": {
            "work_items": [{ "id": "wi-3", "time_spent": 10 }]
        }
    });

    let report = AssessmentSyncer::new(&RecordingReporter::default()).sync(&mut claim, &record);

    assert!(report.is_clean());
    assert_eq!(report.work_items, 0);
    assert_eq!(claim.work_item("wi-3").expect("item").allowed_time_spent, None);
}

#[test]
fn letters_without_a_comment_keep_their_allowed_values() {
    let mut claim = complete_claim("claim-sync-7");
    claim.status = ClaimStatus::PartGrant;
    claim.allowed_letters = Some(2);
    claim.allowed_letters_uplift = Some(10);
    let record = json!({
        "application": {
            "letters_and_calls": [
                { "type": "letters", "count": 0, "uplift": 0, "adjustment_comment": "   " },
                { "type": "calls", "count": 1, "uplift": 0 }
            ]
        }
    });

    let report = AssessmentSyncer::new(&RecordingReporter::default()).sync(&mut claim, &record);

    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.letters_and_calls, 0);
    assert_eq!(claim.allowed_letters, Some(2));
    assert_eq!(claim.allowed_letters_uplift, Some(10));
    assert_eq!(claim.letters_adjustment_comment, None);
    assert_eq!(claim.allowed_calls, None);
}

#[test]
fn sent_back_claims_only_receive_the_comment() {
    let mut claim = complete_claim("claim-sync-3");
    claim.status = ClaimStatus::SentBack;

    let report = AssessmentSyncer::new(&RecordingReporter::default())
        .sync(&mut claim, &assessment("wi-2", "disb-4"));

    assert!(report.is_clean());
    assert!(report.assessment_comment);
    assert_eq!(report.work_items, 0);
    assert_eq!(claim.allowed_letters, None);
}

#[test]
fn unassessed_claims_are_reported_and_untouched() {
    let mut claim = complete_claim("claim-sync-4");
    let reporter = RecordingReporter::default();

    let report = AssessmentSyncer::new(&reporter).sync(&mut claim, &assessment("wi-2", "disb-4"));

    assert!(!report.is_clean());
    assert_eq!(claim.assessment_comment, None);
    assert_eq!(reporter.reports().len(), 1);
}

#[test]
fn unknown_line_items_stop_the_sync_without_rollback() {
    let mut claim = complete_claim("claim-sync-5");
    claim.status = ClaimStatus::Granted;
    let reporter = RecordingReporter::default();

    let report = AssessmentSyncer::new(&reporter).sync(&mut claim, &assessment("wi-99", "disb-4"));

    match report.failure.as_deref() {
        Some(message) if message.contains("wi-99") => {}
        other => panic!("expected unknown work item failure, got {other:?}"),
    }
    assert_eq!(claim.allowed_letters, Some(1));
    assert_eq!(
        claim.disbursement("disb-4").expect("disbursement").allowed_miles,
        None
    );
    assert_eq!(reporter.reports().len(), 1);
}

#[test]
fn unknown_work_type_codes_are_rejected() {
    let mut claim = complete_claim("claim-sync-6");
    claim.status = ClaimStatus::Granted;
    let record = json!({
        "application": {
            "work_items": [{ "id": "wi-2", "work_type": "juggling", "adjustment_comment": "?" }]
        }
    });

    let report = AssessmentSyncer::new(&RecordingReporter::default()).sync(&mut claim, &record);

    assert!(!report.is_clean());
    assert_eq!(claim.work_item("wi-2").expect("item").adjustment_comment, None);
}
