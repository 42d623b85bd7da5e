use std::collections::BTreeMap;

use moca_core::api_paths;
use moca_core::error::CoreError;
use moca_core::models::answer::{Answer, AnswerPackage, RasterSnapshot};
use moca_core::models::assessment::{ReviewStatus, Submission, SubmissionReceipt, TestId, TestResult};
use moca_core::models::score::Interpretation;
use serde_json::json;

#[test]
fn recorded_answers_are_append_only() {
    let mut package = AnswerPackage::new();
    package.record(1, Answer::Text("первый".into())).unwrap();

    let err = package.record(1, Answer::Text("второй".into())).unwrap_err();
    assert!(matches!(err, CoreError::AlreadyAnswered(1)));
    assert_eq!(package.get(1).and_then(Answer::as_text), Some("первый"));
}

#[test]
fn missing_lists_unanswered_ids_in_order() {
    let package: AnswerPackage = [(2, Answer::empty()), (4, Answer::TapCount(1))]
        .into_iter()
        .collect();
    assert_eq!(package.missing(1..=5), vec![1, 3, 5]);
}

#[test]
fn package_serializes_to_store_shape() {
    let fields: BTreeMap<usize, String> = [(0, "лев".into()), (1, "носорог".into()), (2, "верблюд".into())]
        .into_iter()
        .collect();
    let package: AnswerPackage = [
        (1, Answer::Text("город".into())),
        (5, Answer::TapCount(3).with_recording("/media/audio/tapping.wav".into())),
        (7, Answer::MultiField(fields)),
        (
            9,
            Answer::DrawingImage(RasterSnapshot {
                width: 1,
                height: 1,
                png: vec![1, 2, 3],
            }),
        ),
    ]
    .into_iter()
    .collect();

    let body = serde_json::to_value(Submission {
        answers_package: &package,
    })
    .unwrap();

    assert_eq!(
        body,
        json!({
            "answers_package": {
                "1": "город",
                "5": { "answer": 3, "audio": "/media/audio/tapping.wav" },
                "7": { "0": "лев", "1": "носорог", "2": "верблюд" },
                "9": "data:image/png;base64,AQID",
            }
        })
    );
}

#[test]
fn with_recording_leaves_drawings_untouched() {
    let drawing = Answer::DrawingImage(RasterSnapshot {
        width: 2,
        height: 2,
        png: vec![],
    });
    assert_eq!(drawing.clone().with_recording("/x".into()), drawing);

    let spoken = Answer::Text("никаких если, и или но".into()).with_recording("/y".into());
    assert_eq!(spoken.as_text(), Some("никаких если, и или но"));
    assert_eq!(spoken.media_ref(), Some("/y"));
}

#[test]
fn receipt_accepts_numeric_and_string_ids() {
    let numeric: SubmissionReceipt = serde_json::from_value(json!({ "id": 42 })).unwrap();
    assert_eq!(numeric.id, TestId::new("42"));

    let text: SubmissionReceipt = serde_json::from_value(json!({ "id": "a-7" })).unwrap();
    assert_eq!(text.id.as_str(), "a-7");
    assert_eq!(api_paths::test(&text.id), "test/a-7/");
}

#[test]
fn unreviewed_result_is_pending() {
    let result: TestResult = serde_json::from_value(json!({
        "test_id": 12,
        "date_of_test": "2024-01-15",
        "points": null,
    }))
    .unwrap();
    assert_eq!(result.review(), ReviewStatus::Pending);
    assert_eq!(result.date_of_test, jiff::civil::date(2024, 1, 15));
}

#[test]
fn reviewed_result_accepts_store_id_field() {
    let result: TestResult = serde_json::from_value(json!({
        "id": 12,
        "date_of_test": "2024-01-15",
        "answers_package": {},
        "points": 22,
    }))
    .unwrap();
    assert_eq!(result.test_id, TestId::new("12"));
    assert_eq!(
        result.review(),
        ReviewStatus::Reviewed {
            points: 22,
            interpretation: Interpretation::MildImpairment,
        }
    );
}

#[test]
fn interpretation_bands() {
    assert_eq!(Interpretation::from_points(30), Interpretation::Normal);
    assert_eq!(Interpretation::from_points(26), Interpretation::Normal);
    assert_eq!(Interpretation::from_points(25), Interpretation::MildImpairment);
    assert_eq!(Interpretation::from_points(18), Interpretation::MildImpairment);
    assert_eq!(Interpretation::from_points(17), Interpretation::PossibleDementia);
    assert_eq!(Interpretation::from_points(0), Interpretation::PossibleDementia);
}
