// End-to-end: JSON jobs file -> JobProcessor -> CSV results

mod common;

use common::run_json;
use divider_core::port::SourceError;
use divider_core::PipelineError;
use divider_infra_math::DividerMethod;

const METHODS: [DividerMethod; 2] = [DividerMethod::Native, DividerMethod::Ffi];

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_all_valid_jobs() {
    let input = r#"[{"arg1":4,"arg2":2},{"arg1":128,"arg2":16},{"arg1":-128,"arg2":16},{"arg1":128,"arg2":-16}]"#;

    for method in METHODS {
        for workers in [0, 1, 4] {
            let (outcome, output) = run_json(input, method, workers).await;
            let summary = outcome.unwrap();

            assert_eq!(summary.submitted, 4);
            assert_eq!(summary.processed, 4);
            assert_eq!(
                output.rows(),
                vec!["0,2,true", "1,8,true", "2,-8,true", "3,-8,true"],
                "method {method}, workers {workers}"
            );
        }
    }
}

#[tokio::test]
async fn test_division_by_zero_marks_row_invalid() {
    for method in METHODS {
        let (outcome, output) = run_json(r#"[{"arg1":1,"arg2":0},{"arg1":0,"arg2":1}]"#, method, 2).await;
        outcome.unwrap();
        assert_eq!(output.rows(), vec!["0,0,false", "1,0,true"]);
    }
}

#[tokio::test]
async fn test_overflowing_quotient_marks_row_invalid() {
    let input = format!(r#"[{{"arg1":{},"arg2":-1}},{{"arg1":9,"arg2":3}}]"#, i32::MIN);
    for method in METHODS {
        let (outcome, output) = run_json(&input, method, 1).await;
        outcome.unwrap();
        assert_eq!(output.rows(), vec!["0,0,false", "1,3,true"]);
    }
}

#[tokio::test]
async fn test_bad_jobs_are_reported_not_fatal() {
    let input = r#"[
        {"arg1": 6, "arg2": 3},
        {"arg1": "6", "arg2": 3},
        {"arg1": 6, "arg2": 3, "arg3": 1},
        {"arg1": 6, "arg1": 7, "arg2": 3},
        {"arg1": 2147483648, "arg2": 1},
        {"arg2": 3},
        [6, 3],
        null,
        {"arg1": 9, "arg2": 3}
    ]"#;

    let (outcome, output) = run_json(input, DividerMethod::Native, 3).await;
    let summary = outcome.unwrap();

    assert_eq!(summary.submitted, 9);
    assert_eq!(
        output.rows(),
        vec![
            "0,2,true",
            "1,0,false",
            "2,0,false",
            "3,0,false",
            "4,0,false",
            "5,0,false",
            "6,0,false",
            "7,0,false",
            "8,3,true",
        ]
    );
}

#[tokio::test]
async fn test_invalid_utf8_field_name_marks_row_invalid() {
    let input = b"[{\"arg1\":4,\"arg2\":2,\"x\xff\":1},{\"arg1\":8,\"arg2\":4}]";
    let (outcome, output) = run_json(input, DividerMethod::Native, 2).await;

    assert_eq!(outcome.unwrap().submitted, 2);
    assert_eq!(output.rows(), vec!["0,0,false", "1,2,true"]);
}

#[tokio::test]
async fn test_empty_input_writes_header_only() {
    for input in ["[]", "", "  \n", "[ ]"] {
        let (outcome, output) = run_json(input, DividerMethod::Ffi, 2).await;
        let summary = outcome.unwrap();

        assert_eq!(summary.submitted, 0);
        assert_eq!(summary.processed, 0);
        assert_eq!(output.contents(), "id,value,valid\n", "input {input:?}");
    }
}

#[tokio::test]
async fn test_truncated_input_is_fatal() {
    let (outcome, output) = run_json(r#"[{"arg1":4,"arg2":2},{"arg1":1"#, DividerMethod::Native, 1).await;

    let err = outcome.unwrap_err();
    assert!(
        matches!(err, PipelineError::Source(ref e) if !e.is_recoverable()),
        "{err}"
    );
    // The job before the break is still flushed
    assert_eq!(output.rows(), vec!["0,2,true"]);
}

#[tokio::test]
async fn test_missing_closing_bracket_is_fatal() {
    for input in ["[", r#"[{"arg1":4,"arg2":2}"#, r#"[{"arg1":4,"arg2":2},"#] {
        let (outcome, _) = run_json(input, DividerMethod::Native, 1).await;
        assert!(
            matches!(outcome, Err(PipelineError::Source(SourceError::UnexpectedEof))),
            "input {input:?}: {outcome:?}"
        );
    }
}

#[tokio::test]
async fn test_not_an_array_is_fatal() {
    let (outcome, output) = run_json(r#"{"arg1":4,"arg2":2}"#, DividerMethod::Native, 1).await;
    assert!(matches!(
        outcome,
        Err(PipelineError::Source(SourceError::Malformed { offset: 0, .. }))
    ));
    assert!(output.rows().is_empty());
}

#[tokio::test]
async fn test_data_after_closing_bracket_is_ignored() {
    let (outcome, output) = run_json("[{\"arg1\":8,\"arg2\":4}]\n{garbage", DividerMethod::Ffi, 1).await;
    outcome.unwrap();
    assert_eq!(output.rows(), vec!["0,2,true"]);
}
