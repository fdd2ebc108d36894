//! Property and scenario tests for normalization and aggregation

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use qnr_analysis::{Aggregator, ScoreTransformer};
use qnr_model::{Questionnaire, RatingQuestion, RatingScale, RatingValue, Response};
use qnr_test_utils::{sample_questionnaire, sample_responses, ResponseBuilder};

fn single(question: RatingQuestion, end: i64) -> Questionnaire {
    Questionnaire::new(vec![question], Vec::new(), RatingScale::new(1, end))
}

proptest! {
    #[test]
    fn reflect_is_an_involution(end in 1i64..100, raw in -50i64..200) {
        let scale = RatingScale::new(1, end);
        #[allow(clippy::cast_precision_loss)]
        let value = raw as f64;
        prop_assert_eq!(scale.reflect(scale.reflect(value)), value);
    }

    #[test]
    fn positive_questions_pass_through(end in 1i64..20, raw in -20i64..20) {
        let q = single(RatingQuestion::new("plain"), end);
        let response = ResponseBuilder::new("a1").score(raw).build();
        #[allow(clippy::cast_precision_loss)]
        let expected = raw as f64;
        prop_assert_eq!(ScoreTransformer::new(&q).normalize(&response), vec![Some(expected)]);
    }

    #[test]
    fn negative_then_reflected_restores_raw(end in 1i64..20, raw in -20i64..20) {
        let q = single(RatingQuestion::negative("reversed"), end);
        let response = ResponseBuilder::new("a1").score(raw).build();
        let normalized = ScoreTransformer::new(&q).normalize(&response);
        #[allow(clippy::cast_precision_loss)]
        let expected = raw as f64;
        prop_assert_eq!(normalized.len(), 1);
        prop_assert_eq!(normalized[0].map(|v| q.scale.reflect(v)), Some(expected));
    }

    #[test]
    fn matrix_columns_follow_participant_order(numbers in prop::collection::hash_set(0u32..500, 1..20)) {
        let q = single(RatingQuestion::new("plain"), 5);
        let responses: Vec<Response> = numbers
            .iter()
            .map(|n| ResponseBuilder::new(&format!("p{n}")).score(3).build())
            .collect();

        let matrix = Aggregator::new(&q).participant_matrix(&responses);
        let mut expected: Vec<u32> = numbers.into_iter().collect();
        expected.sort_unstable();
        let expected: Vec<String> = expected.iter().map(|n| format!("p{n}")).collect();
        prop_assert_eq!(matrix.participants, expected);
    }
}

#[test]
fn negative_two_on_five_point_scale_is_four() {
    let q = single(RatingQuestion::negative("reversed"), 5);
    let response = ResponseBuilder::new("a1").score(2).build();
    assert_eq!(ScoreTransformer::new(&q).normalize(&response), vec![Some(4.0)]);
}

#[test]
fn all_missing_row_has_missing_mean() {
    let q = Questionnaire::new(
        vec![RatingQuestion::new("q1"), RatingQuestion::new("q2")],
        Vec::new(),
        RatingScale::default(),
    );
    let responses = vec![
        ResponseBuilder::new("a1")
            .rating(RatingValue::empty())
            .rating(RatingValue::from("skip"))
            .build(),
        ResponseBuilder::new("a2")
            .score(3)
            .rating(RatingValue::empty())
            .build(),
    ];

    let groups = Aggregator::new(&q).group_scores(&responses);
    let means: Vec<_> = groups[0].participants.iter().map(|p| p.mean).collect();
    assert_eq!(means, vec![None, Some(3.0)]);
}

#[test]
fn sample_data_groups_and_matrix() {
    let q = sample_questionnaire();
    let responses = sample_responses();
    let aggregator = Aggregator::new(&q);

    let groups = aggregator.group_scores(&responses);
    let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "b"]);

    // a2: 5, (6-1)=5, 5 → 5.0; a10: 2, (6-4)=2, 1 → 5/3
    let a_means: Vec<_> = groups[0].participants.iter().map(|p| p.mean).collect();
    assert_eq!(a_means[0], Some(5.0));
    assert!((a_means[1].unwrap_or_default() - 5.0 / 3.0).abs() < 1e-9);

    let matrix = aggregator.participant_matrix(&responses);
    assert_eq!(matrix.participants, vec!["a2", "a10", "b1", "b2"]);
    assert_eq!(matrix.cells[1], vec![Some(5.0), Some(2.0), None, Some(4.0)]);
}
