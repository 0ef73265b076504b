use super::*;

fn mixed_attributes() -> Vec<Attribute> {
    vec![
        Attribute::nominal("colour", vec!["red", "green", "blue"]),
        Attribute::numeric("size"),
    ]
}

fn mixed_rows() -> LabeledRows {
    rows(
        array![[0.0, 1.0], [1.0, 2.5], [2.0, 4.0], [0.0, 7.5]],
        vec![0, 0, 1, 1],
    )
}

#[test]
fn test_no_sample_when_enough_real_examples() {
    let oracle = RuleOracle::new(2, |row| (row[1] > 3.0) as usize);
    let sample = draw_sample(&mixed_rows(), &mixed_attributes(), 2, 4, &oracle, 0).unwrap();
    assert!(sample.is_empty());
    assert_eq!(sample.x().ncols(), 2);
}

#[test]
fn test_sample_tops_up_to_min_samples() {
    let oracle = RuleOracle::new(2, |row| (row[1] > 3.0) as usize);
    let sample = draw_sample(&mixed_rows(), &mixed_attributes(), 2, 50, &oracle, 0).unwrap();

    assert_eq!(sample.len(), 46);
    assert_eq!(sample.x().dim(), (46, 2));
    for (row, label) in sample.iter() {
        assert!(row.iter().all(|v| v.is_finite()));
        // nominal values stay inside the observed domain
        assert!([0.0, 1.0, 2.0].contains(&row[0]));
        assert_eq!(label, (row[1] > 3.0) as usize);
    }
}

#[test]
fn test_sample_is_reproducible() {
    let oracle = RuleOracle::new(2, |row| (row[1] > 3.0) as usize);
    let first = draw_sample(&mixed_rows(), &mixed_attributes(), 2, 30, &oracle, 11).unwrap();
    let second = draw_sample(&mixed_rows(), &mixed_attributes(), 2, 30, &oracle, 11).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sample_follows_node_marginals() {
    // every real example has colour green
    let real = rows(array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0]], vec![0, 0, 0]);
    let oracle = RuleOracle::new(2, |_| 0);
    let sample = draw_sample(&real, &mixed_attributes(), 2, 40, &oracle, 5).unwrap();

    assert_eq!(sample.len(), 37);
    assert!(sample.x().column(0).iter().all(|&v| v == 1.0));
}

#[test]
fn test_empty_node_draws_nothing() {
    let oracle = RuleOracle::new(2, |_| 0);
    let empty = LabeledRows::empty(2);
    let sample = draw_sample(&empty, &mixed_attributes(), 2, 10, &oracle, 0).unwrap();
    assert!(sample.is_empty());
}

#[test]
fn test_out_of_range_oracle_answer() {
    // the rule knows 3 classes but the class attribute only 2
    let oracle = RuleOracle::new(3, |_| 2);
    let result = draw_sample(&mixed_rows(), &mixed_attributes(), 2, 10, &oracle, 0);
    assert!(matches!(result, Err(ModelError::OracleError(_))));

    assert!(matches!(
        query_oracle(&oracle, array![0.0, 1.0].view(), 2),
        Err(ModelError::OracleError(_))
    ));
    assert_eq!(query_oracle(&oracle, array![0.0, 1.0].view(), 3).unwrap(), 2);
}

#[test]
fn test_fit_estimators() {
    let estimators = fit_estimators(&mixed_rows(), &mixed_attributes()).unwrap();
    assert_eq!(estimators.len(), 2);
    assert_relative_eq!(estimators[0].probability(0.0), 0.5);

    let with_string = vec![Attribute::numeric("x"), Attribute::string("note")];
    assert!(matches!(
        fit_estimators(&mixed_rows(), &with_string),
        Err(ModelError::ProcessingError(_))
    ));
}
