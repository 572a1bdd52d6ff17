//! End-to-end attribution behavior: contributions and interactions.

use leafcast::approx::assert_abs_diff_eq;
use leafcast::data::DenseRows;
use leafcast::repr::{Forest, Tree};
use leafcast::{ColumnMap, ContributionOptions, Parallelism, Predictor};

fn covered_stump(feature: u32, threshold: f32, left: f32, right: f32) -> Tree {
    leafcast::scalar_tree! {
        0 => num(feature, threshold, L) -> 1, 2,
        1 => leaf(left),
        2 => leaf(right),
    }
    .with_covers(vec![100.0, 60.0, 40.0])
}

fn covered_deep_tree() -> Tree {
    leafcast::scalar_tree! {
        0 => num(0, 0.5, L) -> 1, 2,
        1 => num(1, 0.3, R) -> 3, 4,
        2 => num(2, 0.7, L) -> 5, 6,
        3 => leaf(-1.0),
        4 => leaf(-0.25),
        5 => num(0, 0.9, L) -> 7, 8,
        6 => leaf(1.0),
        7 => leaf(0.25),
        8 => leaf(0.75),
    }
    .with_covers(vec![100.0, 55.0, 45.0, 25.0, 30.0, 35.0, 10.0, 20.0, 15.0])
}

fn attribution_forest() -> Forest {
    let mut forest = Forest::new(1, 3).with_base_score(0.5);
    forest.push_tree(covered_deep_tree(), 0);
    forest.push_tree(covered_stump(1, 0.4, -0.1, 0.1), 0);
    forest.push_tree(covered_stump(2, 0.6, 0.2, -0.2), 0);
    forest
}

fn synthetic_rows(n_rows: usize, n_cols: usize) -> Vec<f32> {
    (0..n_rows * n_cols)
        .map(|i| {
            if i % 11 == 5 {
                f32::NAN
            } else {
                ((i * 53) % 100) as f32 / 100.0
            }
        })
        .collect()
}

#[test]
fn exact_contributions_conserve_the_margin() {
    let forest = attribution_forest();
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(60, 3);
    let rows = DenseRows::new(&data, 60, 3);

    let margins = predictor.predict(&rows, 0, 0, Parallelism::Sequential).unwrap();
    let phi = predictor
        .predict_contributions(&rows, &ContributionOptions::default(), Parallelism::Sequential)
        .unwrap();

    let stride = 4; // 3 columns + bias
    for row in 0..60 {
        let total: f32 = phi[row * stride..(row + 1) * stride].iter().sum();
        assert_abs_diff_eq!(total, margins[row], epsilon = 1e-4);
    }
}

#[test]
fn approximate_contributions_conserve_the_margin() {
    let forest = attribution_forest();
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(60, 3);
    let rows = DenseRows::new(&data, 60, 3);

    let margins = predictor.predict(&rows, 0, 0, Parallelism::Sequential).unwrap();
    let phi = predictor
        .predict_contributions(
            &rows,
            &ContributionOptions::default().with_approximate(true),
            Parallelism::Sequential,
        )
        .unwrap();

    let stride = 4;
    for row in 0..60 {
        let total: f32 = phi[row * stride..(row + 1) * stride].iter().sum();
        assert_abs_diff_eq!(total, margins[row], epsilon = 1e-4);
    }
}

#[test]
fn bias_column_is_expectation_plus_base_score() {
    let mut forest = Forest::for_regression(1).with_base_score(0.5);
    // Expectation: (60 * -1 + 40 * 1) / 100 = -0.2
    forest.push_tree(covered_stump(0, 0.5, -1.0, 1.0), 0);
    let predictor = Predictor::new(&forest);

    let data = [0.9];
    let rows = DenseRows::new(&data, 1, 1);
    let phi = predictor
        .predict_contributions(&rows, &ContributionOptions::default(), Parallelism::Sequential)
        .unwrap();

    assert_abs_diff_eq!(phi[1], 0.3, epsilon = 1e-6);
    assert_abs_diff_eq!(phi[0] + phi[1], 1.5, epsilon = 1e-6);
}

#[test]
fn ntree_limit_restricts_attributed_trees() {
    let forest = attribution_forest();
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(10, 3);
    let rows = DenseRows::new(&data, 10, 3);

    let limited = predictor
        .predict_contributions(
            &rows,
            &ContributionOptions::default().with_ntree_limit(1),
            Parallelism::Sequential,
        )
        .unwrap();
    let margins = predictor.predict(&rows, 0, 1, Parallelism::Sequential).unwrap();

    let stride = 4;
    for row in 0..10 {
        let total: f32 = limited[row * stride..(row + 1) * stride].iter().sum();
        assert_abs_diff_eq!(total, margins[row], epsilon = 1e-4);
    }
}

#[test]
fn column_map_pools_one_hot_features() {
    let forest = attribution_forest();
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(20, 3);
    let rows = DenseRows::new(&data, 20, 3);

    let plain = predictor
        .predict_contributions(&rows, &ContributionOptions::default(), Parallelism::Sequential)
        .unwrap();

    // Pool features 1 and 2 into one attributed column.
    let map = [0u32, 1, 1];
    let options =
        ContributionOptions::default().with_column_map(ColumnMap::new(&map, 2));
    let pooled = predictor
        .predict_contributions(&rows, &options, Parallelism::Sequential)
        .unwrap();

    for row in 0..20 {
        let p = &plain[row * 4..(row + 1) * 4];
        let q = &pooled[row * 3..(row + 1) * 3];
        assert_abs_diff_eq!(q[0], p[0], epsilon = 1e-4);
        assert_abs_diff_eq!(q[1], p[1] + p[2], epsilon = 1e-4);
        assert_abs_diff_eq!(q[2], p[3], epsilon = 1e-4);
    }
}

#[test]
fn contributions_compose_across_batches() {
    let forest = attribution_forest();
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(30, 3);
    let rows = DenseRows::new(&data, 30, 3);
    let whole = predictor
        .predict_contributions(&rows, &ContributionOptions::default(), Parallelism::Sequential)
        .unwrap();

    let mut pieced = vec![0.0; whole.len()];
    let head = DenseRows::new(&data[..10 * 3], 10, 3);
    let tail = DenseRows::new(&data[10 * 3..], 20, 3).with_base_rowid(10);
    predictor
        .predict_contributions_into(
            &head,
            &ContributionOptions::default(),
            Parallelism::Sequential,
            &mut pieced,
        )
        .unwrap();
    predictor
        .predict_contributions_into(
            &tail,
            &ContributionOptions::default(),
            Parallelism::Sequential,
            &mut pieced,
        )
        .unwrap();

    assert_eq!(pieced, whole);
}

#[test]
fn multiclass_contributions_conserve_per_group() {
    let mut forest = Forest::new(2, 2).with_base_score(0.25);
    forest.push_tree(covered_stump(0, 0.5, -1.0, 1.0), 0);
    forest.push_tree(covered_stump(1, 0.5, -2.0, 2.0), 1);
    forest.push_tree(covered_stump(1, 0.3, 0.5, -0.5), 0);
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(16, 2);
    let rows = DenseRows::new(&data, 16, 2);

    let margins = predictor.predict(&rows, 0, 0, Parallelism::Sequential).unwrap();
    let phi = predictor
        .predict_contributions(&rows, &ContributionOptions::default(), Parallelism::Sequential)
        .unwrap();

    let ncols_p1 = 3;
    for row in 0..16 {
        for g in 0..2 {
            let start = (row * 2 + g) * ncols_p1;
            let total: f32 = phi[start..start + ncols_p1].iter().sum();
            assert_abs_diff_eq!(total, margins[row * 2 + g], epsilon = 1e-4);
        }
    }
}

#[test]
fn interactions_conserve_contributions_and_margin() {
    let forest = attribution_forest();
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(12, 3);
    let rows = DenseRows::new(&data, 12, 3);
    let options = ContributionOptions::default();

    let margins = predictor.predict(&rows, 0, 0, Parallelism::Sequential).unwrap();
    let phi = predictor
        .predict_contributions(&rows, &options, Parallelism::Sequential)
        .unwrap();
    let inter = predictor
        .predict_interactions(&rows, &options, Parallelism::Sequential)
        .unwrap();

    let c_p1 = 4;
    for row in 0..12 {
        let matrix = &inter[row * c_p1 * c_p1..(row + 1) * c_p1 * c_p1];
        // Every matrix row sums to the plain contribution of its column.
        for i in 0..c_p1 {
            let row_sum: f32 = matrix[i * c_p1..(i + 1) * c_p1].iter().sum();
            assert_abs_diff_eq!(row_sum, phi[row * c_p1 + i], epsilon = 1e-3);
        }
        // And the whole matrix sums to the margin.
        let total: f32 = matrix.iter().sum();
        assert_abs_diff_eq!(total, margins[row], epsilon = 1e-3);
        // Symmetry.
        for i in 0..c_p1 {
            for k in 0..c_p1 {
                assert_abs_diff_eq!(matrix[i * c_p1 + k], matrix[k * c_p1 + i], epsilon = 1e-3);
            }
        }
    }
}

#[test]
fn attribution_is_deterministic_across_parallelism() {
    let forest = attribution_forest();
    let predictor = Predictor::new(&forest);

    let data = synthetic_rows(80, 3);
    let rows = DenseRows::new(&data, 80, 3);
    let options = ContributionOptions::default();

    let seq = predictor
        .predict_contributions(&rows, &options, Parallelism::Sequential)
        .unwrap();
    let par = predictor
        .predict_contributions(&rows, &options, Parallelism::Parallel)
        .unwrap();
    assert_eq!(seq, par);

    let seq_i = predictor
        .predict_interactions(&rows, &options, Parallelism::Sequential)
        .unwrap();
    let par_i = predictor
        .predict_interactions(&rows, &options, Parallelism::Parallel)
        .unwrap();
    assert_eq!(seq_i, par_i);
}
