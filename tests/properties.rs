use std::collections::BTreeMap;

use approx::assert_relative_eq;
use proptest::prelude::*;

use ic50::aggregate::aggregate;
use ic50::domain::{ConcentrationPoint, FitConfig, FitParameters};
use ic50::error::Ic50Error;
use ic50::fit::{fit_4pl, log_space, synthesize_curve};

/// Distinct positive concentrations, each with `replicates` finite responses.
fn plate(replicates: usize) -> impl Strategy<Value = Vec<ConcentrationPoint>> {
    prop::collection::btree_set(1u32..100_000, 1..12).prop_flat_map(move |concs| {
        let n = concs.len();
        let concs: Vec<f64> = concs.into_iter().map(|c| c as f64 / 1000.0).collect();
        prop::collection::vec(prop::collection::vec(-200.0f64..200.0, replicates), n).prop_map(
            move |groups| {
                concs
                    .iter()
                    .zip(groups)
                    .map(|(&c, r)| ConcentrationPoint::new(c, r))
                    .collect()
            },
        )
    })
}

/// Concentration (by bit pattern) → (mean, std).
fn stats_by_concentration(points: &[ConcentrationPoint]) -> BTreeMap<u64, (f64, f64)> {
    aggregate(points)
        .unwrap()
        .into_iter()
        .map(|p| (p.concentration.to_bits(), (p.mean_response, p.std_response)))
        .collect()
}

proptest! {
    #[test]
    fn aggregation_ignores_group_order(
        (points, shuffled) in plate(3).prop_flat_map(|p| (Just(p.clone()), Just(p).prop_shuffle()))
    ) {
        prop_assert_eq!(stats_by_concentration(&points), stats_by_concentration(&shuffled));

        let agg = aggregate(&shuffled).unwrap();
        let order: Vec<f64> = agg.iter().map(|p| p.concentration).collect();
        let input: Vec<f64> = shuffled.iter().map(|p| p.concentration).collect();
        prop_assert_eq!(order, input);
    }

    #[test]
    fn aggregation_ignores_replicate_order(points in plate(3), rotate in 0usize..3) {
        let shuffled: Vec<ConcentrationPoint> = points
            .iter()
            .map(|p| {
                let mut r = p.responses.clone();
                r.rotate_left(rotate);
                r.reverse();
                ConcentrationPoint::new(p.concentration, r)
            })
            .collect();

        let a = aggregate(&points).unwrap();
        let b = aggregate(&shuffled).unwrap();
        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            prop_assert_eq!(x.concentration, y.concentration);
            prop_assert!((x.mean_response - y.mean_response).abs() <= 1e-9);
            prop_assert!((x.std_response - y.std_response).abs() <= 1e-9);
            prop_assert!(x.std_response >= 0.0);
        }
    }

    #[test]
    fn aggregation_keeps_input_order(points in plate(2)) {
        let agg = aggregate(&points).unwrap();
        let input: Vec<f64> = points.iter().map(|p| p.concentration).collect();
        let output: Vec<f64> = agg.iter().map(|p| p.concentration).collect();
        prop_assert_eq!(input, output);
    }

    #[test]
    fn mismatched_replicates_are_rejected(points in plate(3), victim in any::<prop::sample::Index>()) {
        let mut points = points;
        let i = victim.index(points.len());
        points[i].responses.push(1.0);
        prop_assume!(points.len() > 1);
        prop_assert!(matches!(aggregate(&points), Err(Ic50Error::InvalidInput(_))));
    }

    #[test]
    fn curve_samples_span_range_geometrically(
        lo_exp in -6.0f64..2.0,
        decades in 0.5f64..6.0,
        n in 2usize..300,
    ) {
        let x_min = 10f64.powf(lo_exp);
        let x_max = 10f64.powf(lo_exp + decades);
        let params = FitParameters::new(100.0, 1.0, (x_min * x_max).sqrt(), 0.0);
        let curve = synthesize_curve(&params, x_min, x_max, n).unwrap();

        prop_assert_eq!(curve.len(), n);
        prop_assert_eq!(curve[0].0, x_min);
        prop_assert_eq!(curve[n - 1].0, x_max);

        let ratio = curve[1].0 / curve[0].0;
        for w in curve.windows(2) {
            prop_assert!(w[1].0 > w[0].0);
            prop_assert!(((w[1].0 / w[0].0) / ratio - 1.0).abs() < 1e-9);
            prop_assert!(w[0].0 >= x_min && w[1].0 <= x_max);
        }
    }

    #[test]
    fn too_few_concentrations_never_fit(k in 1usize..=3, y in prop::collection::vec(0.0f64..100.0, 3)) {
        let x: Vec<f64> = (0..k).map(|i| 10f64.powi(i as i32)).collect();
        let y = &y[..k];
        let result = fit_4pl(&x, y, &FitConfig::default());
        let rejected = matches!(result, Err(Ic50Error::InsufficientData { .. }));
        prop_assert!(rejected);
    }
}

#[test]
fn default_curve_has_a_hundred_samples() {
    let xs = log_space(0.01, 100.0, ic50::domain::DEFAULT_CURVE_SAMPLES).unwrap();
    assert_eq!(xs.len(), 100);
    assert_relative_eq!(xs[50] / xs[49], xs[1] / xs[0], max_relative = 1e-12);
}
