//! Property-based tests for encoding, aggregation, and reconciliation.

use proptest::prelude::*;

use yieldcast_core::data::{Observation, ObservationTable};
use yieldcast_core::features::{
    BASE_COLUMNS, CropType, FeatureSchema, FeatureVectorBuilder, SoilWeatherInputs,
};
use yieldcast_core::summary::{
    AuthoritativeRegionSet, CropGrouping, CropRegionMeans, RegionYieldTable,
};

fn schema() -> FeatureSchema {
    let mut cols: Vec<String> = BASE_COLUMNS.iter().map(|s| s.to_string()).collect();
    cols.extend(CropType::ALL.iter().map(|c| c.indicator_column()));
    FeatureSchema::new(cols).unwrap()
}

fn crop_strategy() -> impl Strategy<Value = CropType> {
    prop::sample::select(CropType::ALL.to_vec())
}

prop_compose! {
    fn inputs_strategy()(
        nitrogen in 0.0f64..200.0,
        phosphorus in 0.0f64..200.0,
        potassium in 0.0f64..200.0,
        ph in 0.0f64..14.0,
        rainfall in 0.0f64..3000.0,
        temperature in 0.0f64..50.0,
        humidity in 0.0f64..100.0,
        wind in 0.0f64..10.0,
        radiation in 0.0f64..30.0,
    ) -> SoilWeatherInputs {
        SoilWeatherInputs {
            nitrogen,
            phosphorus,
            potassium,
            ph,
            rainfall,
            temperature,
            humidity,
            wind,
            radiation,
        }
    }
}

// --- Feature encoding properties ---

proptest! {
    #[test]
    fn exactly_one_indicator_is_set(inputs in inputs_strategy(), crop in crop_strategy()) {
        let builder = FeatureVectorBuilder::new(schema());
        let fv = builder.build(&inputs, crop).unwrap();
        for other in CropType::ALL {
            let expected = if other == crop { 1.0 } else { 0.0 };
            prop_assert_eq!(fv.get(&other.indicator_column()), Some(expected));
        }
        let set: usize = fv
            .iter()
            .filter(|(name, v)| name.starts_with("Crop_") && *v == 1.0)
            .count();
        prop_assert_eq!(set, 1);
    }

    #[test]
    fn building_is_deterministic(
        inputs in inputs_strategy(),
        crop in crop_strategy(),
        noise in crop_strategy(),
    ) {
        let builder = FeatureVectorBuilder::new(schema());
        let first = serde_json::to_vec(&builder.build(&inputs, crop).unwrap()).unwrap();
        // An unrelated request in between must leave no trace.
        builder.build(&SoilWeatherInputs::default(), noise).unwrap();
        let second = serde_json::to_vec(&builder.build(&inputs, crop).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn vector_follows_schema_order(inputs in inputs_strategy(), crop in crop_strategy()) {
        let schema = schema();
        let fv = FeatureVectorBuilder::new(schema.clone()).build(&inputs, crop).unwrap();
        prop_assert_eq!(fv.columns(), schema.columns());
    }
}

// --- Aggregation and reconciliation properties ---

fn observations_strategy() -> impl Strategy<Value = Vec<(usize, CropType, f64)>> {
    prop::collection::vec((0usize..12, crop_strategy(), 0.0f64..10_000.0), 0..60)
}

fn region_name(idx: usize) -> String {
    format!("Region{idx:02}")
}

proptest! {
    #[test]
    fn table_covers_every_region(
        region_count in 1usize..10,
        rows in observations_strategy(),
        crop in crop_strategy(),
    ) {
        let regions =
            AuthoritativeRegionSet::from_names((0..region_count).map(region_name)).unwrap();
        let table = ObservationTable::from_rows(
            rows.iter()
                .map(|(r, c, y)| Observation::new(region_name(*r), c.title(), *y))
                .collect(),
        );
        let summary = CropRegionMeans::aggregate(&table, CropGrouping::Exact).summary_for(crop);
        let result = RegionYieldTable::reconcile(&summary, &regions);

        prop_assert_eq!(result.len(), regions.len());
        for row in &result.rows {
            let has_rows = rows
                .iter()
                .any(|(r, c, _)| region_name(*r) == row.region && *c == crop);
            if !has_rows {
                prop_assert_eq!(row.value, 0.0);
                prop_assert!(!row.matched);
            }
        }
    }

    #[test]
    fn group_mean_is_arithmetic_mean(values in prop::collection::vec(0.0f64..10_000.0, 1..40)) {
        let table = ObservationTable::from_rows(
            values.iter().map(|y| Observation::new("Bihar", "Rice", *y)).collect(),
        );
        let stats = CropRegionMeans::aggregate(&table, CropGrouping::Exact)
            .get("Rice", "Bihar")
            .unwrap();
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        prop_assert_eq!(stats.count, values.len());
        prop_assert!((stats.mean - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        if values.len() == 1 {
            prop_assert_eq!(stats.mean, values[0]);
        }
    }
}
