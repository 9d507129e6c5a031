//! Integration tests for tensync-stats

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tensync_stats::{
    aggregate, aggregate_with_cancel, aggregate_with_config, AggregatorConfig, StatValue,
    Statistic, StatsError,
};

#[test]
fn test_reference_values() -> anyhow::Result<()> {
    let values = [1.0f64, 2.0, 3.0, 4.0];
    assert_eq!(aggregate(&values, Statistic::Sum, 1)?, StatValue::Float(10.0));
    assert_eq!(aggregate(&values, Statistic::Average, 1)?, StatValue::Float(2.5));
    assert_eq!(aggregate(&values, Statistic::Variance, 1)?, StatValue::Float(1.25));

    let err = aggregate(&[1.0f64], Statistic::SampleStdDev, 1).unwrap_err();
    assert!(err.is_domain());
    Ok(())
}

#[test]
fn test_every_statistic_on_large_input() -> anyhow::Result<()> {
    let values: Vec<i32> = (1..=100_000).collect();
    let config = AggregatorConfig::default().with_split_threshold(1000);

    let sum = aggregate_with_config(&values, Statistic::Sum, &config)?;
    assert_eq!(sum, StatValue::Int(5_000_050_000));
    let mean = aggregate_with_config(&values, Statistic::Average, &config)?;
    assert_eq!(mean.as_f64(), 50_000.5);
    assert_eq!(
        aggregate_with_config(&values, Statistic::Min, &config)?,
        StatValue::Int(1)
    );
    assert_eq!(
        aggregate_with_config(&values, Statistic::Max, &config)?,
        StatValue::Int(100_000)
    );

    // Population variance of 1..=n is (n² − 1) / 12
    let n = 100_000f64;
    let variance = aggregate_with_config(&values, Statistic::Variance, &config)?.as_f64();
    assert!((variance - (n * n - 1.0) / 12.0).abs() / variance < 1e-9);
    let std = aggregate_with_config(&values, Statistic::StdDev, &config)?.as_f64();
    assert!((std * std - variance).abs() / variance < 1e-9);
    Ok(())
}

#[test]
fn test_calls_do_not_share_state() -> anyhow::Result<()> {
    let first = aggregate(&[5u32; 100], Statistic::Sum, 10)?;
    let second = aggregate(&[5u32; 100], Statistic::Sum, 10)?;
    assert_eq!(first, StatValue::Int(500));
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_concurrent_aggregations() {
    let values: Arc<Vec<f64>> = Arc::new((0..50_000).map(|i| (i % 100) as f64).collect());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let values = Arc::clone(&values);
            thread::spawn(move || aggregate(&values, Statistic::Average, 128).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_f64(), 49.5);
    }
}

#[test]
fn test_cancellation_from_another_thread() {
    let values: Arc<Vec<u64>> = Arc::new((0..2_000_000).collect());
    let cancel = Arc::new(AtomicBool::new(false));

    let worker = {
        let values = Arc::clone(&values);
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            let config = AggregatorConfig::default().with_split_threshold(1);
            aggregate_with_cancel(&values, Statistic::Sum, &config, &cancel)
        })
    };
    cancel.store(true, Ordering::Relaxed);

    // Either the run finished before the flag was seen, or it was cancelled
    match worker.join().unwrap() {
        Ok(sum) => assert_eq!(sum, StatValue::Int(1_999_999_000_000)),
        Err(err) => assert_eq!(err, StatsError::Cancelled),
    }
}

#[test]
fn test_dedicated_pool_matches_global_pool() -> anyhow::Result<()> {
    let values: Vec<f32> = (0..10_000).map(|i| (i % 7) as f32).collect();
    let global = aggregate(&values, Statistic::SampleStdDev, 64)?;
    let config = AggregatorConfig::default()
        .with_split_threshold(64)
        .with_num_threads(3);
    let dedicated = aggregate_with_config(&values, Statistic::SampleStdDev, &config)?;
    assert!((global.as_f64() - dedicated.as_f64()).abs() < 1e-9);
    Ok(())
}
