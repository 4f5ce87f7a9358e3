use anyhow::Result;
use census::testing::{FileSource, MemoryFactory, mock_age_file};
use census::{AgeSource, Census, CensusError};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Round-robin interleaving of `(age, repetitions)` specs, so no test
/// depends on ages arriving grouped.
fn interleaved(specs: &[(i64, usize)]) -> Vec<i64> {
    let mut remaining = specs.to_vec();
    let mut out = Vec::new();
    loop {
        let mut progressed = false;
        for (age, left) in &mut remaining {
            if *left > 0 {
                out.push(*age);
                *left -= 1;
                progressed = true;
            }
        }
        if !progressed {
            return out;
        }
    }
}

#[test]
fn single_region_top3_in_canonical_form() -> Result<()> {
    init_logs();
    let stream = interleaved(&[(10, 38), (15, 35), (12, 30), (99, 1)]);
    let census = Census::new(MemoryFactory::default().with_region("north", stream));

    let top = census.top3_ages(Some("north"))?;
    assert_eq!(top, vec!["1:10=38", "2:15=35", "3:12=30"]);
    Ok(())
}

#[test]
fn missing_or_empty_region_means_no_data() -> Result<()> {
    let census = Census::new(MemoryFactory::default());

    assert!(census.top3_ages(None)?.is_empty());
    assert!(census.top3_ages(Some(""))?.is_empty());
    Ok(())
}

#[test]
fn empty_region_list_is_a_contract_violation() {
    let census = Census::new(MemoryFactory::default());

    let err = census.top3_ages_many(&[]).unwrap_err();
    assert!(matches!(err, CensusError::InvalidArgument(_)));
}

#[test]
fn sentinel_and_null_entries_are_no_op_partitions() -> Result<()> {
    let factory = MemoryFactory::default().with_region("north", vec![10, 10, 15, 12, 12, 12]);
    let census = Census::new(factory);

    let with_noise = census.top3_ages_many(&[
        Some("empty"),
        Some("invalid"),
        None,
        Some(""),
        Some("north"),
    ])?;
    let alone = census.top3_ages_many(&[Some("north")])?;
    assert_eq!(with_noise, alone);
    assert_eq!(with_noise, census.top3_ages(Some("north"))?);
    Ok(())
}

#[test]
fn all_regions_filtered_returns_empty_output() -> Result<()> {
    let census = Census::new(MemoryFactory::default());

    let top = census.top3_ages_many(&[Some("empty"), None, Some("")])?;
    assert!(top.is_empty());
    Ok(())
}

#[test]
fn multi_region_counts_merge_before_ranking() -> Result<()> {
    init_logs();
    let factory = MemoryFactory::default()
        .with_region("north", interleaved(&[(10, 20), (15, 18)]))
        .with_region("south", interleaved(&[(10, 18), (15, 17), (12, 30)]))
        .with_region("west", vec![-5, 12]);
    let census = Census::new(factory).with_workers(4);

    let top = census.top3_ages_many(&[Some("north"), Some("south"), Some("west")])?;
    // 10 → 38, 15 → 35, 12 → 31 across all three regions.
    assert_eq!(top, vec!["1:10=38", "2:15=35", "3:12=31"]);
    Ok(())
}

#[test]
fn ranks_never_drift_across_repeated_calls() -> Result<()> {
    let factory = MemoryFactory::default()
        .with_region("a", vec![10, 10, 15])
        .with_region("b", vec![15, 12]);
    let census = Census::new(factory);

    let first = census.top3_ages_many(&[Some("a"), Some("b")])?;
    for _ in 0..5 {
        assert_eq!(census.top3_ages_many(&[Some("a"), Some("b")])?, first);
        assert_eq!(census.top3_ages(Some("a"))?, census.top3_ages(Some("a"))?);
    }
    assert!(first[0].starts_with("1:"));
    Ok(())
}

#[test]
fn fewer_than_three_distinct_ages_is_fine() -> Result<()> {
    let census = Census::new(MemoryFactory::default().with_region("tiny", vec![-1, -1, 5]));

    assert_eq!(census.top3_ages(Some("tiny"))?, vec!["1:5=1"]);
    Ok(())
}

#[test]
fn unknown_region_error_names_it() {
    let census = Census::new(MemoryFactory::default());

    let err = census.top3_ages(Some("nowhere")).unwrap_err();
    assert!(matches!(err, CensusError::SourceOpen { .. }));
    assert_eq!(err.region(), Some("nowhere"));
}

#[test]
fn many_small_regions_on_a_small_pool() -> Result<()> {
    let mut factory = MemoryFactory::default();
    for i in 0..32 {
        factory = factory.with_region(&format!("shard-{i}"), vec![10, 15, 10]);
    }
    let census = Census::new(factory).with_workers(2);

    let names: Vec<String> = (0..32).map(|i| format!("shard-{i}")).collect();
    let regions: Vec<Option<&str>> = names.iter().map(|n| Some(n.as_str())).collect();
    let top = census.top3_ages_many(&regions)?;
    assert_eq!(top, vec!["1:10=64", "2:15=32"]);
    Ok(())
}

#[test]
fn file_backed_sources_end_to_end() -> Result<()> {
    init_logs();
    let north = mock_age_file(&interleaved(&[(10, 3), (15, 2)]))?;
    let south = mock_age_file(&[12, -4, 12])?;

    let north_path = north.path().to_path_buf();
    let south_path = south.path().to_path_buf();
    let factory = move |region: &str| -> Result<Box<dyn AgeSource>> {
        let path = match region {
            "north" => &north_path,
            "south" => &south_path,
            other => anyhow::bail!("unknown region {other:?}"),
        };
        Ok(Box::new(FileSource::open(path)?))
    };

    let census = Census::new(factory);
    let top = census.top3_ages_many(&[Some("north"), Some("south")])?;
    assert_eq!(top, vec!["1:10=3", "2:12=2", "3:15=2"]);
    Ok(())
}
