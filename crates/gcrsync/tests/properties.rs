//! Property tests for whole sync runs.
//!
//! Each case drives a full run on its own paused runtime, with random pool
//! sizes, per-image delays and failures.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use gcrsync::changelog::MemoryCommitter;
use gcrsync::{SyncConfig, Syncer};
use gcrsync_testkit::fixtures::{image_names, MirrorFixture};
use gcrsync_testkit::generators::{overlapping_sets, RunParams};
use proptest::prelude::*;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn run_respects_bound_and_records_each_success_once(params: RunParams) {
        let names = image_names(params.images);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let fixture = MirrorFixture::new(&refs, &[]);

        let mut transfer = fixture.transfer(Duration::ZERO);
        for (name, delay) in names.iter().zip(&params.delays_ms) {
            transfer = transfer.delay(name, Duration::from_millis(*delay));
        }
        let failing: HashSet<usize> = params.failing.iter().copied().collect();
        for &index in &failing {
            transfer = transfer.fail(&names[index]);
        }
        let transfer = Arc::new(transfer);

        let config = SyncConfig {
            process_limit: params.process_limit,
            ..SyncConfig::default()
        };
        let syncer = Syncer::new(
            config,
            Arc::clone(&fixture.source),
            Arc::clone(&fixture.target),
            Arc::clone(&transfer),
            MemoryCommitter::new(),
        )
        .unwrap();

        let report = paused_runtime().block_on(syncer.sync()).unwrap();
        let succeeded = params.images - failing.len();

        prop_assert!(transfer.peak() <= params.process_limit);
        prop_assert_eq!(transfer.in_flight(), 0);
        prop_assert_eq!(report.recorded, succeeded);
        prop_assert_eq!(report.failed.len(), failing.len());
        prop_assert_eq!(report.skipped, 0);

        let commits = syncer.committer().commits();
        if succeeded == 0 {
            prop_assert!(commits.is_empty());
        } else {
            prop_assert_eq!(commits.len(), 1);
            let batch = &commits[0];
            let unique: HashSet<_> = batch.iter().collect();
            prop_assert_eq!(unique.len(), batch.len());
            prop_assert_eq!(batch.len(), succeeded);
        }
    }

    #[test]
    fn second_run_has_nothing_pending((source, target) in overlapping_sets(20)) {
        let fixture = MirrorFixture::new(&[], &[]);
        for image in source.iter() {
            fixture.source.insert(MirrorFixture::SOURCE, image.clone());
        }
        for image in target.iter() {
            fixture.target.insert(MirrorFixture::TARGET, image.clone());
        }
        let transfer = Arc::new(fixture.transfer(Duration::from_millis(5)));
        let syncer = Syncer::new(
            SyncConfig::default(),
            Arc::clone(&fixture.source),
            Arc::clone(&fixture.target),
            transfer,
            MemoryCommitter::new(),
        )
        .unwrap();

        let runtime = paused_runtime();
        let first = runtime.block_on(syncer.sync()).unwrap();
        let second = runtime.block_on(syncer.sync()).unwrap();

        prop_assert_eq!(first.recorded, first.inventory.pending);
        prop_assert_eq!(second.inventory.pending, 0);
        prop_assert!(syncer.committer().commit_count() <= 1);
    }
}
