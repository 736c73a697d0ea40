use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use tracing::info;

use _model::Place;

use crate::nearest::ProximityIndex;
use crate::onemap::RouteSource;
use crate::progress;
use crate::sink::{CsvSink, FeatureRow};

/// How hard to lean on the routing service: at most `batch_size` subjects per
/// `cooldown` window.
#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    pub batch_size: usize,
    /// Minimum gap between the starts of consecutive batches.
    pub cooldown: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            batch_size: 100,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Spaces batch starts at least one window apart. The first batch runs
/// immediately and nothing sleeps after the last one; time spent processing
/// a batch is credited against its window.
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.window {
                thread::sleep(self.window - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// The three candidate tables a block is measured against.
pub struct Reference<I> {
    pub mrts: I,
    pub malls: I,
    pub schools: I,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Blocks enriched and persisted.
    pub processed: usize,
    pub batches: usize,
    /// Rows missing at least one walking distance.
    pub missing_distance: usize,
}

/// Enrich every block and append the results batch by batch. Batches are
/// contiguous, processed strictly in input order, and each is persisted
/// before the next one starts.
pub fn run<I: ProximityIndex, R: RouteSource>(
    blocks: &[Place],
    reference: &Reference<I>,
    router: &R,
    sink: &mut CsvSink,
    pacing: Pacing,
) -> Result<RunSummary> {
    if pacing.batch_size == 0 {
        bail!("batch size must be at least 1");
    }

    let mut summary = RunSummary::default();
    let mut throttle = Throttle::new(pacing.cooldown);
    let pb = progress::bar(blocks.len() as u64);

    for (index, batch) in blocks.chunks(pacing.batch_size).enumerate() {
        throttle.wait();

        // the pure lookups are embarrassingly parallel; collect keeps input
        // order for the row assembly below
        let nearest: Vec<_> = batch
            .par_iter()
            .map(|block| {
                (
                    reference.mrts.nearest(block.point),
                    reference.malls.nearest(block.point),
                    reference.schools.nearest(block.point),
                )
            })
            .collect();

        let mut rows = Vec::with_capacity(batch.len());
        for (block, (mrt, mall, school)) in batch.iter().zip(nearest) {
            let distance_mrt = router.walking_distance(block.point, mrt.point);
            let distance_mall = router.walking_distance(block.point, mall.point);
            if distance_mrt.is_none() || distance_mall.is_none() {
                summary.missing_distance += 1;
            }

            rows.push(FeatureRow {
                address: block.address.clone(),
                lat: block.lat(),
                long: block.long(),
                nearest_mrt: mrt.address,
                distance_mrt,
                nearest_mall: mall.address,
                distance_mall,
                nearest_school: school.address,
                within_1km_of_school: school.within_1km,
            });
            pb.inc(1);
        }

        sink.append(&rows)
            .with_context(|| format!("failed to persist batch {index}"))?;
        summary.processed += rows.len();
        summary.batches += 1;
        info!("batch {index}: appended {} rows", rows.len());
    }

    pb.finish();
    Ok(summary)
}
