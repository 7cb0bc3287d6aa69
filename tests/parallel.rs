use anyhow::{Result, anyhow};
use polytrack::geom::IsClose;
use polytrack::mesh::{HexBlock, PolyMesh};
use polytrack::track::{ChannelExchange, Cloud, Domain, ParallelTracker};
use polytrack::{Point, TopologyView, TrackingConfig, TrackingContext, TrackingError, Tracer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn block() -> Result<HexBlock> {
    HexBlock::new(Point::new(-1., 0., 0.), [3., 1., 1.], [7, 3, 2])
}

fn domains(n: usize) -> Result<Vec<Domain<PolyMesh, usize, ChannelExchange>>> {
    let meshes = block()?
        .decompose_x(n)?
        .iter()
        .map(HexBlock::build)
        .collect::<Result<Vec<_>>>()?;
    Ok(meshes
        .into_iter()
        .zip(ChannelExchange::connected(n))
        .map(|(mesh, exchange)| Domain::new(mesh, exchange))
        .collect())
}

fn random_point(rng: &mut StdRng) -> Point {
    Point::new(
        -1. + 3. * rng.r#gen::<f64>(),
        rng.r#gen::<f64>(),
        rng.r#gen::<f64>(),
    )
}

/// Adds a tracer from `start` to `end` to whichever domain holds `start`.
fn seed(
    domains: &mut [Domain<PolyMesh, usize, ChannelExchange>],
    start: Point,
    end: Point,
    payload: usize,
    config: &TrackingConfig,
) -> Result<()> {
    for domain in domains.iter_mut() {
        if let Some(cell) = domain.mesh.find_cell(start, config.tolerance) {
            let tracer = Tracer::new(&domain.mesh, start, cell, end, payload, config)?;
            domain.cloud.add(tracer);
            return Ok(());
        }
    }
    Err(anyhow!("No domain holds {}", start))
}

#[test]
fn test_decomposed_run_matches_serial() -> Result<()> {
    init_logging();
    let config = TrackingConfig::new();
    let mut rng = StdRng::seed_from_u64(42);
    let pairs: Vec<(Point, Point)> = (0..60)
        .map(|_| (random_point(&mut rng), random_point(&mut rng)))
        .collect();

    // Serial reference on the whole block
    let whole = block()?.build()?;
    let mut serial_ctx = TrackingContext::new(whole.n_cells());
    let mut cloud = Cloud::new();
    for (i, &(start, end)) in pairs.iter().enumerate() {
        let cell = whole
            .find_cell(start, config.tolerance)
            .ok_or_else(|| anyhow!("start {} not found", i))?;
        cloud.add(Tracer::new(&whole, start, cell, end, i, &config)?);
    }
    let report = cloud.track(&whole, &mut serial_ctx, &config);
    assert_eq!(report.arrived.len(), pairs.len());

    let mut expected = vec![Point::origin(); pairs.len()];
    for (cell, &i, _) in serial_ctx.records() {
        expected[i] = whole.cell_centre(cell);
    }

    // Same tracers on three domains
    let mut doms = domains(3)?;
    for (i, &(start, end)) in pairs.iter().enumerate() {
        seed(&mut doms, start, end, i, &config)?;
    }
    let mut tracker = ParallelTracker::new(doms, config);
    let summary = tracker.run()?;

    assert_eq!(summary.arrived(), pairs.len());
    assert_eq!(summary.failures().count(), 0);
    assert!(summary.transfers() > 0);
    assert!(summary.rounds >= 2);

    let mut seen = vec![false; pairs.len()];
    for domain in &tracker.domains {
        for (cell, &i, end) in domain.ctx.records() {
            assert!(!seen[i], "tracer {} recorded twice", i);
            seen[i] = true;
            assert_eq!(end, pairs[i].1);
            assert!(domain.mesh.cell_centre(cell).is_close(&expected[i]));
        }
    }
    assert!(seen.iter().all(|&s| s));
    Ok(())
}

#[test]
fn test_tracer_crosses_every_domain() -> Result<()> {
    let config = TrackingConfig::new();
    let mut doms = domains(4)?;
    seed(
        &mut doms,
        Point::new(-0.9, 0.35, 0.6),
        Point::new(1.9, 0.6, 0.45),
        0,
        &config,
    )?;
    let mut tracker = ParallelTracker::new(doms, config);
    let summary = tracker.run()?;

    assert_eq!(summary.arrived(), 1);
    assert_eq!(summary.transfers(), 3);
    // One round per domain visited
    assert_eq!(summary.rounds, 4);
    assert_eq!(summary.domains[3].arrived, 1);
    assert_eq!(summary.domains[0].sent, 1);
    assert_eq!(summary.domains[3].received, 1);
    assert_eq!(tracker.domains[3].ctx.len(), 1);
    Ok(())
}

#[test]
fn test_round_limit() -> Result<()> {
    let mut config = TrackingConfig::new();
    config.max_rounds = 1;
    let mut doms = domains(2)?;
    seed(
        &mut doms,
        Point::new(-0.9, 0.35, 0.6),
        Point::new(1.9, 0.6, 0.45),
        0,
        &config,
    )?;
    let err = ParallelTracker::new(doms, config)
        .run()
        .err()
        .ok_or_else(|| anyhow!("expected the round limit"))?;
    assert_eq!(
        err.downcast_ref::<TrackingError>(),
        Some(&TrackingError::RoundLimit { rounds: 1 })
    );
    Ok(())
}
