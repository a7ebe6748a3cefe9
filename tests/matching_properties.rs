//! Association invariants checked through the public API.
//!
//! Random fields are generated with a fixed-seed LCG so failures reproduce.

use cluster_validation::core::{
    AssociationError, Cluster, ClusterCatalog, Halo, HaloCatalog, MatchMethod, ThetaMaxType,
};
use cluster_validation::cosmology::LambdaCdm;
use cluster_validation::matching::{
    match_catalogs, Assignment, MatchInputs, MatchOutcome, MatchParameters, MatchingEngine,
};
use cluster_validation::statistics::{
    completeness, fragmentation, overmerging, purity, CatalogMeta, CountingMode,
};

struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        #[allow(clippy::cast_precision_loss)]
        let x = (self.0 >> 11) as f64 / (1u64 << 53) as f64;
        x
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Halos and clusters scattered over a small patch, dense enough for
/// ambiguous candidates
fn random_field(seed: u64, num_halos: usize, num_clusters: usize) -> (HaloCatalog, ClusterCatalog) {
    let mut rng = Lcg(seed);
    let halos = (0..num_halos)
        .map(|i| {
            Halo::new(
                i64::try_from(i).unwrap(),
                rng.range(50.0, 50.5),
                rng.range(-1.0, -0.5),
                rng.range(0.2, 0.6),
                rng.range(1e14, 1e15),
            )
        })
        .collect();
    let clusters = (0..num_clusters)
        .map(|i| {
            Cluster::new(
                i64::try_from(i).unwrap(),
                rng.range(50.0, 50.5),
                rng.range(-1.0, -0.5),
                rng.range(0.2, 0.6),
                rng.range(20.0, 200.0),
            )
        })
        .collect();
    (HaloCatalog::new(halos), ClusterCatalog::new(clusters))
}

fn cosmo() -> LambdaCdm {
    LambdaCdm::flat(70.0, 0.3).unwrap()
}

fn run(
    halos: &HaloCatalog,
    clusters: &ClusterCatalog,
    delta_zmax: f64,
    theta_max: f64,
    theta_max_type: ThetaMaxType,
) -> MatchOutcome {
    let cosmology = cosmo();
    MatchingEngine::new(MatchParameters {
        delta_zmax,
        theta_max,
        theta_max_type,
        ..MatchParameters::default()
    })
    .run(&MatchInputs {
        halos,
        clusters,
        cosmology: &cosmology,
        galaxies: None,
        members: None,
    })
    .unwrap()
}

#[test]
fn test_assignment_is_bijective_and_drawn_from_candidates() {
    for seed in 1..=5 {
        let (halos, clusters) = random_field(seed, 60, 45);
        for (theta_max, kind) in [(0.05, ThetaMaxType::Angular), (1.5, ThetaMaxType::Physical)] {
            let outcome = run(&halos, &clusters, 0.03, theta_max, kind);

            let mut seen_halos = std::collections::HashSet::new();
            let mut seen_clusters = std::collections::HashSet::new();
            for pair in outcome.assignment.pairs() {
                assert!(seen_halos.insert(pair.halo_index), "halo assigned twice");
                assert!(seen_clusters.insert(pair.cluster_index), "cluster assigned twice");
                assert!(outcome.match_1w.partners(pair.halo_index).contains(&pair.cluster_index));
                assert!(outcome.match_2w.partners(pair.cluster_index).contains(&pair.halo_index));
            }
            assert!(outcome.assignment.len() <= halos.len().min(clusters.len()));
        }
    }
}

#[test]
fn test_tallies_agree_both_ways() {
    let (halos, clusters) = random_field(11, 50, 50);
    let outcome = run(&halos, &clusters, 0.05, 0.08, ThetaMaxType::Angular);
    assert_eq!(outcome.match_1w.num_pairs(), outcome.match_2w.num_pairs());
    assert_eq!(outcome.match_1w.num_pairs(), outcome.candidates.len());
    for (h, partners) in outcome.match_1w.iter() {
        for &c in partners {
            assert!(outcome.match_2w.partners(c).contains(&h));
        }
    }
}

#[test]
fn test_fractions_lie_in_unit_interval() {
    let everywhere = CatalogMeta::unbounded();
    for seed in 20..25 {
        let (halos, clusters) = random_field(seed, 40, 30);
        let outcome = run(&halos, &clusters, 0.04, 0.06, ThetaMaxType::Angular);
        let c = completeness(&halos, &outcome.assignment, &everywhere, &everywhere).unwrap();
        let p = purity(&clusters, &outcome.assignment, &everywhere, &everywhere).unwrap();
        assert!((0.0..=1.0).contains(&c.value));
        assert!((0.0..=1.0).contains(&p.value));
    }
}

#[test]
fn test_wider_windows_never_lose_candidates() {
    let (halos, clusters) = random_field(7, 50, 50);
    let windows = [(0.01, 0.02), (0.02, 0.02), (0.02, 0.05), (0.05, 0.10), (0.10, 0.30)];

    let mut previous: Option<MatchOutcome> = None;
    for (delta_zmax, theta_max) in windows {
        let outcome = run(&halos, &clusters, delta_zmax, theta_max, ThetaMaxType::Angular);
        if let Some(prev) = &previous {
            for h in 0..halos.len() {
                let before = prev.match_1w.partners(h);
                let after = outcome.match_1w.partners(h);
                assert!(after.len() >= before.len());
                assert!(before.iter().all(|c| after.contains(c)));
            }
        }
        previous = Some(outcome);
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let (halos, clusters) = random_field(3, 40, 40);
    let cosmology = cosmo();
    let call = || {
        match_catalogs(
            &halos,
            &clusters,
            0.05,
            0.1,
            ThetaMaxType::Angular,
            MatchMethod::Proximity,
            &cosmology,
            None,
            None,
        )
        .unwrap()
    };
    let (a1, a2, a3) = call();
    let (b1, b2, b3) = call();
    assert_eq!(a1, b1);
    assert_eq!(a2, b2);
    assert_eq!(a3, b3);
    assert_eq!(a3.signature(), b3.signature());
}

#[test]
fn test_single_pair_is_complete_and_pure() {
    let halos = HaloCatalog::new(vec![Halo::new(1, 10.0, 10.0, 0.30, 2e14)]);
    let clusters = ClusterCatalog::new(vec![Cluster::new(1, 10.001, 10.001, 0.302, 40.0)]);
    let outcome = run(&halos, &clusters, 0.01, 0.01, ThetaMaxType::Angular);

    assert_eq!(outcome.assignment.len(), 1);
    assert_eq!(outcome.assignment.cluster_for_halo(0), Some(0));

    let everywhere = CatalogMeta::unbounded();
    let c = completeness(&halos, &outcome.assignment, &everywhere, &everywhere).unwrap();
    let p = purity(&clusters, &outcome.assignment, &everywhere, &everywhere).unwrap();
    assert!((c.value - 1.0).abs() < 1e-12);
    assert!((p.value - 1.0).abs() < 1e-12);
}

#[test]
fn test_one_to_one_field_is_complete_and_pure() {
    // Well-separated pairs, each halo with exactly one nearby cluster
    let halos = HaloCatalog::new(
        (0..10_i32)
            .map(|i| Halo::new(i64::from(i), 10.0 + 2.0 * f64::from(i), 0.0, 0.3, 3e14))
            .collect(),
    );
    let clusters = ClusterCatalog::new(
        (0..10_i32)
            .map(|i| Cluster::new(i64::from(i), 10.002 + 2.0 * f64::from(i), 0.001, 0.305, 30.0))
            .collect(),
    );
    let outcome = run(&halos, &clusters, 0.01, 0.01, ThetaMaxType::Angular);
    assert_eq!(outcome.match_1w.num_ambiguous(), 0);
    assert_eq!(outcome.match_2w.num_ambiguous(), 0);

    let everywhere = CatalogMeta::unbounded();
    let c = completeness(&halos, &outcome.assignment, &everywhere, &everywhere).unwrap();
    let p = purity(&clusters, &outcome.assignment, &everywhere, &everywhere).unwrap();
    assert!((c.value - 1.0).abs() < 1e-12);
    assert!((p.value - 1.0).abs() < 1e-12);
}

#[test]
fn test_closer_cluster_wins_and_the_other_fragments() {
    let halos = HaloCatalog::new(vec![Halo::new(1, 10.0, 10.0, 0.30, 5e14)]);
    let clusters = ClusterCatalog::new(vec![
        Cluster::new(1, 10.005, 10.0, 0.305, 25.0),
        Cluster::new(2, 10.002, 10.0, 0.301, 60.0),
    ]);
    let outcome = run(&halos, &clusters, 0.01, 0.01, ThetaMaxType::Angular);

    assert_eq!(outcome.match_1w.partners(0), &[0, 1]);
    assert_eq!(outcome.assignment.cluster_for_halo(0), Some(1));
    assert!(!outcome.assignment.contains_cluster(0));

    let frag = fragmentation(&outcome.match_1w, &outcome.assignment, CountingMode::Candidates).unwrap();
    assert_eq!(frag.count, 1);
    let over = overmerging(&outcome.match_2w, &outcome.assignment, CountingMode::Candidates).unwrap();
    assert_eq!(over.count, 0);
}

#[test]
fn test_no_clusters_gives_zero_completeness_and_undefined_purity() {
    let halos = HaloCatalog::new(vec![
        Halo::new(1, 10.0, 10.0, 0.3, 2e14),
        Halo::new(2, 20.0, 10.0, 0.4, 3e14),
    ]);
    let clusters = ClusterCatalog::new(Vec::new());
    let everywhere = CatalogMeta::unbounded();
    let nothing = Assignment::new();

    let c = completeness(&halos, &nothing, &everywhere, &everywhere).unwrap();
    assert_eq!(c.count, 0);
    assert!(c.value.abs() < 1e-12);
    assert!(matches!(
        purity(&clusters, &nothing, &everywhere, &everywhere),
        Err(AssociationError::DivideByZero(_))
    ));

    // The engine refuses to associate against nothing
    let cosmology = cosmo();
    let result = MatchingEngine::new(MatchParameters::default()).run(&MatchInputs {
        halos: &halos,
        clusters: &clusters,
        cosmology: &cosmology,
        galaxies: None,
        members: None,
    });
    assert!(matches!(result, Err(AssociationError::EmptyInput(_))));
}

#[test]
fn test_physical_window_depends_on_cosmology() {
    // 0.03 deg at z = 0.3 is ~0.63 Mpc for H0 = 70 and ~1.25 Mpc for H0 = 35
    let halos = HaloCatalog::new(vec![
        Halo::new(1, 20.0, 0.0, 0.3, 4e14),
        Halo::new(2, 60.0, 0.0, 0.3, 4e14),
    ]);
    let clusters = ClusterCatalog::new(vec![
        Cluster::new(1, 20.03, 0.0, 0.3, 50.0),
        Cluster::new(2, 60.03, 0.0, 0.3, 50.0),
    ]);
    let near = LambdaCdm::flat(70.0, 0.3).unwrap();
    let far = LambdaCdm::flat(35.0, 0.3).unwrap();

    let count = |cosmology: &LambdaCdm| {
        let (_, _, assignment) = match_catalogs(
            &halos,
            &clusters,
            0.01,
            1.0,
            ThetaMaxType::Physical,
            MatchMethod::Proximity,
            cosmology,
            None,
            None,
        )
        .unwrap();
        assignment.len()
    };

    assert_eq!(count(&near), 2);
    assert_eq!(count(&far), 0);
}
