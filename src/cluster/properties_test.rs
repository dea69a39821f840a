#[cfg(test)]
mod tests {
    use quickcheck::{Arbitrary, Gen, quickcheck};

    use crate::cluster::{
        ClusterMap, ClusteringEngine, Euclidean, GreedyQt, GridBoundaries, Hierarchical,
        PointSet, Strategy, centroid_and_bounds,
    };

    /// Random points on a 10x10 plane with a few charges and sources
    #[derive(Debug, Clone)]
    struct Scenario {
        xs: Vec<f64>,
        ys: Vec<f64>,
        charges: Vec<i32>,
        sources: Vec<i32>,
        threshold: f64,
    }

    impl Arbitrary for Scenario {
        fn arbitrary(g: &mut Gen) -> Self {
            let n = usize::arbitrary(g) % 80 + 2;
            let coord = |g: &mut Gen| f64::from(u16::arbitrary(g) % 1000) / 100.0;
            let mut s = Scenario {
                xs: Vec::with_capacity(n),
                ys: Vec::with_capacity(n),
                charges: Vec::with_capacity(n),
                sources: Vec::with_capacity(n),
                threshold: f64::from(u8::arbitrary(g) % 20) / 10.0,
            };
            for _ in 0..n {
                s.xs.push(coord(g));
                s.ys.push(coord(g));
                s.charges.push(i32::from(u8::arbitrary(g) % 3));
                s.sources.push(i32::from(u8::arbitrary(g) % 5));
            }
            s
        }
    }

    fn grid() -> GridBoundaries {
        let lines: Vec<f64> = (0..=10).map(f64::from).collect();
        GridBoundaries::new(lines.clone(), lines).unwrap()
    }

    fn strategies(s: &Scenario) -> Vec<Strategy> {
        vec![
            GreedyQt::new(s.threshold).unwrap().into(),
            Hierarchical::new().into(),
        ]
    }

    /// Membership, uniqueness, shared charge and exact bounding boxes
    fn check_clusters(s: &Scenario, clusters: &ClusterMap<i32, i32>) -> bool {
        let n = s.xs.len();
        let mut seen = vec![false; n];
        for c in clusters.values() {
            if c.len() < 2 || c.points().len() != c.properties_b().len() {
                return false;
            }
            for &i in c.points() {
                if i >= n || seen[i] {
                    return false;
                }
                seen[i] = true;
            }

            let mut sources: Vec<i32> = c.properties_b().iter().flatten().copied().collect();
            sources.sort();
            sources.dedup();
            if sources.len() != c.len() {
                return false;
            }

            let Some(charge) = c.property_a() else {
                return false;
            };
            if c.points().iter().any(|&i| s.charges[i] != charge) {
                return false;
            }

            let Some((_, bounds)) = centroid_and_bounds(c.points(), |i| {
                crate::cluster::Point([s.xs[i], s.ys[i]])
            }) else {
                return false;
            };
            if bounds != c.bounding_box() {
                return false;
            }
        }
        true
    }

    #[test]
    fn prop_clusters_are_valid() {
        fn prop(s: Scenario) -> bool {
            let points = PointSet::with_properties(&s.xs, &s.ys, &s.charges, &s.sources).unwrap();
            strategies(&s).into_iter().all(|strategy| {
                let mut engine =
                    ClusteringEngine::new(Euclidean, strategy, points, grid()).unwrap();
                engine.cluster().is_ok() && check_clusters(&s, engine.results())
            })
        }
        quickcheck(prop as fn(Scenario) -> bool);
    }

    #[test]
    fn prop_extension_only_merges() {
        fn prop(s: Scenario) -> bool {
            let points = PointSet::with_properties(&s.xs, &s.ys, &s.charges, &s.sources).unwrap();
            strategies(&s).into_iter().all(|strategy| {
                let mut engine =
                    ClusteringEngine::new(Euclidean, strategy, points, grid()).unwrap();
                if engine.cluster().is_err() {
                    return false;
                }
                let before = engine.results().clone();
                if engine.extend_clusters_y().is_err() {
                    return false;
                }
                let after = engine.results();

                after.len() <= before.len()
                    && before.values().all(|old| {
                        after.values().any(|new| {
                            old.points().iter().all(|i| new.points().contains(i))
                        })
                    })
                    && check_clusters(&s, after)
            })
        }
        quickcheck(prop as fn(Scenario) -> bool);
    }

    #[test]
    fn prop_filter_is_idempotent() {
        fn prop(s: Scenario, t: u8) -> bool {
            let threshold = f64::from(t % 30) / 10.0;
            let points = PointSet::with_properties(&s.xs, &s.ys, &s.charges, &s.sources).unwrap();
            strategies(&s).into_iter().all(|strategy| {
                let mut engine =
                    ClusteringEngine::new(Euclidean, strategy, points, grid()).unwrap();
                if engine.cluster().is_err() || engine.remove_small_clusters_y(threshold).is_err()
                {
                    return false;
                }
                let once = engine.results().clone();
                if engine.remove_small_clusters_y(threshold).is_err() {
                    return false;
                }
                engine.results() == &once
                    && once
                        .values()
                        .all(|c| c.bounding_box().height() >= threshold)
            })
        }
        quickcheck(prop as fn(Scenario, u8) -> bool);
    }

    #[test]
    fn prop_unclustered_complements_clusters() {
        fn prop(s: Scenario) -> bool {
            let points = PointSet::<i32, i32>::new(&s.xs, &s.ys).unwrap();
            let strategy = GreedyQt::new(s.threshold).unwrap();
            let mut engine = ClusteringEngine::new(Euclidean, strategy, points, grid()).unwrap();
            if engine.cluster().is_err() {
                return false;
            }
            let clustered: usize = engine.results().values().map(|c| c.len()).sum();
            let unclustered = engine.unclustered();
            clustered + unclustered.len() == s.xs.len()
                && unclustered
                    .iter()
                    .all(|i| engine.results().values().all(|c| !c.points().contains(i)))
        }
        quickcheck(prop as fn(Scenario) -> bool);
    }
}
