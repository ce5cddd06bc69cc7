//! End-to-end planning tests: roster ingest through projection, index,
//! graph assembly, endpoint splicing, and shortest-path solving.

#[cfg(test)]
mod tests {
    use crate::pathfinding::{RoutingError, RoutingMethod, shortest_path};
    use crate::projection::LocalProjection;
    use crate::proximity_graph::{build_proximity_graph, insert_query_points};
    use crate::spatial_index::SpatialIndex;
    use crate::stations_reader::read_stations;
    use crate::{DESTINATION_STATION_ID, ORIGIN_STATION_ID, StationId, StationRecord};
    use rand::Rng;

    fn record(id: StationId, x: f64, y: f64) -> StationRecord {
        StationRecord { id, x, y }
    }

    /// A grid cluster of stations spaced 1 apart, ids starting at `first_id`.
    fn grid_cluster(first_id: StationId, origin: (f64, f64), side: i64) -> Vec<StationRecord> {
        let mut records = Vec::new();
        for row in 0..side {
            for col in 0..side {
                records.push(record(
                    first_id + row * side + col,
                    origin.0 + col as f64,
                    origin.1 + row as f64,
                ));
            }
        }
        records
    }

    #[test]
    fn plan_across_a_single_cluster() {
        let records = grid_cluster(1, (0.0, 0.0), 5);
        let index = SpatialIndex::build(&records);
        let mut graph = build_proximity_graph(&index, 3).unwrap();

        let endpoints = [
            record(ORIGIN_STATION_ID, -0.4, -0.4),
            record(DESTINATION_STATION_ID, 4.4, 4.4),
        ];
        insert_query_points(&mut graph, &index, &endpoints, 3).unwrap();
        assert_eq!(graph.station_count(), records.len() + 2);

        for method in [RoutingMethod::Dijkstra, RoutingMethod::BellmanFord] {
            let route =
                shortest_path(&graph, ORIGIN_STATION_ID, DESTINATION_STATION_ID, method).unwrap();
            assert_eq!(route.stations.first(), Some(&ORIGIN_STATION_ID));
            assert_eq!(route.stations.last(), Some(&DESTINATION_STATION_ID));
            // Every consecutive pair must be an actual graph edge, and the
            // reported total must be the sum of the traversed weights.
            let mut total = 0.0;
            for pair in route.stations.windows(2) {
                total += graph.edge_weight(pair[0], pair[1]).unwrap();
            }
            assert!((total - route.total_distance).abs() < 1e-9);
        }
    }

    #[test]
    fn far_clusters_with_small_k_are_unreachable() {
        // Two 3x3 grids 1000 apart; k=2 edges span at most a grid diagonal,
        // so no edge can bridge the gap.
        let mut records = grid_cluster(1, (0.0, 0.0), 3);
        records.extend(grid_cluster(100, (1000.0, 1000.0), 3));
        let index = SpatialIndex::build(&records);
        let mut graph = build_proximity_graph(&index, 2).unwrap();

        let endpoints = [
            record(ORIGIN_STATION_ID, 1.0, 1.2),
            record(DESTINATION_STATION_ID, 1001.0, 1001.2),
        ];
        insert_query_points(&mut graph, &index, &endpoints, 2).unwrap();

        for method in [RoutingMethod::Dijkstra, RoutingMethod::BellmanFord] {
            assert_eq!(
                shortest_path(&graph, ORIGIN_STATION_ID, DESTINATION_STATION_ID, method),
                Err(RoutingError::NoPath {
                    from: ORIGIN_STATION_ID,
                    dest: DESTINATION_STATION_ID
                })
            );
        }
    }

    #[test]
    fn methods_agree_on_random_proximity_graphs() {
        let mut rng = rand::rng();
        for _ in 0..15 {
            let records: Vec<StationRecord> = (0..60)
                .map(|i| {
                    record(
                        i,
                        rng.random_range(-100.0..100.0),
                        rng.random_range(-100.0..100.0),
                    )
                })
                .collect();
            let index = SpatialIndex::build(&records);
            let graph = build_proximity_graph(&index, 4).unwrap();

            for _ in 0..10 {
                let source = rng.random_range(0..60);
                let dest = rng.random_range(0..60);
                let dijkstra = shortest_path(&graph, source, dest, RoutingMethod::Dijkstra);
                let bellman = shortest_path(&graph, source, dest, RoutingMethod::BellmanFord);
                match (dijkstra, bellman) {
                    (Ok(a), Ok(b)) => {
                        // Tied routes may differ in sequence, never in weight.
                        assert!((a.total_distance - b.total_distance).abs() < 1e-9);
                    }
                    (Err(a), Err(b)) => assert_eq!(a, b),
                    (a, b) => panic!("methods disagree on reachability: {a:?} vs {b:?}"),
                }
            }
        }
    }

    #[test]
    fn roster_csv_to_route() {
        // Four stations along Avenida Reforma, roughly 500 m apart.
        let csv = "id,name,latitude,longitude\n\
                   1,Chapultepec,19.4204,-99.1762\n\
                   2,Sevilla,19.4218,-99.1710\n\
                   3,Insurgentes,19.4236,-99.1630\n\
                   4,Cuauhtemoc,19.4258,-99.1547\n";
        let stations = read_stations(csv.as_bytes()).unwrap();
        let projection = LocalProjection::from_stations(&stations).unwrap();

        let records: Vec<StationRecord> = stations
            .iter()
            .map(|s| {
                let (x, y) = projection.project(s.lat, s.lon);
                record(s.id, x, y)
            })
            .collect();
        let index = SpatialIndex::build(&records);
        let mut graph = build_proximity_graph(&index, 1).unwrap();

        // Start just west of station 1, finish just east of station 4.
        let (from_x, from_y) = projection.project(19.4200, -99.1770);
        let (to_x, to_y) = projection.project(19.4260, -99.1540);
        let endpoints = [
            record(ORIGIN_STATION_ID, from_x, from_y),
            record(DESTINATION_STATION_ID, to_x, to_y),
        ];
        insert_query_points(&mut graph, &index, &endpoints, 1).unwrap();

        let route = shortest_path(
            &graph,
            ORIGIN_STATION_ID,
            DESTINATION_STATION_ID,
            RoutingMethod::Dijkstra,
        )
        .unwrap();
        assert_eq!(
            route.stations,
            vec![ORIGIN_STATION_ID, 1, 2, 3, 4, DESTINATION_STATION_ID]
        );
        // The chain covers about 2.3 km of street; sanity-bound the total.
        assert!(route.total_distance > 1500.0);
        assert!(route.total_distance < 4000.0);
    }

    #[test]
    fn repeated_plans_on_one_graph_are_independent() {
        let records = grid_cluster(1, (0.0, 0.0), 4);
        let index = SpatialIndex::build(&records);
        let mut graph = build_proximity_graph(&index, 2).unwrap();

        let endpoints = [
            record(ORIGIN_STATION_ID, 0.1, 0.1),
            record(DESTINATION_STATION_ID, 3.1, 3.1),
        ];
        insert_query_points(&mut graph, &index, &endpoints, 2).unwrap();

        let first = shortest_path(
            &graph,
            ORIGIN_STATION_ID,
            DESTINATION_STATION_ID,
            RoutingMethod::Dijkstra,
        )
        .unwrap();
        // Solving other pairs in between must not disturb a repeat solve.
        shortest_path(&graph, 1, 16, RoutingMethod::BellmanFord).unwrap();
        shortest_path(&graph, 16, 1, RoutingMethod::Dijkstra).unwrap();
        let second = shortest_path(
            &graph,
            ORIGIN_STATION_ID,
            DESTINATION_STATION_ID,
            RoutingMethod::Dijkstra,
        )
        .unwrap();
        assert_eq!(first, second);
    }
}
