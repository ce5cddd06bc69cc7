// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//cargo run --bin lupine --release -- plan --stations data/nomenclatura.csv --from-lat 19.4326 --from-lon -99.1332 --to-lat 19.4105 --to-lon -99.1450 --output route.geojson

use ahash::AHashMap as HashMap;
use anyhow::{Context, Result};
use clap::Parser;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use itertools::Itertools;
use lupine::pathfinding::{RoutingMethod, shortest_path};
use lupine::projection::LocalProjection;
use lupine::proximity_graph::{build_proximity_graph, insert_query_points};
use lupine::spatial_index::SpatialIndex;
use lupine::stations_reader::{ImportedStation, read_stations_csv};
use lupine::{DESTINATION_STATION_ID, ORIGIN_STATION_ID, StationId, StationRecord};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build the station proximity graph and write it as GeoJSON
    Graph {
        /// Station roster CSV (id, name, latitude, longitude)
        #[arg(long)]
        stations: PathBuf,
        /// Nearest neighbors per station
        #[arg(long, default_value_t = 3)]
        k: usize,
        /// Output GeoJSON file
        #[arg(long)]
        output: PathBuf,
    },
    /// Plan a shortest route between two geographic points
    Plan {
        /// Station roster CSV (id, name, latitude, longitude)
        #[arg(long)]
        stations: PathBuf,
        #[arg(long)]
        from_lat: f64,
        #[arg(long)]
        from_lon: f64,
        #[arg(long)]
        to_lat: f64,
        #[arg(long)]
        to_lon: f64,
        /// Nearest neighbors per station
        #[arg(long, default_value_t = 3)]
        k: usize,
        /// "dijkstra" or "bellman-ford"
        #[arg(long, default_value = "dijkstra")]
        method: String,
        /// Optional GeoJSON output for the planned route
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command {
        Commands::Graph {
            stations,
            k,
            output,
        } => run_graph(&stations, k, &output),
        Commands::Plan {
            stations,
            from_lat,
            from_lon,
            to_lat,
            to_lon,
            k,
            method,
            output,
        } => {
            let method = parse_method(&method)?;
            run_plan(
                &stations,
                (from_lat, from_lon),
                (to_lat, to_lon),
                k,
                method,
                output.as_deref(),
            )
        }
    }
}

fn parse_method(method: &str) -> Result<RoutingMethod> {
    match method {
        "dijkstra" => Ok(RoutingMethod::Dijkstra),
        "bellman-ford" | "bellman_ford" => Ok(RoutingMethod::BellmanFord),
        other => anyhow::bail!("unknown routing method {other:?}, expected dijkstra or bellman-ford"),
    }
}

/// Loads the roster and builds the planar index every planning operation
/// starts from.
fn load_network(
    stations_path: &Path,
) -> Result<(Vec<ImportedStation>, LocalProjection, SpatialIndex)> {
    let stations = read_stations_csv(stations_path)
        .map_err(|e| anyhow::anyhow!("failed to read stations CSV: {e}"))?;
    let projection = LocalProjection::from_stations(&stations)
        .context("stations CSV contains no usable stations")?;

    let records: Vec<StationRecord> = stations
        .iter()
        .map(|s| {
            let (x, y) = projection.project(s.lat, s.lon);
            StationRecord { id: s.id, x, y }
        })
        .collect();
    let index = SpatialIndex::build(&records);

    Ok((stations, projection, index))
}

fn run_graph(stations_path: &Path, k: usize, output: &Path) -> Result<()> {
    let (stations, _projection, index) = load_network(stations_path)?;
    let graph = build_proximity_graph(&index, k)?;

    let positions = station_positions(&stations);
    let mut features = Vec::new();

    for station in &stations {
        let mut properties = JsonObject::new();
        properties.insert("type".to_string(), "station".into());
        properties.insert("id".to_string(), station.id.into());
        if let Some(name) = &station.name {
            properties.insert("name".to_string(), name.clone().into());
        }

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![station.lon, station.lat]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    for (a, b, weight) in graph.edges() {
        let (Some(&from), Some(&to)) = (positions.get(&a), positions.get(&b)) else {
            continue;
        };
        let line = geo_types::LineString::from(vec![from, to]);

        let mut properties = JsonObject::new();
        properties.insert("type".to_string(), "proximity_edge".into());
        properties.insert("from".to_string(), a.into());
        properties.insert("to".to_string(), b.into());
        properties.insert("weight_meters".to_string(), weight.into());

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::from(&line)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    write_feature_collection(features, output)?;
    println!(
        "Wrote proximity graph ({} stations, {} edges, k={}) to {:?}",
        graph.station_count(),
        graph.edge_count(),
        k,
        output
    );

    Ok(())
}

fn run_plan(
    stations_path: &Path,
    from: (f64, f64),
    to: (f64, f64),
    k: usize,
    method: RoutingMethod,
    output: Option<&Path>,
) -> Result<()> {
    let (stations, projection, index) = load_network(stations_path)?;
    let mut graph = build_proximity_graph(&index, k)?;

    let (from_x, from_y) = projection.project(from.0, from.1);
    let (to_x, to_y) = projection.project(to.0, to.1);
    let endpoints = [
        StationRecord {
            id: ORIGIN_STATION_ID,
            x: from_x,
            y: from_y,
        },
        StationRecord {
            id: DESTINATION_STATION_ID,
            x: to_x,
            y: to_y,
        },
    ];
    insert_query_points(&mut graph, &index, &endpoints, k)?;

    let route = shortest_path(&graph, ORIGIN_STATION_ID, DESTINATION_STATION_ID, method)?;

    let lookup: HashMap<StationId, &ImportedStation> =
        stations.iter().map(|s| (s.id, s)).collect();

    println!(
        "Route with {} stops, {:.0} m total:",
        route.stations.len(),
        route.total_distance
    );
    for &id in &route.stations {
        match id {
            ORIGIN_STATION_ID => println!("  origin ({}, {})", from.0, from.1),
            DESTINATION_STATION_ID => println!("  destination ({}, {})", to.0, to.1),
            id => {
                let name = lookup
                    .get(&id)
                    .and_then(|s| s.name.as_deref())
                    .unwrap_or("unnamed");
                println!("  station {} {}", id, name);
            }
        }
    }

    if let Some(output) = output {
        let position = |id: StationId| -> Option<(f64, f64)> {
            match id {
                ORIGIN_STATION_ID => Some((from.1, from.0)),
                DESTINATION_STATION_ID => Some((to.1, to.0)),
                id => lookup.get(&id).map(|s| (s.lon, s.lat)),
            }
        };

        let mut features = vec![
            endpoint_feature("origin", (from.1, from.0)),
            endpoint_feature("destination", (to.1, to.0)),
        ];

        for (leg, (&a, &b)) in route.stations.iter().tuple_windows().enumerate() {
            let (Some(start), Some(end)) = (position(a), position(b)) else {
                continue;
            };
            let line = geo_types::LineString::from(vec![start, end]);

            let mut properties = JsonObject::new();
            properties.insert("type".to_string(), "route_leg".into());
            properties.insert("leg".to_string(), leg.into());
            properties.insert("from".to_string(), a.into());
            properties.insert("to".to_string(), b.into());
            if let Some(weight) = graph.edge_weight(a, b) {
                properties.insert("leg_meters".to_string(), weight.into());
            }

            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::from(&line)),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            });
        }

        write_feature_collection(features, output)?;
        println!("Wrote route to {:?}", output);
    }

    Ok(())
}

fn endpoint_feature(kind: &str, position: (f64, f64)) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("type".to_string(), kind.into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![position.0, position.1]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn station_positions(stations: &[ImportedStation]) -> HashMap<StationId, (f64, f64)> {
    stations.iter().map(|s| (s.id, (s.lon, s.lat))).collect()
}

fn write_feature_collection(features: Vec<Feature>, output: &Path) -> Result<()> {
    let geojson = geojson::GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });

    let file =
        File::create(output).with_context(|| format!("could not create output file {output:?}"))?;
    serde_json::to_writer(file, &geojson)?;

    Ok(())
}
