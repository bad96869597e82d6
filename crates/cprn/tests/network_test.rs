//! Integration tests for network construction, facility queries and
//! geohash-named vertices.

use cprn::geohash;
use cprn::{search, CprnError, Direction, Facility, PropertyMap, RoadGraph, RoadNetwork, SearchOptions, Vertex};

/// Vertices named by 12-character geohashes along a short road.
fn geohash_road() -> (RoadNetwork, Vec<String>) {
    let points = [(120.1201, 31.1201), (120.1235, 31.1222), (120.1280, 31.1250), (121.5000, 31.2300)];
    let ids: Vec<String> = points
        .iter()
        .map(|&(lon, lat)| geohash::encode(lon, lat, 12).unwrap())
        .collect();

    let mut net = RoadNetwork::new();
    net.add_vertex(Vertex::new(ids[0].as_str())).unwrap();
    net.add_vertex(Vertex::new(ids[1].as_str()).with_facility(Facility::new("S01", "service", "Wuxi North")))
        .unwrap();
    net.add_vertex(Vertex::new(ids[2].as_str()).with_facility(Facility::new("T01", "toll", "Wuxi Toll")))
        .unwrap();
    net.add_vertex(Vertex::new(ids[3].as_str()).with_facility(Facility::new("S02", "service", "Shanghai West")))
        .unwrap();
    for (i, pair) in ids.windows(2).enumerate() {
        net.add_edge(&pair[0], &pair[1], PropertyMap::new().with("edge_code", format!("L{i}")))
            .unwrap();
    }
    (net, ids)
}

#[test]
fn test_facility_query_by_geohash_prefix() {
    let (net, ids) = geohash_road();
    let prefix = &ids[1][..5];

    let nearby = net.facilities().within_geohash(prefix).execute();
    let codes: Vec<&str> = nearby.iter().map(|r| r.facility.code.as_str()).collect();
    assert_eq!(codes, ["S01", "T01"]);

    let services = net.facilities().fac_type("service").count();
    assert_eq!(services, 2);
    assert!(net.facilities().name_contains("shanghai").exists());
    assert_eq!(net.facilities().limit(1).execute().len(), 1);
}

#[test]
fn test_list_and_lookup_facilities() {
    let (net, ids) = geohash_road();
    let all = net.list_facilities();
    assert_eq!(all.len(), 3);

    let toll = net.query_facility("T01").unwrap();
    assert_eq!(toll.vertex_id, ids[2]);
    assert!(net.query_facility("missing").is_none());

    let (lon, lat) = geohash::decode(toll.vertex_id).unwrap();
    assert!((lon - 120.1280).abs() < 1e-5);
    assert!((lat - 31.1250).abs() < 1e-5);
}

#[test]
fn test_coordinate_snaps_to_start_vertex() {
    let (net, ids) = geohash_road();
    let here = geohash::encode(120.1236, 31.1222, 12).unwrap();

    let (start, meters) = geohash::nearest_within(&here, ids.as_slice(), 1, 6).unwrap().unwrap();
    assert_eq!(start, ids[1]);
    assert!(meters < 50.0, "{meters}");

    let records = search(&net, start, ["service"], SearchOptions::default()).unwrap();
    let codes: Vec<&str> = records.iter().filter_map(|r| r.facility_code()).collect();
    assert_eq!(codes, ["S01", "S02"]);

    let offshore = geohash::encode(122.5, 30.0, 12).unwrap();
    assert!(geohash::nearest_within(&offshore, ids.as_slice(), 1, 6).unwrap().is_none());
}

#[test]
fn test_edges_by_codes() {
    let (net, _) = geohash_road();
    let edges = net.edges_by_codes(&["L2", "nope", "L0"], "edge_code");
    let codes: Vec<String> = edges.iter().filter_map(|e| e.edge_code("edge_code")).collect();
    assert_eq!(codes, ["L2", "L0"]);

    let groups = net.edges_by_code_groups(&[vec!["L0", "L1"], vec![]], "edge_code");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 2);
    assert!(groups[1].is_empty());

    let empty: [&str; 0] = [];
    assert!(net.edges_by_codes(&empty, "edge_code").is_empty());
}

#[test]
fn test_graph_contract() {
    let (net, ids) = geohash_road();
    assert_eq!(net.neighbors(&ids[1], Direction::Downstream).unwrap(), [ids[2].clone()]);
    assert_eq!(net.neighbors(&ids[1], Direction::Upstream).unwrap(), [ids[0].clone()]);

    let edge = net.connecting_edge(&ids[2], &ids[1], Direction::Upstream).unwrap();
    assert_eq!(edge.source_id, ids[1]);
    assert_eq!(edge.weight(), 1.0);

    assert!(matches!(net.edge(&ids[2], &ids[1]), Err(CprnError::EdgeNotFound { .. })));
    assert!(matches!(net.vertex("zzzz"), Err(CprnError::VertexNotFound { .. })));
}

#[test]
fn test_construction_errors() {
    let (mut net, ids) = geohash_road();
    assert!(matches!(
        net.add_vertex(Vertex::new(ids[0].as_str())),
        Err(CprnError::InvalidOperation { .. })
    ));
    assert!(matches!(
        net.add_edge(&ids[0], &ids[1], PropertyMap::new()),
        Err(CprnError::InvalidOperation { .. })
    ));
    assert!(matches!(
        net.add_edge(&ids[0], "missing", PropertyMap::new()),
        Err(CprnError::VertexNotFound { .. })
    ));
}

#[test]
fn test_legacy_facility_rows() {
    let row = PropertyMap::new()
        .with("fac_code", "S09")
        .with("fac_type", "service")
        .with("fac_name", "Legacy")
        .with("dist_to_rep", 35.2);
    let facility = Facility::from_properties(row).unwrap();
    assert_eq!(facility.code, "S09");
    assert_eq!(facility.attributes.get_float("dist_to_rep"), Some(35.2));
    assert_eq!(facility.to_properties().get_string("fac_name"), Some("Legacy"));

    assert!(Facility::from_properties(PropertyMap::new().with("fac_type", "service")).is_err());
}
