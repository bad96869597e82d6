//! Integration tests for network persistence: signed archives and storage
//! backends.

use cprn::archive::{dump_signed, load_signed, signature_from_path};
use cprn::{
    search, CprnError, Facility, MemoryBackend, PropertyMap, RoadNetwork, SearchOptions,
    StorageBackend, Vertex,
};
use cprn::storage::BatchOperation;
use std::fs;
use tempfile::TempDir;

fn sample_network() -> RoadNetwork {
    let mut net = RoadNetwork::new();
    net.add_vertex(Vertex::new("wtw3sjq6q8ke")).unwrap();
    net.add_vertex(Vertex::new("wtw3sjq6qbzz").with_property("elevation", 12.5))
        .unwrap();
    net.add_vertex(
        Vertex::new("wtw3sjq6r0aa")
            .with_facility(Facility::new("G001", "fuel", "Station A").with_attribute("brand", "Sinopec"))
            .with_facility(Facility::new("S001", "service", "Service Area A")),
    )
    .unwrap();
    net.add_edge(
        "wtw3sjq6q8ke",
        "wtw3sjq6qbzz",
        PropertyMap::new().with("weight", 1.2).with("edge_code", "L1"),
    )
    .unwrap();
    net.add_edge(
        "wtw3sjq6qbzz",
        "wtw3sjq6r0aa",
        PropertyMap::new().with("weight", 0.8).with("edge_code", "L2"),
    )
    .unwrap();
    net
}

#[test]
fn test_archive_round_trip_preserves_search_results() {
    let dir = TempDir::new().unwrap();
    let net = sample_network();
    let signed = dump_signed(&net, dir.path().join("network.json")).unwrap();

    let file_name = signed.file_name().unwrap().to_str().unwrap();
    let parts: Vec<&str> = file_name.trim_end_matches(".json").split('_').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "network");
    assert_eq!(parts[1].len(), 6);
    assert_eq!(parts[2].len(), 64);
    assert_eq!(signature_from_path(&signed).as_deref(), Some(parts[2]));

    let loaded = load_signed(&signed).unwrap();
    let options = SearchOptions::default();
    assert_eq!(
        search(&loaded, "wtw3sjq6q8ke", ["fuel", "service"], options.clone()).unwrap(),
        search(&net, "wtw3sjq6q8ke", ["fuel", "service"], options).unwrap()
    );
}

#[test]
fn test_archive_rejects_modified_content() {
    let dir = TempDir::new().unwrap();
    let signed = dump_signed(&sample_network(), dir.path().join("network.json")).unwrap();

    let content = fs::read_to_string(&signed).unwrap();
    fs::write(&signed, content.replace("Station A", "Station B")).unwrap();

    match load_signed(&signed) {
        Err(CprnError::SignatureMismatch { expected, actual }) => assert_ne!(expected, actual),
        other => panic!("expected signature mismatch, got {other:?}"),
    }
}

#[test]
fn test_archive_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_signed(dir.path().join("network_240101_deadbeef.json")).unwrap_err();
    assert!(matches!(err, CprnError::Storage { .. }));
}

#[test]
fn test_memory_backend_round_trip() {
    let net = sample_network();
    let mut backend = MemoryBackend::new();
    net.save_to(&mut backend).unwrap();

    assert!(backend.get(b"vertex:000000000000").unwrap().is_some());
    assert_eq!(backend.scan_prefix(b"edge:").unwrap().len(), 2);

    let loaded = RoadNetwork::load_from(&backend).unwrap();
    assert_eq!(loaded.vertex_count(), 3);
    assert_eq!(loaded.edge_count(), 2);
    let ids: Vec<&str> = loaded.vertices().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["wtw3sjq6q8ke", "wtw3sjq6qbzz", "wtw3sjq6r0aa"]);
    assert_eq!(
        loaded.query_facility("G001").unwrap().facility.attributes.get_string("brand"),
        Some("Sinopec")
    );
}

#[test]
fn test_save_replaces_previous_network() {
    let mut backend = MemoryBackend::new();
    sample_network().save_to(&mut backend).unwrap();

    let mut small = RoadNetwork::new();
    small.add_vertex(Vertex::new("only")).unwrap();
    small.save_to(&mut backend).unwrap();

    let loaded = RoadNetwork::load_from(&backend).unwrap();
    assert_eq!(loaded.vertex_count(), 1);
    assert_eq!(loaded.edge_count(), 0);
}

#[test]
fn test_load_from_empty_backend() {
    let backend = MemoryBackend::new();
    let loaded = RoadNetwork::load_from(&backend).unwrap();
    assert_eq!(loaded.vertex_count(), 0);
}

#[test]
fn test_load_rejects_corrupt_value() {
    let mut backend = MemoryBackend::new();
    backend
        .write_batch(vec![BatchOperation::put("vertex:000000000000", "not json")])
        .unwrap();
    let err = RoadNetwork::load_from(&backend).unwrap_err();
    assert!(matches!(err, CprnError::Serialization { .. }));
}

#[cfg(feature = "rocksdb-backend")]
#[test]
fn test_rocksdb_backend_round_trip() {
    use cprn::RocksDBBackend;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roads.db");
    {
        let mut backend = RocksDBBackend::open(&path).unwrap();
        sample_network().save_to(&mut backend).unwrap();
    }
    let backend = RocksDBBackend::open(&path).unwrap();
    let loaded = RoadNetwork::load_from(&backend).unwrap();
    assert_eq!(loaded.vertex_count(), 3);
    assert!(loaded.query_facility("S001").is_some());
}
