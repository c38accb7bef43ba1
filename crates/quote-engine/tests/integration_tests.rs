//! End-to-end integration tests for quote-engine.
//!
//! These tests exercise the full flow from STL bytes -> normalize -> scale ->
//! price -> summary through the public session API.

use quote_engine::{
    Axis, Catalog, ConfigField, DisplayDimensions, LoadOutcome, Mesh, QuoteError, QuoteSession,
    ScaleState, Vertex, load_mesh, prepare_model, write_stl,
};
use tempfile::NamedTempFile;

/// Create an axis-aligned box with one corner at `origin`.
fn create_box(origin: [f64; 3], w: f64, d: f64, h: f64) -> Mesh {
    let [ox, oy, oz] = origin;
    let mut mesh = Mesh::new();

    mesh.vertices.push(Vertex::from_coords(ox, oy, oz)); // 0
    mesh.vertices.push(Vertex::from_coords(ox + w, oy, oz)); // 1
    mesh.vertices.push(Vertex::from_coords(ox + w, oy + d, oz)); // 2
    mesh.vertices.push(Vertex::from_coords(ox, oy + d, oz)); // 3
    mesh.vertices.push(Vertex::from_coords(ox, oy, oz + h)); // 4
    mesh.vertices.push(Vertex::from_coords(ox + w, oy, oz + h)); // 5
    mesh.vertices.push(Vertex::from_coords(ox + w, oy + d, oz + h)); // 6
    mesh.vertices.push(Vertex::from_coords(ox, oy + d, oz + h)); // 7

    // Bottom
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);
    // Top
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);
    // Front
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);
    // Back
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);
    // Left
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);
    // Right
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}

fn stl_bytes(mesh: &Mesh) -> Vec<u8> {
    let mut bytes = Vec::new();
    write_stl(mesh, &mut bytes).unwrap();
    bytes
}

fn loaded_session(w: f64, d: f64, h: f64) -> QuoteSession {
    let mut session = QuoteSession::new(Catalog::default());
    session
        .load("part.stl", &stl_bytes(&create_box([5.0, -3.0, 12.0], w, d, h)))
        .expect("box should load");
    session
}

#[test]
fn test_load_measures_base_size() {
    let session = loaded_session(40.0, 20.0, 10.0);

    let base = session.base_size().unwrap();
    assert_eq!((base.x(), base.y(), base.z()), (40.0, 20.0, 10.0));
    assert_eq!(
        session.display_dimensions(),
        Some(DisplayDimensions::new(40.0, 20.0, 10.0))
    );
    assert_eq!(session.scale_state(), Some(ScaleState::IDENTITY));
}

#[test]
fn test_loaded_mesh_is_centered() {
    let session = loaded_session(40.0, 20.0, 10.0);
    let (min, max) = session.centered_mesh().unwrap().bounds().unwrap();

    let center = nalgebra::center(&min, &max);
    for c in center.iter() {
        assert!(c.abs() < 1e-6, "center component {} not at origin", c);
    }
}

#[test]
fn test_edit_one_axis_scales_all() {
    let mut session = loaded_session(40.0, 20.0, 10.0);
    session.set_dimension(Axis::X, 80.0).unwrap();

    assert_eq!(
        session.display_dimensions(),
        Some(DisplayDimensions::new(80.0, 40.0, 20.0))
    );
    assert_eq!(
        session.scale_vector(),
        Some(nalgebra::Vector3::new(2.0, 2.0, 2.0))
    );
}

#[test]
fn test_small_part_priced_at_floor() {
    let mut session = loaded_session(40.0, 20.0, 10.0);
    session.select_material("resin").unwrap();

    let quote = session.quote().unwrap();
    assert_eq!(quote.volume_cm3, 8.0);
    assert_eq!(quote.raw_price.amount(), 480.0);
    assert_eq!(quote.item_price.amount(), 5000.0);
    assert_eq!(quote.total.amount(), 9990.0);
    assert_eq!(session.grand_total().amount(), 9990.0);
}

#[test]
fn test_large_part_priced_by_volume() {
    let mut session = loaded_session(50.0, 50.0, 50.0);
    session.select_material("resin").unwrap();
    session.set_dimension(Axis::Z, 100.0).unwrap();

    assert_eq!(
        session.display_dimensions(),
        Some(DisplayDimensions::new(100.0, 100.0, 100.0))
    );
    let quote = session.quote().unwrap();
    assert_eq!(quote.volume_cm3, 1000.0);
    assert_eq!(quote.item_price.amount(), 60000.0);
    assert!(!quote.floor_applied);
    assert_eq!(quote.total.amount(), 64990.0);
}

#[test]
fn test_summary_requires_color() {
    let mut session = loaded_session(40.0, 20.0, 10.0);
    session.select_material("resin").unwrap();

    match session.confirm().unwrap_err() {
        QuoteError::IncompleteConfiguration { missing } => {
            assert_eq!(missing, vec![ConfigField::Color]);
        }
        other => panic!("Expected IncompleteConfiguration, got {:?}", other),
    }
}

#[test]
fn test_second_load_resets_everything() {
    let mut session = loaded_session(40.0, 20.0, 10.0);
    session.set_dimension(Axis::X, 80.0).unwrap();
    session.select_material("pla").unwrap();
    session.select_color("Rojo Fuego").unwrap();

    session
        .load(
            "other.stl",
            &stl_bytes(&create_box([0.0, 0.0, 0.0], 10.0, 30.0, 5.0)),
        )
        .unwrap();

    let base = session.base_size().unwrap();
    assert_eq!((base.x(), base.y(), base.z()), (10.0, 30.0, 5.0));
    assert_eq!(session.scale_state(), Some(ScaleState::IDENTITY));
    assert!(session.material().is_none());
    assert!(session.color().is_none());
    assert!(session.quote().is_none());
    assert_eq!(session.file_name(), Some("other.stl"));
}

#[test]
fn test_full_flow_to_json_summary() {
    let mut session = loaded_session(40.0, 20.0, 10.0);
    session.set_dimension_input(Axis::Y, "50").unwrap();
    session.select_material("pla").unwrap();
    session.select_color("Azul Eléctrico").unwrap();

    // 100 x 50 x 25 mm = 125 cm³ at 25 per cm³
    let summary = session.confirm_at(1_700_000_000).unwrap();
    assert_eq!(summary.material_name, "Plástico (PLA)");
    assert_eq!(summary.dimensions.x, 100.0);
    assert_eq!(summary.item_price.amount(), 5000.0);
    assert_eq!(summary.total.amount(), 9990.0);

    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(json["file_name"], "part.stl");
    assert_eq!(json["color"], "Azul Eléctrico");
    assert_eq!(json["dimensions"]["unit"], "mm");
    assert_eq!(json["currency"], "CLP");
    assert_eq!(json["generated_at"], 1_700_000_000u64);
}

#[test]
fn test_rejected_edit_keeps_dimensions() {
    let mut session = loaded_session(40.0, 20.0, 10.0);
    session.set_dimension(Axis::X, 60.0).unwrap();
    let before = session.display_dimensions();

    assert!(session.set_dimension_input(Axis::X, "abc").is_err());
    assert!(session.set_dimension(Axis::Z, -1.0).is_err());
    assert!(session.set_uniform_scale(f64::NAN).is_err());
    assert_eq!(session.display_dimensions(), before);
}

#[test]
fn test_huge_size_never_quotes_at_floor() {
    let mut session = loaded_session(40.0, 20.0, 10.0);
    session.select_material("resin").unwrap();
    session.set_dimension(Axis::X, 1e100).unwrap();
    let before = session.quote().unwrap();
    assert!(!before.floor_applied);

    let err = session.set_dimension_input(Axis::X, "1e120").unwrap_err();
    assert!(matches!(err, QuoteError::InvalidScaleInput { .. }));
    assert!(session.set_uniform_scale(1e300).is_err());
    assert_eq!(session.quote(), Some(before));
}

#[test]
fn test_flat_model_is_rejected() {
    let mut flat = Mesh::new();
    flat.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    flat.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
    flat.vertices.push(Vertex::from_coords(0.0, 10.0, 0.0));
    flat.faces.push([0, 1, 2]);

    let mut session = QuoteSession::default();
    let err = session.load("flat.stl", &stl_bytes(&flat)).unwrap_err();
    assert!(matches!(
        err,
        QuoteError::DegenerateMesh { axis: Axis::Z, .. }
    ));
    assert!(err.requires_new_file());
    assert!(session.base_size().is_none());
}

#[test]
fn test_concurrent_loads_last_wins() {
    let mut session = QuoteSession::default();
    let slow = session.begin_load();
    let fast = session.begin_load();

    let slow_bytes = stl_bytes(&create_box([0.0; 3], 40.0, 20.0, 10.0));
    let fast_bytes = stl_bytes(&create_box([0.0; 3], 5.0, 5.0, 5.0));

    let slow_job = std::thread::spawn(move || prepare_model("slow.stl", &slow_bytes));
    let fast_job = std::thread::spawn(move || prepare_model("fast.stl", &fast_bytes));

    let fast_result = fast_job.join().unwrap();
    assert_eq!(
        session.complete_load(fast, fast_result).unwrap(),
        LoadOutcome::Installed
    );
    let slow_result = slow_job.join().unwrap();
    assert_eq!(
        session.complete_load(slow, slow_result).unwrap(),
        LoadOutcome::Superseded
    );

    assert_eq!(session.file_name(), Some("fast.stl"));
    assert_eq!(
        session.display_dimensions(),
        Some(DisplayDimensions::new(5.0, 5.0, 5.0))
    );
}

#[test]
fn test_file_roundtrip_through_disk() {
    let file = NamedTempFile::with_suffix(".stl").unwrap();
    create_box([1.0, 2.0, 3.0], 12.5, 7.25, 3.0)
        .save(file.path())
        .unwrap();

    let mesh = load_mesh(file.path()).unwrap();
    let dims = mesh.dimensions();
    assert!((dims.width - 12.5).abs() < 1e-6);
    assert!((dims.depth - 7.25).abs() < 1e-6);
    assert!((dims.height - 3.0).abs() < 1e-6);
}

#[test]
fn test_custom_catalog_drives_prices() {
    let catalog = Catalog::from_json_str(
        r#"{
            "pricing": { "min_price": 0, "shipping_cost": 10, "currency": "EUR" },
            "materials": [
                { "id": "nylon", "name": "Nylon", "rate": 2, "colors": ["Black"] }
            ]
        }"#,
    )
    .unwrap();

    let mut session = QuoteSession::new(catalog);
    session
        .load("cube.stl", &stl_bytes(&create_box([0.0; 3], 10.0, 10.0, 10.0)))
        .unwrap();
    session.select_material("nylon").unwrap();
    session.select_color("Black").unwrap();

    let summary = session.confirm_at(0).unwrap();
    assert_eq!(summary.item_price.amount(), 2.0);
    assert_eq!(summary.total.amount(), 12.0);
    assert_eq!(summary.currency, "EUR");
}
