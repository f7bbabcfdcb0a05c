//! End-to-end coverage of `Engine::from_edgelist_file`.

use dynamic_sssp::EngineError;
use std::io::Write;

#[test]
fn loads_a_file_and_computes_shortest_paths() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# roadNet-CA-like sample").unwrap();
    writeln!(file, "0 1 1").unwrap();
    writeln!(file, "1 2 1").unwrap();
    writeln!(file, "2 3 1").unwrap();

    let mut engine = dynamic_sssp::Engine::from_edgelist_file(file.path(), false).unwrap();
    engine.initialise(0);
    assert_eq!(engine.dist(), &[0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn missing_file_is_input_not_found() {
    let result = dynamic_sssp::Engine::from_edgelist_file("/no/such/dataset.edgelist", false);
    assert!(matches!(result, Err(EngineError::InputNotFound { .. })));
}

#[test]
fn malformed_line_after_a_valid_header_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "0 1").unwrap();
    writeln!(file, "this is not an edge").unwrap();

    let result = dynamic_sssp::Engine::from_edgelist_file(file.path(), false);
    assert!(matches!(result, Err(EngineError::MalformedLine { .. })));
}
