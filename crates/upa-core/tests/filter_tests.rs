mod common;

use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use common::{day, FakeService};
use upa_core::filter::{compile_pattern, parse_datetime_bound};
use upa_core::{
    build_candidate_list, Error, FilterSpec, LocalMediaService, MediaFileService, ServiceError,
};

fn photo_service() -> FakeService {
    FakeService::new(&["jpg", "png"])
        .with_dir("/in")
        .with_file("/in/a.jpg", "a", day(2023, 12, 31))
        .with_file("/in/b.txt", "b", day(2024, 2, 1))
        .with_file("/in/c.png", "c", day(2024, 2, 1))
        .with_file("/in/d.JPG", "d", day(2024, 2, 1))
        .with_file("/in/sub/e.jpg", "e", day(2024, 3, 1))
}

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

#[test]
fn test_empty_source_list_yields_empty_candidates() {
    let service = photo_service();
    let spec = FilterSpec::new(vec![]);
    let files = build_candidate_list(&service, &spec).unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_unsupported_extensions_are_dropped() {
    let service = photo_service();
    let spec = FilterSpec::new(paths(&["/in"]));
    let files = build_candidate_list(&service, &spec).unwrap();
    // b.txt is unsupported, d.JPG does not match the lowercase token
    assert_eq!(files, paths(&["/in/a.jpg", "/in/c.png"]));
}

#[test]
fn test_recursive_listing_descends() {
    let service = photo_service();
    let mut spec = FilterSpec::new(paths(&["/in"]));
    spec.recursive = true;
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, paths(&["/in/a.jpg", "/in/c.png", "/in/sub/e.jpg"]));
}

#[test]
fn test_pattern_filters_by_name() {
    let service = photo_service();
    let mut spec = FilterSpec::new(paths(&["/in"]));
    spec.pattern = compile_pattern(r"^c\.").unwrap();
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, paths(&["/in/c.png"]));

    spec.pattern = compile_pattern("^zzz").unwrap();
    assert!(build_candidate_list(&service, &spec).unwrap().is_empty());
}

#[test]
fn test_sources_concatenate_in_order_without_dedup() {
    let service = photo_service();
    let spec = FilterSpec::new(paths(&["/in/sub", "/in", "/in/sub"]));
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(
        files,
        paths(&["/in/sub/e.jpg", "/in/a.jpg", "/in/c.png", "/in/sub/e.jpg"])
    );
}

#[test]
fn test_missing_source_directory_is_fatal() {
    let service = photo_service();
    let spec = FilterSpec::new(paths(&["/in", "/missing"]));
    let err = build_candidate_list(&service, &spec).unwrap_err();
    assert!(matches!(err, Error::SourceDirectoryNotFound(ref p) if p == &PathBuf::from("/missing")));
    assert_eq!(err.exit_code(), 6);
}

#[test]
fn test_after_bound_is_exclusive() {
    let service = photo_service();
    let mut spec = FilterSpec::new(paths(&["/in"]));
    spec.after = parse_datetime_bound("2024-01-01", "%Y-%m-%d");
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, paths(&["/in/c.png"]));

    // a bound equal to the creation time excludes the file
    spec.after = Some(day(2024, 2, 1));
    assert!(build_candidate_list(&service, &spec).unwrap().is_empty());
}

#[test]
fn test_before_bound_is_exclusive() {
    let service = photo_service();
    let mut spec = FilterSpec::new(paths(&["/in"]));
    spec.recursive = true;
    spec.before = Some(day(2024, 3, 1));
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, paths(&["/in/a.jpg", "/in/c.png"]));
}

#[test]
fn test_both_bounds_form_a_window() {
    let service = photo_service();
    let mut spec = FilterSpec::new(paths(&["/in"]));
    spec.recursive = true;
    spec.after = Some(day(2024, 1, 1));
    spec.before = Some(day(2024, 2, 15));
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, paths(&["/in/c.png"]));
}

#[test]
fn test_local_listing_scenario() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("a.jpg"), "jpeg bytes").unwrap();
    fs::write(src.join("b.txt"), "text").unwrap();
    fs::write(src.join("README"), "no extension").unwrap();
    fs::write(src.join("nested").join("c.png"), "png bytes").unwrap();

    let service = LocalMediaService::new(vec!["jpg".to_string(), "png".to_string()]);
    let spec = FilterSpec::new(vec![src.clone()]);
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, vec![src.join("a.jpg")]);

    let mut spec = FilterSpec::new(vec![src.clone()]);
    spec.recursive = true;
    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, vec![src.join("a.jpg"), src.join("nested").join("c.png")]);

    assert_eq!(
        service.extension_of(&src.join("README")),
        Err(ServiceError::UnsupportedFormat(src.join("README")))
    );
}

#[test]
fn test_local_listing_missing_directory() {
    let tmp = tempdir().unwrap();
    let service = LocalMediaService::new(vec!["jpg".to_string()]);
    let spec = FilterSpec::new(vec![tmp.path().join("nope")]);
    assert!(matches!(
        build_candidate_list(&service, &spec),
        Err(Error::SourceDirectoryNotFound(_))
    ));
}

#[test]
fn test_unreadable_creation_time_fails_the_whole_listing() {
    let service = photo_service();
    service
        .broken_times
        .borrow_mut()
        .insert(PathBuf::from("/in/c.png"));
    let mut spec = FilterSpec::new(paths(&["/in"]));

    let files = build_candidate_list(&service, &spec).unwrap();
    assert_eq!(files, paths(&["/in/a.jpg", "/in/c.png"]));

    spec.after = Some(day(2023, 1, 1));
    let result = build_candidate_list(&service, &spec);
    match result {
        Err(err @ Error::Service(_)) => assert_eq!(err.exit_code(), 1),
        other => panic!("expected a service error, got {:?}", other),
    }
}
