// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use vec1::vec1;

use super::*;
use crate::{
    loaders::LoadError,
    model_file::{source_file_path, ModelFile, ValidityReader},
};

/// Set the modification time of a file `offset_secs` into the future.
fn touch(path: &Path, offset_secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(offset_secs))
        .unwrap();
}

/// A factory whose "model" is the number of times the loader has been called.
fn counting_factory(path: &Path, counter: Arc<AtomicUsize>) -> ModelFactory<usize> {
    ModelFactory::new(
        move |_files: &[PathBuf]| Ok(counter.fetch_add(1, Ordering::SeqCst) + 1),
        vec1![ModelFile::literal(path, "TEST-SOURCE", ValidityReader::Unbounded)],
    )
}

struct Fixture {
    _tmp_dir: TempDir,
    path: PathBuf,
    counter: Arc<AtomicUsize>,
    cache: ModelCache<usize>,
}

fn make_fixture() -> Fixture {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("f.dat");
    File::create(&path).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let cache = ModelCache::new(
        [(
            "TEST".to_string(),
            counting_factory(&path, Arc::clone(&counter)),
        )],
        IndexMap::from([("TEST-ALIAS".to_string(), "TEST".to_string())]),
    );
    Fixture {
        _tmp_dir: tmp_dir,
        path,
        counter,
        cache,
    }
}

#[test]
fn test_counter_scenario() {
    let f = make_fixture();
    assert_eq!(*f.cache.get_model("TEST").unwrap().unwrap(), 1);
    touch(&f.path, 10);
    assert_eq!(*f.cache.get_model("TEST").unwrap().unwrap(), 2);
    assert_eq!(*f.cache.get_model("TEST").unwrap().unwrap(), 2);
    assert_eq!(f.counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unknown_model() {
    let f = make_fixture();
    assert!(f.cache.get_model_with_sources("NOPE").unwrap().is_none());
    assert!(f.cache.get_model("NOPE").unwrap().is_none());
    assert!(!f.cache.contains("NOPE"));
    // Identifiers are case sensitive.
    assert!(f.cache.get_model("test").unwrap().is_none());
    assert_eq!(f.counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unchanged_files_give_identical_instance() {
    let f = make_fixture();
    let (model1, sources1) = f.cache.get_model_with_sources("TEST").unwrap().unwrap();
    let (model2, sources2) = f.cache.get_model_with_sources("TEST").unwrap().unwrap();
    assert!(Arc::ptr_eq(&model1, &model2));
    assert!(Arc::ptr_eq(&sources1, &sources2));
    assert_eq!(sources1[0].names, vec!["TEST-SOURCE"]);
}

#[test]
fn test_changed_files_give_new_instance() {
    let f = make_fixture();
    let model1 = f.cache.get_model("TEST").unwrap().unwrap();
    touch(&f.path, 10);
    let model2 = f.cache.get_model("TEST").unwrap().unwrap();
    assert!(!Arc::ptr_eq(&model1, &model2));
    assert_eq!(f.counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_alias_resolution() {
    let f = make_fixture();
    assert_eq!(f.cache.resolve_alias("TEST-ALIAS"), "TEST");
    assert_eq!(f.cache.resolve_alias("TEST"), "TEST");
    assert!(f.cache.contains("TEST-ALIAS"));

    let via_alias = f.cache.get_model("TEST-ALIAS").unwrap().unwrap();
    let via_canonical = f
        .cache
        .get_model(f.cache.resolve_alias("TEST-ALIAS"))
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&via_alias, &via_canonical));
    assert_eq!(f.counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_alias_is_single_hop() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("f.dat");
    File::create(&path).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let cache = ModelCache::new(
        [("TEST".to_string(), counting_factory(&path, counter))],
        IndexMap::from([
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "TEST".to_string()),
        ]),
    );
    assert_eq!(cache.resolve_alias("A"), "B");
    assert!(cache.get_model("A").unwrap().is_none());
    assert!(cache.get_model("B").unwrap().is_some());
}

#[test]
fn test_model_ids() {
    let f = make_fixture();
    let ids: Vec<&str> = f.cache.model_ids().collect();
    assert_eq!(ids, vec!["TEST", "TEST-ALIAS"]);
}

#[test]
fn test_flush() {
    let f = make_fixture();
    let model1 = f.cache.get_model("TEST").unwrap().unwrap();
    f.cache.flush();
    let model2 = f.cache.get_model("TEST").unwrap().unwrap();
    assert!(!Arc::ptr_eq(&model1, &model2));
    assert_eq!(*model2, 2);
}

#[test]
fn test_failed_load_is_retried() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("f.dat");
    File::create(&path).unwrap();
    let fail = Arc::new(AtomicBool::new(false));
    let counter = Arc::new(AtomicUsize::new(0));
    let factory = {
        let fail = Arc::clone(&fail);
        let counter = Arc::clone(&counter);
        ModelFactory::new(
            move |_files: &[PathBuf]| {
                if fail.load(Ordering::SeqCst) {
                    Err(LoadError::Other("corrupt model file".to_string()))
                } else {
                    Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
                }
            },
            vec1![ModelFile::literal(&path, "S", ValidityReader::Unbounded)],
        )
    };
    let cache = ModelCache::new(
        [("TEST".to_string(), factory)],
        IndexMap::from([("OLD".to_string(), "TEST".to_string())]),
    );

    let model1 = cache.get_model("TEST").unwrap().unwrap();
    assert_eq!(*model1, 1);

    fail.store(true, Ordering::SeqCst);
    touch(&path, 10);
    let result = cache.get_model("OLD");
    match result {
        Err(ModelLoadError::Load { model_id, source }) => {
            assert_eq!(model_id, "OLD");
            assert!(matches!(source, LoadError::Other(_)));
        }
        Err(e) => panic!("Unexpected error kind! {e:?}"),
        Ok(_) => panic!("Expected an error"),
    }

    // The previous model is not served for the changed files; the load is
    // retried (and fails again) without any further change.
    assert!(matches!(
        cache.get_model("TEST"),
        Err(ModelLoadError::Load { .. })
    ));
    assert!(matches!(
        cache.get_model("TEST"),
        Err(ModelLoadError::Load { .. })
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    // Once the files are fixed, the model is reloaded even though they didn't
    // change again.
    fail.store(false, Ordering::SeqCst);
    let model2 = cache.get_model("TEST").unwrap().unwrap();
    assert!(!Arc::ptr_eq(&model1, &model2));
    assert_eq!(*model2, 2);
    assert!(Arc::ptr_eq(
        &model2,
        &cache.get_model("TEST").unwrap().unwrap()
    ));
}

#[test]
fn test_failed_shc_reload_is_not_served_stale() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("f.shc");
    fs::write(&path, "1 1 1 1 0\n2015.0\n1 0 1.0\n").unwrap();
    let cache = ModelCache::new(
        [(
            "SHC".to_string(),
            ModelFactory::new(
                |files: &[PathBuf]| crate::loaders::load_shc_model(files, false),
                vec1![ModelFile::literal(&path, "S", ValidityReader::Unbounded)],
            ),
        )],
        IndexMap::new(),
    );
    assert!(cache.get_model("SHC").unwrap().is_some());

    fs::write(&path, "garbage").unwrap();
    touch(&path, 10);
    for _ in 0..2 {
        match cache.get_model("SHC") {
            Err(ModelLoadError::Load {
                source: LoadError::Shc(_),
                ..
            }) => (),
            Err(e) => panic!("Unexpected error kind! {e:?}"),
            Ok(_) => panic!("Expected an error"),
        }
    }
}

#[test]
fn test_failed_sources_are_retried() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("MCO_SHA_2C.shc");
    File::create(&path).unwrap();
    fs::write(source_file_path(&path), "SOURCE").unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let cached_products = IndexMap::from([("MCO_SHA_2C".to_string(), path.clone())]);
    let factory = {
        let counter = Arc::clone(&counter);
        ModelFactory::new(
            move |_files: &[PathBuf]| Ok(counter.fetch_add(1, Ordering::SeqCst) + 1),
            vec1![ModelFile::cached_with_source_file(
                "MCO_SHA_2C",
                &cached_products,
                ValidityReader::Unbounded
            )
            .unwrap()],
        )
    };
    let cache = ModelCache::new([("MCO".to_string(), factory)], IndexMap::new());

    let (model1, sources1) = cache.get_model_with_sources("MCO").unwrap().unwrap();
    assert_eq!(sources1[0].names, vec!["SOURCE"]);

    fs::remove_file(source_file_path(&path)).unwrap();
    touch(&path, 10);
    assert!(cache.get_model_with_sources("MCO").is_err());
    assert!(cache.get_model_with_sources("MCO").is_err());

    fs::write(source_file_path(&path), "NEW-SOURCE").unwrap();
    let (model2, sources2) = cache.get_model_with_sources("MCO").unwrap().unwrap();
    assert!(!Arc::ptr_eq(&model1, &model2));
    assert_eq!(sources2[0].names, vec!["NEW-SOURCE"]);
}

#[test]
fn test_missing_file_forces_reload_attempt() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("f.shc");
    fs::write(&path, "1 1 1 1 0\n2015.0\n1 0 1.0\n").unwrap();
    let cache = ModelCache::new(
        [(
            "SHC".to_string(),
            ModelFactory::new(
                |files: &[PathBuf]| crate::loaders::load_shc_model(files, false),
                vec1![ModelFile::literal(&path, "S", ValidityReader::Unbounded)],
            ),
        )],
        IndexMap::new(),
    );
    assert!(cache.get_model("SHC").unwrap().is_some());

    fs::remove_file(&path).unwrap();
    let result = cache.get_model("SHC");
    assert!(matches!(
        result,
        Err(ModelLoadError::Load {
            source: LoadError::Shc(_),
            ..
        })
    ));
}

#[test]
fn test_concurrent_requests_reload_once() {
    // Slow down the loader so that the threads really contend.
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("slow.dat");
    File::create(&path).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let slow = {
        let counter = Arc::clone(&counter);
        ModelFactory::new(
            move |_files: &[PathBuf]| {
                thread::sleep(Duration::from_millis(50));
                Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
            },
            vec1![ModelFile::literal(&path, "S", ValidityReader::Unbounded)],
        )
    };
    let cache = Arc::new(ModelCache::new(
        [("SLOW".to_string(), slow)],
        IndexMap::new(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || *cache.get_model("SLOW").unwrap().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
