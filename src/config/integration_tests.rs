// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::fs;
    use std::sync::Arc;

    use crate::config::{load_and_validate_config, RuntimeBuilder, Strategy};
    use crate::engine::{DirectoryStore, MemoryStore};
    use crate::errors::{BuildError, FailureStrategy, NativeError};
    use crate::native::testing::png_file;
    use crate::observability::MemoryLogger;

    /// Test that a YAML build file loads, validates and resolves its paths
    #[test]
    fn test_yaml_config_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.yaml");
        fs::write(
            &path,
            "input_root: content\noutput_root: out\nstrategy: serial\nfailure_strategy: fail_fast\nparams_extension: .opts\n",
        )
        .unwrap();

        let config = load_and_validate_config(&path).unwrap();

        assert_eq!(config.strategy, Strategy::Serial);
        assert_eq!(config.failure_strategy, FailureStrategy::FailFast);
        assert_eq!(config.input_root, dir.path().join("content"));
        assert_eq!(config.params_extension(), "opts");
    }

    /// A native library that cannot be opened stops the build before any item runs
    #[test]
    fn test_missing_native_library_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.yaml");
        fs::write(
            &path,
            "input_root: content\noutput_root: out\nnative:\n  library: lib/libmissing_image.so\n",
        )
        .unwrap();

        let config = load_and_validate_config(&path).unwrap();
        let result = RuntimeBuilder::from_config(&config);

        match result {
            Err(BuildError::Native(error)) => {
                assert!(matches!(error, NativeError::LibraryLoad { .. }));
                assert!(error.is_build_fatal());
            }
            Err(other) => panic!("Expected native load failure, got {}", other),
            Ok(_) => panic!("Expected native load failure"),
        }
    }

    /// Test a full build from a JSON config through the runtime
    #[tokio::test]
    async fn test_runtime_builds_configured_tree() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(content.join("music")).unwrap();
        png_file(&content, "logo.png", 4, 4);
        fs::write(content.join("music/theme.ogg"), vec![9u8; 300]).unwrap();
        fs::write(content.join("music/theme.ogg.params"), "!! streamed in small chunks\nchunk_size 128\n").unwrap();

        let path = dir.path().join("build.json");
        fs::write(
            &path,
            r#"{"input_root":"content","output_root":"out","executor_options":{"max_workers":2}}"#,
        )
        .unwrap();

        let config = load_and_validate_config(&path).unwrap();
        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        assert_eq!(runtime.executor.name(), "worker_pool");

        let items = runtime.discover(&config).unwrap();
        assert_eq!(items.len(), 2);

        let store = Arc::new(DirectoryStore::new(&config.output_root));
        let job = runtime.job(items, store, Arc::new(MemoryLogger::new()));
        let report = runtime
            .executor
            .execute_with_strategy(job, runtime.failure_strategy)
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(config.output_root.join("logo.texture").exists());
        match &report.item("music.theme").unwrap().outcome {
            crate::engine::ItemOutcome::Built { loops, bytes, .. } => {
                assert_eq!(*loops, 3);
                assert_eq!(*bytes, 4 + 300 + 8);
            }
            other => panic!("Expected built blob, got {:?}", other),
        }
    }

    /// A dry run keeps every payload in memory and writes nothing
    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("table.bin"), b"rows").unwrap();

        let path = dir.path().join("build.toml");
        fs::write(&path, "input_root = \"content\"\noutput_root = \"out\"\nstrategy = \"serial\"\n").unwrap();

        let config = load_and_validate_config(&path).unwrap();
        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        let store = Arc::new(MemoryStore::new());
        let job = runtime.job(runtime.discover(&config).unwrap(), store.clone(), Arc::new(MemoryLogger::new()));

        let report = runtime.executor.execute(job).await.unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(store.names(), vec!["table".to_string()]);
        assert!(!config.output_root.exists());
    }
}
