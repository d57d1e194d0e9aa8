mod common;

#[cfg(test)]
mod tests {
    use crate::common::at;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use toolshed::libs::bundle::{ExportBundle, ExportOptions, ImportMode, FORMAT_VERSION};
    use toolshed::libs::error::DataError;
    use toolshed::libs::manager::{DataManager, ManagerOptions};
    use toolshed::libs::record::Record;
    use toolshed::libs::store::{SqliteStore, StoreAdapter};

    struct BundleTestContext {
        temp_dir: TempDir,
        store: Arc<SqliteStore>,
        manager: DataManager<SqliteStore>,
    }

    impl AsyncTestContext for BundleTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let store = Arc::new(SqliteStore::open_at(temp_dir.path().join("toolshed.db")).unwrap());
            store.put(Record::at("calc", "last", b"42".to_vec(), at(1))).await.unwrap();
            store.put(Record::at("notes", "draft", vec![0xde, 0xad, 0xbe, 0xef], at(2))).await.unwrap();
            store.set_preference("theme", json!("dark")).await.unwrap();

            let manager = DataManager::new(Arc::clone(&store), ManagerOptions::default());
            BundleTestContext { temp_dir, store, manager }
        }
    }

    impl BundleTestContext {
        fn fresh_manager(&self, name: &str) -> (Arc<SqliteStore>, DataManager<SqliteStore>) {
            let store = Arc::new(SqliteStore::open_at(self.temp_dir.path().join(name)).unwrap());
            let manager = DataManager::new(Arc::clone(&store), ManagerOptions::default());
            (store, manager)
        }
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_plain_file_round_trip(ctx: &mut BundleTestContext) {
        let path = ctx.temp_dir.path().join("export.json");
        let bundle = ctx.manager.export_to_file(&path, ExportOptions::default(), false).await.unwrap();
        assert_eq!(bundle.tool_count(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["formatVersion"], FORMAT_VERSION);
        assert_eq!(raw["records"][1]["payload"], "3q2+7w==");
        assert_eq!(raw["preferences"]["theme"], "dark");

        let (store, manager) = ctx.fresh_manager("plain.db");
        assert_eq!(manager.import_file(&path, ImportMode::Replace).await.unwrap(), 2);

        let expected = ctx.store.read_contents(ExportOptions::default()).await.unwrap();
        assert_eq!(store.read_contents(ExportOptions::default()).await.unwrap(), expected);
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_gzip_file_round_trip(ctx: &mut BundleTestContext) {
        let path = ctx.temp_dir.path().join("export.json.gz");
        ctx.manager.export_to_file(&path, ExportOptions::default(), true).await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

        let (store, manager) = ctx.fresh_manager("gzip.db");
        manager.import_file(&path, ImportMode::Replace).await.unwrap();
        assert_eq!(store.get("notes", "draft").await.unwrap().unwrap().payload, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(store.preference("theme").await.unwrap(), Some(json!("dark")));
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_file_without_version_is_rejected(ctx: &mut BundleTestContext) {
        let path = ctx.temp_dir.path().join("legacy.json");
        std::fs::write(&path, r#"{ "exportedAt": "2024-01-01T00:00:00Z", "records": [] }"#).unwrap();

        let err = ctx.manager.import_file(&path, ImportMode::Replace).await.unwrap_err();
        assert_eq!(
            err,
            DataError::IncompatibleFormat {
                expected: FORMAT_VERSION.to_string(),
                found: None,
            }
        );
        assert_eq!(ctx.store.storage_stats().await.unwrap().total_records, 2);
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_malformed_files_are_rejected(ctx: &mut BundleTestContext) {
        let not_json = ctx.temp_dir.path().join("notes.txt");
        std::fs::write(&not_json, "just some notes").unwrap();
        let err = ctx.manager.import_file(&not_json, ImportMode::Replace).await.unwrap_err();
        assert!(matches!(err, DataError::MalformedBundle(_)));

        let bad_payload = ctx.temp_dir.path().join("bad.json");
        let body = json!({
            "formatVersion": FORMAT_VERSION,
            "exportedAt": "2024-01-01T00:00:00Z",
            "records": [{ "toolId": "calc", "key": "x", "payload": "%%%", "updatedAt": "2024-01-01T00:00:00Z" }]
        });
        std::fs::write(&bad_payload, body.to_string()).unwrap();
        let err = ctx.manager.import_file(&bad_payload, ImportMode::Replace).await.unwrap_err();
        assert!(matches!(err, DataError::MalformedBundle(_)));
        assert!(err.is_input_error());

        let truncated_gzip = ctx.temp_dir.path().join("broken.json.gz");
        std::fs::write(&truncated_gzip, [0x1f, 0x8b, 0x08, 0x00]).unwrap();
        let err = ctx.manager.import_file(&truncated_gzip, ImportMode::Replace).await.unwrap_err();
        assert!(matches!(err, DataError::MalformedBundle(_)));

        assert_eq!(ctx.store.storage_stats().await.unwrap().total_records, 2);
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_merge_mode_rejected_before_reading(ctx: &mut BundleTestContext) {
        let missing = ctx.temp_dir.path().join("does-not-exist.json");
        let err = ctx.manager.import_file(&missing, ImportMode::Merge).await.unwrap_err();
        assert_eq!(err, DataError::UnsupportedMode(ImportMode::Merge));
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_export_to_unwritable_path_fails(ctx: &mut BundleTestContext) {
        let path = ctx.temp_dir.path().join("missing-dir").join("export.json");
        let err = ctx.manager.export_to_file(&path, ExportOptions::default(), false).await.unwrap_err();
        assert!(matches!(err, DataError::ExportFailed(_)));
        assert!(err.is_retryable());
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_failed_export_keeps_previous_file(ctx: &mut BundleTestContext) {
        // A directory at the target path makes the final rename fail.
        let target = ctx.temp_dir.path().join("export.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), b"previous").unwrap();

        let err = ctx.manager.export_to_file(&target, ExportOptions::default(), false).await.unwrap_err();
        assert!(matches!(err, DataError::ExportFailed(_)));

        assert_eq!(std::fs::read(target.join("keep.txt")).unwrap(), b"previous");
        let leftovers: Vec<_> = std::fs::read_dir(ctx.temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty(), "partial files left behind: {:?}", leftovers);
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_export_overwrites_previous_file(ctx: &mut BundleTestContext) {
        let path = ctx.temp_dir.path().join("export.json");
        std::fs::write(&path, b"stale").unwrap();

        ctx.manager.export_to_file(&path, ExportOptions::default(), false).await.unwrap();
        let bundle = ExportBundle::decode(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(bundle.records.len(), 2);
        assert!(!ctx.temp_dir.path().join("export.json.partial").exists());
    }

    #[test_context(BundleTestContext)]
    #[tokio::test]
    async fn test_sub_millisecond_timestamps_survive_reexport(ctx: &mut BundleTestContext) {
        let body = json!({
            "formatVersion": FORMAT_VERSION,
            "exportedAt": "2024-01-01T00:00:00Z",
            "records": [{
                "toolId": "calc",
                "key": "last",
                "payload": "NDI=",
                "updatedAt": "2024-01-01T00:00:00.123456789Z"
            }],
            "history": [{
                "toolId": "calc",
                "entry": { "expr": "6*7" },
                "recordedAt": "2024-01-01T00:00:01.999999999Z"
            }]
        });
        let bundle = ExportBundle::from_json_slice(body.to_string().as_bytes()).unwrap();
        assert_eq!(bundle.records[0].updated_at.timestamp_subsec_nanos(), 123_000_000);

        ctx.manager.import_all(bundle.clone(), ImportMode::Replace).await.unwrap();
        let back = ctx.manager.export_all(ExportOptions::default()).await.unwrap();
        assert_eq!(back.records, bundle.records);
        assert_eq!(back.history, bundle.history);
    }

    #[test]
    fn test_decode_accepts_both_encodings() {
        let bundle = ExportBundle::from_contents(Default::default());
        let plain = ExportBundle::decode(&bundle.encode(false).unwrap()).unwrap();
        let gzip = ExportBundle::decode(&bundle.encode(true).unwrap()).unwrap();
        assert_eq!(plain, bundle);
        assert_eq!(gzip, bundle);
    }
}
