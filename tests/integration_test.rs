//! Integration tests for rom-ingest.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use proptest::prelude::*;
use rom_ingest::error::{Error, FailureReason, LoadError};
use rom_ingest::{
    Behavior, ByteBuffer, CancelToken, CartridgeConsumer, FileHandle, FileIngestor, FileSelection,
    IngestConfig, LazyModule, LoadSession, MemoryPlatform, ModuleLoader, Notifier, ReadPlatform,
    RomConsumer,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Notifier that remembers every alert.
#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().expect("alerts lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .expect("alerts lock")
            .push(message.to_string());
    }
}

/// Consumer that records the buffers it receives.
#[derive(Default)]
struct RecordingConsumer {
    received: Mutex<Vec<usize>>,
}

impl RomConsumer for RecordingConsumer {
    fn accept(&self, rom: ByteBuffer) -> rom_ingest::Result<String> {
        self.received.lock().expect("received lock").push(rom.len());
        Ok(format!("accepted {} bytes", rom.len()))
    }
}

/// Builds a minimal iNES image.
fn ines(prg_banks: u8, chr_banks: u8) -> Vec<u8> {
    let mut rom = vec![0u8; 16];
    rom[..4].copy_from_slice(b"NES\x1a");
    rom[4] = prg_banks;
    rom[5] = chr_banks;
    rom.extend(std::iter::repeat_n(0xea, usize::from(prg_banks) * 16 * 1024));
    rom.extend(std::iter::repeat_n(0x00, usize::from(chr_banks) * 8 * 1024));
    rom
}

fn memory_ingestor(platform: MemoryPlatform) -> (FileIngestor, Arc<MemoryPlatform>) {
    let platform = Arc::new(platform);
    let ingestor = FileIngestor::new(Arc::clone(&platform) as Arc<dyn ReadPlatform>);
    (ingestor, platform)
}

fn counting_module(consumer: Arc<RecordingConsumer>) -> (LazyModule, Arc<AtomicUsize>) {
    let resolutions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&resolutions);
    let module = LazyModule::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let consumer = Arc::clone(&consumer);
        async move { Ok::<Arc<dyn RomConsumer>, Error>(consumer) }
    });
    (module, resolutions)
}

// ==================== Ingestion ====================

#[tokio::test]
async fn test_rom_bin_round_trip() {
    let content: Vec<u8> = (0..32768u32).map(|i| (i % 251) as u8).collect();
    let mut platform = MemoryPlatform::new();
    let handle = platform.insert("roms/rom.bin", content.clone());
    assert_eq!(handle.name(), "rom.bin");
    assert_eq!(handle.size(), 32768);

    let (ingestor, _) = memory_ingestor(platform);
    let buffer = ingestor.ingest(&handle).await.expect("ingest failed");

    assert_eq!(buffer.len(), 32768);
    assert_eq!(buffer.first(), content.first());
    assert_eq!(buffer.last(), content.last());
    assert_eq!(buffer.as_bytes(), content.as_slice());
}

#[tokio::test]
async fn test_revoked_storage_rejects() {
    let mut platform = MemoryPlatform::new();
    let handle =
        platform.insert_with("revoked.bin", vec![1u8; 4096], Behavior::RevokeAfter(1024));
    let (ingestor, platform) = memory_ingestor(platform);

    let err = ingestor
        .ingest(&handle)
        .await
        .expect_err("revoked read must fail");
    assert_eq!(err.name, "revoked.bin");
    assert!(matches!(
        err.reason,
        FailureReason::Platform(ref e) if e.kind() == io::ErrorKind::NotFound
    ));
    assert_eq!(platform.abort_count("revoked.bin"), 1);
}

#[tokio::test]
async fn test_error_mid_read_aborts_exactly_once() {
    let mut platform = MemoryPlatform::new();
    let handle =
        platform.insert_with("bad.bin", vec![0u8; 512], Behavior::Fail(io::ErrorKind::Other));
    let (ingestor, platform) = memory_ingestor(platform);

    assert!(ingestor.ingest(&handle).await.is_err());
    assert_eq!(platform.abort_count("bad.bin"), 1);

    // A second ingestion starts a fresh read with its own abort.
    assert!(ingestor.ingest(&handle).await.is_err());
    assert_eq!(platform.abort_count("bad.bin"), 2);
}

#[tokio::test]
async fn test_concurrent_ingests_are_independent() {
    let mut platform = MemoryPlatform::new();
    let hanging = platform.insert_with("hang.bin", vec![0u8; 64], Behavior::Hang);
    let failing = platform.insert_with(
        "fail.bin",
        vec![0u8; 64],
        Behavior::Fail(io::ErrorKind::PermissionDenied),
    );
    let good = platform.insert("good.bin", vec![7u8; 64]);
    let (ingestor, platform) = memory_ingestor(platform);

    let cancel = CancelToken::new();
    let (hang_result, fail_result, good_result) =
        tokio::time::timeout(Duration::from_secs(5), async {
            let hang = ingestor.ingest_with_cancel(&hanging, &cancel);
            let fail = ingestor.ingest(&failing);
            let ok = async {
                let result = ingestor.ingest(&good).await;
                // The other reads are still pending or failed; this one is unaffected.
                cancel.cancel();
                result
            };
            tokio::join!(hang, fail, ok)
        })
        .await
        .expect("ingests must settle");

    assert_eq!(good_result.expect("good read").len(), 64);
    assert!(fail_result.is_err());
    assert!(hang_result.expect_err("hang was cancelled").is_cancelled());
    assert_eq!(platform.abort_count("good.bin"), 0);
    assert_eq!(platform.abort_count("fail.bin"), 1);
    assert_eq!(platform.abort_count("hang.bin"), 1);
}

#[tokio::test]
async fn test_filesystem_ingest() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.nes");
    let content = ines(2, 1);
    std::fs::write(&path, &content).expect("write rom");

    let handle = FileHandle::stat(&path).expect("stat");
    let config = IngestConfig::default().with_block_size(1000);
    let ingestor = FileIngestor::filesystem(config).expect("ingestor");
    let buffer = ingestor.ingest(&handle).await.expect("ingest");
    assert_eq!(buffer.as_bytes(), content.as_slice());

    // Block size larger than the whole file.
    let config = IngestConfig::default().with_block_size(1024 * 1024);
    let ingestor = FileIngestor::filesystem(config).expect("ingestor");
    let buffer = ingestor.ingest(&handle).await.expect("ingest");
    assert_eq!(buffer.len(), content.len());
}

#[tokio::test]
async fn test_filesystem_file_changed_after_selection() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("grow.bin");
    std::fs::write(&path, [0u8; 100]).expect("write");
    let handle = FileHandle::stat(&path).expect("stat");
    std::fs::write(&path, [0u8; 150]).expect("rewrite");

    let ingestor = FileIngestor::filesystem(IngestConfig::default()).expect("ingestor");
    let err = ingestor.ingest(&handle).await.expect_err("size changed");
    assert!(matches!(
        err.reason,
        FailureReason::SizeMismatch {
            expected: 100,
            actual: 101
        }
    ));
}

#[tokio::test]
async fn test_filesystem_file_grown_past_max_size() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("swell.bin");
    std::fs::write(&path, [0u8; 10]).expect("write");
    let handle = FileHandle::stat(&path).expect("stat");
    std::fs::write(&path, vec![0u8; 8 * 1024 * 1024]).expect("rewrite");

    let config = IngestConfig::default().with_max_size(64).with_block_size(16);
    let ingestor = FileIngestor::filesystem(config).expect("ingestor");
    let err = ingestor.ingest(&handle).await.expect_err("file grew");
    assert!(matches!(
        err.reason,
        FailureReason::SizeMismatch {
            expected: 10,
            actual: 11
        }
    ));
}

#[tokio::test]
async fn test_filesystem_file_truncated_after_selection() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("shrink.bin");
    std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).expect("write");
    let handle = FileHandle::stat(&path).expect("stat");
    std::fs::write(&path, [0u8; 16]).expect("truncate");

    let ingestor = FileIngestor::filesystem(IngestConfig::default()).expect("ingestor");
    let err = ingestor.ingest(&handle).await.expect_err("file shrank");
    assert!(matches!(err.reason, FailureReason::SizeMismatch { actual: 16, .. }));
}

#[tokio::test]
async fn test_timed_out_ingest_aborts_read() {
    let mut platform = MemoryPlatform::new();
    let handle = platform.insert_with("stuck.bin", vec![0u8; 64], Behavior::Hang);
    let (ingestor, platform) = memory_ingestor(platform);

    let result = tokio::time::timeout(Duration::from_millis(20), ingestor.ingest(&handle)).await;
    assert!(result.is_err());
    assert_eq!(platform.abort_count("stuck.bin"), 1);
}

#[tokio::test]
async fn test_filesystem_file_removed_after_selection() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("gone.bin");
    std::fs::write(&path, [0u8; 10]).expect("write");
    let handle = FileHandle::stat(&path).expect("stat");
    std::fs::remove_file(&path).expect("remove");

    let ingestor = FileIngestor::filesystem(IngestConfig::default()).expect("ingestor");
    let err = ingestor.ingest(&handle).await.expect_err("file removed");
    assert!(matches!(err.reason, FailureReason::Platform(_)));
}

proptest! {
    #[test]
    fn prop_buffer_length_matches_declared_size(
        content in proptest::collection::vec(any::<u8>(), 0..4096)
    ) {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mut platform = MemoryPlatform::new();
        let handle = platform.insert("prop.bin", content.clone());
        let (ingestor, _) = memory_ingestor(platform);

        let buffer = runtime.block_on(ingestor.ingest(&handle)).expect("ingest");
        prop_assert_eq!(buffer.len() as u64, handle.size());
        prop_assert_eq!(buffer.into_vec(), content);
    }
}

// ==================== Session ====================

#[tokio::test]
async fn test_session_empty_selection_reads_nothing() {
    let platform = MemoryPlatform::new();
    let (ingestor, _) = memory_ingestor(platform);
    let consumer = Arc::new(RecordingConsumer::default());
    let (module, resolutions) = counting_module(Arc::clone(&consumer));
    let notifier = Arc::new(RecordingNotifier::default());
    let session = LoadSession::new(
        ingestor,
        Arc::new(module),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let report = session
        .on_selection(&FileSelection::empty())
        .await
        .expect("empty selection is not an error");
    assert!(report.is_none());
    assert_eq!(resolutions.load(Ordering::SeqCst), 0);
    assert!(notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_session_success_resolves_module_lazily() {
    let mut platform = MemoryPlatform::new();
    let first = platform.insert("a.nes", vec![1u8; 100]);
    let second = platform.insert("b.nes", vec![2u8; 200]);
    let (ingestor, _) = memory_ingestor(platform);
    let consumer = Arc::new(RecordingConsumer::default());
    let (module, resolutions) = counting_module(Arc::clone(&consumer));
    let notifier = Arc::new(RecordingNotifier::default());
    let session = LoadSession::new(
        ingestor,
        Arc::new(module),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let selection = FileSelection::from_handles(vec![first, second.clone()]);
    let report = session
        .on_selection(&selection)
        .await
        .expect("load")
        .expect("report");
    assert_eq!(report.file.name, "a.nes");
    assert_eq!(report.file.size, 100);
    assert_eq!(report.module_report, "accepted 100 bytes");

    session
        .on_selection(&FileSelection::from(second))
        .await
        .expect("second load");

    assert_eq!(resolutions.load(Ordering::SeqCst), 1);
    assert_eq!(*consumer.received.lock().expect("received lock"), vec![100, 200]);
    assert!(notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_session_read_failure_alerts_once() {
    let mut platform = MemoryPlatform::new();
    let handle = platform.insert_with(
        "broken.nes",
        vec![0u8; 32],
        Behavior::Fail(io::ErrorKind::PermissionDenied),
    );
    let (ingestor, _) = memory_ingestor(platform);
    let consumer = Arc::new(RecordingConsumer::default());
    let (module, resolutions) = counting_module(Arc::clone(&consumer));
    let notifier = Arc::new(RecordingNotifier::default());
    let session = LoadSession::new(
        ingestor,
        Arc::new(module),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let err = session
        .on_selection(&FileSelection::from(handle))
        .await
        .expect_err("read must fail");
    assert!(matches!(err, Error::Read(_)));

    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("broken.nes"));
    assert_eq!(resolutions.load(Ordering::SeqCst), 0);
    assert!(consumer.received.lock().expect("received lock").is_empty());
}

#[tokio::test]
async fn test_session_with_cartridge_module() {
    let mut platform = MemoryPlatform::new();
    let good = platform.insert("game.nes", ines(1, 1));
    let bad = platform.insert("notes.txt", b"not a rom at all".to_vec());
    let (ingestor, _) = memory_ingestor(platform);
    let cartridge = Arc::new(CartridgeConsumer::new());
    let module_cartridge = Arc::clone(&cartridge);
    let module = LazyModule::new(move || {
        let consumer = Arc::clone(&module_cartridge);
        async move { Ok::<Arc<dyn RomConsumer>, Error>(consumer) }
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let session = LoadSession::new(
        ingestor,
        Arc::new(module),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let report = session
        .on_selection(&FileSelection::from(good))
        .await
        .expect("load")
        .expect("report");
    assert_eq!(report.module_report, "prg_rom 16384bytes\nchr_rom 8192bytes\n");
    assert!(cartridge.loaded().is_some());

    let err = session
        .on_selection(&FileSelection::from(bad))
        .await
        .expect_err("not an iNES image");
    assert!(matches!(err, Error::Load(LoadError::InvalidHeader { .. })));
    assert_eq!(notifier.alerts().len(), 1);
}

#[tokio::test]
async fn test_session_module_unavailable() {
    let mut platform = MemoryPlatform::new();
    let handle = platform.insert("game.nes", ines(1, 0));
    let (ingestor, _) = memory_ingestor(platform);
    let module = LazyModule::new(|| async {
        Err::<Arc<dyn RomConsumer>, Error>(
            LoadError::ModuleUnavailable("offline".to_string()).into(),
        )
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let session = LoadSession::new(
        ingestor,
        Arc::new(module),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );

    let err = session
        .on_selection(&FileSelection::from(handle))
        .await
        .expect_err("module must fail");
    assert!(matches!(err, Error::Load(LoadError::ModuleUnavailable(_))));
    assert!(notifier.alerts()[0].contains("offline"));
}

#[tokio::test]
async fn test_lazy_module_trait_object() {
    let module: Arc<dyn ModuleLoader> = Arc::new(LazyModule::new(|| async {
        Ok::<Arc<dyn RomConsumer>, Error>(Arc::new(CartridgeConsumer::new()))
    }));
    let consumer = module.resolve().await.expect("resolve");
    let report = consumer
        .accept(ByteBuffer::from(ines(2, 0)))
        .expect("accept");
    assert!(report.starts_with("prg_rom 32768bytes"));
}

// ==================== CLI ====================

fn cli() -> Command {
    Command::cargo_bin("rom-ingest").expect("binary exists")
}

#[test]
fn test_cli_load_rom() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.nes");
    std::fs::write(&path, ines(1, 1)).expect("write rom");

    cli()
        .arg("load")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded: game.nes"))
        .stdout(predicate::str::contains("prg_rom 16384bytes"));
}

#[test]
fn test_cli_load_without_selection() {
    cli()
        .arg("load")
        .assert()
        .success()
        .stdout(predicate::str::contains("No file selected."));
}

#[test]
fn test_cli_load_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.nes");
    std::fs::write(&path, ines(1, 0)).expect("write rom");

    cli()
        .args(["--format", "json", "load"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"game.nes\""));
}

#[test]
fn test_cli_load_too_large() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.nes");
    std::fs::write(&path, ines(1, 0)).expect("write rom");

    cli()
        .args(["--max-size", "64", "load"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("file too large"));
}

#[test]
fn test_cli_load_missing_file() {
    cli()
        .args(["load", "/nonexistent/path/game.nes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn test_cli_json_failure_alerts_on_stderr() {
    cli()
        .args(["--format", "json", "load", "/nonexistent/path/game.nes"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("Error: I/O error: file not found"));
}

#[test]
fn test_cli_load_reads_only_first_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.nes");
    std::fs::write(&path, ines(1, 0)).expect("write rom");
    let missing = temp_dir.path().join("missing.nes");

    cli()
        .arg("load")
        .arg(&path)
        .arg(&missing)
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded: game.nes"));
}

#[test]
fn test_cli_block_size_from_env() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.nes");
    std::fs::write(&path, ines(1, 1)).expect("write rom");

    cli()
        .env("ROM_INGEST_BLOCK_SIZE", "100")
        .arg("load")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("chr_rom 8192bytes"));

    cli()
        .env("ROM_INGEST_BLOCK_SIZE", "0")
        .arg("load")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("block size"));
}

#[test]
fn test_cli_info() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("game.nes");
    std::fs::write(&path, [0u8; 48]).expect("write");

    cli()
        .arg("info")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("48 bytes"));
}
