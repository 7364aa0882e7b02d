use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use courier::{
    CourierConfig, ReceiptLog, ReceiptReconciler, RecordingObserver,
};

fn test_config(root: &Path) -> CourierConfig {
    let config = CourierConfig {
        sender_id: "S1".to_string(),
        outbox_dir: root.join("outbox"),
        receipts_dir: root.join("receipts"),
        data_archive_dir: root.join("archive").join("data"),
        receipts_archive_dir: root.join("archive").join("receipts"),
        copy_retry_interval: Duration::from_millis(1),
        ..CourierConfig::default()
    };
    fs::create_dir_all(&config.receipts_dir).unwrap();
    config
}

fn receipt_xml(message_id: &str, status_info: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
            "<receipt xmlns=\"http://www.ech.ch/xmlns/eCH-0090/2\" version=\"2.0\">\n",
            "<eventDate>2018-04-25T15:54:50.892+02:00</eventDate>\n",
            "<statusCode>313</statusCode>\n",
            "<statusInfo>{status}</statusInfo>\n",
            "<messageId>{id}</messageId>\n",
            "<messageType>1055</messageType>\n",
            "<messageClass>0</messageClass>\n",
            "<senderId>4-143849-0</senderId>\n",
            "<recipientId>4-143849-0</recipientId>\n",
            "</receipt>\n",
        ),
        status = status_info,
        id = message_id,
    )
}

fn write_receipt(dir: &Path, name: &str, message_id: &str, status_info: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, receipt_xml(message_id, status_info)).unwrap();
    path
}

fn build_reconciler(config: &CourierConfig, observer: Arc<RecordingObserver>) -> ReceiptReconciler {
    ReceiptReconciler::new(config, ReceiptLog::new(), observer)
}

#[test]
fn well_formed_receipt_is_archived_deleted_and_logged() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    write_receipt(&config.receipts_dir, "r1.xml", "S1-42-E00", "OK");

    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());

    reconciler.run_cycle().unwrap();

    assert!(fs::read_dir(&config.receipts_dir).unwrap().next().is_none());
    assert!(config.receipts_archive_dir.join("r1.xml").exists());

    let snapshot = reconciler.log().snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].message_id, "S1-42-E00");
    assert_eq!(snapshot[0].message_id_trimmed, "S1-42");
    assert_eq!(snapshot[0].status_info, "OK");

    let published = observer.latest_snapshot().expect("snapshot published");
    assert_eq!(published, snapshot);
}

#[test]
fn snapshot_is_published_even_without_candidates() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());

    reconciler.run_cycle().unwrap();
    reconciler.run_cycle().unwrap();

    assert_eq!(observer.snapshots().len(), 2);
    assert!(observer.snapshots().iter().all(Vec::is_empty));
}

#[test]
fn failed_archive_copy_leaves_the_source_untouched() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    let source = write_receipt(&config.receipts_dir, "r1.xml", "S1-42-E00", "OK");
    let before = fs::read(&source).unwrap();

    // A directory squatting on the archive destination makes the copy
    // step fail while parse succeeded.
    fs::create_dir_all(config.receipts_archive_dir.join("r1.xml")).unwrap();

    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());
    reconciler.run_cycle().unwrap();

    assert_eq!(fs::read(&source).unwrap(), before);
    assert!(reconciler.log().is_empty());
    assert!(observer.error_messages().is_empty());
    assert_eq!(observer.snapshots().len(), 1);
}

#[test]
fn rerun_after_crash_between_copy_and_delete_stays_idempotent() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    let source = write_receipt(&config.receipts_dir, "r1.xml", "S1-42-E00", "OK");

    // Simulate a prior cycle that crashed after the archive copy but
    // before the delete: the archived copy already exists.
    fs::create_dir_all(&config.receipts_archive_dir).unwrap();
    fs::copy(&source, config.receipts_archive_dir.join("r1.xml")).unwrap();

    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());
    reconciler.run_cycle().unwrap();

    assert!(!source.exists());
    let archived: Vec<PathBuf> = fs::read_dir(&config.receipts_archive_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(archived.len(), 1);
    assert_eq!(reconciler.log().len(), 1);
}

#[test]
fn incomplete_receipt_is_deferred_until_the_writer_finishes() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    let full = receipt_xml("S1-42-E00", "OK");
    let partial = &full[..full.len() / 2];
    let source = config.receipts_dir.join("r1.xml");
    fs::write(&source, partial).unwrap();

    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());

    reconciler.run_cycle().unwrap();
    assert!(source.exists());
    assert!(reconciler.log().is_empty());
    assert!(observer.error_messages().is_empty());

    // The writer finishes; the same file reconciles on the next cycle.
    fs::write(&source, &full).unwrap();
    reconciler.run_cycle().unwrap();
    assert!(!source.exists());
    assert_eq!(reconciler.log().len(), 1);
}

#[test]
fn missing_suffix_marker_is_reported_once_and_logs_nothing() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    write_receipt(&config.receipts_dir, "r1.xml", "S1-42", "OK");

    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());

    reconciler.run_cycle().unwrap();
    reconciler.run_cycle().unwrap();

    // The document was consumed (archived and deleted), the violation
    // reported exactly once, and nothing was appended.
    assert!(fs::read_dir(&config.receipts_dir).unwrap().next().is_none());
    let errors = observer.error_messages();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("recipient suffix marker"));
    assert!(reconciler.log().is_empty());
}

#[test]
fn one_cycle_reconciles_at_most_one_receipt() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    write_receipt(&config.receipts_dir, "r1.xml", "S1-1-E00", "OK");
    write_receipt(&config.receipts_dir, "r2.xml", "S1-2-E00", "OK");

    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());

    reconciler.run_cycle().unwrap();
    assert_eq!(reconciler.log().len(), 1);
    assert_eq!(fs::read_dir(&config.receipts_dir).unwrap().count(), 1);

    reconciler.run_cycle().unwrap();
    assert_eq!(reconciler.log().len(), 2);
    assert!(fs::read_dir(&config.receipts_dir).unwrap().next().is_none());
}

#[test]
fn namespaced_legacy_receipts_still_reconcile() {
    let temp = tempdir().unwrap();
    let config = test_config(temp.path());
    let xml = concat!(
        "<sdx:receipt xmlns:sdx=\"urn:legacy\">",
        "<sdx:messageId>S1-42-E00</sdx:messageId>",
        "<sdx:statusInfo>OK</sdx:statusInfo>",
        "</sdx:receipt>",
    );
    fs::write(config.receipts_dir.join("legacy.xml"), xml).unwrap();

    let observer = Arc::new(RecordingObserver::new());
    let reconciler = build_reconciler(&config, observer.clone());
    reconciler.run_cycle().unwrap();

    let snapshot = reconciler.log().snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].message_id, "S1-42-E00");
    assert_eq!(snapshot[0].message_id_trimmed, "S1-42");
}
