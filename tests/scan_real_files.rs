//! End-to-end scans of a Lustre-like directory tree on disk through `RealFs`.

use std::fs;
use std::path::Path;

use lustre2::collector::lustre::{CollectError, TAG_JOBID, TAG_NAME};
use lustre2::collector::mock::scenarios::{
    MDT_JOB_STATS, MDT_MD_STATS, OBDFILTER_JOB_STATS, OBDFILTER_STATS, OSD_LDISKFS_STATS,
};
use lustre2::collector::{Lustre2Collector, RealFs};
use lustre2::config::Lustre2Config;
use lustre2::sink::{LineProtocolSink, Record};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Config pointing the default Lustre 2.x layout at `root`.
fn config_for(root: &Path) -> Lustre2Config {
    let root = root.display();
    Lustre2Config {
        ost_procfiles: vec![
            format!("{}/obdfilter/*/stats", root),
            format!("{}/osd-ldiskfs/*/stats", root),
            format!("{}/obdfilter/*/job_stats", root),
        ],
        mds_procfiles: vec![
            format!("{}/mdt/*/md_stats", root),
            format!("{}/mdt/*/job_stats", root),
        ],
    }
}

fn server_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for ost in ["lfs-OST0000", "lfs-OST0001"] {
        write(root, &format!("obdfilter/{}/stats", ost), OBDFILTER_STATS);
        write(root, &format!("obdfilter/{}/job_stats", ost), OBDFILTER_JOB_STATS);
        write(root, &format!("osd-ldiskfs/{}/stats", ost), OSD_LDISKFS_STATS);
    }
    write(root, "mdt/lfs-MDT0000/md_stats", MDT_MD_STATS);
    write(root, "mdt/lfs-MDT0000/job_stats", MDT_JOB_STATS);
    dir
}

fn records_named<'a>(records: &'a [Record], name: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| r.tag(TAG_NAME) == Some(name))
        .collect()
}

#[test]
fn scan_server_tree() {
    let dir = server_tree();
    let mut collector = Lustre2Collector::new(RealFs::new(), &config_for(dir.path()));
    let snapshot = collector.collect().unwrap();

    // Per OST: one job-less record and two job records. One MDT with one job.
    assert_eq!(snapshot.records.len(), 8);
    for ost in ["lfs-OST0000", "lfs-OST0001"] {
        let records = records_named(&snapshot.records, ost);
        assert_eq!(records.len(), 3);
        let jobless: Vec<_> = records.iter().filter(|r| r.tag(TAG_JOBID).is_none()).collect();
        assert_eq!(jobless.len(), 1);
        assert_eq!(jobless[0].field("cache_hit"), Some(7393729777));
        assert_eq!(jobless[0].field("write_calls"), Some(71893382));
    }

    let mdt = records_named(&snapshot.records, "lfs-MDT0000");
    assert_eq!(mdt.len(), 2);
    let job = mdt.iter().find(|r| r.tag(TAG_JOBID) == Some("testjob1")).unwrap();
    assert_eq!(job.field("jobstats_unlink"), Some(90));

    assert_eq!(collector.last_timing().unwrap().files, 8);
}

#[test]
fn scan_writes_line_protocol() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "obdfilter/lfs-OST0000/stats",
        "write_bytes 6 samples [bytes] 0 1048576 99999999 12345678\n",
    );
    let config = Lustre2Config {
        ost_procfiles: vec![format!("{}/obdfilter/*/stats", dir.path().display())],
        mds_procfiles: vec![format!("{}/mdt/*/md_stats", dir.path().display())],
    };

    let mut collector = Lustre2Collector::new(RealFs::new(), &config);
    let mut sink = LineProtocolSink::new(Vec::new());
    assert_eq!(collector.gather(&mut sink).unwrap(), 1);

    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert!(
        out.starts_with("lustre2,name=lfs-OST0000 write_bytes=99999999u,write_calls=6u "),
        "unexpected output: {}",
        out
    );
}

#[test]
fn missing_tree_yields_no_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut collector = Lustre2Collector::new(RealFs::new(), &config_for(dir.path()));
    assert!(collector.collect().unwrap().records.is_empty());
}

#[test]
fn format_drift_aborts_scan() {
    let dir = server_tree();
    write(
        dir.path(),
        "mdt/lfs-MDT0000/job_stats",
        "job_stats:\n- job_id: testjob1\n  open:            { samples:\n",
    );

    let mut collector = Lustre2Collector::new(RealFs::new(), &config_for(dir.path()));
    match collector.collect() {
        Err(CollectError::MalformedLine { path, line, .. }) => {
            assert!(path.ends_with("lfs-MDT0000/job_stats"));
            assert_eq!(line, 3);
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.records.len())),
    }
}
