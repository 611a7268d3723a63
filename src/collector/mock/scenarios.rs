//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc/fs/lustre` states captured from
//! Lustre 2.x object storage and metadata servers.

use super::filesystem::MockFs;

/// `obdfilter/<ost>/stats`: byte and call counters of an OST.
pub const OBDFILTER_STATS: &str = "\
snapshot_time             1438693064.430544 secs.usecs
write_bytes               71893382 samples [bytes] 1 1048576 15201500833981
read_bytes                16572137 samples [bytes] 4096 1048576 11328947200678
get_info                  8556102 samples [reqs]
set_info_async            2 samples [reqs]
connect                   1116 samples [reqs]
reconnect                 108 samples [reqs]
disconnect                25 samples [reqs]
statfs                    1005622 samples [reqs]
create                    153 samples [reqs]
destroy                   3223 samples [reqs]
setattr                   27 samples [reqs]
punch                     3 samples [reqs]
sync                      3 samples [reqs]
preprw                    88465519 samples [reqs]
commitrw                  88465519 samples [reqs]
quotactl                  1 samples [reqs]
ping                      20223 samples [reqs]
";

/// `osd-ldiskfs/<ost>/stats`: page cache counters of an OST.
pub const OSD_LDISKFS_STATS: &str = "\
snapshot_time             1438693135.640551 secs.usecs
get_page                  24886 samples [usec] 0 1 1
cache_access              19047063027 samples [pages] 1 1 19047063027
cache_hit                 7393729777 samples [pages] 1 1 7393729777
cache_miss                11653333250 samples [pages] 1 1 11653333250
";

/// `obdfilter/<ost>/job_stats` in the newer `read_bytes`/`write_bytes` format,
/// with two jobs.
pub const OBDFILTER_JOB_STATS: &str = "\
job_stats:
- job_id:          testjob1
  snapshot_time:   1461772761
  read_bytes:      { samples:           1, unit: bytes, min:    4096, max:    4096, sum:            4096 }
  write_bytes:     { samples:          25, unit: bytes, min: 1048576, max: 1048576, sum:        26214400 }
  getattr:         { samples:           0, unit:  reqs }
  setattr:         { samples:           0, unit:  reqs }
  punch:           { samples:           1, unit:  reqs }
  sync:            { samples:           0, unit:  reqs }
  destroy:         { samples:           0, unit:  reqs }
  create:          { samples:           0, unit:  reqs }
  statfs:          { samples:           0, unit:  reqs }
  get_info:        { samples:           0, unit:  reqs }
  set_info:        { samples:           0, unit:  reqs }
  quotactl:        { samples:           0, unit:  reqs }
- job_id:          testjob2
  snapshot_time:   1461772762
  read_bytes:      { samples:           3, unit: bytes, min:     512, max:    8192, sum:           12800 }
  write_bytes:     { samples:           0, unit: bytes, min:       0, max:       0, sum:               0 }
  getattr:         { samples:           2, unit:  reqs }
  setattr:         { samples:           0, unit:  reqs }
  punch:           { samples:           0, unit:  reqs }
  sync:            { samples:           1, unit:  reqs }
  destroy:         { samples:           0, unit:  reqs }
  create:          { samples:           4, unit:  reqs }
  statfs:          { samples:           0, unit:  reqs }
  get_info:        { samples:           0, unit:  reqs }
  set_info:        { samples:           0, unit:  reqs }
  quotactl:        { samples:           0, unit:  reqs }
";

/// `obdfilter/<ost>/job_stats` in the older `read`/`write` format (Lustre 2.5).
pub const OBDFILTER_JOB_STATS_LEGACY: &str = "\
job_stats:
- job_id:          dd.0
  snapshot_time:   1409776548
  read:            { samples:           2, unit: bytes, min:    1024, max:    2048, sum:            3072 }
  write:           { samples:           7, unit: bytes, min:    4096, max:   65536, sum:          131072 }
  setattr:         { samples:           0, unit:  reqs }
  punch:           { samples:           0, unit:  reqs }
  sync:            { samples:           0, unit:  reqs }
";

/// `mdt/<mdt>/md_stats`: metadata operation counters of an MDT.
pub const MDT_MD_STATS: &str = "\
snapshot_time             1438693238.20113 secs.usecs
open                      1024577037 samples [reqs]
close                     873243496 samples [reqs]
mknod                     349042 samples [reqs]
link                      445 samples [reqs]
unlink                    3549417 samples [reqs]
mkdir                     705499 samples [reqs]
rmdir                     227434 samples [reqs]
rename                    629196 samples [reqs]
getattr                   1503663097 samples [reqs]
setattr                   1898364 samples [reqs]
getxattr                  6145349681 samples [reqs]
setxattr                  83969 samples [reqs]
statfs                    2916320 samples [reqs]
sync                      434081 samples [reqs]
samedir_rename            259625 samples [reqs]
crossdir_rename           369571 samples [reqs]
";

/// `mdt/<mdt>/job_stats` with one job.
pub const MDT_JOB_STATS: &str = "\
job_stats:
- job_id:          testjob1
  snapshot_time:   1461772761
  open:            { samples:           5, unit:  reqs }
  close:           { samples:           4, unit:  reqs }
  mknod:           { samples:           6, unit:  reqs }
  link:            { samples:           8, unit:  reqs }
  unlink:          { samples:          90, unit:  reqs }
  mkdir:           { samples:         521, unit:  reqs }
  rmdir:           { samples:         520, unit:  reqs }
  rename:          { samples:           9, unit:  reqs }
  getattr:         { samples:          11, unit:  reqs }
  setattr:         { samples:           1, unit:  reqs }
  getxattr:        { samples:           3, unit:  reqs }
  setxattr:        { samples:           4, unit:  reqs }
  statfs:          { samples:        1205, unit:  reqs }
  sync:            { samples:           2, unit:  reqs }
  samedir_rename:  { samples:         705, unit:  reqs }
  crossdir_rename: { samples:         200, unit:  reqs }
";

/// OST target name used by the OSS scenarios.
pub const OST_NAME: &str = "fs-OST0000";

/// MDT target name used by the MDS scenarios.
pub const MDT_NAME: &str = "fs-MDT0000";

impl MockFs {
    /// Creates an object storage server with one OST.
    ///
    /// Includes obdfilter stats, osd-ldiskfs stats and a two-job job_stats file.
    pub fn lustre_oss() -> Self {
        let mut fs = Self::new();
        fs.add_target(
            "obdfilter",
            OST_NAME,
            &[("stats", OBDFILTER_STATS), ("job_stats", OBDFILTER_JOB_STATS)],
        );
        fs.add_target("osd-ldiskfs", OST_NAME, &[("stats", OSD_LDISKFS_STATS)]);
        fs
    }

    /// Creates a metadata server with one MDT.
    pub fn lustre_mds() -> Self {
        let mut fs = Self::new();
        fs.add_target(
            "mdt",
            MDT_NAME,
            &[("md_stats", MDT_MD_STATS), ("job_stats", MDT_JOB_STATS)],
        );
        fs
    }

    /// Creates a combined server hosting both an OST and an MDT.
    pub fn lustre_server() -> Self {
        let mut fs = Self::lustre_oss();
        fs.add_target(
            "mdt",
            MDT_NAME,
            &[("md_stats", MDT_MD_STATS), ("job_stats", MDT_JOB_STATS)],
        );
        fs
    }

    /// Creates an OSS running a Lustre version that still labels job counters
    /// `read`/`write`.
    pub fn lustre_oss_legacy() -> Self {
        let mut fs = Self::new();
        fs.add_target(
            "obdfilter",
            OST_NAME,
            &[
                ("stats", OBDFILTER_STATS),
                ("job_stats", OBDFILTER_JOB_STATS_LEGACY),
            ],
        );
        fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    #[test]
    fn test_lustre_oss_has_required_files() {
        let fs = MockFs::lustre_oss();
        assert_eq!(fs.len(), 3);
        assert!(
            fs.read_to_string(Path::new("/proc/fs/lustre/obdfilter/fs-OST0000/job_stats"))
                .is_ok()
        );
        assert!(
            fs.read_to_string(Path::new("/proc/fs/lustre/osd-ldiskfs/fs-OST0000/stats"))
                .is_ok()
        );
    }

    #[test]
    fn test_lustre_server_contains_both_kinds() {
        let fs = MockFs::lustre_server();
        assert_eq!(fs.glob("/proc/fs/lustre/*/*/job_stats").unwrap().len(), 2);
        assert_eq!(fs.glob("/proc/fs/lustre/mdt/*/md_stats").unwrap().len(), 1);
    }
}
