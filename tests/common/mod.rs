//! Shared fixtures for integration tests.
//!
//! Segment directories are written into fresh temp dirs with the synthetic
//! writers from `frameseek_media::testing`.

use frameseek_media::testing::{jpeg_frame, write_mjpeg, AviFixture};
use tempfile::TempDir;

/// One 10 fps AVI segment per entry of `frame_counts`, named `seg_0000.avi`,
/// `seg_0001.avi`, ... Frame `i` of every segment is `jpeg_frame(i, 24)`.
pub fn avi_dir(frame_counts: &[u8]) -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (i, &count) in frame_counts.iter().enumerate() {
        AviFixture::new(10)
            .frames((0..count).map(|f| jpeg_frame(f, 24)))
            .write_to(&dir.path().join(format!("seg_{i:04}.avi")))
            .expect("failed to write AVI fixture");
    }
    dir
}

/// A single raw MJPEG stream `cam.mjpg` holding `frames` frames.
pub fn mjpeg_dir(frames: u8) -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let data: Vec<Vec<u8>> = (0..frames).map(|f| jpeg_frame(f, 24)).collect();
    write_mjpeg(&dir.path().join("cam.mjpg"), &data).expect("failed to write MJPEG fixture");
    dir
}
