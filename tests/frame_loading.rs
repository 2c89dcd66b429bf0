use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use framescrub::{FrameState, FrameStore, FsFrameLoader, LoadPhase, ScrubConfig};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "framescrub_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(path: &std::path::Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, &buf).unwrap();
}

#[test]
fn loads_padded_frames_from_disk_with_gaps() {
    let tmp = temp_dir("fs_load");
    std::fs::create_dir_all(tmp.join("seq")).unwrap();
    write_png(&tmp.join("seq/f-001.png"), 4, 2);
    std::fs::write(tmp.join("seq/f-002.png"), b"not a png").unwrap();
    // f-003.png is missing on purpose.
    write_png(&tmp.join("seq/f-004.png"), 4, 2);

    let cfg_path = tmp.join("scrub.json");
    std::fs::write(
        &cfg_path,
        r#"{ "frames": { "total": 4, "base_path": "seq/f-", "extension": ".png" } }"#,
    )
    .unwrap();

    let cfg = ScrubConfig::from_json_path(&cfg_path).unwrap();
    let mut store = FrameStore::new(cfg.frames.clone());
    assert_eq!(store.phase(), LoadPhase::Idle);
    store.begin_load(Arc::new(FsFrameLoader));
    store.begin_load(Arc::new(FsFrameLoader));
    store.pump_until_ready(Duration::from_secs(30)).unwrap();

    assert_eq!(store.phase(), LoadPhase::Ready);
    assert_eq!(store.progress().loaded, 4);
    assert_eq!(
        store.frame(0).unwrap().decoded().unwrap().dimensions(),
        (4, 2)
    );
    assert!(matches!(store.frame(1).unwrap().state(), FrameState::Failed(_)));
    assert!(matches!(store.frame(2).unwrap().state(), FrameState::Failed(_)));
    assert!(store.frame(3).unwrap().decoded().is_some());
    // Nothing further arrives after ready.
    assert!(store.pump().is_empty());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn config_file_errors_are_reported() {
    let tmp = temp_dir("bad_cfg");
    std::fs::create_dir_all(&tmp).unwrap();

    let bad_json = tmp.join("bad.json");
    std::fs::write(&bad_json, "{ not json").unwrap();
    let err = ScrubConfig::from_json_path(&bad_json).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));

    let invalid = tmp.join("invalid.json");
    std::fs::write(&invalid, r#"{ "frames": { "total": 0 } }"#).unwrap();
    let err = ScrubConfig::from_json_path(&invalid).unwrap_err();
    assert!(err.to_string().contains("validation error:"));

    assert!(ScrubConfig::from_json_path(tmp.join("missing.json")).is_err());

    std::fs::remove_dir_all(&tmp).ok();
}
