use std::path::{Path, PathBuf};
use std::process::Command;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_framescrub")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "framescrub.exe"
            } else {
                "framescrub"
            });
            p
        })
}

fn write_fixture(dir: &Path, total: u32) -> PathBuf {
    std::fs::create_dir_all(dir.join("frames")).unwrap();
    for n in 1..=total {
        let shade = (n * 40) as u8;
        let img = image::RgbaImage::from_pixel(32, 18, image::Rgba([shade, 0, 0, 255]));
        img.save(dir.join(format!("frames/frame-{n:03}.png"))).unwrap();
    }
    let cfg_path = dir.join("scrub.json");
    std::fs::write(
        &cfg_path,
        format!(
            r#"{{ "frames": {{ "total": {total}, "base_path": "frames/frame-", "extension": ".png" }},
                 "frame_binding": {{ "scrub": 0.1 }} }}"#
        ),
    )
    .unwrap();
    cfg_path
}

#[test]
fn cli_frame_writes_both_surfaces() {
    let dir = PathBuf::from("target").join("cli_smoke_frame");
    let cfg = write_fixture(&dir, 3);
    let fg = dir.join("out/fg.png");
    let bg = dir.join("out/bg.png");
    let _ = std::fs::remove_file(&fg);
    let _ = std::fs::remove_file(&bg);

    let out = Command::new(exe())
        .args(["frame", "--progress", "1.0", "--viewport", "40x40"])
        .arg("--config")
        .arg(&cfg)
        .arg("--out-fg")
        .arg(&fg)
        .arg("--out-ambient")
        .arg(&bg)
        .output()
        .unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "frame=2");
    assert_eq!(image::image_dimensions(&fg).unwrap(), (40, 40));
    assert_eq!(image::image_dimensions(&bg).unwrap(), (44, 44));
}

#[test]
fn cli_sweep_visits_every_frame() {
    let dir = PathBuf::from("target").join("cli_smoke_sweep");
    let cfg = write_fixture(&dir, 4);
    let dump = dir.join("dump");
    let _ = std::fs::remove_dir_all(&dump);

    let out = Command::new(exe())
        .args(["sweep", "--viewport", "32x18", "--steps", "30"])
        .arg("--config")
        .arg(&cfg)
        .arg("--out-dir")
        .arg(&dump)
        .output()
        .unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("redraws=4"), "{stdout}");
    assert!(stdout.contains("last_frame=3"), "{stdout}");
    for i in 0..4 {
        assert!(dump.join(format!("fg-{i:04}.png")).exists());
        assert!(dump.join(format!("ambient-{i:04}.png")).exists());
    }
}
