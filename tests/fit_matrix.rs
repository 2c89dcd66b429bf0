use framescrub::{FitAxis, FitMode, SurfaceSize, fit_axis, fit_rect};

/// Image and surface aspect ratios drawn from {0.5, 1, 2}, both fit modes.
/// Expected placement is `[x, y, width, height]`.
#[rustfmt::skip]
const CASES: &[(FitMode, (u32, u32), (u32, u32), [f64; 4])] = &[
    (FitMode::Contain, (50, 100), (100, 200), [0.0, 0.0, 100.0, 200.0]),
    (FitMode::Cover, (50, 100), (100, 200), [0.0, 0.0, 100.0, 200.0]),
    (FitMode::Contain, (100, 100), (100, 200), [0.0, 50.0, 100.0, 100.0]),
    (FitMode::Cover, (100, 100), (100, 200), [-50.0, 0.0, 200.0, 200.0]),
    (FitMode::Contain, (200, 100), (100, 200), [0.0, 75.0, 100.0, 50.0]),
    (FitMode::Cover, (200, 100), (100, 200), [-150.0, 0.0, 400.0, 200.0]),
    (FitMode::Contain, (50, 100), (200, 200), [50.0, 0.0, 100.0, 200.0]),
    (FitMode::Cover, (50, 100), (200, 200), [0.0, -100.0, 200.0, 400.0]),
    (FitMode::Contain, (100, 100), (200, 200), [0.0, 0.0, 200.0, 200.0]),
    (FitMode::Cover, (100, 100), (200, 200), [0.0, 0.0, 200.0, 200.0]),
    (FitMode::Contain, (200, 100), (200, 200), [0.0, 50.0, 200.0, 100.0]),
    (FitMode::Cover, (200, 100), (200, 200), [-100.0, 0.0, 400.0, 200.0]),
    (FitMode::Contain, (50, 100), (400, 200), [150.0, 0.0, 100.0, 200.0]),
    (FitMode::Cover, (50, 100), (400, 200), [0.0, -300.0, 400.0, 800.0]),
    (FitMode::Contain, (100, 100), (400, 200), [100.0, 0.0, 200.0, 200.0]),
    (FitMode::Cover, (100, 100), (400, 200), [0.0, -100.0, 400.0, 400.0]),
    (FitMode::Contain, (200, 100), (400, 200), [0.0, 0.0, 400.0, 200.0]),
    (FitMode::Cover, (200, 100), (400, 200), [0.0, 0.0, 400.0, 200.0]),
];

fn size((width, height): (u32, u32)) -> SurfaceSize {
    SurfaceSize { width, height }
}

#[test]
fn placement_matrix_is_exact() {
    for &(mode, image, surface, [x, y, w, h]) in CASES {
        let r = fit_rect(mode, image, size(surface)).unwrap();
        let got = [r.x0, r.y0, r.width(), r.height()];
        assert_eq!(got, [x, y, w, h], "{mode:?} image {image:?} surface {surface:?}");
    }
}

#[test]
fn contain_and_cover_pick_mirrored_axes() {
    for &(_, image, surface, _) in CASES {
        let ri = f64::from(image.0) / f64::from(image.1);
        let rs = f64::from(surface.0) / f64::from(surface.1);
        let contain = fit_axis(FitMode::Contain, image, size(surface));
        let cover = fit_axis(FitMode::Cover, image, size(surface));
        if ri > rs {
            assert_eq!((contain, cover), (FitAxis::Width, FitAxis::Height));
        } else if ri < rs {
            assert_eq!((contain, cover), (FitAxis::Height, FitAxis::Width));
        } else {
            assert_eq!((contain, cover), (FitAxis::Both, FitAxis::Both));
        }
    }
}

#[test]
fn contain_never_exceeds_and_cover_always_covers() {
    for &(mode, image, surface, _) in CASES {
        let r = fit_rect(mode, image, size(surface)).unwrap();
        let (sw, sh) = (f64::from(surface.0), f64::from(surface.1));
        match mode {
            FitMode::Contain => {
                assert!(r.x0 >= 0.0 && r.y0 >= 0.0 && r.x1 <= sw && r.y1 <= sh);
                assert!(r.width() == sw || r.height() == sh);
            }
            FitMode::Cover => {
                assert!(r.x0 <= 0.0 && r.y0 <= 0.0 && r.x1 >= sw && r.y1 >= sh);
                assert!(r.width() == sw || r.height() == sh);
            }
        }
    }
}
