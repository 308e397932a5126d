// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the viewport-fit sizing algorithm

use qrsnap::ViewportSize;
use qrsnap::sizing::fit_capture_size;

#[test]
fn test_height_bounded_for_all_viewports() {
    // Sweep a wide range of viewport shapes and stream aspects; the
    // computed height must never exceed 725 px nor two thirds of the
    // viewport height.
    let intrinsics = [(1920, 1080), (640, 480), (480, 640), (0, 0)];
    for vw in (200..4000).step_by(111) {
        for vh in (200..3000).step_by(97) {
            for intrinsic in intrinsics {
                let size = fit_capture_size(ViewportSize::new(vw, vh), intrinsic);
                assert!(
                    size.height <= 725,
                    "height {} exceeds cap at viewport {}x{} intrinsic {:?}",
                    size.height,
                    vw,
                    vh,
                    intrinsic
                );
                let two_thirds = (vh as f64 * 2.0 / 3.0).round() as u32;
                assert!(
                    size.height <= two_thirds,
                    "height {} exceeds 2/3 of {} at viewport {}x{} intrinsic {:?}",
                    size.height,
                    vh,
                    vw,
                    vh,
                    intrinsic
                );
            }
        }
    }
}

#[test]
fn test_four_three_fallback() {
    // Indeterminate aspect ratio: height 600 must produce width 450
    let size = fit_capture_size(ViewportSize::new(4000, 900), (0, 0));
    assert_eq!(size.height, 600);
    assert_eq!(size.width, 450);
}

#[test]
fn test_width_never_exceeds_viewport_minus_margin() {
    for vw in (100..2000).step_by(73) {
        let size = fit_capture_size(ViewportSize::new(vw, 1200), (1920, 1080));
        assert!(size.width <= vw.saturating_sub(50));
    }
}
