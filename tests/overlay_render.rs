use chat_overlay::{
    ChannelOrder, ChatEntry, ChatOverlay, FadeTiming, FontSpec, OverlayConfig, RectI,
};

/// Locate a usable sans TTF on the host. Pixel-level tests shape real
/// glyphs and skip when no font is installed.
fn system_font_bytes() -> Option<Vec<u8>> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    for c in CANDIDATES {
        if let Ok(bytes) = std::fs::read(c) {
            return Some(bytes);
        }
    }
    find_ttf(std::path::Path::new("/usr/share/fonts"), 0)
}

fn find_ttf(dir: &std::path::Path, depth: usize) -> Option<Vec<u8>> {
    if depth > 4 {
        return None;
    }
    let rd = std::fs::read_dir(dir).ok()?;
    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(bytes) = find_ttf(&path, depth + 1) {
                return Some(bytes);
            }
        } else if path.extension().and_then(|s| s.to_str()) == Some("ttf")
            && let Ok(bytes) = std::fs::read(&path)
        {
            return Some(bytes);
        }
    }
    None
}

fn overlay_with_font() -> Option<ChatOverlay> {
    let bytes = system_font_bytes()?;
    let font = FontSpec::from_bytes(bytes, 16.0).ok()?;
    ChatOverlay::new(OverlayConfig::new(font)).ok()
}

fn entry(time: f64, user: &str, text: &str) -> ChatEntry {
    ChatEntry {
        time,
        user: user.to_string(),
        text: text.to_string(),
    }
}

fn two_message_overlay() -> Option<ChatOverlay> {
    let overlay = overlay_with_font()?;
    overlay.set_messages(vec![entry(0.0, "a", "hi"), entry(5.0, "b", "yo")]);
    overlay.set_timing(FadeTiming::new(1.0, 15.0, 1.0).unwrap()).unwrap();
    Some(overlay)
}

#[test]
fn partially_faded_message_occupies_positive_height() {
    let Some(overlay) = two_message_overlay() else {
        eprintln!("no system font found, skipping");
        return;
    };

    // t = 0.5: "a" is halfway through its fade-in, "b" is not yet active.
    let occupied = overlay.render(0.5).unwrap();
    assert!(occupied > 0);

    // The partially faded message contributes roughly half of what it
    // reaches when fully held.
    let full = overlay.render(2.0).unwrap();
    assert!(occupied < full);

    let frame = overlay.frame().unwrap();
    assert_eq!(frame.width, 640);
    assert_eq!(frame.height, 360);
    assert!(frame.premultiplied);
    assert!(frame.data.iter().any(|&b| b != 0));
}

#[test]
fn render_past_the_window_is_empty() {
    let Some(overlay) = two_message_overlay() else {
        eprintln!("no system font found, skipping");
        return;
    };

    // window = 17s, latest message at t=5.0: nothing qualifies at t=25.
    assert_eq!(overlay.render(25.0).unwrap(), 0);
    assert!(overlay.frame().is_none());
    assert_eq!(overlay.stride(), 0);
}

#[test]
fn empty_store_render_leaves_surface_untouched() {
    let Some(overlay) = two_message_overlay() else {
        eprintln!("no system font found, skipping");
        return;
    };

    overlay.render(2.0).unwrap();
    let before = overlay.frame().unwrap();

    overlay.set_messages(Vec::new());
    assert_eq!(overlay.render(2.0).unwrap(), 0);
    let after = overlay.frame().unwrap();
    assert_eq!(before.data, after.data);
}

#[test]
fn resize_never_reuses_stale_pixels() {
    let Some(overlay) = two_message_overlay() else {
        eprintln!("no system font found, skipping");
        return;
    };

    overlay.render(2.0).unwrap();
    overlay.set_dimensions(320, 200).unwrap();
    // Resize releases the surface immediately.
    assert!(overlay.frame().is_none());

    let occupied = overlay.render(2.0).unwrap();
    assert!(occupied > 0);
    let frame = overlay.frame().unwrap();
    assert_eq!((frame.width, frame.height), (320, 200));
}

#[test]
fn same_size_rerender_clears_previous_content() {
    let Some(overlay) = overlay_with_font() else {
        eprintln!("no system font found, skipping");
        return;
    };
    overlay.set_timing(FadeTiming::new(1.0, 15.0, 1.0).unwrap()).unwrap();

    // Long message first, then a much shorter one at a later time.
    overlay.set_messages(vec![entry(
        0.0,
        "a",
        "a fairly long chat message that wraps across several lines of the overlay surface",
    )]);
    let tall = overlay.render(2.0).unwrap();

    overlay.set_messages(vec![entry(100.0, "b", "x")]);
    let short = overlay.render(102.0).unwrap();
    assert!(short < tall);

    // Rows below the short bubble must be fully transparent again.
    let frame = overlay.frame().unwrap();
    let stride = frame.width as usize * 4;
    let start = (tall as usize).min(frame.height as usize - 1) * stride;
    assert!(frame.data[start..].iter().all(|&b| b == 0));
}

#[test]
fn copy_into_flips_rows_and_respects_clip() {
    let Some(overlay) = two_message_overlay() else {
        eprintln!("no system font found, skipping");
        return;
    };

    let occupied = overlay.render(2.0).unwrap();
    assert!(occupied > 0);
    let frame = overlay.frame().unwrap();
    let stride = frame.width as usize * 4;

    let mut dest = vec![0u8; frame.height as usize * stride];
    overlay
        .copy_into(
            &mut dest,
            stride,
            ChannelOrder::Rgba8,
            RectI::new(0, 0, frame.width as i32, frame.height as i32),
        )
        .unwrap();

    let painted = occupied.min(frame.height) as usize;
    for y in 0..painted {
        let src_row = painted - y - 1;
        assert_eq!(
            dest[y * stride..(y + 1) * stride],
            frame.data[src_row * stride..(src_row + 1) * stride],
            "row {y}"
        );
    }
    // Rows beyond the painted rectangle are never written.
    assert!(dest[painted * stride..].iter().all(|&b| b == 0));

    // A window fully outside the painted rectangle writes nothing.
    let mut outside = vec![0u8; frame.height as usize * stride];
    overlay
        .copy_into(
            &mut outside,
            stride,
            ChannelOrder::Rgba8,
            RectI::new(0, occupied as i32, frame.width as i32, frame.height as i32),
        )
        .unwrap();
    assert!(outside.iter().all(|&b| b == 0));
}

#[test]
fn bgra_copy_swaps_red_and_blue() {
    let Some(overlay) = two_message_overlay() else {
        eprintln!("no system font found, skipping");
        return;
    };

    let occupied = overlay.render(2.0).unwrap();
    let frame = overlay.frame().unwrap();
    let stride = frame.width as usize * 4;

    let mut rgba = vec![0u8; frame.height as usize * stride];
    let mut bgra = vec![0u8; frame.height as usize * stride];
    let clip = RectI::new(0, 0, frame.width as i32, occupied as i32);
    overlay
        .copy_into(&mut rgba, stride, ChannelOrder::Rgba8, clip)
        .unwrap();
    overlay
        .copy_into(&mut bgra, stride, ChannelOrder::Bgra8, clip)
        .unwrap();

    for (r, b) in rgba.chunks_exact(4).zip(bgra.chunks_exact(4)) {
        assert_eq!(r[0], b[2]);
        assert_eq!(r[1], b[1]);
        assert_eq!(r[2], b[0]);
        assert_eq!(r[3], b[3]);
    }
}

#[test]
fn unchecked_timing_literals_are_rejected() {
    let Some(overlay) = overlay_with_font() else {
        eprintln!("no system font found, skipping");
        return;
    };

    // Bypassing FadeTiming::new must not smuggle in a zero fade duration.
    let bad = FadeTiming {
        fade_in: 0.0,
        hold: 0.0,
        fade_out: 1.0,
    };
    assert!(overlay.set_timing(bad).is_err());

    // The overlay still renders with its previous timing.
    overlay.set_messages(vec![entry(0.0, "a", "hi")]);
    assert!(overlay.render(2.0).unwrap() > 0);
}

#[test]
fn reload_from_bad_file_degrades_to_empty_overlay() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let Some(overlay) = overlay_with_font() else {
        eprintln!("no system font found, skipping");
        return;
    };

    // The failed load logs a warning and installs the empty store.
    assert_eq!(overlay.reload_messages("/nonexistent/chat.xml"), 0);
    assert_eq!(overlay.message_count(), 0);
    assert_eq!(overlay.render(1.0).unwrap(), 0);
}

#[test]
fn reload_replaces_previous_store() {
    let Some(overlay) = overlay_with_font() else {
        eprintln!("no system font found, skipping");
        return;
    };

    let tmp = std::env::temp_dir().join(format!(
        "chat_overlay_reload_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("chat.xml");
    std::fs::write(
        &path,
        r#"<popcorn><chat in="1.0" name="a" message="hello"/></popcorn>"#,
    )
    .unwrap();

    overlay.set_messages(vec![entry(50.0, "old", "stale")]);
    assert_eq!(overlay.reload_messages(&path), 1);
    assert_eq!(overlay.message_count(), 1);
    assert!(overlay.render(1.5).unwrap() > 0);

    std::fs::remove_dir_all(&tmp).ok();
}
