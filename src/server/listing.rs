//! Manifest listing for a frame directory.
//!
//! Frame names follow the producer's layout: stills are `MMDD_HHMM.webp`,
//! hourly clips are `MMDD_HH.mp4`. The listing carries every clip and only
//! the stills of the current hour, clips first.

use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::Path;

/// Names to publish, in manifest order.
pub fn manifest_listing(dir: &Path, now: NaiveDateTime) -> io::Result<Vec<String>> {
    let month_day = now.format("%m%d").to_string();
    let hour = now.format("%H").to_string();

    let mut clips = Vec::new();
    let mut stills = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(".mp4") {
            clips.push(name);
        } else if let Some(stem) = name.strip_suffix(".webp") {
            if stem.get(0..4) == Some(month_day.as_str()) && stem.get(5..7) == Some(hour.as_str()) {
                stills.push(name);
            }
        }
    }

    clips.sort();
    stills.sort();
    clips.extend(stills);
    Ok(clips)
}

/// Manifest body: one name per line, each newline-terminated.
pub fn render_listing(names: &[String]) -> String {
    names.iter().map(|n| format!("{}\n", n)).collect()
}
