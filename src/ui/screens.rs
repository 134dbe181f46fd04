use crate::audio::metadata::TrackMetadata;

use super::display::{BLANK_MARKER, DisplayError, MARKER, PanelDisplay, truncate};
use super::state::{HOME_OPTIONS, HomeCursor};

// Value widths for the now-playing screen; label plus value fill one
// 20-cell line.
const TITLE_BUDGET: usize = 13;
const ARTIST_BUDGET: usize = 12;
const ALBUM_BUDGET: usize = 13;
const YEAR_BUDGET: usize = 14;

pub fn home(display: &mut dyn PanelDisplay, cursor: &HomeCursor) -> Result<(), DisplayError> {
    display.clear()?;
    for (row, option) in HOME_OPTIONS.iter().enumerate() {
        display.write_line(row + 1, &home_row(cursor, row, option.label()))?;
    }
    Ok(())
}

/// Cursor moved within the fixed option list: repaint the two affected
/// rows only.
pub fn home_move(
    display: &mut dyn PanelDisplay,
    cursor: &HomeCursor,
    previous: usize,
) -> Result<(), DisplayError> {
    display.write_line(
        previous + 1,
        &home_row(cursor, previous, HOME_OPTIONS[previous].label()),
    )?;
    display.write_line(
        cursor.index() + 1,
        &home_row(cursor, cursor.index(), HOME_OPTIONS[cursor.index()].label()),
    )
}

fn home_row(cursor: &HomeCursor, row: usize, label: &str) -> String {
    let prefix = if row == cursor.index() {
        MARKER
    } else {
        BLANK_MARKER
    };
    format!("{prefix}{label}")
}

pub fn loading(display: &mut dyn PanelDisplay) -> Result<(), DisplayError> {
    display.clear()?;
    display.write_line(1, "Loading...")
}

pub fn now_playing(
    display: &mut dyn PanelDisplay,
    meta: &TrackMetadata,
) -> Result<(), DisplayError> {
    display.clear()?;
    display.write_line(1, &title_line(meta))?;
    display.write_line(2, &format!("Artist: {}", truncate(&meta.artist, ARTIST_BUDGET)))?;
    display.write_line(3, &format!("Album: {}", truncate(&meta.album, ALBUM_BUDGET)))?;
    display.write_line(4, &format!("Year: {}", truncate(&meta.year, YEAR_BUDGET)))
}

/// Pause state toggled: only the first line changes.
pub fn pause_banner(
    display: &mut dyn PanelDisplay,
    meta: &TrackMetadata,
    paused: bool,
) -> Result<(), DisplayError> {
    if paused {
        display.write_line(1, "-- Paused --")
    } else {
        display.write_line(1, &title_line(meta))
    }
}

pub fn bluetooth(display: &mut dyn PanelDisplay) -> Result<(), DisplayError> {
    display.clear()?;
    display.write_line(1, "Bluetooth audio")?;
    display.write_line(2, "Pair with: Tonbox")?;
    display.write_line(4, "Select to go back")
}

fn title_line(meta: &TrackMetadata) -> String {
    format!("Title: {}", truncate(&meta.title, TITLE_BUDGET))
}
