//! Compact progress bars drawn with Unicode eighth blocks

const FILLED: char = '█';
const EMPTY: char = '░';
/// One eighth to seven eighths filled
const PARTIALS: [char; 7] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// A bar `width` cells wide (at least 3) showing `progress` in `0.0..=1.0`
pub fn progress_bar(width: usize, progress: f64) -> String {
    let width = width.max(3);
    let progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };

    let filled = progress * width as f64;
    let mut full = (filled as usize).min(width);
    let eighths = ((filled - full as f64) * 8.0) as usize;

    let mut bar: String = std::iter::repeat_n(FILLED, full).collect();
    if full < width && eighths > 0 {
        bar.push(PARTIALS[eighths.min(7) - 1]);
        full += 1;
    }
    bar.extend(std::iter::repeat_n(EMPTY, width - full));
    bar
}

/// Whole percent, rounded down
pub fn percent(progress: f64) -> u32 {
    if progress.is_finite() { (progress.clamp(0.0, 1.0) * 100.0) as u32 } else { 0 }
}
