//! Handicap arithmetic. A score differential is computed per card at
//! submission time; the index aggregates the stored differentials.

/// Minimum number of cards before an index exists.
pub const MIN_CARDS: usize = 3;
/// Differentials considered, newest first.
pub const WINDOW: usize = 20;
/// How many of the lowest differentials in the window count.
pub const BEST_OF: usize = 8;
/// Bonus-for-excellence multiplier applied to the average.
pub const INDEX_FACTOR: f64 = 0.96;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `(gross - course_rating) * 113 / slope_rating`, rounded to one decimal.
pub fn score_differential(gross: i64, course_rating: f64, slope_rating: i64) -> f64 {
    round1((gross as f64 - course_rating) * 113.0 / slope_rating as f64)
}

/// Handicap Index over differentials ordered newest first: average of the
/// best 8 within the last 20 (all of them when fewer than 8 exist), times
/// 0.96. `None` until [`MIN_CARDS`] differentials are recorded.
pub fn handicap_index(differentials_newest_first: &[f64]) -> Option<f64> {
    if differentials_newest_first.len() < MIN_CARDS {
        return None;
    }

    let mut window: Vec<f64> = differentials_newest_first
        .iter()
        .take(WINDOW)
        .copied()
        .collect();
    window.sort_by(f64::total_cmp);

    let counted = window.len().min(BEST_OF);
    let avg = window[..counted].iter().sum::<f64>() / counted as f64;

    Some(round1(avg * INDEX_FACTOR))
}

/// Net score stored on a card: gross less the rounded index, when one exists.
pub fn net_score(gross: i64, index: Option<f64>) -> i64 {
    match index {
        Some(index) => gross - index.round() as i64,
        None => gross,
    }
}
