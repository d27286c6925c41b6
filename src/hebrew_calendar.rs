//! Arithmetic Hebrew calendar, just enough to find the Hebrew fiscal year.
//!
//! Dates are computed as "rata die" day numbers (day 1 is 1 January of the
//! proleptic Gregorian year 1) and converted to [Date] at the edges.

use time::{Date, Duration};

/// Rata die of the day before 1 Tishrei of year 1.
const HEBREW_EPOCH: i64 = -1_373_428;

/// Julian day number of rata die 0.
const RATA_DIE_TO_JULIAN_DAY: i64 = 1_721_425;

/// The Gregorian year is this much less than the Hebrew year that starts in its autumn.
const HEBREW_YEAR_OFFSET: i32 = 3761;

/// Days from the epoch to the molad of Tishrei of `year`, after the dehiyyot
/// that depend only on the molad itself.
fn elapsed_days(year: i64) -> i64 {
    let months_elapsed = (235 * year - 234).div_euclid(19);
    let parts_elapsed = 12_084 + 13_753 * months_elapsed;
    let days = 29 * months_elapsed + parts_elapsed.div_euclid(25_920);

    // Lo ADU Rosh: the new year never falls on a Sunday, Wednesday or Friday.
    if (3 * (days + 1)).rem_euclid(7) < 3 {
        days + 1
    } else {
        days
    }
}

/// The postponement needed to keep the length of the year valid.
fn year_length_correction(year: i64) -> i64 {
    let ny0 = elapsed_days(year - 1);
    let ny1 = elapsed_days(year);
    let ny2 = elapsed_days(year + 1);

    if ny2 - ny1 == 356 {
        2
    } else if ny1 - ny0 == 382 {
        1
    } else {
        0
    }
}

fn new_year_rata_die(year: i64) -> i64 {
    HEBREW_EPOCH + elapsed_days(year) + year_length_correction(year) + 1
}

/// Convert a day number to a [Date], saturating at the range [Date] supports.
fn date_from_rata_die(rata_die: i64) -> Date {
    let julian_day = rata_die + RATA_DIE_TO_JULIAN_DAY;

    i32::try_from(julian_day)
        .ok()
        .and_then(|julian_day| Date::from_julian_day(julian_day).ok())
        .unwrap_or(if julian_day > 0 { Date::MAX } else { Date::MIN })
}

/// The Gregorian date of Rosh Hashana (1 Tishrei) of `hebrew_year`.
///
/// # Examples
///
/// ```
/// use maaser::hebrew_calendar::new_year;
/// use time::macros::date;
///
/// assert_eq!(new_year(5786), date!(2025 - 09 - 23));
/// ```
pub fn new_year(hebrew_year: i32) -> Date {
    date_from_rata_die(new_year_rata_die(i64::from(hebrew_year)))
}

/// The Hebrew year that `date` falls in.
pub fn hebrew_year_of(date: Date) -> i32 {
    let year_starting_this_autumn = date.year() + HEBREW_YEAR_OFFSET;

    if date >= new_year(year_starting_this_autumn) {
        year_starting_this_autumn
    } else {
        year_starting_this_autumn - 1
    }
}

/// The first and last Gregorian days of `hebrew_year`.
pub fn year_bounds(hebrew_year: i32) -> (Date, Date) {
    let first_day = new_year(hebrew_year);
    let last_day = new_year(hebrew_year + 1) - Duration::days(1);

    (first_day, last_day)
}

const ONES: [&str; 10] = ["", "א", "ב", "ג", "ד", "ה", "ו", "ז", "ח", "ט"];
const TENS: [&str; 10] = ["", "י", "כ", "ל", "מ", "נ", "ס", "ע", "פ", "צ"];
const HUNDREDS: [&str; 5] = ["", "ק", "ר", "ש", "ת"];

const GERESH: char = '׳';
const GERSHAYIM: char = '״';

/// Write `hebrew_year` in Hebrew letters without the thousands, e.g. 5786 as תשפ״ו.
pub fn year_numeral(hebrew_year: i32) -> String {
    let mut remainder = hebrew_year.rem_euclid(1000);
    let mut letters = String::new();

    while remainder >= 400 {
        letters.push_str(HUNDREDS[4]);
        remainder -= 400;
    }

    if remainder >= 100 {
        letters.push_str(HUNDREDS[(remainder / 100) as usize]);
        remainder %= 100;
    }

    // Fifteen and sixteen are written as 9 + 6 and 9 + 7 to avoid spelling a divine name.
    match remainder {
        15 => letters.push_str("טו"),
        16 => letters.push_str("טז"),
        _ => {
            letters.push_str(TENS[(remainder / 10) as usize]);
            letters.push_str(ONES[(remainder % 10) as usize]);
        }
    }

    let mut chars: Vec<char> = letters.chars().collect();
    match chars.len() {
        0 => {}
        1 => chars.push(GERESH),
        length => chars.insert(length - 1, GERSHAYIM),
    }

    chars.into_iter().collect()
}
