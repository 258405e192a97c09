//! Date-time pictures for DATE, TIME, CREATEDATE and SAVEDATE fields.
//!
//! Pictures use Word's `\@` switch syntax: `M`/`MM`/`MMM`/`MMMM` for the month,
//! `d`..`dddd` for the day, `yy`/`yyyy` for the year, `H`/`HH` (24h) and
//! `h`/`hh` (12h) for hours, `m`/`mm` for minutes, `s`/`ss` for seconds,
//! `AM/PM` or `am/pm` for the designator, and `'...'` for literal text.
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt::Write as FmtWrite;

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const DE_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];
const DE_DAYS: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];
const FR_MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];
const FR_DAYS: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

/// Locale used to render dates and times when a field has no `\@` switch.
///
/// # Examples
///
/// ```rust
/// use quire::fields::DateLocale;
///
/// let locale = DateLocale::en_gb().with_time_pattern("HH:mm:ss");
/// assert_eq!(locale.date_pattern(), "dd/MM/yyyy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLocale {
    date_pattern: String,
    time_pattern: String,
    am: &'static str,
    pm: &'static str,
    months: &'static [&'static str; 12],
    days: &'static [&'static str; 7],
}

impl Default for DateLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl DateLocale {
    /// English (United States): `M/d/yyyy`, `h:mm AM/PM`.
    pub fn en_us() -> Self {
        Self {
            date_pattern: "M/d/yyyy".to_string(),
            time_pattern: "h:mm AM/PM".to_string(),
            am: "AM",
            pm: "PM",
            months: &EN_MONTHS,
            days: &EN_DAYS,
        }
    }

    /// English (United Kingdom): `dd/MM/yyyy`, `HH:mm`.
    pub fn en_gb() -> Self {
        Self {
            date_pattern: "dd/MM/yyyy".to_string(),
            time_pattern: "HH:mm".to_string(),
            ..Self::en_us()
        }
    }

    /// German (Germany): `dd.MM.yyyy`, `HH:mm`.
    pub fn de_de() -> Self {
        Self {
            date_pattern: "dd.MM.yyyy".to_string(),
            time_pattern: "HH:mm".to_string(),
            am: "AM",
            pm: "PM",
            months: &DE_MONTHS,
            days: &DE_DAYS,
        }
    }

    /// French (France): `dd/MM/yyyy`, `HH:mm`.
    pub fn fr_fr() -> Self {
        Self {
            date_pattern: "dd/MM/yyyy".to_string(),
            time_pattern: "HH:mm".to_string(),
            am: "AM",
            pm: "PM",
            months: &FR_MONTHS,
            days: &FR_DAYS,
        }
    }

    #[inline]
    pub fn with_date_pattern(mut self, pattern: &str) -> Self {
        self.date_pattern = pattern.to_string();
        self
    }

    #[inline]
    pub fn with_time_pattern(mut self, pattern: &str) -> Self {
        self.time_pattern = pattern.to_string();
        self
    }

    #[inline]
    pub fn date_pattern(&self) -> &str {
        &self.date_pattern
    }

    #[inline]
    pub fn time_pattern(&self) -> &str {
        &self.time_pattern
    }
}

/// Render `value` using a Word date-time picture.
pub fn format_date_picture(value: &NaiveDateTime, picture: &str, locale: &DateLocale) -> String {
    let mut result = String::with_capacity(picture.len() + 8);
    let mut chars = picture.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                for next in chars.by_ref() {
                    if next == '\'' {
                        break;
                    }
                    result.push(next);
                }
            },
            'M' | 'd' | 'D' | 'y' | 'Y' | 'H' | 'h' | 'm' | 's' | 'S' => {
                let mut count = 1;
                while chars.peek() == Some(&c) {
                    count += 1;
                    chars.next();
                }
                push_component(&mut result, c, count, value, locale);
            },
            'A' | 'a' => {
                // AM/PM, am/pm, A/P, a/p
                let rest: String = chars.clone().take(4).collect();
                let hour_is_pm = value.hour() >= 12;
                if rest.eq_ignore_ascii_case("M/PM") {
                    chars.nth(3);
                    let designator = if hour_is_pm { locale.pm } else { locale.am };
                    if c == 'a' {
                        result.push_str(&designator.to_lowercase());
                    } else {
                        result.push_str(designator);
                    }
                } else if rest.get(..2).is_some_and(|s| s.eq_ignore_ascii_case("/P")) {
                    chars.nth(1);
                    let letter = if hour_is_pm { 'P' } else { 'A' };
                    if c == 'a' {
                        result.push(letter.to_ascii_lowercase());
                    } else {
                        result.push(letter);
                    }
                } else {
                    result.push(c);
                }
            },
            _ => result.push(c),
        }
    }

    result
}

fn push_component(out: &mut String, c: char, count: usize, value: &NaiveDateTime, locale: &DateLocale) {
    // Writing to a String cannot fail.
    let _ = match c {
        'M' => match count {
            1 => write!(out, "{}", value.month()),
            2 => write!(out, "{:02}", value.month()),
            3 => {
                let name = locale.months[value.month0() as usize];
                out.extend(name.chars().take(3));
                Ok(())
            },
            _ => {
                out.push_str(locale.months[value.month0() as usize]);
                Ok(())
            },
        },
        'd' | 'D' => match count {
            1 => write!(out, "{}", value.day()),
            2 => write!(out, "{:02}", value.day()),
            3 => {
                let name = locale.days[value.weekday().num_days_from_monday() as usize];
                out.extend(name.chars().take(3));
                Ok(())
            },
            _ => {
                out.push_str(locale.days[value.weekday().num_days_from_monday() as usize]);
                Ok(())
            },
        },
        'y' | 'Y' => {
            if count >= 3 {
                write!(out, "{:04}", value.year())
            } else {
                write!(out, "{:02}", value.year().rem_euclid(100))
            }
        },
        'H' => {
            if count >= 2 {
                write!(out, "{:02}", value.hour())
            } else {
                write!(out, "{}", value.hour())
            }
        },
        'h' => {
            let hour = match value.hour() % 12 {
                0 => 12,
                h => h,
            };
            if count >= 2 {
                write!(out, "{:02}", hour)
            } else {
                write!(out, "{}", hour)
            }
        },
        'm' => {
            if count >= 2 {
                write!(out, "{:02}", value.minute())
            } else {
                write!(out, "{}", value.minute())
            }
        },
        _ => {
            if count >= 2 {
                write!(out, "{:02}", value.second())
            } else {
                write!(out, "{}", value.second())
            }
        },
    };
}
