/// A video runtime parsed from the catalog's compact notation.
///
/// The zero value doubles as the "unknown" sentinel: the detail call
/// returns no usable runtime for some entries, and those must be
/// filterable rather than fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoDuration {
    secs: u64,
}

impl VideoDuration {
    pub const ZERO: Self = Self { secs: 0 };

    pub fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    /// Parse either the compact "PT#H#M#S" notation (any subset of the
    /// three fields) or an already-formatted "HH:MM:SS"/"MM:SS" clock
    /// string. Anything else yields the zero sentinel.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("PT") {
            return parse_compact(rest);
        }
        if raw.contains(':') {
            return parse_clock(raw);
        }
        Self::ZERO
    }

    /// Renders "MM:SS" below one hour, "HH:MM:SS" otherwise, each field
    /// zero-padded to two digits.
    pub fn format(&self) -> String {
        let hours = self.secs / 3600;
        let minutes = (self.secs % 3600) / 60;
        let seconds = self.secs % 60;
        if hours == 0 {
            format!("{minutes:02}:{seconds:02}")
        } else {
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        }
    }

    pub fn is_valid(&self) -> bool {
        self.secs > 0
    }

    pub fn as_secs(&self) -> u64 {
        self.secs
    }
}

fn parse_compact(rest: &str) -> VideoDuration {
    let mut secs: u64 = 0;
    let mut digits = String::new();
    let mut any_field = false;
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let Ok(value) = digits.parse::<u64>() else {
            return VideoDuration::ZERO;
        };
        digits.clear();
        let unit: u64 = match ch {
            'H' => 3600,
            'M' => 60,
            'S' => 1,
            _ => return VideoDuration::ZERO,
        };
        secs = secs.saturating_add(value.saturating_mul(unit));
        any_field = true;
    }
    if !digits.is_empty() || !any_field {
        return VideoDuration::ZERO;
    }
    VideoDuration { secs }
}

fn parse_clock(raw: &str) -> VideoDuration {
    let fields: Option<Vec<u64>> = raw.split(':').map(|part| part.parse().ok()).collect();
    match fields.as_deref() {
        Some([minutes, seconds]) => VideoDuration::from_secs(minutes * 60 + seconds),
        Some([hours, minutes, seconds]) => {
            VideoDuration::from_secs(hours * 3600 + minutes * 60 + seconds)
        }
        _ => VideoDuration::ZERO,
    }
}
