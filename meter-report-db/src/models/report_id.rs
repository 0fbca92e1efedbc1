use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of the zero-padded sequence suffix.
pub const SEQUENCE_WIDTH: usize = 4;

/// Largest sequence a single prefix/month partition can hold.
pub const MAX_SEQUENCE: u32 = 9999;

/// Total length of a report id, e.g. `YT2025010001`.
pub const REPORT_ID_LEN: usize = 12;

/// Report family, encoded as the two-letter id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportPrefix {
    /// `YT`, technician dispatch reports.
    Yantek,
    /// `PS`, connection (completion) reports.
    Connection,
}

impl ReportPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPrefix::Yantek => "YT",
            ReportPrefix::Connection => "PS",
        }
    }
}

impl fmt::Display for ReportPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPrefix {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YT" => Ok(ReportPrefix::Yantek),
            "PS" => Ok(ReportPrefix::Connection),
            _ => Err(()),
        }
    }
}

/// Calendar month that partitions the id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `year` has four digits and `month` is 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// Month of the server's local clock.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of this month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

/// Failure to produce or read a report id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportIdError {
    #[error("Sequence limit exceeded for {prefix}{year_month}")]
    CapacityExceeded {
        prefix: ReportPrefix,
        year_month: YearMonth,
    },

    #[error("Malformed report id: {0}")]
    Malformed(String),
}

/// Parsed `<prefix><YYYYMM><seq>` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId {
    pub prefix: ReportPrefix,
    pub year_month: YearMonth,
    pub sequence: u32,
}

impl ReportId {
    pub fn new(
        prefix: ReportPrefix,
        year_month: YearMonth,
        sequence: u32,
    ) -> Result<Self, ReportIdError> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(ReportIdError::CapacityExceeded { prefix, year_month });
        }
        Ok(Self {
            prefix,
            year_month,
            sequence,
        })
    }

    /// The closed range `[<prefix><YYYYMM>0000, <prefix><YYYYMM>9999]` holding every id of the partition.
    ///
    /// Ids are fixed width, so lexicographic order over the range equals numeric order.
    pub fn partition_bounds(prefix: ReportPrefix, year_month: YearMonth) -> (String, String) {
        (
            format!("{prefix}{year_month}{:0width$}", 0, width = SEQUENCE_WIDTH),
            format!("{prefix}{year_month}{:0width$}", MAX_SEQUENCE, width = SEQUENCE_WIDTH),
        )
    }

    /// Next id in the partition given the greatest id already issued in it.
    pub fn next_after(
        prefix: ReportPrefix,
        year_month: YearMonth,
        last_issued: Option<&str>,
    ) -> Result<Self, ReportIdError> {
        let sequence = match last_issued {
            None => 1,
            Some(last) => {
                let parsed: ReportId = last.parse()?;
                if parsed.prefix != prefix || parsed.year_month != year_month {
                    return Err(ReportIdError::Malformed(last.to_string()));
                }
                parsed.sequence + 1
            }
        };
        Self::new(prefix, year_month, sequence)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{:0width$}",
            self.prefix,
            self.year_month,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for ReportId {
    type Err = ReportIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReportIdError::Malformed(s.to_string());
        if s.len() != REPORT_ID_LEN || !s.is_ascii() {
            return Err(malformed());
        }
        let prefix: ReportPrefix = s[0..2].parse().map_err(|_| malformed())?;
        if !s[2..].bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let year: i32 = s[2..6].parse().map_err(|_| malformed())?;
        let month: u32 = s[6..8].parse().map_err(|_| malformed())?;
        let sequence: u32 = s[8..12].parse().map_err(|_| malformed())?;
        let year_month = YearMonth::new(year, month).ok_or_else(malformed)?;
        Ok(Self {
            prefix,
            year_month,
            sequence,
        })
    }
}
