// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of seconds since the start of the service day.
///
/// May be negative, or greater than 24h, for trips running past midnight
/// and for intermediate computations of reverse searches.
pub type Time = i32;

/// Value used for "not reached" in flat per-stop arrays.
pub const UNREACHED: i32 = 999_999_999;

// an unreached time shifted by a day stays representable
static_assertions::const_assert!(UNREACHED as i64 + 86_400 <= i32::MAX as i64);
static_assertions::const_assert!(-(UNREACHED as i64) - 86_400 >= i32::MIN as i64);

#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash, Default)]
pub struct PositiveDuration {
    pub(crate) seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    pub const fn from_seconds(seconds: u32) -> PositiveDuration {
        PositiveDuration { seconds }
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds as u64
    }

    /// The duration as a signed number of seconds, to be combined with a `Time`.
    pub fn as_time(&self) -> Time {
        // durations handled by the engine are far below i32::MAX
        self.seconds as Time
    }

    fn to_hms_string(self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.seconds / 3600,
            self.seconds / 60 % 60,
            self.seconds % 60
        )
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

impl FromStr for PositiveDuration {
    type Err = TimeParseError;

    // "hh:mm:ss", hours may exceed 24
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = parse_hms(s, true)?;
        Ok(PositiveDuration {
            seconds: seconds as u32,
        })
    }
}

impl Serialize for PositiveDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hms_string())
    }
}

impl<'de> Deserialize<'de> for PositiveDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        PositiveDuration::from_str(&string).map_err(de::Error::custom)
    }
}

impl std::ops::Add for PositiveDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl std::ops::Mul<u32> for PositiveDuration {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds * rhs,
        }
    }
}

/// Parse a schedule time written "hh:mm" or "hh:mm:ss".
pub fn parse_time(s: &str) -> Result<Time, TimeParseError> {
    parse_hms(s, false)
}

fn parse_hms(s: &str, seconds_required: bool) -> Result<Time, TimeParseError> {
    let err = || TimeParseError {
        value: s.to_string(),
    };
    let mut fields = s.trim().split(':');
    let mut next_field = |required: bool| -> Result<Option<i32>, TimeParseError> {
        match fields.next() {
            Some(field) => field.parse::<u32>().map(|v| Some(v as i32)).map_err(|_| err()),
            None if required => Err(err()),
            None => Ok(None),
        }
    };
    let hours = next_field(true)?.unwrap_or(0);
    let minutes = next_field(true)?.unwrap_or(0);
    let seconds = next_field(seconds_required)?.unwrap_or(0);
    if fields.next().is_some() || minutes >= 60 || seconds >= 60 {
        return Err(err());
    }
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Formats a `Time` as "hh:mm:ss", with a leading '-' for negative values.
pub fn format_time(time: Time) -> String {
    let sign = if time < 0 { "-" } else { "" };
    let seconds = time.abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        seconds / 60 / 60,
        seconds / 60 % 60,
        seconds % 60
    )
}

/// Compact "hh:mm" form used in path summaries, seconds are shown only when non zero.
pub fn format_time_short(time: Time) -> String {
    let sign = if time < 0 { "-" } else { "" };
    let seconds = time.abs();
    if seconds % 60 == 0 {
        format!("{}{:02}:{:02}", sign, seconds / 3600, seconds / 60 % 60)
    } else {
        format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            seconds / 3600,
            seconds / 60 % 60,
            seconds % 60
        )
    }
}

/// "2m", "1h5m", "20s" : duration form used in path summaries
pub fn format_duration_short(duration: Time) -> String {
    let seconds = duration.abs();
    let (h, m, s) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    let mut result = String::new();
    if h != 0 {
        result.push_str(&format!("{}h", h));
    }
    if m != 0 {
        result.push_str(&format!("{}m", m));
    }
    if s != 0 || result.is_empty() {
        result.push_str(&format!("{}s", s));
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParseError {
    value: String,
}

impl std::error::Error for TimeParseError {}

impl Display for TimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unable to parse `{}` as a time. Expected format is hh:mm:ss",
            self.value
        )
    }
}
