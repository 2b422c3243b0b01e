use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SitepulseError;

/// 报表时间窗口，只支持 7 / 30 / 90 天
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TrailingWindow {
    #[default]
    Week,
    Month,
    Quarter,
}

impl TrailingWindow {
    pub const ALL: [TrailingWindow; 3] = [Self::Week, Self::Month, Self::Quarter];

    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    /// 窗口起点
    pub fn start_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days()))
    }
}

impl TryFrom<u32> for TrailingWindow {
    type Error = SitepulseError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(Self::Week),
            30 => Ok(Self::Month),
            90 => Ok(Self::Quarter),
            other => Err(SitepulseError::validation(format!(
                "Unsupported window: {} days (expected 7, 30 or 90)",
                other
            ))),
        }
    }
}

impl From<TrailingWindow> for u32 {
    fn from(window: TrailingWindow) -> Self {
        window.days()
    }
}

impl FromStr for TrailingWindow {
    type Err = SitepulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days: u32 = s
            .trim()
            .trim_end_matches('d')
            .parse()
            .map_err(|_| SitepulseError::validation(format!("Invalid window: '{}'", s)))?;
        Self::try_from(days)
    }
}

impl fmt::Display for TrailingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}
