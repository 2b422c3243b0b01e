//! 页面访问模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::identity::{Fingerprint, SessionId};

/// 设备类型，仅由视口宽度决定
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceClass {
    pub const MOBILE_MAX_WIDTH: u32 = 768;
    pub const TABLET_MAX_WIDTH: u32 = 1024;

    /// `<768` mobile，`<1024` tablet，其余 desktop
    pub fn from_width(width: u32) -> Self {
        if width < Self::MOBILE_MAX_WIDTH {
            Self::Mobile
        } else if width < Self::TABLET_MAX_WIDTH {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }
}

/// 访问行的句柄（插入返回的行 ID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitHandle(i64);

impl VisitHandle {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> i64 {
        self.0
    }
}

/// 新访问
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
    pub session_id: SessionId,
    #[serde(default)]
    pub fingerprint: Option<Fingerprint>,
    pub page_path: String,
    pub device_type: DeviceClass,
    #[serde(default)]
    pub referrer: Option<String>,
}

/// 离开页面时回填的数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitUpdate {
    /// 0-100
    pub scroll_depth: u8,
    /// 秒
    pub time_on_page: u32,
    pub clicks: u32,
}

/// 从存储读回的访问行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: i64,
    pub session_id: String,
    pub fingerprint: Option<String>,
    pub page_path: String,
    /// 原样保留，报表只统计三种已知取值
    pub device_type: String,
    pub referrer: Option<String>,
    pub scroll_depth: i32,
    pub time_on_page: i32,
    pub clicks: i32,
    pub created_at: DateTime<Utc>,
}
