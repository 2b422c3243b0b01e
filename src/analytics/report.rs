//! 报表聚合（纯函数）

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TrailingWindow;
use crate::tracking::{DeviceClass, StoredEvent, VisitRecord};

/// 聚合参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// 事件样本拉取上限
    pub event_sample_limit: u64,
    /// 排行榜长度
    pub top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            event_sample_limit: 50,
            top_n: 10,
        }
    }
}

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub name: String,
    pub count: u64,
}

/// 设备分布
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceBreakdown {
    pub desktop: u64,
    pub tablet: u64,
    pub mobile: u64,
}

impl DeviceBreakdown {
    fn add(&mut self, device_type: &str) {
        match device_type.parse::<DeviceClass>() {
            Ok(DeviceClass::Desktop) => self.desktop += 1,
            Ok(DeviceClass::Tablet) => self.tablet += 1,
            Ok(DeviceClass::Mobile) => self.mobile += 1,
            Err(_) => {}
        }
    }
}

/// 管理端报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub window: TrailingWindow,
    pub since: DateTime<Utc>,
    /// 不同会话数，作为“独立访客”的近似值
    pub unique_sessions: u64,
    /// 不同设备指纹数，与会话数并列给出，不参与合并
    pub unique_fingerprints: u64,
    pub total_visits: u64,
    /// 停留秒数均值，只统计大于 0 的行
    pub avg_time_on_page: u64,
    /// 滚动深度均值，只统计大于 0 的行
    pub avg_scroll_depth: u64,
    pub devices: DeviceBreakdown,
    pub top_pages: Vec<CountEntry>,
    pub top_event_types: Vec<CountEntry>,
    pub top_categories: Vec<CountEntry>,
    pub event_sample_size: usize,
    /// 事件样本达到拉取上限，排行榜可能不完整
    pub event_sample_truncated: bool,
}

/// 从原始行计算报表
pub fn build_report(
    window: TrailingWindow,
    since: DateTime<Utc>,
    visits: &[VisitRecord],
    events: &[StoredEvent],
    options: ReportOptions,
) -> AnalyticsReport {
    let unique_sessions = visits
        .iter()
        .map(|v| v.session_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    let unique_fingerprints = visits
        .iter()
        .filter_map(|v| v.fingerprint.as_deref())
        .filter(|fp| !fp.is_empty())
        .collect::<HashSet<_>>()
        .len() as u64;

    let mut devices = DeviceBreakdown::default();
    for visit in visits {
        devices.add(&visit.device_type);
    }

    let top_pages = rank(visits.iter().map(|v| v.page_path.clone()), options.top_n);
    let top_event_types = rank(
        events
            .iter()
            .map(|e| e.record.event.event_type.as_str().to_string()),
        options.top_n,
    );
    let top_categories = rank(
        events
            .iter()
            .filter_map(|e| category_of(e.record.event.metadata.get("category"))),
        options.top_n,
    );

    AnalyticsReport {
        window,
        since,
        unique_sessions,
        unique_fingerprints,
        total_visits: visits.len() as u64,
        avg_time_on_page: positive_mean(visits.iter().map(|v| v.time_on_page)),
        avg_scroll_depth: positive_mean(visits.iter().map(|v| v.scroll_depth)),
        devices,
        top_pages,
        top_event_types,
        top_categories,
        event_sample_size: events.len(),
        event_sample_truncated: events.len() as u64 >= options.event_sample_limit,
    }
}

/// 只对正值求均值并四舍五入，没有正值时为 0
fn positive_mean(values: impl Iterator<Item = i32>) -> u64 {
    let (sum, count) = values
        .filter(|v| *v > 0)
        .fold((0u64, 0u64), |(sum, count), v| (sum + v as u64, count + 1));
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u64
}

fn category_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 计数后按次数降序，次数相同时保持首次出现的顺序
fn rank(items: impl Iterator<Item = String>, top_n: usize) -> Vec<CountEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<CountEntry> = Vec::new();

    for name in items {
        match index.get(&name) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(name.clone(), entries.len());
                entries.push(CountEntry { name, count: 1 });
            }
        }
    }

    // sort_by 是稳定排序
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(top_n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[CountEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_rank_orders_by_count_then_first_seen() {
        let items = ["b", "a", "c", "a", "c", "d"].map(String::from);
        let ranked = rank(items.into_iter(), 10);
        assert_eq!(names(&ranked), vec!["a", "c", "b", "d"]);
        assert_eq!(ranked[0].count, 2);
    }

    #[test]
    fn test_rank_truncates() {
        let items = (0..20).map(|i| format!("/p{}", i));
        assert_eq!(rank(items, 10).len(), 10);
    }

    #[test]
    fn test_positive_mean_ignores_zero_rows() {
        assert_eq!(positive_mean([0, 10, 0, 21].into_iter()), 16);
        assert_eq!(positive_mean([0, 0].into_iter()), 0);
        assert_eq!(positive_mean(std::iter::empty()), 0);
    }

    #[test]
    fn test_category_of() {
        assert_eq!(
            category_of(Some(&Value::from("web"))),
            Some("web".to_string())
        );
        assert_eq!(category_of(Some(&Value::Null)), None);
        assert_eq!(category_of(Some(&Value::from(""))), None);
        assert_eq!(category_of(None), None);
    }
}
