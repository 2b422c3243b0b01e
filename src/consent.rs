//! Cookie 同意状态
//!
//! 记录访客对 necessary / analytics / marketing 三类追踪的选择，
//! 所有埋点在写入前都先查询这里。状态持久化在持久存储中，
//! 每次挂载时重新读取。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use tracing::{debug, warn};

use crate::identity::{KeyValueStorage, keys};

/// 同意类别
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConsentCategory {
    Necessary,
    Analytics,
    Marketing,
}

/// 持久化的同意记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentState {
    /// 恒为 true
    pub necessary: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub banner_dismissed: bool,
    #[serde(default)]
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Default for ConsentState {
    fn default() -> Self {
        Self {
            necessary: true,
            analytics: false,
            marketing: false,
            banner_dismissed: false,
            dismissed_at: None,
        }
    }
}

impl ConsentState {
    pub fn allows(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::Necessary => true,
            ConsentCategory::Analytics => self.analytics,
            ConsentCategory::Marketing => self.marketing,
        }
    }
}

/// 同意闸门
///
/// 克隆开销很小，所有克隆共享同一份状态。
#[derive(Clone)]
pub struct ConsentGate {
    state: Arc<RwLock<ConsentState>>,
    storage: Arc<dyn KeyValueStorage>,
}

impl ConsentGate {
    /// 从存储恢复状态，缺失或损坏时使用默认值
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let state = match storage.get(keys::CONSENT) {
            Ok(Some(raw)) => match serde_json::from_str::<ConsentState>(&raw) {
                Ok(mut state) => {
                    state.necessary = true;
                    state
                }
                Err(e) => {
                    warn!("ConsentGate: stored consent is unreadable, resetting: {}", e);
                    ConsentState::default()
                }
            },
            Ok(None) => ConsentState::default(),
            Err(e) => {
                debug!("ConsentGate: storage unavailable, using defaults: {}", e);
                ConsentState::default()
            }
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            storage,
        }
    }

    /// 接受全部
    pub fn accept_all(&self) {
        self.mutate(|state| {
            state.analytics = true;
            state.marketing = true;
            state.banner_dismissed = true;
            state.dismissed_at = Some(Utc::now());
        });
    }

    /// 仅必要
    pub fn accept_necessary_only(&self) {
        self.mutate(|state| {
            state.analytics = false;
            state.marketing = false;
            state.banner_dismissed = true;
            state.dismissed_at = Some(Utc::now());
        });
    }

    /// 修改单个类别，不关闭横幅；necessary 不可关闭
    pub fn update_consent(&self, category: ConsentCategory, value: bool) {
        match category {
            ConsentCategory::Necessary => {
                if !value {
                    debug!("ConsentGate: necessary consent cannot be revoked, ignoring");
                }
            }
            ConsentCategory::Analytics => self.mutate(|state| state.analytics = value),
            ConsentCategory::Marketing => self.mutate(|state| state.marketing = value),
        }
    }

    pub fn has_consent(&self, category: ConsentCategory) -> bool {
        self.state.read().allows(category)
    }

    pub fn should_show_banner(&self) -> bool {
        !self.state.read().banner_dismissed
    }

    /// 当前状态快照
    pub fn state(&self) -> ConsentState {
        self.state.read().clone()
    }

    fn mutate(&self, f: impl FnOnce(&mut ConsentState)) {
        let snapshot = {
            let mut state = self.state.write();
            f(&mut state);
            state.clone()
        };

        match serde_json::to_string(&snapshot) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(keys::CONSENT, &raw) {
                    warn!("ConsentGate: failed to persist consent: {}", e);
                }
            }
            Err(e) => warn!("ConsentGate: failed to serialize consent: {}", e),
        }
    }
}
