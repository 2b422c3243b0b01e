//! 访客身份解析
//!
//! 负责两类伪身份：
//! - 会话 ID：`<epoch-millis>-<random base36>`，存放在会话级存储中
//! - 设备指纹：由环境信号哈希得到，存放在持久存储中
//!
//! 存储不可用时回退到临时随机标识，从不向调用方抛错。

pub mod fingerprint;
pub mod storage;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use fingerprint::{DeviceSignals, ScreenInfo, djb2_xor, generate_fingerprint};
pub use storage::{DisabledStorage, FileStorage, KeyValueStorage, MemoryStorage};

/// 浏览器存储键
pub mod keys {
    /// 会话级：当前会话 ID
    pub const SESSION_ID: &str = "analytics_session_id";
    /// 持久：设备指纹
    pub const FINGERPRINT: &str = "device_fingerprint";
    /// 持久：Cookie 同意记录
    pub const CONSENT: &str = "cookie_consent";
    /// 持久：咨询弹窗关闭时间
    pub const POPUP_DISMISSED: &str = "consultation_popup_dismissed";
    /// 持久：旧版本读取的会话 ID 副本
    pub const LEGACY_SESSION_ID: &str = "visitor_session_id";
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 9;

/// 会话 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// 生成新的会话 ID
    pub fn mint() -> Self {
        Self(format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            random_base36(RANDOM_SUFFIX_LEN)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 设备指纹
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// 存储不可用时使用的随机指纹
    pub fn ephemeral() -> Self {
        Self(random_base36(RANDOM_SUFFIX_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 生成指定长度的 base36 随机串
pub fn random_base36(length: usize) -> String {
    std::iter::repeat_with(|| BASE36[rand::random_range(0..BASE36.len())] as char)
        .take(length)
        .collect()
}

/// 身份解析器
///
/// 持有会话级与持久两份存储，测试时可分别注入。
#[derive(Clone)]
pub struct IdentityResolver {
    session_storage: Arc<dyn KeyValueStorage>,
    durable_storage: Arc<dyn KeyValueStorage>,
}

impl IdentityResolver {
    pub fn new(
        session_storage: Arc<dyn KeyValueStorage>,
        durable_storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            session_storage,
            durable_storage,
        }
    }

    /// 两份存储都在内存中的解析器
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// 返回已有会话 ID，没有则生成并保存
    pub fn session_id(&self) -> SessionId {
        match self.session_storage.get(keys::SESSION_ID) {
            Ok(Some(existing)) if !existing.is_empty() => SessionId(existing),
            Ok(_) => {
                let id = SessionId::mint();
                if let Err(e) = self.session_storage.set(keys::SESSION_ID, id.as_str()) {
                    debug!("IdentityResolver: failed to persist session id: {}", e);
                }
                if let Err(e) = self
                    .durable_storage
                    .set(keys::LEGACY_SESSION_ID, id.as_str())
                {
                    trace!("IdentityResolver: legacy session key not written: {}", e);
                }
                trace!("IdentityResolver: minted session id {}", id);
                id
            }
            Err(e) => {
                debug!(
                    "IdentityResolver: session storage unavailable ({}), using ephemeral id",
                    e
                );
                SessionId::mint()
            }
        }
    }

    /// 返回已有指纹，没有则计算并保存
    pub fn fingerprint(&self, signals: &DeviceSignals) -> Fingerprint {
        match self.durable_storage.get(keys::FINGERPRINT) {
            Ok(Some(existing)) if !existing.is_empty() => Fingerprint(existing),
            Ok(_) => {
                let fp = generate_fingerprint(signals);
                if let Err(e) = self.durable_storage.set(keys::FINGERPRINT, fp.as_str()) {
                    debug!("IdentityResolver: failed to persist fingerprint: {}", e);
                }
                fp
            }
            Err(e) => {
                debug!(
                    "IdentityResolver: durable storage unavailable ({}), using ephemeral fingerprint",
                    e
                );
                Fingerprint::ephemeral()
            }
        }
    }

    pub fn durable_storage(&self) -> Arc<dyn KeyValueStorage> {
        Arc::clone(&self.durable_storage)
    }
}
