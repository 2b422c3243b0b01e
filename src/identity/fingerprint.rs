//! 设备指纹
//!
//! 对浏览器环境信号做 djb2 风格的滚动哈希，得到一个短的十六进制标识。
//! 仅用作跨会话的弱关联提示，不具备密码学强度，碰撞与伪造都在预期之内。

use serde::{Deserialize, Serialize};

use super::Fingerprint;

const DJB2_SEED: u32 = 5381;

/// 屏幕信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

/// 参与指纹计算的环境信号
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSignals {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub screen: ScreenInfo,
    /// IANA 时区名，拿不到时回退到 UTC 偏移
    pub timezone: Option<String>,
    /// 相对 UTC 的分钟偏移（东区为正）
    pub utc_offset_minutes: i32,
    /// canvas 渲染结果的采样片段
    pub canvas_sample: Option<String>,
}

impl DeviceSignals {
    /// `<width>x<height>@<colorDepth>`
    pub fn screen_descriptor(&self) -> String {
        format!(
            "{}x{}@{}",
            self.screen.width, self.screen.height, self.screen.color_depth
        )
    }

    pub fn timezone_descriptor(&self) -> String {
        match self.timezone.as_deref() {
            Some(tz) if !tz.is_empty() => tz.to_string(),
            _ => format!("UTC{:+}", self.utc_offset_minutes),
        }
    }

    /// 拼接后的原始指纹串
    pub fn raw_components(&self) -> String {
        [
            self.user_agent.as_str(),
            self.language.as_str(),
            self.platform.as_str(),
            self.screen_descriptor().as_str(),
            self.timezone_descriptor().as_str(),
            self.canvas_sample.as_deref().unwrap_or(""),
        ]
        .join("|")
    }
}

/// `hash = hash * 33 ^ code_unit`，按 UTF-16 码元迭代，32 位回绕
pub fn djb2_xor(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(DJB2_SEED, |hash, unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// 由环境信号计算指纹，对同一组输入结果恒定
pub fn generate_fingerprint(signals: &DeviceSignals) -> Fingerprint {
    Fingerprint::from(format!("{:x}", djb2_xor(&signals.raw_components())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop_signals() -> DeviceSignals {
        DeviceSignals {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) Firefox/131.0".to_string(),
            language: "en-US".to_string(),
            platform: "Linux x86_64".to_string(),
            screen: ScreenInfo {
                width: 1920,
                height: 1080,
                color_depth: 24,
            },
            timezone: Some("Europe/Berlin".to_string()),
            utc_offset_minutes: 120,
            canvas_sample: Some("iVBORw0KGgoAAAANSUhEUgAA".to_string()),
        }
    }

    #[test]
    fn test_djb2_known_values() {
        assert_eq!(djb2_xor(""), 5381);
        assert_eq!(djb2_xor("a"), 0x2b5c4);
    }

    #[test]
    fn test_djb2_uses_utf16_code_units() {
        // U+1F600 是代理对，按两个码元参与计算
        let manual = [0xD83Du32, 0xDE00]
            .iter()
            .fold(DJB2_SEED, |h, &u| h.wrapping_mul(33) ^ u);
        assert_eq!(djb2_xor("\u{1F600}"), manual);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let signals = desktop_signals();
        assert_eq!(
            generate_fingerprint(&signals),
            generate_fingerprint(&signals.clone())
        );
    }

    #[test]
    fn test_fingerprint_changes_with_screen() {
        let a = desktop_signals();
        let mut b = desktop_signals();
        b.screen.width = 1280;
        assert_ne!(generate_fingerprint(&a), generate_fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_is_lower_hex() {
        let fp = generate_fingerprint(&desktop_signals());
        assert!(!fp.as_str().is_empty());
        assert!(fp.as_str().len() <= 8);
        assert!(
            fp.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_timezone_fallback_to_offset() {
        let mut signals = desktop_signals();
        signals.timezone = None;
        signals.utc_offset_minutes = -300;
        assert_eq!(signals.timezone_descriptor(), "UTC-300");
        signals.utc_offset_minutes = 0;
        assert_eq!(signals.timezone_descriptor(), "UTC+0");
    }

    #[test]
    fn test_raw_components_layout() {
        let signals = DeviceSignals {
            user_agent: "ua".to_string(),
            language: "de".to_string(),
            platform: "MacIntel".to_string(),
            screen: ScreenInfo {
                width: 1440,
                height: 900,
                color_depth: 30,
            },
            timezone: Some("UTC".to_string()),
            utc_offset_minutes: 0,
            canvas_sample: None,
        };
        assert_eq!(signals.raw_components(), "ua|de|MacIntel|1440x900@30|UTC|");
    }
}
