//! 会话与预览配置。

use std::time::Duration;

use crate::modules::constants::{ENLARGE_FACTOR, PREVIEW_TITLE, TIMEOUT_MS, USB_PID, USB_VID};

/// USB 会话配置。
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// 厂商 ID。
    pub vendor_id: u16,
    /// 产品 ID。
    pub product_id: u16,
    /// 每次批量传输的超时时间。
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            vendor_id: USB_VID,
            product_id: USB_PID,
            timeout: Duration::from_millis(TIMEOUT_MS),
        }
    }
}

/// 预览配置。
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    /// 窗口标题。
    pub title: String,
    /// 放大倍数，1 表示原始尺寸。
    pub enlarge_factor: u32,
    /// 最多显示的帧数，`None` 表示直到停止信号。
    pub max_frames: Option<usize>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            title: PREVIEW_TITLE.to_string(),
            enlarge_factor: ENLARGE_FACTOR,
            max_frames: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_defaults_target_the_elan_sensor() {
        let config = SessionConfig::default();
        assert_eq!(config.vendor_id, 0x04f3);
        assert_eq!(config.product_id, 0x0c03);
        assert_eq!(config.timeout, Duration::from_millis(1000));
    }

    #[test]
    fn preview_defaults_run_until_stopped() {
        let config = PreviewConfig::default();
        assert_eq!(config.max_frames, None);
        assert_eq!(config.enlarge_factor, 3);
        assert_eq!(config.title, "Elan 04f3:0c03");
    }
}
