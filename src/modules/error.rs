//! Elan 传感器的错误类型定义。

use thiserror::Error;

/// 与传感器通信或解码帧时可能发生的错误。
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("未找到设备 (VID={0:04x}, PID={1:04x})")]
    DeviceNotFound(u16, u16),

    #[error("USB 错误: {0}")]
    UsbError(String),

    #[error("发送数据失败: {0}")]
    SendFailed(String),

    #[error("接收数据失败: {0}")]
    ReceiveFailed(String),

    #[error("未找到接口")]
    InterfaceNotFound,

    #[error("端点 {index} 方向不符，期望 {expected}")]
    EndpointMismatch { index: usize, expected: &'static str },

    #[error("原始数据长度为奇数: {0}")]
    OddLength(usize),

    #[error("{samples} 个采样无法整形为 {rows} 行")]
    FrameShape { samples: usize, rows: usize },

    #[error("显示错误: {0}")]
    DisplayError(String),
}

impl From<rusb::Error> for SensorError {
    fn from(e: rusb::Error) -> Self {
        SensorError::UsbError(e.to_string())
    }
}
