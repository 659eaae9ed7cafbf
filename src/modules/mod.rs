//! Elan 传感器库的模块声明。

// 常量
pub mod constants;

// 错误类型
pub mod error;

// 配置
pub mod config;

// USB 底层操作
pub mod usb;

// 初始化序列与采集
pub mod protocol;

// 帧解码
pub mod frame;

// 实时预览
pub mod preview;
