//! Elan USB 指纹传感器 (04f3:0c03) 调试库。
//!
//! 打开设备，重放初始化序列，然后循环采集、解码并刷新预览。

pub mod modules;

pub use modules::config::{PreviewConfig, SessionConfig};
pub use modules::error::SensorError;
pub use modules::frame::{Frame, FrameStats};
pub use modules::preview::{run_preview, FrameSink, WindowPreview};
pub use modules::protocol::{RawFrame, Step, CAPTURE_COMMAND, INIT_SEQUENCE};
pub use modules::usb::{Endpoint, Transport, UsbDevice};

use modules::protocol;
use modules::usb;

/// 与传感器的一次会话。
///
/// 会话独占设备句柄，直到被丢弃。
pub struct ElanSensor<T: Transport = UsbDevice> {
    transport: T,
    initialized: bool,
}

impl ElanSensor<UsbDevice> {
    /// 按配置打开 USB 设备。
    pub fn connect(config: &SessionConfig) -> Result<Self, SensorError> {
        let device = usb::open_elan_sensor(config)?;
        Ok(Self::new(device))
    }
}

impl<T: Transport> ElanSensor<T> {
    /// 用任意传输通道创建会话。
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            initialized: false,
        }
    }

    /// 发送初始化序列，使传感器进入采集状态。
    pub fn init(&mut self) -> Result<(), SensorError> {
        #[cfg(feature = "logging")]
        log::info!("Sending init sequence ({} steps)...", INIT_SEQUENCE.len());

        protocol::run_sequence(&mut self.transport, INIT_SEQUENCE)?;
        self.initialized = true;

        #[cfg(feature = "logging")]
        log::info!("Sensor ready");
        Ok(())
    }

    /// 初始化序列是否已完成。
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// 采集一帧原始数据。
    pub fn capture_raw(&mut self) -> Result<RawFrame, SensorError> {
        protocol::capture_raw(&mut self.transport)
    }

    /// 采集并解码一帧，打印统计信息。
    pub fn read_frame(&mut self) -> Result<Frame, SensorError> {
        let raw = self.capture_raw()?;
        let frame = Frame::decode(raw.as_bytes())?;
        println!("{}", frame.stats());

        #[cfg(feature = "logging")]
        log::debug!("Finger present: {}", frame.finger_present());
        Ok(frame)
    }

    /// 获取传输通道引用。
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 结束会话并取回传输通道。
    pub fn into_inner(self) -> T {
        self.transport
    }
}
