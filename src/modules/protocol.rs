//! Elan 传感器的初始化序列与帧采集。
//!
//! 初始化序列是从 USB 抓包得到的固定字节，按顺序原样重放。

use crate::modules::constants::{DATA_CHUNK_SIZE, RAW_FRAME_SIZE, STATUS_SIZE};
use crate::modules::error::SensorError;
use crate::modules::usb::{Endpoint, Transport};

/// 采集命令。
pub const CAPTURE_COMMAND: [u8; 2] = [0x00, 0x09];

/// 初始化序列中的一步。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// 向命令端点写入字节。
    Command(&'static [u8]),
    /// 从状态端点读取指定长度（内容不校验）。
    Status(usize),
    /// 完整采集一帧并丢弃。
    Capture,
}

/// 从上电到可采集状态的初始化序列。
pub const INIT_SEQUENCE: &[Step] = &[
    Step::Command(&[0x00, 0x0c]),
    Step::Status(STATUS_SIZE),
    Step::Capture,
    Step::Command(&[0x40, 0x7d]),
    Step::Status(STATUS_SIZE),
    Step::Command(&[0x40, 0xbd, 0x12]),
    Step::Command(&[0x40, 0xa8, 0x78]),
    Step::Command(&[0x40, 0x68]),
    Step::Status(STATUS_SIZE),
    Step::Command(&[0x40, 0x67]),
    Step::Status(STATUS_SIZE),
    Step::Command(&[0x40, 0x47]),
    Step::Status(STATUS_SIZE),
    Step::Command(&[0x40, 0x87, 0xc0]),
    Step::Command(&[0x40, 0xa8, 0x97]),
    Step::Command(&[0x40, 0x8b, 0x72]),
];

/// 原始帧数据（两次批量读取拼接而成）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(pub Vec<u8>);

impl RawFrame {
    /// 获取原始数据引用。
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// 字节数。
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空。
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 按顺序执行一组步骤，遇到第一个错误即返回。
pub fn run_sequence<T: Transport + ?Sized>(
    transport: &mut T,
    steps: &[Step],
) -> Result<(), SensorError> {
    for (_i, step) in steps.iter().enumerate() {
        #[cfg(feature = "logging")]
        log::debug!("Step {}/{}: {:02x?}", _i + 1, steps.len(), step);

        match step {
            Step::Command(bytes) => transport.write(Endpoint::Command, bytes)?,
            Step::Status(len) => {
                let _status = transport.read(Endpoint::Status, *len)?;
                #[cfg(feature = "logging")]
                log::debug!("Status: {:02x?}", _status);
            }
            Step::Capture => {
                capture_raw(transport)?;
            }
        }
    }
    Ok(())
}

/// 发送采集命令并读取一帧。
///
/// 传感器把一帧分成两次传输，第二次读取必须在第一次完成后进行。
pub fn capture_raw<T: Transport + ?Sized>(transport: &mut T) -> Result<RawFrame, SensorError> {
    transport.write(Endpoint::Command, &CAPTURE_COMMAND)?;

    let mut data = Vec::with_capacity(RAW_FRAME_SIZE);
    for part in 0..2 {
        let chunk = transport.read(Endpoint::Data, DATA_CHUNK_SIZE)?;
        if chunk.len() != DATA_CHUNK_SIZE {
            #[cfg(feature = "logging")]
            log::error!("Frame part {} short: {} bytes", part + 1, chunk.len());
            return Err(SensorError::ReceiveFailed(format!(
                "第 {} 部分数据不完整: {} / {}",
                part + 1,
                chunk.len(),
                DATA_CHUNK_SIZE
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(RawFrame(data))
}
