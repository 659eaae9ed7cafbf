//! Elan 传感器的 USB 底层操作。

use std::time::Duration;

use rusb::{Context, DeviceHandle, UsbContext};

use crate::modules::config::SessionConfig;
use crate::modules::constants::{
    ALT_SETTING, COMMAND_ENDPOINT_INDEX, CONFIG_INDEX, DATA_ENDPOINT_INDEX, INTERFACE_NUMBER,
    STATUS_ENDPOINT_INDEX,
};
use crate::modules::error::SensorError;

/// 传感器使用的三个端点。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// 命令输出端点。
    Command,
    /// 图像数据输入端点。
    Data,
    /// 状态输入端点。
    Status,
}

/// 批量传输通道。
///
/// 协议层只依赖这个 trait，测试中可以用内存实现替换真实设备。
pub trait Transport {
    /// 向端点写入全部数据，写入不完整视为失败。
    fn write(&mut self, endpoint: Endpoint, data: &[u8]) -> Result<(), SensorError>;

    /// 从端点读取最多 `len` 字节，返回实际收到的数据。
    fn read(&mut self, endpoint: Endpoint, len: usize) -> Result<Vec<u8>, SensorError>;
}

/// 内部 USB 设备句柄。
pub struct UsbDevice {
    /// 设备句柄。
    pub handle: DeviceHandle<Context>,
    /// 命令端点地址。
    pub command_endpoint: u8,
    /// 数据端点地址。
    pub data_endpoint: u8,
    /// 状态端点地址。
    pub status_endpoint: u8,
    /// 传输超时。
    pub timeout: Duration,
}

impl UsbDevice {
    /// 创建新的 USB 设备。
    pub fn new(
        handle: DeviceHandle<Context>,
        command_endpoint: u8,
        data_endpoint: u8,
        status_endpoint: u8,
        timeout: Duration,
    ) -> Self {
        Self {
            handle,
            command_endpoint,
            data_endpoint,
            status_endpoint,
            timeout,
        }
    }

    /// 端点地址。
    pub fn address(&self, endpoint: Endpoint) -> u8 {
        match endpoint {
            Endpoint::Command => self.command_endpoint,
            Endpoint::Data => self.data_endpoint,
            Endpoint::Status => self.status_endpoint,
        }
    }
}

impl Transport for UsbDevice {
    fn write(&mut self, endpoint: Endpoint, data: &[u8]) -> Result<(), SensorError> {
        let address = self.address(endpoint);
        match self.handle.write_bulk(address, data, self.timeout) {
            Ok(written) if written == data.len() => {
                #[cfg(feature = "logging")]
                log::debug!("USB write 0x{:02x}: {:02x?}", address, data);
                Ok(())
            }
            Ok(written) => {
                #[cfg(feature = "logging")]
                log::error!("USB write incomplete: {} of {}", written, data.len());
                Err(SensorError::SendFailed(format!(
                    "发送不完整: {} / {}",
                    written,
                    data.len()
                )))
            }
            Err(e) => {
                #[cfg(feature = "logging")]
                log::error!("USB write to 0x{:02x} failed: {}", address, e);
                Err(SensorError::SendFailed(e.to_string()))
            }
        }
    }

    fn read(&mut self, endpoint: Endpoint, len: usize) -> Result<Vec<u8>, SensorError> {
        let address = self.address(endpoint);
        let mut buf = vec![0u8; len];
        match self.handle.read_bulk(address, &mut buf, self.timeout) {
            Ok(read) => {
                #[cfg(feature = "logging")]
                log::debug!("USB read 0x{:02x}: {} of {} bytes", address, read, len);
                buf.truncate(read);
                Ok(buf)
            }
            Err(e) => {
                #[cfg(feature = "logging")]
                log::error!("USB read from 0x{:02x} failed: {}", address, e);
                Err(SensorError::ReceiveFailed(e.to_string()))
            }
        }
    }
}

impl Drop for UsbDevice {
    fn drop(&mut self) {
        if let Err(_e) = self.handle.release_interface(INTERFACE_NUMBER) {
            #[cfg(feature = "logging")]
            log::warn!("Failed to release interface {}: {}", INTERFACE_NUMBER, _e);
        }
    }
}

/// 打开传感器、声明接口 0 并解析三个端点。
pub fn open_elan_sensor(config: &SessionConfig) -> Result<UsbDevice, SensorError> {
    #[cfg(feature = "logging")]
    log::info!(
        "Opening Elan sensor (VID={:04x}, PID={:04x})...",
        config.vendor_id,
        config.product_id
    );

    let context = rusb::Context::new()?;
    let device = context
        .devices()?
        .iter()
        .find(|device| {
            device
                .device_descriptor()
                .map(|desc| {
                    desc.vendor_id() == config.vendor_id && desc.product_id() == config.product_id
                })
                .unwrap_or(false)
        })
        .ok_or(SensorError::DeviceNotFound(config.vendor_id, config.product_id))?;

    let handle = device.open()?;

    // 如果有内核驱动附着，先分离
    if let Ok(true) = handle.kernel_driver_active(INTERFACE_NUMBER) {
        #[cfg(feature = "logging")]
        log::info!("Detaching kernel driver...");
        if let Err(_e) = handle.detach_kernel_driver(INTERFACE_NUMBER) {
            #[cfg(feature = "logging")]
            log::warn!("Failed to detach kernel driver: {}", _e);
        }
    }

    let config_desc = device.config_descriptor(CONFIG_INDEX)?;
    handle.set_active_configuration(config_desc.number())?;
    #[cfg(feature = "logging")]
    log::info!("Active configuration: {}", config_desc.number());

    let descriptor = config_desc
        .interfaces()
        .find(|interface| interface.number() == INTERFACE_NUMBER)
        .and_then(|interface| {
            interface
                .descriptors()
                .find(|d| d.setting_number() == ALT_SETTING)
        })
        .ok_or(SensorError::InterfaceNotFound)?;

    let endpoints: Vec<(u8, rusb::Direction)> = descriptor
        .endpoint_descriptors()
        .map(|ep| (ep.address(), ep.direction()))
        .collect();
    #[cfg(feature = "logging")]
    {
        for (addr, dir) in &endpoints {
            log::debug!("  Endpoint 0x{:02x}: dir={:?}", addr, dir);
        }
    }

    let command = pick_endpoint(&endpoints, COMMAND_ENDPOINT_INDEX, rusb::Direction::Out)?;
    let data = pick_endpoint(&endpoints, DATA_ENDPOINT_INDEX, rusb::Direction::In)?;
    let status = pick_endpoint(&endpoints, STATUS_ENDPOINT_INDEX, rusb::Direction::In)?;

    handle.claim_interface(INTERFACE_NUMBER)?;
    #[cfg(feature = "logging")]
    log::info!(
        "Opened Elan sensor: CMD=0x{:02x}, DATA=0x{:02x}, STATUS=0x{:02x}",
        command,
        data,
        status
    );

    Ok(UsbDevice::new(handle, command, data, status, config.timeout))
}

fn pick_endpoint(
    endpoints: &[(u8, rusb::Direction)],
    index: usize,
    expected: rusb::Direction,
) -> Result<u8, SensorError> {
    let expected_name = match expected {
        rusb::Direction::In => "IN",
        rusb::Direction::Out => "OUT",
    };
    match endpoints.get(index) {
        Some((address, direction)) if *direction == expected => Ok(*address),
        Some(_) => Err(SensorError::EndpointMismatch {
            index,
            expected: expected_name,
        }),
        None => Err(SensorError::InterfaceNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusb::Direction;

    fn elan_layout() -> Vec<(u8, Direction)> {
        vec![
            (0x84, Direction::In),
            (0x01, Direction::Out),
            (0x82, Direction::In),
            (0x83, Direction::In),
        ]
    }

    #[test]
    fn endpoints_are_resolved_by_index() {
        let endpoints = elan_layout();
        assert_eq!(pick_endpoint(&endpoints, 1, Direction::Out).unwrap(), 0x01);
        assert_eq!(pick_endpoint(&endpoints, 2, Direction::In).unwrap(), 0x82);
        assert_eq!(pick_endpoint(&endpoints, 3, Direction::In).unwrap(), 0x83);
    }

    #[test]
    fn wrong_direction_is_rejected() {
        let err = pick_endpoint(&elan_layout(), 2, Direction::Out).unwrap_err();
        assert!(matches!(
            err,
            SensorError::EndpointMismatch {
                index: 2,
                expected: "OUT"
            }
        ));
    }

    #[test]
    fn missing_endpoint_means_wrong_interface() {
        let endpoints = &elan_layout()[..2];
        assert!(matches!(
            pick_endpoint(endpoints, 3, Direction::In),
            Err(SensorError::InterfaceNotFound)
        ));
    }
}
