//! Elan 传感器的常量定义。

/// Elan 的 USB 厂商 ID。
pub const USB_VID: u16 = 0x04f3;

/// 指纹传感器的 USB 产品 ID。
pub const USB_PID: u16 = 0x0c03;

/// USB 超时时间（毫秒）。
pub const TIMEOUT_MS: u64 = 1000;

/// 配置索引、接口号和备用设置。
pub const CONFIG_INDEX: u8 = 0;
pub const INTERFACE_NUMBER: u8 = 0;
pub const ALT_SETTING: u8 = 0;

/// 端点在接口描述符中的索引。
pub const COMMAND_ENDPOINT_INDEX: usize = 1;
pub const DATA_ENDPOINT_INDEX: usize = 2;
pub const STATUS_ENDPOINT_INDEX: usize = 3;

/// 传输大小。
pub const STATUS_SIZE: usize = 0x40;
pub const DATA_CHUNK_SIZE: usize = 0x2400;
pub const RAW_FRAME_SIZE: usize = DATA_CHUNK_SIZE * 2;

/// 图片尺寸。
pub const FRAME_ROWS: usize = 96;
pub const FRAME_COLS: usize = RAW_FRAME_SIZE / 2 / FRAME_ROWS;

/// 阈值百分比的分母。
///
/// 固定为 96²，列数不是 96 时与实际像素数不符。
pub const THRESHOLD_DENOMINATOR: f64 = (FRAME_ROWS * FRAME_ROWS) as f64;

/// 亮度阈值。
pub const INTENSITY_THRESHOLD: f64 = 140.0;

/// 手指检测区域（中心 32x32）。
pub const DETBOX_ROW_START: usize = 32;
pub const DETBOX_COL_START: usize = 32;
pub const DETBOX_ROWS: usize = 32;
pub const DETBOX_COLS: usize = 32;
pub const FINGER_PIXEL_THRESHOLD: usize = 200;

/// 预览放大倍数。
pub const ENLARGE_FACTOR: u32 = 3;

/// 预览窗口标题。
pub const PREVIEW_TITLE: &str = "Elan 04f3:0c03";
