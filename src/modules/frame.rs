//! Elan 传感器的帧解码。

use std::fmt;

use image::{imageops, GrayImage, Luma};

use crate::modules::constants::{
    DETBOX_COLS, DETBOX_COL_START, DETBOX_ROWS, DETBOX_ROW_START, FINGER_PIXEL_THRESHOLD,
    FRAME_ROWS, INTENSITY_THRESHOLD, THRESHOLD_DENOMINATOR,
};
use crate::modules::error::SensorError;

/// 单个采样的换算：`(raw / 128 - 40) * 4`。
pub fn sample_value(raw: u16) -> f64 {
    (raw as f64 / 128.0 - 40.0) * 4.0
}

/// libfprint 的 8 位像素换算，全部为整数运算。
///
/// `raw / 128` 低于 40 的归零，高于 64 的饱和为 255，其余乘 4。
/// 恰好为 64 时 `64 * 4 = 256` 写入 8 位后回绕为 0，与驱动一致。
pub fn assemble_pixel(raw: u16) -> u8 {
    let val = raw / 128;
    let val = if val > 40 { val - 40 } else { 0 };
    if val > 64 {
        255
    } else {
        (val * 4) as u8
    }
}

/// 解码后的一帧，行优先存储。
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    rows: usize,
    cols: usize,
    raw: Vec<u16>,
    values: Vec<f64>,
}

/// 帧统计信息。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// 最小值。
    pub min: f64,
    /// 最大值。
    pub max: f64,
    /// 超过阈值的像素百分比（分母固定为 96²）。
    pub threshold_percent: f64,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "min={}, max={}, thres={} %",
            self.min, self.max, self.threshold_percent
        )
    }
}

impl Frame {
    /// 把原始字节按小端 16 位解码，并整形为 96 行。
    pub fn decode(bytes: &[u8]) -> Result<Self, SensorError> {
        if bytes.len() % 2 != 0 {
            return Err(SensorError::OddLength(bytes.len()));
        }

        let raw: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let values: Vec<f64> = raw.iter().map(|&r| sample_value(r)).collect();

        let samples = values.len();
        if samples == 0 || samples % FRAME_ROWS != 0 {
            return Err(SensorError::FrameShape {
                samples,
                rows: FRAME_ROWS,
            });
        }

        Ok(Self {
            rows: FRAME_ROWS,
            cols: samples / FRAME_ROWS,
            raw,
            values,
        })
    }

    /// 行数。
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 列数。
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 全部采样（行优先）。
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 获取单个采样。
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col).copied()
    }

    /// 计算最小值、最大值和阈值百分比。
    pub fn stats(&self) -> FrameStats {
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let above = self
            .values
            .iter()
            .filter(|&&v| v > INTENSITY_THRESHOLD)
            .count();

        FrameStats {
            min,
            max,
            threshold_percent: above as f64 / THRESHOLD_DENOMINATOR * 100.0,
        }
    }

    /// 转换为 8 位灰度图，显示范围固定为 [0, 255]。
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.cols as u32, self.rows as u32, |x, y| {
            let v = self.values[y as usize * self.cols + x as usize];
            Luma([v.clamp(0.0, 255.0) as u8])
        })
    }

    /// 最近邻放大后的灰度图。
    pub fn enlarged(&self, factor: u32) -> GrayImage {
        let gray = self.to_gray_image();
        if factor <= 1 {
            return gray;
        }
        imageops::resize(
            &gray,
            gray.width() * factor,
            gray.height() * factor,
            imageops::FilterType::Nearest,
        )
    }

    /// 按 libfprint 的整数换算组装的 8 位图像。
    pub fn assembled_image(&self) -> GrayImage {
        GrayImage::from_fn(self.cols as u32, self.rows as u32, |x, y| {
            Luma([assemble_pixel(self.raw[y as usize * self.cols + x as usize])])
        })
    }

    /// 检测手指是否在传感器上。
    ///
    /// 在 `assembled_image` 的中心 32x32 区域内统计超过阈值的像素，
    /// 超过 200 个即认为有手指。帧太小放不下检测区域时返回 `false`。
    pub fn finger_present(&self) -> bool {
        let gray = self.assembled_image();
        let threshold = INTENSITY_THRESHOLD as u8;
        let mut above = 0usize;

        for row in DETBOX_ROW_START..DETBOX_ROW_START + DETBOX_ROWS {
            for col in DETBOX_COL_START..DETBOX_COL_START + DETBOX_COLS {
                let Some(pixel) = gray.get_pixel_checked(col as u32, row as u32) else {
                    return false;
                };
                if pixel[0] > threshold {
                    above += 1;
                    if above > FINGER_PIXEL_THRESHOLD {
                        return true;
                    }
                }
            }
        }
        false
    }
}
