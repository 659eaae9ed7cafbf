//! 实时预览：显示窗口与采集循环。

use std::sync::atomic::{AtomicBool, Ordering};

use image::GrayImage;
use softbuffer::GraphicsContext;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use crate::modules::error::SensorError;
use crate::modules::frame::Frame;
use crate::modules::usb::Transport;
use crate::ElanSensor;

/// 显示解码帧的目标。
pub trait FrameSink {
    /// 显示一帧，第一次调用创建画面，之后原地更新。
    fn show(&mut self, frame: &Frame) -> Result<(), SensorError>;

    /// 目标是否仍可显示，窗口被关闭后返回 `false`。
    fn is_open(&self) -> bool {
        true
    }
}

/// 灰度像素转换为 softbuffer 的 `0x00RRGGBB` 格式。
pub fn gray_to_rgb(image: &GrayImage) -> Vec<u32> {
    image
        .pixels()
        .map(|p| {
            let v = p[0] as u32;
            (v << 16) | (v << 8) | v
        })
        .collect()
}

struct Surface {
    // context 必须先于 window 释放
    context: GraphicsContext,
    window: Window,
    event_loop: EventLoop<()>,
}

/// 在屏幕窗口中显示灰度帧。
///
/// 窗口在第一帧时创建，之后每帧原地重绘。事件循环只在 `show` 内部
/// 泵一次，采集循环始终掌握控制权。
pub struct WindowPreview {
    title: String,
    enlarge_factor: u32,
    surface: Option<Surface>,
    pixels: Vec<u32>,
    size: (u32, u32),
    open: bool,
}

impl WindowPreview {
    /// 创建预览，`enlarge_factor` 为 1 时保持原始尺寸。
    pub fn new(title: &str, enlarge_factor: u32) -> Self {
        Self {
            title: title.to_string(),
            enlarge_factor: enlarge_factor.max(1),
            surface: None,
            pixels: Vec::new(),
            size: (0, 0),
            open: true,
        }
    }

    fn open_surface(&self) -> Result<Surface, SensorError> {
        let (width, height) = self.size;
        let event_loop = EventLoop::new();
        let window = WindowBuilder::new()
            .with_title(self.title.as_str())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(|e| SensorError::DisplayError(e.to_string()))?;
        let context = unsafe { GraphicsContext::new(&window, &window) }
            .map_err(|e| SensorError::DisplayError(e.to_string()))?;

        #[cfg(feature = "logging")]
        log::info!("Preview window opened ({}x{})", width, height);

        Ok(Surface {
            context,
            window,
            event_loop,
        })
    }

    /// 处理挂起的窗口事件并重绘当前像素。
    fn pump(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let Surface {
            context,
            window,
            event_loop,
        } = surface;
        let pixels = &self.pixels;
        let (width, height) = self.size;
        let open = &mut self.open;

        window.request_redraw();
        event_loop.run_return(|event, _, control_flow| {
            *control_flow = ControlFlow::Poll;
            match event {
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    window_id,
                } if window_id == window.id() => {
                    #[cfg(feature = "logging")]
                    log::info!("Preview window closed");
                    *open = false;
                    *control_flow = ControlFlow::Exit;
                }
                Event::RedrawRequested(window_id) if window_id == window.id() => {
                    context.set_buffer(pixels, width as u16, height as u16);
                }
                Event::RedrawEventsCleared => *control_flow = ControlFlow::Exit,
                _ => {}
            }
        });
    }
}

impl FrameSink for WindowPreview {
    fn show(&mut self, frame: &Frame) -> Result<(), SensorError> {
        let image = frame.enlarged(self.enlarge_factor);
        self.size = image.dimensions();
        self.pixels = gray_to_rgb(&image);

        if self.surface.is_none() {
            self.surface = Some(self.open_surface()?);
        }
        self.pump();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// 采集、解码并显示，直到收到停止信号、显示目标关闭或达到帧数上限。
///
/// 返回显示的帧数。任何传输或解码错误都会中止循环。
pub fn run_preview<T, S>(
    sensor: &mut ElanSensor<T>,
    sink: &mut S,
    stop: &AtomicBool,
    max_frames: Option<usize>,
) -> Result<usize, SensorError>
where
    T: Transport,
    S: FrameSink + ?Sized,
{
    #[cfg(feature = "logging")]
    log::info!("Preview loop started (max_frames={:?})", max_frames);

    let mut shown = 0usize;
    while !stop.load(Ordering::SeqCst) && sink.is_open() {
        if max_frames.is_some_and(|max| shown >= max) {
            break;
        }

        let frame = sensor.read_frame()?;
        sink.show(&frame)?;
        shown += 1;
    }

    #[cfg(feature = "logging")]
    log::info!("Preview loop stopped after {} frames", shown);
    Ok(shown)
}
