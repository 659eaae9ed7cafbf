use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use elan_fp::{run_preview, ElanSensor, PreviewConfig, SessionConfig, WindowPreview};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "logging")]
    env_logger::init();

    let session_config = SessionConfig::default();
    let preview_config = PreviewConfig::default();

    println!(
        "Opening Elan sensor (VID=0x{:04x}, PID=0x{:04x})...",
        session_config.vendor_id, session_config.product_id
    );
    let mut sensor = ElanSensor::connect(&session_config)?;

    println!("Sending init sequence...");
    sensor.init()?;

    let stop = Arc::new(AtomicBool::new(false));

    #[cfg(feature = "ctrlc")]
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })?;
        println!("Press Ctrl+C to stop");
    }

    let mut preview = WindowPreview::new(&preview_config.title, preview_config.enlarge_factor);
    let shown = run_preview(&mut sensor, &mut preview, &stop, preview_config.max_frames)?;

    if stop.load(Ordering::SeqCst) {
        println!();
        println!("Interrupted");
    }
    println!("Frames shown: {}", shown);
    Ok(())
}
