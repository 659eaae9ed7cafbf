//! 用脚本化的内存传输驱动完整会话。

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;

use elan_fp::{run_preview, ElanSensor, Endpoint, Frame, FrameSink, SensorError, Transport};

/// 模拟传感器：记录命令，按队列返回数据块。
#[derive(Default)]
struct FakeSensor {
    commands: Vec<Vec<u8>>,
    status_reads: usize,
    data_reads: usize,
    chunks: VecDeque<Vec<u8>>,
    fail_data: bool,
}

impl FakeSensor {
    fn queue_frame(&mut self, sample: u16) {
        let chunk = sample.to_le_bytes().repeat(0x2400 / 2);
        self.chunks.push_back(chunk.clone());
        self.chunks.push_back(chunk);
    }
}

impl Transport for FakeSensor {
    fn write(&mut self, endpoint: Endpoint, data: &[u8]) -> Result<(), SensorError> {
        assert_eq!(endpoint, Endpoint::Command);
        self.commands.push(data.to_vec());
        Ok(())
    }

    fn read(&mut self, endpoint: Endpoint, len: usize) -> Result<Vec<u8>, SensorError> {
        match endpoint {
            Endpoint::Status => {
                assert_eq!(len, 0x40);
                self.status_reads += 1;
                Ok(vec![0u8; len])
            }
            Endpoint::Data => {
                assert_eq!(len, 0x2400);
                if self.fail_data {
                    return Err(SensorError::ReceiveFailed("timeout".to_string()));
                }
                self.data_reads += 1;
                Ok(self.chunks.pop_front().unwrap_or_else(|| vec![0u8; len]))
            }
            Endpoint::Command => panic!("read from command endpoint"),
        }
    }
}

#[derive(Default)]
struct Stats(Vec<(f64, f64, f64, bool)>);

impl FrameSink for Stats {
    fn show(&mut self, frame: &Frame) -> Result<(), SensorError> {
        let s = frame.stats();
        self.0
            .push((s.min, s.max, s.threshold_percent, frame.finger_present()));
        Ok(())
    }
}

#[test]
fn init_then_stream_frames() {
    let mut fake = FakeSensor::default();
    fake.queue_frame(0); // 初始化时丢弃的一帧
    fake.queue_frame(0);
    fake.queue_frame(0xffff);

    let mut sensor = ElanSensor::new(fake);
    assert!(!sensor.is_initialized());
    sensor.init().unwrap();
    assert!(sensor.is_initialized());
    assert_eq!(sensor.transport().commands.len(), 11);
    assert_eq!(sensor.transport().status_reads, 5);
    assert_eq!(sensor.transport().data_reads, 2);

    let mut sink = Stats::default();
    let stop = AtomicBool::new(false);
    let shown = run_preview(&mut sensor, &mut sink, &stop, Some(2)).unwrap();
    assert_eq!(shown, 2);

    let expected = (65535.0 / 128.0 - 40.0) * 4.0;
    assert_eq!(sink.0[0], (-160.0, -160.0, 0.0, false));
    assert_eq!(sink.0[1], (expected, expected, 100.0, true));

    let fake = sensor.into_inner();
    assert_eq!(fake.data_reads, 6);
    assert_eq!(&fake.commands[11..], &[vec![0x00, 0x09], vec![0x00, 0x09]]);
}

#[test]
fn transfer_failure_aborts_the_loop() {
    let fake = FakeSensor {
        fail_data: true,
        ..Default::default()
    };
    let mut sensor = ElanSensor::new(fake);
    let mut sink = Stats::default();
    let stop = AtomicBool::new(false);

    let err = run_preview(&mut sensor, &mut sink, &stop, None).unwrap_err();
    assert!(matches!(err, SensorError::ReceiveFailed(_)));
    assert!(sink.0.is_empty());
}

#[test]
fn failed_init_leaves_session_uninitialized() {
    let fake = FakeSensor {
        fail_data: true,
        ..Default::default()
    };
    let mut sensor = ElanSensor::new(fake);
    assert!(sensor.init().is_err());
    assert!(!sensor.is_initialized());
    // 00 0c 和采集命令已经发出
    assert_eq!(
        sensor.transport().commands,
        vec![vec![0x00, 0x0c], vec![0x00, 0x09]]
    );
}
