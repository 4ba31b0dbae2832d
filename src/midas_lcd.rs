use crate::helpers::sleep_unless_shutdown;
use crate::sensor_reader::{SensorBackend, read_temperatures};
use crate::sensor_readings::{SensorSource, TempReading, TempReadings};
use anyhow::{Context, Result};
use serialport::SerialPort;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info, warn};

// Constants
const BAUD_RATE: u32 = 19_200;
const SEND_SETTLE_DELAY: Duration = Duration::from_millis(100);
const SEND_TIMEOUT: Duration = Duration::from_secs(60);

const CMD_RESET: &[u8] = &[0x1b, 0xf0, 0x00];
const CMD_SET_MODE: &[u8] = &[0x1b, 0xf2];
const CMD_CLEAR: &[u8] = &[0x1b, 0x80, 0x01];
const CMD_HOME: &[u8] = &[0x1b, 0x80, 0x02];
const CMD_NEXT_LINE: &[u8] = &[0x1b, 0x80, 0xc0];
const CMD_WIDE_MODE: &[u8] = &[0x1b, 0x80, 0x38];

const CPU_PLACEHOLDER: &str = "CPU :(          ";
const GPU_PLACEHOLDER: &str = "GPU :(          ";
const FALLBACK_NOTICE: &str = "OHM not detected";

// Display Device
pub struct MidasLcd<W: Write> {
    channel: W,
    settle: Duration,
}

impl MidasLcd<Box<dyn SerialPort>> {
    pub fn open(path: &str) -> Result<Self> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(SEND_TIMEOUT)
            .open()
            .with_context(|| format!("Failed to open serial port {path}"))?;

        info!(port = path, baud = BAUD_RATE, "serial connection established");

        Ok(Self::new(port, SEND_SETTLE_DELAY))
    }
}

impl<W: Write> MidasLcd<W> {
    fn new(channel: W, settle: Duration) -> Self {
        Self { channel, settle }
    }

    pub fn reset(&mut self) -> Result<()> {
        self.send(CMD_RESET)
    }

    pub fn set_mode(&mut self) -> Result<()> {
        self.send(CMD_SET_MODE)
    }

    /// The controller wants the home command chased onto every clear, so this
    /// always sends two sequences.
    pub fn clear_screen(&mut self) -> Result<()> {
        self.send(CMD_CLEAR)?;
        self.send(CMD_HOME)
    }

    pub fn home(&mut self) -> Result<()> {
        self.send(CMD_HOME)
    }

    pub fn next_line(&mut self) -> Result<()> {
        self.send(CMD_NEXT_LINE)
    }

    /// Part of the device command surface; the update loop never sends it.
    #[allow(dead_code)]
    pub fn enable_wide_mode(&mut self) -> Result<()> {
        self.send(CMD_WIDE_MODE)
    }

    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.send(text.as_bytes())
    }

    /// Writes both status lines starting from the current cursor position.
    pub fn write_status(&mut self, readings: &TempReadings) -> Result<()> {
        self.write_text(&render_cpu_line(readings.cpu))?;
        self.next_line()?;
        self.write_text(&render_gpu_line(readings.cpu, readings.gpu))?;
        debug!("wrote status frame");
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.channel
            .write_all(bytes)
            .context("Failed to write to display")?;
        // The controller needs a beat to digest each command.
        sleep(self.settle);
        Ok(())
    }
}

// Startup Announce

/// Clears the panel, takes one reading solely to learn which backend
/// answers, and when it is the fallback shows the notice for `hold` before
/// clearing again. The reading's values are discarded; the steady loop takes
/// its own.
pub fn announce_source<W: Write>(
    lcd: &mut MidasLcd<W>,
    primary: &mut dyn SensorBackend,
    fallback: &mut dyn SensorBackend,
    hold: Duration,
    shutdown: &AtomicBool,
) -> Result<()> {
    lcd.clear_screen()?;
    let readings = read_temperatures(primary, fallback)?;
    if readings.source == SensorSource::FallbackAcpi {
        warn!("hardware monitor not detected, falling back to the ACPI thermal zone");
        lcd.write_text(FALLBACK_NOTICE)?;
        sleep_unless_shutdown(hold, shutdown);
        lcd.clear_screen()?;
    }
    Ok(())
}

// Line Formatting

pub fn render_cpu_line(cpu: Option<TempReading>) -> String {
    match cpu {
        Some(t) => format!("CPU {:.1}C {:.1}C ", t.current, t.max),
        None => CPU_PLACEHOLDER.to_owned(),
    }
}

/// Known quirk: a present GPU reading renders the CPU pair, not the GPU's own
/// values.
pub fn render_gpu_line(cpu: Option<TempReading>, gpu: Option<TempReading>) -> String {
    match (cpu, gpu) {
        (Some(c), Some(_)) => format!("GPU{:.1}C {:.1}C", c.current, c.max),
        _ => GPU_PLACEHOLDER.to_owned(),
    }
}
