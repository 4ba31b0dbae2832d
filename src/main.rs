mod helpers;
mod midas_lcd;
mod port_locator;
mod sensor_reader;
mod sensor_readings;
#[cfg(target_os = "linux")]
mod sysfs_sensors;
#[cfg(windows)]
mod wmi_sensors;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::helpers::sleep_unless_shutdown;
use crate::midas_lcd::{MidasLcd, announce_source};
use crate::sensor_reader::{detect_backends, read_temperatures};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const NOTICE_HOLD: Duration = Duration::from_secs(3);

const GOODBYE: &str = "Goodbye!";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, shutdown.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, shutdown.clone())?;
    #[cfg(windows)]
    signal_hook::flag::register(signal_hook::consts::SIGBREAK, shutdown.clone())?;

    let port_path = port_locator::locate()?;
    let mut lcd = MidasLcd::open(&port_path)?;
    let (mut primary, mut fallback) = detect_backends()?;

    lcd.reset()?;
    lcd.set_mode()?;
    announce_source(&mut lcd, &mut primary, &mut fallback, NOTICE_HOLD, &shutdown)?;

    info!("starting display update loop");
    while !shutdown.load(Ordering::Relaxed) {
        lcd.home()?;
        let readings = read_temperatures(&mut primary, &mut fallback)?;
        lcd.write_status(&readings)?;
        if !sleep_unless_shutdown(POLL_INTERVAL, &shutdown) {
            break;
        }
    }
    info!("stopping display update loop");

    lcd.clear_screen()?;
    lcd.write_text(GOODBYE)?;

    Ok(())
}
