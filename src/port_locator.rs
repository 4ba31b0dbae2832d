use anyhow::{Context, Result};
use serialport::{SerialPortInfo, SerialPortType};
use std::io;
use tracing::debug;

pub const DISPLAY_USB_ID: &str = "VID:PID=04D8:F9C3";

/// Single enumeration pass, no retry. A missing display is reported before
/// any channel gets opened.
pub fn locate() -> Result<String> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;
    debug!(count = ports.len(), "enumerated serial ports");

    resolve_display_port(&ports)
}

fn resolve_display_port(ports: &[SerialPortInfo]) -> Result<String> {
    match find_display_port(ports) {
        Some(port) => {
            debug!(port = %port.port_name, "display port located");
            Ok(port.port_name.clone())
        }
        None => Err(anyhow::Error::new(io::Error::new(
            io::ErrorKind::NotFound,
            format!("No serial port matches {DISPLAY_USB_ID}, is the display connected?"),
        ))),
    }
}

pub fn find_display_port(ports: &[SerialPortInfo]) -> Option<&SerialPortInfo> {
    ports
        .iter()
        .find(|port| hardware_id(port).contains(DISPLAY_USB_ID))
}

/// `USB VID:PID=XXXX:YYYY [SER=...]` for USB devices, a bare transport tag
/// for everything else.
fn hardware_id(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => {
            let mut id = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
            if let Some(serial) = &usb.serial_number {
                id.push_str(&format!(" SER={serial}"));
            }
            id
        }
        SerialPortType::PciPort => "PCI".to_owned(),
        SerialPortType::BluetoothPort => "BLUETOOTH".to_owned(),
        SerialPortType::Unknown => "UNKNOWN".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_port(name: &str, vid: u16, pid: u16) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_owned(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid,
                pid,
                serial_number: Some("A02014".to_owned()),
                manufacturer: None,
                product: None,
            }),
        }
    }

    #[test]
    fn test_picks_first_port_carrying_the_display_id() {
        let ports = vec![
            usb_port("COM3", 0x0403, 0x6001),
            usb_port("COM7", 0x04D8, 0xF9C3),
            usb_port("COM9", 0x04D8, 0xF9C3),
        ];
        let found = find_display_port(&ports).expect("display port");
        assert_eq!(found.port_name, "COM7");
    }

    #[test]
    fn test_no_match_among_foreign_usb_devices() {
        let ports = vec![
            usb_port("COM3", 0x0403, 0x6001),
            usb_port("COM4", 0x2341, 0x0043),
        ];
        assert!(find_display_port(&ports).is_none());
    }

    #[test]
    fn test_ignores_ports_without_usb_descriptors() {
        let ports = vec![
            SerialPortInfo {
                port_name: "/dev/ttyS0".to_owned(),
                port_type: SerialPortType::PciPort,
            },
            SerialPortInfo {
                port_name: "/dev/rfcomm0".to_owned(),
                port_type: SerialPortType::BluetoothPort,
            },
            SerialPortInfo {
                port_name: "/dev/ttyS1".to_owned(),
                port_type: SerialPortType::Unknown,
            },
        ];
        assert!(find_display_port(&ports).is_none());
    }

    #[test]
    fn test_resolution_returns_the_port_path() {
        let ports = vec![usb_port("/dev/ttyACM0", 0x04D8, 0xF9C3)];
        assert_eq!(resolve_display_port(&ports).unwrap(), "/dev/ttyACM0");
    }

    #[test]
    fn test_resolution_failure_is_a_not_found_error() {
        let ports = vec![usb_port("COM3", 0x0403, 0x6001)];
        let err = resolve_display_port(&ports).unwrap_err();
        let io_err = err.downcast_ref::<io::Error>().expect("io error");
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains(DISPLAY_USB_ID), "{err}");
    }

    #[test]
    fn test_identifier_uses_uppercase_zero_padded_hex() {
        let port = usb_port("/dev/ttyACM0", 0x04D8, 0xF9C3);
        let id = hardware_id(&port);
        assert!(id.starts_with("USB "), "{id}");
        assert!(id.contains("VID:PID=04D8:F9C3"), "{id}");
        assert!(id.ends_with("SER=A02014"), "{id}");
    }
}
