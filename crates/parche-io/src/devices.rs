//! Audio device enumeration.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::{Error, Result};

/// Information about an audio device.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether the device supports audio input.
    pub is_input: bool,
    /// Whether the device supports audio output.
    pub is_output: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// Gets a device's name, mapping errors to our error type.
pub(crate) fn device_name(device: &cpal::Device) -> Result<String> {
    device.name().map_err(|e| Error::Stream(e.to_string()))
}

/// Lists all available audio devices on the default host.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                let sample_rate = device
                    .default_output_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(48000);
                let is_input = device.default_input_config().is_ok();

                devices.push(AudioDevice {
                    name,
                    is_input,
                    is_output: true,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    if let Ok(inputs) = host.input_devices() {
        for device in inputs {
            if let Ok(name) = device_name(&device) {
                if devices.iter().any(|d| d.name == name) {
                    continue;
                }
                let sample_rate = device
                    .default_input_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(48000);

                devices.push(AudioDevice {
                    name,
                    is_input: true,
                    is_output: false,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    Ok(devices)
}

/// The default output device, if the system has one.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: false,
            is_output: true,
            default_sample_rate: d
                .default_output_config()
                .map(|c| c.sample_rate())
                .unwrap_or(48000),
        })
    }))
}
