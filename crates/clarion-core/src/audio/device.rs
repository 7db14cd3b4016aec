//! Output device enumeration and lookup
//!
//! Devices are listed across every available cpal host, so a system with
//! several backends (ALSA and JACK on Linux, for instance) exposes all of
//! them and the configuration can pin one by host and name.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Host, HostId};

use super::config::DeviceId;
use super::error::{AudioError, AudioResult};

/// Sample rates probed when describing a device
const PROBED_SAMPLE_RATES: [u32; 6] = [44100, 48000, 88200, 96000, 176400, 192000];

/// Display name for a raw host identifier
fn display_host_name(raw: &str) -> String {
    match raw {
        "Alsa" => "ALSA".to_string(),
        "Jack" => "JACK".to_string(),
        "Wasapi" => "WASAPI".to_string(),
        "Asio" => "ASIO".to_string(),
        _ => raw.to_string(),
    }
}

fn host_name(host_id: HostId) -> String {
    display_host_name(&format!("{:?}", host_id))
}

fn host_by_name(name: &str) -> Option<Host> {
    cpal::available_hosts()
        .into_iter()
        .find(|id| host_name(*id) == name)
        .and_then(|id| cpal::host_from_id(id).ok())
}

/// Information about an output device
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Identifier to store in [`AudioConfig`](super::AudioConfig)
    pub id: DeviceId,
    /// Whether this is its host's default output
    pub is_default: bool,
    /// Probed sample rates the device accepts
    pub sample_rates: Vec<u32>,
    /// Maximum output channels
    pub max_channels: u16,
    /// Whether any configuration offers 32-bit float samples
    pub supports_f32: bool,
}

impl AudioDevice {
    /// Whether the device can be driven by the mixer at `sample_rate`
    pub fn supports(&self, sample_rate: u32) -> bool {
        self.supports_f32 && self.max_channels >= 1 && self.sample_rates.contains(&sample_rate)
    }
}

impl std::fmt::Display for AudioDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)?;
        if self.is_default {
            write!(f, " (default)")?;
        }
        Ok(())
    }
}

/// List output devices from all hosts, defaults first
pub fn output_devices() -> AudioResult<Vec<AudioDevice>> {
    let mut devices = Vec::new();

    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(h) => h,
            Err(e) => {
                log::debug!("Could not initialize host {:?}: {}", host_id, e);
                continue;
            }
        };
        let host_label = host_name(host_id);
        let default_name = host.default_output_device().and_then(|d| d.name().ok());

        let host_devices = match host.output_devices() {
            Ok(d) => d,
            Err(e) => {
                log::debug!("Could not enumerate devices for {:?}: {}", host_id, e);
                continue;
            }
        };

        for device in host_devices {
            let Ok(name) = device.name() else { continue };
            let Ok(configs) = device.supported_output_configs() else {
                continue;
            };
            let configs: Vec<_> = configs.collect();
            if configs.is_empty() {
                continue;
            }

            let mut sample_rates = Vec::new();
            let mut max_channels = 0;
            let mut supports_f32 = false;
            for config in &configs {
                max_channels = max_channels.max(config.channels());
                supports_f32 |= config.sample_format() == cpal::SampleFormat::F32;
                for rate in PROBED_SAMPLE_RATES {
                    if (config.min_sample_rate().0..=config.max_sample_rate().0).contains(&rate)
                        && !sample_rates.contains(&rate)
                    {
                        sample_rates.push(rate);
                    }
                }
            }
            sample_rates.sort_unstable();

            devices.push(AudioDevice {
                is_default: default_name.as_deref() == Some(name.as_str()),
                id: DeviceId::with_host(name, host_label.clone()),
                sample_rates,
                max_channels,
                supports_f32,
            });
        }
    }

    if devices.is_empty() {
        return Err(AudioError::NoDevices);
    }

    devices.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then_with(|| a.id.host.cmp(&b.id.host))
            .then_with(|| a.id.name.cmp(&b.id.name))
    });
    log::info!("Enumerated {} output devices", devices.len());

    Ok(devices)
}

/// Find a device by its identifier
///
/// Searches the named host when one is given and known, otherwise every
/// host in turn.
pub fn find_device_by_id(id: &DeviceId) -> AudioResult<cpal::Device> {
    let matches = |d: &cpal::Device| d.name().ok().as_deref() == Some(id.name.as_str());

    if let Some(host) = id.host.as_deref().and_then(host_by_name) {
        return host
            .output_devices()
            .map_err(|e| AudioError::ConfigError(e.to_string()))?
            .find(matches)
            .ok_or_else(|| AudioError::DeviceNotFound(id.to_string()));
    }

    cpal::available_hosts()
        .into_iter()
        .filter_map(|host_id| cpal::host_from_id(host_id).ok())
        .filter_map(|host| host.output_devices().ok())
        .flatten()
        .find(matches)
        .ok_or_else(|| AudioError::DeviceNotFound(id.to_string()))
}

/// Default output device of the default host
pub fn default_output_device() -> AudioResult<cpal::Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or_else(|| AudioError::NoDefaultDevice("No default output device".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_display_names() {
        assert_eq!(display_host_name("Alsa"), "ALSA");
        assert_eq!(display_host_name("Wasapi"), "WASAPI");
        assert_eq!(display_host_name("CoreAudio"), "CoreAudio");
    }

    #[test]
    fn test_device_support_check() {
        let device = AudioDevice {
            id: DeviceId::with_host("hw:0", "ALSA"),
            is_default: true,
            sample_rates: vec![44100, 48000],
            max_channels: 2,
            supports_f32: true,
        };
        assert!(device.supports(48000));
        assert!(!device.supports(96000));
        assert_eq!(device.to_string(), "[ALSA] hw:0 (default)");
    }

    #[test]
    fn test_device_enumeration() {
        // Machines without audio hardware (CI) report no devices
        match output_devices() {
            Ok(devices) => {
                for device in &devices {
                    println!("  - {} rates: {:?}", device, device.sample_rates);
                }
            }
            Err(e) => println!("No output devices: {}", e),
        }
    }
}
