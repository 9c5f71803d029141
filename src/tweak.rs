//! Kernel-side device adjustments
//!
//! Backs `evdev-tweak-device`: overrides selected absinfo fields of one axis
//! (the untouched fields keep their current kernel values), or switches an
//! LED on or off.

use evdev::{AbsoluteAxisType, LedType};
use tracing::info;

use crate::cli::TweakArgs;
use crate::device::{AbsSettings, DeviceSession};
use crate::error::ToolError;

/// linux/input-event-codes.h ABS_CNT and LED_CNT
const ABS_CNT: u16 = 0x40;
const LED_CNT: u16 = 0x10;

/// Absinfo fields given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsOverrides {
    pub minimum: Option<i32>,
    pub maximum: Option<i32>,
    pub resolution: Option<i32>,
    pub fuzz: Option<i32>,
    pub flat: Option<i32>,
}

impl AbsOverrides {
    /// `current` with every given field replaced
    pub fn apply(&self, current: AbsSettings) -> AbsSettings {
        AbsSettings {
            value: current.value,
            minimum: self.minimum.unwrap_or(current.minimum),
            maximum: self.maximum.unwrap_or(current.maximum),
            fuzz: self.fuzz.unwrap_or(current.fuzz),
            flat: self.flat.unwrap_or(current.flat),
            resolution: self.resolution.unwrap_or(current.resolution),
        }
    }
}

/// One requested change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tweak {
    Abs {
        axis: AbsoluteAxisType,
        overrides: AbsOverrides,
    },
    Led {
        led: LedType,
        on: bool,
    },
}

/// Resolve `ABS_*` names (any case) or plain codes
pub fn parse_axis(name: &str) -> Option<AbsoluteAxisType> {
    if let Ok(code) = name.parse::<u16>() {
        return (code < ABS_CNT).then_some(AbsoluteAxisType(code));
    }
    name.to_ascii_uppercase().parse().ok()
}

/// Resolve `LED_*` names (any case) or plain codes
pub fn parse_led(name: &str) -> Option<LedType> {
    if let Ok(code) = name.parse::<u16>() {
        return (code < LED_CNT).then_some(LedType(code));
    }
    name.to_ascii_uppercase().parse().ok()
}

fn axis_name(axis: AbsoluteAxisType) -> String {
    format!("{axis:?}")
}

fn led_name(led: LedType) -> String {
    format!("{led:?}")
}

impl Tweak {
    pub fn from_args(args: &TweakArgs) -> Result<Self, ToolError> {
        if let Some(name) = &args.abs {
            let axis = parse_axis(name).ok_or_else(|| ToolError::UnknownAxis(name.clone()))?;
            return Ok(Tweak::Abs {
                axis,
                overrides: AbsOverrides {
                    minimum: args.min,
                    maximum: args.max,
                    resolution: args.res,
                    fuzz: args.fuzz,
                    flat: args.flat,
                },
            });
        }

        // clap guarantees --led when --abs is absent
        let name = args.led.as_deref().unwrap_or_default();
        let led = parse_led(name).ok_or_else(|| ToolError::UnknownLed(name.to_string()))?;
        Ok(Tweak::Led { led, on: args.on })
    }

    /// Apply the change to an open device
    pub fn apply(&self, session: &mut DeviceSession) -> Result<(), ToolError> {
        match *self {
            Tweak::Abs { axis, overrides } => {
                let current = session.abs_settings(axis)?.ok_or_else(|| ToolError::MissingAxis {
                    device: session.name().to_string(),
                    axis: axis_name(axis),
                })?;
                let wanted = overrides.apply(current);
                session
                    .set_abs_settings(axis, wanted)
                    .map_err(|source| ToolError::SetAbs {
                        axis: axis_name(axis),
                        source,
                    })?;
                info!("{} on {}: {:?} -> {:?}", axis_name(axis), session.path(), current, wanted);
            }
            Tweak::Led { led, on } => {
                if !session.has_led(led) {
                    return Err(ToolError::MissingLed {
                        device: session.name().to_string(),
                        led: led_name(led),
                    });
                }
                session.set_led(led, on).map_err(|source| ToolError::SetLed {
                    led: led_name(led),
                    source,
                })?;
                let state = if on { "on" } else { "off" };
                info!("{} on {} switched {}", led_name(led), session.path(), state);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_tweak_args;

    #[test]
    fn test_parse_axis_names_and_codes() {
        assert_eq!(parse_axis("ABS_X"), Some(AbsoluteAxisType::ABS_X));
        assert_eq!(parse_axis("abs_mt_position_y"), Some(AbsoluteAxisType::ABS_MT_POSITION_Y));
        assert_eq!(parse_axis("24"), Some(AbsoluteAxisType::ABS_PRESSURE));
        assert_eq!(parse_axis("ABS_NOPE"), None);
        assert_eq!(parse_axis("64"), None);
        assert_eq!(parse_axis("LED_CAPSL"), None);
    }

    #[test]
    fn test_parse_led_names_and_codes() {
        assert_eq!(parse_led("LED_CAPSL"), Some(LedType::LED_CAPSL));
        assert_eq!(parse_led("led_numl"), Some(LedType::LED_NUML));
        assert_eq!(parse_led("2"), Some(LedType::LED_SCROLLL));
        assert_eq!(parse_led("ABS_X"), None);
    }

    #[test]
    fn test_overrides_keep_unset_fields() {
        let current = AbsSettings {
            value: 512,
            minimum: 0,
            maximum: 1023,
            fuzz: 4,
            flat: 0,
            resolution: 0,
        };
        let overrides = AbsOverrides {
            maximum: Some(4095),
            resolution: Some(30),
            ..AbsOverrides::default()
        };
        let wanted = overrides.apply(current);
        assert_eq!(
            wanted,
            AbsSettings {
                maximum: 4095,
                resolution: 30,
                ..current
            }
        );
        assert_eq!(AbsOverrides::default().apply(current), current);
    }

    #[test]
    fn test_from_args_abs() {
        let args = parse_tweak_args(["t", "--abs", "ABS_Y", "--fuzz", "2", "--flat=-1", "/dev/x"]).unwrap();
        let tweak = Tweak::from_args(&args).unwrap();
        assert_eq!(
            tweak,
            Tweak::Abs {
                axis: AbsoluteAxisType::ABS_Y,
                overrides: AbsOverrides {
                    fuzz: Some(2),
                    flat: Some(-1),
                    ..AbsOverrides::default()
                },
            }
        );
    }

    #[test]
    fn test_from_args_led_and_unknown_names() {
        let args = parse_tweak_args(["t", "--led", "LED_MUTE", "--on", "/dev/x"]).unwrap();
        assert_eq!(
            Tweak::from_args(&args).unwrap(),
            Tweak::Led {
                led: LedType::LED_MUTE,
                on: true
            }
        );

        let args = parse_tweak_args(["t", "--abs", "ABS_BOGUS", "/dev/x"]).unwrap();
        let err = Tweak::from_args(&args).unwrap_err();
        assert_eq!(err.to_string(), "Error: unknown axis 'ABS_BOGUS'");

        let args = parse_tweak_args(["t", "--led", "LED_BOGUS", "--off", "/dev/x"]).unwrap();
        assert!(matches!(Tweak::from_args(&args), Err(ToolError::UnknownLed(_))));
    }

    #[test]
    fn test_missing_axis_message() {
        let err = ToolError::MissingAxis {
            device: "Test Pad".to_string(),
            axis: axis_name(AbsoluteAxisType::ABS_MT_SLOT),
        };
        assert_eq!(err.to_string(), "Device 'Test Pad' doesn't have axis ABS_MT_SLOT");
    }

    #[test]
    #[ignore] // Needs write access to /dev/input/event0 (run with: cargo test -- --ignored)
    fn test_rewrite_current_absinfo() {
        let mut session = DeviceSession::open("/dev/input/event0").unwrap();
        let tweak = Tweak::Abs {
            axis: AbsoluteAxisType::ABS_X,
            overrides: AbsOverrides::default(),
        };
        tweak.apply(&mut session).unwrap();
    }
}
