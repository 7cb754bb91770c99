//! Absolute axis identifiers and per-axis calibration values.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

macro_rules! abs_axes {
    ($($variant:ident = $code:literal => $name:literal),+ $(,)?) => {
        /// A Linux absolute axis (`ABS_*` event code).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum Axis {
            $($variant = $code),+
        }

        impl Axis {
            /// Every known axis, in event-code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical kernel name, e.g. `ABS_X`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }

            /// Looks up an axis by its event code.
            pub const fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl FromStr for Axis {
            type Err = UnknownAxis;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    other => Err(UnknownAxis(other.to_string())),
                }
            }
        }
    };
}

abs_axes! {
    X = 0x00 => "ABS_X",
    Y = 0x01 => "ABS_Y",
    Z = 0x02 => "ABS_Z",
    Rx = 0x03 => "ABS_RX",
    Ry = 0x04 => "ABS_RY",
    Rz = 0x05 => "ABS_RZ",
    Throttle = 0x06 => "ABS_THROTTLE",
    Rudder = 0x07 => "ABS_RUDDER",
    Wheel = 0x08 => "ABS_WHEEL",
    Gas = 0x09 => "ABS_GAS",
    Brake = 0x0a => "ABS_BRAKE",
    Hat0X = 0x10 => "ABS_HAT0X",
    Hat0Y = 0x11 => "ABS_HAT0Y",
    Hat1X = 0x12 => "ABS_HAT1X",
    Hat1Y = 0x13 => "ABS_HAT1Y",
    Hat2X = 0x14 => "ABS_HAT2X",
    Hat2Y = 0x15 => "ABS_HAT2Y",
    Hat3X = 0x16 => "ABS_HAT3X",
    Hat3Y = 0x17 => "ABS_HAT3Y",
    Pressure = 0x18 => "ABS_PRESSURE",
    Distance = 0x19 => "ABS_DISTANCE",
    TiltX = 0x1a => "ABS_TILT_X",
    TiltY = 0x1b => "ABS_TILT_Y",
    ToolWidth = 0x1c => "ABS_TOOL_WIDTH",
    Volume = 0x20 => "ABS_VOLUME",
    Profile = 0x21 => "ABS_PROFILE",
    Misc = 0x28 => "ABS_MISC",
    MtSlot = 0x2f => "ABS_MT_SLOT",
    MtTouchMajor = 0x30 => "ABS_MT_TOUCH_MAJOR",
    MtTouchMinor = 0x31 => "ABS_MT_TOUCH_MINOR",
    MtWidthMajor = 0x32 => "ABS_MT_WIDTH_MAJOR",
    MtWidthMinor = 0x33 => "ABS_MT_WIDTH_MINOR",
    MtOrientation = 0x34 => "ABS_MT_ORIENTATION",
    MtPositionX = 0x35 => "ABS_MT_POSITION_X",
    MtPositionY = 0x36 => "ABS_MT_POSITION_Y",
    MtToolType = 0x37 => "ABS_MT_TOOL_TYPE",
    MtBlobId = 0x38 => "ABS_MT_BLOB_ID",
    MtTrackingId = 0x39 => "ABS_MT_TRACKING_ID",
    MtPressure = 0x3a => "ABS_MT_PRESSURE",
    MtDistance = 0x3b => "ABS_MT_DISTANCE",
    MtToolX = 0x3c => "ABS_MT_TOOL_X",
    MtToolY = 0x3d => "ABS_MT_TOOL_Y",
}

impl Axis {
    /// The event code sent to and from the kernel.
    pub const fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Axis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Returned when a section name is not a known axis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown axis '{0}'")]
pub struct UnknownAxis(pub String);

/// Calibration parameters for one axis, as the kernel exposes them through
/// `EVIOCGABS`/`EVIOCSABS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AxisCalibration {
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub res: i32,
    /// The flat (dead) zone sits around the center of the range instead of
    /// around `min`.
    pub flat_centered: bool,
}

impl AxisCalibration {
    pub const fn new(min: i32, max: i32, fuzz: i32, flat: i32, res: i32) -> Self {
        Self {
            min,
            max,
            fuzz,
            flat,
            res,
            flat_centered: false,
        }
    }

    pub const fn centered(mut self) -> Self {
        self.flat_centered = true;
        self
    }
}
