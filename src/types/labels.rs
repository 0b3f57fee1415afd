//! Label tables for enum-coded beacon fields
//!
//! Each table is a closed `#[repr(u8)]` enum. Conversion from the wire code is a
//! total function: codes outside the table come back as
//! [`DecodeError::UnknownEnumValue`] rather than a placeholder label, since an
//! unknown code usually means frame corruption or protocol drift.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DecodeError, Result};

macro_rules! label_table {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident = $code:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "tauri", derive(specta::Type))]
        #[repr(u8)]
        pub enum $name {
            $($variant = $code,)+
        }

        impl $name {
            /// Field name used in decode errors
            pub const FIELD: &'static str = $field;

            /// Every registered code, in wire order
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Wire code of this entry
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Display label of this entry
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = DecodeError;

            fn try_from(value: u8) -> Result<Self> {
                match value {
                    $($code => Ok($name::$variant),)+
                    other => Err(DecodeError::unknown_enum($field, other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

label_table! {
    /// Network state of the console's wireless link (3-bit field)
    NetworkState, "network_state" {
        Idle = 0 => "Network Idle",
        Reserved = 1 => "Reserved",
        FootswitchActive = 2 => "Network Footswitch Active",
        Pairing = 3 => "Network Pairing",
    }
}

label_table! {
    /// Device that sent the beacon (3-bit field)
    BeaconSource, "beacon_source" {
        Console = 0 => "Centurion Console",
        Microscope = 1 => "Microscope",
    }
}

label_table! {
    /// Surgical step the console is in (5-bit field)
    StepType, "step_type" {
        Startup = 0 => "Startup",
        Shutdown = 1 => "Shutdown",
        Setup = 2 => "Setup",
        IrrigationAspiration = 3 => "I/A",
        Phaco = 4 => "Phaco",
        AutoSert = 5 => "AutoSert (IOL Injection)",
        Coagulation = 6 => "Coagulation",
        Vitrectomy = 7 => "Vitrectomy",
        IrrigationFootswitch = 8 => "Irrigation Footswitch",
        Fill = 9 => "Fill",
        AutoCap = 10 => "AutoCap (Capsulotomy)",
        Service = 11 => "Service",
        VitreoretinalSgs = 12 => "V+V (SGS)",
        EndOfCase = 13 => "End of Case",
    }
}

label_table! {
    /// Sub-step within the current surgical step (6-bit field)
    StepSubType, "step_sub_type" {
        None = 0 => "None",
        PrePhaco = 1 => "PrePhaco",
        Sculpt = 2 => "Sculpt",
        Quad = 3 => "Quad",
        Chop = 4 => "Chop",
        Epinucleus = 5 => "Epinucleus",
        Flip = 6 => "Flip",
        UltraChop = 7 => "UltraChop",
        Cortex = 8 => "Cortex",
        Polish = 9 => "Polish",
        Visco = 10 => "Visco",
        AnteriorVitrectomy = 11 => "Anterior Vitrectomy",
        EpinucleusRemoval = 12 => "Epinucleus Removal",
        PeripheralIridectomy = 13 => "Peripheral Iridectomy",
        ViscoAspiration = 14 => "Visco Aspiration",
        IaCut = 15 => "I/A Cut",
        Position = 16 => "Position",
        Incision = 17 => "Incision",
        Centration = 18 => "Centration",
        Toric = 19 => "Toric",
        Registration = 20 => "Registration",
        Capsularhexis = 21 => "Capsularhexis",
        Pseudophakic = 22 => "Pseudophakic",
        Aphakic = 23 => "Aphakic",
        AxisMarker = 24 => "Axis Marker",
        CutIa = 25 => "Cut I/A",
    }
}

/// Whether a beacon carries setup information or live status measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum PayloadType {
    Setup,
    Status,
}

impl PayloadType {
    pub fn from_flag(flag: bool) -> Self {
        if flag { PayloadType::Status } else { PayloadType::Setup }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PayloadType::Setup => "Setup",
            PayloadType::Status => "Status",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
