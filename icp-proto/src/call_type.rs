//! Recognized ICP `callType` values.
//!
//! ICP calls occupy `0x0000..0x1000`; SBP calls (addressed to session
//! backends, carried over the same framed transport) occupy `0x1000..0x2000`.
//! Anything outside these ranges — or inside them but unmapped here — is an
//! unknown call type and must be answered with [`crate::frame::error_response`].

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CallType {
    PropertyBool = 0x0001,
    PropertyNumber = 0x0002,
    PropertyString = 0x0003,
    LogonUser = 0x0004,
    LogOffUserSession = 0x0005,
    DisconnectUserSession = 0x0006,
    OtsApiVirtualChannelOpen = 0x0007,
    OtsApiVirtualChannelClose = 0x0008,
    OtsApiStartRemoteControl = 0x0009,
    OtsApiStopRemoteControl = 0x000a,
    SessionNotification = 0x000b,

    SbpVersionInfo = 0x1001,
    SbpEndSession = 0x1002,
}

impl CallType {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0x0001 => Self::PropertyBool,
            0x0002 => Self::PropertyNumber,
            0x0003 => Self::PropertyString,
            0x0004 => Self::LogonUser,
            0x0005 => Self::LogOffUserSession,
            0x0006 => Self::DisconnectUserSession,
            0x0007 => Self::OtsApiVirtualChannelOpen,
            0x0008 => Self::OtsApiVirtualChannelClose,
            0x0009 => Self::OtsApiStartRemoteControl,
            0x000a => Self::OtsApiStopRemoteControl,
            0x000b => Self::SessionNotification,
            0x1001 => Self::SbpVersionInfo,
            0x1002 => Self::SbpEndSession,
            _ => return None,
        })
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn is_sbp(self) -> bool {
        self.as_u32() >= 0x1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_known_values() {
        let known = [
            CallType::PropertyBool,
            CallType::PropertyNumber,
            CallType::PropertyString,
            CallType::LogonUser,
            CallType::LogOffUserSession,
            CallType::DisconnectUserSession,
            CallType::OtsApiVirtualChannelOpen,
            CallType::OtsApiVirtualChannelClose,
            CallType::OtsApiStartRemoteControl,
            CallType::OtsApiStopRemoteControl,
            CallType::SessionNotification,
            CallType::SbpVersionInfo,
            CallType::SbpEndSession,
        ];
        for ct in known {
            assert_eq!(CallType::from_u32(ct.as_u32()), Some(ct));
        }
    }

    #[test]
    fn unknown_value_is_none() {
        assert_eq!(CallType::from_u32(0xffff), None);
    }

    #[test]
    fn sbp_range_is_disjoint_from_icp_range() {
        assert!(!CallType::PropertyBool.is_sbp());
        assert!(CallType::SbpVersionInfo.is_sbp());
        assert!(CallType::SbpEndSession.is_sbp());
    }
}
