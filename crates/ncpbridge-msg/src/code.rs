use std::fmt;

use serde::Serialize;

use crate::error::MsgError;

/// Role a message plays on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Host asks the NCP to run a primitive; a confirm follows.
    Request,
    /// Host answers an indication; no confirm follows.
    Response,
    /// NCP reports the result of a request.
    Confirm,
    /// NCP reports an unsolicited event.
    Indication,
}

impl MessageKind {
    /// Whether the host sends this kind of message.
    pub fn host_to_ncp(self) -> bool {
        matches!(self, Self::Request | Self::Response)
    }
}

/// Operation family whose single outstanding confirm handler is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmCategory {
    Data,
    AutoDiscovery,
    Discovery,
    Get,
    Pair,
    Reset,
    RxEnable,
    Set,
    Start,
    Unpair,
    UpdateKey,
    ChannelAgility,
    ZrcCommand,
    ZrcCommandDiscovery,
    PbpOrgPair,
    PbpRecPair,
    VendorData,
}

impl ConfirmCategory {
    pub const ALL: [ConfirmCategory; 17] = [
        Self::Data,
        Self::AutoDiscovery,
        Self::Discovery,
        Self::Get,
        Self::Pair,
        Self::Reset,
        Self::RxEnable,
        Self::Set,
        Self::Start,
        Self::Unpair,
        Self::UpdateKey,
        Self::ChannelAgility,
        Self::ZrcCommand,
        Self::ZrcCommandDiscovery,
        Self::PbpOrgPair,
        Self::PbpRecPair,
        Self::VendorData,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::AutoDiscovery => "auto_discovery",
            Self::Discovery => "discovery",
            Self::Get => "get",
            Self::Pair => "pair",
            Self::Reset => "reset",
            Self::RxEnable => "rx_enable",
            Self::Set => "set",
            Self::Start => "start",
            Self::Unpair => "unpair",
            Self::UpdateKey => "update_key",
            Self::ChannelAgility => "channel_agility",
            Self::ZrcCommand => "zrc_command",
            Self::ZrcCommandDiscovery => "zrc_command_discovery",
            Self::PbpOrgPair => "pbp_org_pair",
            Self::PbpRecPair => "pbp_rec_pair",
            Self::VendorData => "vendor_data",
        }
    }

    /// Position in [`ConfirmCategory::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ConfirmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! message_types {
    ($( $variant:ident = $code:literal, $name:literal, $kind:ident, $category:expr; )*) => {
        /// Message-type byte carried after the protocol id.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[repr(u8)]
        pub enum MessageType {
            $( $variant = $code, )*
        }

        impl MessageType {
            /// Every message type, in code order.
            pub const ALL: &'static [MessageType] = &[$( MessageType::$variant, )*];

            pub fn from_u8(code: u8) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }

            pub fn as_u8(self) -> u8 {
                self as u8
            }

            /// Protocol name of the primitive, e.g. `NLME_RESET_REQUEST`.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            pub fn kind(self) -> MessageKind {
                match self {
                    $( Self::$variant => MessageKind::$kind, )*
                }
            }

            /// Confirm category a request expects or a confirm completes.
            /// Responses and indications have none.
            pub fn category(self) -> Option<ConfirmCategory> {
                use ConfirmCategory::*;
                match self {
                    $( Self::$variant => $category, )*
                }
            }
        }
    };
}

message_types! {
    NldeDataRequest = 0x00, "NLDE_DATA_REQUEST", Request, Some(Data);
    NlmeAutoDiscoveryRequest = 0x01, "NLME_AUTO_DISCOVERY_REQUEST", Request, Some(AutoDiscovery);
    NlmeDiscoveryRequest = 0x02, "NLME_DISCOVERY_REQUEST", Request, Some(Discovery);
    NlmeDiscoveryResponse = 0x03, "NLME_DISCOVERY_RESPONSE", Response, None;
    NlmeGetRequest = 0x04, "NLME_GET_REQUEST", Request, Some(Get);
    NlmePairRequest = 0x05, "NLME_PAIR_REQUEST", Request, Some(Pair);
    NlmePairResponse = 0x06, "NLME_PAIR_RESPONSE", Response, None;
    NlmeResetRequest = 0x07, "NLME_RESET_REQUEST", Request, Some(Reset);
    NlmeRxEnableRequest = 0x08, "NLME_RX_ENABLE_REQUEST", Request, Some(RxEnable);
    NlmeSetRequest = 0x09, "NLME_SET_REQUEST", Request, Some(Set);
    NlmeStartRequest = 0x0A, "NLME_START_REQUEST", Request, Some(Start);
    NlmeUnpairRequest = 0x0B, "NLME_UNPAIR_REQUEST", Request, Some(Unpair);
    NlmeUnpairResponse = 0x0C, "NLME_UNPAIR_RESPONSE", Response, None;
    NlmeUpdateKeyRequest = 0x0D, "NLME_UPDATE_KEY_REQUEST", Request, Some(UpdateKey);
    NwkChAgilityRequest = 0x0E, "NWK_CH_AGILITY_REQUEST", Request, Some(ChannelAgility);
    NldeDataIndication = 0x0F, "NLDE_DATA_INDICATION", Indication, None;
    NldeDataConfirm = 0x10, "NLDE_DATA_CONFIRM", Confirm, Some(Data);
    NlmeAutoDiscoveryConfirm = 0x11, "NLME_AUTO_DISCOVERY_CONFIRM", Confirm, Some(AutoDiscovery);
    NlmeCommStatusIndication = 0x12, "NLME_COMM_STATUS_INDICATION", Indication, None;
    NlmeDiscoveryIndication = 0x13, "NLME_DISCOVERY_INDICATION", Indication, None;
    NlmeDiscoveryConfirm = 0x14, "NLME_DISCOVERY_CONFIRM", Confirm, Some(Discovery);
    NlmeGetConfirm = 0x15, "NLME_GET_CONFIRM", Confirm, Some(Get);
    NlmePairIndication = 0x16, "NLME_PAIR_INDICATION", Indication, None;
    NlmePairConfirm = 0x17, "NLME_PAIR_CONFIRM", Confirm, Some(Pair);
    NlmeResetConfirm = 0x18, "NLME_RESET_CONFIRM", Confirm, Some(Reset);
    NlmeRxEnableConfirm = 0x19, "NLME_RX_ENABLE_CONFIRM", Confirm, Some(RxEnable);
    NlmeSetConfirm = 0x1A, "NLME_SET_CONFIRM", Confirm, Some(Set);
    NlmeStartConfirm = 0x1B, "NLME_START_CONFIRM", Confirm, Some(Start);
    NlmeUnpairConfirm = 0x1C, "NLME_UNPAIR_CONFIRM", Confirm, Some(Unpair);
    NlmeUnpairIndication = 0x1D, "NLME_UNPAIR_INDICATION", Indication, None;
    NlmeUpdateKeyConfirm = 0x1E, "NLME_UPDATE_KEY_CONFIRM", Confirm, Some(UpdateKey);
    NwkChAgilityIndication = 0x1F, "NWK_CH_AGILITY_INDICATION", Indication, None;
    NwkChAgilityConfirm = 0x20, "NWK_CH_AGILITY_CONFIRM", Confirm, Some(ChannelAgility);
    ZrcCmdRequest = 0x30, "ZRC_CMD_REQUEST", Request, Some(ZrcCommand);
    ZrcCmdConfirm = 0x31, "ZRC_CMD_CONFIRM", Confirm, Some(ZrcCommand);
    ZrcCmdIndication = 0x32, "ZRC_CMD_INDICATION", Indication, None;
    ZrcCmdDiscoveryRequest = 0x33, "ZRC_CMD_DISCOVERY_REQUEST", Request, Some(ZrcCommandDiscovery);
    ZrcCmdDiscoveryConfirm = 0x34, "ZRC_CMD_DISCOVERY_CONFIRM", Confirm, Some(ZrcCommandDiscovery);
    ZrcCmdDiscoveryIndication = 0x35, "ZRC_CMD_DISCOVERY_INDICATION", Indication, None;
    ZrcCmdDiscoveryResponse = 0x36, "ZRC_CMD_DISCOVERY_RESPONSE", Response, None;
    PbpOrgPairRequest = 0x37, "PBP_ORG_PAIR_REQUEST", Request, Some(PbpOrgPair);
    PbpOrgPairConfirm = 0x38, "PBP_ORG_PAIR_CONFIRM", Confirm, Some(PbpOrgPair);
    PbpRecPairRequest = 0x39, "PBP_REC_PAIR_REQUEST", Request, Some(PbpRecPair);
    PbpRecPairConfirm = 0x3A, "PBP_REC_PAIR_CONFIRM", Confirm, Some(PbpRecPair);
    VendorDataRequest = 0x3B, "VENDOR_DATA_REQUEST", Request, Some(VendorData);
    VendorDataConfirm = 0x3C, "VENDOR_DATA_CONFIRM", Confirm, Some(VendorData);
    VendorDataIndication = 0x3D, "VENDOR_DATA_INDICATION", Indication, None;
}

impl TryFrom<u8> for MessageType {
    type Error = MsgError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_u8(code).ok_or(MsgError::UnknownMessageType(code))
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_roundtrip_and_are_unique() {
        let mut seen = HashSet::new();
        for ty in MessageType::ALL {
            assert!(seen.insert(ty.as_u8()), "duplicate code for {ty}");
            assert_eq!(MessageType::from_u8(ty.as_u8()), Some(*ty));
        }
        assert_eq!(MessageType::ALL.len(), 47);
    }

    #[test]
    fn unassigned_codes_are_rejected() {
        for code in [0x21u8, 0x2F, 0x3E, 0xFF] {
            assert!(matches!(
                MessageType::try_from(code),
                Err(MsgError::UnknownMessageType(c)) if c == code
            ));
        }
    }

    #[test]
    fn every_category_has_one_request_and_one_confirm() {
        for category in ConfirmCategory::ALL {
            let kinds: Vec<MessageKind> = MessageType::ALL
                .iter()
                .filter(|ty| ty.category() == Some(category))
                .map(|ty| ty.kind())
                .collect();
            assert_eq!(
                kinds,
                vec![MessageKind::Request, MessageKind::Confirm],
                "{category}"
            );
        }
    }

    #[test]
    fn category_index_matches_all() {
        for (idx, category) in ConfirmCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), idx);
        }
    }

    #[test]
    fn names_and_kinds() {
        assert_eq!(MessageType::NlmeResetRequest.as_u8(), 0x07);
        assert_eq!(MessageType::NlmeResetRequest.name(), "NLME_RESET_REQUEST");
        assert_eq!(MessageType::NlmePairResponse.kind(), MessageKind::Response);
        assert!(MessageType::NlmePairResponse.kind().host_to_ncp());
        assert!(!MessageType::NldeDataIndication.kind().host_to_ncp());
        assert_eq!(MessageType::NlmePairResponse.category(), None);
    }
}
