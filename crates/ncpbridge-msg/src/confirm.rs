//! Confirms: the NCP's answer to a host request.

use crate::code::ConfirmCategory;
use crate::message::message_family;
use crate::nib::NibAttribute;
use crate::types::{DevTypeList, NodeList, NwkStatus, ProfileId, ProfileIdList, UserString, VendorString};
use crate::wire::wire_struct;

wire_struct! {
    pub struct DataConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
        pub profile_id: ProfileId,
    }
}

wire_struct! {
    /// Result of auto-discovery; `src_ieee_addr` is the node that was found.
    pub struct AutoDiscoveryConfirm {
        pub status: NwkStatus,
        pub src_ieee_addr: u64,
    }
}

wire_struct! {
    /// Discovery result with up to three node descriptors.
    pub struct DiscoveryConfirm {
        pub status: NwkStatus,
        pub nodes: NodeList,
    }
}

wire_struct! {
    pub struct GetConfirm {
        pub status: NwkStatus,
        pub attribute: NibAttribute,
        pub index: u8,
        pub value: Vec<u8>,
    }
}

wire_struct! {
    /// Pairing outcome and what the recipient told us about itself.
    pub struct PairConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
        pub rec_vendor_id: u16,
        pub rec_vendor_string: VendorString,
        pub rec_app_capabilities: u8,
        pub rec_user_string: UserString,
        pub rec_dev_types: DevTypeList,
        pub rec_profiles: ProfileIdList,
    }
}

wire_struct! {
    pub struct ResetConfirm {
        pub status: NwkStatus,
    }
}

wire_struct! {
    pub struct RxEnableConfirm {
        pub status: NwkStatus,
    }
}

wire_struct! {
    pub struct SetConfirm {
        pub status: NwkStatus,
        pub attribute: NibAttribute,
        pub index: u8,
    }
}

wire_struct! {
    pub struct StartConfirm {
        pub status: NwkStatus,
    }
}

wire_struct! {
    pub struct UnpairConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
    }
}

wire_struct! {
    pub struct UpdateKeyConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
    }
}

wire_struct! {
    pub struct ChannelAgilityConfirm {
        pub status: NwkStatus,
        pub channel_changed: bool,
        pub logical_channel: u8,
    }
}

wire_struct! {
    pub struct ZrcCommandConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
        pub rc_cmd: u8,
    }
}

wire_struct! {
    pub struct ZrcCommandDiscoveryConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
        pub supported_commands: [u8; 32],
    }
}

wire_struct! {
    pub struct PbpOrgPairConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
    }
}

wire_struct! {
    pub struct PbpRecPairConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
    }
}

wire_struct! {
    pub struct VendorDataConfirm {
        pub status: NwkStatus,
        pub pairing_ref: u8,
    }
}

message_family! {
    /// Every confirm the NCP sends.
    pub enum Confirm ("confirm") {
        Data(DataConfirm) = NldeDataConfirm,
        AutoDiscovery(AutoDiscoveryConfirm) = NlmeAutoDiscoveryConfirm,
        Discovery(DiscoveryConfirm) = NlmeDiscoveryConfirm,
        Get(GetConfirm) = NlmeGetConfirm,
        Pair(PairConfirm) = NlmePairConfirm,
        Reset(ResetConfirm) = NlmeResetConfirm,
        RxEnable(RxEnableConfirm) = NlmeRxEnableConfirm,
        Set(SetConfirm) = NlmeSetConfirm,
        Start(StartConfirm) = NlmeStartConfirm,
        Unpair(UnpairConfirm) = NlmeUnpairConfirm,
        UpdateKey(UpdateKeyConfirm) = NlmeUpdateKeyConfirm,
        ChannelAgility(ChannelAgilityConfirm) = NwkChAgilityConfirm,
        ZrcCommand(ZrcCommandConfirm) = ZrcCmdConfirm,
        ZrcCommandDiscovery(ZrcCommandDiscoveryConfirm) = ZrcCmdDiscoveryConfirm,
        PbpOrgPair(PbpOrgPairConfirm) = PbpOrgPairConfirm,
        PbpRecPair(PbpRecPairConfirm) = PbpRecPairConfirm,
        VendorData(VendorDataConfirm) = VendorDataConfirm,
    }
}

impl Confirm {
    /// Pending-callback slot this confirm completes.
    pub fn category(&self) -> ConfirmCategory {
        match self {
            Self::Data(_) => ConfirmCategory::Data,
            Self::AutoDiscovery(_) => ConfirmCategory::AutoDiscovery,
            Self::Discovery(_) => ConfirmCategory::Discovery,
            Self::Get(_) => ConfirmCategory::Get,
            Self::Pair(_) => ConfirmCategory::Pair,
            Self::Reset(_) => ConfirmCategory::Reset,
            Self::RxEnable(_) => ConfirmCategory::RxEnable,
            Self::Set(_) => ConfirmCategory::Set,
            Self::Start(_) => ConfirmCategory::Start,
            Self::Unpair(_) => ConfirmCategory::Unpair,
            Self::UpdateKey(_) => ConfirmCategory::UpdateKey,
            Self::ChannelAgility(_) => ConfirmCategory::ChannelAgility,
            Self::ZrcCommand(_) => ConfirmCategory::ZrcCommand,
            Self::ZrcCommandDiscovery(_) => ConfirmCategory::ZrcCommandDiscovery,
            Self::PbpOrgPair(_) => ConfirmCategory::PbpOrgPair,
            Self::PbpRecPair(_) => ConfirmCategory::PbpRecPair,
            Self::VendorData(_) => ConfirmCategory::VendorData,
        }
    }

    pub fn status(&self) -> NwkStatus {
        match self {
            Self::Data(m) => m.status,
            Self::AutoDiscovery(m) => m.status,
            Self::Discovery(m) => m.status,
            Self::Get(m) => m.status,
            Self::Pair(m) => m.status,
            Self::Reset(m) => m.status,
            Self::RxEnable(m) => m.status,
            Self::Set(m) => m.status,
            Self::Start(m) => m.status,
            Self::Unpair(m) => m.status,
            Self::UpdateKey(m) => m.status,
            Self::ChannelAgility(m) => m.status,
            Self::ZrcCommand(m) => m.status,
            Self::ZrcCommandDiscovery(m) => m.status,
            Self::PbpOrgPair(m) => m.status,
            Self::PbpRecPair(m) => m.status,
            Self::VendorData(m) => m.status,
        }
    }

    /// Confirm with every field zeroed except `status`, for the given slot.
    pub fn with_status(category: ConfirmCategory, status: NwkStatus) -> Self {
        match category {
            ConfirmCategory::Data => DataConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::AutoDiscovery => AutoDiscoveryConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::Discovery => DiscoveryConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::Get => GetConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::Pair => PairConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::Reset => ResetConfirm { status }.into(),
            ConfirmCategory::RxEnable => RxEnableConfirm { status }.into(),
            ConfirmCategory::Set => SetConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::Start => StartConfirm { status }.into(),
            ConfirmCategory::Unpair => UnpairConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::UpdateKey => UpdateKeyConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::ChannelAgility => ChannelAgilityConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::ZrcCommand => ZrcCommandConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::ZrcCommandDiscovery => ZrcCommandDiscoveryConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::PbpOrgPair => PbpOrgPairConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::PbpRecPair => PbpRecPairConfirm {
                status,
                ..Default::default()
            }
            .into(),
            ConfirmCategory::VendorData => VendorDataConfirm {
                status,
                ..Default::default()
            }
            .into(),
        }
    }
}
