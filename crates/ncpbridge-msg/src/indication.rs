//! Indications: events the NCP reports without a matching request.

use crate::message::message_family;
use crate::types::{
    AddrMode, DevType, DevTypeList, NwkStatus, ProfileId, ProfileIdList, UserString, VendorString,
};
use crate::wire::wire_struct;

wire_struct! {
    /// Data received over a pairing.
    pub struct DataIndication {
        pub pairing_ref: u8,
        pub profile_id: ProfileId,
        pub vendor_id: u16,
        pub rx_lqi: u8,
        pub rx_flags: u8,
        pub nsdu: Vec<u8>,
    }
}

wire_struct! {
    /// Outcome of a transmission triggered by a response primitive.
    pub struct CommStatusIndication {
        pub status: NwkStatus,
        pub pairing_ref: u8,
        pub dst_pan_id: u16,
        pub dst_addr_mode: AddrMode,
        /// Short or IEEE address depending on `dst_addr_mode`; always eight bytes.
        pub dst_addr: u64,
    }
}

wire_struct! {
    /// A remote node is looking for us.
    pub struct DiscoveryIndication {
        pub status: NwkStatus,
        pub src_ieee_addr: u64,
        pub org_node_capabilities: u8,
        pub org_vendor_id: u16,
        pub org_vendor_string: VendorString,
        pub org_app_capabilities: u8,
        pub org_user_string: UserString,
        pub org_dev_types: DevTypeList,
        pub org_profiles: ProfileIdList,
        pub search_dev_type: DevType,
        pub rx_lqi: u8,
    }
}

wire_struct! {
    /// A remote node asks to pair.
    pub struct PairIndication {
        pub status: NwkStatus,
        pub src_pan_id: u16,
        pub src_ieee_addr: u64,
        pub org_node_capabilities: u8,
        pub org_vendor_id: u16,
        pub org_vendor_string: VendorString,
        pub org_app_capabilities: u8,
        pub org_user_string: UserString,
        pub org_dev_types: DevTypeList,
        pub org_profiles: ProfileIdList,
        pub key_ex_transfer_count: u8,
        pub prov_pairing_ref: u8,
    }
}

wire_struct! {
    pub struct UnpairIndication {
        pub pairing_ref: u8,
    }
}

wire_struct! {
    /// The NCP moved to another channel.
    pub struct ChannelAgilityIndication {
        pub logical_channel: u8,
    }
}

wire_struct! {
    pub struct ZrcCommandIndication {
        pub pairing_ref: u8,
        pub rx_lqi: u8,
        pub rx_flags: u8,
        pub cmd_payload: Vec<u8>,
    }
}

wire_struct! {
    pub struct ZrcCommandDiscoveryIndication {
        pub pairing_ref: u8,
    }
}

wire_struct! {
    pub struct VendorDataIndication {
        pub pairing_ref: u8,
        pub profile_id: ProfileId,
        pub vendor_id: u16,
        pub rx_lqi: u8,
        pub rx_flags: u8,
        pub nsdu: Vec<u8>,
    }
}

message_family! {
    /// Every indication the NCP sends.
    pub enum Indication ("indication") {
        Data(DataIndication) = NldeDataIndication,
        CommStatus(CommStatusIndication) = NlmeCommStatusIndication,
        Discovery(DiscoveryIndication) = NlmeDiscoveryIndication,
        Pair(PairIndication) = NlmePairIndication,
        Unpair(UnpairIndication) = NlmeUnpairIndication,
        ChannelAgility(ChannelAgilityIndication) = NwkChAgilityIndication,
        ZrcCommand(ZrcCommandIndication) = ZrcCmdIndication,
        ZrcCommandDiscovery(ZrcCommandDiscoveryIndication) = ZrcCmdDiscoveryIndication,
        VendorData(VendorDataIndication) = VendorDataIndication,
    }
}
