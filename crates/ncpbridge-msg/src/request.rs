//! Host-to-NCP messages: requests that expect a confirm, and responses to
//! earlier indications.

use crate::code::ConfirmCategory;
use crate::error::Result;
use crate::message::message_family;
use crate::nib::NibAttribute;
use crate::types::{AgilityMode, DevType, DevTypeList, NwkStatus, ProfileId, ProfileIdList};
use crate::wire::wire_struct;

wire_struct! {
    /// Send a data frame over an existing pairing.
    pub struct DataRequest {
        pub pairing_ref: u8,
        pub profile_id: ProfileId,
        pub vendor_id: u16,
        pub tx_options: u8,
        pub nsdu: Vec<u8>,
    }
}

wire_struct! {
    /// Answer discovery requests automatically for `duration` symbols.
    pub struct AutoDiscoveryRequest {
        pub rec_app_capabilities: u8,
        pub rec_dev_types: DevTypeList,
        pub rec_profiles: ProfileIdList,
        pub duration: u32,
    }
}

wire_struct! {
    /// Look for nodes matching a device type and profile list.
    pub struct DiscoveryRequest {
        pub dst_pan_id: u16,
        pub dst_nwk_addr: u16,
        pub org_app_capabilities: u8,
        pub org_dev_types: DevTypeList,
        pub org_profiles: ProfileIdList,
        pub search_dev_type: DevType,
        pub disc_profile_count: u8,
        pub disc_profiles: ProfileIdList,
        pub duration: u32,
    }
}

wire_struct! {
    /// Answer a discovery indication.
    pub struct DiscoveryResponse {
        pub status: NwkStatus,
        pub dst_ieee_addr: u64,
        pub rec_app_capabilities: u8,
        pub rec_dev_types: DevTypeList,
        pub rec_profiles: ProfileIdList,
        pub disc_req_lqi: u8,
    }
}

wire_struct! {
    /// Read one NIB attribute.
    pub struct GetRequest {
        pub attribute: NibAttribute,
        pub index: u8,
    }
}

wire_struct! {
    /// Pair with a discovered node.
    pub struct PairRequest {
        pub logical_channel: u8,
        pub dst_pan_id: u16,
        pub dst_ieee_addr: u64,
        pub org_app_capabilities: u8,
        pub org_dev_types: DevTypeList,
        pub org_profiles: ProfileIdList,
        pub key_ex_transfer_count: u8,
    }
}

wire_struct! {
    /// Accept or refuse a pair indication.
    pub struct PairResponse {
        pub status: NwkStatus,
        pub dst_pan_id: u16,
        pub dst_ieee_addr: u64,
        pub rec_app_capabilities: u8,
        pub rec_dev_types: DevTypeList,
        pub rec_profiles: ProfileIdList,
        pub prov_pairing_ref: u8,
    }
}

wire_struct! {
    /// Reset the network layer, optionally restoring NIB defaults.
    pub struct ResetRequest {
        pub set_default_nib: bool,
    }
}

wire_struct! {
    pub struct RxEnableRequest {
        pub rx_on_duration: u32,
    }
}

wire_struct! {
    /// Write one NIB attribute. The value must have the attribute's width.
    pub struct SetRequest {
        pub attribute: NibAttribute,
        pub index: u8,
        pub value: Vec<u8>,
    }
    check = SetRequest::check_width;
}

impl SetRequest {
    fn check_width(&self) -> Result<()> {
        self.attribute.check_value(&self.value)
    }
}

wire_struct! {
    pub struct StartRequest {}
}

wire_struct! {
    pub struct UnpairRequest {
        pub pairing_ref: u8,
    }
}

wire_struct! {
    /// Acknowledge an unpair indication.
    pub struct UnpairResponse {
        pub pairing_ref: u8,
    }
}

wire_struct! {
    pub struct UpdateKeyRequest {
        pub pairing_ref: u8,
        pub link_key: [u8; 16],
    }
}

wire_struct! {
    pub struct ChannelAgilityRequest {
        pub mode: AgilityMode,
    }
}

wire_struct! {
    /// Send a ZRC command to a paired target.
    pub struct ZrcCommandRequest {
        pub pairing_ref: u8,
        pub vendor_id: u16,
        pub cmd_code: u8,
        pub tx_options: u8,
        pub cmd_payload: Vec<u8>,
    }
}

wire_struct! {
    /// Ask a paired target which ZRC commands it supports.
    pub struct ZrcCommandDiscoveryRequest {
        pub pairing_ref: u8,
    }
}

wire_struct! {
    /// Answer a command-discovery indication with the supported-command bitmap.
    pub struct ZrcCommandDiscoveryResponse {
        pub pairing_ref: u8,
        pub supported_commands: [u8; 32],
    }
}

wire_struct! {
    /// Push-button pairing, originator side.
    pub struct PbpOrgPairRequest {
        pub org_app_capabilities: u8,
        pub org_dev_types: DevTypeList,
        pub org_profiles: ProfileIdList,
        pub search_dev_type: DevType,
        pub disc_profile_count: u8,
        pub disc_profiles: ProfileIdList,
    }
}

wire_struct! {
    /// Push-button pairing, recipient side.
    pub struct PbpRecPairRequest {
        pub rec_app_capabilities: u8,
        pub rec_dev_types: DevTypeList,
        pub rec_profiles: ProfileIdList,
    }
}

wire_struct! {
    pub struct VendorDataRequest {
        pub pairing_ref: u8,
        pub profile_id: ProfileId,
        pub vendor_id: u16,
        pub tx_options: u8,
        pub nsdu: Vec<u8>,
    }
}

message_family! {
    /// Every message the host sends.
    pub enum Request ("request") {
        Data(DataRequest) = NldeDataRequest,
        AutoDiscovery(AutoDiscoveryRequest) = NlmeAutoDiscoveryRequest,
        Discovery(DiscoveryRequest) = NlmeDiscoveryRequest,
        DiscoveryResponse(DiscoveryResponse) = NlmeDiscoveryResponse,
        Get(GetRequest) = NlmeGetRequest,
        Pair(PairRequest) = NlmePairRequest,
        PairResponse(PairResponse) = NlmePairResponse,
        Reset(ResetRequest) = NlmeResetRequest,
        RxEnable(RxEnableRequest) = NlmeRxEnableRequest,
        Set(SetRequest) = NlmeSetRequest,
        Start(StartRequest) = NlmeStartRequest,
        Unpair(UnpairRequest) = NlmeUnpairRequest,
        UnpairResponse(UnpairResponse) = NlmeUnpairResponse,
        UpdateKey(UpdateKeyRequest) = NlmeUpdateKeyRequest,
        ChannelAgility(ChannelAgilityRequest) = NwkChAgilityRequest,
        ZrcCommand(ZrcCommandRequest) = ZrcCmdRequest,
        ZrcCommandDiscovery(ZrcCommandDiscoveryRequest) = ZrcCmdDiscoveryRequest,
        ZrcCommandDiscoveryResponse(ZrcCommandDiscoveryResponse) = ZrcCmdDiscoveryResponse,
        PbpOrgPair(PbpOrgPairRequest) = PbpOrgPairRequest,
        PbpRecPair(PbpRecPairRequest) = PbpRecPairRequest,
        VendorData(VendorDataRequest) = VendorDataRequest,
    }
}

impl Request {
    /// Category of the confirm this request expects; `None` for responses.
    pub fn confirm_category(&self) -> Option<ConfirmCategory> {
        self.message_type().category()
    }
}
