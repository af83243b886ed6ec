//! Where confirms and indications are delivered on the host.

use std::fmt;

use ncpbridge_msg::indication::{
    ChannelAgilityIndication, CommStatusIndication, DataIndication, DiscoveryIndication,
    PairIndication, UnpairIndication, VendorDataIndication, ZrcCommandDiscoveryIndication,
    ZrcCommandIndication,
};
use ncpbridge_msg::{Confirm, ConfirmCategory, Indication};
use tracing::warn;

use crate::host::Requests;

/// Completion handler for one outstanding request. Called at most once, with
/// a [`Requests`] handle for queueing the follow-up.
pub type ConfirmHandler = Box<dyn FnOnce(Confirm, &mut Requests<'_>)>;

/// Box `handler` as a [`ConfirmHandler`].
pub fn confirm_handler<F>(handler: F) -> ConfirmHandler
where
    F: FnOnce(Confirm, &mut Requests<'_>) + 'static,
{
    Box::new(handler)
}

/// One outstanding confirm handler per category.
///
/// There is no transaction id on the wire, so two requests of the same
/// category in flight cannot be told apart: registering a second handler
/// replaces the first, whose request then completes into the newer handler.
pub struct PendingConfirms {
    slots: [Option<ConfirmHandler>; ConfirmCategory::ALL.len()],
}

impl PendingConfirms {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Install `handler` for `category`. Returns `true` if an outstanding
    /// handler was replaced.
    pub fn set(&mut self, category: ConfirmCategory, handler: ConfirmHandler) -> bool {
        let replaced = self.slots[category.index()].replace(handler).is_some();
        if replaced {
            warn!(%category, "replacing outstanding confirm handler");
        }
        replaced
    }

    /// Remove and return the handler for `category`.
    pub fn take(&mut self, category: ConfirmCategory) -> Option<ConfirmHandler> {
        self.slots[category.index()].take()
    }

    pub fn is_pending(&self, category: ConfirmCategory) -> bool {
        self.slots[category.index()].is_some()
    }

    /// Categories with a handler installed.
    pub fn pending(&self) -> impl Iterator<Item = ConfirmCategory> + '_ {
        ConfirmCategory::ALL
            .into_iter()
            .filter(move |category| self.is_pending(*category))
    }

    /// Drop every outstanding handler without calling it.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

impl Default for PendingConfirms {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PendingConfirms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pending()).finish()
    }
}

macro_rules! indication_table {
    ($( $field:ident, $setter:ident, $variant:ident($payload:ty); )*) => {
        /// Application handlers for unsolicited NCP events.
        ///
        /// Build one with the `on_*` methods and hand it to
        /// [`Host::register_indications`](crate::Host::register_indications).
        /// An indication without a handler is consumed and dropped.
        #[derive(Default)]
        pub struct IndicationCallbacks {
            $( $field: Option<Box<dyn FnMut($payload, &mut Requests<'_>)>>, )*
        }

        impl IndicationCallbacks {
            pub fn new() -> Self {
                Self::default()
            }

            $(
                pub fn $setter(
                    mut self,
                    handler: impl FnMut($payload, &mut Requests<'_>) + 'static,
                ) -> Self {
                    self.$field = Some(Box::new(handler));
                    self
                }
            )*

            /// Take over every handler set in `other`; entries `other` leaves
            /// unset keep their current handler.
            pub fn merge(&mut self, other: Self) {
                $(
                    if let Some(handler) = other.$field {
                        self.$field = Some(handler);
                    }
                )*
            }

            /// Hand `indication` to its handler. Returns `false` if none is
            /// registered.
            pub fn dispatch(
                &mut self,
                indication: Indication,
                requests: &mut Requests<'_>,
            ) -> bool {
                match indication {
                    $(
                        Indication::$variant(payload) => match self.$field.as_mut() {
                            Some(handler) => {
                                handler(payload, requests);
                                true
                            }
                            None => false,
                        },
                    )*
                }
            }

            /// Names of the indications with a handler.
            pub fn registered(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$field.is_some() {
                        names.push(stringify!($field));
                    }
                )*
                names
            }
        }
    };
}

indication_table! {
    data, on_data, Data(DataIndication);
    comm_status, on_comm_status, CommStatus(CommStatusIndication);
    discovery, on_discovery, Discovery(DiscoveryIndication);
    pair, on_pair, Pair(PairIndication);
    unpair, on_unpair, Unpair(UnpairIndication);
    channel_agility, on_channel_agility, ChannelAgility(ChannelAgilityIndication);
    zrc_command, on_zrc_command, ZrcCommand(ZrcCommandIndication);
    zrc_command_discovery, on_zrc_command_discovery, ZrcCommandDiscovery(ZrcCommandDiscoveryIndication);
    vendor_data, on_vendor_data, VendorData(VendorDataIndication);
}

impl fmt::Debug for IndicationCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicationCallbacks")
            .field("registered", &self.registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ncpbridge_frame::{FrameConfig, TxPool};
    use ncpbridge_msg::confirm::{PairConfirm, ResetConfirm};
    use ncpbridge_msg::NwkStatus;

    use super::*;

    /// Run `f` with a throwaway request handle.
    fn with_requests<R>(f: impl FnOnce(&mut Requests<'_>) -> R) -> R {
        let mut pool = TxPool::new(2, FrameConfig::default()).unwrap();
        let mut pending = PendingConfirms::new();
        f(&mut Requests::new(&mut pool, &mut pending))
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> ConfirmHandler) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let make = {
            let log = Rc::clone(&log);
            move |tag: &str| -> ConfirmHandler {
                let log = Rc::clone(&log);
                let tag = tag.to_string();
                confirm_handler(move |confirm, _| {
                    log.borrow_mut()
                        .push(format!("{tag}:{}", confirm.status()));
                })
            }
        };
        (log, make)
    }

    #[test]
    fn take_is_exactly_once() {
        let (log, make) = recorder();
        let mut pending = PendingConfirms::new();
        assert!(!pending.set(ConfirmCategory::Reset, make("first")));
        assert!(pending.is_pending(ConfirmCategory::Reset));

        let handler = pending.take(ConfirmCategory::Reset).unwrap();
        with_requests(|requests| {
            handler(
                Confirm::Reset(ResetConfirm {
                    status: NwkStatus::SUCCESS,
                }),
                requests,
            )
        });
        assert!(pending.take(ConfirmCategory::Reset).is_none());
        assert_eq!(*log.borrow(), vec!["first:SUCCESS".to_string()]);
    }

    #[test]
    fn second_handler_overwrites_first() {
        let (log, make) = recorder();
        let mut pending = PendingConfirms::new();
        pending.set(ConfirmCategory::Pair, make("first"));
        assert!(pending.set(ConfirmCategory::Pair, make("second")));

        let handler = pending.take(ConfirmCategory::Pair).unwrap();
        with_requests(|requests| {
            handler(
                Confirm::Pair(PairConfirm {
                    status: NwkStatus::NO_RESPONSE,
                    ..Default::default()
                }),
                requests,
            )
        });
        assert_eq!(*log.borrow(), vec!["second:NO_RESPONSE".to_string()]);
    }

    #[test]
    fn categories_are_independent() {
        let (_log, make) = recorder();
        let mut pending = PendingConfirms::new();
        pending.set(ConfirmCategory::Get, make("get"));
        pending.set(ConfirmCategory::Set, make("set"));
        assert_eq!(
            pending.pending().collect::<Vec<_>>(),
            vec![ConfirmCategory::Get, ConfirmCategory::Set]
        );
        assert!(pending.take(ConfirmCategory::Start).is_none());

        pending.clear();
        assert_eq!(pending.pending().count(), 0);
    }

    #[test]
    fn unregistered_indication_is_not_handled() {
        let mut table = IndicationCallbacks::new();
        let handled = with_requests(|requests| {
            table.dispatch(Indication::Unpair(UnpairIndication { pairing_ref: 1 }), requests)
        });
        assert!(!handled);
        assert!(table.registered().is_empty());
    }

    #[test]
    fn merge_keeps_entries_the_update_leaves_unset() {
        let seen = Rc::new(RefCell::new(Vec::new()));

        let data_seen = Rc::clone(&seen);
        let mut table = IndicationCallbacks::new().on_data(move |ind, _| {
            data_seen.borrow_mut().push(format!("data:{}", ind.pairing_ref));
        });

        let unpair_seen = Rc::clone(&seen);
        table.merge(IndicationCallbacks::new().on_unpair(move |ind, _| {
            unpair_seen
                .borrow_mut()
                .push(format!("unpair:{}", ind.pairing_ref));
        }));
        assert_eq!(table.registered(), vec!["data", "unpair"]);

        with_requests(|requests| {
            assert!(table.dispatch(
                Indication::Data(DataIndication {
                    pairing_ref: 4,
                    ..Default::default()
                }),
                requests,
            ));
            assert!(table.dispatch(
                Indication::Unpair(UnpairIndication { pairing_ref: 5 }),
                requests,
            ));
            assert!(!table.dispatch(
                Indication::ChannelAgility(ChannelAgilityIndication {
                    logical_channel: 20
                }),
                requests,
            ));
        });
        assert_eq!(*seen.borrow(), vec!["data:4", "unpair:5"]);
    }

    #[test]
    fn merge_replaces_entries_the_update_sets() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let old = Rc::clone(&seen);
        let new = Rc::clone(&seen);

        let mut table =
            IndicationCallbacks::new().on_unpair(move |_, _| old.borrow_mut().push("old"));
        table.merge(IndicationCallbacks::new().on_unpair(move |_, _| new.borrow_mut().push("new")));

        with_requests(|requests| {
            table.dispatch(Indication::Unpair(UnpairIndication { pairing_ref: 1 }), requests)
        });
        assert_eq!(*seen.borrow(), vec!["new"]);
    }
}
