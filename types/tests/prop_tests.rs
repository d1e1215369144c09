use proptest::prelude::*;

use qv_types::{format_stake, AccountId, Action, Timestamp, TxHash, STAKE_UNIT};

fn arb_action() -> impl Strategy<Value = Action> {
    (
        "[a-z]{1,12}",
        any::<u128>(),
        "[a-zA-Z(),]{0,24}",
        prop::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(target, value, signature, calldata)| Action {
            target: AccountId::new(target),
            value,
            signature,
            calldata,
        })
}

proptest! {
    /// Timelock keys are stable across serialization of the action.
    #[test]
    fn tx_key_survives_bincode(action in arb_action(), eta in any::<u64>()) {
        let encoded = bincode::serialize(&action).unwrap();
        let decoded: Action = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(
            TxHash::for_action(&action, Timestamp::new(eta)),
            TxHash::for_action(&decoded, Timestamp::new(eta))
        );
    }

    /// Distinct ETAs never collide for the same action.
    #[test]
    fn tx_key_distinct_per_eta(action in arb_action(), eta in 0u64..u64::MAX) {
        prop_assert_ne!(
            TxHash::for_action(&action, Timestamp::new(eta)),
            TxHash::for_action(&action, Timestamp::new(eta + 1))
        );
    }

    /// Whole-token amounts format without a fractional part.
    #[test]
    fn whole_amounts_format_as_integers(tokens in 0u128..1_000_000_000) {
        prop_assert_eq!(format_stake(tokens * STAKE_UNIT), tokens.to_string());
    }
}
