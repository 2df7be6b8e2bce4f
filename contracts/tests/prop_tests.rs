use proptest::prelude::*;
use std::collections::BTreeSet;

use badge_contracts::{
    BadgeContract, BadgeRecord, Command, ContractViolation, RecordVersion, Transition,
    DEFAULT_ISSUING_AUTHORITY,
};
use badge_types::{Party, PartyName, PublicKey, RecordId, TxHash, VersionRef};
use chrono::NaiveDate;

fn party(name: &str, key: u8) -> Party {
    Party::new(PartyName::new(name).unwrap(), PublicKey([key; 32]))
}

fn badge(issuer: Party, uses: u32) -> BadgeRecord {
    BadgeRecord::new(
        "Explorer",
        RecordId::generate(),
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        issuer,
        party("O=PartyA, L=Paris, C=FR", 2),
        "visited every continent",
        uses,
    )
}

fn issue_tx(record: BadgeRecord) -> Transition {
    Transition {
        inputs: vec![],
        required_signers: BTreeSet::from([record.issuer.clone(), record.holder.clone()]),
        outputs: vec![record],
        commands: vec![Command::Issue],
        observers: BTreeSet::new(),
        salt: [0u8; 32],
    }
}

fn show_tx(input: BadgeRecord, output: BadgeRecord) -> Transition {
    Transition {
        required_signers: BTreeSet::from([input.holder.clone()]),
        inputs: vec![RecordVersion::new(input, VersionRef::new(TxHash::new([4u8; 32]), 0))],
        outputs: vec![output],
        commands: vec![Command::Show],
        observers: BTreeSet::new(),
        salt: [0u8; 32],
    }
}

proptest! {
    /// Issue is accepted exactly when the issuer is the issuing authority.
    #[test]
    fn issue_accepted_iff_issuer_is_authority(
        name in prop_oneof![
            Just(DEFAULT_ISSUING_AUTHORITY.to_string()),
            "O=[A-Za-z]{1,12}, L=[A-Za-z]{1,8}, C=[A-Z]{2}",
        ],
        uses in 0u32..1000,
    ) {
        let contract = BadgeContract::default();
        let result = contract.verify_transition(&issue_tx(badge(party(&name, 1), uses)));
        if name == DEFAULT_ISSUING_AUTHORITY {
            prop_assert_eq!(result, Ok(()));
        } else {
            let is_unauthorized = matches!(result, Err(ContractViolation::UnauthorizedIssuer { .. }));
            prop_assert!(is_unauthorized);
        }
    }

    /// Show is accepted exactly when the counter drops by one from a positive value.
    #[test]
    fn show_accepted_iff_exact_decrement(input_uses in 0u32..50, output_uses in 0u32..50) {
        let contract = BadgeContract::default();
        let input = badge(party(DEFAULT_ISSUING_AUTHORITY, 1), input_uses);
        let mut output = input.clone();
        output.remaining_uses = output_uses;
        let result = contract.verify_transition(&show_tx(input, output));
        if input_uses > 0 && output_uses == input_uses - 1 {
            prop_assert_eq!(result, Ok(()));
        } else {
            prop_assert_eq!(
                result,
                Err(ContractViolation::InsufficientBalance { input: input_uses, output: output_uses })
            );
        }
    }

    /// Any change to a carried-over field is rejected, whatever the counter.
    #[test]
    fn show_rejects_field_mutation(uses in 1u32..50, description in "[a-z]{1,16}") {
        let contract = BadgeContract::default();
        let input = badge(party(DEFAULT_ISSUING_AUTHORITY, 1), uses);
        let mut output = input.after_one_use().unwrap();
        output.description = format!("{}{}", input.description, description);
        prop_assert_eq!(
            contract.verify_transition(&show_tx(input, output)),
            Err(ContractViolation::IllegalFieldMutation { field: "description" })
        );
    }

    /// Verification is pure: repeating it gives the same answer.
    #[test]
    fn verification_is_repeatable(input_uses in 0u32..5, output_uses in 0u32..5, mutate_name in any::<bool>()) {
        let contract = BadgeContract::default();
        let input = badge(party(DEFAULT_ISSUING_AUTHORITY, 1), input_uses);
        let mut output = input.clone();
        output.remaining_uses = output_uses;
        if mutate_name {
            output.name.push('!');
        }
        let tx = show_tx(input, output);
        let first = contract.verify_transition(&tx);
        let second = contract.verify_transition(&tx);
        prop_assert_eq!(first, second);
    }
}
