use proptest::prelude::*;
use qnr_model::{sort_participants, ParticipantKey};

fn valid_id() -> impl Strategy<Value = String> {
    ("[a-zA-Z]{1,3}", "[0-9]{1,6}").prop_map(|(letters, digits)| format!("{letters}{digits}"))
}

proptest! {
    #[test]
    fn prop_valid_ids_order_by_group_then_number(a in valid_id(), b in valid_id()) {
        let ka = ParticipantKey::parse(&a);
        let kb = ParticipantKey::parse(&b);

        let split = |id: &str| {
            let pos = id.find(|c: char| c.is_ascii_digit()).unwrap();
            (id[..pos].to_ascii_lowercase(), id[pos..].parse::<u64>().unwrap())
        };
        prop_assert_eq!(ka.cmp(&kb), split(&a).cmp(&split(&b)));
    }

    #[test]
    fn prop_key_is_injective_on_group_and_number(a in valid_id(), b in valid_id()) {
        let ka = ParticipantKey::parse(&a);
        let kb = ParticipantKey::parse(&b);
        let same = a.to_ascii_lowercase().trim_start_matches(char::is_alphabetic).trim_start_matches('0')
            == b.to_ascii_lowercase().trim_start_matches(char::is_alphabetic).trim_start_matches('0')
            && ka.group() == kb.group();
        prop_assert_eq!(ka == kb, same);
    }

    #[test]
    fn prop_malformed_sorts_after_valid(valid in valid_id(), junk in "[0-9 _.-][a-z0-9 _.-]{0,6}") {
        prop_assert!(ParticipantKey::parse(&valid) < ParticipantKey::parse(&junk));
    }

    #[test]
    fn prop_sort_output_is_ordered(mut ids in proptest::collection::vec("[a-c]{0,2}[0-9]{0,3}", 0..20)) {
        sort_participants(&mut ids);
        for pair in ids.windows(2) {
            prop_assert!(ParticipantKey::parse(&pair[0]) <= ParticipantKey::parse(&pair[1]));
        }
    }
}
