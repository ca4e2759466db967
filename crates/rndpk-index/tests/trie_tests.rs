use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rndpk_index::NameTrie;

proptest! {
    #[test]
    fn prop_completions_match_filtered_names(
        names in proptest::collection::vec("[a-zA-Z]{1,8}", 0..40),
        prefix in "[a-zA-Z]{0,3}",
    ) {
        let trie = NameTrie::from_names(&names);

        let lower_prefix = prefix.to_lowercase();
        let mut seen = BTreeSet::new();
        let mut expected: Vec<(String, &str)> = names
            .iter()
            .filter(|n| seen.insert(n.to_lowercase()))
            .filter(|n| n.to_lowercase().starts_with(&lower_prefix))
            .map(|n| (n.to_lowercase(), n.as_str()))
            .collect();
        expected.sort();
        let expected: Vec<&str> = expected.into_iter().map(|(_, n)| n).collect();

        prop_assert_eq!(trie.complete(&prefix), expected);
    }

    #[test]
    fn prop_every_inserted_name_is_found(names in proptest::collection::vec("[a-z]{1,10}", 1..30)) {
        let trie = NameTrie::from_names(&names);
        for name in &names {
            prop_assert!(trie.contains(&name.to_uppercase()));
        }
        prop_assert_eq!(trie.len(), names.iter().collect::<BTreeSet<_>>().len());
    }
}

#[test]
fn entity_table_load_order() {
    let table = ["", "Bulbasaur", "Ivysaur", "Venusaur", "Charmander"];
    let mut trie = NameTrie::new();
    trie.rebuild(table.iter().skip(1));

    assert_eq!(trie.len(), 4);
    assert_eq!(trie.complete("v"), vec!["Venusaur"]);
    assert_eq!(trie.complete(""), vec!["Bulbasaur", "Charmander", "Ivysaur", "Venusaur"]);
}
