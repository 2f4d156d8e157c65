/// Entries at or above this length are assumed to be several names glued
/// together by the server and are split on spaces.
const GLUED_NAME_THRESHOLD: usize = 100;

/// Cleans up the raw `col_names` list from the schema endpoint.
pub fn normalize_field_names(raw: &[String]) -> Vec<String> {
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        if name.len() < GLUED_NAME_THRESHOLD {
            names.push(name.clone());
        } else {
            names.extend(
                name.split(' ')
                    .filter(|part| !part.is_empty())
                    .map(ToOwned::to_owned),
            );
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::normalize_field_names;

    #[test]
    fn short_names_pass_through() {
        let raw = vec!["chrom".to_string(), "pos".to_string()];
        assert_eq!(normalize_field_names(&raw), raw);
    }

    #[test]
    fn glued_names_are_split_on_spaces() {
        let glued = format!("{} {}  {}", "a".repeat(40), "b".repeat(40), "c".repeat(40));
        assert!(glued.len() >= 100);
        let raw = vec!["pos".to_string(), glued];
        assert_eq!(
            normalize_field_names(&raw),
            vec![
                "pos".to_string(),
                "a".repeat(40),
                "b".repeat(40),
                "c".repeat(40)
            ]
        );
    }
}
